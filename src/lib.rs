//! OAI Harvester - Client for the OAI-PMH 2.0 metadata harvesting protocol.
//!
//! This crate implements the six protocol verbs (Identify,
//! ListMetadataFormats, GetRecord, ListRecords, ListIdentifiers, ListSets)
//! against any OAI-PMH repository, decodes the XML response envelope, and
//! hands record metadata to caller-supplied target types.
//!
//! # Example
//!
//! ```no_run
//! use oai_harvester::{Client, DublinCoreRecords, ListOptions};
//!
//! # fn main() -> oai_harvester::Result<()> {
//! let client = Client::new("http://eprints.ecs.soton.ac.uk/cgi/oai2")?;
//! let mut options = ListOptions::with_prefix("oai_dc");
//!
//! loop {
//!     let mut records = DublinCoreRecords::default();
//!     let response = client.list_records(&options, &mut records)?;
//!
//!     for record in &records.records {
//!         if let Some(title) = record.titles.first() {
//!             println!("title: {title}");
//!         }
//!     }
//!
//!     match response.next_token() {
//!         Some(token) => options = ListOptions::from_resumption_token(token),
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Constants, validation, and timestamp formatting
//! - [`types`]: Verbs, options, records, tokens, and response envelopes
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML navigation utilities
//! - [`envelope`]: Envelope parsing and protocol error classification
//! - [`decode`]: Generic metadata decoding into caller types
//! - [`dc`]: Dublin Core decode target
//! - [`http`]: HTTP client wrapper
//! - [`client`]: The per-verb client
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod client;
pub mod config;
pub mod dc;
pub mod decode;
pub mod envelope;
pub mod error;
pub mod http;
pub mod types;
pub mod xml;

// Re-export the caller-facing surface
pub use client::Client;
pub use dc::{DublinCoreRecord, DublinCoreRecords};
pub use decode::{decode_record, decode_record_into, decode_records_into, FromMetadata, RecordContainer};
pub use error::{ErrorCode, HarvestError, ProtocolError, Result};
pub use types::{
    GetRecordOptions, GetRecordResponse, IdentifyResponse, ListIdentifiersResponse,
    ListMetadataFormatsOptions, ListMetadataFormatsResponse, ListOptions, ListRecordsResponse,
    ListSetsOptions, ListSetsResponse, MetadataFormat, RawRecord, RecordHeader, RequestEcho,
    ResumptionToken, Set, Verb,
};

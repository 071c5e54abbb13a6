//! Core data types for the harvester.
//!
//! These types model the fixed-shape parts of the OAI-PMH response envelope
//! and the per-verb request options. The inner metadata of a record stays an
//! opaque string here; decoding it into a caller type is the job of
//! [`crate::decode`].

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The six operations defined by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Identify,
    ListMetadataFormats,
    GetRecord,
    ListRecords,
    ListIdentifiers,
    ListSets,
}

impl Verb {
    /// Get the wire-format verb string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identify => "Identify",
            Self::ListMetadataFormats => "ListMetadataFormats",
            Self::GetRecord => "GetRecord",
            Self::ListRecords => "ListRecords",
            Self::ListIdentifiers => "ListIdentifiers",
            Self::ListSets => "ListSets",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `<request>` element: the repository's echo of what it understood.
///
/// The verb is absent when the repository rejected the request outright
/// (e.g. `badVerb`), so it stays optional here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEcho {
    /// Base URL as the element's text content.
    pub base_url: String,

    /// Echoed verb attribute, absent on rejected requests.
    pub verb: Option<String>,
}

/// One entry of a ListMetadataFormats response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataFormat {
    pub metadata_prefix: String,
    pub schema: String,
    pub metadata_namespace: String,
}

/// Repository self-description returned by Identify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifyInfo {
    pub repository_name: String,
    pub base_url: String,
    pub protocol_version: String,
    pub earliest_datestamp: String,
    pub deleted_record: String,
    pub granularity: String,
    pub admin_email: String,
    pub compression: String,
}

/// Record header: identity and provenance of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordHeader {
    /// Unique item identifier within the repository.
    pub identifier: String,

    /// Datestamp of the item's last modification.
    pub datestamp: String,

    /// Set memberships, in document order.
    pub set_specs: Vec<String>,

    /// Status attribute, `"deleted"` for tombstones.
    pub status: Option<String>,
}

impl RecordHeader {
    /// Whether the repository marked this record as deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status.as_deref() == Some("deleted")
    }
}

/// A record as it appears in the envelope: header plus the uninterpreted
/// inner markup of its `<metadata>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub header: RecordHeader,

    /// Inner XML of `<metadata>`, verbatim. Empty for deleted records.
    pub metadata: String,
}

/// Continuation cursor for paging through large list responses.
///
/// The value is opaque: it is never parsed or validated, only carried back
/// verbatim as the `resumptionToken` parameter of the next request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumptionToken {
    /// Token text content. Empty means the harvest is complete.
    pub value: String,

    /// `expirationDate` attribute, if the repository sent one.
    pub expiration_date: Option<String>,
}

impl ResumptionToken {
    /// The token to send for the next page, or `None` when the repository
    /// signalled completion with an empty value.
    #[must_use]
    pub fn as_continuation(&self) -> Option<&str> {
        if self.value.is_empty() {
            None
        } else {
            Some(&self.value)
        }
    }
}

/// One entry of a ListSets response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set {
    pub spec: String,
    pub name: String,
}

/// Options for ListMetadataFormats.
#[derive(Debug, Clone, Default)]
pub struct ListMetadataFormatsOptions {
    /// Restrict formats to those available for one item.
    pub identifier: Option<String>,
}

/// Options for GetRecord. Both parameters are required by the protocol.
#[derive(Debug, Clone)]
pub struct GetRecordOptions {
    pub identifier: String,
    pub metadata_prefix: String,
}

/// Options for ListRecords and ListIdentifiers.
///
/// The protocol forbids combining a resumption token with filter parameters:
/// the first page carries the filters, subsequent pages carry only the token.
/// Use [`ListOptions::from_resumption_token`] for the subsequent pages.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub metadata_prefix: Option<String>,

    /// Lower datestamp bound, omitted from the request when unset.
    pub from: Option<DateTime<Utc>>,

    /// Upper datestamp bound, omitted from the request when unset.
    pub until: Option<DateTime<Utc>>,

    /// Set membership filter.
    pub set: Option<String>,

    /// Continuation token from a previous page.
    pub resumption_token: Option<String>,
}

impl ListOptions {
    /// Options for a first page with just a metadata prefix.
    #[must_use]
    pub fn with_prefix(metadata_prefix: impl Into<String>) -> Self {
        Self {
            metadata_prefix: Some(metadata_prefix.into()),
            ..Self::default()
        }
    }

    /// Options for a follow-up page, carrying only the token.
    #[must_use]
    pub fn from_resumption_token(token: impl Into<String>) -> Self {
        Self {
            resumption_token: Some(token.into()),
            ..Self::default()
        }
    }
}

/// Options for ListSets.
#[derive(Debug, Clone, Default)]
pub struct ListSetsOptions {
    /// Continuation token from a previous page.
    pub resumption_token: Option<String>,
}

/// Decoded Identify envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifyResponse {
    pub request: RequestEcho,
    pub response_date: String,
    pub identify: IdentifyInfo,
}

/// Decoded ListMetadataFormats envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMetadataFormatsResponse {
    pub request: RequestEcho,
    pub response_date: String,
    pub formats: Vec<MetadataFormat>,
}

/// Decoded GetRecord envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetRecordResponse {
    pub request: RequestEcho,
    pub response_date: String,
    pub record: RawRecord,
}

/// Decoded ListRecords envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRecordsResponse {
    pub request: RequestEcho,
    pub response_date: String,
    pub records: Vec<RawRecord>,
    pub resumption_token: Option<ResumptionToken>,

    /// Non-fatal per-record decode failures, one message per skipped record.
    pub decode_warnings: Vec<String>,
}

impl ListRecordsResponse {
    /// Token for the next page, or `None` when the harvest is complete.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.resumption_token
            .as_ref()
            .and_then(ResumptionToken::as_continuation)
    }
}

/// Decoded ListIdentifiers envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListIdentifiersResponse {
    pub request: RequestEcho,
    pub response_date: String,
    pub headers: Vec<RecordHeader>,
    pub resumption_token: Option<ResumptionToken>,
}

impl ListIdentifiersResponse {
    /// Token for the next page, or `None` when the harvest is complete.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.resumption_token
            .as_ref()
            .and_then(ResumptionToken::as_continuation)
    }
}

/// Decoded ListSets envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSetsResponse {
    pub request: RequestEcho,
    pub response_date: String,
    pub sets: Vec<Set>,
    pub resumption_token: Option<ResumptionToken>,
}

impl ListSetsResponse {
    /// Token for the next page, or `None` when the harvest is complete.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.resumption_token
            .as_ref()
            .and_then(ResumptionToken::as_continuation)
    }
}

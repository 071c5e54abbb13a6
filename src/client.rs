//! OAI-PMH client: one method per protocol verb.
//!
//! Each method performs a single stateless request/response cycle: build
//! parameters, fetch, parse the envelope, classify, and for record-bearing
//! verbs decode the embedded metadata into the caller's target. Pagination
//! state lives with the caller, carried between calls as a resumption token.

use crate::config::{format_utc_datetime, validate_base_url, validate_metadata_prefix};
use crate::decode::{decode_record_into, decode_records_into, FromMetadata, RecordContainer};
use crate::envelope::{
    parse_get_record_response, parse_identify_response, parse_list_identifiers_response,
    parse_list_metadata_formats_response, parse_list_records_response, parse_list_sets_response,
};
use crate::error::Result;
use crate::http::{bytes_to_string, create_client, fetch_bytes};
use crate::types::{
    GetRecordOptions, GetRecordResponse, IdentifyResponse, ListIdentifiersResponse,
    ListMetadataFormatsOptions, ListMetadataFormatsResponse, ListOptions, ListRecordsResponse,
    ListSetsOptions, ListSetsResponse, Verb,
};

/// Client bound to one repository base URL.
///
/// The client holds no mutable state; a shared reference can be used from
/// multiple threads as long as the underlying `reqwest` client allows it
/// (it does).
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Create a client for a repository.
    ///
    /// # Arguments
    /// * `base_url` - The repository's OAI-PMH endpoint, e.g.
    ///   `http://eprints.ecs.soton.ac.uk/cgi/oai2`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;

        Ok(Self {
            http: create_client()?,
            base_url,
        })
    }

    /// The repository base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Identify: the repository's self-description.
    pub fn identify(&self) -> Result<IdentifyResponse> {
        let xml = self.fetch_envelope(Verb::Identify, &[])?;
        parse_identify_response(&xml)
    }

    /// ListMetadataFormats: formats the repository can disseminate.
    pub fn list_metadata_formats(
        &self,
        options: &ListMetadataFormatsOptions,
    ) -> Result<ListMetadataFormatsResponse> {
        let xml = self.fetch_envelope(
            Verb::ListMetadataFormats,
            &[("identifier", options.identifier.clone())],
        )?;
        parse_list_metadata_formats_response(&xml)
    }

    /// GetRecord: one record, with its metadata decoded into `target`.
    ///
    /// On any failure the target keeps the value it was passed with.
    pub fn get_record<T: FromMetadata>(
        &self,
        options: &GetRecordOptions,
        target: &mut T,
    ) -> Result<GetRecordResponse> {
        validate_metadata_prefix(&options.metadata_prefix)?;

        let xml = self.fetch_envelope(
            Verb::GetRecord,
            &[
                ("identifier", Some(options.identifier.clone())),
                ("metadataPrefix", Some(options.metadata_prefix.clone())),
            ],
        )?;

        let response = parse_get_record_response(&xml)?;
        decode_record_into(&response.record, target)?;
        Ok(response)
    }

    /// ListRecords: one page of records, each decoded into the container.
    ///
    /// Records that fail to decode keep their slot with a default value;
    /// the failures are reported on `decode_warnings` of the response.
    pub fn list_records<C: RecordContainer>(
        &self,
        options: &ListOptions,
        container: &mut C,
    ) -> Result<ListRecordsResponse> {
        let xml = self.fetch_envelope(Verb::ListRecords, &list_parameters(options)?)?;

        let mut response = parse_list_records_response(&xml)?;
        response.decode_warnings = decode_records_into(&response.records, container);
        for warning in &response.decode_warnings {
            tracing::warn!(warning = %warning, "Record metadata failed to decode");
        }
        Ok(response)
    }

    /// ListIdentifiers: one page of record headers, no metadata.
    pub fn list_identifiers(&self, options: &ListOptions) -> Result<ListIdentifiersResponse> {
        let xml = self.fetch_envelope(Verb::ListIdentifiers, &list_parameters(options)?)?;
        parse_list_identifiers_response(&xml)
    }

    /// ListSets: one page of the repository's set hierarchy.
    pub fn list_sets(&self, options: &ListSetsOptions) -> Result<ListSetsResponse> {
        let xml = self.fetch_envelope(
            Verb::ListSets,
            &[("resumptionToken", options.resumption_token.clone())],
        )?;
        parse_list_sets_response(&xml)
    }

    /// Build the final parameter list, fetch, and return the body as text.
    fn fetch_envelope(
        &self,
        verb: Verb,
        options: &[(&'static str, Option<String>)],
    ) -> Result<String> {
        let params = prepare_parameters(verb, options);
        tracing::debug!(verb = %verb, params = ?params, "Requesting");

        let bytes = fetch_bytes(&self.http, &self.base_url, &params)?;
        Ok(bytes_to_string(&bytes, verb.as_str()))
    }
}

/// Assemble request parameters: the verb first, then every option that has a
/// non-empty value. Unset and empty options are omitted entirely, never sent
/// as empty strings.
fn prepare_parameters(
    verb: Verb,
    options: &[(&'static str, Option<String>)],
) -> Vec<(&'static str, String)> {
    let mut params = vec![("verb", verb.as_str().to_string())];

    for (key, value) in options {
        if let Some(value) = value {
            if !value.is_empty() {
                params.push((key, value.clone()));
            }
        }
    }

    params
}

/// Parameters shared by ListRecords and ListIdentifiers.
fn list_parameters(options: &ListOptions) -> Result<Vec<(&'static str, Option<String>)>> {
    if let Some(prefix) = &options.metadata_prefix {
        validate_metadata_prefix(prefix)?;
    }
    if options.resumption_token.is_some()
        && (options.metadata_prefix.is_some()
            || options.from.is_some()
            || options.until.is_some()
            || options.set.is_some())
    {
        // The protocol makes the token exclusive with filter parameters;
        // the repository will reject the combination with badArgument.
        tracing::warn!("resumptionToken combined with filter parameters");
    }

    Ok(vec![
        ("metadataPrefix", options.metadata_prefix.clone()),
        ("from", format_utc_datetime(options.from)),
        ("until", format_utc_datetime(options.until)),
        ("set", options.set.clone()),
        ("resumptionToken", options.resumption_token.clone()),
    ])
}

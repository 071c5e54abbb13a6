//! Response envelope parsing and protocol error classification.
//!
//! Every verb returns the same fixed-shape envelope: an `OAI-PMH` root with
//! a `<request>` echo, a `<responseDate>`, and either an `<error>` element or
//! a verb-specific payload. A well-behaved repository sends exactly one of
//! the two, but the classifier checks the error block explicitly regardless
//! of what else is present, because error signaling is out-of-band from HTTP
//! status (errors arrive as HTTP 200).
//!
//! Missing optional sub-elements decode to their zero values rather than
//! failing, matching how repositories in the wild omit fields.

use roxmltree::{Document, Node};

use crate::error::{ErrorCode, HarvestError, ProtocolError, Result};
use crate::types::{
    GetRecordResponse, IdentifyInfo, IdentifyResponse, ListIdentifiersResponse,
    ListMetadataFormatsResponse, ListRecordsResponse, ListSetsResponse, MetadataFormat, RawRecord,
    RecordHeader, RequestEcho, ResumptionToken, Set,
};
use crate::xml::{find_by_path, find_child, find_children, get_tag_name, get_text, inner_xml};

/// Common envelope fields shared by all six verbs.
struct Envelope<'a, 'input> {
    root: Node<'a, 'input>,
    request: RequestEcho,
    response_date: String,
}

/// Validate the root element and extract the common fields, classifying the
/// error block before any payload is looked at.
fn open_envelope<'a, 'input>(doc: &'a Document<'input>) -> Result<Envelope<'a, 'input>> {
    let root = doc.root_element();
    if get_tag_name(root) != "OAI-PMH" {
        return Err(HarvestError::MissingElement {
            element: "OAI-PMH".to_string(),
            context: format!("response with root <{}>", get_tag_name(root)),
        });
    }

    let request = parse_request_echo(root);
    let response_date = find_child(root, "responseDate")
        .map(get_text)
        .unwrap_or_default();

    if let Some(error) = classify(root, &response_date) {
        return Err(error.into());
    }

    Ok(Envelope {
        root,
        request,
        response_date,
    })
}

/// Extract the `<request>` echo.
///
/// The verb attribute is absent when the repository rejected the request, so
/// its absence is not an error.
fn parse_request_echo(root: Node<'_, '_>) -> RequestEcho {
    match find_child(root, "request") {
        Some(request) => RequestEcho {
            base_url: get_text(request),
            verb: request.attribute("verb").map(str::to_string),
        },
        None => RequestEcho::default(),
    }
}

/// Classify the envelope: `Some(ProtocolError)` when the error block is
/// non-empty, `None` for success.
///
/// The block counts as non-empty when either the code attribute or the
/// message text is non-empty. This runs identically for every verb.
fn classify(root: Node<'_, '_>, response_date: &str) -> Option<ProtocolError> {
    let error = find_child(root, "error")?;
    let code = error.attribute("code").unwrap_or_default();
    let message = get_text(error);

    if code.is_empty() && message.is_empty() {
        return None;
    }

    Some(ProtocolError {
        code: ErrorCode::from_code(code),
        message,
        response_date: response_date.to_string(),
    })
}

/// Parse an Identify envelope.
pub fn parse_identify_response(xml: &str) -> Result<IdentifyResponse> {
    let doc = Document::parse(xml)?;
    let envelope = open_envelope(&doc)?;

    let identify = find_child(envelope.root, "Identify")
        .map(parse_identify_info)
        .unwrap_or_default();

    Ok(IdentifyResponse {
        request: envelope.request,
        response_date: envelope.response_date,
        identify,
    })
}

/// Parse a ListMetadataFormats envelope.
pub fn parse_list_metadata_formats_response(xml: &str) -> Result<ListMetadataFormatsResponse> {
    let doc = Document::parse(xml)?;
    let envelope = open_envelope(&doc)?;

    let formats = match find_child(envelope.root, "ListMetadataFormats") {
        Some(payload) => find_children(payload, "metadataFormat")
            .map(parse_metadata_format)
            .collect(),
        None => Vec::new(),
    };

    Ok(ListMetadataFormatsResponse {
        request: envelope.request,
        response_date: envelope.response_date,
        formats,
    })
}

/// Parse a GetRecord envelope.
pub fn parse_get_record_response(xml: &str) -> Result<GetRecordResponse> {
    let doc = Document::parse(xml)?;
    let envelope = open_envelope(&doc)?;

    let record = find_by_path(envelope.root, "GetRecord/record")
        .map(parse_record)
        .unwrap_or_default();

    Ok(GetRecordResponse {
        request: envelope.request,
        response_date: envelope.response_date,
        record,
    })
}

/// Parse a ListRecords envelope.
pub fn parse_list_records_response(xml: &str) -> Result<ListRecordsResponse> {
    let doc = Document::parse(xml)?;
    let envelope = open_envelope(&doc)?;

    let (records, resumption_token) = match find_child(envelope.root, "ListRecords") {
        Some(payload) => (
            find_children(payload, "record").map(parse_record).collect(),
            parse_resumption_token(payload),
        ),
        None => (Vec::new(), None),
    };

    Ok(ListRecordsResponse {
        request: envelope.request,
        response_date: envelope.response_date,
        records,
        resumption_token,
        decode_warnings: Vec::new(),
    })
}

/// Parse a ListIdentifiers envelope.
pub fn parse_list_identifiers_response(xml: &str) -> Result<ListIdentifiersResponse> {
    let doc = Document::parse(xml)?;
    let envelope = open_envelope(&doc)?;

    let (headers, resumption_token) = match find_child(envelope.root, "ListIdentifiers") {
        Some(payload) => (
            find_children(payload, "header").map(parse_header).collect(),
            parse_resumption_token(payload),
        ),
        None => (Vec::new(), None),
    };

    Ok(ListIdentifiersResponse {
        request: envelope.request,
        response_date: envelope.response_date,
        headers,
        resumption_token,
    })
}

/// Parse a ListSets envelope.
pub fn parse_list_sets_response(xml: &str) -> Result<ListSetsResponse> {
    let doc = Document::parse(xml)?;
    let envelope = open_envelope(&doc)?;

    let (sets, resumption_token) = match find_child(envelope.root, "ListSets") {
        Some(payload) => (
            find_children(payload, "set").map(parse_set).collect(),
            parse_resumption_token(payload),
        ),
        None => (Vec::new(), None),
    };

    Ok(ListSetsResponse {
        request: envelope.request,
        response_date: envelope.response_date,
        sets,
        resumption_token,
    })
}

/// Extract the `<resumptionToken>` sibling of a list payload's entries.
///
/// An element with empty text is kept as a present-but-empty token; the
/// distinction between "absent" and "empty" is left to the caller's
/// `next_token` helpers, which treat both as completion.
fn parse_resumption_token(payload: Node<'_, '_>) -> Option<ResumptionToken> {
    find_child(payload, "resumptionToken").map(|token| ResumptionToken {
        value: get_text(token),
        expiration_date: token.attribute("expirationDate").map(str::to_string),
    })
}

fn parse_identify_info(identify: Node<'_, '_>) -> IdentifyInfo {
    let text_of = |tag| find_child(identify, tag).map(get_text).unwrap_or_default();

    IdentifyInfo {
        repository_name: text_of("repositoryName"),
        base_url: text_of("baseURL"),
        protocol_version: text_of("protocolVersion"),
        earliest_datestamp: text_of("earliestDatestamp"),
        deleted_record: text_of("deletedRecord"),
        granularity: text_of("granularity"),
        admin_email: text_of("adminEmail"),
        compression: text_of("compression"),
    }
}

fn parse_metadata_format(format: Node<'_, '_>) -> MetadataFormat {
    let text_of = |tag| find_child(format, tag).map(get_text).unwrap_or_default();

    MetadataFormat {
        metadata_prefix: text_of("metadataPrefix"),
        schema: text_of("schema"),
        metadata_namespace: text_of("metadataNamespace"),
    }
}

fn parse_set(set: Node<'_, '_>) -> Set {
    Set {
        spec: find_child(set, "setSpec").map(get_text).unwrap_or_default(),
        name: find_child(set, "setName").map(get_text).unwrap_or_default(),
    }
}

fn parse_header(header: Node<'_, '_>) -> RecordHeader {
    RecordHeader {
        identifier: find_child(header, "identifier")
            .map(get_text)
            .unwrap_or_default(),
        datestamp: find_child(header, "datestamp")
            .map(get_text)
            .unwrap_or_default(),
        set_specs: find_children(header, "setSpec").map(get_text).collect(),
        status: header.attribute("status").map(str::to_string),
    }
}

fn parse_record(record: Node<'_, '_>) -> RawRecord {
    RawRecord {
        header: find_child(record, "header")
            .map(parse_header)
            .unwrap_or_default(),
        metadata: find_child(record, "metadata")
            .map(inner_xml)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NS: &str = r#"xmlns="http://www.openarchives.org/OAI/2.0/""#;

    fn envelope(body: &str) -> String {
        format!(
            r#"<?xml version='1.0' encoding='UTF-8'?>
<OAI-PMH {NS}>
  <responseDate>2016-03-26T18:17:43Z</responseDate>
  {body}
</OAI-PMH>"#
        )
    }

    #[test]
    fn test_classifier_error_with_code_and_message() {
        let xml = envelope(
            r#"<request>http://example.org/oai</request>
  <error code="badArgument">Unrecognised argument 'x'</error>"#,
        );

        let err = parse_identify_response(&xml).unwrap_err();
        let protocol = err.as_protocol().expect("protocol error");
        assert_eq!(protocol.code, ErrorCode::BadArgument);
        assert_eq!(protocol.message, "Unrecognised argument 'x'");
        assert_eq!(protocol.response_date, "2016-03-26T18:17:43Z");
    }

    #[test]
    fn test_classifier_error_with_code_only() {
        let xml = envelope(r#"<error code="noRecordsMatch"/>"#);

        let err = parse_list_records_response(&xml).unwrap_err();
        let protocol = err.as_protocol().expect("protocol error");
        assert_eq!(protocol.code, ErrorCode::NoRecordsMatch);
        assert_eq!(protocol.message, "");
    }

    #[test]
    fn test_classifier_error_with_message_only() {
        let xml = envelope(r#"<error>something went wrong</error>"#);

        let err = parse_identify_response(&xml).unwrap_err();
        let protocol = err.as_protocol().expect("protocol error");
        assert_eq!(protocol.code, ErrorCode::Other(String::new()));
        assert_eq!(protocol.message, "something went wrong");
    }

    #[test]
    fn test_classifier_empty_error_element_is_success() {
        let xml = envelope(r#"<request verb="Identify">http://example.org/oai</request><error/>"#);

        let response = parse_identify_response(&xml).expect("success");
        assert_eq!(response.request.verb.as_deref(), Some("Identify"));
    }

    #[test]
    fn test_classifier_error_wins_over_populated_payload() {
        // Ill-behaved server sending both error and payload: error wins.
        let xml = envelope(
            r#"<error code="badArgument">bad</error>
  <ListSets><set><setSpec>math</setSpec></set></ListSets>"#,
        );

        assert!(parse_list_sets_response(&xml).is_err());
    }

    #[test]
    fn test_request_echo_without_verb() {
        let xml = envelope(
            r#"<request>http://example.org/oai</request>
  <error code="badVerb">Illegal verb</error>"#,
        );

        // Verb attribute absent on rejected requests must not fail parsing.
        let err = parse_identify_response(&xml).unwrap_err();
        assert!(err.as_protocol().is_some());
    }

    #[test]
    fn test_non_envelope_root_rejected() {
        let err = parse_identify_response("<html>not oai</html>").unwrap_err();
        assert!(matches!(err, HarvestError::MissingElement { .. }));
    }

    #[test]
    fn test_malformed_xml_rejected() {
        let err = parse_identify_response("<OAI-PMH><unclosed>").unwrap_err();
        assert!(matches!(err, HarvestError::XmlParse(_)));
    }

    #[test]
    fn test_parse_identify() {
        let xml = envelope(
            r#"<request verb="Identify">http://example.org/oai</request>
  <Identify>
    <repositoryName>ECS EPrints Repository</repositoryName>
    <baseURL>http://example.org/oai</baseURL>
    <protocolVersion>2.0</protocolVersion>
    <adminEmail>admin@example.org</adminEmail>
    <earliestDatestamp>2011-09-23T08:52:33Z</earliestDatestamp>
    <deletedRecord>persistent</deletedRecord>
    <granularity>YYYY-MM-DDThh:mm:ssZ</granularity>
    <compression>gzip</compression>
  </Identify>"#,
        );

        let response = parse_identify_response(&xml).expect("success");
        assert_eq!(response.identify.repository_name, "ECS EPrints Repository");
        assert_eq!(response.identify.protocol_version, "2.0");
        assert_eq!(response.identify.deleted_record, "persistent");
        assert_eq!(response.identify.compression, "gzip");
        assert_eq!(response.response_date, "2016-03-26T18:17:43Z");
    }

    #[test]
    fn test_parse_identify_missing_optional_fields() {
        let xml = envelope(
            r#"<request verb="Identify">http://example.org/oai</request>
  <Identify><repositoryName>Minimal</repositoryName></Identify>"#,
        );

        let response = parse_identify_response(&xml).expect("success");
        assert_eq!(response.identify.repository_name, "Minimal");
        assert_eq!(response.identify.compression, "");
        assert_eq!(response.identify.admin_email, "");
    }

    #[test]
    fn test_parse_metadata_formats() {
        let xml = envelope(
            r#"<request verb="ListMetadataFormats">http://example.org/oai</request>
  <ListMetadataFormats>
    <metadataFormat>
      <metadataPrefix>oai_bibl</metadataPrefix>
      <schema>http://www.openarchives.org/OAI/2.0/oai_dc.xsd</schema>
      <metadataNamespace>http://www.openarchives.org/OAI/2.0/oai_dc/</metadataNamespace>
    </metadataFormat>
    <metadataFormat>
      <metadataPrefix>oai_dc</metadataPrefix>
      <schema>http://www.openarchives.org/OAI/2.0/oai_dc.xsd</schema>
      <metadataNamespace>http://www.openarchives.org/OAI/2.0/oai_dc/</metadataNamespace>
    </metadataFormat>
  </ListMetadataFormats>"#,
        );

        let response = parse_list_metadata_formats_response(&xml).expect("success");
        assert_eq!(response.formats.len(), 2);
        assert_eq!(response.formats[0].metadata_prefix, "oai_bibl");
        assert_eq!(response.formats[1].metadata_prefix, "oai_dc");
    }

    #[test]
    fn test_parse_get_record() {
        let xml = envelope(
            r#"<request verb="GetRecord">http://example.org/oai</request>
  <GetRecord>
    <record>
      <header>
        <identifier>oai:example.org:1</identifier>
        <datestamp>2011-09-23T10:22:12Z</datestamp>
        <setSpec>math</setSpec>
        <setSpec>physics</setSpec>
      </header>
      <metadata><dc><title>A title</title></dc></metadata>
    </record>
  </GetRecord>"#,
        );

        let response = parse_get_record_response(&xml).expect("success");
        assert_eq!(response.record.header.identifier, "oai:example.org:1");
        assert_eq!(
            response.record.header.set_specs,
            vec!["math".to_string(), "physics".to_string()]
        );
        assert_eq!(response.record.metadata, "<dc><title>A title</title></dc>");
    }

    #[test]
    fn test_parse_deleted_record() {
        let xml = envelope(
            r#"<request verb="GetRecord">http://example.org/oai</request>
  <GetRecord>
    <record>
      <header status="deleted">
        <identifier>oai:example.org:2</identifier>
        <datestamp>2012-01-01T00:00:00Z</datestamp>
      </header>
    </record>
  </GetRecord>"#,
        );

        let response = parse_get_record_response(&xml).expect("success");
        assert!(response.record.header.is_deleted());
        assert_eq!(response.record.metadata, "");
    }

    #[test]
    fn test_parse_list_records_with_token() {
        let xml = envelope(
            r#"<request verb="ListRecords">http://example.org/oai</request>
  <ListRecords>
    <record>
      <header><identifier>oai:example.org:1</identifier></header>
      <metadata><dc><title>One</title></dc></metadata>
    </record>
    <record>
      <header><identifier>oai:example.org:2</identifier></header>
      <metadata><dc><title>Two</title></dc></metadata>
    </record>
    <resumptionToken expirationDate="2016-03-27T00:00:00Z">cursor!200</resumptionToken>
  </ListRecords>"#,
        );

        let response = parse_list_records_response(&xml).expect("success");
        assert_eq!(response.records.len(), 2);
        assert_eq!(response.records[0].header.identifier, "oai:example.org:1");
        assert_eq!(response.records[1].header.identifier, "oai:example.org:2");

        let token = response.resumption_token.clone().expect("token");
        assert_eq!(token.value, "cursor!200");
        assert_eq!(
            token.expiration_date.as_deref(),
            Some("2016-03-27T00:00:00Z")
        );
        assert_eq!(response.next_token(), Some("cursor!200"));
    }

    #[test]
    fn test_parse_list_records_final_page() {
        let xml = envelope(
            r#"<request verb="ListRecords">http://example.org/oai</request>
  <ListRecords>
    <record>
      <header><identifier>oai:example.org:9</identifier></header>
      <metadata><dc/></metadata>
    </record>
    <resumptionToken/>
  </ListRecords>"#,
        );

        let response = parse_list_records_response(&xml).expect("success");
        assert!(response.resumption_token.is_some());
        assert_eq!(response.next_token(), None);
    }

    #[test]
    fn test_parse_list_identifiers() {
        let xml = envelope(
            r#"<request verb="ListIdentifiers">http://example.org/oai</request>
  <ListIdentifiers>
    <header>
      <identifier>oai:example.org:1</identifier>
      <datestamp>2011-09-23T10:22:12Z</datestamp>
    </header>
    <header status="deleted">
      <identifier>oai:example.org:2</identifier>
    </header>
    <resumptionToken>next-page</resumptionToken>
  </ListIdentifiers>"#,
        );

        let response = parse_list_identifiers_response(&xml).expect("success");
        assert_eq!(response.headers.len(), 2);
        assert!(!response.headers[0].is_deleted());
        assert!(response.headers[1].is_deleted());
        assert_eq!(response.next_token(), Some("next-page"));
    }

    #[test]
    fn test_parse_list_sets() {
        let xml = envelope(
            r#"<request verb="ListSets">http://example.org/oai</request>
  <ListSets>
    <set><setSpec>math</setSpec><setName>Mathematics</setName></set>
    <set><setSpec>physics</setSpec><setName>Physics</setName></set>
  </ListSets>"#,
        );

        let response = parse_list_sets_response(&xml).expect("success");
        assert_eq!(response.sets.len(), 2);
        assert_eq!(response.sets[0].spec, "math");
        assert_eq!(response.sets[0].name, "Mathematics");
        assert_eq!(response.next_token(), None);
    }

    #[test]
    fn test_missing_payload_yields_zero_values() {
        // Neither an error nor a payload: tolerated as an empty response
        // rather than rejected, since the classifier alone decides failure.
        let xml = envelope(r#"<request verb="ListRecords">http://example.org/oai</request>"#);

        let response = parse_list_records_response(&xml).expect("success");
        assert!(response.records.is_empty());
        assert!(response.resumption_token.is_none());
    }
}

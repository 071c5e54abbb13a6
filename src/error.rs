//! Error types for the harvester.
//!
//! The error taxonomy separates four distinct failure classes: transport
//! (`Http`/`Status`), markup (`XmlParse`), schema (`MissingElement`), and
//! protocol (`Protocol` - an error the repository itself reported inside a
//! well-formed envelope).

use thiserror::Error;

/// Error codes defined by the OAI-PMH 2.0 specification.
///
/// Codes outside the specification are preserved verbatim in `Other` rather
/// than rejected, since the value is only ever reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// Illegal or missing request argument.
    BadArgument,

    /// The resumption token is invalid or expired.
    BadResumptionToken,

    /// Illegal or missing verb.
    BadVerb,

    /// The metadata format is not supported for the item.
    CannotDisseminateFormat,

    /// The identifier is unknown to the repository.
    IdDoesNotExist,

    /// No records match the request filters.
    NoRecordsMatch,

    /// No metadata formats are available for the item.
    NoMetadataFormats,

    /// The repository does not support sets.
    NoSetHierarchy,

    /// Any code not defined by the specification.
    Other(String),
}

impl ErrorCode {
    /// Parse from the `code` attribute of an `<error>` element.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "badArgument" => Self::BadArgument,
            "badResumptionToken" => Self::BadResumptionToken,
            "badVerb" => Self::BadVerb,
            "cannotDisseminateFormat" => Self::CannotDisseminateFormat,
            "idDoesNotExist" => Self::IdDoesNotExist,
            "noRecordsMatch" => Self::NoRecordsMatch,
            "noMetadataFormats" => Self::NoMetadataFormats,
            "noSetHierarchy" => Self::NoSetHierarchy,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the wire-format code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BadArgument => "badArgument",
            Self::BadResumptionToken => "badResumptionToken",
            Self::BadVerb => "badVerb",
            Self::CannotDisseminateFormat => "cannotDisseminateFormat",
            Self::IdDoesNotExist => "idDoesNotExist",
            Self::NoRecordsMatch => "noRecordsMatch",
            Self::NoMetadataFormats => "noMetadataFormats",
            Self::NoSetHierarchy => "noSetHierarchy",
            Self::Other(code) => code,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by the repository inside the response envelope.
///
/// OAI-PMH signals errors out-of-band from HTTP status: a failed request
/// still arrives as HTTP 200 carrying an `<error>` element. The envelope's
/// `responseDate` travels with the error so callers can log context even
/// though the payload itself is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProtocolError {
    /// Error code from the `code` attribute.
    pub code: ErrorCode,

    /// Human-readable message, the element's text content verbatim.
    pub message: String,

    /// The envelope's `responseDate`, for logging.
    pub response_date: String,
}

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Base URL is not a usable http(s) URL.
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),

    /// Metadata prefix contains characters outside the protocol grammar.
    #[error("Invalid metadata prefix: '{0}'. Allowed characters: A-Za-z0-9 and -_.!~*'()")]
    InvalidMetadataPrefix(String),

    /// Date filter argument could not be parsed.
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ")]
    InvalidDate(String),

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Repository answered with a non-success HTTP status.
    #[error("Unsuccessful request: HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body or metadata blob is not well-formed XML.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// A structurally required XML element is missing.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// The repository reported a protocol-level error.
    #[error("OAI-PMH error: {0}")]
    Protocol(#[from] ProtocolError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),
}

impl HarvestError {
    /// The protocol error inside this error, if that is what it is.
    #[must_use]
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

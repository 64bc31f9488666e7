use std::fmt;

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// The error type for cloudapi operations
#[derive(Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    body: Option<Bytes>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input is invalid (empty credentials, unsupported verb, empty url, etc.)
    ArgumentInvalid,

    /// Configuration error (missing endpoint, unsupported scheme)
    ConfigInvalid,

    /// No usable credential could be loaded
    CredentialInvalid,

    /// Connection or protocol level failure while talking to the service
    Transport,

    /// Too many consecutive redirects
    RedirectExhausted,

    /// The service answered with a non-success status
    Remote,

    /// A success response could not be decoded
    Decode,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the raw response body.
    ///
    /// The body is only visible through `Debug` and [`Error::body`], never in `Display`.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the response status if this error comes from a service response.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Get the raw response body if there is one.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Check if this is an error reported by the remote service.
    pub fn is_remote(&self) -> bool {
        self.kind == ErrorKind::Remote
    }
}

// Convenience constructors
impl Error {
    /// Create an argument invalid error
    pub fn argument_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArgumentInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a redirect exhausted error
    pub fn redirect_exhausted(max_redirects: usize) -> Self {
        Self::new(
            ErrorKind::RedirectExhausted,
            format!("gave up after {max_redirects} redirects"),
        )
    }

    /// Create a remote error from a service response.
    ///
    /// The message is `"{code} {reason}\n{body}"`, the body is passed through verbatim.
    pub fn remote(status: StatusCode, reason: &str, body: Bytes) -> Self {
        let message = format!(
            "{} {}\n{}",
            status.as_u16(),
            reason,
            String::from_utf8_lossy(&body)
        );

        let mut err = Self::new(ErrorKind::Remote, message).with_body(body);
        err.status = Some(status);
        err
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Error");
        d.field("kind", &self.kind).field("message", &self.message);
        if let Some(status) = &self.status {
            d.field("status", status);
        }
        if let Some(body) = &self.body {
            d.field("body", &String::from_utf8_lossy(body));
        }
        if let Some(source) = &self.source {
            d.field("source", source);
        }
        d.finish()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ArgumentInvalid => write!(f, "invalid argument"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::RedirectExhausted => write!(f, "redirects exhausted"),
            ErrorKind::Remote => write!(f, "remote error"),
            ErrorKind::Decode => write!(f, "decode error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::argument_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::argument_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::argument_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::argument_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::argument_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::argument_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::argument_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

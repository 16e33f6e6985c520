//! Error types for the smart home skill.

use thiserror::Error;

/// Alexa error response types. The vocabulary is fixed by the Smart Home
/// v3 protocol and serialized verbatim into `ErrorResponse` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    InvalidDirective,
    InvalidValue,
    NoSuchEndpoint,
    EndpointUnreachable,
    InvalidAuthorizationCredential,
    InternalError,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidDirective => "INVALID_DIRECTIVE",
            ErrorType::InvalidValue => "INVALID_VALUE",
            ErrorType::NoSuchEndpoint => "NO_SUCH_ENDPOINT",
            ErrorType::EndpointUnreachable => "ENDPOINT_UNREACHABLE",
            ErrorType::InvalidAuthorizationCredential => "INVALID_AUTHORIZATION_CREDENTIAL",
            ErrorType::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Failures from the Gooee cloud API, classified at the client boundary.
#[derive(Error, Debug)]
pub enum VendorError {
    /// Transport failure or timeout reaching the vendor.
    #[error("vendor unreachable: {0}")]
    Unreachable(String),

    /// Vendor rejected the access token (401/403).
    #[error("vendor rejected credentials")]
    AuthRejected,

    /// Vendor returned a body we could not decode.
    #[error("malformed vendor response: {0}")]
    MalformedResponse(String),

    /// No device with the given id.
    #[error("no such device: {0}")]
    DeviceNotFound(String),

    /// Vendor rejected the requested value (e.g. out-of-range level).
    #[error("vendor rejected value: {0}")]
    ValueRejected(String),
}

/// Failures acquiring or refreshing an access token.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no refresh token configured")]
    MissingRefreshToken,

    /// Token endpoint answered but refused the exchange (e.g. invalid_grant).
    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    #[error("token endpoint unreachable: {0}")]
    Transport(String),
}

/// A handler failure, carrying the protocol error type surfaced to Alexa.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HandlerError {
    pub error_type: ErrorType,
    pub message: String,
}

impl HandlerError {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }
}

impl From<VendorError> for HandlerError {
    fn from(err: VendorError) -> Self {
        let error_type = match &err {
            VendorError::Unreachable(_) => ErrorType::EndpointUnreachable,
            VendorError::AuthRejected => ErrorType::InvalidAuthorizationCredential,
            VendorError::MalformedResponse(_) => ErrorType::InternalError,
            VendorError::DeviceNotFound(_) => ErrorType::NoSuchEndpoint,
            VendorError::ValueRejected(_) => ErrorType::InvalidValue,
        };
        Self::new(error_type, err.to_string())
    }
}

impl From<AuthError> for HandlerError {
    fn from(err: AuthError) -> Self {
        Self::new(ErrorType::InvalidAuthorizationCredential, err.to_string())
    }
}

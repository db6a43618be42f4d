use thiserror::Error;

/// Malformed request payloads. Upload write failures are not represented here:
/// the decoder drops the affected field and keeps going.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("multipart content type without boundary parameter")]
    MissingBoundary,
    #[error("multipart body has no opening boundary")]
    NoOpeningBoundary,
    #[error("multipart body truncated: {0}")]
    Truncated(&'static str),
    #[error("content-disposition without field name")]
    MissingFieldName,
}

pub type DecodeResult<T> = Result<T, DecodeError>;

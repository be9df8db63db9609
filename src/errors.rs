//! Errors specific to revocation vectors and CTng certificate extensions
use ed25519_dalek as ed25519;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
/// Enum of errors associated with revocation state, announcements and extensions
pub enum Error {
    /// A revocation identifier lies outside of the vector capacity.
    #[error("Revocation index {index} out of range for vector of size {size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Capacity of the vector.
        size: usize,
    },
    /// Serialisation of a bit vector, announcement or extension failed.
    #[error("Encoding error: {0}")]
    Encoding(String),
    /// A byte string does not follow the delta codec layout.
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
    /// The CTng extension attribute was found, but its value cannot be decoded.
    #[error("Malformed extension: {0}")]
    MalformedExtension(String),
    /// The requested period or subject is unknown.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The signing capability failed.
    #[error("Signing error: {0}")]
    Signing(String),
    /// The certificate does not carry the CTng extension attribute.
    #[error("Certificate does not carry the CTng extension")]
    MissingExtension,
    /// Two bit vectors of different length were combined.
    #[error("Bit vector length mismatch: {0} != {1}")]
    LengthMismatch(usize, usize),
    /// This error occurs when a base signature (ed25519) is invalid.
    #[error("Ed25519 signature error: {0}")]
    Ed25519Signature(String),
    /// Error occurs when the size of the secret key is not the expected.
    #[error("Invalid secret key size: {0}")]
    InvalidSecretKeySize(usize),
    /// Error occurs when the size of the public key is not the expected.
    #[error("Invalid public key size: {0}")]
    InvalidPublicKeySize(usize),
    /// Error occurs when the size of the signature is not the expected.
    #[error("Invalid signature size: {0}")]
    InvalidSignatureSize(usize),
    /// The textual form of a signature is not valid hex.
    #[error("Invalid signature encoding: {0}")]
    SignatureEncoding(String),
    /// A gossip envelope does not carry the expected kind of payload.
    #[error("Unexpected gossip object: {0}")]
    UnexpectedGossip(String),
    /// A certificate with the same subject is already in the pool.
    #[error("Duplicate subject: {0}")]
    DuplicateSubject(String),
    /// A record id does not fit the platform index type.
    #[error("Record id {0} cannot be used as a revocation index")]
    InvalidRid(u64),
    /// A lock guarding shared CA state was poisoned by a panicking holder.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
    /// A configuration value is outside of its accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<ed25519::SignatureError> for Error {
    fn from(sig: ed25519::SignatureError) -> Error {
        Error::Ed25519Signature(format!("{sig}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Encoding(err.to_string())
    }
}

impl From<x509_cert::der::Error> for Error {
    fn from(err: x509_cert::der::Error) -> Error {
        Error::Encoding(err.to_string())
    }
}

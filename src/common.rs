//! Structures common to the revocation and extension protocols
use crate::errors::Error;
use std::fmt;
use std::str::FromStr;

/// Application tag carried by every CTng gossip envelope.
pub const APPLICATION: &str = "CTng";

/// Payload kind tag identifying a certificate revocation vector announcement.
pub const CRV_TAG: &str = "CRV";

/// Number of revocation slots of a CA when nothing else is configured.
pub const DEFAULT_CRV_SIZE: usize = 700;

/// Signature produced by an [`EntitySigner`](crate::traits::EntitySigner). The raw
/// bytes are scheme specific; on the wire a signature travels as a lowercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(pub(crate) Vec<u8>);

impl Signature {
    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Signature(bytes.to_vec())
    }

    /// Return `Self` as its byte representation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s)
            .map(Signature)
            .map_err(|e| Error::SignatureEncoding(e.to_string()))
    }
}

//! Ed25519 instance of the signing capability. A CA (or a logger) is identified
//! by its signer id and holds a single ed25519 key which signs both the chained
//! revocation hash and the outer gossip message.
use crate::common::Signature;
use crate::errors::Error;
use crate::traits::{EntitySigner, SignatureVerifier};
use ed25519_dalek::{
    Signature as EdSignature, Signer, SigningKey, VerifyingKey, SIGNATURE_LENGTH,
};
pub use ed25519_dalek::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use x509_cert::der::oid::ObjectIdentifier;
use x509_cert::spki::AlgorithmIdentifierOwned;
use zeroize::Zeroize;

/// `id-Ed25519` from RFC 8410.
pub const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// Signing entity backed by an ed25519 key.
pub struct Ed25519Signer {
    id: String,
    key: SigningKey,
}

/// Verifier counterpart of [`Ed25519Signer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Verifier(pub(crate) VerifyingKey);

impl Ed25519Signer {
    /// Function that takes a mutable seed, and builds the signer. It overwrites
    /// the seed with zeroes.
    pub fn from_seed(id: &str, seed: &mut [u8]) -> Result<Self, Error> {
        if seed.len() != SECRET_KEY_LENGTH {
            return Err(Error::InvalidSecretKeySize(seed.len()));
        }

        let mut secret = [0u8; SECRET_KEY_LENGTH];
        secret.copy_from_slice(seed);
        let key = SigningKey::from_bytes(&secret);
        secret.zeroize();
        seed.zeroize();

        Ok(Self {
            id: id.to_owned(),
            key,
        })
    }

    /// Verifier for the signatures of this signer.
    pub fn verifier(&self) -> Ed25519Verifier {
        Ed25519Verifier(self.key.verifying_key())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("id", &self.id)
            .field("public", &hex::encode(self.key.verifying_key().as_bytes()))
            .finish()
    }
}

impl EntitySigner for Ed25519Signer {
    fn signer_id(&self) -> &str {
        &self.id
    }

    fn scheme(&self) -> &'static str {
        "Ed25519"
    }

    fn algorithm(&self) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: ED25519_OID,
            parameters: None,
        }
    }

    fn sign(&self, m: &[u8]) -> Result<Signature, Error> {
        let sigma = self
            .key
            .try_sign(m)
            .map_err(|e| Error::Signing(e.to_string()))?;
        Ok(Signature::from_bytes(&sigma.to_bytes()))
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, m: &[u8], signature: &Signature) -> Result<(), Error> {
        if signature.as_bytes().len() != SIGNATURE_LENGTH {
            return Err(Error::InvalidSignatureSize(signature.as_bytes().len()));
        }
        let sigma = EdSignature::from_slice(signature.as_bytes())?;
        self.0.verify_strict(m, &sigma).map_err(Error::from)
    }
}

impl Ed25519Verifier {
    /// Size of an ed25519 public key
    pub const SIZE: usize = PUBLIC_KEY_LENGTH;

    /// Convert a byte array into a verifier
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::SIZE {
            return Err(Error::InvalidPublicKeySize(bytes.len()));
        }

        let mut key = [0u8; Self::SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(VerifyingKey::from_bytes(&key)?))
    }

    /// Return the public key as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

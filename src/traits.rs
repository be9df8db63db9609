//! Traits that define the hash and signature capabilities consumed by the CA
use crate::common::Signature;
use crate::errors::Error;
use x509_cert::spki::AlgorithmIdentifierOwned;

/// Trait that defines the digest used in the revocation hash chain.
///
/// Every party of the protocol (CA, monitors, clients) must use the same
/// function, otherwise chain hashes cannot be reproduced.
pub trait HashFunction {
    /// Digest of `bytes`.
    fn digest(&self, bytes: &[u8]) -> Vec<u8>;
}

/// Trait that defines a signing entity of the gossip network (a CA or a logger).
///
/// # Example
/// ```
/// use ctng_revocation::ed25519::Ed25519Signer;
/// use ctng_revocation::traits::{EntitySigner, SignatureVerifier};
///
/// let signer = Ed25519Signer::from_seed("CA 1", &mut [7u8; 32]).unwrap();
/// let message = b"tilin";
/// let sigma = signer.sign(message).unwrap();
///
/// assert!(signer.verifier().verify(message, &sigma).is_ok());
/// ```
pub trait EntitySigner {
    /// Identifier of the signer, as carried in the `Signer` field of gossip envelopes.
    fn signer_id(&self) -> &str;
    /// Name of the signature scheme, as carried in the `Crypto_Scheme` field.
    fn scheme(&self) -> &'static str;
    /// Algorithm identifier written into certificates signed by this entity.
    fn algorithm(&self) -> AlgorithmIdentifierOwned;
    /// Sign `m`.
    fn sign(&self, m: &[u8]) -> Result<Signature, Error>;
}

/// Trait that defines verification of signatures produced by an [`EntitySigner`].
pub trait SignatureVerifier {
    /// Verify `signature` over `m`.
    fn verify(&self, m: &[u8], signature: &Signature) -> Result<(), Error>;
}

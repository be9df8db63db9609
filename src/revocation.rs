//! Signed, hash chained revocation announcements.
//!
//! For a period `p`, a CA publishes the delta of its revocation vector together
//! with a signed root hash (SRH):
//!
//! ```text
//! chain = H( utf8(p) || H(encode(current)) || H(delta) )
//! SRH   = sign(chain)
//! ```
//!
//! The raw digests are concatenated, not their text forms. The announcement is
//! carried as JSON inside a `REV_INIT` gossip envelope whose own signature covers
//! `signer_id || "CRV" || json`.
use crate::bitvector::BitVector;
use crate::common::{Signature, CRV_TAG};
use crate::crv::RevocationVector;
use crate::errors::Error;
use crate::gossip::{GossipObject, GossipType};
use crate::traits::{EntitySigner, HashFunction, SignatureVerifier};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use tracing::info;

/// Revocation identifier forced by [`GenerationMode::Augmented`].
pub const AUGMENTED_MARKER_BIT: usize = 1;

/// How the delta of an announcement is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    /// The delta between `pre_update` and `current`.
    Base,
    /// The base delta with bit [`AUGMENTED_MARKER_BIT`] forced set. The state hash
    /// still commits to the real `current`.
    Augmented,
}

/// Revocation announcement of one period.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// Period label.
    #[serde(rename = "Period")]
    pub period: String,
    /// Encoded delta CRV.
    #[serde(rename = "Delta_CRV")]
    #[serde_as(as = "Base64")]
    pub delta_crv: Vec<u8>,
    /// Hex encoded signature over the chain hash.
    #[serde(rename = "SRH")]
    pub srh: String,
}

/// Delta and chain hash computed from a consistent view of the revocation vector,
/// before anything is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRevocation {
    /// Period label.
    pub period: String,
    /// Encoded delta to publish.
    pub delta: Vec<u8>,
    /// `H(period || H(current) || H(delta))`.
    pub chain_hash: Vec<u8>,
}

/// Hash `period || state_hash || delta_hash`.
pub fn chain_hash<H: HashFunction + ?Sized>(
    hasher: &H,
    period: &str,
    state_hash: &[u8],
    delta_hash: &[u8],
) -> Vec<u8> {
    let mut message = Vec::with_capacity(period.len() + state_hash.len() + delta_hash.len());
    message.extend_from_slice(period.as_bytes());
    message.extend_from_slice(state_hash);
    message.extend_from_slice(delta_hash);
    hasher.digest(&message)
}

/// Compute the delta and chain hash for `period`. The caller must hold the vector
/// still (no concurrent `revoke` or `archive`) for the whole call.
pub fn prepare_revocation<H: HashFunction + ?Sized>(
    crv: &RevocationVector,
    period: &str,
    mode: GenerationMode,
    hasher: &H,
) -> Result<PreparedRevocation, Error> {
    let state_hash = hasher.digest(&crv.encoded_current());

    let delta = match mode {
        GenerationMode::Base => crv.delta_vs_pre_update()?,
        GenerationMode::Augmented => {
            let mut delta = BitVector::from_bytes(&crv.delta_vs_pre_update()?)?;
            delta.set(AUGMENTED_MARKER_BIT)?;
            delta.to_bytes()
        }
    };

    let delta_hash = hasher.digest(&delta);
    let chain_hash = chain_hash(hasher, period, &state_hash, &delta_hash);

    Ok(PreparedRevocation {
        period: period.to_owned(),
        delta,
        chain_hash,
    })
}

impl PreparedRevocation {
    /// Sign the chain hash, then wrap the announcement into a `REV_INIT` envelope
    /// signed by the same entity.
    pub fn sign<S: EntitySigner + ?Sized>(self, signer: &S) -> Result<GossipObject, Error> {
        let srh = signer.sign(&self.chain_hash)?;
        let revocation = Revocation {
            period: self.period,
            delta_crv: self.delta,
            srh: srh.to_string(),
        };
        let document = serde_json::to_string(&revocation)?;

        let payload = [
            signer.signer_id().to_owned(),
            CRV_TAG.to_owned(),
            document,
        ];
        let signature = signer.sign(payload.concat().as_bytes())?;

        Ok(GossipObject::new(
            GossipType::RevInit,
            &revocation.period,
            signer.signer_id(),
            signer.scheme(),
            &signature,
            payload,
        ))
    }
}

/// Build the signed revocation announcement of `period`.
pub fn generate_revocation<H, S>(
    crv: &RevocationVector,
    period: &str,
    mode: GenerationMode,
    hasher: &H,
    signer: &S,
) -> Result<GossipObject, Error>
where
    H: HashFunction + ?Sized,
    S: EntitySigner + ?Sized,
{
    let prepared = prepare_revocation(crv, period, mode, hasher)?;
    let gossip = prepared.sign(signer)?;
    info!(period, ?mode, signer = signer.signer_id(), "revocation announcement generated");
    Ok(gossip)
}

impl Revocation {
    /// Extract the announcement carried by a `REV_INIT` envelope.
    pub fn from_gossip(gossip: &GossipObject) -> Result<Self, Error> {
        if gossip.gossip_type != GossipType::RevInit {
            return Err(Error::UnexpectedGossip(format!(
                "expected REV_INIT, found {:?}",
                gossip.gossip_type
            )));
        }
        if gossip.payload[1] != CRV_TAG {
            return Err(Error::UnexpectedGossip(format!(
                "expected {CRV_TAG} payload, found {}",
                gossip.payload[1]
            )));
        }
        serde_json::from_str(&gossip.payload[2]).map_err(|e| Error::MalformedEncoding(e.to_string()))
    }
}

/// Verify a `REV_INIT` envelope against the revocation vector a client held for the
/// previous period, and return the updated vector.
///
/// The outer signature is checked first, then the delta is applied to `prior`, the
/// chain hash recomputed from the resulting state and the SRH verified against it.
/// An announcement whose delta does not lead to the state the CA committed to is
/// rejected.
pub fn verify_revocation<H, V>(
    gossip: &GossipObject,
    hasher: &H,
    verifier: &V,
    prior: &BitVector,
) -> Result<BitVector, Error>
where
    H: HashFunction + ?Sized,
    V: SignatureVerifier + ?Sized,
{
    let revocation = Revocation::from_gossip(gossip)?;
    verifier.verify(&gossip.signed_message(), &gossip.primary_signature()?)?;

    let delta = BitVector::from_bytes(&revocation.delta_crv)?;
    let updated = prior.symmetric_difference(&delta)?;

    let state_hash = hasher.digest(&updated.to_bytes());
    let delta_hash = hasher.digest(&revocation.delta_crv);
    let chain = chain_hash(hasher, &revocation.period, &state_hash, &delta_hash);

    let srh: Signature = revocation.srh.parse()?;
    verifier.verify(&chain, &srh)?;
    Ok(updated)
}

//! Revocation vectors and certificate extensions of CTng.
//!
//! A CA tracks revocations in a fixed size bit vector and publishes, once per
//! period, a signed and hash chained announcement of the delta. Issued certificates
//! carry a CTng extension holding their record id and the inclusion witnesses of
//! every log they were submitted to.
//!
//! "CTng: Certificate and Revocation Transparency"
//! <https://eprint.iacr.org/2021/818>
//!
#![warn(missing_docs, rust_2018_idioms)]

mod common;
pub mod authority;
pub mod bitvector;
pub mod certificate;
pub mod config;
pub mod crv;
pub mod ed25519;
mod errors;
pub mod extension;
pub mod gossip;
pub mod hash;
pub mod revocation;
pub mod traits;

pub use common::{Signature, APPLICATION, CRV_TAG, DEFAULT_CRV_SIZE};
pub use errors::Error;

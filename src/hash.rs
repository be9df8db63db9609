//! Hash functions usable for the revocation hash chain.
use crate::traits::HashFunction;
use blake2::digest::consts::U32;
use blake2::Blake2b;
use sha2::{Digest, Sha256};

/// SHA-256, the digest deployed CTng participants agree on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Hash;

/// Blake2b with a 32 byte output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake2b256Hash;

impl HashFunction for Sha256Hash {
    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        Sha256::digest(bytes).to_vec()
    }
}

impl HashFunction for Blake2b256Hash {
    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        Blake2b::<U32>::digest(bytes).to_vec()
    }
}

//! Fixed length bit vectors and the delta codec.
//!
//! The binary layout is the one used by every CTng participant for revocation
//! vectors and their deltas:
//!
//! ```text
//! ( len: u64 BE || word_0: u64 BE || ... || word_{n-1}: u64 BE ),  n = ceil(len / 64)
//! ```
//!
//! Bit `i` lives in word `i / 64` at position `i % 64`, counting from the least
//! significant bit. Bits past `len` in the last word are always zero. The explicit
//! length distinguishes a vector ending on a word boundary from one carrying
//! padding, so equal vectors always encode to equal bytes.
use crate::errors::Error;

/// Number of bits held by a single word of the encoding.
pub const WORD_BITS: usize = 64;
/// Size in bytes of a word, and of the length header.
pub const WORD_SIZE: usize = 8;

/// Ordered bit array of fixed length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    len: usize,
    words: Vec<u64>,
}

fn words_needed(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

impl BitVector {
    /// Create a zeroed vector of `len` bits.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0u64; words_needed(len)],
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector has no bits at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value of bit `index`. Bits outside of the vector read as unset.
    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Set bit `index`.
    ///
    /// # Errors
    /// Fails with [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn set(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.len {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.len,
            });
        }
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
        Ok(())
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether no bit is set.
    pub fn none(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Indices of the set bits, in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |i| self.get(*i))
    }

    /// Bitwise XOR of two vectors of equal length.
    pub fn symmetric_difference(&self, other: &BitVector) -> Result<BitVector, Error> {
        let mut out = self.clone();
        out.xor_assign(other)?;
        Ok(out)
    }

    /// In place XOR with `other`; this is how a delta is applied to a prior vector.
    pub fn xor_assign(&mut self, other: &BitVector) -> Result<(), Error> {
        if self.len != other.len {
            return Err(Error::LengthMismatch(self.len, other.len));
        }
        for (lhs, rhs) in self.words.iter_mut().zip(other.words.iter()) {
            *lhs ^= rhs;
        }
        Ok(())
    }

    /// Size in bytes of the encoding of a vector of `len` bits.
    pub fn encoded_size(len: usize) -> usize {
        WORD_SIZE + words_needed(len) * WORD_SIZE
    }

    /// Convert `Self` into its byte representation. In particular, the encoding returns
    /// the bit length followed by the words, all as big endian `u64`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::encoded_size(self.len));
        data.extend_from_slice(&(self.len as u64).to_be_bytes());
        for word in &self.words {
            data.extend_from_slice(&word.to_be_bytes());
        }
        data
    }

    /// Convert the slice of bytes into `Self`.
    ///
    /// # Errors
    /// The function fails with [`Error::MalformedEncoding`] if
    /// * `bytes` is shorter than the length header
    /// * `bytes.len()` does not match the word count required by the declared length
    /// * any padding bit of the last word is set
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < WORD_SIZE {
            return Err(Error::MalformedEncoding(format!(
                "{} bytes is shorter than the length header",
                bytes.len()
            )));
        }

        let mut header = [0u8; WORD_SIZE];
        header.copy_from_slice(&bytes[..WORD_SIZE]);
        let declared = u64::from_be_bytes(header);
        let len = usize::try_from(declared)
            .map_err(|_| Error::MalformedEncoding(format!("bit length {declared} too large")))?;

        let body = &bytes[WORD_SIZE..];
        let expected = words_needed(len)
            .checked_mul(WORD_SIZE)
            .ok_or_else(|| Error::MalformedEncoding(format!("bit length {len} too large")))?;
        if body.len() != expected {
            return Err(Error::MalformedEncoding(format!(
                "{len} bits require {expected} bytes of words, found {}",
                body.len()
            )));
        }

        let words: Vec<u64> = body
            .chunks_exact(WORD_SIZE)
            .map(|chunk| {
                let mut word = [0u8; WORD_SIZE];
                word.copy_from_slice(chunk);
                u64::from_be_bytes(word)
            })
            .collect();

        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = words.last() {
                if last >> tail != 0 {
                    return Err(Error::MalformedEncoding(
                        "padding bits are not zero".to_string(),
                    ));
                }
            }
        }

        Ok(Self { len, words })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn set_and_get() {
        let mut v = BitVector::new(130);
        v.set(0).unwrap();
        v.set(64).unwrap();
        v.set(129).unwrap();
        assert!(v.get(0) && v.get(64) && v.get(129));
        assert!(!v.get(1) && !v.get(130));
        assert_eq!(v.ones().collect::<Vec<_>>(), vec![0, 64, 129]);
        assert_eq!(
            v.set(130),
            Err(Error::IndexOutOfRange {
                index: 130,
                size: 130
            })
        );
    }

    #[test]
    fn encoding_size() {
        assert_eq!(BitVector::new(700).to_bytes().len(), 96);
        assert_eq!(BitVector::new(64).to_bytes().len(), 16);
        assert_eq!(BitVector::new(65).to_bytes().len(), 24);
        assert_eq!(BitVector::new(0).to_bytes().len(), 8);
    }

    #[test]
    fn word_boundary_is_not_ambiguous() {
        // Same word count, different lengths.
        let a = BitVector::new(64).to_bytes();
        let b = BitVector::new(63).to_bytes();
        assert_ne!(a, b);
        assert_eq!(BitVector::from_bytes(&b).unwrap().len(), 63);
    }

    #[test]
    fn rejects_wrong_word_count() {
        let mut bytes = BitVector::new(100).to_bytes();
        bytes.push(0);
        assert!(matches!(
            BitVector::from_bytes(&bytes),
            Err(Error::MalformedEncoding(_))
        ));
        bytes.truncate(bytes.len() - 9);
        assert!(matches!(
            BitVector::from_bytes(&bytes),
            Err(Error::MalformedEncoding(_))
        ));
        assert!(matches!(
            BitVector::from_bytes(&[0, 0, 0]),
            Err(Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn rejects_dirty_padding() {
        let mut bytes = BitVector::new(10).to_bytes();
        // bit 10 sits in the padding of the single word
        bytes[14] = 0x04;
        assert!(matches!(
            BitVector::from_bytes(&bytes),
            Err(Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn xor_requires_equal_lengths() {
        let a = BitVector::new(10);
        let b = BitVector::new(11);
        assert_eq!(a.symmetric_difference(&b), Err(Error::LengthMismatch(10, 11)));
    }

    #[test]
    fn all_ones_round_trip() {
        let mut v = BitVector::new(700);
        for i in 0..700 {
            v.set(i).unwrap();
        }
        let decoded = BitVector::from_bytes(&v.to_bytes()).unwrap();
        assert_eq!(decoded.count_ones(), 700);
        assert_eq!(decoded, v);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(len in 0usize..1024, seeds in proptest::collection::vec(any::<usize>(), 0..64)) {
            let mut v = BitVector::new(len);
            if len > 0 {
                for s in seeds {
                    v.set(s % len).unwrap();
                }
            }
            let bytes = v.to_bytes();
            prop_assert_eq!(bytes.len(), BitVector::encoded_size(len));
            prop_assert_eq!(BitVector::from_bytes(&bytes).unwrap(), v);
        }
    }
}

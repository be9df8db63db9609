//! Tests to check for interoperability with the other CTng participants (monitors,
//! clients and loggers). The expected values were produced independently of this
//! crate: the delta layout is the one of the bits-and-blooms `BitSet.MarshalBinary`,
//! and the digests were computed with the following script.
//!
//! ```python
//! import hashlib
//! cur = bytes([0] * 7 + [10] + [0] * 7 + [8])  # 10 bits, bit 3 set
//! h = hashlib.sha256(cur).digest()
//! print(hashlib.sha256(b"0" + h + h).hexdigest())
//! ```
//!
use ctng_revocation::bitvector::BitVector;
use ctng_revocation::crv::RevocationVector;
use ctng_revocation::ed25519::Ed25519Signer;
use ctng_revocation::extension::{CtngExtension, CTNG_EXTENSION_OID};
use ctng_revocation::gossip::GossipType;
use ctng_revocation::hash::Sha256Hash;
use ctng_revocation::revocation::{
    generate_revocation, prepare_revocation, verify_revocation, GenerationMode, Revocation,
};

const TEN_BITS_BIT_THREE: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 8];

fn crv_with_bit_three() -> RevocationVector {
    let mut crv = RevocationVector::new(10);
    crv.revoke(3).unwrap();
    crv
}

fn octet_string(content: &[u8]) -> Vec<u8> {
    let mut der = vec![0x04];
    match content.len() {
        n if n < 0x80 => der.push(n as u8),
        n if n < 0x100 => der.extend_from_slice(&[0x81, n as u8]),
        n => der.extend_from_slice(&[0x82, (n >> 8) as u8, n as u8]),
    }
    der.extend_from_slice(content);
    der
}

#[test]
fn delta_layout() {
    let crv = crv_with_bit_three();
    assert_eq!(crv.delta_vs_pre_update().unwrap(), TEN_BITS_BIT_THREE.to_vec());

    let mut v = BitVector::new(130);
    v.set(64).unwrap();
    let mut expected = vec![0u8; 32];
    expected[7] = 130;
    expected[23] = 1;
    assert_eq!(v.to_bytes(), expected);

    let empty = BitVector::new(700).to_bytes();
    assert_eq!(&empty[..8], &[0, 0, 0, 0, 0, 0, 0x02, 0xbc]);
    assert!(empty[8..].iter().all(|b| *b == 0));
}

#[test]
fn chain_hash_known_answer() {
    let crv = crv_with_bit_three();
    let prepared = prepare_revocation(&crv, "0", GenerationMode::Base, &Sha256Hash).unwrap();
    assert_eq!(
        hex::encode(&prepared.chain_hash),
        "b86fa6ec70df99d37fb300c6b52339b2b04ef96d4da0aca9533f16a23ebe6c88"
    );

    let prepared =
        prepare_revocation(&crv, "period-7", GenerationMode::Base, &Sha256Hash).unwrap();
    assert_eq!(
        hex::encode(&prepared.chain_hash),
        "e50b9df9f6625ed9c74ac09e40390d027cfc1a9e581aabb4316bb686e9136db7"
    );
}

#[test]
fn announcement_document() {
    let signer = Ed25519Signer::from_seed("CA 1", &mut [1u8; 32]).unwrap();
    let gossip = generate_revocation(
        &crv_with_bit_three(),
        "0",
        GenerationMode::Base,
        &Sha256Hash,
        &signer,
    )
    .unwrap();

    assert!(gossip.payload[2].starts_with(r#"{"Period":"0","Delta_CRV":"AAAAAAAAAAoAAAAAAAAACA==","SRH":""#));

    // monitors relay the envelope as JSON
    let relayed = ctng_revocation::gossip::GossipObject::from_json(&gossip.to_json().unwrap()).unwrap();
    let client = verify_revocation(&relayed, &Sha256Hash, &signer.verifier(), &BitVector::new(10)).unwrap();
    assert_eq!(client.ones().collect::<Vec<_>>(), vec![3]);
    assert_eq!(Revocation::from_gossip(&relayed).unwrap().delta_crv, TEN_BITS_BIT_THREE.to_vec());
}

#[test]
fn extension_value_bytes() {
    assert_eq!(CTNG_EXTENSION_OID.to_string(), "1.3.6.1.4.1.67847871");
    assert_eq!(
        hex::encode(CtngExtension::new(5).encode().unwrap()),
        "04337b2253657175656e63654e756d626572223a7b22524944223a357d2c224c6f67676572496e666f726d6174696f6e223a5b5d7d"
    );
}

#[test]
fn extension_written_with_omitted_fields() {
    // Producers that omit empty fields and carry extra envelope fields.
    let document = r#"{"LoggerInformation":[{"STH":{"Application":"CTng","Type":"STH_INIT","Period":"0","Signer":"Logger 1","Signature":["aa",""],"Timestamp":"2023-01-01T00:00:00Z","Crypto_Scheme":"RSA","Payload":["Logger 1","STH","{}"]},"POI":{"sibling_hashes":["AQID"],"neighbor_hash":"BAU=","LoggerID":"Logger 1"}}]}"#;
    let value = octet_string(document.as_bytes());

    let ext = CtngExtension::decode(&value).unwrap();
    assert_eq!(ext.rid(), 0);
    assert_eq!(ext.logger_information.len(), 1);
    let info = &ext.logger_information[0];
    assert_eq!(info.sth.gossip_type, GossipType::SthInit);
    assert_eq!(info.sth.crypto_scheme, "RSA");
    assert_eq!(info.poi.sibling_hashes, vec![vec![1, 2, 3]]);
    assert_eq!(info.poi.neighbor_hash, vec![4, 5]);
    assert!(info.poi.subject_key_id.is_empty());
    assert!(ext.has_witness_from("Logger 1"));
}

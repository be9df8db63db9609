//! The CTng certificate extension.
//!
//! A certificate carries its record id (RID) and the witness of every logger that
//! included it. The value is a JSON document wrapped in a DER `OCTET STRING`, stored
//! in the extension registered under [`CTNG_EXTENSION_OID`].
use crate::errors::Error;
use crate::gossip::GossipObject;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use x509_cert::der::asn1::OctetString;
use x509_cert::der::oid::ObjectIdentifier;
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::Extension;

/// Identifier under which the CTng extension is registered.
pub const CTNG_EXTENSION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.67847871");

/// Merkle proof that a certificate is recorded in a log.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfInclusion {
    /// Sibling hashes of the path from the leaf to the root.
    #[serde_as(as = "Vec<Base64>")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sibling_hashes: Vec<Vec<u8>>,
    /// Hash of the neighbour node.
    #[serde_as(as = "Base64")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbor_hash: Vec<u8>,
    /// Identifier of the log.
    #[serde(rename = "LoggerID", default, skip_serializing_if = "String::is_empty")]
    pub logger_id: String,
    /// Subject key identifier of the certificate.
    #[serde_as(as = "Base64")]
    #[serde(rename = "SubjectKeyId", default, skip_serializing_if = "Vec::is_empty")]
    pub subject_key_id: Vec<u8>,
}

/// Witness of a single log: its signed tree head and the inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerInfo {
    /// Signed tree head of the log.
    #[serde(rename = "STH")]
    pub sth: GossipObject,
    /// Inclusion proof under that tree head.
    #[serde(rename = "POI")]
    pub poi: ProofOfInclusion,
}

/// Record id assigned by the CA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceNumber {
    /// Record id, also the revocation identifier of the certificate.
    #[serde(rename = "RID", default)]
    pub rid: u64,
}

/// Logical content of the CTng extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtngExtension {
    /// Sequence number of the certificate.
    #[serde(rename = "SequenceNumber", default)]
    pub sequence_number: SequenceNumber,
    /// Witnesses, at most one per log signer.
    #[serde(rename = "LoggerInformation", default)]
    pub logger_information: Vec<LoggerInfo>,
}

impl CtngExtension {
    /// Extension of a freshly issued certificate: no witness yet.
    pub fn new(rid: u64) -> Self {
        Self {
            sequence_number: SequenceNumber { rid },
            logger_information: Vec::new(),
        }
    }

    /// Record id of the certificate.
    pub fn rid(&self) -> u64 {
        self.sequence_number.rid
    }

    /// Whether a witness signed by `signer` is already present.
    pub fn has_witness_from(&self, signer: &str) -> bool {
        self.logger_information
            .iter()
            .any(|info| info.sth.signer == signer)
    }

    /// Same sequence number, no witness.
    pub fn precertificate_view(&self) -> Self {
        Self::new(self.rid())
    }

    /// Encode as a DER `OCTET STRING` wrapping the JSON document.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let document = serde_json::to_vec(self)?;
        let value = OctetString::new(document)?;
        Ok(value.to_der()?)
    }

    /// Exact inverse of [`CtngExtension::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let value =
            OctetString::from_der(bytes).map_err(|e| Error::MalformedExtension(e.to_string()))?;
        serde_json::from_slice(value.as_bytes()).map_err(|e| Error::MalformedExtension(e.to_string()))
    }

    /// Non critical X.509 extension carrying `self`.
    pub fn to_extension(&self) -> Result<Extension, Error> {
        Ok(Extension {
            extn_id: CTNG_EXTENSION_OID,
            critical: false,
            extn_value: OctetString::new(self.encode()?)?,
        })
    }
}

/// Position of the first CTng extension in `extensions`.
pub fn position(extensions: &[Extension]) -> Option<usize> {
    extensions
        .iter()
        .position(|ext| ext.extn_id == CTNG_EXTENSION_OID)
}

/// Decode the first CTng extension of `extensions`, if any.
pub fn find(extensions: &[Extension]) -> Result<Option<CtngExtension>, Error> {
    position(extensions)
        .map(|i| CtngExtension::decode(extensions[i].extn_value.as_bytes()))
        .transpose()
}

/// Decode the first CTng extension of `extensions`; absence yields an extension
/// without witnesses and RID 0.
pub fn parse(extensions: &[Extension]) -> Result<CtngExtension, Error> {
    Ok(find(extensions)?.unwrap_or_default())
}

/// Replace the value of the first CTng extension of `extensions` with `ext`, or append
/// a non critical one if there is none.
pub fn install(extensions: &mut Vec<Extension>, ext: &CtngExtension) -> Result<(), Error> {
    let encoded = ext.to_extension()?;
    match position(extensions) {
        Some(i) => extensions[i].extn_value = encoded.extn_value,
        None => extensions.push(encoded),
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::Signature;
    use crate::gossip::GossipType;

    fn logger_info(signer: &str, logger_id: &str) -> LoggerInfo {
        LoggerInfo {
            sth: GossipObject::new(
                GossipType::SthInit,
                "0",
                signer,
                "Ed25519",
                &Signature::from_bytes(&[0xaa; 4]),
                [signer.to_owned(), "STH".to_owned(), "{}".to_owned()],
            ),
            poi: ProofOfInclusion {
                sibling_hashes: vec![vec![1; 32], vec![2; 32]],
                neighbor_hash: vec![3; 32],
                logger_id: logger_id.to_owned(),
                subject_key_id: vec![4; 20],
            },
        }
    }

    #[test]
    fn empty_list_round_trip() {
        let ext = CtngExtension::new(12);
        let decoded = CtngExtension::decode(&ext.encode().unwrap()).unwrap();
        assert_eq!(decoded.rid(), 12);
        assert!(decoded.logger_information.is_empty());
    }

    #[test]
    fn multi_entry_round_trip() {
        let mut ext = CtngExtension::new(1);
        ext.logger_information.push(logger_info("Logger 1", "L1"));
        ext.logger_information.push(logger_info("Logger 2", "журнал-ロガー"));
        let decoded = CtngExtension::decode(&ext.encode().unwrap()).unwrap();
        assert_eq!(decoded, ext);
        assert_eq!(decoded.logger_information[1].poi.logger_id, "журнал-ロガー");
    }

    #[test]
    fn value_is_octet_string() {
        let bytes = CtngExtension::new(0).encode().unwrap();
        assert_eq!(bytes[0], 0x04);
        let inner = OctetString::from_der(&bytes).unwrap();
        let json: serde_json::Value = serde_json::from_slice(inner.as_bytes()).unwrap();
        assert_eq!(json["SequenceNumber"]["RID"], 0);
        assert!(json["LoggerInformation"].as_array().unwrap().is_empty());
    }

    #[test]
    fn decode_accepts_omitted_fields() {
        let value = OctetString::new(b"{}".to_vec()).unwrap().to_der().unwrap();
        assert_eq!(CtngExtension::decode(&value).unwrap(), CtngExtension::default());
    }

    #[test]
    fn malformed_values() {
        assert!(matches!(
            CtngExtension::decode(&[0x30, 0x00]),
            Err(Error::MalformedExtension(_))
        ));
        let not_json = OctetString::new(b"[1,".to_vec()).unwrap().to_der().unwrap();
        assert!(matches!(
            CtngExtension::decode(&not_json),
            Err(Error::MalformedExtension(_))
        ));
    }

    #[test]
    fn absent_and_empty_are_distinct() {
        let mut extensions = Vec::new();
        assert_eq!(find(&extensions).unwrap(), None);
        assert_eq!(parse(&extensions).unwrap(), CtngExtension::default());

        install(&mut extensions, &CtngExtension::new(0)).unwrap();
        let found = find(&extensions).unwrap().unwrap();
        assert!(found.logger_information.is_empty());
        assert!(!extensions[0].critical);
    }

    #[test]
    fn install_replaces_first_match() {
        let mut extensions = Vec::new();
        install(&mut extensions, &CtngExtension::new(1)).unwrap();
        install(&mut extensions, &CtngExtension::new(2)).unwrap();
        assert_eq!(extensions.len(), 1);
        assert_eq!(parse(&extensions).unwrap().rid(), 2);
    }
}

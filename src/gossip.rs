//! Generic signed envelope exchanged between CAs, loggers, monitors and gossipers.
use crate::common::{Signature, APPLICATION};
use crate::errors::Error;
use serde::{Deserialize, Serialize};

/// Kind of object carried by a [`GossipObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GossipType {
    /// Signed tree head, as produced by a logger.
    #[serde(rename = "STH_INIT")]
    SthInit,
    /// Signed tree head, threshold signed by the monitors.
    #[serde(rename = "STH_FULL")]
    SthFull,
    /// Revocation announcement, as produced by a CA.
    #[serde(rename = "REV_INIT")]
    RevInit,
    /// Revocation announcement, threshold signed by the monitors.
    #[serde(rename = "REV_FULL")]
    RevFull,
}

/// Signed envelope. The signature in `signature[0]` covers the concatenation of
/// the three payload parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GossipObject {
    /// Always [`APPLICATION`].
    #[serde(rename = "Application")]
    pub application: String,
    /// Kind of payload.
    #[serde(rename = "Type")]
    pub gossip_type: GossipType,
    /// Period the object belongs to.
    #[serde(rename = "Period")]
    pub period: String,
    /// Identifier of the signing entity.
    #[serde(rename = "Signer")]
    pub signer: String,
    /// Hex encoded signatures; the second slot is empty for single signed objects.
    #[serde(rename = "Signature")]
    pub signature: [String; 2],
    /// Name of the signature scheme.
    #[serde(rename = "Crypto_Scheme")]
    pub crypto_scheme: String,
    /// `[signer_id, kind tag, document]`.
    #[serde(rename = "Payload")]
    pub payload: [String; 3],
}

impl GossipObject {
    /// Build a single signed envelope.
    pub fn new(
        gossip_type: GossipType,
        period: &str,
        signer: &str,
        crypto_scheme: &str,
        signature: &Signature,
        payload: [String; 3],
    ) -> Self {
        Self {
            application: APPLICATION.to_owned(),
            gossip_type,
            period: period.to_owned(),
            signer: signer.to_owned(),
            signature: [signature.to_string(), String::new()],
            crypto_scheme: crypto_scheme.to_owned(),
            payload,
        }
    }

    /// Bytes covered by the envelope signature.
    pub fn signed_message(&self) -> Vec<u8> {
        self.payload.concat().into_bytes()
    }

    /// The first signature of the envelope.
    pub fn primary_signature(&self) -> Result<Signature, Error> {
        self.signature[0].parse()
    }

    /// Canonical JSON form of the envelope.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an envelope from its JSON form.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(|e| Error::UnexpectedGossip(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_names_on_the_wire() {
        let obj = GossipObject::new(
            GossipType::RevInit,
            "3",
            "CA 1",
            "Ed25519",
            &Signature::from_bytes(&[1, 2]),
            ["CA 1".into(), "CRV".into(), "{}".into()],
        );
        let json = obj.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"Application":"CTng","Type":"REV_INIT","Period":"3","Signer":"CA 1","Signature":["0102",""],"Crypto_Scheme":"Ed25519","Payload":["CA 1","CRV","{}"]}"#
        );
        assert_eq!(GossipObject::from_json(&json).unwrap(), obj);
        assert_eq!(obj.signed_message(), b"CA 1CRV{}".to_vec());
    }

    #[test]
    fn rejects_unknown_type() {
        let json = r#"{"Application":"CTng","Type":"PING","Period":"3","Signer":"x","Signature":["",""],"Crypto_Scheme":"RSA","Payload":["","",""]}"#;
        assert!(matches!(
            GossipObject::from_json(json),
            Err(Error::UnexpectedGossip(_))
        ));
    }
}

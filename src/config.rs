//! CA configuration.
use crate::common::DEFAULT_CRV_SIZE;
use crate::crv::DEFAULT_CACHE_RETENTION;
use crate::errors::Error;
use serde::{Deserialize, Serialize};

/// Settings of a CA context. Missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaConfig {
    /// Number of revocation slots.
    pub crv_size: usize,
    /// Number of archived periods kept in the snapshot cache.
    pub cache_retention: usize,
    /// Every `misbehavior_interval`-th announcement request is generated in
    /// augmented mode; `0` disables it.
    pub misbehavior_interval: u64,
}

impl Default for CaConfig {
    fn default() -> Self {
        Self {
            crv_size: DEFAULT_CRV_SIZE,
            cache_retention: DEFAULT_CACHE_RETENTION,
            misbehavior_interval: 0,
        }
    }
}

impl CaConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        let document: serde_json::Value =
            serde_json::from_str(s).map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        if !document.is_object() {
            return Err(Error::InvalidConfiguration(
                "configuration must be a JSON object".to_string(),
            ));
        }
        let config: Self = serde_json::from_value(document)
            .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range. The vector needs room for the augmented
    /// marker bit.
    pub fn validate(&self) -> Result<(), Error> {
        if self.crv_size <= crate::revocation::AUGMENTED_MARKER_BIT {
            return Err(Error::InvalidConfiguration(format!(
                "crv_size must be at least 2, got {}",
                self.crv_size
            )));
        }
        if self.cache_retention == 0 {
            return Err(Error::InvalidConfiguration(
                "cache_retention must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = CaConfig::from_json("{}").unwrap();
        assert_eq!(config, CaConfig::default());
        assert_eq!(config.crv_size, 700);
    }

    #[test]
    fn partial_document() {
        let config = CaConfig::from_json(r#"{"crv_size": 64, "misbehavior_interval": 3}"#).unwrap();
        assert_eq!(config.crv_size, 64);
        assert_eq!(config.misbehavior_interval, 3);
        assert_eq!(config.cache_retention, DEFAULT_CACHE_RETENTION);
    }

    #[test]
    fn out_of_range() {
        assert!(matches!(
            CaConfig::from_json(r#"{"crv_size": 1}"#),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            CaConfig::from_json(r#"{"cache_retention": 0}"#),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            CaConfig::from_json("[]"),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            CaConfig::from_json("700"),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}

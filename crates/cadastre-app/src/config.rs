//! Deployment configuration
//!
//! TOML-backed parameters applied once at construction: the registry's
//! contract URI, the commission split, and the initial token fee
//! schedule. Runtime reconfiguration goes through the component
//! operations, not through this file.

use cadastre_core::{InvalidBasisPoints, TokenId};
use serde::{Deserialize, Serialize};

/// Fee schedule entry for one payment token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFeeConfig {
    /// Token identity.
    pub id: TokenId,
    /// Fee for a regular mint.
    pub regular_fee: u128,
    /// Fee for a validator-originated mint.
    pub validator_fee: u128,
}

/// Deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Contract-level descriptive URI for the registry.
    pub contract_uri: String,
    /// Commission percentage for regular mints, in basis points.
    #[serde(default = "default_regular_bps")]
    pub commission_regular_bps: u16,
    /// Commission percentage for validator-originated mints, in basis
    /// points.
    #[serde(default = "default_validator_bps")]
    pub commission_validator_bps: u16,
    /// Initially whitelisted payment tokens and their fees.
    #[serde(default)]
    pub tokens: Vec<TokenFeeConfig>,
}

fn default_regular_bps() -> u16 {
    500
}

fn default_validator_bps() -> u16 {
    300
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            contract_uri: "cadastre://records".to_string(),
            commission_regular_bps: default_regular_bps(),
            commission_validator_bps: default_validator_bps(),
            tokens: Vec::new(),
        }
    }
}

/// Errors from parsing a deployment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document did not parse.
    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    /// A commission percentage is out of range.
    #[error(transparent)]
    Commission(#[from] InvalidBasisPoints),
}

impl ProtocolConfig {
    /// Parse a deployment configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        cadastre_core::BasisPoints::new(config.commission_regular_bps)?;
        cadastre_core::BasisPoints::new(config.commission_validator_bps)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_defaults() {
        let config = ProtocolConfig::from_toml_str(r#"contract_uri = "cadastre://test""#).unwrap();
        assert_eq!(config.commission_regular_bps, 500);
        assert_eq!(config.commission_validator_bps, 300);
        assert!(config.tokens.is_empty());
    }

    #[test]
    fn parses_token_entries() {
        let config = ProtocolConfig::from_toml_str(
            r#"
            contract_uri = "cadastre://test"
            commission_regular_bps = 1000

            [[tokens]]
            id = "8c5fd2a7-7f3a-5d29-9c6e-000000000001"
            regular_fee = 100
            validator_fee = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.commission_regular_bps, 1_000);
        assert_eq!(config.tokens.len(), 1);
        assert_eq!(config.tokens[0].regular_fee, 100);
    }

    #[test]
    fn rejects_out_of_range_commission() {
        let err = ProtocolConfig::from_toml_str(
            r#"
            contract_uri = "cadastre://test"
            commission_regular_bps = 10001
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Commission(_)));
    }
}

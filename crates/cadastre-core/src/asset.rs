//! The closed asset-type enumeration
//!
//! A record's asset type is fixed at mint and drives which validators may
//! be assigned to it and which acceptance criteria apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of real-world asset a deed record tokenizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    /// Raw land parcels.
    Land,
    /// Titled vehicles.
    Vehicle,
    /// Improved real estate.
    Estate,
    /// Commercial equipment with a serial identity.
    CommercialEquipment,
}

impl AssetType {
    /// All members of the enumeration, in declaration order.
    pub const ALL: [AssetType; 4] = [
        AssetType::Land,
        AssetType::Vehicle,
        AssetType::Estate,
        AssetType::CommercialEquipment,
    ];

    /// Stable string form used in trait payloads and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Land => "land",
            AssetType::Vehicle => "vehicle",
            AssetType::Estate => "estate",
            AssetType::CommercialEquipment => "commercial-equipment",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized asset-type string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset type: {0}")]
pub struct UnknownAssetType(pub String);

impl FromStr for AssetType {
    type Err = UnknownAssetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "land" => Ok(AssetType::Land),
            "vehicle" => Ok(AssetType::Vehicle),
            "estate" => Ok(AssetType::Estate),
            "commercial-equipment" => Ok(AssetType::CommercialEquipment),
            other => Err(UnknownAssetType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip() {
        for ty in AssetType::ALL {
            assert_eq!(ty.as_str().parse::<AssetType>(), Ok(ty));
        }
    }

    #[test]
    fn unknown_string_is_rejected() {
        assert!("yacht".parse::<AssetType>().is_err());
    }
}

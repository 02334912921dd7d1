//! Per-asset-type acceptance criteria

use serde::{Deserialize, Serialize};

/// What a record must carry for this unit to validate it.
///
/// `additional_criteria` is free-form text interpreted by the validator
/// organization off-ledger; it is stored and surfaced but never enforced
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCriteria {
    /// Trait names that must be present and non-empty.
    pub required_traits: Vec<String>,
    /// Free-form criteria text for off-ledger interpretation.
    pub additional_criteria: String,
    /// Whether the operating-agreement trait must resolve to a registered
    /// agreement.
    pub require_operating_agreement: bool,
    /// Whether the definition trait must be non-empty.
    pub require_definition: bool,
}

impl ValidationCriteria {
    /// Whether any record at all satisfies these criteria. A vacuously
    /// satisfied unit marks records validated at mint.
    pub fn is_vacuous(&self) -> bool {
        self.required_traits.is_empty()
            && !self.require_operating_agreement
            && !self.require_definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_vacuous() {
        assert!(ValidationCriteria::default().is_vacuous());
    }

    #[test]
    fn any_requirement_defeats_vacuity() {
        let with_trait = ValidationCriteria {
            required_traits: vec!["country".into()],
            ..Default::default()
        };
        assert!(!with_trait.is_vacuous());

        let with_agreement = ValidationCriteria {
            require_operating_agreement: true,
            ..Default::default()
        };
        assert!(!with_agreement.is_vacuous());
    }
}

//! Errors raised at the configuration and campaign boundary
//!
//! The simulation tick itself never fails; these only surface when loading
//! tuning data or acting on the campaign between levels.

use crate::tuning::TankClass;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid tuning data: {0}")]
    TuningParse(#[source] serde_json::Error),

    #[error("Invalid settings data: {0}")]
    SettingsParse(#[source] serde_json::Error),

    #[error("Serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("Tank class {0:?} is not in the catalog")]
    UnknownTank(TankClass),

    #[error("Unknown upgrade: {0}")]
    UnknownUpgrade(String),

    #[error("Upgrade {upgrade} is not offered for {tank:?}")]
    UpgradeNotOffered { upgrade: String, tank: TankClass },

    #[error("Insufficient funds: need {cost}, have {funds}")]
    InsufficientFunds { cost: u32, funds: u32 },

    #[error("No level at index {0}")]
    NoMoreLevels(usize),
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<u32>("not a number").unwrap_err()
    }

    #[test]
    fn test_json_failures_name_their_source() {
        assert!(GameError::TuningParse(json_error()).to_string().starts_with("Invalid tuning data"));
        assert!(GameError::SettingsParse(json_error()).to_string().starts_with("Invalid settings data"));
        assert!(GameError::Serialize(json_error()).to_string().starts_with("Serialization failed"));
    }
}

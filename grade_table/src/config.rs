use serde::{Deserialize, Serialize};

use crate::GradeError;

/// Largest `decimals` the aggregate accepts, the same bound as `toFixed`.
pub const MAX_DECIMALS: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Footer text when no grade cell contributes any possible points.
    pub na_label: String,
    pub decimals: usize,
    /// Re-enable page inputs after a failed upload. Off keeps them disabled.
    pub reenable_inputs_on_error: bool,
    pub success_message: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            na_label: "N/A".to_string(),
            decimals: 1,
            reenable_inputs_on_error: false,
            success_message: "Uploaded successfully.".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Parse a partial JSON object; absent fields keep their defaults.
    pub fn from_json(input: &str) -> Result<Self, GradeError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GradeError> {
        if self.decimals > MAX_DECIMALS {
            return Err(GradeError::InvalidConfig(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        Ok(())
    }
}

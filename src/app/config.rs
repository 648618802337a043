use serde::{Deserialize, Serialize};

use crate::primitives::CheckNumber;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_first_check_number")]
    pub default_first_check_number: CheckNumber,
    #[serde(default = "default_checkbook_size")]
    pub default_checkbook_size: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_first_check_number: default_first_check_number(),
            default_checkbook_size: default_checkbook_size(),
        }
    }
}

fn default_first_check_number() -> CheckNumber {
    1
}

fn default_checkbook_size() -> i64 {
    50
}

pub mod error;
mod repo;

use serde::{Deserialize, Serialize};

use crate::primitives::*;

pub use repo::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    ByMonth,
    ByBeneficiary,
    ByStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ReportRow {
    pub key: String,
    pub check_count: i64,
    pub total: Decimal,
}

use serde::Serialize;

use crate::{check::Check, primitives::*};

/// Outcome of recomputing an account's current balance from its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceRecalculation {
    pub account_id: AccountId,
    pub previous_balance: Decimal,
    pub recalculated_balance: Decimal,
    pub difference: Decimal,
}

impl BalanceRecalculation {
    pub fn new(account_id: AccountId, previous_balance: Decimal, recalculated: Decimal) -> Self {
        Self {
            account_id,
            previous_balance,
            recalculated_balance: recalculated,
            difference: recalculated - previous_balance,
        }
    }

    pub fn drifted(&self) -> bool {
        !self.difference.is_zero()
    }
}

/// Initial balance minus issued and cleared checks plus deposits. Pending and
/// cancelled checks do not count.
pub fn recalculate_balance<'a>(
    initial_balance: Decimal,
    checks: impl IntoIterator<Item = &'a Check>,
    deposits_total: Decimal,
) -> Decimal {
    let committed: Decimal = checks
        .into_iter()
        .filter(|check| check.status.is_committed())
        .map(|check| check.amount)
        .sum();
    initial_balance - committed + deposits_total
}

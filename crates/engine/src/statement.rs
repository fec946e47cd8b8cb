//! Statement aggregation.
//!
//! A [`Statement`] is the allocation of one cycle together with the
//! transactions that fall in its window and the derived totals. It is the
//! single shape consumed by the live view and by the PDF export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Allocation, CycleWindow, EngineError, Money, ResultEngine, Transaction};

/// Order in which the transactions of a statement are listed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Oldest first, by date then time. Used by exported statements.
    #[default]
    Chronological,
    /// Newest first, by date then time. Used by the live view.
    RecentFirst,
}

/// Which cycle an exported statement covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementPeriod {
    /// The cycle containing "today".
    Current,
    /// The cycle whose start falls in the given calendar month.
    Month { year: i32, month: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub cycle_start: NaiveDate,
    /// Exclusive end; `None` for the live view of the running cycle.
    pub cycle_end: Option<NaiveDate>,
    pub allocation: Allocation,
    pub transactions: Vec<Transaction>,
    pub total_spent: Money,
    /// `allocated - total_spent`, negative when overspent.
    pub remaining_balance: Money,
}

impl Statement {
    /// Build a statement from an allocation and the transactions already
    /// selected for `window`.
    ///
    /// Fails with `InvalidAmount` when the totals do not fit in `Money`.
    pub fn from_parts(
        allocation: Allocation,
        window: CycleWindow,
        transactions: Vec<Transaction>,
    ) -> ResultEngine<Self> {
        let total_spent = Money::total(transactions.iter().map(|tx| tx.amount))?;
        let remaining_balance = allocation
            .allocated
            .checked_sub(total_spent)
            .ok_or_else(|| EngineError::InvalidAmount("balance out of range".to_string()))?;
        Ok(Self {
            cycle_start: window.start,
            cycle_end: window.end,
            allocation,
            transactions,
            total_spent,
            remaining_balance,
        })
    }
}

/// Outcome of aggregating a cycle.
///
/// A missing allocation is a regular outcome: the caller is expected to ask
/// the user to set a budget for `cycle_start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleReport {
    Ready(Box<Statement>),
    NoAllocation { cycle_start: NaiveDate },
}

impl CycleReport {
    pub fn statement(self) -> Option<Statement> {
        match self {
            Self::Ready(statement) => Some(*statement),
            Self::NoAllocation { .. } => None,
        }
    }
}

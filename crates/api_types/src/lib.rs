//! Request and response bodies of the Hakogane HTTP API.
//!
//! Amounts sent by clients are decimal strings (`"100.50"`), exactly as typed
//! in a form; amounts returned by the server are integer minor units.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Where the client should go next, for "no data" outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub username: String,
        pub password: String,
        /// Allocation of the first cycle.
        pub salary: String,
        /// Anchor day (1–31).
        pub billing_cycle: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginUser {
        pub username: String,
        pub password: String,
    }

    /// Bearer token to send as `Authorization: Bearer <token>`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionToken {
        pub token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub billing_cycle: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Profile {
        pub username: String,
        pub billing_cycle: u32,
    }
}

pub mod cycle {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub salary: String,
    }

    /// The cycle a new budget would be credited to.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetTarget {
        pub cycle_start: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub cycle_start: NaiveDate,
        pub allocated_minor: i64,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetList {
        pub budgets: Vec<BudgetView>,
    }

    /// Live view of the running cycle.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CycleView {
        pub cycle_start: NaiveDate,
        pub budget: BudgetView,
        /// Newest first.
        pub transactions: Vec<super::transaction::TransactionView>,
        pub total_spent_minor: i64,
        /// Negative when overspent.
        pub remaining_balance_minor: i64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount: String,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub time: NaiveTime,
        pub amount_minor: i64,
        pub description: String,
    }
}

pub mod statement {
    use super::*;

    /// Query string of the statement download. Without both fields the
    /// current cycle is exported.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatementQuery {
        pub year: Option<i32>,
        pub month: Option<u32>,
    }
}

//! Spend transactions.
//!
//! A `Transaction` records money spent by a user on a given date and time.
//! Amounts are magnitudes (always > 0). Transactions are never updated or
//! deleted.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

/// Longest description accepted, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub amount: Money,
    pub description: String,
}

impl Transaction {
    pub fn new(
        user_id: String,
        occurred_at: NaiveDateTime,
        amount: Money,
        description: &str,
    ) -> ResultEngine<Self> {
        let amount = amount.ensure_entry()?;
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidInput(
                "description must not be empty".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(EngineError::InvalidInput(format!(
                "description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            date: occurred_at.date(),
            time: occurred_at.time(),
            amount,
            description: description.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub date: Date,
    pub time: Time,
    pub amount_minor: i64,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            date: ActiveValue::Set(tx.date),
            time: ActiveValue::Set(tx.time),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            description: ActiveValue::Set(tx.description.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: model.user_id,
            date: model.date,
            time: model.time,
            amount: Money::new(model.amount_minor),
            description: model.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    #[test]
    fn new_trims_description_and_splits_timestamp() {
        let tx = Transaction::new("alice".to_string(), at(9), Money::new(4000), "  groceries ")
            .unwrap();
        assert_eq!(tx.description, "groceries");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(tx.time, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
    }

    #[test]
    fn new_rejects_invalid_input() {
        let user = || "alice".to_string();
        assert!(matches!(
            Transaction::new(user(), at(9), Money::ZERO, "x"),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            Transaction::new(user(), at(9), Money::new(Money::MAX_ENTRY.minor() + 1), "x"),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            Transaction::new(user(), at(9), Money::new(1), "   "),
            Err(EngineError::InvalidInput(_))
        ));
        let long = "a".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(matches!(
            Transaction::new(user(), at(9), Money::new(1), &long),
            Err(EngineError::InvalidInput(_))
        ));
    }
}

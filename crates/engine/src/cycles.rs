//! Cycle allocations.
//!
//! An `Allocation` is the amount credited for one budget cycle of one user.
//! There is at most one allocation per `(user_id, cycle_start)`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Uuid,
    pub user_id: String,
    pub cycle_start: NaiveDate,
    pub allocated: Money,
    pub created_at: DateTime<Utc>,
}

impl Allocation {
    pub fn new(
        user_id: String,
        cycle_start: NaiveDate,
        allocated: Money,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let allocated = allocated.ensure_entry()?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            cycle_start,
            allocated,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cycles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub cycle_start: Date,
    pub allocated_minor: i64,
    pub created_at: DateTimeUtc,
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

impl From<&Allocation> for ActiveModel {
    fn from(allocation: &Allocation) -> Self {
        Self {
            id: ActiveValue::Set(allocation.id.to_string()),
            user_id: ActiveValue::Set(allocation.user_id.clone()),
            cycle_start: ActiveValue::Set(allocation.cycle_start),
            allocated_minor: ActiveValue::Set(allocation.allocated.minor()),
            created_at: ActiveValue::Set(allocation.created_at),
        }
    }
}

impl TryFrom<Model> for Allocation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "allocation")?,
            user_id: model.user_id,
            cycle_start: model.cycle_start,
            allocated: Money::new(model.allocated_minor),
            created_at: model.created_at,
        })
    }
}

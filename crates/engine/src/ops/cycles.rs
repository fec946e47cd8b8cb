use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    Allocation, EngineError, Money, ResultEngine, cycle::cycle_start, cycle::days_in_month,
    cycles,
};

use super::{Engine, conflict_as_existing};

impl Engine {
    /// Credit `amount` to the cycle containing `today`.
    ///
    /// A cycle has at most one allocation: setting it twice is rejected with
    /// [`EngineError::ExistingKey`].
    pub async fn set_budget(
        &self,
        username: &str,
        amount: Money,
        today: NaiveDate,
    ) -> ResultEngine<Allocation> {
        let user = self.user(username).await?;
        let start = cycle_start(today, user.anchor_day);

        if self.allocation(&user.username, start).await?.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "allocation for cycle starting {start}"
            )));
        }

        let allocation = Allocation::new(user.username, start, amount, Utc::now())?;
        cycles::ActiveModel::from(&allocation)
            .insert(&self.database)
            .await
            .map_err(|err| {
                conflict_as_existing(err, || format!("allocation for cycle starting {start}"))
            })?;

        tracing::info!(
            "allocated {} to {} for cycle starting {start}",
            allocation.allocated,
            allocation.user_id
        );
        Ok(allocation)
    }

    /// Allocation of the cycle starting exactly on `cycle_start`.
    pub async fn allocation(
        &self,
        username: &str,
        cycle_start: NaiveDate,
    ) -> ResultEngine<Option<Allocation>> {
        cycles::Entity::find()
            .filter(cycles::Column::UserId.eq(username.to_string()))
            .filter(cycles::Column::CycleStart.eq(cycle_start))
            .one(&self.database)
            .await?
            .map(Allocation::try_from)
            .transpose()
    }

    /// Earliest allocation whose cycle starts in the given calendar month.
    pub async fn allocation_in_month(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> ResultEngine<Option<Allocation>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EngineError::InvalidInput(format!("invalid month {year}-{month}")))?;
        let next = first + Duration::days(i64::from(days_in_month(year, month)));

        cycles::Entity::find()
            .filter(cycles::Column::UserId.eq(username.to_string()))
            .filter(cycles::Column::CycleStart.gte(first))
            .filter(cycles::Column::CycleStart.lt(next))
            .order_by_asc(cycles::Column::CycleStart)
            .one(&self.database)
            .await?
            .map(Allocation::try_from)
            .transpose()
    }

    /// Every allocation of a user, newest cycle first.
    pub async fn list_allocations(&self, username: &str) -> ResultEngine<Vec<Allocation>> {
        cycles::Entity::find()
            .filter(cycles::Column::UserId.eq(username.to_string()))
            .order_by_desc(cycles::Column::CycleStart)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Allocation::try_from)
            .collect()
    }
}

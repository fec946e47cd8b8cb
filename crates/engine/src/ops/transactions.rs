use chrono::NaiveDateTime;
use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{CycleWindow, Money, ResultEngine, SortOrder, Transaction, transactions};

use super::Engine;

impl Engine {
    /// Record a spend made by `username` at `occurred_at` (local wall time).
    pub async fn record_transaction(
        &self,
        username: &str,
        amount: Money,
        description: &str,
        occurred_at: NaiveDateTime,
    ) -> ResultEngine<Transaction> {
        let user = self.user(username).await?;
        let tx = Transaction::new(user.username, occurred_at, amount, description)?;
        transactions::ActiveModel::from(&tx)
            .insert(&self.database)
            .await?;
        tracing::debug!("recorded transaction {} for {}", tx.id, tx.user_id);
        Ok(tx)
    }

    /// Transactions of `username` dated inside `window`.
    ///
    /// `start` is inclusive, `end` (when present) exclusive.
    pub async fn transactions_in(
        &self,
        username: &str,
        window: CycleWindow,
        order: SortOrder,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(username.to_string()))
            .filter(transactions::Column::Date.gte(window.start));
        if let Some(end) = window.end {
            query = query.filter(transactions::Column::Date.lt(end));
        }

        query = match order {
            SortOrder::Chronological => query
                .order_by_asc(transactions::Column::Date)
                .order_by_asc(transactions::Column::Time),
            SortOrder::RecentFirst => query
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Time),
        };

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }
}

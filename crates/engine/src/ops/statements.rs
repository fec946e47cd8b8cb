use chrono::NaiveDate;

use crate::{
    CycleReport, CycleWindow, EngineError, ResultEngine, SortOrder, Statement, StatementPeriod,
    cycle::cycle_start,
};

use super::Engine;

impl Engine {
    /// Aggregate the transactions of `window` against the allocation of the
    /// cycle starting on `window.start`.
    pub async fn aggregate(
        &self,
        username: &str,
        window: CycleWindow,
        order: SortOrder,
    ) -> ResultEngine<CycleReport> {
        let Some(allocation) = self.allocation(username, window.start).await? else {
            return Ok(CycleReport::NoAllocation {
                cycle_start: window.start,
            });
        };

        let transactions = self.transactions_in(username, window, order).await?;
        let statement = Statement::from_parts(allocation, window, transactions)?;
        Ok(CycleReport::Ready(Box::new(statement)))
    }

    /// Live view of the running cycle: newest transactions first, no upper
    /// date bound.
    pub async fn current_cycle(&self, username: &str, today: NaiveDate) -> ResultEngine<CycleReport> {
        let user = self.user(username).await?;
        let start = cycle_start(today, user.anchor_day);
        self.aggregate(&user.username, CycleWindow::open(start), SortOrder::RecentFirst)
            .await
    }

    /// Closed statement of the cycle starting on `start`, in chronological
    /// order. Without `end` the cycle ends where the next one begins.
    pub async fn cycle_statement(
        &self,
        username: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> ResultEngine<CycleReport> {
        let user = self.user(username).await?;
        if end.is_some_and(|end| end <= start) {
            return Err(EngineError::InvalidInput(
                "cycle end must be after its start".to_string(),
            ));
        }
        let window = CycleWindow::closed(start, end, user.anchor_day);
        self.aggregate(&user.username, window, SortOrder::Chronological)
            .await
    }

    /// Statement to export for `period`.
    ///
    /// For a calendar month, the cycle is the earliest allocation starting in
    /// that month; when there is none the report carries the first day of the
    /// month.
    pub async fn statement(
        &self,
        username: &str,
        period: StatementPeriod,
        today: NaiveDate,
    ) -> ResultEngine<CycleReport> {
        let user = self.user(username).await?;
        let start = match period {
            StatementPeriod::Current => cycle_start(today, user.anchor_day),
            StatementPeriod::Month { year, month } => {
                match self.allocation_in_month(&user.username, year, month).await? {
                    Some(allocation) => allocation.cycle_start,
                    None => {
                        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                            EngineError::InvalidInput(format!("invalid month {year}-{month}"))
                        })?;
                        return Ok(CycleReport::NoAllocation { cycle_start: first });
                    }
                }
            }
        };
        self.cycle_statement(&user.username, start, None).await
    }
}

//! Budget cycle endpoints.

use api_types::cycle::{BudgetList, BudgetNew, BudgetTarget, BudgetView, CycleView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Allocation, CycleReport, Money, User, cycle_start};

use crate::{ServerError, server::ServerState, transactions::transaction_view};

pub(crate) fn budget_view(allocation: &Allocation) -> BudgetView {
    BudgetView {
        id: allocation.id,
        cycle_start: allocation.cycle_start,
        allocated_minor: allocation.allocated.minor(),
        currency: api_types::Currency::Inr,
    }
}

/// Live view of the running cycle, newest spends first.
pub async fn live_view(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CycleView>, ServerError> {
    match state
        .engine
        .current_cycle(&user.username, state.today())
        .await?
    {
        CycleReport::Ready(statement) => Ok(Json(CycleView {
            cycle_start: statement.cycle_start,
            budget: budget_view(&statement.allocation),
            transactions: statement.transactions.iter().map(transaction_view).collect(),
            total_spent_minor: statement.total_spent.minor(),
            remaining_balance_minor: statement.remaining_balance.minor(),
        })),
        CycleReport::NoAllocation { cycle_start } => Err(ServerError::NoData {
            message: format!(
                "No budget set for the cycle starting {}",
                cycle_start.format("%d %b %Y")
            ),
            redirect: "/set_budget".to_string(),
        }),
    }
}

/// The cycle a budget set now would be credited to.
pub async fn budget_target(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Json<BudgetTarget> {
    Json(BudgetTarget {
        cycle_start: cycle_start(state.today(), user.anchor_day),
    })
}

pub async fn set_budget(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let amount = Money::parse_positive(&payload.salary)?;
    let allocation = state
        .engine
        .set_budget(&user.username, amount, state.today())
        .await?;
    Ok((StatusCode::CREATED, Json(budget_view(&allocation))))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetList>, ServerError> {
    let budgets = state
        .engine
        .list_allocations(&user.username)
        .await?
        .iter()
        .map(budget_view)
        .collect();
    Ok(Json(BudgetList { budgets }))
}

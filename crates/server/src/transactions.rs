//! Transactions API endpoints

use api_types::transaction::{TransactionNew, TransactionView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Money, Transaction, User};

use crate::{ServerError, server::ServerState};

pub(crate) fn transaction_view(tx: &Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        date: tx.date,
        time: tx.time,
        amount_minor: tx.amount.minor(),
        description: tx.description.clone(),
    }
}

/// Record a spend dated now, in the server's zone.
pub async fn add(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount = Money::parse_positive(&payload.amount)?;
    let tx = state
        .engine
        .record_transaction(
            &user.username,
            amount,
            &payload.description,
            state.local_now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_view(&tx))))
}

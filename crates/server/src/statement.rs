//! PDF statement download.

use api_types::statement::StatementQuery;
use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use engine::{CycleReport, StatementPeriod, User};
use report::{StatementDocument, render_statement, statement_filename};

use crate::{ServerError, server::ServerState};

fn period(query: &StatementQuery) -> Result<StatementPeriod, ServerError> {
    match (query.year, query.month) {
        (Some(year), Some(month)) => Ok(StatementPeriod::Month { year, month }),
        (None, None) => Ok(StatementPeriod::Current),
        _ => Err(ServerError::Generic(
            "year and month must be given together".to_string(),
        )),
    }
}

pub async fn download(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<StatementQuery>,
) -> Result<Response, ServerError> {
    let period = period(&query)?;
    let generated_at = state.local_now();

    let statement = match state
        .engine
        .statement(&user.username, period, generated_at.date())
        .await?
    {
        CycleReport::Ready(statement) => *statement,
        CycleReport::NoAllocation { cycle_start } => {
            return Err(ServerError::NoData {
                message: format!(
                    "No budget allocation found for the cycle starting {}",
                    cycle_start.format("%d %b %Y")
                ),
                redirect: "/".to_string(),
            });
        }
    };

    let filename = statement_filename(statement.cycle_start);
    let document = StatementDocument {
        operator: user.username,
        generated_at,
        statement,
    };
    let bytes = tokio::task::spawn_blocking(move || render_statement(&document))
        .await
        .map_err(|err| ServerError::Internal(format!("statement rendering panicked: {err}")))??;

    tracing::info!("statement {filename} downloaded");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

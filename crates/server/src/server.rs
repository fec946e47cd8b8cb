use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, cycle, statement, transactions, user};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Zone "today" and transaction timestamps are taken in.
    pub timezone: Tz,
    pub session_ttl: Duration,
}

impl ServerState {
    pub fn new(engine: Engine, timezone: Tz, session_ttl: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            timezone,
            session_ttl,
        }
    }

    /// Current wall-clock time in the configured zone.
    pub(crate) fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.local_now().date()
    }
}

/// Token of the session that authenticated the request.
#[derive(Clone, Debug)]
pub(crate) struct SessionToken(pub String);

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(EngineError::Unauthorized("missing bearer token".to_string()).into());
    };

    let user = state
        .engine
        .session_user(bearer.token(), Utc::now())
        .await?;

    request
        .extensions_mut()
        .insert(SessionToken(bearer.token().to_string()));
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/", get(cycle::live_view))
        .route("/logout", post(user::logout))
        .route("/set_budget", get(cycle::budget_target).post(cycle::set_budget))
        .route("/add_transaction", post(transactions::add))
        .route("/update_profile", post(user::update_profile))
        .route("/cycles", get(cycle::list))
        .route("/download_statement", get(statement::download))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/login", post(user::login))
        .route("/register", post(user::register))
        .merge(protected)
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

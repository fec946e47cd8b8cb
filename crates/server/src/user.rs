//! Account endpoints: registration, login, logout and profile.

use api_types::user::{LoginUser, Profile, ProfileUpdate, RegisterUser, SessionToken};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{AnchorDay, EngineError, Money, User};

use crate::{ServerError, server::{self, ServerState}};

fn profile(user: User) -> Profile {
    Profile {
        username: user.username,
        billing_cycle: user.anchor_day.get(),
    }
}

/// Create an account with the allocation of its first cycle, and log it in.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<SessionToken>), ServerError> {
    let anchor_day = AnchorDay::new(payload.billing_cycle)?;
    let salary = Money::parse_positive(&payload.salary)?;

    let user = state
        .engine
        .register_user(
            &payload.username,
            &payload.password,
            anchor_day,
            salary,
            state.today(),
        )
        .await?;
    let token = state
        .engine
        .open_session(&user.username, Utc::now(), state.session_ttl)
        .await?;

    Ok((StatusCode::CREATED, Json(SessionToken { token })))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<SessionToken>, ServerError> {
    let user = match state
        .engine
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(EngineError::InvalidCredentials) => {
            tracing::warn!("rejected login for {}", payload.username);
            return Err(EngineError::InvalidCredentials.into());
        }
        Err(err) => return Err(err.into()),
    };

    let token = state
        .engine
        .open_session(&user.username, Utc::now(), state.session_ttl)
        .await?;
    Ok(Json(SessionToken { token }))
}

pub async fn logout(
    Extension(token): Extension<server::SessionToken>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.close_session(&token.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change the billing cycle day. Takes effect from the next resolved cycle.
pub async fn update_profile(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ServerError> {
    let anchor_day = AnchorDay::new(payload.billing_cycle)?;
    let user = state
        .engine
        .update_anchor_day(&user.username, anchor_day)
        .await?;
    Ok(Json(profile(user)))
}

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveValue, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, User, sessions, users};

use super::Engine;

impl Engine {
    /// Issue a new bearer token for `username`, valid for `ttl` from `now`.
    pub async fn open_session(
        &self,
        username: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> ResultEngine<String> {
        let token = Uuid::new_v4().simple().to_string();
        sessions::ActiveModel {
            token: ActiveValue::Set(token.clone()),
            user_id: ActiveValue::Set(username.to_string()),
            created_at: ActiveValue::Set(now),
            expires_at: ActiveValue::Set(now + ttl),
        }
        .insert(&self.database)
        .await?;
        Ok(token)
    }

    /// Resolve the user owning a live session.
    pub async fn session_user(&self, token: &str, now: DateTime<Utc>) -> ResultEngine<User> {
        let found = sessions::Entity::find_by_id(token.to_string())
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?;

        match found {
            Some((session, Some(user))) if session.expires_at > now => User::try_from(user),
            Some((_, Some(_))) => Err(EngineError::Unauthorized("session expired".to_string())),
            _ => Err(EngineError::Unauthorized("unknown session".to_string())),
        }
    }

    /// Delete a session (logout). Unknown tokens are ignored.
    pub async fn close_session(&self, token: &str) -> ResultEngine<()> {
        sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Remove every session that expired before `now`; returns how many.
    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> ResultEngine<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(now))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }
}

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    Allocation, AnchorDay, EngineError, Money, ResultEngine, User, cycle::cycle_start, cycles,
    users,
    util::normalize_username,
};

use super::{Engine, conflict_as_existing, with_tx};

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Password(err.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> ResultEngine<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| EngineError::Password(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl Engine {
    /// Create a user together with the allocation of the cycle containing
    /// `today`.
    ///
    /// Both rows are written in one DB transaction: a user never exists
    /// without its first allocation.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        anchor_day: AnchorDay,
        salary: Money,
        today: NaiveDate,
    ) -> ResultEngine<User> {
        let username = normalize_username(username)?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let allocation = Allocation::new(
            username.clone(),
            cycle_start(today, anchor_day),
            salary,
            now,
        )?;
        let password_hash = hash_password(password)?;

        let user_model = users::ActiveModel {
            username: ActiveValue::Set(username.clone()),
            password_hash: ActiveValue::Set(password_hash),
            anchor_day: ActiveValue::Set(anchor_day.get() as i32),
            created_at: ActiveValue::Set(now),
        };

        // The primary key on `users.username` decides between concurrent
        // registrations of the same name.
        let user = with_tx!(self, |db_tx| {
            let user = user_model
                .insert(&db_tx)
                .await
                .map_err(|err| conflict_as_existing(err, || username.clone()))?;
            cycles::ActiveModel::from(&allocation).insert(&db_tx).await?;
            User::try_from(user)
        })?;

        tracing::info!(
            "registered user {} with anchor day {}",
            user.username,
            user.anchor_day
        );
        Ok(user)
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_username(username).map_err(|_| EngineError::InvalidCredentials)?;
        let Some(model) = users::Entity::find_by_id(username)
            .one(&self.database)
            .await?
        else {
            return Err(EngineError::InvalidCredentials);
        };

        if !verify_password(password, &model.password_hash)? {
            return Err(EngineError::InvalidCredentials);
        }
        User::try_from(model)
    }

    /// Load a user profile. The name is normalised the way registration
    /// stores it.
    pub async fn user(&self, username: &str) -> ResultEngine<User> {
        let username = normalize_username(username)?;
        users::Entity::find_by_id(username.clone())
            .one(&self.database)
            .await?
            .ok_or(EngineError::KeyNotFound(username))
            .and_then(User::try_from)
    }

    /// Change the day cycles are anchored to.
    ///
    /// Existing allocations keep their start date; only cycles resolved from
    /// now on use the new anchor.
    pub async fn update_anchor_day(
        &self,
        username: &str,
        anchor_day: AnchorDay,
    ) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))?;

        let mut active: users::ActiveModel = model.into();
        active.anchor_day = ActiveValue::Set(anchor_day.get() as i32);
        let updated = active.update(&self.database).await?;
        User::try_from(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn corrupted_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(EngineError::Password(_))
        ));
    }
}

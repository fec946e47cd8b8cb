//! The module contains the error the engine can throw.
//!
//! The errors fall in three groups:
//!
//! - validation errors ([`InvalidAmount`], [`InvalidAnchorDay`],
//!   [`InvalidInput`], [`InvalidCredentials`], [`ExistingKey`]) which reject
//!   the action without touching the state;
//! - lookup errors ([`KeyNotFound`], [`Unauthorized`]);
//! - storage errors ([`Database`]) which are fatal for the request.
//!
//! "No allocation for this cycle" is not an error: see
//! [`CycleReport::NoAllocation`].
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidAnchorDay`]: EngineError::InvalidAnchorDay
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Database`]: EngineError::Database
//!  [`CycleReport::NoAllocation`]: crate::CycleReport::NoAllocation
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid anchor day: {0}")]
    InvalidAnchorDay(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Password hashing failed: {0}")]
    Password(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidAnchorDay(a), Self::InvalidAnchorDay(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Password(a), Self::Password(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

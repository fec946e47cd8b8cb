//! Hakogane engine: budget cycles, allocations, spend transactions and the
//! statements built from them.
//!
//! The pure parts ([`cycle`], [`Statement::from_parts`], [`Money`]) never touch
//! storage or the clock. [`Engine`] owns the database connection it is built
//! with and exposes every operation the server and the admin CLI need.

pub use currency::Currency;
pub use cycle::{AnchorDay, CycleWindow, cycle_start, days_in_month, next_cycle_start, target_day};
pub use cycles::Allocation;
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use statement::{CycleReport, SortOrder, Statement, StatementPeriod};
pub use transactions::{MAX_DESCRIPTION_LEN, Transaction};
pub use users::User;

mod currency;
pub mod cycle;
mod cycles;
mod error;
mod money;
mod ops;
mod sessions;
mod statement;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

//! User accounts.
//!
//! Users are created through registration and only read afterwards
//! (plus last-login bookkeeping); there are no profile endpoints.

pub mod models;
pub mod repositories;

pub use repositories::{PgUserRepository, UserRepository};

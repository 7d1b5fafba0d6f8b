//! Registration, login and bearer tokens.

pub mod dtos;
pub mod handlers;
pub mod model;
pub mod password;
pub mod routes;
pub mod services;

pub use services::{AuthService, TokenService};

mod user_repository;

pub use user_repository::{PgUserRepository, UserRepository, USERNAME_TAKEN};

pub mod attachments;
pub mod auth;
pub mod categories;
pub mod tasks;
pub mod users;

pub mod auth;
pub mod categories;
pub mod health;
pub mod posts;
pub mod users;

mod validate;

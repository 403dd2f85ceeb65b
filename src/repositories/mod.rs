//! Data-access layer: one module of sqlx queries per entity.
//!
//! Repositories return raw `sqlx::Error`; services translate them into
//! `AppError` with entity-specific conflict messages.

pub mod acceptance;
pub mod artifact;
pub mod evidence;
pub mod interview;
pub mod organization;
pub mod project;
pub mod user;

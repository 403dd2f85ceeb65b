//! Database models and DTOs for all domain entities.

pub mod acceptance;
pub mod artifact;
pub mod evidence;
pub mod interview;
pub mod organization;
pub mod pagination;
pub mod project;
pub mod user;

//! Business-rule layer between routes and repositories.

pub mod acceptance;
pub mod access;
pub mod artifact;
pub mod auth;
pub mod evidence;
pub mod evidence_code;
pub mod interview;
pub mod organization;
pub mod project;
pub mod storage;

//! Request extractors: authentication, role checks, and multipart uploads.

pub mod auth;
pub mod rbac;
pub mod upload;

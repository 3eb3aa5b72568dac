//! Data models shared across database access and API handlers.

pub mod auth;
pub mod course;
pub mod learning;
pub mod user;

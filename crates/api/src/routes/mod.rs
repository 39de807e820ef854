//! Request handlers, grouped the way the resources are.

pub mod auth;
pub mod projects;
pub mod tasks;
pub mod users;

//! Caregate gateway — terminal conversation and the audit-report server.

pub mod chat;
pub mod server;

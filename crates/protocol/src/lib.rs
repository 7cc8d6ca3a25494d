//! Wire protocol types for the Cofre storage API.
//!
//! Every request and response body exchanged with the server is defined
//! here, together with the transfer constants and the chunk header names.
//! The shapes match the server's JSON exactly; nothing in this crate does
//! I/O.

pub mod constants;
pub mod messages;
pub mod types;

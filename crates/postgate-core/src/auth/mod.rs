//! Session state for the authenticated client.
//!
//! The access token lives only in memory for the lifetime of the process.
//! Nothing here touches disk.

pub mod session;

pub use session::Session;

//! banhammer/crates/domains/src/lib.rs
//!
//! Records, address matching and port definitions for the ban engine.

pub mod address;
pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use address::*;
pub use errors::*;
pub use models::*;
pub use ports::*;

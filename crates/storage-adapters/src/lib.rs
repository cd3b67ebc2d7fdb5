//! # storage-adapters
//!
//! Implementations of the domain ports. Only the in-memory backend lives
//! here; the host server plugs its own database and connection registry in
//! behind the same traits.

pub mod memory;

pub use memory::{
    InMemoryBanStore, InMemoryConnections, InMemoryIdentityRegistry, InMemorySessionDirectory,
};

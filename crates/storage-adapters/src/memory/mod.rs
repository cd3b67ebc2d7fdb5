//! DashMap-backed adapters. Every write to a single record happens under its
//! shard lock, so per-key updates are atomic and immediately visible.

mod bans;
mod connections;
mod identities;
mod sessions;

pub use bans::InMemoryBanStore;
pub use connections::InMemoryConnections;
pub use identities::InMemoryIdentityRegistry;
pub use sessions::InMemorySessionDirectory;

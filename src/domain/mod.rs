//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Rich domain types (what the dashboard renders)
//! - `wire.rs` — Raw serde structs matching upstream responses
//! - `convert.rs` — `From` conversions from wire to domain types
//! - `state.rs` — State containers with update methods
//! - `client.rs` — Sub-client with HTTP methods
//!
//! `tracked` holds the favorite-aware machinery shared by `crypto` and
//! `weather`.

pub mod crypto;
pub mod news;
pub mod tracked;
pub mod weather;

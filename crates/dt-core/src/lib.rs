//! `dt-core` — foundational value types shared by the `rust_dt` trace crates.
//!
//! This crate intentionally has no `dt-*` dependencies and no required
//! external ones (only optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId` (named moving entity)                      |
//! | [`geo`]         | `Coord` (planar x/y position)                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Coord;
pub use ids::EntityId;

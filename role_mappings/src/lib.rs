//! # Role Mappings
//!
//! The reaction-for-role table: which role a reaction on a given message grants,
//! per guild. This crate is the single source of truth for mapping state and
//! knows nothing about the chat platform itself.
//!
//! ## Core Components
//!
//! - **ids**: Snowflake identifier newtypes and the validated [`Mapping`] triple
//! - **store**: The lock-guarded guild -> message -> role table
//! - **codec**: The JSON file the table is loaded from and saved to

pub mod codec;
mod error;
pub mod ids;
pub mod store;

pub use codec::*;
pub use error::*;
pub use ids::*;
pub use store::*;

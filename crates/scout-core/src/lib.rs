//! Core types and trait definitions for the Scout evaluation engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the record and fact model, the unit normalizer, the statistic
//! catalog, and the [`store::RecordStore`] abstraction that storage backends
//! implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod fact;
pub mod normalize;
pub mod player;
pub mod profile;
pub mod rating;
pub mod record;
pub mod report;
pub mod row;
pub mod season;
pub mod store;
pub mod value;

pub use error::{Error, Result};

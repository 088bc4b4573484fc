//! Implementation of the `#[derive(Record)]` macro.
//!
//! Turns `#[field(...)]` annotations into the record accessor and declared
//! schema used by `campus-query`.

mod attrs;
mod derive;

pub use derive::record_derive_impl;

//! Trait definitions for Nekos API operations.
//!
//! Each entity type implements the traits it supports by naming its routes;
//! the request plumbing lives in the provided methods.

mod get;
mod list;

pub use get::Get;
pub use list::List;

//! Core types and the sharing authorization engine for Weft.
//!
//! This crate has no HTTP or database dependencies. Every decision it makes
//! is a pure function of a requester identity and a loaded resource snapshot.

pub mod access;
pub mod admin;
pub mod bindings;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod public_share;
pub mod resource;
pub mod share;
pub mod store;
pub mod visibility;

pub use error::{Error, FieldError, Result, ValidationError};

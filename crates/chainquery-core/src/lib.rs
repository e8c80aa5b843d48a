//! Core types and client-side state for the ChainQuery assistant.
//!
//! This crate has no HTTP or database dependencies. The
//! storage backends and the API client build on the abstractions defined
//! here; the terminal UI composes all of them.

pub mod animation;
pub mod error;
pub mod query;
pub mod route;
pub mod session;
pub mod storage;
pub mod token;
pub mod viewer;

pub use error::{Error, Result};

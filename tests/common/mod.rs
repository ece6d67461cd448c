//! Shared test utilities for ipld integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Assertion macros are `#[macro_export]`ed and available
//! at the harness crate root.

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;

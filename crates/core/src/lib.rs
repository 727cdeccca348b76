//! Pure rule and query engines for the campus front-end.
//!
//! Everything here is synchronous and side-effect free: callers pass a
//! schema or query description plus plain records in, and get a plain result
//! back. UI state stays with the caller (see [`views`]).

pub mod config;
pub mod error;
pub mod forms;
pub mod query;
pub mod types;
pub mod validation;
pub mod value;
pub mod views;

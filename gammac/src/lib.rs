#![warn(rust_2018_idioms)]

//! A compiler from enum, union and struct declarations to C++.

pub mod cpp;
pub mod driver;
pub mod files;
pub mod pass;
pub mod reporting;
pub mod source;
pub mod surface;

pub use driver::{Driver, Output, Status};

/// The URL to direct users to when they encounter a compiler bug.
pub const BUG_REPORT_URL: &str = concat!(env!("CARGO_PKG_REPOSITORY"), "/issues/new");

//! Passes between intermediate languages.

pub mod surface_to_cpp;

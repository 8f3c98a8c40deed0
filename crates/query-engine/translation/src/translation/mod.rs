//! Translate tagged values to and from the wire text a backend exchanges.

pub mod arrays;
pub mod cells;
pub mod error;
pub mod params;

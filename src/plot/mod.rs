//! Plot rendering.
//!
//! - deterministic ASCII/Unicode terminal plots (`ascii`)
//! - SVG chart files via Plotters (`chart`)

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;

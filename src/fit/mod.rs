//! Curve fitting.
//!
//! Responsibilities:
//!
//! - validate the fit inputs (lengths, finiteness, positive uncertainties)
//! - run weighted Levenberg-Marquardt for the selected model
//! - derive parameter uncertainties from the covariance diagonal

pub mod fitter;

pub use fitter::*;

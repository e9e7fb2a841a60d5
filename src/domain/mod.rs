//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model-variant enum (`ModelKind`)
//! - measurement series types (`Series`, `DisplacementData`, `ScatterData`)
//! - fit outputs (`FitResult`, `FitQuality`, `PointResidual`)
//! - run configuration (`FitConfig`) and the curve JSON schema (`CurveFile`)

pub mod types;

pub use types::*;

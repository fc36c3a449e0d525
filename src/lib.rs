//! Record Generator
//!
//! Keeps immutable-record companions of C# `[Record]` types in sync:
//!
//! - **Shape extraction**: turn a `[Record]` declaration into a [`TypeShape`]
//! - **Synthesis**: emit the stamped companion partial (constructor + `With*` mutators)
//! - **Classification**: decide whether an existing companion is missing, invalid,
//!   stale or up to date, using the synthesizer as the oracle
//! - **Location**: find the stamped companion of a shape across source files
//!
//! See [`analysis`] for the whole-project driver and [`fix`] for edit planning.

#![allow(clippy::result_large_err)]

pub mod analysis;
pub mod attribute;
pub mod classify;
pub mod config;
pub mod error;
pub mod fix;
pub mod locator;
pub mod shape;
pub mod stamp;
pub mod synth;

pub use classify::{classify, ClassificationResult, InvalidReason};
pub use error::ShapeError;
pub use locator::{locate_companion, GeneratedArtifact};
pub use shape::{extract_shape, PropertyShape, TypeShape};
pub use synth::synthesize;

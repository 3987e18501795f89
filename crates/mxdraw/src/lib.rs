#![forbid(unsafe_code)]

//! `mxdraw` builds Draw.io (mxGraph) diagrams from Rust.
//!
//! The object model, style codec, XML writer and importer come from `mxdraw-core` and are
//! re-exported at the crate root.
//!
//! # Features
//!
//! - `charts` (default): tree, bar chart, pie chart and legend builders (`mxdraw::charts`)

pub use mxdraw_core::*;

#[cfg(feature = "charts")]
pub use mxdraw_charts as charts;

//! Rebajon — catalog extractor for the Ara retail site.
//!
//! Drives a headless Chromium instance at the regional "rebajon" pages,
//! intercepts the network exchange that carries the product catalog, and
//! flattens each raw product record into a tabular row.
//!
//! This library crate exposes the pipeline modules for integration testing.

pub mod catalog;
pub mod normalize;
pub mod pipeline;
pub mod region;
pub mod renderer;
pub mod resolver;
pub mod scan;
pub mod table;

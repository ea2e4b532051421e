//! Driftbelt game library crate.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg_attr(coverage_nightly, coverage(off))]
pub mod app;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod audio;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod error;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod formatter;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod platform;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod render;

pub mod asset;
pub mod constants;
pub mod entity;
pub mod input;
pub mod math;
pub mod profiling;
pub mod save;
pub mod state;
pub mod texture;
pub mod timing;

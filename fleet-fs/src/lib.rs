//! Filesystem abstraction for fleetcheck.
//!
//! This crate provides:
//! - `Filesystem` trait for reading inputs and writing report artifacts
//! - `RealFilesystem` backed by `std::fs`
//! - `MockFilesystem` for in-memory tests

pub mod filesystem;

pub use filesystem::{Filesystem, FsError, MockFilesystem, RealFilesystem};

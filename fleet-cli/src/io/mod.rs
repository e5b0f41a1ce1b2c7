//! IO helpers for CLI operations.
//!
//! - Loading the registry snapshot, inventory and config files
//! - Writing report artifacts (report.txt, report.html, summary.json)

pub mod input_loader;
pub mod output_writer;

pub use input_loader::{load_config, load_inventory, load_registry, InputError};
pub use output_writer::{OutputWriter, OutputWriterError, WrittenFiles};

//! SLA Merge Library
//!
//! Pairs Community Board resolution PDFs with their SLA stipulation PDFs
//! and merges each pair into one document. This library provides
//! functionality to:
//! - Identify and classify PDFs by file name
//! - Group documents that share an identifier and report the leftovers
//! - Merge each complete pair, resolution first
//! - Merge two arbitrary PDFs in a chosen order
//!
//! # Example
//!
//! ```no_run
//! use sla_merge::orchestrate::{auto_merge, default_output_dir};
//! use sla_merge::pairing::Convention;
//! use std::path::Path;
//!
//! let folder = Path::new("Resolution Document Components");
//! let report = auto_merge(folder, &default_output_dir(folder), &Convention::default())
//!     .expect("Failed to scan folder");
//!
//! for issue in &report.issues {
//!     println!("skipped: {}", issue);
//! }
//! ```

pub mod error;
pub mod orchestrate;
pub mod pairing;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, Result};

#![warn(missing_docs)]
//! Small helpers shipped with cachet: Luhn checksums, path containment and a
//! development reloader.

pub mod autoreload;
pub mod checksums;
pub mod path;

pub use checksums::{luhn, luhn_number};
pub use path::{PathError, abspath, safe_join};

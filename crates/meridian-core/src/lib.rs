//! Core shared types for Meridian.
//!
//! This crate holds the module data model consumed by descriptor generation, the
//! deterministic project identifiers, and the small filesystem helpers the other crates
//! write through.

mod fs;
mod id;
mod module;

pub use fs::{write_file_atomic, WriteError};
pub use id::ProjectId;
pub use module::{dangling_references, duplicate_modules, DuplicateModule, Module, ModuleSet};

//! Generic utility primitives with zero domain knowledge.
//!
//! - `archive` - Zip unpacking and directory packing
//! - `command` - External process execution with error handling
//! - `io` - File I/O with consistent error handling
//! - `parser` - Text extraction from small config files
//! - `template` - String template rendering

pub mod archive;
pub mod command;
pub mod io;
pub mod parser;
pub mod template;

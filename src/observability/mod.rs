//! Structured logging to a rotating JSON file.
//!
//! # Architecture
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer (JSON) → RotatingLog → fesnuk.log
//! ```
//!
//! # Configuration
//!
//! Level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` in [`Config`](crate::Config)
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - `init`: subscriber setup
//! - `file_writer`: size-rotated log file

mod file_writer;
mod init;

pub use file_writer::RotatingLog;
pub use init::init_tracing;

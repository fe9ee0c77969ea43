//! # CinderKV
//!
//! An embeddable, log-structured key-value store with:
//! - An append-only data log with a fixed big-endian record format
//! - An in-memory index rebuilt by replaying the log on open
//! - Vacuum compaction that rewrites only live records
//! - Single-writer/multi-reader concurrency model
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                               │
//! │            (Single Writer / Multi Reader RwLock)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   LogFile   │◄─────────│    Index    │
//!   │  (DATA)     │  offsets │  (HashMap)  │
//!   └──────┬──────┘          └─────────────┘
//!          │ replay on open,
//!          │ vacuum rewrites live records
//!          ▼
//!   ┌─────────────┐
//!   │  DATA.MER   │──── rename over DATA
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod index;
pub mod compaction;
pub mod command;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CinderError, Result};
pub use config::Config;
pub use command::{Command, Reply};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CinderKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Command definitions
//!
//! A command is one engine operation in value form, so front ends (the CLI)
//! can build it from input and hand it to `Engine::execute`.

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },

    /// Count live keys
    Size,

    /// Compact the log
    Vacuum,
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Outcome of a get; `None` when the key has no live value
    Value(Option<Vec<u8>>),

    /// A mutation or vacuum completed
    Done,

    /// Number of live keys
    Size(usize),
}

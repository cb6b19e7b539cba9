//! Branch-aware alternative to git submodules.
//!
//! Salt keeps a full hidden clone of every declared submodule under
//! `.salt/repos/<name>` and mirrors its files (minus `.git`) into the parent
//! tree. Which submodule branch is checked out follows the parent branch
//! through wildcard branch mappings declared in `salt.conf`.
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod git;
pub mod hash;
pub mod process;
pub mod resolver;
pub mod state;
pub mod style;

// Re-export commonly used types
pub use classify::SyncStatus;
pub use config::{SaltConfig, Submodule};
pub use error::{Result, SaltError};
pub use state::{SubmoduleState, SyncState};

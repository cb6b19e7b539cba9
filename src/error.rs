use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaltError {
   #[error("salt.conf not found (run `salt init` or `salt add` first)")]
   ConfigNotFound,

   #[error("Failed to parse salt.conf at line {line}: {reason}")]
   ConfigParseError { line: usize, reason: String },

   #[error("Submodule '{0}' not found in salt.conf")]
   SubmoduleNotFound(String),

   #[error("Submodule '{0}' already exists")]
   SubmoduleAlreadyExists(String),

   #[error("Path '{0}' already exists in the parent tree")]
   PathAlreadyExists(String),

   #[error("Source repository for '{0}' is missing (run `salt resolve`)")]
   SourceRepoNotFound(String),

   #[error("No sync state recorded for '{0}' (run `salt sync` first)")]
   NoState(String),

   #[error("No changes to push for '{0}'")]
   NoChanges(String),

   #[error("Uncommitted changes in '{0}' (use --force to override)")]
   UncommittedChanges(String),

   #[error("Branch mismatch for '{name}': files are from '{actual}' but mapping wants '{expected}'")]
   BranchMismatch {
      name:     String,
      expected: String,
      actual:   String,
   },

   #[error("Merge conflict in hidden clone: {0}")]
   MergeConflict(String),

   #[error("Clone failed: {0}")]
   CloneFailed(String),

   #[error("Checkout failed: {0}")]
   CheckoutFailed(String),

   #[error("Pull failed: {0}")]
   PullFailed(String),

   #[error("Push failed: {0}")]
   PushFailed(String),

   #[error("Git command failed: {0}")]
   GitCommandFailed(String),

   #[error("'{command}' timed out after {secs}s")]
   Timeout { command: String, secs: u64 },

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("State file error: {0}")]
   JsonError(#[from] serde_json::Error),

   #[error("{0}")]
   Other(String),
}

impl SaltError {
   /// Skips report the condition and let the run continue with the next
   /// submodule; they are never fatal on their own.
   pub const fn is_skip(&self) -> bool {
      matches!(
         self,
         Self::NoChanges(_) | Self::UncommittedChanges(_) | Self::BranchMismatch { .. }
      )
   }

   /// Process exit code: 2 for configuration problems, 3 for git operation
   /// failures, 1 for everything else.
   pub const fn exit_code(&self) -> i32 {
      match self {
         Self::ConfigNotFound
         | Self::ConfigParseError { .. }
         | Self::SubmoduleNotFound(_)
         | Self::SubmoduleAlreadyExists(_)
         | Self::PathAlreadyExists(_) => 2,
         Self::MergeConflict(_)
         | Self::CloneFailed(_)
         | Self::CheckoutFailed(_)
         | Self::PullFailed(_)
         | Self::PushFailed(_)
         | Self::GitCommandFailed(_)
         | Self::SourceRepoNotFound(_)
         | Self::Timeout { .. } => 3,
         _ => 1,
      }
   }
}

pub type Result<T> = std::result::Result<T, SaltError>;

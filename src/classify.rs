//! Sync status classification from persisted state plus live observations.

use std::fmt;

use serde::Serialize;

use crate::{config::Submodule, resolver, state::SubmoduleState};

/// Where a submodule stands relative to its hidden clone and branch mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncStatus {
   /// Flat copy, state, and hidden clone all agree.
   Synced,
   /// Parent tree edited since the last sync.
   Dirty,
   /// Hidden clone moved (or was never materialized) since the last sync.
   Behind,
   /// Hidden clone has commits not yet pushed to origin.
   Ahead,
   /// Both the parent tree and the hidden clone changed.
   Diverged,
   /// Flat copy came from a branch the current mapping no longer selects.
   Stale,
}

impl SyncStatus {
   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Synced => "SYNCED",
         Self::Dirty => "DIRTY",
         Self::Behind => "BEHIND",
         Self::Ahead => "AHEAD",
         Self::Diverged => "DIVERGED",
         Self::Stale => "STALE",
      }
   }

   /// Upgrade a clean status to `Ahead` when the remote comparison found
   /// unpushed commits. Only meaningful during `status` with a live remote.
   pub const fn considering_ahead(self, ahead: u32) -> Self {
      match self {
         Self::Synced if ahead > 0 => Self::Ahead,
         other => other,
      }
   }
}

impl fmt::Display for SyncStatus {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// Classify one submodule.
///
/// `head_commit` is the hidden clone's current HEAD and `files_hash` the
/// content hash of the flat copy; both are observed by the caller so this
/// function stays deterministic for fixed inputs. A missing state record
/// means the submodule was never synced and needs materialization.
pub fn classify(
   submodule: &Submodule,
   state: Option<&SubmoduleState>,
   parent_branch: &str,
   head_commit: &str,
   files_hash: &str,
) -> SyncStatus {
   let Some(state) = state else {
      return SyncStatus::Behind;
   };

   // A wrong source branch dominates everything else: the flat copy may be
   // entirely from the wrong line of history.
   let expected = resolver::resolve_branch(submodule, parent_branch);
   if state.source_branch != expected {
      return SyncStatus::Stale;
   }

   let parent_changed = files_hash != state.parent_files_hash;
   let source_changed = head_commit != state.last_sync_commit;

   match (parent_changed, source_changed) {
      (true, true) => SyncStatus::Diverged,
      (true, false) => SyncStatus::Dirty,
      (false, true) => SyncStatus::Behind,
      (false, false) => SyncStatus::Synced,
   }
}

//! Persistent sync state: `.salt/state.json`.
//!
//! One record per submodule, rewritten atomically (temp file + rename) after
//! every mutation so a crash mid-save leaves the previous state intact.

use std::{
   collections::BTreeMap,
   fs, io,
   path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const SALT_DIR: &str = ".salt";
pub const STATE_FILE: &str = "state.json";
pub const STATE_VERSION: &str = "1.0";

/// `.salt` directory under the parent root.
pub fn salt_dir(root: &Path) -> PathBuf {
   root.join(SALT_DIR)
}

/// Directory holding the hidden clones.
pub fn repos_dir(root: &Path) -> PathBuf {
   salt_dir(root).join("repos")
}

/// Hidden clone location for one submodule.
pub fn repo_path(root: &Path, name: &str) -> PathBuf {
   repos_dir(root).join(name)
}

/// Last-synced / last-pushed record for one submodule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleState {
   /// Hidden clone HEAD at the last successful sync or pull.
   pub last_sync_commit: String,
   /// Hidden clone HEAD at the last successful push.
   pub last_push_commit: String,
   /// Content hash of the flat copy at the moment of the last sync or push.
   pub parent_files_hash: String,
   /// Branch checked out in the hidden clone at last sync or push.
   pub source_branch: String,
   pub last_sync_time: String,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub last_push_time: Option<String>,
}

/// The whole `.salt/state.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
   pub version:    String,
   pub submodules: BTreeMap<String, SubmoduleState>,
}

impl Default for SyncState {
   fn default() -> Self {
      Self {
         version:    STATE_VERSION.to_string(),
         submodules: BTreeMap::new(),
      }
   }
}

impl SyncState {
   /// Load state from the parent root. A missing file is an empty state.
   pub fn load(root: &Path) -> Result<Self> {
      let path = salt_dir(root).join(STATE_FILE);
      match fs::read_to_string(&path) {
         Ok(contents) => Ok(serde_json::from_str(&contents)?),
         Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
         Err(e) => Err(e.into()),
      }
   }

   /// Persist atomically: serialize to a temp file in `.salt`, then rename
   /// over `state.json`.
   pub fn save(&self, root: &Path) -> Result<()> {
      let dir = salt_dir(root);
      fs::create_dir_all(&dir)?;

      let json = serde_json::to_string_pretty(self)?;
      let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
      io::Write::write_all(&mut tmp, json.as_bytes())?;
      tmp.persist(dir.join(STATE_FILE))
         .map_err(|e| crate::error::SaltError::IoError(e.error))?;
      Ok(())
   }

   pub fn get(&self, name: &str) -> Option<&SubmoduleState> {
      self.submodules.get(name)
   }

   /// First-time record: both commits anchored at the freshly cloned HEAD.
   pub fn initialize(&mut self, name: &str, commit: &str, files_hash: &str, branch: &str) {
      self.submodules.insert(name.to_string(), SubmoduleState {
         last_sync_commit:  commit.to_string(),
         last_push_commit:  commit.to_string(),
         parent_files_hash: files_hash.to_string(),
         source_branch:     branch.to_string(),
         last_sync_time:    now_utc(),
         last_push_time:    None,
      });
   }

   /// After sync/pull/resolve: refresh the sync side, leave push side alone.
   pub fn update_after_sync(&mut self, name: &str, commit: &str, files_hash: &str, branch: &str) {
      match self.submodules.get_mut(name) {
         Some(record) => {
            record.last_sync_commit = commit.to_string();
            record.parent_files_hash = files_hash.to_string();
            record.source_branch = branch.to_string();
            record.last_sync_time = now_utc();
         },
         // A resolve can materialize a submodule that was never added here
         None => self.initialize(name, commit, files_hash, branch),
      }
   }

   /// After push: refresh the push side, leave sync side alone.
   pub fn update_after_push(&mut self, name: &str, commit: &str, files_hash: &str) {
      if let Some(record) = self.submodules.get_mut(name) {
         record.last_push_commit = commit.to_string();
         record.parent_files_hash = files_hash.to_string();
         record.last_push_time = Some(now_utc());
      }
   }

   pub fn remove(&mut self, name: &str) -> bool {
      self.submodules.remove(name).is_some()
   }
}

/// ISO-8601 UTC timestamp with a `Z` suffix.
fn now_utc() -> String {
   Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

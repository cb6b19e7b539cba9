//! Deterministic content hash of a directory tree.
//!
//! The digest covers relative paths and file contents only, so it is stable
//! across filesystem iteration orders, timestamps, and machines. `.git`
//! directories are excluded at any depth.

use std::{fs, io, path::Path};

use sha2::{Digest, Sha256};

use crate::error::Result;

/// One entry scheduled for hashing: root-relative path (`/`-separated) and
/// whether it is a directory.
struct TreeEntry {
   rel_path: String,
   is_dir:   bool,
}

/// Hash the tree rooted at `root`, returning a lowercase hex SHA-256.
///
/// Entries are sorted by relative path bytes; each contributes its path, a
/// 0x00 separator, and (for regular files) its contents.
pub fn hash_tree(root: &Path) -> Result<String> {
   let mut entries = Vec::new();
   collect_entries(root, "", &mut entries)?;
   entries.sort_by(|a, b| a.rel_path.as_bytes().cmp(b.rel_path.as_bytes()));

   let mut hasher = Sha256::new();
   for entry in &entries {
      hasher.update(entry.rel_path.as_bytes());
      hasher.update([0u8]);
      if !entry.is_dir {
         let mut file = fs::File::open(root.join(&entry.rel_path))?;
         io::copy(&mut file, &mut hasher)?;
      }
   }

   Ok(hex::encode(hasher.finalize()))
}

fn collect_entries(dir: &Path, prefix: &str, entries: &mut Vec<TreeEntry>) -> Result<()> {
   for entry in fs::read_dir(dir)? {
      let entry = entry?;
      let name = entry.file_name();
      if name == ".git" {
         continue;
      }
      let Some(name) = name.to_str() else {
         continue; // Non-UTF-8 names cannot be hashed portably
      };

      // symlink_metadata so links are classified as links, not their targets
      let file_type = entry.path().symlink_metadata()?.file_type();
      let rel_path = if prefix.is_empty() {
         name.to_string()
      } else {
         format!("{prefix}/{name}")
      };

      if file_type.is_dir() {
         entries.push(TreeEntry { rel_path: rel_path.clone(), is_dir: true });
         collect_entries(&entry.path(), &rel_path, entries)?;
      } else if file_type.is_file() {
         entries.push(TreeEntry { rel_path, is_dir: false });
      }
      // Symlinks and device files are skipped
   }
   Ok(())
}

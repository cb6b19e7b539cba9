//! Filesystem helpers: `.git`-excluding tree copy and guarded removal.

use std::{fs, path::Path};

use crate::error::Result;

/// Copy `src` into `dst` recursively, skipping any entry named `.git` at any
/// depth. Symlinks and other non-file, non-directory entries are skipped.
/// Existing files in `dst` are overwritten; extra files are left alone.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
   fs::create_dir_all(dst)?;

   for entry in fs::read_dir(src)? {
      let entry = entry?;
      let name = entry.file_name();
      if name == ".git" {
         continue;
      }

      let file_type = entry.file_type()?;
      let target = dst.join(&name);

      if file_type.is_dir() {
         copy_tree(&entry.path(), &target)?;
      } else if file_type.is_file() {
         fs::copy(entry.path(), &target)?;
      }
      // Symlinks and special files are not materialized
   }

   Ok(())
}

/// Remove a directory tree if it exists. Missing path is not an error.
pub fn remove_tree(path: &Path) -> Result<()> {
   if path.exists() {
      fs::remove_dir_all(path)?;
   }
   Ok(())
}

/// Whether a directory exists and contains a `.git` entry (working tree).
pub fn is_git_worktree(path: &Path) -> bool {
   path.join(".git").exists()
}

//! `salt sync`: check out the branch the mapping selects for the current
//! parent branch, update it, and re-copy into the parent tree.

use super::{for_each_submodule, parent_branch, parent_path_dirty, select};
use crate::{
   cli::Ctx,
   config::{SaltConfig, Submodule},
   error::{Result, SaltError},
   fsutil, git, hash, resolver, state,
   state::SyncState,
   style::{self, icons},
};

pub fn run(ctx: &Ctx, name: Option<&str>, force: bool, ci: bool) -> Result<()> {
   let config = SaltConfig::load(&ctx.root)?;
   let mut sync_state = SyncState::load(&ctx.root)?;
   let branch = parent_branch(&ctx.root);
   let submodules = select(&config, name)?;

   for_each_submodule(&submodules, ci, |sub| {
      sync_one(ctx, sub, &mut sync_state, &branch, force)
   })
}

/// One submodule's sync pipeline. Shared with `push --auto-sync`.
pub fn sync_one(
   ctx: &Ctx,
   sub: &Submodule,
   sync_state: &mut SyncState,
   parent_branch: &str,
   force: bool,
) -> Result<()> {
   let target = resolver::resolve_branch(sub, parent_branch);
   let hidden = state::repo_path(&ctx.root, &sub.name);
   if !fsutil::is_git_worktree(&hidden) {
      return Err(SaltError::SourceRepoNotFound(sub.name.clone()));
   }

   if !force && parent_path_dirty(ctx, &sub.path) {
      return Err(SaltError::UncommittedChanges(sub.path.clone()));
   }

   if let Err(e) = git::fetch(&hidden) {
      style::warn(&format!("{}: fetch failed, using local state ({e})", sub.name));
   }
   git::checkout(&hidden, &target)?;
   match git::pull(&hidden, &target) {
      Ok(()) => {},
      Err(e @ SaltError::MergeConflict(_)) => return Err(e),
      Err(e) => {
         style::warn(&format!("{}: pull failed, using local state ({e})", sub.name));
      },
   }

   let flat_path = ctx.root.join(&sub.path);
   fsutil::copy_tree(&hidden, &flat_path)?;

   let head = git::head_commit(&hidden)?;
   let files_hash = hash::hash_tree(&flat_path)?;
   sync_state.update_after_sync(&sub.name, &head, &files_hash, &target);
   sync_state.save(&ctx.root)?;

   ctx.echo(&format!(
      "{} Synced {} {} {}",
      style::success(icons::SUCCESS),
      style::bold(&sub.name),
      style::dim(icons::ARROW),
      style::branch(&target)
   ));
   Ok(())
}

#[cfg(test)]
mod tests {
   use tempfile::TempDir;

   use super::*;
   use crate::config::Submodule;

   #[test]
   fn test_sync_missing_hidden_clone_fails_fast() {
      let dir = TempDir::new().unwrap();
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      let sub = Submodule::new("x", "x", "https://host/x.git", "main");
      let mut sync_state = SyncState::default();

      let err = sync_one(&ctx, &sub, &mut sync_state, "main", false).unwrap_err();
      assert!(matches!(err, SaltError::SourceRepoNotFound(n) if n == "x"));
      assert!(sync_state.get("x").is_none());
   }

   #[test]
   fn test_sync_requires_config() {
      let dir = TempDir::new().unwrap();
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      let err = run(&ctx, None, false, false).unwrap_err();
      assert!(matches!(err, SaltError::ConfigNotFound));
   }
}

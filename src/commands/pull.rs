//! `salt pull`: pull upstream commits into hidden clones (on whatever branch
//! each currently has checked out) and re-copy into the parent tree.

use super::{for_each_submodule, select};
use crate::{
   cli::Ctx,
   config::{SaltConfig, Submodule},
   error::{Result, SaltError},
   fsutil, git, hash, state,
   state::SyncState,
   style::{self, icons},
};

pub fn run(ctx: &Ctx, name: Option<&str>, ci: bool, parallel: bool) -> Result<()> {
   if parallel {
      // Reserved flag; submodule pipelines stay strictly serial for now
      style::warn("--parallel is not implemented yet; pulling serially");
   }

   let config = SaltConfig::load(&ctx.root)?;
   let mut sync_state = SyncState::load(&ctx.root)?;
   let submodules = select(&config, name)?;

   for_each_submodule(&submodules, ci, |sub| pull_one(ctx, sub, &mut sync_state))
}

fn pull_one(ctx: &Ctx, sub: &Submodule, sync_state: &mut SyncState) -> Result<()> {
   let hidden = state::repo_path(&ctx.root, &sub.name);
   if !fsutil::is_git_worktree(&hidden) {
      return Err(SaltError::SourceRepoNotFound(sub.name.clone()));
   }

   let branch = git::current_branch(&hidden)?;

   // Local commits-in-progress must not be tangled up in a pull
   if !git::status_porcelain(&hidden)?.trim().is_empty() {
      return Err(SaltError::UncommittedChanges(format!(".salt/repos/{}", sub.name)));
   }

   git::pull(&hidden, &branch)?;

   let flat_path = ctx.root.join(&sub.path);
   fsutil::copy_tree(&hidden, &flat_path)?;

   let head = git::head_commit(&hidden)?;
   let files_hash = hash::hash_tree(&flat_path)?;
   sync_state.update_after_sync(&sub.name, &head, &files_hash, &branch);
   sync_state.save(&ctx.root)?;

   ctx.echo(&format!(
      "{} Pulled {} ({})",
      style::success(icons::SUCCESS),
      style::bold(&sub.name),
      style::branch(&branch)
   ));
   Ok(())
}

#[cfg(test)]
mod tests {
   use tempfile::TempDir;

   use super::*;

   #[test]
   fn test_pull_missing_hidden_clone() {
      let dir = TempDir::new().unwrap();
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      let sub = Submodule::new("x", "x", "https://host/x.git", "main");
      let mut sync_state = SyncState::default();

      let err = pull_one(&ctx, &sub, &mut sync_state).unwrap_err();
      assert!(matches!(err, SaltError::SourceRepoNotFound(n) if n == "x"));
   }

   #[test]
   fn test_pull_requires_config() {
      let dir = TempDir::new().unwrap();
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      let err = run(&ctx, None, false, false).unwrap_err();
      assert!(matches!(err, SaltError::ConfigNotFound));
   }
}

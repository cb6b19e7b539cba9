//! `salt push`: commit parent-tree edits back into the hidden clone and push
//! them to the submodule's remote.

use super::{for_each_submodule, parent_branch, select, sync};
use crate::{
   cli::Ctx,
   config::{SaltConfig, Submodule},
   error::{Result, SaltError},
   fsutil, git, hash, resolver, state,
   state::SyncState,
   style::{self, icons},
};

pub struct PushOptions {
   pub force:     bool,
   pub auto_sync: bool,
   pub ci:        bool,
}

pub fn run(ctx: &Ctx, name: Option<&str>, opts: &PushOptions) -> Result<()> {
   let config = SaltConfig::load(&ctx.root)?;
   let mut sync_state = SyncState::load(&ctx.root)?;
   let branch = parent_branch(&ctx.root);
   let submodules = select(&config, name)?;

   for_each_submodule(&submodules, opts.ci, |sub| {
      push_one(ctx, sub, &mut sync_state, &branch, opts)
   })
}

fn push_one(
   ctx: &Ctx,
   sub: &Submodule,
   sync_state: &mut SyncState,
   parent_branch: &str,
   opts: &PushOptions,
) -> Result<()> {
   let record = sync_state
      .get(&sub.name)
      .ok_or_else(|| SaltError::NoState(sub.name.clone()))?;

   // Files from the wrong branch must not be committed onto the mapped one.
   let expected = resolver::resolve_branch(sub, parent_branch);
   if record.source_branch != expected && !opts.force {
      if !opts.auto_sync {
         return Err(SaltError::BranchMismatch {
            name:     sub.name.clone(),
            expected,
            actual:   record.source_branch.clone(),
         });
      }
      ctx.echo(&format!(
         "{} {} is on '{}', auto-syncing to '{}'",
         style::info(icons::INFO),
         sub.name,
         record.source_branch,
         expected
      ));
      sync::sync_one(ctx, sub, sync_state, parent_branch, opts.force)?;
   }
   let record = sync_state
      .get(&sub.name)
      .ok_or_else(|| SaltError::NoState(sub.name.clone()))?;

   let flat_path = ctx.root.join(&sub.path);
   let files_hash = hash::hash_tree(&flat_path)?;
   if files_hash == record.parent_files_hash {
      return Err(SaltError::NoChanges(sub.name.clone()));
   }

   let hidden = state::repo_path(&ctx.root, &sub.name);
   if !fsutil::is_git_worktree(&hidden) {
      return Err(SaltError::SourceRepoNotFound(sub.name.clone()));
   }
   fsutil::copy_tree(&flat_path, &hidden)?;

   git::add_all(&hidden)?;
   if git::status_porcelain(&hidden)?.trim().is_empty() {
      // Hashes differed but git sees identical content (e.g. mode-only noise)
      return Err(SaltError::NoChanges(sub.name.clone()));
   }

   git::commit(&hidden, &format!("Update from parent repo (branch: {parent_branch})"))?;

   let branch = git::current_branch(&hidden)?;
   git::push(&hidden, &branch)?;

   let head = git::head_commit(&hidden)?;
   sync_state.update_after_push(&sub.name, &head, &files_hash);
   sync_state.save(&ctx.root)?;

   ctx.echo(&format!(
      "{} Pushed {} {} origin/{}",
      style::success(icons::SUCCESS),
      style::bold(&sub.name),
      style::dim(icons::ARROW),
      style::branch(&branch)
   ));
   Ok(())
}

#[cfg(test)]
mod tests {
   use tempfile::TempDir;

   use super::*;

   fn ctx_in(dir: &TempDir) -> Ctx {
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      ctx
   }

   fn options() -> PushOptions {
      PushOptions { force: false, auto_sync: false, ci: false }
   }

   #[test]
   fn test_push_without_state_fails() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      let sub = Submodule::new("x", "x", "https://host/x.git", "main");
      let mut sync_state = SyncState::default();

      let err = push_one(&ctx, &sub, &mut sync_state, "main", &options()).unwrap_err();
      assert!(matches!(err, SaltError::NoState(n) if n == "x"));
   }

   #[test]
   fn test_push_branch_mismatch_skips() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      let mut sub = Submodule::new("x", "x", "https://host/x.git", "main");
      sub.branch_mappings.insert("dev".to_string(), "develop".to_string());
      let mut sync_state = SyncState::default();
      sync_state.initialize("x", "c1", "h1", "main");

      // Parent moved to dev, files still from main
      let err = push_one(&ctx, &sub, &mut sync_state, "dev", &options()).unwrap_err();
      assert!(err.is_skip());
      match err {
         SaltError::BranchMismatch { expected, actual, .. } => {
            assert_eq!(expected, "develop");
            assert_eq!(actual, "main");
         },
         other => panic!("expected branch mismatch, got {other:?}"),
      }
   }

   #[test]
   fn test_push_no_changes_skips() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      std::fs::create_dir(dir.path().join("x")).unwrap();
      std::fs::write(dir.path().join("x/a.txt"), "same").unwrap();

      let sub = Submodule::new("x", "x", "https://host/x.git", "main");
      let files_hash = crate::hash::hash_tree(&dir.path().join("x")).unwrap();
      let mut sync_state = SyncState::default();
      sync_state.initialize("x", "c1", &files_hash, "main");

      let err = push_one(&ctx, &sub, &mut sync_state, "main", &options()).unwrap_err();
      assert!(matches!(err, SaltError::NoChanges(n) if n == "x"));
   }

   #[test]
   fn test_push_force_ignores_branch_mismatch() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      std::fs::create_dir(dir.path().join("x")).unwrap();
      std::fs::write(dir.path().join("x/a.txt"), "same").unwrap();

      let mut sub = Submodule::new("x", "x", "https://host/x.git", "main");
      sub.branch_mappings.insert("dev".to_string(), "develop".to_string());
      let files_hash = crate::hash::hash_tree(&dir.path().join("x")).unwrap();
      let mut sync_state = SyncState::default();
      sync_state.initialize("x", "c1", &files_hash, "main");

      // With --force the mismatch is waved through; the clean tree then
      // short-circuits as NoChanges before any git call
      let opts = PushOptions { force: true, auto_sync: false, ci: false };
      let err = push_one(&ctx, &sub, &mut sync_state, "dev", &opts).unwrap_err();
      assert!(matches!(err, SaltError::NoChanges(_)));
   }
}

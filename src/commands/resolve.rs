//! `salt resolve`: materialize or refresh hidden clones on their default
//! branches and re-copy the files into the parent tree.

use std::fs;

use super::{for_each_submodule, parent_path_dirty, select};
use crate::{
   cli::Ctx,
   config::{CONFIG_FILE, SaltConfig, Submodule},
   error::{Result, SaltError},
   fsutil, git, hash, state,
   state::SyncState,
   style::{self, icons},
};

pub fn run(ctx: &Ctx, name: Option<&str>, force: bool) -> Result<()> {
   let config = SaltConfig::load_or_default(&ctx.root)?;
   let mut sync_state = SyncState::load(&ctx.root)?;
   let submodules = select(&config, name)?;

   for_each_submodule(&submodules, false, |sub| resolve_one(ctx, sub, &mut sync_state, force))
}

fn resolve_one(ctx: &Ctx, sub: &Submodule, sync_state: &mut SyncState, force: bool) -> Result<()> {
   let hidden = state::repo_path(&ctx.root, &sub.name);

   if !force && parent_path_dirty(ctx, &sub.path) {
      return Err(SaltError::UncommittedChanges(sub.path.clone()));
   }

   let outcome = if fsutil::is_git_worktree(&hidden) {
      if let Err(e) = git::fetch(&hidden) {
         style::warn(&format!("{}: fetch failed, using local state ({e})", sub.name));
      }
      git::checkout(&hidden, &sub.default_branch)?;
      match git::pull(&hidden, &sub.default_branch) {
         Ok(()) => {},
         Err(e @ SaltError::MergeConflict(_)) => return Err(e),
         Err(e) => {
            style::warn(&format!("{}: pull failed, using local state ({e})", sub.name));
         },
      }
      "Updated"
   } else {
      fs::create_dir_all(state::repos_dir(&ctx.root))?;
      style::with_spinner_result(
         &format!("Cloning {} into .salt/repos/{}", sub.url, sub.name),
         || git::clone(&sub.url, &hidden, &sub.default_branch, sub.shallow),
      )?;
      "Resolved"
   };

   let flat_path = ctx.root.join(&sub.path);
   fsutil::copy_tree(&hidden, &flat_path)?;

   let head = git::head_commit(&hidden)?;
   let files_hash = hash::hash_tree(&flat_path)?;
   sync_state.update_after_sync(&sub.name, &head, &files_hash, &sub.default_branch);
   sync_state.save(&ctx.root)?;

   ctx.echo(&format!(
      "{} {outcome} {} {} {}",
      style::success(icons::SUCCESS),
      style::bold(&sub.name),
      style::dim(icons::ARROW),
      sub.path
   ));

   // Salt does not recurse into nested configurations; just point them out.
   if flat_path.join(CONFIG_FILE).exists() {
      ctx.echo(&format!(
         "{} {} declares its own submodules; run salt inside {} to resolve them",
         style::info(icons::INFO),
         sub.name,
         sub.path
      ));
   }
   Ok(())
}

#[cfg(test)]
mod tests {
   use tempfile::TempDir;

   use super::*;

   #[test]
   fn test_resolve_empty_config_is_noop() {
      let dir = TempDir::new().unwrap();
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      run(&ctx, None, false).unwrap();
   }

   #[test]
   fn test_resolve_unknown_name_fails() {
      let dir = TempDir::new().unwrap();
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      let err = run(&ctx, Some("ghost"), false).unwrap_err();
      assert!(matches!(err, SaltError::SubmoduleNotFound(n) if n == "ghost"));
   }
}

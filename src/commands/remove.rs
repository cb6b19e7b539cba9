//! `salt remove`: drop a submodule from config, state, and .salt/repos.
//! The flat copy stays on disk unless --delete-files.

use super::parent_path_dirty;
use crate::{
   cli::Ctx,
   config::SaltConfig,
   error::{Result, SaltError},
   fsutil, git, state,
   state::SyncState,
   style::{self, icons},
};

pub fn run(ctx: &Ctx, name: &str, delete_files: bool, force: bool) -> Result<()> {
   let mut config = SaltConfig::load(&ctx.root)?;
   let Some(sub) = config.find(name).cloned() else {
      return Err(SaltError::SubmoduleNotFound(name.to_string()));
   };

   if delete_files && !force && parent_path_dirty(ctx, &sub.path) {
      return Err(SaltError::UncommittedChanges(sub.path.clone()));
   }

   if delete_files {
      fsutil::remove_tree(&ctx.root.join(&sub.path))?;
      if git::is_repo(&ctx.root) {
         // The path may be untracked; losing the index entry is best-effort
         if let Err(e) = git::rm_cached(&ctx.root, &sub.path) {
            log::debug!("git rm --cached {}: {e}", sub.path);
         }
      }
      ctx.echo(&format!("{} Deleted {}", style::success(icons::SUCCESS), sub.path));
   }

   fsutil::remove_tree(&state::repo_path(&ctx.root, name))?;

   config.remove(name);
   config.save(&ctx.root)?;

   let mut sync_state = SyncState::load(&ctx.root)?;
   sync_state.remove(name);
   sync_state.save(&ctx.root)?;

   ctx.echo(&format!(
      "{} Removed {}{}",
      style::success(icons::SUCCESS),
      style::bold(name),
      if delete_files { "" } else { " (files kept in the parent tree)" }
   ));
   Ok(())
}

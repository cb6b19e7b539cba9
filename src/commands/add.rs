//! `salt add`: clone a submodule and flatten it into the parent tree.

use std::fs;

use crate::{
   cli::Ctx,
   config::{self, SaltConfig, Submodule},
   error::{Result, SaltError},
   fsutil, git, hash, state,
   state::SyncState,
   style::{self, icons},
};

pub struct AddOptions {
   pub url:     String,
   pub path:    Option<String>,
   pub branch:  String,
   pub name:    Option<String>,
   pub shallow: bool,
}

pub fn run(ctx: &Ctx, opts: &AddOptions) -> Result<()> {
   let name = opts.name.clone().unwrap_or_else(|| config::name_from_url(&opts.url));
   if name.is_empty() {
      return Err(SaltError::Other(format!(
         "cannot derive a submodule name from '{}'; pass --name",
         opts.url
      )));
   }
   let path = opts.path.clone().unwrap_or_else(|| name.clone());

   let flat_path = ctx.root.join(&path);
   if flat_path.exists() {
      return Err(SaltError::PathAlreadyExists(path));
   }
   let hidden = state::repo_path(&ctx.root, &name);
   if hidden.exists() {
      return Err(SaltError::SubmoduleAlreadyExists(name));
   }

   fs::create_dir_all(state::repos_dir(&ctx.root))?;
   style::with_spinner_result(&format!("Cloning {} into .salt/repos/{name}", opts.url), || {
      git::clone(&opts.url, &hidden, &opts.branch, opts.shallow)
   })?;

   fsutil::copy_tree(&hidden, &flat_path)?;

   // Salt also works in a parent that is not a git repository; staging the
   // flat copy there is best-effort.
   if git::is_repo(&ctx.root) {
      if let Err(e) = git::add_path(&ctx.root, &path) {
         style::warn(&format!("Could not stage {path} in the parent repo: {e}"));
      }
   }

   let mut submodule = Submodule::new(&name, &path, &opts.url, &opts.branch);
   submodule.shallow = opts.shallow;
   let mut conf = SaltConfig::load_or_default(&ctx.root)?;
   conf.upsert(submodule);
   conf.save(&ctx.root)?;

   let head = git::head_commit(&hidden)?;
   let files_hash = hash::hash_tree(&flat_path)?;
   let mut sync_state = SyncState::load(&ctx.root)?;
   sync_state.initialize(&name, &head, &files_hash, &opts.branch);
   sync_state.save(&ctx.root)?;

   ctx.echo(&format!(
      "{} Added {} {} {} (branch {})",
      style::success(icons::SUCCESS),
      style::bold(&name),
      style::dim(icons::ARROW),
      path,
      style::branch(&opts.branch)
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

   fn opts(url: &str) -> AddOptions {
      AddOptions {
         url:     url.to_string(),
         path:    None,
         branch:  "main".to_string(),
         name:    None,
         shallow: true,
      }
   }

   #[test]
   fn test_add_rejects_existing_path() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      std::fs::create_dir(dir.path().join("x")).unwrap();
      let err = run(&ctx, &opts("https://host/x.git")).unwrap_err();
      assert!(matches!(err, SaltError::PathAlreadyExists(p) if p == "x"));
   }

   #[test]
   fn test_add_rejects_existing_hidden_clone() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      std::fs::create_dir_all(dir.path().join(".salt/repos/x")).unwrap();
      let err = run(&ctx, &opts("https://host/x.git")).unwrap_err();
      assert!(matches!(err, SaltError::SubmoduleAlreadyExists(n) if n == "x"));
   }

   #[test]
   fn test_add_rejects_underivable_name() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      let err = run(&ctx, &opts("/")).unwrap_err();
      assert!(matches!(err, SaltError::Other(_)));
   }
}

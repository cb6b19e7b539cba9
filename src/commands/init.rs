//! `salt init`: create an empty salt.conf and the .salt directory.

use std::fs;

use crate::{
   cli::Ctx,
   config::CONFIG_FILE,
   error::Result,
   state,
   style::{self, icons},
};

const CONFIG_HEADER: &str = "# Salt submodule configuration.\n\
                             # Managed by `salt add` / `salt remove`; edits by hand are fine too.\n";

pub fn run(ctx: &Ctx) -> Result<()> {
   let conf_path = ctx.root.join(CONFIG_FILE);
   if conf_path.exists() {
      ctx.echo(&format!("{} salt.conf already present", style::dim(icons::INFO)));
   } else {
      fs::write(&conf_path, CONFIG_HEADER)?;
      ctx.echo(&format!("{} Created salt.conf", style::success(icons::SUCCESS)));
   }

   let salt_dir = state::salt_dir(&ctx.root);
   fs::create_dir_all(state::repos_dir(&ctx.root))?;

   // Keep hidden clones and state out of the parent index
   let gitignore = salt_dir.join(".gitignore");
   if !gitignore.exists() {
      fs::write(&gitignore, "*\n")?;
   }

   ctx.echo(&format!("{} Initialized {}", style::success(icons::SUCCESS), salt_dir.display()));
   Ok(())
}

#[cfg(test)]
mod tests {
   use tempfile::TempDir;

   use super::*;
   use crate::config::SaltConfig;

   fn ctx_in(dir: &TempDir) -> Ctx {
      let mut ctx = Ctx::new(true, false);
      ctx.root = dir.path().to_path_buf();
      ctx
   }

   #[test]
   fn test_init_creates_layout() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      run(&ctx).unwrap();

      assert!(dir.path().join("salt.conf").exists());
      assert!(dir.path().join(".salt/repos").exists());
      assert_eq!(std::fs::read_to_string(dir.path().join(".salt/.gitignore")).unwrap(), "*\n");
      // The generated file parses to an empty config
      let config = SaltConfig::load(dir.path()).unwrap();
      assert!(config.submodules.is_empty());
   }

   #[test]
   fn test_init_is_idempotent() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      run(&ctx).unwrap();
      std::fs::write(dir.path().join("salt.conf"), "[submodule \"x\"]\n  url = u\n").unwrap();
      run(&ctx).unwrap();
      // Existing config is not clobbered
      let config = SaltConfig::load(dir.path()).unwrap();
      assert_eq!(config.submodules.len(), 1);
   }
}

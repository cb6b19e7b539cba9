//! The command pipelines.
//!
//! Every command loads config and state up front, walks submodules in
//! salt.conf order, and persists state after each successful mutation.
//! Failure policy is shared: skips warn and continue, hard errors are
//! accumulated (or abort the run immediately under --ci).

pub mod add;
pub mod init;
pub mod pull;
pub mod push;
pub mod remove;
pub mod resolve;
pub mod status;
pub mod sync;

use std::path::Path;

use crate::{
   cli::Ctx,
   config::{SaltConfig, Submodule},
   error::{Result, SaltError},
   git,
   style::{self, icons},
};

/// Branch currently checked out in the parent repository. Salt is usable
/// outside a git parent; `main` stands in when HEAD cannot be read.
pub fn parent_branch(root: &Path) -> String {
   git::current_branch(root).unwrap_or_else(|_| "main".to_string())
}

/// The submodules a command operates on: the named one, or all in file
/// order.
pub fn select<'a>(config: &'a SaltConfig, name: Option<&str>) -> Result<Vec<&'a Submodule>> {
   match name {
      Some(n) => config
         .find(n)
         .map(|sub| vec![sub])
         .ok_or_else(|| SaltError::SubmoduleNotFound(n.to_string())),
      None => Ok(config.submodules.iter().collect()),
   }
}

/// Drive `op` over each submodule with the shared failure policy.
///
/// Skips (`NoChanges`, `UncommittedChanges`, `BranchMismatch`) warn and move
/// on. Anything else halts that submodule's pipeline; under `ci` the first
/// hard error aborts the whole run, otherwise errors are reported at the end
/// and the process still exits 0.
pub fn for_each_submodule<F>(submodules: &[&Submodule], ci: bool, mut op: F) -> Result<()>
where
   F: FnMut(&Submodule) -> Result<()>,
{
   let mut failures: Vec<(String, SaltError)> = Vec::new();

   for sub in submodules {
      match op(sub) {
         Ok(()) => {},
         Err(e) if e.is_skip() => {
            style::warn(&format!("{}: {e}", sub.name));
         },
         Err(e) => {
            eprintln!("{} {}: {e}", style::error(icons::ERROR), style::bold(&sub.name));
            if ci {
               return Err(e);
            }
            failures.push((sub.name.clone(), e));
         },
      }
   }

   if !failures.is_empty() {
      eprintln!(
         "{} {} submodule(s) failed: {}",
         style::error(icons::ERROR),
         failures.len(),
         failures.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>().join(", ")
      );
   }
   Ok(())
}

/// Uncommitted parent-tree changes under `path`, if the parent is a git
/// repository at all.
pub fn parent_path_dirty(ctx: &Ctx, path: &str) -> bool {
   git::is_repo(&ctx.root)
      && git::status_porcelain_path(&ctx.root, path)
         .is_ok_and(|out| !out.trim().is_empty())
}

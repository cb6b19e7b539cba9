//! Command-line surface: argument tree and the per-invocation context value.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Branch-aware alternative to git submodules.
#[derive(Debug, Parser)]
#[command(
   name = "salt",
   disable_version_flag = true,
   about = "Branch-aware alternative to git submodules",
   long_about = "Salt keeps full clones of declared submodules under .salt/repos and mirrors \
                 their files into the parent tree. The submodule branch tracked at any moment \
                 is a function of the parent branch, via wildcard branch mappings in salt.conf."
)]
pub struct Cli {
   /// Suppress informational output
   #[arg(short = 'q', long, global = true)]
   pub quiet: bool,

   /// Show extra detail
   #[arg(long, global = true)]
   pub verbose: bool,

   /// Print version
   #[arg(short = 'v', long = "version")]
   pub version: bool,

   #[command(subcommand)]
   pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
   /// Create an empty salt.conf and the .salt directory
   Init,

   /// Add a submodule: clone it and flatten its files into the parent tree
   Add {
      /// Remote git URL
      url: String,

      /// Location in the parent tree (defaults to the submodule name)
      path: Option<String>,

      /// Branch to clone initially
      #[arg(short = 'b', long, default_value = "main")]
      branch: String,

      /// Submodule name (defaults to the last URL segment)
      #[arg(short = 'n', long)]
      name: Option<String>,

      /// Depth-1 clone (the default)
      #[arg(long, overrides_with = "no_shallow")]
      shallow: bool,

      /// Full-history clone
      #[arg(long, overrides_with = "shallow")]
      no_shallow: bool,
   },

   /// Clone or update hidden clones on their default branches and re-copy
   Resolve {
      /// Submodule to resolve (all when omitted)
      name: Option<String>,

      /// Overwrite flat copies that have uncommitted changes
      #[arg(short = 'f', long)]
      force: bool,
   },

   /// Check out the mapped branch for the current parent branch and re-copy
   Sync {
      /// Submodule to sync (all when omitted)
      name: Option<String>,

      /// Sync even if the flat copy has uncommitted changes
      #[arg(short = 'f', long)]
      force: bool,

      /// Fail fast with a machine-friendly exit code
      #[arg(long)]
      ci: bool,
   },

   /// Pull upstream commits into hidden clones and re-copy
   Pull {
      /// Submodule to pull (all when omitted)
      name: Option<String>,

      /// Fail fast with a machine-friendly exit code
      #[arg(long)]
      ci: bool,

      /// Reserved; submodules are processed serially
      #[arg(long)]
      parallel: bool,
   },

   /// Commit parent-tree edits back to the submodule and push
   Push {
      /// Submodule to push (all when omitted)
      name: Option<String>,

      /// Push even when the flat copy is on the wrong branch
      #[arg(short = 'f', long)]
      force: bool,

      /// Run sync first when the flat copy is on the wrong branch
      #[arg(long)]
      auto_sync: bool,

      /// Fail fast with a machine-friendly exit code
      #[arg(long)]
      ci: bool,
   },

   /// Remove a submodule from salt.conf, state, and .salt/repos
   Remove {
      /// Submodule to remove
      name: String,

      /// Also delete the flat copy from the parent tree
      #[arg(long)]
      delete_files: bool,

      /// Delete files even with uncommitted changes
      #[arg(short = 'f', long)]
      force: bool,
   },

   /// Show each submodule's sync status
   Status {
      /// Submodule to inspect (all when omitted)
      name: Option<String>,

      /// Emit a machine-readable JSON document
      #[arg(long)]
      json: bool,
   },
}

/// Per-invocation context passed into every command. Built once from CLI
/// flags before dispatch, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Ctx {
   pub quiet:   bool,
   pub verbose: bool,
   /// Parent repository root (the working directory salt runs in).
   pub root: PathBuf,
}

impl Ctx {
   pub fn new(quiet: bool, verbose: bool) -> Self {
      Self { quiet, verbose, root: PathBuf::from(".") }
   }

   /// Informational line, silenced by --quiet.
   pub fn echo(&self, msg: &str) {
      if !self.quiet {
         println!("{msg}");
      }
   }
}

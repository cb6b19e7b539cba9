//! Typed wrappers around the git binary.
//!
//! Every operation shells out to `git` and classifies failures into the
//! crate's error kinds by inspecting stderr. Network operations carry a
//! timeout; local queries do not.

use std::{path::Path, time::Duration};

use crate::{
   error::{Result, SaltError},
   process::{self, CommandOutput},
};

const CLONE_TIMEOUT: Duration = Duration::from_secs(300);
const NETWORK_TIMEOUT: Duration = Duration::from_secs(120);

fn git(args: &[&str], dir: &Path, timeout: Option<Duration>) -> Result<CommandOutput> {
   process::run("git", args, dir, timeout)
}

/// Clone `url` into `dest`, checking out `branch`. A shallow clone fetches a
/// single commit of a single branch.
pub fn clone(url: &str, dest: &Path, branch: &str, shallow: bool) -> Result<()> {
   // Run from the parent directory and clone into the final path component,
   // so relative `dest` paths cannot be resolved twice.
   let parent = dest.parent().unwrap_or_else(|| Path::new("."));
   let dir_name = dest
      .file_name()
      .ok_or_else(|| SaltError::CloneFailed(format!("invalid clone target {}", dest.display())))?
      .to_string_lossy();
   let args: Vec<&str> = if shallow {
      vec![
         "clone",
         "--depth",
         "1",
         "--branch",
         branch,
         "--single-branch",
         url,
         &dir_name,
      ]
   } else {
      vec!["clone", "--branch", branch, url, &dir_name]
   };

   let out = git(&args, parent, Some(CLONE_TIMEOUT))?;
   if !out.success() {
      return Err(SaltError::CloneFailed(out.stderr.trim().to_string()));
   }
   Ok(())
}

/// Fetch all refs from origin. Callers treat failure as a warning.
pub fn fetch(repo: &Path) -> Result<()> {
   let out = git(&["fetch", "origin"], repo, Some(NETWORK_TIMEOUT))?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!("git fetch failed: {}", out.stderr.trim())));
   }
   Ok(())
}

/// Fetch a single branch from origin (used for ahead/behind comparison).
pub fn fetch_branch(repo: &Path, branch: &str) -> Result<()> {
   let out = git(&["fetch", "origin", branch], repo, Some(NETWORK_TIMEOUT))?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!("git fetch failed: {}", out.stderr.trim())));
   }
   Ok(())
}

pub fn checkout(repo: &Path, branch: &str) -> Result<()> {
   let out = git(&["checkout", branch], repo, None)?;
   if !out.success() {
      return Err(SaltError::CheckoutFailed(format!("'{branch}': {}", out.stderr.trim())));
   }
   Ok(())
}

/// Pull `branch` from origin. Merge conflicts are classified separately so
/// callers can surface them verbatim and halt.
pub fn pull(repo: &Path, branch: &str) -> Result<()> {
   let out = git(&["pull", "origin", branch], repo, Some(NETWORK_TIMEOUT))?;
   if out.success() {
      return Ok(());
   }
   let combined = format!("{}\n{}", out.stdout, out.stderr);
   if is_merge_conflict(&combined) {
      return Err(SaltError::MergeConflict(combined.trim().to_string()));
   }
   Err(SaltError::PullFailed(out.stderr.trim().to_string()))
}

fn is_merge_conflict(output: &str) -> bool {
   output.contains("CONFLICT")
      || output.contains("Automatic merge failed")
      || output.contains("would be overwritten by merge")
      || output.contains("needs merge")
}

/// Push `branch` to origin, classifying the common rejection modes.
pub fn push(repo: &Path, branch: &str) -> Result<()> {
   let out = git(&["push", "origin", branch], repo, Some(NETWORK_TIMEOUT))?;
   if out.success() {
      return Ok(());
   }
   let stderr = out.stderr.trim();
   if stderr.contains("has no upstream branch") || stderr.contains("does not match any") {
      return Err(SaltError::PushFailed(format!(
         "branch '{branch}' has no upstream on origin: {stderr}"
      )));
   }
   if stderr.contains("non-fast-forward") || stderr.contains("[rejected]") {
      return Err(SaltError::PushFailed(format!(
         "push rejected (non-fast-forward); pull the remote changes first: {stderr}"
      )));
   }
   Err(SaltError::PushFailed(stderr.to_string()))
}

/// Stage everything in the repository (includes deletions).
pub fn add_all(repo: &Path) -> Result<()> {
   let out = git(&["add", "."], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!("git add failed: {}", out.stderr.trim())));
   }
   Ok(())
}

pub fn commit(repo: &Path, message: &str) -> Result<()> {
   let out = git(&["commit", "-m", message], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!(
         "git commit failed: {}",
         out.stderr.trim()
      )));
   }
   Ok(())
}

/// `git status --porcelain` for the whole repository.
pub fn status_porcelain(repo: &Path) -> Result<String> {
   let out = git(&["status", "--porcelain"], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!(
         "git status failed: {}",
         out.stderr.trim()
      )));
   }
   Ok(out.stdout)
}

/// `git status --porcelain -- <path>`, scoped to one subtree of the
/// repository at `repo`.
pub fn status_porcelain_path(repo: &Path, path: &str) -> Result<String> {
   let out = git(&["status", "--porcelain", "--", path], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!(
         "git status failed: {}",
         out.stderr.trim()
      )));
   }
   Ok(out.stdout)
}

/// Name of the branch currently checked out.
pub fn current_branch(repo: &Path) -> Result<String> {
   let out = git(&["rev-parse", "--abbrev-ref", "HEAD"], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!(
         "git rev-parse failed: {}",
         out.stderr.trim()
      )));
   }
   Ok(out.stdout.trim().to_string())
}

/// Commit id of HEAD.
pub fn head_commit(repo: &Path) -> Result<String> {
   let out = git(&["rev-parse", "HEAD"], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!(
         "git rev-parse failed: {}",
         out.stderr.trim()
      )));
   }
   Ok(out.stdout.trim().to_string())
}

/// Commits ahead of / behind `origin/<branch>` for the local `branch`.
/// Left count is ahead (local-only commits), right count is behind.
pub fn ahead_behind(repo: &Path, branch: &str) -> Result<(u32, u32)> {
   let range = format!("{branch}...origin/{branch}");
   let out = git(&["rev-list", "--left-right", "--count", &range], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!(
         "git rev-list failed: {}",
         out.stderr.trim()
      )));
   }
   let mut parts = out.stdout.split_whitespace();
   let ahead = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
   let behind = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
   Ok((ahead, behind))
}

/// Whether `dir` is inside a git working tree.
pub fn is_repo(dir: &Path) -> bool {
   git(&["rev-parse", "--git-dir"], dir, None).is_ok_and(|out| out.success())
}

/// Stage a path in the parent repository. Best-effort: Salt can run in a
/// parent that is not a git repository at all.
pub fn add_path(repo: &Path, path: &str) -> Result<()> {
   let out = git(&["add", "--", path], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!("git add failed: {}", out.stderr.trim())));
   }
   Ok(())
}

/// Drop a path from the parent index without touching the working tree.
/// Best-effort: the path may simply be untracked.
pub fn rm_cached(repo: &Path, path: &str) -> Result<()> {
   let out = git(&["rm", "-r", "--cached", "--", path], repo, None)?;
   if !out.success() {
      return Err(SaltError::GitCommandFailed(format!("git rm failed: {}", out.stderr.trim())));
   }
   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_merge_conflict_detection() {
      assert!(is_merge_conflict("CONFLICT (content): Merge conflict in a.txt"));
      assert!(is_merge_conflict("Automatic merge failed; fix conflicts and then commit"));
      assert!(is_merge_conflict(
         "error: Your local changes to the following files would be overwritten by merge:"
      ));
      assert!(!is_merge_conflict("fatal: couldn't find remote ref main"));
      assert!(!is_merge_conflict("Already up to date."));
   }

   #[test]
   fn test_is_repo_false_outside_worktree() {
      let dir = tempfile::TempDir::new().unwrap();
      assert!(!is_repo(dir.path()));
   }
}

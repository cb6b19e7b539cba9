//! Branch-mapping resolution: parent branch -> submodule branch.
//!
//! Exact mappings win over wildcard mappings, and an exact hit returns the
//! mapped value verbatim even when that value contains `*`. Wildcard keys
//! are scanned in insertion order; the first match wins.

use crate::config::Submodule;

/// Resolve the submodule branch for `parent_branch`.
///
/// Always returns a non-empty branch: the default branch is the fallback
/// when nothing matches.
pub fn resolve_branch(submodule: &Submodule, parent_branch: &str) -> String {
   resolve_mapping(submodule, parent_branch)
      .filter(|target| !target.is_empty())
      .unwrap_or_else(|| submodule.default_branch.clone())
}

fn resolve_mapping(submodule: &Submodule, parent_branch: &str) -> Option<String> {
   if let Some(target) = submodule.branch_mappings.get(parent_branch) {
      return Some(target.clone());
   }

   for (pattern, target) in &submodule.branch_mappings {
      if !pattern.contains('*') {
         continue; // Exact keys were already consulted above
      }
      if let Some(capture) = wildcard_capture(pattern, parent_branch) {
         if target.contains('*') {
            return Some(target.replacen('*', capture, 1));
         }
         return Some(target.clone());
      }
   }

   None
}

/// Whether `pattern` matches `branch`. A pattern without `*` matches only
/// itself; the wildcard matches any substring including the empty one.
pub fn pattern_matches(pattern: &str, branch: &str) -> bool {
   if pattern.contains('*') {
      wildcard_capture(pattern, branch).is_some()
   } else {
      pattern == branch
   }
}

/// Match `branch` against `prefix*suffix` and return the captured middle.
/// Prefix and suffix must not overlap within the branch.
fn wildcard_capture<'a>(pattern: &str, branch: &'a str) -> Option<&'a str> {
   let (prefix, suffix) = pattern.split_once('*')?;
   if prefix.len() + suffix.len() > branch.len() {
      return None;
   }
   if !branch.starts_with(prefix) || !branch.ends_with(suffix) {
      return None;
   }
   Some(&branch[prefix.len()..branch.len() - suffix.len()])
}

#[cfg(test)]
mod tests {
   use indexmap::IndexMap;

   use super::*;
   use crate::config::Submodule;

   fn submodule(mappings: &[(&str, &str)]) -> Submodule {
      let mut sub = Submodule::new("lib", "lib", "https://host/lib.git", "main");
      sub.branch_mappings =
         mappings.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<IndexMap<_, _>>();
      sub
   }

   #[test]
   fn test_exact_match() {
      let sub = submodule(&[("dev", "develop")]);
      assert_eq!(resolve_branch(&sub, "dev"), "develop");
   }

   #[test]
   fn test_default_fallback() {
      let sub = submodule(&[("dev", "develop")]);
      assert_eq!(resolve_branch(&sub, "anything-else"), "main");
      let empty = submodule(&[]);
      assert_eq!(resolve_branch(&empty, "dev"), "main");
   }

   #[test]
   fn test_exact_dominates_wildcard() {
      let sub = submodule(&[("m*", "dev"), ("main", "prod")]);
      assert_eq!(resolve_branch(&sub, "main"), "prod");
      assert_eq!(resolve_branch(&sub, "master"), "dev");
   }

   #[test]
   fn test_exact_hit_skips_substitution() {
      // A literal-key match returns the value unchanged, star and all
      let sub = submodule(&[("main", "release/*")]);
      assert_eq!(resolve_branch(&sub, "main"), "release/*");
   }

   #[test]
   fn test_wildcard_expansion() {
      let sub = submodule(&[("release/*", "prod/*")]);
      assert_eq!(resolve_branch(&sub, "release/v1.0"), "prod/v1.0");
   }

   #[test]
   fn test_wildcard_with_suffix() {
      let sub = submodule(&[("release/*-beta", "prod/*")]);
      assert_eq!(resolve_branch(&sub, "release/v1.0-beta"), "prod/v1.0");
      assert_eq!(resolve_branch(&sub, "release/v1.0"), "main");
   }

   #[test]
   fn test_wildcard_literal_target() {
      let sub = submodule(&[("feature/*", "develop")]);
      assert_eq!(resolve_branch(&sub, "feature/login"), "develop");
   }

   #[test]
   fn test_wildcard_first_match_wins() {
      let sub = submodule(&[("f*", "first"), ("feature/*", "second")]);
      assert_eq!(resolve_branch(&sub, "feature/x"), "first");
   }

   #[test]
   fn test_wildcard_matches_empty() {
      assert!(pattern_matches("feature/*", "feature/"));
      assert!(!pattern_matches("feature/*", "feature"));
      assert!(pattern_matches("*", "anything"));
      assert!(pattern_matches("*", ""));
   }

   #[test]
   fn test_exact_pattern_matching() {
      assert!(pattern_matches("", ""));
      assert!(pattern_matches("main", "main"));
      assert!(!pattern_matches("main", "maine"));
   }

   #[test]
   fn test_no_overlap_between_prefix_and_suffix() {
      // prefix "ab", suffix "bc" must not overlap inside "abc"
      assert!(!pattern_matches("ab*bc", "abc"));
      assert!(pattern_matches("ab*bc", "abbc"));
      assert!(pattern_matches("ab*bc", "abxbc"));
   }

   #[test]
   fn test_resolver_never_returns_empty() {
      // A bare-star target with an empty capture would expand to "", which
      // falls back to the default branch
      let sub = submodule(&[("release/*", "*")]);
      assert_eq!(resolve_branch(&sub, "release/"), "main");
      assert_eq!(resolve_branch(&sub, "release/v2"), "v2");
      assert_eq!(resolve_branch(&sub, "other"), "main");
   }
}

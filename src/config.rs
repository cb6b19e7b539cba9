//! The `salt.conf` model, parser, and writer.
//!
//! salt.conf is an INI-like file with one `[submodule "<name>"]` section per
//! submodule and an optional `branches = { pattern -> target }` block that
//! maps parent branches to submodule branches. The emitter sorts mappings by
//! key so emitted files are diff-stable; parse(emit(c)) preserves meaning.

use std::{fs, path::Path};

use indexmap::IndexMap;

use crate::error::{Result, SaltError};

pub const CONFIG_FILE: &str = "salt.conf";

/// One configured submodule.
#[derive(Debug, Clone, PartialEq)]
pub struct Submodule {
   pub name: String,
   /// Flattened location inside the parent tree.
   pub path: String,
   pub url: String,
   /// Fallback branch when no mapping matches the parent branch.
   pub default_branch: String,
   /// Whether the initial clone is depth-1.
   pub shallow: bool,
   /// Parent-branch pattern -> target branch template. Keys may contain a
   /// single `*` wildcard; insertion order is kept for wildcard scanning.
   pub branch_mappings: IndexMap<String, String>,
}

impl Submodule {
   pub fn new(name: &str, path: &str, url: &str, default_branch: &str) -> Self {
      Self {
         name:            name.to_string(),
         path:            path.to_string(),
         url:             url.to_string(),
         default_branch:  default_branch.to_string(),
         shallow:         true,
         branch_mappings: IndexMap::new(),
      }
   }
}

/// Parsed salt.conf: submodules in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaltConfig {
   pub submodules: Vec<Submodule>,
}

impl SaltConfig {
   /// Load `salt.conf` from the parent repository root.
   pub fn load(root: &Path) -> Result<Self> {
      let path = root.join(CONFIG_FILE);
      if !path.exists() {
         return Err(SaltError::ConfigNotFound);
      }
      let contents = fs::read_to_string(&path)?;
      Self::parse(&contents)
   }

   /// Like `load`, but a missing file yields an empty config.
   pub fn load_or_default(root: &Path) -> Result<Self> {
      match Self::load(root) {
         Err(SaltError::ConfigNotFound) => Ok(Self::default()),
         other => other,
      }
   }

   /// Write `salt.conf` at the parent repository root.
   pub fn save(&self, root: &Path) -> Result<()> {
      fs::write(root.join(CONFIG_FILE), self.emit())?;
      Ok(())
   }

   pub fn find(&self, name: &str) -> Option<&Submodule> {
      self.submodules.iter().find(|s| s.name == name)
   }

   /// Insert or replace a submodule record by name.
   pub fn upsert(&mut self, submodule: Submodule) {
      if let Some(existing) = self.submodules.iter_mut().find(|s| s.name == submodule.name) {
         *existing = submodule;
      } else {
         self.submodules.push(submodule);
      }
   }

   /// Remove a submodule record; returns whether it existed.
   pub fn remove(&mut self, name: &str) -> bool {
      let before = self.submodules.len();
      self.submodules.retain(|s| s.name != name);
      self.submodules.len() != before
   }

   // === Parsing ===

   pub fn parse(contents: &str) -> Result<Self> {
      let mut config = Self::default();
      let mut current: Option<Submodule> = None;
      let mut in_branches = false;

      for (idx, raw_line) in contents.lines().enumerate() {
         let line_no = idx + 1;
         let line = strip_inline_comment(raw_line);
         let line = line.trim();
         if line.is_empty() {
            continue;
         }

         if in_branches {
            if line == "}" {
               in_branches = false;
               continue;
            }
            let (pattern, target) = line.split_once("->").ok_or_else(|| {
               SaltError::ConfigParseError {
                  line:   line_no,
                  reason: format!("expected 'pattern -> target', got '{line}'"),
               }
            })?;
            if let Some(sub) = current.as_mut() {
               sub.branch_mappings.insert(
                  strip_quotes(pattern.trim()).to_string(),
                  strip_quotes(target.trim()).to_string(),
               );
            }
            continue;
         }

         if line.starts_with('[') {
            if let Some(done) = current.take() {
               finish_submodule(&mut config, done, line_no)?;
            }
            let name = parse_section_header(line).ok_or_else(|| SaltError::ConfigParseError {
               line:   line_no,
               reason: format!("malformed section header '{line}'"),
            })?;
            current = Some(Submodule {
               name:            name.to_string(),
               path:            String::new(),
               url:             String::new(),
               default_branch:  String::new(),
               shallow:         true,
               branch_mappings: IndexMap::new(),
            });
            continue;
         }

         let Some((key, value)) = line.split_once('=') else {
            return Err(SaltError::ConfigParseError {
               line:   line_no,
               reason: format!("expected 'key = value', got '{line}'"),
            });
         };
         let key = key.trim();
         let value = value.trim();

         let Some(sub) = current.as_mut() else {
            return Err(SaltError::ConfigParseError {
               line:   line_no,
               reason: format!("'{key}' outside of a [submodule] section"),
            });
         };

         if key == "branches" {
            if value != "{" {
               return Err(SaltError::ConfigParseError {
                  line:   line_no,
                  reason: "expected '{' after 'branches ='".to_string(),
               });
            }
            in_branches = true;
            continue;
         }

         let value = strip_quotes(value);
         match key {
            "path" => sub.path = value.to_string(),
            "url" => sub.url = value.to_string(),
            "default_branch" => sub.default_branch = value.to_string(),
            "shallow" => {
               sub.shallow = value.parse().map_err(|_| SaltError::ConfigParseError {
                  line:   line_no,
                  reason: format!("'shallow' must be true or false, got '{value}'"),
               })?;
            },
            // Unknown keys are ignored for forward compatibility
            _ => {},
         }
      }

      if in_branches {
         return Err(SaltError::ConfigParseError {
            line:   contents.lines().count(),
            reason: "unterminated branches block".to_string(),
         });
      }
      if let Some(done) = current.take() {
         let line_no = contents.lines().count();
         finish_submodule(&mut config, done, line_no)?;
      }

      Ok(config)
   }

   // === Emitting ===

   pub fn emit(&self) -> String {
      let mut out = String::new();
      for (idx, sub) in self.submodules.iter().enumerate() {
         if idx > 0 {
            out.push('\n');
         }
         out.push_str(&format!("[submodule \"{}\"]\n", sub.name));
         out.push_str(&format!("  path = {}\n", quote_if_needed(&sub.path)));
         out.push_str(&format!("  url = {}\n", quote_if_needed(&sub.url)));
         out.push_str(&format!(
            "  default_branch = {}\n",
            quote_if_needed(&sub.default_branch)
         ));
         out.push_str(&format!("  shallow = {}\n", sub.shallow));

         if !sub.branch_mappings.is_empty() {
            out.push_str("  branches = {\n");
            let mut mappings: Vec<_> = sub.branch_mappings.iter().collect();
            mappings.sort_by(|a, b| a.0.cmp(b.0));
            for (pattern, target) in mappings {
               out.push_str(&format!(
                  "    {} -> {}\n",
                  quote_if_needed(pattern),
                  quote_if_needed(target)
               ));
            }
            out.push_str("  }\n");
         }
      }
      out
   }
}

fn finish_submodule(config: &mut SaltConfig, mut sub: Submodule, line_no: usize) -> Result<()> {
   if sub.url.is_empty() {
      return Err(SaltError::ConfigParseError {
         line:   line_no,
         reason: format!("submodule '{}' has no url", sub.name),
      });
   }
   if sub.path.is_empty() {
      sub.path = sub.name.clone();
   }
   if sub.default_branch.is_empty() {
      sub.default_branch = "main".to_string();
   }
   if config.find(&sub.name).is_some() {
      return Err(SaltError::ConfigParseError {
         line:   line_no,
         reason: format!("duplicate submodule '{}'", sub.name),
      });
   }
   config.submodules.push(sub);
   Ok(())
}

/// Extract the name from `[submodule "<name>"]`.
fn parse_section_header(line: &str) -> Option<&str> {
   let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
   let rest = inner.strip_prefix("submodule")?.trim();
   let name = rest.strip_prefix('"')?.strip_suffix('"')?;
   if name.is_empty() { None } else { Some(name) }
}

/// Cut the line at the first `#` that is not inside quotes.
fn strip_inline_comment(line: &str) -> &str {
   let mut in_single = false;
   let mut in_double = false;
   for (i, c) in line.char_indices() {
      match c {
         '\'' if !in_double => in_single = !in_single,
         '"' if !in_single => in_double = !in_double,
         '#' if !in_single && !in_double => return &line[..i],
         _ => {},
      }
   }
   line
}

/// Strip one layer of surrounding matched single or double quotes.
fn strip_quotes(value: &str) -> &str {
   let bytes = value.as_bytes();
   if bytes.len() >= 2 {
      let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
      if first == last && (first == b'"' || first == b'\'') {
         return &value[1..value.len() - 1];
      }
   }
   value
}

fn quote_if_needed(value: &str) -> String {
   if value.contains('#') || value.contains(char::is_whitespace) || value.is_empty() {
      format!("\"{value}\"")
   } else {
      value.to_string()
   }
}

/// Derive a submodule name from a git URL: last path segment, `.git`
/// stripped. Handles scp-style `git@host:org/repo.git` URLs too.
pub fn name_from_url(url: &str) -> String {
   let trimmed = url.trim_end_matches('/');
   let last = trimmed
      .rsplit(['/', ':'])
      .next()
      .unwrap_or(trimmed);
   last.strip_suffix(".git").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
   use super::*;

   fn sample() -> SaltConfig {
      let mut sub = Submodule::new("libfoo", "vendor/libfoo", "https://host/libfoo.git", "main");
      sub.branch_mappings.insert("main".to_string(), "main".to_string());
      sub.branch_mappings.insert("release/*".to_string(), "prod/*".to_string());
      let mut other = Submodule::new("bar", "bar", "git@host:org/bar.git", "develop");
      other.shallow = false;
      SaltConfig { submodules: vec![sub, other] }
   }

   #[test]
   fn test_round_trip() {
      let config = sample();
      let parsed = SaltConfig::parse(&config.emit()).unwrap();
      assert_eq!(parsed, config);
   }

   #[test]
   fn test_parse_basic() {
      let text = r#"
# Top comment
[submodule "x"]
  path = x
  url = https://host/x.git
  default_branch = main
  shallow = true
"#;
      let config = SaltConfig::parse(text).unwrap();
      assert_eq!(config.submodules.len(), 1);
      let sub = &config.submodules[0];
      assert_eq!(sub.name, "x");
      assert_eq!(sub.path, "x");
      assert_eq!(sub.url, "https://host/x.git");
      assert_eq!(sub.default_branch, "main");
      assert!(sub.shallow);
      assert!(sub.branch_mappings.is_empty());
   }

   #[test]
   fn test_parse_branches_block() {
      let text = r#"
[submodule "x"]
  url = https://host/x.git
  branches = {
    main -> main
    feature/* -> feature/*
    dev -> develop
  }
"#;
      let config = SaltConfig::parse(text).unwrap();
      let sub = &config.submodules[0];
      assert_eq!(sub.branch_mappings.len(), 3);
      assert_eq!(sub.branch_mappings["feature/*"], "feature/*");
      assert_eq!(sub.branch_mappings["dev"], "develop");
      // Defaults applied when keys are absent
      assert_eq!(sub.path, "x");
      assert_eq!(sub.default_branch, "main");
   }

   #[test]
   fn test_parse_quoted_values_and_inline_comments() {
      let text = r##"
[submodule "x"]
  url = "https://host/x.git"   # the remote
  path = 'vendor/x'
  default_branch = "release #1"
"##;
      let config = SaltConfig::parse(text).unwrap();
      let sub = &config.submodules[0];
      assert_eq!(sub.url, "https://host/x.git");
      assert_eq!(sub.path, "vendor/x");
      assert_eq!(sub.default_branch, "release #1");
   }

   #[test]
   fn test_parse_errors() {
      assert!(matches!(
         SaltConfig::parse("path = x"),
         Err(SaltError::ConfigParseError { .. })
      ));
      assert!(matches!(
         SaltConfig::parse("[submodule x]\nurl = u"),
         Err(SaltError::ConfigParseError { .. })
      ));
      assert!(matches!(
         SaltConfig::parse("[submodule \"x\"]\npath = x"),
         Err(SaltError::ConfigParseError { .. }) // missing url
      ));
      let unterminated = "[submodule \"x\"]\nurl = u\nbranches = {\nmain -> main";
      assert!(matches!(
         SaltConfig::parse(unterminated),
         Err(SaltError::ConfigParseError { .. })
      ));
      let dup = "[submodule \"x\"]\nurl = u\n[submodule \"x\"]\nurl = v";
      assert!(matches!(SaltConfig::parse(dup), Err(SaltError::ConfigParseError { .. })));
   }

   #[test]
   fn test_emit_sorts_mappings() {
      let mut sub = Submodule::new("x", "x", "u", "main");
      sub.branch_mappings.insert("zeta".to_string(), "z".to_string());
      sub.branch_mappings.insert("alpha".to_string(), "a".to_string());
      let config = SaltConfig { submodules: vec![sub] };
      let emitted = config.emit();
      let alpha = emitted.find("alpha").unwrap();
      let zeta = emitted.find("zeta").unwrap();
      assert!(alpha < zeta);
   }

   #[test]
   fn test_empty_config_round_trip() {
      let config = SaltConfig::default();
      assert_eq!(SaltConfig::parse(&config.emit()).unwrap(), config);
   }

   #[test]
   fn test_upsert_and_remove() {
      let mut config = sample();
      assert!(config.find("libfoo").is_some());

      let replacement = Submodule::new("libfoo", "elsewhere", "u2", "dev");
      config.upsert(replacement);
      assert_eq!(config.submodules.len(), 2);
      assert_eq!(config.find("libfoo").unwrap().path, "elsewhere");

      assert!(config.remove("libfoo"));
      assert!(!config.remove("libfoo"));
      assert_eq!(config.submodules.len(), 1);
   }

   #[test]
   fn test_name_from_url() {
      assert_eq!(name_from_url("https://github.com/org/repo.git"), "repo");
      assert_eq!(name_from_url("https://github.com/org/repo"), "repo");
      assert_eq!(name_from_url("git@github.com:org/repo.git"), "repo");
      assert_eq!(name_from_url("https://host/repo/"), "repo");
      assert_eq!(name_from_url("git@host:flat.git"), "flat");
   }
}

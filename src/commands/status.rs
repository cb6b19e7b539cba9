//! `salt status`: classify every submodule and render a table or JSON.

use serde::Serialize;

use super::{parent_branch, select};
use crate::{
   classify::{self, SyncStatus},
   cli::Ctx,
   config::{SaltConfig, Submodule},
   error::Result,
   fsutil, git, hash, state,
   state::SyncState,
   style::{self, icons},
};

#[derive(Debug, Serialize)]
struct StatusRow {
   name:            String,
   path:            String,
   current_branch:  String,
   expected_branch: String,
   status:          SyncStatus,
   modified_files:  u32,
   ahead:           u32,
   behind:          u32,
   exists:          bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
   version:       &'static str,
   parent_branch: String,
   submodules:    Vec<StatusRow>,
}

pub fn run(ctx: &Ctx, name: Option<&str>, json: bool) -> Result<()> {
   let config = SaltConfig::load_or_default(&ctx.root)?;
   let sync_state = SyncState::load(&ctx.root)?;
   let branch = parent_branch(&ctx.root);
   let submodules = select(&config, name)?;

   let rows: Vec<StatusRow> = submodules
      .iter()
      .map(|sub| observe_one(ctx, sub, &sync_state, &branch))
      .collect();

   let report = StatusReport {
      version:       "1.0",
      parent_branch: branch,
      submodules:    rows,
   };

   if json {
      println!("{}", serde_json::to_string_pretty(&report)?);
   } else {
      render_table(ctx, &report);
   }
   Ok(())
}

/// Gather live observations for one submodule and classify it. Everything
/// here is best-effort: a half-materialized submodule still gets a row.
fn observe_one(ctx: &Ctx, sub: &Submodule, sync_state: &SyncState, parent: &str) -> StatusRow {
   let hidden = state::repo_path(&ctx.root, &sub.name);
   let exists = fsutil::is_git_worktree(&hidden);
   let expected = crate::resolver::resolve_branch(sub, parent);

   let current = if exists {
      git::current_branch(&hidden).unwrap_or_else(|_| "-".to_string())
   } else {
      "-".to_string()
   };

   let flat_path = ctx.root.join(&sub.path);
   let files_hash = if flat_path.is_dir() {
      hash::hash_tree(&flat_path).unwrap_or_default()
   } else {
      String::new()
   };
   let head = if exists {
      git::head_commit(&hidden).unwrap_or_default()
   } else {
      String::new()
   };

   let mut status = if exists {
      classify::classify(sub, sync_state.get(&sub.name), parent, &head, &files_hash)
   } else {
      SyncStatus::Behind
   };

   let mut modified_files = 0;
   let mut ahead = 0;
   let mut behind = 0;
   if ctx.verbose {
      if git::is_repo(&ctx.root) {
         modified_files = git::status_porcelain_path(&ctx.root, &sub.path)
            .map_or(0, |out| out.lines().filter(|l| !l.trim().is_empty()).count() as u32);
      }
      if exists {
         // Both remote comparisons default to 0 when the remote is away
         if let Err(e) = git::fetch_branch(&hidden, &expected) {
            log::warn!("{}: fetch for remote comparison failed: {e}", sub.name);
         }
         (ahead, behind) = git::ahead_behind(&hidden, &expected).unwrap_or((0, 0));
         status = status.considering_ahead(ahead);
      }
   }

   StatusRow {
      name: sub.name.clone(),
      path: sub.path.clone(),
      current_branch: current,
      expected_branch: expected,
      status,
      modified_files,
      ahead,
      behind,
      exists,
   }
}

fn render_table(ctx: &Ctx, report: &StatusReport) {
   if report.submodules.is_empty() {
      ctx.echo("No submodules configured.");
      return;
   }

   ctx.echo(&format!(
      "On parent branch {}",
      style::branch(&report.parent_branch)
   ));

   let mut header = vec!["NAME", "PATH", "BRANCH", "STATUS"];
   if ctx.verbose {
      header.extend(["MODIFIED", "AHEAD", "BEHIND"]);
   }

   let table_rows: Vec<Vec<String>> = report
      .submodules
      .iter()
      .map(|row| {
         let branch_cell = if row.current_branch == row.expected_branch {
            row.current_branch.clone()
         } else {
            format!("{} {} {}", row.current_branch, icons::ARROW, row.expected_branch)
         };
         let mut cells = vec![
            row.name.clone(),
            row.path.clone(),
            branch_cell,
            row.status.as_str().to_string(),
         ];
         if ctx.verbose {
            cells.push(row.modified_files.to_string());
            cells.push(row.ahead.to_string());
            cells.push(row.behind.to_string());
         }
         cells
      })
      .collect();

   let widths: Vec<usize> = header
      .iter()
      .enumerate()
      .map(|(i, h)| {
         table_rows
            .iter()
            .map(|cells| cells[i].chars().count())
            .chain([h.len()])
            .max()
            .unwrap_or(0)
      })
      .collect();

   let header_line = header
      .iter()
      .enumerate()
      .map(|(i, h)| format!("{h:<width$}", width = widths[i]))
      .collect::<Vec<_>>()
      .join("  ");
   println!("{}", style::bold(&header_line));

   for (row, cells) in report.submodules.iter().zip(&table_rows) {
      let line = cells
         .iter()
         .enumerate()
         .map(|(i, cell)| {
            let pad = " ".repeat(widths[i].saturating_sub(cell.chars().count()));
            // Color only the status cell; padding is computed on plain text
            if header[i] == "STATUS" {
               format!("{}{pad}", style::status(row.status))
            } else {
               format!("{cell}{pad}")
            }
         })
         .collect::<Vec<_>>()
         .join("  ");
      println!("{}", line.trim_end());
   }

   let hints: Vec<String> = report
      .submodules
      .iter()
      .filter_map(|row| suggestion(row).map(|hint| format!("{} {hint}", icons::BULLET)))
      .collect();
   if !hints.is_empty() && !ctx.quiet {
      println!();
      for hint in hints {
         println!("{}", style::dim(&hint));
      }
   }
}

/// One actionable line per non-SYNCED submodule.
fn suggestion(row: &StatusRow) -> Option<String> {
   let name = &row.name;
   match row.status {
      SyncStatus::Synced => None,
      SyncStatus::Dirty => Some(format!("{name}: local edits; `salt push {name}` to publish them")),
      SyncStatus::Behind if !row.exists => {
         Some(format!("{name}: not materialized; run `salt resolve {name}`"))
      },
      SyncStatus::Behind => Some(format!("{name}: source moved on; `salt pull {name}` to catch up")),
      SyncStatus::Ahead => Some(format!("{name}: unpushed commits; `salt push {name}` to publish")),
      SyncStatus::Diverged => Some(format!(
         "{name}: both sides changed; `salt pull {name}` first, then `salt push {name}`"
      )),
      SyncStatus::Stale => Some(format!(
         "{name}: files are from another branch; `salt sync {name}` to switch"
      )),
   }
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

   #[test]
   fn test_status_row_for_unmaterialized_submodule() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      let sub = Submodule::new("x", "x", "https://host/x.git", "main");
      let sync_state = SyncState::default();

      let row = observe_one(&ctx, &sub, &sync_state, "main");
      assert!(!row.exists);
      assert_eq!(row.status, SyncStatus::Behind);
      assert_eq!(row.current_branch, "-");
      assert_eq!(row.expected_branch, "main");
   }

   #[test]
   fn test_status_empty_config_does_not_crash() {
      let dir = TempDir::new().unwrap();
      let ctx = ctx_in(&dir);
      run(&ctx, None, false).unwrap();
      run(&ctx, None, true).unwrap();
   }

   #[test]
   fn test_json_report_shape() {
      let report = StatusReport {
         version:       "1.0",
         parent_branch: "main".to_string(),
         submodules:    vec![StatusRow {
            name:            "x".to_string(),
            path:            "x".to_string(),
            current_branch:  "main".to_string(),
            expected_branch: "main".to_string(),
            status:          SyncStatus::Synced,
            modified_files:  0,
            ahead:           0,
            behind:          0,
            exists:          true,
         }],
      };
      let doc: serde_json::Value =
         serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
      assert_eq!(doc["version"], "1.0");
      assert_eq!(doc["parent_branch"], "main");
      assert_eq!(doc["submodules"][0]["status"], "SYNCED");
      assert_eq!(doc["submodules"][0]["exists"], true);
   }

   #[test]
   fn test_suggestions_cover_every_non_synced_state() {
      let mut row = StatusRow {
         name:            "x".to_string(),
         path:            "x".to_string(),
         current_branch:  "main".to_string(),
         expected_branch: "main".to_string(),
         status:          SyncStatus::Synced,
         modified_files:  0,
         ahead:           0,
         behind:          0,
         exists:          true,
      };
      assert!(suggestion(&row).is_none());
      for status in [
         SyncStatus::Dirty,
         SyncStatus::Behind,
         SyncStatus::Ahead,
         SyncStatus::Diverged,
         SyncStatus::Stale,
      ] {
         row.status = status;
         assert!(suggestion(&row).is_some());
      }
      row.status = SyncStatus::Diverged;
      let hint = suggestion(&row).unwrap();
      let pull = hint.find("pull").unwrap();
      let push = hint.find("push").unwrap();
      assert!(pull < push);
   }
}

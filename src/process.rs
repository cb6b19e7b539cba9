//! Subprocess execution with captured output and optional timeout.

use std::{
   io::Read,
   path::Path,
   process::{Command, Stdio},
   time::Duration,
};

use wait_timeout::ChildExt;

use crate::error::{Result, SaltError};

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct CommandOutput {
   pub stdout:    String,
   pub stderr:    String,
   pub exit_code: Option<i32>,
}

impl CommandOutput {
   pub fn success(&self) -> bool {
      self.exit_code == Some(0)
   }
}

/// Run a command in `dir`, capturing stdout and stderr.
///
/// With a timeout, the child is killed once the deadline passes and
/// `Timeout` is returned. Output handles are taken before waiting so the
/// pipes can still be drained after the process is reaped.
pub fn run(program: &str, args: &[&str], dir: &Path, timeout: Option<Duration>) -> Result<CommandOutput> {
   log::debug!("exec: {program} {} (in {})", args.join(" "), dir.display());

   let Some(timeout) = timeout else {
      let output = Command::new(program)
         .args(args)
         .current_dir(dir)
         .output()
         .map_err(|e| SaltError::GitCommandFailed(format!("Failed to run {program}: {e}")))?;
      return Ok(CommandOutput {
         stdout:    String::from_utf8_lossy(&output.stdout).to_string(),
         stderr:    String::from_utf8_lossy(&output.stderr).to_string(),
         exit_code: output.status.code(),
      });
   };

   let mut child = Command::new(program)
      .args(args)
      .current_dir(dir)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|e| SaltError::GitCommandFailed(format!("Failed to spawn {program}: {e}")))?;

   // Take the handles before wait_timeout (which reaps the process)
   let mut stdout_handle = child.stdout.take();
   let mut stderr_handle = child.stderr.take();

   match child.wait_timeout(timeout) {
      Ok(Some(status)) => {
         let mut stdout = Vec::new();
         let mut stderr = Vec::new();
         if let Some(ref mut h) = stdout_handle {
            let _ = h.read_to_end(&mut stdout);
         }
         if let Some(ref mut h) = stderr_handle {
            let _ = h.read_to_end(&mut stderr);
         }
         Ok(CommandOutput {
            stdout:    String::from_utf8_lossy(&stdout).to_string(),
            stderr:    String::from_utf8_lossy(&stderr).to_string(),
            exit_code: status.code(),
         })
      },
      Ok(None) => {
         // Deadline passed: kill and reap
         let _ = child.kill();
         let _ = child.wait();
         Err(SaltError::Timeout {
            command: format!("{program} {}", args.join(" ")),
            secs:    timeout.as_secs(),
         })
      },
      Err(e) => Err(SaltError::GitCommandFailed(format!("Failed to wait for {program}: {e}"))),
   }
}

use crate::cache::CommandCache;
use crate::error::{Error, Result};
use log::debug;
use std::io::ErrorKind;
use std::process::Command;

pub struct CommandRunner {
    cache: CommandCache,
}

impl CommandRunner {
    pub fn new(cache: CommandCache) -> Self {
        Self { cache }
    }

    /// Runs the command without consulting the cache.
    pub fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!("Running {} {}", program, args.join(" "));
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ToolUnavailable {
                    tool: program.to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = if stderr.trim().is_empty() {
                output.status.to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::ToolFailed {
                tool: program.to_string(),
                reason,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs the command, reusing cached output while it is still fresh.
    /// Only successful runs are cached.
    pub fn run_cached(&self, program: &str, args: &[&str]) -> Result<String> {
        let key = format!("{} {}", program, args.join(" "));
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let output = self.run(program, args)?;
        if let Err(e) = self.cache.put(&key, &output) {
            debug!("Failed to cache output of '{}': {}", key, e);
        }
        Ok(output)
    }
}

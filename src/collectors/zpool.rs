use crate::command::CommandRunner;
use crate::error::Result;

pub struct ZpoolCollector;

impl ZpoolCollector {
    pub fn new() -> Self {
        Self
    }

    /// Raw `zpool status` text with real device paths (-L resolves symlinks,
    /// -P prints full paths). Annotation happens at render time.
    pub fn collect(&self, runner: &CommandRunner) -> Result<String> {
        runner.run("zpool", &["status", "-LP"])
    }
}

impl Default for ZpoolCollector {
    fn default() -> Self {
        Self::new()
    }
}

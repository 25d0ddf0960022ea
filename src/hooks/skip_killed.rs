use super::Hook;
use crate::error::Result;
use crate::exec::Status;
use crate::results::{ExecutionResult, ResultSet};

/// Turns killed units into `SKIPPED`, keeping the original under
/// `datahook.prior`.
pub struct SkipKilled;

impl SkipKilled {
    pub const NAME: &'static str = "skip-killed";
}

impl Hook for SkipKilled {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> u32 {
        9
    }

    fn apply(&self, set: &ResultSet) -> Result<ResultSet> {
        let mut out = set.clone();
        for entry in out.iter_mut().filter(|e| e.result.killed) {
            let replacement = ExecutionResult::new(
                Status::Skipped,
                entry.result.stdout.clone(),
                format!("Marked as skipped by hook {}", Self::NAME),
            );
            tracing::debug!("Marking killed {} as skipped", entry.plugin.path.display());
            entry.overwrite(Self::NAME, replacement);
        }
        Ok(out)
    }
}

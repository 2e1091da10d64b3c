//! Sampled memory accounting around heavy git operations.
//!
//! Large clones make libgit2 hold sizable object graphs. The gauge makes
//! that visible: it samples the current process's resident and virtual
//! memory and logs them at debug level. Samples are advisory and never
//! gate control flow; actual reclamation comes from scoping fetch state
//! per phase in the engine.

use std::sync::Mutex;

use sysinfo::{Pid, ProcessesToUpdate, System};

/// Process memory sampler.
///
/// Degrades to a no-op when the current PID cannot be resolved.
pub struct MemoryGauge {
    inner: Option<Mutex<Sampler>>,
}

struct Sampler {
    system: System,
    pid: Pid,
}

impl MemoryGauge {
    #[must_use]
    pub fn new() -> Self {
        let inner = sysinfo::get_current_pid().ok().map(|pid| {
            Mutex::new(Sampler {
                system: System::new(),
                pid,
            })
        });
        Self { inner }
    }

    /// Log current memory usage for `operation` on `repo`.
    pub fn sample(&self, operation: &str, repo: &str) {
        if let Some((rss_kb, virt_kb)) = self.usage_kb() {
            tracing::debug!(repo, operation, rss_kb, virt_kb, "memory usage");
        }
    }

    /// Advisory reclamation point between heavy phases.
    ///
    /// Release itself happens by dropping phase-scoped state; this records
    /// usage right after, so the effect shows up next to the request.
    pub fn reclaim_hint(&self, operation: &str, repo: &str) {
        self.sample(operation, repo);
    }

    fn usage_kb(&self) -> Option<(u64, u64)> {
        let inner = self.inner.as_ref()?;
        let mut sampler = inner.lock().ok()?;
        let pid = sampler.pid;
        sampler
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let process = sampler.system.process(pid)?;
        Some((process.memory() / 1024, process.virtual_memory() / 1024))
    }
}

impl Default for MemoryGauge {
    fn default() -> Self {
        Self::new()
    }
}

use super::progress::{Progress, ProgressTracker};
use super::{RunError, RunObserver, RunOutcome};

/// Lifecycle of one submission. A session holds at most one run at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running(Progress),
    Succeeded {
        found: usize,
    },
    PartialFailure {
        found: usize,
        failures: usize,
    },
    Failed(String),
}

#[derive(Debug, Default)]
pub struct Session {
    phase: RunPhase,
    progress: ProgressTracker,
}

impl Session {
    #[cfg(test)]
    pub fn phase(&self) -> &RunPhase {
        &self.phase
    }

    #[cfg(test)]
    pub fn progress(&self) -> Progress {
        self.progress.snapshot()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, RunPhase::Running(_))
    }

    /// Enter `Running` with `{0, total}`. Refused while another run is active.
    pub fn begin(&mut self, total: usize, observer: &mut impl RunObserver) -> Result<(), RunError> {
        if self.is_running() {
            return Err(RunError::Busy);
        }
        let progress = self.progress.start(total);
        self.phase = RunPhase::Running(progress);
        observer.on_phase(&self.phase);
        observer.on_progress(progress);
        Ok(())
    }

    pub fn advance(&mut self, observer: &mut impl RunObserver) {
        let progress = self.progress.advance();
        if let RunPhase::Running(p) = &mut self.phase {
            *p = progress;
        }
        observer.on_progress(progress);
    }

    /// Record the terminal phase and zero the progress counters.
    pub fn finish(&mut self, outcome: &RunOutcome, observer: &mut impl RunObserver) {
        self.phase = match outcome {
            RunOutcome::Succeeded(r) => RunPhase::Succeeded {
                found: r.display.len(),
            },
            RunOutcome::PartialFailure(r, failures) => RunPhase::PartialFailure {
                found: r.display.len(),
                failures: failures.len(),
            },
            RunOutcome::Failed(e) => RunPhase::Failed(e.to_string()),
        };
        observer.on_phase(&self.phase);
        observer.on_progress(self.progress.reset());
    }

    pub fn reset(&mut self, observer: &mut impl RunObserver) {
        self.phase = RunPhase::Idle;
        observer.on_phase(&self.phase);
    }
}

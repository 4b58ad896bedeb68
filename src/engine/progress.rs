/// Snapshot of run progress. `percent` is `completed / total * 100`, or 0
/// when nothing is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// Counts finished work units. Advanced once per classified unit, never
/// past `total`.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    completed: usize,
    total: usize,
}

impl ProgressTracker {
    pub fn snapshot(&self) -> Progress {
        Progress::new(self.completed, self.total)
    }

    pub fn start(&mut self, total: usize) -> Progress {
        self.completed = 0;
        self.total = total;
        self.snapshot()
    }

    pub fn advance(&mut self) -> Progress {
        if self.completed < self.total {
            self.completed += 1;
        }
        self.snapshot()
    }

    pub fn reset(&mut self) -> Progress {
        self.completed = 0;
        self.total = 0;
        self.snapshot()
    }
}

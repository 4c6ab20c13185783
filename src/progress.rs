//! Per-run progress bookkeeping
//!
//! [`ProgressState`] is owned by a single run and handed to the engine's completion
//! callback by exclusive reference. It never fails and never blocks, since it runs
//! inside the engine's download loop.

/// Completion counter for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    completed: usize,
    total: usize,
}

/// Snapshot produced by each completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// Items finished so far
    pub completed: usize,
    /// Items expected
    pub total: usize,
    /// completed / total
    pub fraction: f64,
}

impl ProgressState {
    /// Start counting towards `total` items
    ///
    /// Returns `None` when `total` is zero; an empty playlist never reaches the
    /// download phase.
    pub fn new(total: usize) -> Option<Self> {
        (total > 0).then_some(Self {
            completed: 0,
            total,
        })
    }

    /// Record one finished item and return the new snapshot
    ///
    /// The count saturates at `total`: engines may report more finished files than
    /// enumerated entries (e.g. separately fetched streams), and the fraction must
    /// stay within `0.0..=1.0`.
    pub fn on_item_completed(&mut self) -> ProgressUpdate {
        if self.completed < self.total {
            self.completed += 1;
        } else {
            tracing::debug!(
                total = self.total,
                "completion reported past the enumerated total"
            );
        }
        self.snapshot()
    }

    /// Current snapshot without recording anything
    pub fn snapshot(&self) -> ProgressUpdate {
        ProgressUpdate {
            completed: self.completed,
            total: self.total,
            fraction: self.fraction(),
        }
    }

    /// Items finished so far
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Items expected
    pub fn total(&self) -> usize {
        self.total
    }

    /// Entries that have not (yet) produced a file
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// completed / total
    pub fn fraction(&self) -> f64 {
        self.completed as f64 / self.total as f64
    }
}

impl ProgressUpdate {
    /// Percentage with one decimal, e.g. `40.0`
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }

    /// Status line shown to the user
    pub fn render(&self) -> String {
        format!(
            "Downloading: {}/{} videos ({:.1}%)",
            self.completed,
            self.total,
            self.percent()
        )
    }
}

impl std::fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

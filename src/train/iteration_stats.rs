use serde::{Deserialize, Serialize};

/// Progress snapshot emitted by `sgd_loop` every `log_every` iterations.
///
/// When an observer is passed to the loop it receives one `IterationStats`
/// per logged iteration, which is enough to drive a live loss readout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationStats {
    /// 0-based iteration index.
    pub iteration: usize,
    /// Total iterations requested for this run.
    pub total_iters: usize,
    /// Batch loss at this iteration.
    pub loss: f64,
}

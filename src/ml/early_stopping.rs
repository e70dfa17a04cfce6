// ============================================================
// Layer 5 - Early Stopping
// ============================================================
// Watches one validation metric after every epoch and asks the
// training loop to stop once it has failed to improve for
// `patience` epochs in a row.
//
//   monitor = val_accuracy, patience = 2
//
//   epoch  val_acc  best   wait  stop?
//     1     0.60    0.60    0
//     2     0.72    0.72    0
//     3     0.71    0.72    1
//     4     0.72    0.72    2     yes  (equal is not better)

use serde::{Deserialize, Serialize};

use crate::infra::metrics::EpochMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Monitor {
    ValAccuracy,
    ValLoss,
}

impl Monitor {
    pub fn value(&self, m: &EpochMetrics) -> f64 {
        match self {
            Monitor::ValAccuracy => m.val_accuracy,
            Monitor::ValLoss     => m.val_loss,
        }
    }

    /// Accuracy must go up, loss must go down.
    fn higher_is_better(&self) -> bool {
        matches!(self, Monitor::ValAccuracy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarlyStoppingConfig {
    pub monitor:   Monitor,
    pub patience:  usize,
    pub min_delta: f64,
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        Self { monitor: Monitor::ValAccuracy, patience: 2, min_delta: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The monitored value improved on the best so far
    Improved,
    /// No improvement, keep going
    Waiting,
    /// Patience exhausted
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    config:     EarlyStoppingConfig,
    best:       Option<f64>,
    best_epoch: Option<usize>,
    wait:       usize,
}

impl EarlyStopping {
    pub fn new(config: EarlyStoppingConfig) -> Self {
        Self { config, best: None, best_epoch: None, wait: 0 }
    }

    pub fn observe(&mut self, m: &EpochMetrics) -> Verdict {
        let current = self.config.monitor.value(m);
        let improved = match self.best {
            None => true,
            Some(best) if self.config.monitor.higher_is_better() => {
                current - self.config.min_delta > best
            }
            Some(best) => current + self.config.min_delta < best,
        };

        if improved {
            self.best       = Some(current);
            self.best_epoch = Some(m.epoch);
            self.wait       = 0;
            return Verdict::Improved;
        }

        self.wait += 1;
        if self.wait >= self.config.patience {
            Verdict::Stop
        } else {
            Verdict::Waiting
        }
    }

    pub fn best(&self) -> Option<f64> {
        self.best
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }
}

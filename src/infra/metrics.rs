// ============================================================
// Layer 6 - Metrics
// ============================================================
// Per-epoch training history, the confusion matrix, and an
// optional CSV logger for the history.
//
// Metrics recorded per epoch:
//   - loss / accuracy:         averaged over training batches
//   - val_loss / val_accuracy: over the whole validation split
//
// Example CSV output (history.csv):
//   epoch,loss,accuracy,val_loss,val_accuracy
//   1,1.512300,0.351000,1.204500,0.520000
//   2,0.894100,0.684000,0.731300,0.752000
//
// How to read the curves:
//   - If val_loss rises while loss keeps falling the model is
//     overfitting; early stopping is meant to catch that.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of the training history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch number, starting at 1
    pub epoch: usize,

    pub loss: f64,

    /// Fraction of training samples classified correctly, in [0, 1]
    pub accuracy: f64,

    pub val_loss: f64,

    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, loss: f64, accuracy: f64, val_loss: f64, val_accuracy: f64) -> Self {
        Self { epoch, loss, accuracy, val_loss, val_accuracy }
    }
}

/// Metrics of every completed epoch, in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, m: EpochMetrics) {
        self.epochs.push(m);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Epoch with the highest validation accuracy (earliest wins ties)
    pub fn best_by_val_accuracy(&self) -> Option<&EpochMetrics> {
        self.epochs.iter().fold(None, |best: Option<&EpochMetrics>, m| match best {
            Some(b) if b.val_accuracy >= m.val_accuracy => Some(b),
            _ => Some(m),
        })
    }
}

// ─── Confusion Matrix ────────────────────────────────────────────────────────
/// counts[true][predicted]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Tally predictions against ground truth.
    /// Pairs whose ids fall outside `num_classes` are ignored.
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize], num_classes: usize) -> Self {
        let mut counts = vec![vec![0usize; num_classes]; num_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t < num_classes && p < num_classes {
                counts[t][p] += 1;
            }
        }
        Self { counts }
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Each row divided by its total, so row i shows where samples of
    /// class i ended up. Rows with no samples stay at zero.
    pub fn normalized(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| {
                let total: usize = row.iter().sum();
                row.iter()
                    .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
                    .collect()
            })
            .collect()
    }

    pub fn accuracy(&self) -> f64 {
        let total: usize = self.counts.iter().flatten().sum();
        let correct: usize = (0..self.counts.len()).map(|i| self.counts[i][i]).sum();
        if total == 0 { 0.0 } else { correct as f64 / total as f64 }
    }

    /// Write the normalised matrix with class names as header and row keys.
    pub fn write_csv(&self, path: &Path, classes: &[String]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;

        let mut header = vec!["true\\predicted".to_string()];
        header.extend(classes.iter().cloned());
        wtr.write_record(&header)?;

        for (class, row) in classes.iter().zip(self.normalized()) {
            let mut record = vec![class.clone()];
            record.extend(row.iter().map(|v| format!("{v:.6}")));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

// ─── CSV history logger ──────────────────────────────────────────────────────
/// Appends one row per epoch to `<dir>/history.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and start a fresh history file.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create report directory '{}'", dir.display()))?;

        let csv_path = dir.join("history.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "epoch,loss,accuracy,val_loss,val_accuracy")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.loss,
            m.accuracy,
            m.val_loss,
            m.val_accuracy,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, val_accuracy={:.4}",
            m.epoch,
            m.loss,
            m.val_accuracy,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

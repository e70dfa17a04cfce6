// ============================================================
// Layer 6 - Console Reports
// ============================================================
// Text renderings of the training curves, the confusion matrix
// and simple histograms. Everything returns a String; printing
// is left to the CLI layer.

use std::fmt::Write;

use crate::infra::metrics::{ConfusionMatrix, History};

const BAR_WIDTH: usize = 30;

/// A horizontal bar proportional to value / max.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let filled = ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

/// Histogram of labelled counts, one bar per row.
pub fn render_histogram(title: &str, rows: &[(String, usize)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;
    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (key, count) in rows {
        let _ = writeln!(
            out,
            "  {key:>key_width$} | {count:>6} {}",
            bar(*count as f64, max, BAR_WIDTH)
        );
    }
    out
}

/// Accuracy and loss per epoch, training next to validation.
pub fn render_history(history: &History) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Training history");
    let _ = writeln!(
        out,
        "  {:>5} | {:>8} {:>8} | {:>8} {:>8} | val_accuracy",
        "epoch", "accuracy", "val_acc", "loss", "val_loss"
    );
    for m in &history.epochs {
        let _ = writeln!(
            out,
            "  {:>5} | {:>8.4} {:>8.4} | {:>8.4} {:>8.4} | {}",
            m.epoch,
            m.accuracy,
            m.val_accuracy,
            m.loss,
            m.val_loss,
            bar(m.val_accuracy, 1.0, BAR_WIDTH),
        );
    }
    out
}

/// Row-normalised confusion matrix, true classes down the side.
pub fn render_confusion_matrix(cm: &ConfusionMatrix, classes: &[String]) -> String {
    let mut out = String::new();
    let width = classes.iter().map(|c| c.chars().count()).max().unwrap_or(0).max(6);

    let _ = writeln!(out, "Confusion matrix (rows: true, columns: predicted, normalised per row)");
    let _ = write!(out, "  {:>width$}", "");
    for class in classes {
        let _ = write!(out, " {class:>width$}");
    }
    let _ = writeln!(out, " {:>7}", "n");

    for ((class, row), counts) in classes.iter().zip(cm.normalized()).zip(cm.counts()) {
        let _ = write!(out, "  {class:>width$}");
        for value in row {
            let _ = write!(out, " {value:>width$.3}");
        }
        let _ = writeln!(out, " {:>7}", counts.iter().sum::<usize>());
    }
    let _ = writeln!(out, "  accuracy {:.4}", cm.accuracy());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::metrics::EpochMetrics;

    #[test]
    fn test_bar_scales_and_clamps() {
        assert_eq!(bar(5.0, 10.0, 10).chars().count(), 5);
        assert_eq!(bar(20.0, 10.0, 10).chars().count(), 10);
        assert!(bar(1.0, 0.0, 10).is_empty());
        assert!(bar(f64::NAN, 1.0, 10).is_empty());
    }

    #[test]
    fn test_history_has_one_line_per_epoch() {
        let mut h = History::new();
        h.push(EpochMetrics::new(1, 1.2, 0.4, 1.0, 0.5));
        h.push(EpochMetrics::new(2, 0.9, 0.6, 0.8, 0.6));
        let text = render_history(&h);
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("0.6000"));
    }

    #[test]
    fn test_confusion_matrix_labels_both_axes() {
        let classes = vec!["anger".to_string(), "joy".to_string()];
        let cm = ConfusionMatrix::from_predictions(&[0, 1, 1], &[0, 1, 0], 2);
        let text = render_confusion_matrix(&cm, &classes);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("anger") && lines[1].contains("joy"));
        assert!(lines[2].trim_start().starts_with("anger"));
        assert!(lines[3].contains("0.500"));
        assert!(lines[3].trim_end().ends_with('2'));
        assert_eq!(lines[4].trim(), "accuracy 0.6667");
    }

    #[test]
    fn test_histogram_rows() {
        let rows = vec![("joy".to_string(), 10), ("fear".to_string(), 5)];
        let text = render_histogram("Classes", &rows);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("fear"));
    }
}

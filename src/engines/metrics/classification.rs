use crate::error::{Result, TradelabelError};
use crate::ml::labeling::Label;
use serde::{Deserialize, Serialize};

/// Macro-averaged scores over the three labels. Rows of the confusion
/// matrix are true labels, columns predictions, both ordered -1, 0, 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision_macro: f64,
    pub recall_macro: f64,
    pub f1_macro: f64,
    pub confusion_matrix: [[usize; 3]; 3],
}

impl ClassificationMetrics {
    pub fn calculate(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(TradelabelError::Data(format!(
                "Label length mismatch: {} true vs {} predicted",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(TradelabelError::Data("No labels to evaluate".to_string()));
        }

        let mut matrix = [[0usize; 3]; 3];
        for (t, p) in y_true.iter().zip(y_pred) {
            matrix[Self::index(*t)][Self::index(*p)] += 1;
        }

        let correct: usize = (0..3).map(|k| matrix[k][k]).sum();
        let accuracy = correct as f64 / y_true.len() as f64;

        let mut precision_sum = 0.0;
        let mut recall_sum = 0.0;
        let mut f1_sum = 0.0;

        for k in 0..3 {
            let tp = matrix[k][k] as f64;
            let predicted: usize = (0..3).map(|row| matrix[row][k]).sum();
            let actual: usize = matrix[k].iter().sum();

            let precision = Self::ratio(tp, predicted);
            let recall = Self::ratio(tp, actual);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            precision_sum += precision;
            recall_sum += recall;
            f1_sum += f1;
        }

        Ok(Self {
            accuracy,
            precision_macro: precision_sum / 3.0,
            recall_macro: recall_sum / 3.0,
            f1_macro: f1_sum / 3.0,
            confusion_matrix: matrix,
        })
    }

    fn index(label: Label) -> usize {
        (label.as_i8() + 1) as usize
    }

    fn ratio(numerator: f64, denominator: usize) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            numerator / denominator as f64
        }
    }
}

//! Leaderboard aggregation over detected models.
//!
//! The registry is a pure derived view: it borrows the current cell sequence
//! and recomputes every answer per read. No cached incremental state means
//! no incremental-update bugs, at O(n) per read — fine at notebook sizes.
//!
//! Saved runs are a separate namespace. The persisted-run leaderboard is
//! sorted independently and never merged with the live detected-cell view.

use std::cmp::Ordering;

use crate::cell::Cell;
use crate::gateway::types::Run;

pub struct RunRegistry<'a> {
    cells: &'a [Cell],
}

impl<'a> RunRegistry<'a> {
    pub fn new(cells: &'a [Cell]) -> Self {
        Self { cells }
    }

    fn qualifying(&self) -> impl Iterator<Item = (&'a Cell, f64)> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| cell.usable_accuracy().map(|acc| (cell, acc)))
    }

    /// Highest usable accuracy; ties go to the first-encountered cell.
    pub fn best_run(&self) -> Option<&'a Cell> {
        let mut best: Option<(&Cell, f64)> = None;
        for (cell, acc) in self.qualifying() {
            match best {
                Some((_, best_acc)) if acc <= best_acc => {}
                _ => best = Some((cell, acc)),
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// The qualifying cell that appears last in cell order. Positional, not
    /// temporal: reordering cells changes the answer, re-running does not.
    pub fn latest_run(&self) -> Option<&'a Cell> {
        self.qualifying().last().map(|(cell, _)| cell)
    }

    /// All qualifying cells, descending by accuracy. Stable: equal
    /// accuracies keep their cell order.
    pub fn leaderboard(&self) -> Vec<&'a Cell> {
        let mut entries: Vec<(&Cell, f64)> = self.qualifying().collect();
        entries.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        entries.into_iter().map(|(cell, _)| cell).collect()
    }

    pub fn total_detected_models(&self) -> usize {
        self.qualifying().count()
    }
}

/// Sorts explicitly saved runs for the persisted leaderboard, descending by
/// accuracy. Stable, like the live view.
pub fn sort_saved_runs(runs: &mut [Run]) {
    runs.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;
    use crate::detect::{DetectedModel, ModelMetrics};

    fn detected_cell(accuracy: Option<f64>, r2: Option<f64>) -> Cell {
        let mut metrics = ModelMetrics {
            accuracy,
            ..Default::default()
        };
        if let Some(v) = r2 {
            metrics.custom_metrics.insert("r2".to_string(), v);
        }
        let mut cell = Cell::new(CellKind::Code);
        cell.detected_model = Some(DetectedModel {
            detected: true,
            metrics,
            ..Default::default()
        });
        cell
    }

    #[test]
    fn leaderboard_orders_and_best_and_latest_differ() {
        let cells = vec![
            detected_cell(Some(0.5), None),
            detected_cell(Some(0.9), None),
            detected_cell(Some(0.7), None),
        ];
        let registry = RunRegistry::new(&cells);

        let board: Vec<f64> = registry
            .leaderboard()
            .iter()
            .map(|c| c.usable_accuracy().unwrap())
            .collect();
        assert_eq!(board, vec![0.9, 0.7, 0.5]);

        assert_eq!(registry.best_run().unwrap().id, cells[1].id);
        assert_eq!(registry.latest_run().unwrap().id, cells[2].id);
        assert_eq!(registry.total_detected_models(), 3);
    }

    #[test]
    fn ties_keep_first_encountered_and_cell_order() {
        let cells = vec![
            detected_cell(Some(0.8), None),
            detected_cell(Some(0.8), None),
        ];
        let registry = RunRegistry::new(&cells);
        assert_eq!(registry.best_run().unwrap().id, cells[0].id);
        let board = registry.leaderboard();
        assert_eq!(board[0].id, cells[0].id);
        assert_eq!(board[1].id, cells[1].id);
    }

    #[test]
    fn r2_fallback_qualifies_a_cell() {
        let cells = vec![detected_cell(None, Some(0.81))];
        let registry = RunRegistry::new(&cells);
        assert_eq!(registry.total_detected_models(), 1);
        assert_eq!(registry.best_run().unwrap().usable_accuracy(), Some(0.81));
    }

    #[test]
    fn saved_run_leaderboard_sorts_independently() {
        use chrono::Utc;
        use uuid::Uuid;

        let session_id = Uuid::new_v4();
        let run = |name: &str, accuracy: f64| Run {
            id: Uuid::new_v4(),
            session_id,
            name: name.to_string(),
            code: String::new(),
            accuracy,
            precision: None,
            recall: None,
            f1_score: None,
            model_type: "LinearRegression".to_string(),
            dataset_rows: None,
            dataset_columns: None,
            dataset_features: None,
            confusion_matrix: None,
            stdout: None,
            error: None,
            is_improved: false,
            explanation: None,
            created_at: Utc::now(),
        };

        let mut runs = vec![run("a", 0.55), run("b", 0.92), run("c", 0.71)];
        sort_saved_runs(&mut runs);
        let names: Vec<&str> = runs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn undetected_and_markdown_cells_do_not_qualify() {
        let mut undetected = Cell::new(CellKind::Code);
        undetected.detected_model = Some(DetectedModel {
            detected: false,
            metrics: ModelMetrics {
                accuracy: Some(0.99),
                ..Default::default()
            },
            ..Default::default()
        });
        let cells = vec![
            Cell::new(CellKind::Markdown),
            undetected,
            Cell::new(CellKind::Code),
        ];
        let registry = RunRegistry::new(&cells);
        assert_eq!(registry.total_detected_models(), 0);
        assert!(registry.best_run().is_none());
        assert!(registry.latest_run().is_none());
        assert!(registry.leaderboard().is_empty());
    }
}

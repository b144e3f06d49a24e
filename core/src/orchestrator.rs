//! Sequential runner for AI-suggested alternative models.
//!
//! Each experiment moves `pending -> running -> {completed | failed}`;
//! terminal states are only left by starting a brand-new batch. The batch
//! loop is strictly sequential and supports cooperative cancellation: the
//! stop flag is consulted before each next experiment, never mid-flight.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cell::CellKind;
use crate::executor::CodeEngine;
use crate::gateway::types::SuggestedExperiment;
use crate::notebook::Notebook;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub name: String,
    pub description: String,
    pub code: String,
    pub status: ExperimentStatus,
    pub accuracy: Option<f64>,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl Experiment {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            code: code.into(),
            status: ExperimentStatus::Pending,
            accuracy: None,
            output: None,
            error: None,
        }
    }
}

/// Shared stop flag. Cancellation is best-effort: an experiment already
/// running is not interrupted, the flag takes effect at the next iteration
/// boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

pub struct ExperimentOrchestrator {
    experiments: Vec<Experiment>,
    cancel: CancelFlag,
}

impl ExperimentOrchestrator {
    pub fn new(experiments: Vec<Experiment>) -> Self {
        Self {
            experiments,
            cancel: CancelFlag::new(),
        }
    }

    /// Builds a fresh batch from gateway suggestions, discarding any prior
    /// batch state.
    pub fn from_suggestions(suggestions: Vec<SuggestedExperiment>) -> Self {
        Self::new(
            suggestions
                .into_iter()
                .map(|s| Experiment::new(s.name, s.description, s.code))
                .collect(),
        )
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Runs one pending experiment: its code is inserted as a visible
    /// notebook cell, executed there, and the accuracy figure is taken from
    /// the cell's detection or, failing that, by scanning the raw stdout.
    /// A run that raises fails the experiment with the captured error text;
    /// a clean run with nothing extractable completes with accuracy 0.
    pub async fn run_one<E: CodeEngine>(&mut self, index: usize, notebook: &mut Notebook<E>) {
        let Some(experiment) = self.experiments.get_mut(index) else {
            return;
        };
        if experiment.status != ExperimentStatus::Pending {
            return;
        }
        experiment.status = ExperimentStatus::Running;
        let code = experiment.code.clone();

        let cell_id = notebook.add_cell_with_content(CellKind::Code, code, None);
        notebook.run_cell(cell_id).await;

        let cell = match notebook.cell(cell_id) {
            Some(cell) => cell,
            None => return,
        };
        let experiment = &mut self.experiments[index];
        experiment.output = cell.output.clone();

        if let Some(error) = &cell.error_text {
            experiment.status = ExperimentStatus::Failed;
            experiment.error = Some(error.clone());
            tracing::warn!("experiment '{}' failed: {}", experiment.name, error);
            return;
        }

        let stdout = cell.output.as_deref().unwrap_or("");
        let accuracy = cell
            .usable_accuracy()
            .or_else(|| extract_accuracy(stdout))
            .unwrap_or(0.0);
        experiment.accuracy = Some(accuracy);
        experiment.status = ExperimentStatus::Completed;
    }

    /// Runs the batch strictly sequentially. `on_progress` fires after each
    /// experiment reaches a terminal state with the aggregate progress; the
    /// cancel flag is checked before starting each next experiment.
    pub async fn run_all<E, F>(&mut self, notebook: &mut Notebook<E>, mut on_progress: F)
    where
        E: CodeEngine,
        F: FnMut(BatchProgress, &Experiment),
    {
        let total = self.experiments.len();
        for index in 0..total {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    "experiment batch cancelled after {} of {}",
                    index,
                    total
                );
                break;
            }
            self.run_one(index, notebook).await;
            on_progress(
                BatchProgress {
                    completed: index + 1,
                    total,
                },
                &self.experiments[index],
            );
        }
    }

    /// Completed experiments, descending by accuracy. Pending and failed
    /// entries are not ranked.
    pub fn ranking(&self) -> Vec<&Experiment> {
        let mut completed: Vec<&Experiment> = self
            .experiments
            .iter()
            .filter(|e| e.status == ExperimentStatus::Completed)
            .collect();
        completed.sort_by(|a, b| {
            b.accuracy
                .partial_cmp(&a.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        completed
    }
}

fn accuracy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:r(?:\^2|²|2)(?:\s*score)?|accuracy)\s*[:=]\s*(-?\d+(?:\.\d+)?)\s*(%)?")
            .expect("accuracy pattern is valid")
    })
}

/// Scans free-form stdout for an accuracy or R² figure, e.g.
/// `R^2 score: 0.94`, `Accuracy: 0.94`, `accuracy = 94%`. Percent values
/// come back normalized to a 0-1 fraction.
pub fn extract_accuracy(stdout: &str) -> Option<f64> {
    let captures = accuracy_pattern().captures(stdout)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    if captures.get(2).is_some() {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DetectionPipeline;
    use crate::testing::ScriptedEngine;

    fn notebook() -> Notebook<ScriptedEngine> {
        Notebook::new(ScriptedEngine::new(), DetectionPipeline::tagged_only())
    }

    fn chained_experiments() -> Vec<Experiment> {
        vec![
            Experiment::new("baseline", "fits and exposes a seed", "seed = 1"),
            Experiment::new(
                "depends-on-baseline",
                "reads state left by the first",
                "print(seed)\nprint('Accuracy: 0.85')",
            ),
            Experiment::new("independent", "", "print('R^2 score: 0.91')"),
        ]
    }

    #[tokio::test]
    async fn sequential_run_preserves_interpreter_order_dependency() {
        let mut nb = notebook();
        let mut orchestrator = ExperimentOrchestrator::new(chained_experiments());
        orchestrator.run_all(&mut nb, |_, _| {}).await;

        let statuses: Vec<ExperimentStatus> = orchestrator
            .experiments()
            .iter()
            .map(|e| e.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ExperimentStatus::Completed,
                ExperimentStatus::Completed,
                ExperimentStatus::Completed
            ]
        );
        assert_eq!(orchestrator.experiments()[1].accuracy, Some(0.85));
        assert_eq!(orchestrator.experiments()[2].accuracy, Some(0.91));
    }

    #[tokio::test]
    async fn reversed_run_breaks_the_dependency() {
        let mut nb = notebook();
        let mut reversed = chained_experiments();
        reversed.reverse();
        let mut orchestrator = ExperimentOrchestrator::new(reversed);
        orchestrator.run_all(&mut nb, |_, _| {}).await;

        // "depends-on-baseline" now runs before its dependency exists.
        let broken = &orchestrator.experiments()[1];
        assert_eq!(broken.status, ExperimentStatus::Failed);
        assert!(broken.error.as_deref().unwrap().contains("NameError"));
    }

    #[tokio::test]
    async fn cancellation_takes_effect_at_the_next_boundary() {
        let mut nb = notebook();
        let experiments = (0..5)
            .map(|i| Experiment::new(format!("exp-{}", i), "", "print('Accuracy: 0.5')"))
            .collect();
        let mut orchestrator = ExperimentOrchestrator::new(experiments);
        let cancel = orchestrator.cancel_flag();

        orchestrator
            .run_all(&mut nb, |progress, _| {
                if progress.completed == 2 {
                    cancel.cancel();
                }
            })
            .await;

        let statuses: Vec<ExperimentStatus> = orchestrator
            .experiments()
            .iter()
            .map(|e| e.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ExperimentStatus::Completed,
                ExperimentStatus::Completed,
                ExperimentStatus::Pending,
                ExperimentStatus::Pending,
                ExperimentStatus::Pending
            ]
        );
    }

    #[tokio::test]
    async fn unextractable_accuracy_completes_with_zero() {
        let mut nb = notebook();
        let mut orchestrator = ExperimentOrchestrator::new(vec![Experiment::new(
            "silent",
            "",
            "print('done training')",
        )]);
        orchestrator.run_all(&mut nb, |_, _| {}).await;

        let exp = &orchestrator.experiments()[0];
        assert_eq!(exp.status, ExperimentStatus::Completed);
        assert_eq!(exp.accuracy, Some(0.0));
    }

    #[tokio::test]
    async fn detection_beats_the_regex_fallback() {
        let mut nb = notebook();
        let mut orchestrator = ExperimentOrchestrator::new(vec![Experiment::new(
            "tagged",
            "",
            "print('ACCURACY: 0.88')\nprint('Accuracy: 0.11')",
        )]);
        orchestrator.run_all(&mut nb, |_, _| {}).await;
        assert_eq!(orchestrator.experiments()[0].accuracy, Some(0.88));
    }

    #[tokio::test]
    async fn ranking_orders_completed_and_skips_failed() {
        let mut nb = notebook();
        let mut orchestrator = ExperimentOrchestrator::new(vec![
            Experiment::new("low", "", "print('Accuracy: 0.42')"),
            Experiment::new("broken", "", "fail ValueError: bad input"),
            Experiment::new("high", "", "print('Accuracy: 0.93')"),
        ]);
        orchestrator.run_all(&mut nb, |_, _| {}).await;

        let ranked: Vec<&str> = orchestrator
            .ranking()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(ranked, vec!["high", "low"]);
    }

    #[tokio::test]
    async fn progress_reports_each_terminal_experiment() {
        let mut nb = notebook();
        let experiments = (0..3)
            .map(|i| Experiment::new(format!("exp-{}", i), "", "print('Accuracy: 0.5')"))
            .collect();
        let mut orchestrator = ExperimentOrchestrator::new(experiments);

        let mut fractions = Vec::new();
        orchestrator
            .run_all(&mut nb, |progress, _| fractions.push(progress.fraction()))
            .await;
        assert_eq!(fractions.len(), 3);
        assert!((fractions[0] - 1.0 / 3.0).abs() < 1e-9);
        assert!((fractions[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn accuracy_regex_understands_common_shapes() {
        assert_eq!(extract_accuracy("R^2 score: 0.94"), Some(0.94));
        assert_eq!(extract_accuracy("Test Accuracy: 0.7321"), Some(0.7321));
        assert_eq!(extract_accuracy("accuracy = 94%"), Some(0.94));
        assert_eq!(extract_accuracy("r2: -0.12"), Some(-0.12));
        assert_eq!(extract_accuracy("loss: 0.03"), None);
        assert_eq!(extract_accuracy(""), None);
    }
}

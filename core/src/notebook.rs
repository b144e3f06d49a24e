//! The cell store: an ordered, reorderable sequence of notebook cells with
//! at most one detected-run result each.
//!
//! Executions are strictly sequential. `run_all_cells` awaits each cell
//! before starting the next because later cells may depend on interpreter
//! state left behind by earlier ones; running out of order or concurrently
//! would silently corrupt results.

use uuid::Uuid;

use crate::cell::{Cell, CellKind};
use crate::executor::{CodeEngine, Dataset, ExecutionAdapter};
use crate::parser::DetectionPipeline;
use crate::registry::RunRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

pub struct Notebook<E> {
    cells: Vec<Cell>,
    active: Uuid,
    adapter: ExecutionAdapter<E>,
    detection: DetectionPipeline,
    dataset: Option<Dataset>,
}

impl<E: CodeEngine> Notebook<E> {
    /// Starts with a single empty code cell; a notebook is never empty.
    pub fn new(engine: E, detection: DetectionPipeline) -> Self {
        let first = Cell::new(CellKind::Code);
        let active = first.id;
        Self {
            cells: vec![first],
            active,
            adapter: ExecutionAdapter::new(engine),
            detection,
            dataset: None,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: Uuid) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn active_cell(&self) -> Uuid {
        self.active
    }

    /// The uploaded tabular file staged into every subsequent execution.
    pub fn set_dataset(&mut self, dataset: Option<Dataset>) {
        self.dataset = dataset;
    }

    pub fn registry(&self) -> RunRegistry<'_> {
        RunRegistry::new(&self.cells)
    }

    fn index_of(&self, id: Uuid) -> Option<usize> {
        self.cells.iter().position(|c| c.id == id)
    }

    /// Inserts a new empty cell immediately after `after` when given and
    /// found, else at the end. The new cell becomes the active cell.
    pub fn add_cell(&mut self, kind: CellKind, after: Option<Uuid>) -> Uuid {
        self.insert_cell(Cell::new(kind), after)
    }

    /// Same placement rule, pre-populated content. Used by AI-driven flows
    /// so generated code lands visibly in the notebook.
    pub fn add_cell_with_content(
        &mut self,
        kind: CellKind,
        content: impl Into<String>,
        after: Option<Uuid>,
    ) -> Uuid {
        self.insert_cell(Cell::with_content(kind, content), after)
    }

    fn insert_cell(&mut self, cell: Cell, after: Option<Uuid>) -> Uuid {
        let index = after
            .and_then(|id| self.index_of(id))
            .map(|i| i + 1)
            .unwrap_or(self.cells.len());
        let id = cell.id;
        self.cells.insert(index, cell);
        self.active = id;
        id
    }

    pub fn set_content(&mut self, id: Uuid, content: impl Into<String>) {
        if let Some(index) = self.index_of(id) {
            self.cells[index].content = content.into();
        }
    }

    /// No-op on the last remaining cell. When the deleted cell was active,
    /// activation moves to the cell now at `max(0, index - 1)`.
    pub fn delete_cell(&mut self, id: Uuid) {
        if self.cells.len() <= 1 {
            return;
        }
        let Some(index) = self.index_of(id) else {
            return;
        };
        let was_active = self.active == id;
        self.cells.remove(index);
        if was_active {
            let fallback = index.saturating_sub(1);
            self.active = self.cells[fallback].id;
        }
    }

    /// Swaps with the adjacent cell; no-op at either boundary.
    pub fn move_cell(&mut self, id: Uuid, direction: MoveDirection) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        match direction {
            MoveDirection::Up if index > 0 => self.cells.swap(index, index - 1),
            MoveDirection::Down if index + 1 < self.cells.len() => {
                self.cells.swap(index, index + 1)
            }
            _ => {}
        }
    }

    /// Runs one code cell: clears prior results, executes, stores captured
    /// output and error, then attaches a detection only when stdout is
    /// non-empty and no error occurred. No-op for markdown cells, unknown
    /// ids, and an engine that is not ready.
    pub async fn run_cell(&mut self, id: Uuid) {
        let Some(index) = self.index_of(id) else {
            tracing::debug!("run_cell: no such cell {}", id);
            return;
        };
        if self.cells[index].kind != CellKind::Code {
            return;
        }
        if !self.adapter.ready().await {
            return;
        }

        let code = {
            let cell = &mut self.cells[index];
            cell.clear_results();
            cell.is_running = true;
            cell.content.clone()
        };

        let result = self.adapter.execute(&code, self.dataset.as_ref()).await;

        // Output lands and the running flag drops before detection, which is
        // attached afterwards; observers may see one without the other.
        {
            let cell = &mut self.cells[index];
            cell.output = if result.stdout.is_empty() {
                None
            } else {
                Some(result.stdout.clone())
            };
            cell.error_text = result.error.clone();
            cell.is_running = false;
        }

        if result.success && !result.stdout.is_empty() {
            let detected = self.detection.detect(&code, &result.stdout).await;
            self.cells[index].detected_model = detected;
        }
    }

    /// Runs every code cell sequentially in notebook order, awaiting each
    /// before starting the next.
    pub async fn run_all_cells(&mut self) {
        let ids: Vec<Uuid> = self
            .cells
            .iter()
            .filter(|c| c.kind == CellKind::Code)
            .map(|c| c.id)
            .collect();
        for id in ids {
            self.run_cell(id).await;
        }
    }

    /// Clears output, error, and detection on every cell; content and order
    /// are untouched.
    pub fn clear_all_outputs(&mut self) {
        for cell in &mut self.cells {
            cell.clear_results();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedEngine;

    fn notebook() -> Notebook<ScriptedEngine> {
        Notebook::new(ScriptedEngine::new(), DetectionPipeline::tagged_only())
    }

    #[test]
    fn deleting_the_only_cell_is_a_noop() {
        let mut nb = notebook();
        let only = nb.cells()[0].id;
        nb.delete_cell(only);
        assert_eq!(nb.cells().len(), 1);
        assert_eq!(nb.cells()[0].id, only);
    }

    #[test]
    fn new_cell_is_placed_after_anchor_and_becomes_active() {
        let mut nb = notebook();
        let first = nb.cells()[0].id;
        let last = nb.add_cell(CellKind::Code, None);
        let middle = nb.add_cell(CellKind::Markdown, Some(first));

        let order: Vec<Uuid> = nb.cells().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![first, middle, last]);
        assert_eq!(nb.active_cell(), middle);
    }

    #[test]
    fn deleting_the_active_cell_activates_the_previous_one() {
        let mut nb = notebook();
        let first = nb.cells()[0].id;
        let second = nb.add_cell(CellKind::Code, None);
        assert_eq!(nb.active_cell(), second);

        nb.delete_cell(second);
        assert_eq!(nb.active_cell(), first);
        assert_eq!(nb.cells().len(), 1);
    }

    #[test]
    fn move_cell_swaps_and_stops_at_boundaries() {
        let mut nb = notebook();
        let first = nb.cells()[0].id;
        let second = nb.add_cell(CellKind::Code, None);

        nb.move_cell(first, MoveDirection::Up);
        assert_eq!(nb.cells()[0].id, first);

        nb.move_cell(first, MoveDirection::Down);
        let order: Vec<Uuid> = nb.cells().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![second, first]);

        nb.move_cell(first, MoveDirection::Down);
        assert_eq!(nb.cells()[1].id, first);
    }

    #[tokio::test]
    async fn run_cell_captures_output_and_detection() {
        let mut nb = notebook();
        let id = nb.add_cell_with_content(
            CellKind::Code,
            "print('MODEL_TYPE: Ridge')\nprint('ACCURACY: 0.84')",
            None,
        );
        nb.run_cell(id).await;

        let cell = nb.cell(id).unwrap();
        assert!(!cell.is_running);
        assert!(cell.output.as_deref().unwrap().contains("ACCURACY: 0.84"));
        assert!(cell.error_text.is_none());
        let detected = cell.detected_model.as_ref().unwrap();
        assert_eq!(detected.model_type.as_deref(), Some("Ridge"));
        assert_eq!(detected.metrics.accuracy, Some(0.84));
    }

    #[tokio::test]
    async fn failed_run_keeps_partial_output_and_skips_detection() {
        let mut nb = notebook();
        let id = nb.add_cell_with_content(
            CellKind::Code,
            "print('ACCURACY: 0.99')\nfail boom",
            None,
        );
        nb.run_cell(id).await;

        let cell = nb.cell(id).unwrap();
        assert!(!cell.is_running);
        assert_eq!(cell.output.as_deref(), Some("ACCURACY: 0.99\n"));
        assert_eq!(cell.error_text.as_deref(), Some("boom"));
        assert!(cell.detected_model.is_none());
    }

    #[tokio::test]
    async fn run_cell_is_a_noop_for_markdown() {
        let mut nb = notebook();
        let id = nb.add_cell_with_content(CellKind::Markdown, "# notes", None);
        nb.run_cell(id).await;
        let cell = nb.cell(id).unwrap();
        assert!(cell.output.is_none());
        assert!(cell.detected_model.is_none());
    }

    #[tokio::test]
    async fn rerunning_clears_previous_results_first() {
        let mut nb = notebook();
        let id = nb.add_cell_with_content(CellKind::Code, "print('ACCURACY: 0.7')", None);
        nb.run_cell(id).await;
        assert!(nb.cell(id).unwrap().detected_model.is_some());

        // Content changes to something with no signal; stale detection must go.
        nb.set_content(id, "print('no metrics here')");
        nb.run_cell(id).await;
        let cell = nb.cell(id).unwrap();
        assert_eq!(cell.output.as_deref(), Some("no metrics here\n"));
        assert!(cell.detected_model.is_none());
    }

    #[tokio::test]
    async fn run_all_executes_in_order_against_shared_state() {
        let mut nb = notebook();
        let first = nb.cells()[0].id;
        nb.set_content(first, "trained = 0.93");
        let second = nb.add_cell_with_content(CellKind::Code, "print(trained)", None);

        nb.run_all_cells().await;

        let cell = nb.cell(second).unwrap();
        assert!(cell.error_text.is_none());
        assert_eq!(cell.output.as_deref(), Some("0.93\n"));
    }

    #[tokio::test]
    async fn clear_all_outputs_preserves_content_and_order() {
        let mut nb = notebook();
        let id = nb.add_cell_with_content(CellKind::Code, "print('ACCURACY: 0.6')", None);
        nb.run_cell(id).await;
        assert!(nb.cell(id).unwrap().output.is_some());

        nb.clear_all_outputs();
        let cell = nb.cell(id).unwrap();
        assert!(cell.output.is_none());
        assert!(cell.error_text.is_none());
        assert!(cell.detected_model.is_none());
        assert_eq!(cell.content, "print('ACCURACY: 0.6')");
    }
}

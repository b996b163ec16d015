use crate::dataset::Dataset;
use crate::evaluator::{EvaluationSummary, Evaluator, Tick};
use crate::row::Row;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Position of the cursor. `index < total` whenever `total > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub index: usize,
    pub total: usize,
}

impl CursorState {
    /// The position one tick later, wrapping to 0 after the last row.
    pub fn next(self) -> Self {
        Self {
            index: if self.total == 0 {
                0
            } else {
                (self.index + 1) % self.total
            },
            total: self.total,
        }
    }
}

/// The row under the cursor together with its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentRow {
    pub row: Row,
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub state: CursorState,
    pub summary: EvaluationSummary,
}

/// The single authoritative position into the dataset.
///
/// The index lives behind its own lock, held only long enough to read or
/// advance it. `tick` must only be driven by one scheduler.
pub struct RotatingCursor {
    dataset: Arc<Dataset>,
    index: Mutex<usize>,
    evaluator: Arc<dyn Evaluator>,
}

impl RotatingCursor {
    pub fn new(dataset: Arc<Dataset>, evaluator: Arc<dyn Evaluator>) -> Self {
        Self::starting_at(dataset, 0, evaluator)
    }

    pub fn starting_at(dataset: Arc<Dataset>, index: usize, evaluator: Arc<dyn Evaluator>) -> Self {
        let index = index % dataset.len();
        Self {
            dataset,
            index: Mutex::new(index),
            evaluator,
        }
    }

    /// Resume from a persisted position when it was taken over a dataset of
    /// the same length; otherwise start from row 0.
    pub fn restore(
        dataset: Arc<Dataset>,
        saved: Option<CursorState>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        let index = match saved {
            Some(s) if s.total == dataset.len() => {
                tracing::info!(index = s.index, total = s.total, "restored cursor position");
                s.index
            }
            Some(s) => {
                tracing::info!(
                    saved_total = s.total,
                    total = dataset.len(),
                    "dataset length changed, starting from row 0"
                );
                0
            }
            None => 0,
        };
        Self::starting_at(dataset, index, evaluator)
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn state(&self) -> CursorState {
        CursorState {
            index: *self.lock(),
            total: self.dataset.len(),
        }
    }

    pub fn current(&self) -> CurrentRow {
        let index = *self.lock();
        CurrentRow {
            row: self.dataset.row_wrapping(index).clone(),
            index,
            total: self.dataset.len(),
        }
    }

    /// Advance one row and run the evaluator against it.
    pub fn tick_at(&self, at: DateTime<Utc>) -> TickOutcome {
        let horizon = self.evaluator.horizon();
        let state = {
            let mut index = self.lock();
            let next = CursorState {
                index: *index,
                total: self.dataset.len(),
            }
            .next();
            *index = next.index;
            next
        };
        let summary = self.evaluator.evaluate(&Tick {
            row: self.dataset.row_wrapping(state.index),
            state,
            horizon,
            at,
        });
        TickOutcome { state, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionSpec, ConditionStatus};
    use crate::evaluator::ConditionEvaluator;
    use crate::parser::ParsedCondition;
    use crate::registry::ConditionRegistry;
    use std::path::Path;

    struct NoopEvaluator;

    impl Evaluator for NoopEvaluator {
        fn horizon(&self) -> usize {
            0
        }

        fn evaluate(&self, _tick: &Tick<'_>) -> EvaluationSummary {
            EvaluationSummary::default()
        }
    }

    fn dataset(rows: usize) -> Arc<Dataset> {
        let mut csv = String::from("n\n");
        for i in 0..rows {
            csv.push_str(&format!("{i}\n"));
        }
        Arc::new(Dataset::parse(Path::new("t.csv"), &csv).unwrap())
    }

    #[test]
    fn n_ticks_lands_on_n_mod_len() {
        for n in [0usize, 1, 4, 5, 6, 17] {
            let cursor = RotatingCursor::new(dataset(5), Arc::new(NoopEvaluator));
            for _ in 0..n {
                cursor.tick_at(Utc::now());
            }
            assert_eq!(cursor.state().index, n % 5, "after {n} ticks");
        }
    }

    #[test]
    fn current_matches_index() {
        let cursor = RotatingCursor::starting_at(dataset(3), 2, Arc::new(NoopEvaluator));
        let current = cursor.current();
        assert_eq!(current.index, 2);
        assert_eq!(current.total, 3);
        assert_eq!(current.row.get("n"), Some("2"));
        let outcome = cursor.tick_at(Utc::now());
        assert_eq!(outcome.state, CursorState { index: 0, total: 3 });
        assert_eq!(cursor.current().row.get("n"), Some("0"));
    }

    #[test]
    fn restore_uses_saved_index_when_total_matches() {
        let saved = CursorState { index: 3, total: 4 };
        let cursor = RotatingCursor::restore(dataset(4), Some(saved), Arc::new(NoopEvaluator));
        assert_eq!(cursor.state().index, 3);
    }

    #[test]
    fn restore_starts_fresh_when_total_differs() {
        let saved = CursorState { index: 3, total: 9 };
        let cursor = RotatingCursor::restore(dataset(4), Some(saved), Arc::new(NoopEvaluator));
        assert_eq!(cursor.state().index, 0);
    }

    /// Registers one more condition each time the cursor evaluates, as a
    /// command arriving mid-tick would.
    struct RegisteringEvaluator {
        registry: Arc<ConditionRegistry>,
        inner: ConditionEvaluator,
        late: Mutex<Vec<uuid::Uuid>>,
    }

    impl RegisteringEvaluator {
        fn new(registry: Arc<ConditionRegistry>) -> Self {
            Self {
                inner: ConditionEvaluator::new(Arc::clone(&registry)),
                registry,
                late: Mutex::new(Vec::new()),
            }
        }
    }

    impl Evaluator for RegisteringEvaluator {
        fn horizon(&self) -> usize {
            self.inner.horizon()
        }

        fn evaluate(&self, tick: &Tick<'_>) -> EvaluationSummary {
            let now = Utc::now();
            let late = self.registry.register(
                "n above -1",
                now,
                Ok(ParsedCondition {
                    spec: ConditionSpec::from_raw("n", ">", "-1", "number").unwrap(),
                    assistant_message: "ok".into(),
                }),
                now,
            );
            self.late.lock().unwrap().push(late.id);
            self.inner.evaluate(tick)
        }
    }

    #[test]
    fn condition_registered_mid_tick_waits_for_next_tick() {
        let registry = Arc::new(ConditionRegistry::new());
        let evaluator = Arc::new(RegisteringEvaluator::new(Arc::clone(&registry)));
        let cursor = RotatingCursor::new(dataset(5), evaluator.clone());

        let first = cursor.tick_at(Utc::now());
        assert_eq!(first.summary.evaluated, 0);
        let late = evaluator.late.lock().unwrap()[0];
        assert_eq!(registry.get(&late).unwrap().status, ConditionStatus::Pending);

        let second = cursor.tick_at(Utc::now());
        assert_eq!(second.summary.evaluated, 1);
        assert_eq!(second.summary.triggered, vec![late]);
        assert_eq!(registry.get(&late).unwrap().matched_row_index, Some(2));
    }

    #[test]
    fn concurrent_readers_never_see_out_of_range_index() {
        let cursor = Arc::new(RotatingCursor::new(dataset(7), Arc::new(NoopEvaluator)));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cursor = Arc::clone(&cursor);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let current = cursor.current();
                        assert!(current.index < current.total);
                        assert_eq!(current.row.get("n"), Some(current.index.to_string().as_str()));
                    }
                })
            })
            .collect();
        for _ in 0..500 {
            cursor.tick_at(Utc::now());
        }
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(cursor.state().index, 500 % 7);
    }
}

use crate::condition::Condition;
use crate::cursor::{CurrentRow, CursorState, RotatingCursor};
use crate::dataset::Dataset;
use crate::error::{PersistenceError, Result, RotorError};
use crate::evaluator::{ConditionEvaluator, EvaluationSummary};
use crate::parser::ConditionParser;
use crate::registry::ConditionRegistry;
use crate::snapshot::{Snapshot, SnapshotStore};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Result of one scheduled rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub state: CursorState,
    pub summary: EvaluationSummary,
    pub persisted: bool,
}

/// Owns the dataset, cursor, registry, and snapshot store for one process.
///
/// Lock order is persist lock first, then either the cursor or the
/// registry lock. No path holds the cursor and registry locks together.
pub struct Rotor {
    cursor: RotatingCursor,
    registry: Arc<ConditionRegistry>,
    store: Option<SnapshotStore>,
    persist_lock: Mutex<()>,
}

impl Rotor {
    /// Build the engine and restore whatever the store holds. A missing,
    /// corrupt, or unsupported snapshot starts fresh.
    pub fn open(dataset: Dataset, store: SnapshotStore) -> Self {
        let snapshot = match store.load() {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                tracing::info!(path = %store.path().display(), "no snapshot found, starting fresh");
                None
            }
            Err(e) => {
                tracing::warn!(path = %store.path().display(), error = %e, "ignoring unreadable snapshot");
                None
            }
        };
        let (saved_cursor, conditions) = match snapshot {
            Some(s) => (Some(s.cursor), s.conditions),
            None => (None, Vec::new()),
        };
        if !conditions.is_empty() {
            tracing::info!(count = conditions.len(), "restored conditions");
        }
        Self::assemble(dataset, saved_cursor, conditions, Some(store))
    }

    /// An engine with no durable state, for inspection and tests.
    pub fn in_memory(dataset: Dataset) -> Self {
        Self::assemble(dataset, None, Vec::new(), None)
    }

    fn assemble(
        dataset: Dataset,
        saved_cursor: Option<CursorState>,
        conditions: Vec<Condition>,
        store: Option<SnapshotStore>,
    ) -> Self {
        let registry = Arc::new(ConditionRegistry::from_conditions(conditions));
        let evaluator = Arc::new(ConditionEvaluator::new(Arc::clone(&registry)));
        let cursor = RotatingCursor::restore(Arc::new(dataset), saved_cursor, evaluator);
        Self {
            cursor,
            registry,
            store,
            persist_lock: Mutex::new(()),
        }
    }

    fn persist_guard(&self) -> MutexGuard<'_, ()> {
        self.persist_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dataset(&self) -> &Dataset {
        self.cursor.dataset()
    }

    pub fn state(&self) -> CursorState {
        self.cursor.state()
    }

    pub fn current(&self) -> CurrentRow {
        self.cursor.current()
    }

    pub fn tick(&self) -> TickReport {
        self.tick_at(Utc::now())
    }

    /// Advance the cursor, evaluate pending conditions against the new row,
    /// and write one snapshot. Persistence failures are logged and the
    /// in-memory state stays authoritative.
    pub fn tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let _guard = self.persist_guard();
        let outcome = self.cursor.tick_at(now);
        let summary = outcome.summary;

        tracing::debug!(
            index = outcome.state.index,
            total = outcome.state.total,
            evaluated = summary.evaluated,
            missing_field = summary.missing_field,
            not_numeric = summary.not_numeric,
            "tick"
        );
        for id in &summary.triggered {
            tracing::info!(%id, index = outcome.state.index, "condition triggered");
        }

        let persisted = match self.persist_locked(now) {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist snapshot after tick");
                false
            }
        };
        TickReport {
            state: outcome.state,
            summary,
            persisted,
        }
    }

    /// Parse a natural-language command against the current row and record
    /// the outcome. A parse failure is recorded as a `failed` condition.
    ///
    /// Only the in-memory registry is updated. Follow up with
    /// [`Rotor::persist_registration`] off the async runtime.
    pub async fn register_condition(
        &self,
        parser: &dyn ConditionParser,
        message: &str,
        command_time: Option<DateTime<Utc>>,
    ) -> Result<Condition> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RotorError::EmptyMessage);
        }
        let command_time = command_time.unwrap_or_else(Utc::now);
        let row = self.current().row;

        let outcome = parser.parse(message, &row).await;
        if let Err(failure) = &outcome {
            tracing::warn!(reason = %failure, "condition could not be parsed");
        }

        let now = Utc::now();
        let condition = self.registry.register(message, command_time, outcome, now);
        tracing::info!(id = %condition.id, status = %condition.status, "registered condition");
        Ok(condition)
    }

    /// Write a snapshot after a registration. Blocks while a tick holds the
    /// persist lock, so async callers run it on a blocking thread. Failures
    /// are logged and reported as `false`.
    pub fn persist_registration(&self) -> bool {
        let _guard = self.persist_guard();
        match self.persist_locked(Utc::now()) {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist snapshot after registration");
                false
            }
        }
    }

    pub fn list_conditions(&self) -> Vec<Condition> {
        self.registry.list()
    }

    pub fn condition(&self, id: &str) -> Result<Condition> {
        Uuid::parse_str(id)
            .ok()
            .and_then(|uuid| self.registry.get(&uuid))
            .ok_or_else(|| RotorError::ConditionNotFound(id.to_string()))
    }

    /// Write a snapshot now. A no-op for in-memory engines.
    pub fn persist(&self) -> std::result::Result<(), PersistenceError> {
        let _guard = self.persist_guard();
        self.persist_locked(Utc::now()).map(|_| ())
    }

    fn persist_locked(&self, now: DateTime<Utc>) -> std::result::Result<bool, PersistenceError> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        let snapshot = Snapshot::new(self.cursor.state(), self.registry.snapshot(), now);
        store.save(&snapshot)?;
        Ok(true)
    }
}

use crate::condition::{Condition, ConditionStatus};
use crate::parser::{ParseFailure, ParsedCondition};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    conditions: Vec<Condition>,
    by_id: HashMap<Uuid, usize>,
}

impl Inner {
    fn push(&mut self, condition: Condition) -> bool {
        if self.by_id.contains_key(&condition.id) {
            return false;
        }
        self.by_id.insert(condition.id, self.conditions.len());
        self.conditions.push(condition);
        true
    }
}

/// Insertion-ordered set of conditions behind a single exclusive lock.
///
/// Registration, listing, and the evaluation pass are mutually exclusive;
/// readers only ever receive owned clones.
#[derive(Debug, Default)]
pub struct ConditionRegistry {
    inner: Mutex<Inner>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted conditions, keeping their order.
    /// Repeated ids keep the first occurrence.
    pub fn from_conditions(conditions: Vec<Condition>) -> Self {
        let mut inner = Inner::default();
        for condition in conditions {
            let id = condition.id;
            if !inner.push(condition) {
                tracing::warn!(%id, "skipping duplicate condition in snapshot");
            }
        }
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a newly parsed command.
    ///
    /// A successful parse yields a `pending` condition carrying the spec; a
    /// failure yields a terminal `failed` condition whose assistant message
    /// explains why.
    pub fn register(
        &self,
        message: impl Into<String>,
        command_time: DateTime<Utc>,
        outcome: Result<ParsedCondition, ParseFailure>,
        now: DateTime<Utc>,
    ) -> Condition {
        let (status, spec, assistant_message) = match outcome {
            Ok(parsed) => (
                ConditionStatus::Pending,
                Some(parsed.spec),
                parsed.assistant_message,
            ),
            Err(failure) => (ConditionStatus::Failed, None, failure.reason),
        };
        let condition = Condition {
            id: Uuid::new_v4(),
            message: message.into(),
            status,
            command_time,
            parsed_time: now,
            last_checked_time: now,
            triggered_time: None,
            assistant_message,
            spec,
            matched_row_index: None,
            matched_row: None,
        };
        self.lock().push(condition.clone());
        condition
    }

    /// All conditions ordered by `command_time`, ties in insertion order.
    pub fn list(&self) -> Vec<Condition> {
        let mut conditions = self.lock().conditions.clone();
        conditions.sort_by_key(|c| c.command_time);
        conditions
    }

    /// All conditions in insertion order, as persisted.
    pub fn snapshot(&self) -> Vec<Condition> {
        self.lock().conditions.clone()
    }

    pub fn get(&self, id: &Uuid) -> Option<Condition> {
        let inner = self.lock();
        inner.by_id.get(id).map(|&i| inner.conditions[i].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold the registry lock for one evaluation pass.
    pub(crate) fn begin_pass(&self) -> RegistryPass<'_> {
        RegistryPass { inner: self.lock() }
    }
}

/// Exclusive access to the registry for the duration of one evaluation pass.
pub(crate) struct RegistryPass<'a> {
    inner: MutexGuard<'a, Inner>,
}

impl RegistryPass<'_> {
    /// Ids of pending conditions among the first `horizon` registrations.
    pub(crate) fn pending_before(&self, horizon: usize) -> Vec<Uuid> {
        let end = horizon.min(self.inner.conditions.len());
        self.inner.conditions[..end]
            .iter()
            .filter(|c| c.is_pending())
            .map(|c| c.id)
            .collect()
    }

    pub(crate) fn mutate<R>(&mut self, id: &Uuid, f: impl FnOnce(&mut Condition) -> R) -> Option<R> {
        let index = *self.inner.by_id.get(id)?;
        Some(f(&mut self.inner.conditions[index]))
    }
}

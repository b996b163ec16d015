use crate::condition::ComparisonError;
use crate::cursor::CursorState;
use crate::registry::ConditionRegistry;
use crate::row::Row;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Everything an evaluator needs about the row the cursor just moved to.
#[derive(Debug)]
pub struct Tick<'a> {
    pub row: &'a Row,
    pub state: CursorState,
    /// Registry length captured before the cursor moved. Conditions at or
    /// past this position were registered mid-tick and wait for the next one.
    pub horizon: usize,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationSummary {
    pub evaluated: usize,
    pub triggered: Vec<Uuid>,
    pub missing_field: usize,
    pub not_numeric: usize,
}

/// Invoked synchronously by the cursor after every advance.
pub trait Evaluator: Send + Sync {
    /// Bound on what the upcoming evaluation may touch, read before the
    /// cursor moves.
    fn horizon(&self) -> usize;

    fn evaluate(&self, tick: &Tick<'_>) -> EvaluationSummary;
}

/// Checks every pending condition in the registry against the new row.
pub struct ConditionEvaluator {
    registry: Arc<ConditionRegistry>,
}

impl ConditionEvaluator {
    pub fn new(registry: Arc<ConditionRegistry>) -> Self {
        Self { registry }
    }
}

impl Evaluator for ConditionEvaluator {
    fn horizon(&self) -> usize {
        self.registry.len()
    }

    fn evaluate(&self, tick: &Tick<'_>) -> EvaluationSummary {
        let mut summary = EvaluationSummary::default();
        let mut pass = self.registry.begin_pass();
        for id in pass.pending_before(tick.horizon) {
            let outcome = pass.mutate(&id, |c| c.check(tick.row, tick.state.index, tick.at));
            summary.evaluated += 1;
            match outcome {
                Some(Ok(true)) => summary.triggered.push(id),
                Some(Err(ComparisonError::MissingField(_))) => summary.missing_field += 1,
                Some(Err(ComparisonError::NotNumeric { .. })) => summary.not_numeric += 1,
                Some(Ok(false)) | None => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionSpec, ConditionStatus};
    use crate::parser::ParsedCondition;

    fn register(reg: &ConditionRegistry, field: &str, value: &str) -> Uuid {
        let now = Utc::now();
        reg.register(
            format!("{field} above {value}"),
            now,
            Ok(ParsedCondition {
                spec: ConditionSpec::from_raw(field, ">", value, "number").unwrap(),
                assistant_message: "ok".into(),
            }),
            now,
        )
        .id
    }

    fn tick<'a>(row: &'a Row, horizon: usize, at: DateTime<Utc>) -> Tick<'a> {
        Tick {
            row,
            state: CursorState { index: 3, total: 10 },
            horizon,
            at,
        }
    }

    #[test]
    fn triggers_matching_and_counts_the_rest() {
        let reg = Arc::new(ConditionRegistry::new());
        let hit = register(&reg, "Close", "100");
        let miss = register(&reg, "Close", "1000");
        let absent = register(&reg, "Volume", "1");
        let eval = ConditionEvaluator::new(Arc::clone(&reg));

        let row = Row::from_pairs([("Close", "150")]);
        let at = Utc::now();
        let summary = eval.evaluate(&tick(&row, eval.horizon(), at));

        assert_eq!(summary.evaluated, 3);
        assert_eq!(summary.triggered, vec![hit]);
        assert_eq!(summary.missing_field, 1);

        let fired = reg.get(&hit).unwrap();
        assert_eq!(fired.status, ConditionStatus::Triggered);
        assert_eq!(fired.matched_row_index, Some(3));
        assert_eq!(reg.get(&miss).unwrap().status, ConditionStatus::Pending);
        assert_eq!(reg.get(&absent).unwrap().last_checked_time, at);
    }

    #[test]
    fn conditions_past_horizon_are_skipped() {
        let reg = Arc::new(ConditionRegistry::new());
        let eval = ConditionEvaluator::new(Arc::clone(&reg));
        let horizon = eval.horizon();
        let late = register(&reg, "Close", "100");

        let row = Row::from_pairs([("Close", "150")]);
        let summary = eval.evaluate(&tick(&row, horizon, Utc::now()));
        assert_eq!(summary.evaluated, 0);
        assert_eq!(reg.get(&late).unwrap().status, ConditionStatus::Pending);
    }

    #[test]
    fn triggered_conditions_are_not_reevaluated() {
        let reg = Arc::new(ConditionRegistry::new());
        let id = register(&reg, "Close", "100");
        let eval = ConditionEvaluator::new(Arc::clone(&reg));
        let row = Row::from_pairs([("Close", "150")]);

        eval.evaluate(&tick(&row, eval.horizon(), Utc::now()));
        let first = reg.get(&id).unwrap();
        let summary = eval.evaluate(&tick(&row, eval.horizon(), Utc::now()));

        assert_eq!(summary.evaluated, 0);
        assert_eq!(reg.get(&id).unwrap(), first);
    }
}

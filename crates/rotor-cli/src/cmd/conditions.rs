use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use rotor_core::condition::{Condition, ConditionStatus};
use rotor_core::config::Config;
use rotor_core::snapshot::SnapshotStore;

/// List persisted conditions, oldest command first.
pub fn run(config: &Config, status: Option<ConditionStatus>, json: bool) -> anyhow::Result<()> {
    let store = SnapshotStore::new(&config.state_path);
    let snapshot = store
        .load()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    let mut conditions: Vec<Condition> = snapshot.map(|s| s.conditions).unwrap_or_default();
    conditions.sort_by_key(|c| c.command_time);
    if let Some(status) = status {
        conditions.retain(|c| c.status == status);
    }

    if json {
        return print_json(&conditions);
    }

    if conditions.is_empty() {
        println!("No conditions.");
        return Ok(());
    }

    let rows = conditions
        .iter()
        .map(|c| {
            vec![
                c.id.to_string()[..8].to_string(),
                c.status.to_string(),
                c.spec.as_ref().map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                c.matched_row_index
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "-".into()),
                c.command_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                truncate(&c.message, 48),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "SPEC", "ROW", "COMMANDED", "MESSAGE"], rows);
    Ok(())
}

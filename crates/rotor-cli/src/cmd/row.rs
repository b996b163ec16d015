use crate::output::{print_json, print_table};
use anyhow::Context;
use rotor_core::config::Config;
use rotor_core::dataset::Dataset;
use rotor_core::snapshot::SnapshotStore;
use rotor_core::Rotor;

/// Print the row the cursor currently points at, as restored from the
/// snapshot. Nothing is written.
pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let rotor = open(config)?;
    let current = rotor.current();

    if json {
        return print_json(&current);
    }

    println!(
        "index {} of {} ({})",
        current.index,
        current.total,
        rotor.dataset().source().display()
    );
    let rows = current
        .row
        .iter()
        .map(|(column, value)| vec![column.to_string(), value.to_string()])
        .collect();
    print_table(&["COLUMN", "VALUE"], rows);
    Ok(())
}

pub(crate) fn open(config: &Config) -> anyhow::Result<Rotor> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let path = config.resolve_dataset_path(&cwd)?;
    let dataset =
        Dataset::load(&path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(Rotor::open(dataset, SnapshotStore::new(&config.state_path)))
}

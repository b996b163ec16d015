use crate::output::print_json;
use rotor_core::config::{Config, WarnLevel};

/// Show the effective configuration and validate it.
pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();
    let mut shown = config.clone();
    if shown.gemini.api_key.is_some() {
        shown.gemini.api_key = Some("********".to_string());
    }

    if json {
        let value = serde_json::json!({
            "config": shown,
            "warnings": warnings,
        });
        print_json(&value)?;
    } else {
        print!("{}", shown.to_yaml()?);
        if warnings.is_empty() {
            println!("\nConfig is valid. No warnings.");
        } else {
            println!();
            for w in &warnings {
                let prefix = match w.level {
                    WarnLevel::Warning => "warning",
                    WarnLevel::Error => "error",
                };
                println!("[{prefix}] {}", w.message);
            }
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

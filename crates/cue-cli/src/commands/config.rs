use crate::cli::ConfigAction;
use cue_core::{Settings, SettingsStore, SETTING_KEYS};

/// Show or change settings in `store`.
pub fn run(store: &SettingsStore, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let mut settings = store.load();
            if !settings.api_key.is_empty() {
                settings.api_key = mask(&settings.api_key);
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigAction::Set { key, value } => {
            if !SETTING_KEYS.contains(&key.as_str()) {
                anyhow::bail!("Unknown setting: {key}. Available: {}", SETTING_KEYS.join(", "));
            }
            let mut settings: Settings = store.load();
            if settings.set(&key, &value) {
                store.save(&settings)?;
                println!("Saved {key}.");
            } else {
                eprintln!("Ignored invalid value for {key}; keeping the previous one.");
            }
        }
        ConfigAction::Path => println!("{}", store.path().display()),
    }
    Ok(())
}

fn mask(key: &str) -> String {
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("…{tail}")
}

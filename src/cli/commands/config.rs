//! Configuration inspection commands.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::{Result, VeilederError};

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: &Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(settings)
                .map_err(|e| VeilederError::Config(e.to_string()))?;
            println!("{}", rendered);
        }
        ConfigAction::Path => {
            Output::kv(
                "config path",
                &Settings::default_config_path().display().to_string(),
            );
        }
    }
    Ok(())
}

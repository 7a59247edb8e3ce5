//! Diagnostics for configuration and data files.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::retriever::{CollectionRecord, ContentCategory};

/// Run the doctor command.
pub fn run_doctor(settings: &Settings) -> Result<()> {
    Output::header("Credentials");
    match preflight::check_api_key() {
        Ok(()) => Output::success("OPENAI_API_KEY is set"),
        Err(e) => Output::error(&format!("{}", e)),
    }

    Output::header("Configuration");
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::kv("config", &config_path.display().to_string());
    } else {
        Output::kv(
            "config",
            &format!("{} (not found, using defaults)", config_path.display()),
        );
    }
    Output::kv("chat model", &settings.agent.model);
    Output::kv("embedding model", &settings.embedding.model);
    Output::kv(
        "retrieval",
        &format!(
            "k={}, threshold={}, fetch_k={}",
            settings.retrieval.k, settings.retrieval.score_threshold, settings.retrieval.fetch_k
        ),
    );

    Output::header("Collections");
    let collections_dir = settings.collections_dir();
    let mut missing = 0;
    for category in ContentCategory::all() {
        let path = collections_dir.join(category.collection_file());
        if path.exists() {
            match std::fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<Vec<CollectionRecord>>(&content).ok())
            {
                Some(records) => Output::success(&format!(
                    "{} ({} records)",
                    category.tool_name(),
                    records.len()
                )),
                None => {
                    Output::error(&format!("{} (unreadable)", category.tool_name()));
                    missing += 1;
                }
            }
        } else {
            Output::error(&format!(
                "{} (missing: {})",
                category.tool_name(),
                path.display()
            ));
            missing += 1;
        }
    }

    if missing > 0 {
        Output::warning(&format!(
            "{} collection(s) unavailable; chat will fail until they exist",
            missing
        ));
    } else {
        Output::success("All collections present");
    }

    Ok(())
}

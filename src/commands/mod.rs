use crate::errors::AppError;
use crate::file_processing::writer;
use crate::utils::config::{read_config, validate_config, write_config};
use std::path::Path;

/// Handles the rollback subcommand
pub async fn handle_rollback_subcommand(workspace_root: &Path) -> Result<(), AppError> {
    let summary = writer::rollback_last_run(workspace_root).await?;
    for path in &summary.deleted {
        println!("Deleted new file: {}", path.display());
    }
    for path in &summary.restored {
        println!("Restored: {}", path.display());
    }
    Ok(())
}

/// Handles the config subcommand
pub async fn handle_config_subcommand(
    set_log_level: Option<String>,
    set_language: Option<String>,
    set_backup: Option<bool>,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(log_level) = set_log_level {
        config.log_level = log_level.clone();
        println!("Log level set to {}", log_level);
    }

    if let Some(language) = set_language {
        config.language = language.clone();
        println!("Language set to {}", language);
    }

    if let Some(backup) = set_backup {
        config.backup_before_overwrite = backup;
        println!("Backup before overwrite set to {}", backup);
    }

    validate_config(&config)?;
    write_config(&config)?;
    Ok(())
}

/// Handles the model-config subcommand
pub async fn handle_model_config_subcommand(
    set_api_key: Option<String>,
    set_remote_model: Option<String>,
    set_local_model: Option<String>,
    use_local: bool,
    use_remote: bool,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(api_key) = set_api_key {
        config.api_key = Some(api_key);
        println!("API key set");
    }

    if let Some(remote_model) = set_remote_model {
        config.remote_model = remote_model.clone();
        println!("Remote model set to: {}", remote_model);
    }

    if let Some(local_model) = set_local_model {
        config.local_model = local_model.clone();
        println!("Local model set to: {}", local_model);
    }

    if use_local {
        config.use_remote = false;
        println!("Using the local model");
    } else if use_remote {
        config.use_remote = true;
        println!("Using the remote model");
    }

    validate_config(&config)?;
    write_config(&config)?;
    Ok(())
}

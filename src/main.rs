use clap::Parser;
use codemind::api::{backend_from_config, ChatBackend};
use codemind::cli::args::{Args, Commands};
use codemind::cli::display::CliDisplayManager;
use codemind::commands;
use codemind::errors::AppError;
use codemind::file_processing::path_resolver::normalize_path;
use codemind::file_processing::{reader, writer, ResolutionContext};
use codemind::models::{ChatRequest, FileSet, ParsedResponse};
use codemind::session::ChatSession;
use codemind::utils::config::{read_config, Config};
use codemind::utils::logger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// The main entry point of the application
#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let start_time = Instant::now();

    if let Some(command) = args.command.clone() {
        return handle_subcommands(command).await;
    }

    // Ensure a query is provided
    let query = args.query.clone().ok_or(AppError::MissingPrompt)?;

    let mut config = read_config()?;
    if args.local {
        config.use_remote = false;
    }
    logger::setup_logger(&config);

    let mut display_manager = CliDisplayManager::new();
    let backend: Arc<dyn ChatBackend> = Arc::from(backend_from_config(&config.backend_config())?);
    display_manager.print_header(&backend.describe());

    let workspace_root = absolute_path(args.workspace.as_deref().unwrap_or("."))?;
    let current_file = args.file.as_deref().map(absolute_path).transpose()?;

    let primary_context = match &current_file {
        Some(path) if path.is_file() => reader::read_text_file(path).await?,
        Some(path) => {
            log::warn!("File not found: {}", path.display());
            String::new()
        }
        None => String::new(),
    };

    let context_files = reader::collect_context_files(&args.context, &args.ignore)
        .iter()
        .map(|path| absolute_path(&path.to_string_lossy()))
        .collect::<Result<Vec<_>, _>>()?;
    let auxiliary_files = reader::read_context_files(&context_files).await?;

    let current_file_label = current_file.as_ref().map(|p| p.display().to_string());
    display_manager.print_context(current_file_label.as_deref(), context_files.len());

    let mut resolution = ResolutionContext::new(&workspace_root).with_context_files(context_files);
    if let Some(path) = &current_file {
        resolution = resolution.with_current_file(path);
    }
    let mut session = ChatSession::new(resolution, config.language.clone())
        .backup_before_overwrite(config.backup_before_overwrite);

    display_manager.print_query_start();
    display_manager.start_spinner();

    let request = ChatRequest::new(query, primary_context, auxiliary_files);
    let handle = session.send_request(Arc::clone(&backend), &request);
    let request_id = handle.id;
    let result = handle.wait().await;

    display_manager.stop_spinner();
    session.complete(request_id);

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            display_manager.print_error(&e.to_string());
            return Err(e.into());
        }
    };

    match response {
        ParsedResponse::PlainMessage { text } => display_manager.print_message(&text),
        ParsedResponse::CodeSuggestion { code, explanation } => {
            handle_code_suggestion(
                &display_manager,
                &config,
                &args,
                current_file.as_deref(),
                &request.primary_context,
                &code,
                &explanation,
                &workspace_root,
            )
            .await?;
        }
        ParsedResponse::MultiFileChange { explanation, files } => {
            handle_file_changes(
                &display_manager,
                &mut session,
                &args,
                &explanation,
                &files,
                &workspace_root,
            )
            .await?;
        }
    }

    display_manager.print_footer(start_time.elapsed());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_code_suggestion(
    display_manager: &CliDisplayManager,
    config: &Config,
    args: &Args,
    current_file: Option<&Path>,
    buffer: &str,
    code: &str,
    explanation: &str,
    workspace_root: &Path,
) -> Result<(), AppError> {
    if !explanation.is_empty() {
        display_manager.print_message(explanation);
    }
    display_manager.print_code(code);

    if !args.apply {
        display_manager.print_hint("Re-run with --apply to write this code to the open file");
        return Ok(());
    }

    let Some(path) = current_file else {
        display_manager.print_hint("No open file; pass --file to apply the suggestion");
        return Ok(());
    };

    match writer::apply_code_suggestion(path, buffer, code, config.backup_before_overwrite).await
    {
        Ok(record) => {
            writer::save_rollback_record(workspace_root, &record).await?;
            display_manager.print_applied(&path.display().to_string());
        }
        Err(e) => {
            log::error!("{}", e);
            display_manager.print_apply_error(&path.display().to_string(), &e.to_string());
        }
    }
    Ok(())
}

async fn handle_file_changes(
    display_manager: &CliDisplayManager,
    session: &mut ChatSession,
    args: &Args,
    explanation: &str,
    files: &FileSet,
    workspace_root: &Path,
) -> Result<(), AppError> {
    if !explanation.is_empty() {
        display_manager.print_message(explanation);
    }

    let applier = session.accept_changes(files);
    display_manager.print_file_list(applier);
    let filenames: Vec<String> = applier.filenames().map(str::to_string).collect();

    if args.preview {
        for filename in &filenames {
            if let Some(preview) = applier.preview(filename) {
                display_manager.print_preview(filename, &preview);
            }
        }
    }

    if !args.apply {
        display_manager.print_hint("Re-run with --apply to write these changes");
        session.finish_changes();
        return Ok(());
    }

    let (succeeded, total) = applier.apply_all();
    for filename in &filenames {
        match applier.get(filename) {
            Some(change) if change.applied => display_manager.print_applied(filename),
            Some(change) => display_manager.print_apply_error(
                filename,
                change.last_error.as_deref().unwrap_or("unknown error"),
            ),
            None => {}
        }
    }
    display_manager.print_apply_summary(succeeded, total);

    if applier.take_editor_refresh().is_some() {
        display_manager.print_hint("The open file was rewritten; reload it in your editor");
    }

    let record = applier.rollback_record();
    session.finish_changes();
    writer::save_rollback_record(workspace_root, &record).await
}

async fn handle_subcommands(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Rollback { workspace } => {
            let workspace_root = absolute_path(workspace.as_deref().unwrap_or("."))?;
            commands::handle_rollback_subcommand(&workspace_root).await
        }
        Commands::Config {
            set_log_level,
            set_language,
            set_backup,
        } => commands::handle_config_subcommand(set_log_level, set_language, set_backup).await,
        Commands::ModelConfig {
            set_api_key,
            set_remote_model,
            set_local_model,
            use_local,
            use_remote,
        } => {
            commands::handle_model_config_subcommand(
                set_api_key,
                set_remote_model,
                set_local_model,
                use_local,
                use_remote,
            )
            .await
        }
    }
}

fn absolute_path(path: &str) -> Result<PathBuf, AppError> {
    let path = Path::new(path);
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        Ok(normalize_path(&std::env::current_dir()?.join(path)))
    }
}

mod api;
mod artifacts;
mod cli;
mod commands;
mod deploy;
mod errors;
mod models;
mod pipeline;
mod stages;
#[cfg(test)]
mod testing;
mod utils;

use crate::utils::logger;
use api::OpenAiApi;
use artifacts::ArtifactStore;
use clap::Parser;
use cli::args::{Args, Commands};
use cli::display::CliDisplayManager;
use deploy::VercelCli;
use errors::AppError;
use pipeline::{parse_placement_hints, NoopObserver, Pipeline, UserRequest};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use utils::config::read_config;

/// The main entry point of the application
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let json_output = args.json;

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            if json_output {
                println!("{}", json!({ "error": e.to_string() }));
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, AppError> {
    if let Some(command) = args.command {
        handle_subcommand(command).await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Ensure prompt is provided
    let description = args
        .prompt
        .filter(|prompt| !prompt.trim().is_empty())
        .ok_or(AppError::MissingPrompt)?;

    // Read config.toml
    let config = read_config()?;
    logger::setup_logger(&config);

    let api_key = config.resolve_api_key().ok_or(AppError::MissingApiKey)?;
    let llm = OpenAiApi::new(
        api_key,
        config.base_url.as_str(),
        config.model.as_str(),
        config.request_timeout(),
    )?;

    let favicon = Some(PathBuf::from(&config.favicon_path)).filter(|p| !p.as_os_str().is_empty());
    let store = ArtifactStore::new(&config.output_directory, favicon);
    let runner = VercelCli::new(&config.deploy_command, config.deploy_timeout());

    let request = UserRequest {
        description,
        images: args.images,
        image_hints: parse_placement_hints(args.image_prompts.as_deref().unwrap_or_default()),
        project_name: args.name,
    };
    log::info!(
        "Starting run with {} image(s) into {}",
        request.images.len(),
        store.root().display()
    );
    let pipeline = Pipeline::new(Arc::new(llm), store, Arc::new(runner));

    if args.json {
        let outcome = pipeline.run(&request, &mut NoopObserver).await;
        let (payload, code) = match &outcome {
            Ok(success) => (serde_json::to_string_pretty(success)?, ExitCode::SUCCESS),
            Err(failure) => (serde_json::to_string_pretty(failure)?, ExitCode::FAILURE),
        };
        println!("{}", payload);
        return Ok(code);
    }

    let start_time = Instant::now();
    let mut display_manager = CliDisplayManager::new();
    display_manager.print_header();

    match pipeline.run(&request, &mut display_manager).await {
        Ok(success) => {
            display_manager.print_success(&success);
            display_manager.print_footer(&success, start_time.elapsed());
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            display_manager.print_failure(&failure);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn handle_subcommand(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Config {
            set_log_level,
            set_output_directory,
            set_favicon_path,
            set_deploy_command,
            set_deploy_timeout,
        } => {
            commands::handle_config_subcommand(
                set_log_level,
                set_output_directory,
                set_favicon_path,
                set_deploy_command,
                set_deploy_timeout,
            )
            .await
        }
        Commands::ModelConfig {
            set_api_key,
            set_base_url,
            set_model,
            set_request_timeout,
        } => {
            commands::handle_model_config_subcommand(
                set_api_key,
                set_base_url,
                set_model,
                set_request_timeout,
            )
            .await
        }
        Commands::Doctor => commands::handle_doctor_subcommand().await,
    }
}

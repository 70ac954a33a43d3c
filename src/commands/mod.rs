use crate::cli::display::CliDisplayManager;
use crate::deploy::runner::tool_version;
use crate::errors::AppError;
use crate::utils::config::{read_config, validate_config, write_config, Config};

/// Handles the config subcommand
pub async fn handle_config_subcommand(
    set_log_level: Option<String>,
    set_output_directory: Option<String>,
    set_favicon_path: Option<String>,
    set_deploy_command: Option<String>,
    set_deploy_timeout: Option<u64>,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(log_level) = set_log_level {
        println!("Log level set to {}", log_level);
        config.log_level = log_level;
    }

    if let Some(output_directory) = set_output_directory {
        println!("Output directory set to {}", output_directory);
        config.output_directory = output_directory;
    }

    if let Some(favicon_path) = set_favicon_path {
        println!("Favicon set to {}", favicon_path);
        config.favicon_path = favicon_path;
    }

    if let Some(deploy_command) = set_deploy_command {
        println!("Deploy command set to {}", deploy_command);
        config.deploy_command = deploy_command;
    }

    if let Some(timeout) = set_deploy_timeout {
        println!("Deploy timeout set to {}s", timeout);
        config.deploy_timeout_secs = timeout;
    }

    save(&config)
}

/// Handles the model-config subcommand
pub async fn handle_model_config_subcommand(
    set_api_key: Option<String>,
    set_base_url: Option<String>,
    set_model: Option<String>,
    set_request_timeout: Option<u64>,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(api_key) = set_api_key {
        config.api_key = Some(api_key);
        println!("API key set");
    }

    if let Some(base_url) = set_base_url {
        println!("Base URL set to {}", base_url);
        config.base_url = base_url;
    }

    if let Some(model) = set_model {
        println!("Model set to {}", model);
        config.model = model;
    }

    if let Some(timeout) = set_request_timeout {
        println!("Request timeout set to {}s", timeout);
        config.request_timeout_secs = timeout;
    }

    save(&config)
}

/// Handles the doctor subcommand: reports which deployment tools are installed.
pub async fn handle_doctor_subcommand() -> Result<(), AppError> {
    let config = read_config()?;
    let display = CliDisplayManager::new();
    display.print_section("🩺", "Checking deployment toolchain", "");

    for tool in ["node", "npm"] {
        let version = tool_version(tool).await;
        display.print_tool_check(tool, version.as_deref());
    }

    let deploy_version = tool_version(&config.deploy_command).await;
    display.print_tool_check(&config.deploy_command, deploy_version.as_deref());
    match deploy_version {
        Some(_) => display.print_hint("Make sure you are logged in: run 'vercel login'"),
        None => display.print_hint("Install the deployment tool: run 'npm i -g vercel'"),
    }
    Ok(())
}

fn save(config: &Config) -> Result<(), AppError> {
    validate_config(config)?;
    write_config(config)
}

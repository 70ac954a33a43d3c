use clap::{Parser, Subcommand};

/// CLI arguments for the webpress application.
#[derive(Parser, Debug, PartialEq, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Description of the website to build.
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Local image to place on the site. Repeat for several images.
    #[arg(short, long = "image")]
    pub images: Vec<String>,

    /// Where each image should go, comma-separated and in image order.
    #[arg(long)]
    pub image_prompts: Option<String>,

    /// Project name to deploy under.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for the webpress application.
#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum Commands {
    /// Manage configuration options.
    Config {
        /// Set the log level (trace, debug, info, warn, error, off).
        #[arg(long)]
        set_log_level: Option<String>,

        /// Set the directory generated websites are written to.
        #[arg(long)]
        set_output_directory: Option<String>,

        /// Set the favicon copied into every site.
        #[arg(long)]
        set_favicon_path: Option<String>,

        /// Set the deployment tool to invoke.
        #[arg(long)]
        set_deploy_command: Option<String>,

        /// Set the deployment timeout in seconds.
        #[arg(long)]
        set_deploy_timeout: Option<u64>,
    },

    /// Manage model configuration options.
    ModelConfig {
        /// Set the API key for the chat-completions service.
        #[arg(long)]
        set_api_key: Option<String>,

        /// Set the base URL of the chat-completions service.
        #[arg(long)]
        set_base_url: Option<String>,

        /// Set the model name.
        #[arg(long)]
        set_model: Option<String>,

        /// Set the request timeout in seconds.
        #[arg(long)]
        set_request_timeout: Option<u64>,
    },

    /// Check that the deployment toolchain is installed.
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_repeat_and_hints_stay_one_string() {
        let args = Args::parse_from([
            "webpress",
            "--prompt",
            "A portfolio",
            "--image",
            "a.png",
            "--image",
            "b.png",
            "--image-prompts",
            "Hero, Footer",
            "--json",
        ]);
        assert_eq!(args.prompt.as_deref(), Some("A portfolio"));
        assert_eq!(args.images, vec!["a.png", "b.png"]);
        assert_eq!(args.image_prompts.as_deref(), Some("Hero, Footer"));
        assert!(args.json);
        assert_eq!(args.command, None);
    }

    #[test]
    fn subcommands_parse() {
        let args = Args::parse_from(["webpress", "model-config", "--set-model", "gpt-4o-mini"]);
        assert_eq!(
            args.command,
            Some(Commands::ModelConfig {
                set_api_key: None,
                set_base_url: None,
                set_model: Some("gpt-4o-mini".to_string()),
                set_request_timeout: None,
            })
        );
        let args = Args::parse_from(["webpress", "doctor"]);
        assert_eq!(args.command, Some(Commands::Doctor));
    }
}

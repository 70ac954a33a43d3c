use crate::errors::StageError;
use crate::pipeline::{PipelineFailure, PipelineObserver, PipelineSuccess, Stage};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const STAGE_COUNT: usize = 5;

/// Manages CLI display and output formatting.
#[derive(Default)]
pub struct CliDisplayManager {
    spinner: Option<ProgressBar>,
}

impl CliDisplayManager {
    /// Creates a new `CliDisplayManager`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints the application header.
    pub fn print_header(&self) {
        let title = format!("│  🌐 webpress v{:<7}│", env!("CARGO_PKG_VERSION"));
        println!("\n{}", "╭──────────────────────╮".bright_magenta());
        println!("{}", title.bright_magenta().bold());
        println!("{}\n", "╰──────────────────────╯".bright_magenta());
    }

    pub fn print_success(&self, success: &PipelineSuccess) {
        println!();
        println!("{} {}", "✅".bright_green(), success.message.bright_green().bold());
        self.print_field("URL", &success.deployment_url);
        self.print_field("Project", &success.project_name);
        self.print_field("Folder", &success.local_folder.display().to_string());
        if let Some(raw) = &success.raw_output {
            self.print_field("Tool output", raw.trim());
        }
    }

    pub fn print_failure(&self, failure: &PipelineFailure) {
        println!();
        println!(
            "{} {}",
            "❌".bright_red(),
            failure.error.to_string().bright_red().bold()
        );
        if let Some(folder) = &failure.local_folder {
            self.print_field("Files kept in", &folder.display().to_string());
        }
    }

    /// Prints the application footer.
    pub fn print_footer(&self, success: &PipelineSuccess, duration: Duration) {
        println!();
        println!(
            "{}",
            format!("⚡ Fixed {} file(s) during validation", success.validation.fixed_files.len())
                .bright_white()
                .dimmed(),
        );
        for change in &success.validation.changes {
            println!(
                "{}",
                format!(
                    "   {} +{} -{}",
                    change.file_name, change.lines_added, change.lines_removed
                )
                .bright_white()
                .dimmed(),
            );
        }
        println!(
            "{}",
            format!("⚡ Completed in {:.2?}", duration)
                .bright_white()
                .dimmed(),
        );
        println!();
    }

    /// Prints one line of the doctor report.
    pub fn print_tool_check(&self, tool: &str, version: Option<&str>) {
        match version {
            Some(version) => println!(
                "   {} {} {}",
                "✔".bright_green(),
                tool.bright_white().bold(),
                version.dimmed()
            ),
            None => println!(
                "   {} {} {}",
                "✘".bright_red(),
                tool.bright_white().bold(),
                "not found".bright_red()
            ),
        }
    }

    pub fn print_hint(&self, hint: &str) {
        self.print_info(hint);
    }

    /// Helper function to print a section header.
    pub fn print_section(&self, icon: &str, title: &str, description: &str) {
        println!("{} {}", icon.bright_yellow(), title.bright_cyan().bold());
        if !description.is_empty() {
            self.print_info(description);
        }
    }

    /// Starts a spinner for ongoing operations.
    fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let template = format!(
            "   {} {{spinner}} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
        if let Ok(style) = ProgressStyle::with_template(&template) {
            spinner.set_style(style.tick_strings(&TICKS));
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Stops the spinner.
    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print_field(&self, label: &str, value: &str) {
        println!("   {} {}", format!("{}:", label).bright_white().bold(), value);
    }

    /// Helper function to print an informational message.
    fn print_info(&self, message: &str) {
        println!(
            "   {} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
    }
}

fn stage_icon(stage: Stage) -> &'static str {
    match stage {
        Stage::Interpret => "📝",
        Stage::Generate => "⚙",
        Stage::Persist => "💾",
        Stage::Validate => "🔍",
        Stage::Deploy => "🚀",
    }
}

fn stage_number(stage: Stage) -> usize {
    match stage {
        Stage::Interpret => 1,
        Stage::Generate => 2,
        Stage::Persist => 3,
        Stage::Validate => 4,
        Stage::Deploy => 5,
    }
}

impl PipelineObserver for CliDisplayManager {
    fn stage_started(&mut self, stage: Stage) {
        self.print_section(
            stage_icon(stage),
            &format!(
                "[{}/{}] {:>3.0}% {}",
                stage_number(stage),
                STAGE_COUNT,
                stage.progress() * 100.0,
                stage.description()
            ),
            "",
        );
        self.start_spinner("Working");
    }

    fn stage_finished(&mut self, _stage: Stage) {
        self.stop_spinner();
        self.print_info("Done");
    }

    fn stage_failed(&mut self, _stage: Stage, _error: &StageError) {
        self.stop_spinner();
    }

    fn completed(&mut self, _success: &PipelineSuccess) {
        self.print_section("🎉", "[5/5] 100% Website deployed!", "");
    }
}

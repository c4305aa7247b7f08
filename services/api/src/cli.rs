use crate::report::{run_score, run_template_validate, ScoreArgs, TemplateValidateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use perf_review::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Performance Review Engine",
    about = "Score, gate, and serve employee performance reviews from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with review templates
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
    /// Print the scoring summary and permissions for a review JSON document
    Score(ScoreArgs),
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// Check a CSV criteria definition against the template rules
    Validate(TemplateValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Template {
            command: TemplateCommand::Validate(args),
        } => run_template_validate(args),
        Command::Score(args) => run_score(args),
    }
}

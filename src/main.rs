use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod core;
mod utils;

use cmd::curve::CurveCommand;
use cmd::report::HtmlCommand;
use cmd::schema::SchemaCommand;
use cmd::summary::SummaryCommand;
use cmd::validate::ValidateCommand;

#[derive(Parser, Debug)]
#[command(
    name = "nltax",
    version,
    about = "Estimate Dutch income tax: payroll tax, social security and tax credits"
)]
struct Cli {
    /// Rate document (JSON); the bundled rates are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate taxes, credits and net income for one income
    Summary(SummaryCommand),
    /// Show the curve of one tax concept
    Curve(CurveCommand),
    /// Write an HTML report with the results table and charts
    Html(HtmlCommand),
    /// Check a rate document
    Validate(ValidateCommand),
    /// Print the rate document and chart export formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Schema(command) => command.exec(),
        Command::Validate(command) => command.exec(config_path),
        Command::Summary(command) => command.exec(&cmd::load_config(config_path)?),
        Command::Curve(command) => command.exec(&cmd::load_config(config_path)?),
        Command::Html(command) => command.exec(&cmd::load_config(config_path)?),
    }
}

//! RPT CLI - analyse report results, run stored reports and manage their charts.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "rpt-cli",
    version,
    about = "Report analysis and charting toolkit"
)]
struct Cli {
    #[command(flatten)]
    globals: rpt_cmd::GlobalArgs,

    #[command(subcommand)]
    command: rpt_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[RPT Debug] cli: {:?}", cli.command);
    rpt_cmd::run(cli.globals, cli.command).await
}

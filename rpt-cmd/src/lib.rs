//! Command implementations for the RPT CLI.
//!
//! File commands (`profile`, `aggregate`, `export`) work on a saved result in
//! CSV or JSON. Report commands run against a backend: the SQLite store given
//! by `--db`, or the HTTP API given by `--api`.

use clap::Subcommand;
use rpt_core::api::ApiClient;
use rpt_core::ReportId;
use std::path::PathBuf;

pub mod analyze;
pub mod args;
pub mod charts;
pub mod report;

pub use args::GlobalArgs;
use args::{ChartArgs, FilterArgs, ParamArg};
use charts::ChartsCommand;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify the columns of a result file and suggest charts
    Profile {
        /// CSV or JSON result file
        input: PathBuf,
    },

    /// Filter, sort and aggregate a result file into chart data
    Aggregate {
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Write the filtered, sorted rows of a result file as ';'-delimited CSV
    Export {
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output path
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Load a CSV file into a SQLite table (replacing it)
    Load {
        table: String,
        csv: PathBuf,
    },

    /// Register a stored report query
    Register {
        name: String,

        /// SQL; named parameters (:name) are bound from --param at run time
        sql: String,

        /// JSON file with the report's filter definitions
        #[arg(long)]
        filters_json: Option<PathBuf>,
    },

    /// Manage and render a report's saved charts
    Charts {
        report: ReportId,

        #[command(subcommand)]
        command: ChartsCommand,
    },

    /// Execute a report and render its saved charts
    Run {
        report: ReportId,

        /// Report parameter, as name=value (value may be JSON)
        #[arg(short = 'p', long = "param")]
        params: Vec<ParamArg>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Include per-column numeric totals
        #[arg(long)]
        summary: bool,

        /// Also export the filtered rows to this path
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Execute a report on the API and save the raw rows as JSON
    Fetch {
        report: ReportId,

        #[arg(short = 'p', long = "param")]
        params: Vec<ParamArg>,

        /// Output path (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(globals: GlobalArgs, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Profile { input } => analyze::run_profile(&input).await,
        Command::Aggregate {
            input,
            filters,
            chart,
        } => analyze::run_aggregate(&input, &filters, &chart, globals.empty_extremum).await,
        Command::Export {
            input,
            filters,
            output,
        } => analyze::run_export(&input, &filters, &output).await,
        Command::Load { table, csv } => report::run_load(&globals, &table, &csv).await,
        Command::Register {
            name,
            sql,
            filters_json,
        } => report::run_register(&globals, &name, &sql, filters_json.as_deref()).await,
        Command::Charts { report, command } => match &globals.api {
            Some(url) => charts::run_charts(ApiClient::new(url)?, &globals, report, command).await,
            None => {
                let db = report::open_database(&globals)?;
                charts::run_charts(db, &globals, report, command).await
            }
        },
        Command::Run {
            report,
            params,
            filters,
            summary,
            export,
        } => match &globals.api {
            Some(url) => {
                let client = ApiClient::new(url)?;
                report::run_report(client, &globals, report, &params, &filters, summary, export.as_deref())
                    .await
            }
            None => {
                let db = report::open_database(&globals)?;
                report::run_report(db, &globals, report, &params, &filters, summary, export.as_deref())
                    .await
            }
        },
        Command::Fetch {
            report,
            params,
            output,
        } => report::run_fetch(&globals, report, &params, output.as_deref()).await,
    }
}

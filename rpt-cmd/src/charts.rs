//! Saved chart configurations of one report.

use crate::args::{report_params, ChartArgs, FilterArgs, GlobalArgs, ParamArg};
use anyhow::Context;
use clap::Subcommand;
use log::info;
use rpt_core::backend::{ChartConfigStore, ReportExecutor};
use rpt_core::{ConfigId, ReportId};
use rpt_session::{Capability, ReportSession};

#[derive(Subcommand, Debug, Clone)]
pub enum ChartsCommand {
    /// List saved charts
    List,

    /// Save a new chart
    Create {
        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Replace an existing chart; unset options keep their saved value
    Update {
        id: ConfigId,

        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Delete a chart
    Delete {
        id: ConfigId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Execute the report and render every saved chart
    Render {
        /// Report parameter, as name=value (value may be JSON)
        #[arg(short = 'p', long = "param")]
        params: Vec<ParamArg>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

pub async fn run_charts<B>(
    backend: B,
    globals: &GlobalArgs,
    report_id: ReportId,
    command: ChartsCommand,
) -> anyhow::Result<()>
where
    B: ReportExecutor + ChartConfigStore + Clone,
{
    let mut session = ReportSession::new(
        report_id,
        backend.clone(),
        backend,
        Capability::for_role(globals.role),
    );
    session.empty_extremum = globals.empty_extremum;
    session.reload_charts().await?;

    match command {
        ChartsCommand::List => {
            println!("{}", serde_json::to_string_pretty(session.charts())?);
        }
        ChartsCommand::Create { chart } => {
            chart.apply_to(&mut session.axes);
            let saved = session.save_chart().await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        ChartsCommand::Update { id, chart } => {
            session.begin_edit(id)?;
            chart.apply_to(&mut session.axes);
            let saved = session.save_chart().await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        ChartsCommand::Delete { id, yes } => {
            if !yes {
                anyhow::bail!("deleting chart {} needs --yes", id);
            }
            session.delete_chart(id).await?;
            println!("Deleted chart {}", id);
        }
        ChartsCommand::Render { params, filters } => {
            session.params = report_params(&params);
            session.filters = filters.filter_set();
            session.sort_state = filters.sort_state();
            session
                .execute()
                .await
                .with_context(|| format!("executing report {}", report_id))?;
            let rendered = session.render_all();
            info!(
                "Rendered {} charts over {} rows",
                rendered.len(),
                session.current_view().len()
            );
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_analysis::aggregate::EmptyExtremum;
    use rpt_core::Aggregation;
    use rpt_db::Database;
    use rpt_session::Role;

    fn globals(role: Role) -> GlobalArgs {
        GlobalArgs {
            db: None,
            api: None,
            role,
            empty_extremum: EmptyExtremum::Zero,
        }
    }

    fn seeded() -> (Database, ReportId) {
        let db = Database::new().unwrap();
        db.load_table("visits", "branch,visits\nMerkez,12\nKadıköy,7\nMerkez,3\n")
            .unwrap();
        let report = db.register_report("Visits", "SELECT * FROM visits").unwrap();
        (db, report)
    }

    fn chart(x: &str, y: &str) -> ChartArgs {
        ChartArgs {
            x_axis: Some(x.to_string()),
            y_axis: Some(y.to_string()),
            ..ChartArgs::default()
        }
    }

    #[tokio::test]
    async fn create_then_update_keeps_one_config() {
        let (db, report) = seeded();
        let g = globals(Role::Admin);
        run_charts(db.clone(), &g, report, ChartsCommand::Create { chart: chart("branch", "visits") })
            .await
            .unwrap();

        let created = db.query_chart_configs(report).unwrap();
        assert_eq!(created.len(), 1);
        assert!(created[0].name.starts_with("Chart "));

        let update = ChartArgs {
            aggregation: Some(Aggregation::Count),
            name: Some("Visit count".to_string()),
            ..ChartArgs::default()
        };
        run_charts(db.clone(), &g, report, ChartsCommand::Update { id: created[0].id, chart: update })
            .await
            .unwrap();

        let updated = db.query_chart_configs(report).unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].name, "Visit count");
        assert_eq!(updated[0].aggregation, Aggregation::Count);
        assert_eq!(updated[0].x_axis, "branch");
    }

    #[tokio::test]
    async fn update_can_clear_default() {
        let (db, report) = seeded();
        let g = globals(Role::Admin);
        let create = ChartArgs {
            is_default: true,
            ..chart("branch", "visits")
        };
        run_charts(db.clone(), &g, report, ChartsCommand::Create { chart: create })
            .await
            .unwrap();
        let id = db.query_chart_configs(report).unwrap()[0].id;
        assert!(db.query_chart_configs(report).unwrap()[0].is_default);

        let update = ChartArgs {
            no_default: true,
            ..ChartArgs::default()
        };
        run_charts(db.clone(), &g, report, ChartsCommand::Update { id, chart: update })
            .await
            .unwrap();
        assert!(!db.query_chart_configs(report).unwrap()[0].is_default);
    }

    #[tokio::test]
    async fn viewer_cannot_create() {
        let (db, report) = seeded();
        let result = run_charts(
            db.clone(),
            &globals(Role::Viewer),
            report,
            ChartsCommand::Create { chart: chart("branch", "visits") },
        )
        .await;
        assert!(result.is_err());
        assert!(db.query_chart_configs(report).unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let (db, report) = seeded();
        let g = globals(Role::Admin);
        run_charts(db.clone(), &g, report, ChartsCommand::Create { chart: chart("branch", "visits") })
            .await
            .unwrap();
        let id = db.query_chart_configs(report).unwrap()[0].id;

        let refused = run_charts(db.clone(), &g, report, ChartsCommand::Delete { id, yes: false }).await;
        assert!(refused.is_err());
        assert_eq!(db.query_chart_configs(report).unwrap().len(), 1);

        run_charts(db.clone(), &g, report, ChartsCommand::Delete { id, yes: true })
            .await
            .unwrap();
        assert!(db.query_chart_configs(report).unwrap().is_empty());
    }

    #[tokio::test]
    async fn viewer_can_render() {
        let (db, report) = seeded();
        run_charts(
            db.clone(),
            &globals(Role::Admin),
            report,
            ChartsCommand::Create { chart: chart("branch", "visits") },
        )
        .await
        .unwrap();
        let render = ChartsCommand::Render {
            params: Vec::new(),
            filters: FilterArgs::default(),
        };
        run_charts(db, &globals(Role::Viewer), report, render).await.unwrap();
    }
}

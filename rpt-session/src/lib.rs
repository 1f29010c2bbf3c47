//! Report-detail session state.
//!
//! A [`ReportSession`] owns one report's loaded result set along with its
//! filter, sort and chart editor state, and talks to the two backend
//! collaborators: a [`ReportExecutor`](rpt_core::backend::ReportExecutor) for
//! running the report and a [`ChartConfigStore`](rpt_core::backend::ChartConfigStore)
//! for its saved charts.
//!
//! The session's [`Capability`] is resolved once, from the user's [`Role`],
//! and checked by every chart mutation.
//!
//! # Usage
//!
//! ```rust
//! use rpt_db::Database;
//! use rpt_session::{Capability, ReportSession, Role};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let db = Database::new().unwrap();
//! db.load_table("visits", "branch,visits\nMerkez,12\nKadıköy,7\nMerkez,3\n").unwrap();
//! let report = db.register_report("Visits", "SELECT * FROM visits").unwrap();
//!
//! let mut session = ReportSession::new(report, db.clone(), db, Capability::for_role(Role::Admin));
//! session.execute().await.unwrap();
//! session.save_chart().await.unwrap();
//!
//! let charts = session.render_all();
//! assert_eq!(charts[0].data[0].label, "Merkez");
//! assert_eq!(charts[0].data[0].value, 15.0);
//! # });
//! ```

mod board;
pub mod capability;
pub mod editor;
pub mod error;
mod session;

pub use capability::{Capability, Role};
pub use editor::{AxisSelection, EditSession};
pub use error::SessionError;
pub use session::{ExecutionTicket, ReportSession};

//! Charts and the HTML dashboard for covtrack.
//!
//! [`figure`] turns dataset views into Plotly figure JSON, [`dashboard`]
//! assembles the sections of one page, and [`html`] renders it.

pub mod dashboard;
pub mod figure;
pub mod html;

pub use dashboard::{
    build_dashboard, Dashboard, DashboardRequest, Panel, Section, DASHBOARD_TITLE,
    DEFAULT_METRICS, KEY_INSIGHTS,
};
pub use figure::{
    choropleth, comparison_bar, time_series, vaccination_bar, vaccination_progress, Figure,
};
pub use html::{escape, format_count, render_html};

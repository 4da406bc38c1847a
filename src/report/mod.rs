pub mod html;

pub use html::{
    category_report_subject, digest_subject, escape_html, monthly_analysis_subject,
    render_category_calendar, render_digest, render_monthly_analysis, RenderContext,
};

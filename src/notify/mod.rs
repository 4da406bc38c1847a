//! Report delivery. Messages are composed here and handed to a [`Mailer`];
//! the bundled [`OutboxMailer`] leaves them on disk for an external relay.

pub mod outbox;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    core::services::{CategoryCalendarReport, Digest, SpendingBreakdown},
    domain::ReportSettings,
    errors::{Result, SpendError},
    recurrence::YearMonth,
    report::{self, RenderContext},
};

pub use outbox::OutboxMailer;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageReceipt {
    pub id: Uuid,
    pub accepted_at: DateTime<Utc>,
    /// Where the transport put the message, if it is file based.
    pub location: Option<String>,
}

pub trait Mailer {
    fn send(&self, message: &OutgoingMessage) -> Result<MessageReceipt>;
}

/// Builds report e-mails addressed from the configured sender to the
/// settings' recipient.
pub struct ReportComposer<'a> {
    config: &'a Config,
    settings: &'a ReportSettings,
}

impl<'a> ReportComposer<'a> {
    pub fn new(config: &'a Config, settings: &'a ReportSettings) -> Self {
        Self { config, settings }
    }

    fn recipient(&self) -> Result<&'a str> {
        self.settings
            .email
            .as_deref()
            .ok_or_else(|| SpendError::InvalidInput("no report e-mail address configured".into()))
    }

    /// Display name, else the local part of the address.
    fn context(&self, recipient: &str) -> RenderContext {
        let name = self
            .settings
            .display_name
            .clone()
            .unwrap_or_else(|| recipient.split('@').next().unwrap_or(recipient).to_string());
        RenderContext::new(self.config.currency_symbol.clone(), name)
            .with_app_url(self.config.app_url.clone())
    }

    fn message(&self, to: &str, subject: String, html: String) -> OutgoingMessage {
        OutgoingMessage {
            from: self.config.sender(),
            to: to.to_string(),
            subject,
            html,
        }
    }

    pub fn category_calendar(&self, report: &CategoryCalendarReport) -> Result<OutgoingMessage> {
        let to = self.recipient()?;
        let html = report::render_category_calendar(report, &self.context(to));
        let subject = report::category_report_subject(&report.category.name, report.month());
        Ok(self.message(to, subject, html))
    }

    pub fn monthly_analysis(
        &self,
        month: YearMonth,
        breakdown: &SpendingBreakdown,
    ) -> Result<OutgoingMessage> {
        let to = self.recipient()?;
        let html = report::render_monthly_analysis(month, breakdown, &self.context(to));
        Ok(self.message(to, report::monthly_analysis_subject(month), html))
    }

    pub fn digest(&self, digest: &Digest) -> Result<OutgoingMessage> {
        let to = self.recipient()?;
        let html = report::render_digest(digest, &self.context(to));
        Ok(self.message(to, report::digest_subject(digest.frequency), html))
    }
}

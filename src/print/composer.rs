//! Printable HTML for job-card tags and batch reports.
//!
//! Documents are fully self-contained: inline styles, images embedded
//! as the payloads the backend supplied. Every piece of text taken from
//! a job card is escaped before it lands in the markup.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::info;

use super::artifact::PrintArtifact;
use super::sink::{PrintError, PrintSink};
use crate::production::{JobCard, Priority, format_date};

/// A composed, print-ready document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub html: String,
}

const TAG_STYLE: &str = "\
body { font-family: Arial, Helvetica, sans-serif; margin: 24px; color: #111827; }
.header { display: flex; justify-content: space-between; align-items: center; border-bottom: 2px solid #111827; padding-bottom: 8px; }
.header h1 { font-size: 20px; margin: 0; }
.header h2 { font-size: 16px; margin: 4px 0 0; }
.badge { padding: 4px 10px; border-radius: 4px; color: #ffffff; font-weight: bold; font-size: 12px; }
.details { width: 100%; border-collapse: collapse; margin: 16px 0; }
.details th { text-align: left; width: 40%; padding: 6px; background: #f3f4f6; }
.details td { padding: 6px; }
.codes { display: flex; justify-content: space-around; align-items: center; margin-top: 16px; }
.code { text-align: center; }
.code img.qr { width: 160px; height: 160px; }
.code img.barcode { width: 260px; height: 80px; }
.caption { font-size: 12px; margin-top: 4px; }
@media print { body { margin: 0; } }
";

const REPORT_STYLE: &str = "\
body { font-family: Arial, Helvetica, sans-serif; margin: 24px; color: #111827; }
h1 { font-size: 20px; margin: 0; }
.filter { color: #4b5563; margin: 4px 0 16px; }
table { width: 100%; border-collapse: collapse; font-size: 12px; }
th, td { border: 1px solid #d1d5db; padding: 6px; text-align: left; }
th { background: #f3f4f6; }
.priority-normal { color: #4b5563; }
.priority-high { color: #ea580c; font-weight: bold; }
.priority-urgent { color: #dc2626; font-weight: bold; }
.footer { margin-top: 16px; display: flex; justify-content: space-between; font-size: 12px; }
@media print { body { margin: 0; } }
";

/// Builds printable documents under one organization's letterhead.
pub struct PrintComposer {
    organization: String,
}

impl PrintComposer {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    /// The tag that travels with the glass: header, details, QR and barcode.
    pub fn compose_job_card_document(&self, artifact: &PrintArtifact) -> Document {
        let number = escape(&artifact.job_card_number);
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>Job Card {number}</title>");
        let _ = writeln!(html, "<style>\n{TAG_STYLE}</style>\n</head>\n<body>");

        html.push_str("<div class=\"header\">\n<div>\n");
        let _ = writeln!(html, "<h1>{}</h1>", escape(&self.organization));
        let _ = writeln!(html, "<h2>Job Card: {number}</h2>");
        html.push_str("</div>\n");
        if let Some(badge) = priority_badge(artifact.priority) {
            html.push_str(&badge);
            html.push('\n');
        }
        html.push_str("</div>\n");

        html.push_str("<table class=\"details\">\n");
        for (label, value) in [
            ("Glass Type", escape(&artifact.glass_type)),
            ("Thickness", format!("{}mm", artifact.thickness)),
            (
                "Dimensions",
                escape(&format!("{}\" × {}\"", artifact.width, artifact.height)),
            ),
            ("Quantity", artifact.quantity.to_string()),
            ("Current Stage", artifact.current_stage.label().to_string()),
            ("Created", format_date(&artifact.created_at)),
        ] {
            let _ = writeln!(html, "<tr><th>{label}</th><td>{value}</td></tr>");
        }
        html.push_str("</table>\n");

        html.push_str("<div class=\"codes\">\n");
        let _ = writeln!(
            html,
            "<div class=\"code\"><img class=\"qr\" src=\"{}\" alt=\"QR code\"><div class=\"caption\">Scan to track</div></div>",
            escape(&artifact.qr_code_image)
        );
        let _ = writeln!(
            html,
            "<div class=\"code\"><img class=\"barcode\" src=\"{}\" alt=\"Barcode\"><div class=\"caption\">{number}</div></div>",
            escape(&artifact.barcode_image)
        );
        html.push_str("</div>\n</body>\n</html>\n");

        Document {
            title: format!("Job Card {}", artifact.job_card_number),
            html,
        }
    }

    pub fn compose_batch_report(&self, job_cards: &[JobCard], filter_label: &str) -> Document {
        self.compose_batch_report_at(job_cards, filter_label, Local::now())
    }

    /// Batch report with an explicit generation time.
    pub fn compose_batch_report_at(
        &self,
        job_cards: &[JobCard],
        filter_label: &str,
        generated_at: DateTime<Local>,
    ) -> Document {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Job Card Report</title>\n");
        let _ = writeln!(html, "<style>\n{REPORT_STYLE}</style>\n</head>\n<body>");
        let _ = writeln!(
            html,
            "<h1>{} - Job Card Report</h1>",
            escape(&self.organization)
        );
        let _ = writeln!(
            html,
            "<div class=\"filter\">Filter: {}</div>",
            escape(filter_label)
        );

        html.push_str("<table>\n<thead>\n<tr><th>Job Card #</th><th>Glass Type</th><th>Size</th><th>Qty</th><th>Stage</th><th>Priority</th><th>Created</th></tr>\n</thead>\n<tbody>\n");
        for card in job_cards {
            let _ = writeln!(
                html,
                "<tr class=\"job-row\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"priority-{}\">{}</td><td>{}</td></tr>",
                escape(&card.job_card_number),
                escape(&card.glass_type),
                escape(&card.size_label()),
                card.quantity,
                card.current_stage.as_str().to_uppercase(),
                card.priority.as_str(),
                card.priority.label(),
                format_date(&card.created_at),
            );
        }
        html.push_str("</tbody>\n</table>\n");

        let _ = writeln!(
            html,
            "<div class=\"footer\"><span>Total job cards: {}</span><span>Generated on {}</span></div>",
            job_cards.len(),
            generated_at.format("%d/%m/%Y %H:%M:%S")
        );
        html.push_str("</body>\n</html>\n");

        Document {
            title: format!("Job Card Report {filter_label}"),
            html,
        }
    }

    /// Composes a tag and hands it to `sink`.
    pub fn print_job_card(
        &self,
        artifact: &PrintArtifact,
        sink: &dyn PrintSink,
    ) -> Result<PathBuf, PrintError> {
        let document = self.compose_job_card_document(artifact);
        let location = sink.submit(&document)?;
        info!(job_card_number = %artifact.job_card_number, "job card tag sent to print");
        Ok(location)
    }

    /// Composes a batch report and hands it to `sink`.
    pub fn print_batch_report(
        &self,
        job_cards: &[JobCard],
        filter_label: &str,
        sink: &dyn PrintSink,
    ) -> Result<PathBuf, PrintError> {
        let document = self.compose_batch_report(job_cards, filter_label);
        let location = sink.submit(&document)?;
        info!(rows = job_cards.len(), "batch report sent to print");
        Ok(location)
    }
}

fn priority_badge(priority: Priority) -> Option<String> {
    let text = priority.badge()?;
    let color = match priority {
        Priority::Urgent => "#dc2626",
        Priority::High => "#ea580c",
        Priority::Normal => return None,
    };
    Some(format!(
        "<span class=\"badge badge-{}\" style=\"background: {color};\">{text}</span>",
        priority.as_str()
    ))
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::stage::Stage;
use crate::erp::types::positive_decimal;

/// Scheduling priority of a job card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Upper-case label used in tables and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    /// Badge text for printed tags. Normal priority carries no badge.
    pub fn badge(&self) -> Option<&'static str> {
        match self {
            Priority::Normal => None,
            Priority::High => Some("HIGH PRIORITY"),
            Priority::Urgent => Some("URGENT"),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority: {other:?}")),
        }
    }
}

/// A unit of production work as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
    pub id: i64,
    pub job_card_number: String,
    pub glass_type: String,
    /// Millimetres.
    #[serde(deserialize_with = "positive_decimal")]
    pub thickness: f64,
    /// Inches.
    #[serde(deserialize_with = "positive_decimal")]
    pub width: f64,
    /// Inches.
    #[serde(deserialize_with = "positive_decimal")]
    pub height: f64,
    pub quantity: u32,
    #[serde(default)]
    pub priority: Priority,
    pub current_stage: Stage,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_id: Option<i64>,
}

impl JobCard {
    pub fn size_label(&self) -> String {
        format_size(self.width, self.height, self.thickness)
    }

    pub fn created_label(&self) -> String {
        format_date(&self.created_at)
    }
}

/// Formats `width" × height" × thicknessmm`, e.g. `24" × 36" × 6mm`.
pub fn format_size(width: f64, height: f64, thickness: f64) -> String {
    format!("{width}\" × {height}\" × {thickness}mm")
}

/// Creation dates are shown as `dd/mm/yyyy` in the operator's local time,
/// on screen and on paper alike.
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y").to_string()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidJobCard {
    #[error("glass type is required")]
    MissingGlassType,

    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// Body of a job-card creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJobCard {
    pub glass_type: String,
    pub thickness: f64,
    pub width: f64,
    pub height: f64,
    pub quantity: u32,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

impl NewJobCard {
    /// Checks the fields the backend would otherwise reject.
    pub fn validate(&self) -> Result<(), InvalidJobCard> {
        if self.glass_type.trim().is_empty() {
            return Err(InvalidJobCard::MissingGlassType);
        }
        for (field, value) in [
            ("thickness", self.thickness),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(InvalidJobCard::NonPositive { field, value });
            }
        }
        if self.quantity == 0 {
            return Err(InvalidJobCard::ZeroQuantity);
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::erp::types::positive_decimal;
use crate::erp::{ErpError, ProductionApi};
use crate::production::{Priority, Stage, format_size};

/// Everything needed to print a job-card tag, as rendered by the backend
/// at request time.
///
/// The two images are opaque payloads (usually `data:image/png;base64,...`
/// URIs) that are only ever embedded, never decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintArtifact {
    pub job_card_number: String,
    pub glass_type: String,
    #[serde(deserialize_with = "positive_decimal")]
    pub thickness: f64,
    #[serde(deserialize_with = "positive_decimal")]
    pub width: f64,
    #[serde(deserialize_with = "positive_decimal")]
    pub height: f64,
    pub quantity: u32,
    #[serde(default)]
    pub priority: Priority,
    pub current_stage: Stage,
    pub created_at: DateTime<Utc>,
    pub qr_code_image: String,
    pub barcode_image: String,
}

impl PrintArtifact {
    pub fn size_label(&self) -> String {
        format_size(self.width, self.height, self.thickness)
    }
}

/// Retrieves print artifacts. Every call goes to the backend so the tag
/// always shows the card's stage at print time.
pub struct ArtifactFetcher<'a, A> {
    api: &'a A,
}

impl<'a, A: ProductionApi> ArtifactFetcher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn fetch_print_data(&self, job_card_number: &str) -> Result<PrintArtifact, ErpError> {
        let number = job_card_number.trim();
        if number.is_empty() {
            return Err(ErpError::NotFound("job card number is blank".into()));
        }

        debug!(job_card_number = number, "fetching print data");
        let artifact = self.api.get_print_data(number).await?;

        if artifact.job_card_number != number {
            return Err(ErpError::Malformed(format!(
                "asked for {number}, received print data for {}",
                artifact.job_card_number
            )));
        }
        if artifact.qr_code_image.trim().is_empty() || artifact.barcode_image.trim().is_empty() {
            return Err(ErpError::Malformed(format!(
                "print data for {number} is missing an image"
            )));
        }
        Ok(artifact)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::production::JobCard;

    pub fn artifact_for(card: &JobCard) -> PrintArtifact {
        PrintArtifact {
            job_card_number: card.job_card_number.clone(),
            glass_type: card.glass_type.clone(),
            thickness: card.thickness,
            width: card.width,
            height: card.height,
            quantity: card.quantity,
            priority: card.priority,
            current_stage: card.current_stage,
            created_at: card.created_at,
            qr_code_image: "data:image/png;base64,UVJDT0RF".into(),
            barcode_image: "data:image/png;base64,QkFSQ09ERQ==".into(),
        }
    }
}

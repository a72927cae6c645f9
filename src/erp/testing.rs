//! In-memory backend used by unit tests.

use std::sync::Mutex;
use std::time::Duration;

use super::client::ProductionApi;
use super::error::ErpError;
use crate::print::PrintArtifact;
use crate::production::{JobCard, NewJobCard, Stage};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Option<Stage>),
    Advance(i64, Stage),
    PrintData(String),
    Create(NewJobCard),
}

#[derive(Default)]
pub struct FakeProduction {
    pub cards: Mutex<Vec<JobCard>>,
    pub artifacts: Vec<PrintArtifact>,
    pub calls: Mutex<Vec<Call>>,
    /// Every call fails with a 503 while set.
    pub unavailable: bool,
    /// Only listings fail with a 503 while set.
    pub listing_unavailable: bool,
    /// Simulated round-trip time.
    pub latency: Option<Duration>,
}

impl FakeProduction {
    pub fn with_cards(cards: Vec<JobCard>) -> Self {
        Self {
            cards: Mutex::new(cards),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: Call) -> Result<(), ErpError> {
        self.calls.lock().unwrap().push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable {
            return Err(ErpError::Service {
                status: 503,
                message: "backend unavailable".into(),
            });
        }
        Ok(())
    }
}

impl ProductionApi for FakeProduction {
    async fn list_job_cards(&self, stage: Option<Stage>) -> Result<Vec<JobCard>, ErpError> {
        self.enter(Call::List(stage)).await?;
        if self.listing_unavailable {
            return Err(ErpError::Service {
                status: 503,
                message: "list down".into(),
            });
        }
        let cards = self.cards.lock().unwrap();
        Ok(cards
            .iter()
            .filter(|c| stage.is_none_or(|s| c.current_stage == s))
            .cloned()
            .collect())
    }

    async fn advance_job_card_stage(
        &self,
        job_card_id: i64,
        new_stage: Stage,
    ) -> Result<JobCard, ErpError> {
        self.enter(Call::Advance(job_card_id, new_stage)).await?;
        let mut cards = self.cards.lock().unwrap();
        let card = cards
            .iter_mut()
            .find(|c| c.id == job_card_id)
            .ok_or_else(|| ErpError::NotFound(format!("job card {job_card_id}")))?;
        card.current_stage = new_stage;
        Ok(card.clone())
    }

    async fn get_print_data(&self, job_card_number: &str) -> Result<PrintArtifact, ErpError> {
        self.enter(Call::PrintData(job_card_number.to_string()))
            .await?;
        self.artifacts
            .iter()
            .find(|a| a.job_card_number == job_card_number)
            .cloned()
            .ok_or_else(|| ErpError::NotFound("Job card not found".into()))
    }

    async fn create_job_card(&self, spec: &NewJobCard) -> Result<JobCard, ErpError> {
        self.enter(Call::Create(spec.clone())).await?;
        let mut cards = self.cards.lock().unwrap();
        let id = cards.len() as i64 + 1;
        let card = JobCard {
            id,
            job_card_number: format!("JC-2026-{id:04}"),
            glass_type: spec.glass_type.clone(),
            thickness: spec.thickness,
            width: spec.width,
            height: spec.height,
            quantity: spec.quantity,
            priority: spec.priority,
            current_stage: Stage::Pending,
            created_at: chrono::Utc::now(),
            order_id: spec.order_id,
        };
        cards.push(card.clone());
        Ok(card)
    }
}

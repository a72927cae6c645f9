use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use super::job_card::JobCard;
use super::stage::{Stage, next_stage};
use crate::erp::{ErpError, ProductionApi};

/// The result of asking the sequencer to move a job card forward.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The backend accepted the transition; this is the card it returned.
    Moved(JobCard),
    /// The card is already dispatched. Nothing was sent.
    Terminal,
    /// An advance for this card is still outstanding. Nothing was sent.
    InFlight,
}

/// Moves job cards one stage forward through the fixed pipeline.
///
/// The sequencer never mutates local state itself: callers only see the
/// card the backend confirmed. At most one request per job card is
/// outstanding at a time.
pub struct StageSequencer<'a, A> {
    api: &'a A,
    in_flight: Mutex<HashSet<i64>>,
}

impl<'a, A: ProductionApi> StageSequencer<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Requests the transition from `current` to its successor.
    ///
    /// - `dispatched` (terminal) returns [`Advance::Terminal`] without a call.
    /// - A card with a request already outstanding returns [`Advance::InFlight`].
    /// - Backend failures are returned as-is; no retry.
    pub async fn advance(&self, job_card_id: i64, current: Stage) -> Result<Advance, ErpError> {
        let Some(next) = next_stage(current) else {
            debug!(job_card_id, "job card already dispatched");
            return Ok(Advance::Terminal);
        };

        let Some(_claim) = self.claim(job_card_id) else {
            debug!(job_card_id, "stage change already in flight");
            return Ok(Advance::InFlight);
        };

        info!(job_card_id, from = %current, to = %next, "advancing job card");
        let card = self.api.advance_job_card_stage(job_card_id, next).await?;
        if card.current_stage != next {
            // The backend owns transition rules; take its answer.
            warn!(
                job_card_id,
                requested = %next,
                confirmed = %card.current_stage,
                "backend confirmed a different stage"
            );
        }
        Ok(Advance::Moved(card))
    }

    /// Whether an advance for `job_card_id` is outstanding.
    pub fn is_in_flight(&self, job_card_id: i64) -> bool {
        self.lock().contains(&job_card_id)
    }

    // The set guard must be gone before a claim exists: dropping a claim
    // locks the same mutex.
    fn claim(&self, job_card_id: i64) -> Option<InFlightClaim<'_>> {
        let inserted = self.lock().insert(job_card_id);
        inserted.then(|| InFlightClaim {
            set: &self.in_flight,
            job_card_id,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<i64>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// Releases the per-card slot when the request finishes, however it ends.
struct InFlightClaim<'s> {
    set: &'s Mutex<HashSet<i64>>,
    job_card_id: i64,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.job_card_id);
    }
}

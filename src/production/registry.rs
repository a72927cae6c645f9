use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::job_card::JobCard;
use super::stage::{STAGE_SEQUENCE, Stage, UnknownStage};
use crate::erp::{ErpError, ProductionApi};

/// Which job cards the registry shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StageFilter {
    #[default]
    All,
    Only(Stage),
}

impl StageFilter {
    /// The server-side filter for the listing call.
    pub fn as_query(&self) -> Option<Stage> {
        match self {
            StageFilter::All => None,
            StageFilter::Only(stage) => Some(*stage),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageFilter::All => "All stages",
            StageFilter::Only(stage) => stage.label(),
        }
    }
}

impl fmt::Display for StageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageFilter::All => f.write_str("all"),
            StageFilter::Only(stage) => stage.fmt(f),
        }
    }
}

impl FromStr for StageFilter {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StageFilter::All)
        } else {
            s.parse().map(StageFilter::Only)
        }
    }
}

/// Identifies one listing request. Results carrying an outdated ticket are
/// dropped instead of overwriting newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RefreshTicket {
    generation: u64,
    filter: StageFilter,
}

/// Read-through view of the backend's job cards.
///
/// The cached list is replaced only by a successful listing for the
/// current filter. Once detached, the registry ignores every late result.
#[derive(Debug, Default)]
pub struct JobCardRegistry {
    cards: Vec<JobCard>,
    filter: StageFilter,
    generation: u64,
    detached: bool,
}

impl JobCardRegistry {
    pub fn new(filter: StageFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn cards(&self) -> &[JobCard] {
        &self.cards
    }

    pub fn filter(&self) -> StageFilter {
        self.filter
    }

    /// Starts a listing for the current filter, superseding any earlier one.
    fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        RefreshTicket {
            generation: self.generation,
            filter: self.filter,
        }
    }

    /// Applies a listing result. Returns `Ok(true)` if the cached cards were
    /// replaced, `Ok(false)` if the result was stale and dropped.
    fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<JobCard>, ErpError>,
    ) -> Result<bool, ErpError> {
        if self.detached || ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale job card listing"
            );
            return Ok(false);
        }
        self.cards = result?;
        Ok(true)
    }

    /// Fetches the listing for the current filter and applies it.
    pub async fn refresh(&mut self, api: &impl ProductionApi) -> Result<&[JobCard], ErpError> {
        let ticket = self.begin_refresh();
        let result = api.list_job_cards(ticket.filter.as_query()).await;
        self.complete_refresh(ticket, result)?;
        Ok(&self.cards)
    }

    /// Switches the filter and re-lists. Selecting the active filter again
    /// does nothing.
    pub async fn set_filter(
        &mut self,
        api: &impl ProductionApi,
        filter: StageFilter,
    ) -> Result<&[JobCard], ErpError> {
        if filter == self.filter && self.generation > 0 {
            return Ok(&self.cards);
        }
        self.filter = filter;
        self.refresh(api).await
    }

    /// Writes a card the backend just confirmed into the cached list.
    ///
    /// A card that no longer matches the active filter leaves the list, as
    /// it would on the next listing. Returns whether the list changed.
    pub fn apply_confirmed(&mut self, card: JobCard) -> bool {
        if self.detached {
            return false;
        }
        let Some(index) = self.cards.iter().position(|c| c.id == card.id) else {
            return false;
        };
        match self.filter.as_query() {
            Some(stage) if stage != card.current_stage => {
                self.cards.remove(index);
            }
            _ => self.cards[index] = card,
        }
        true
    }

    /// Stops accepting results, as when the view closes mid-request.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Cached card counts per stage, in pipeline order.
    pub fn stage_counts(&self) -> Vec<(Stage, usize)> {
        STAGE_SEQUENCE
            .iter()
            .map(|stage| {
                let count = self
                    .cards
                    .iter()
                    .filter(|c| c.current_stage == *stage)
                    .count();
                (*stage, count)
            })
            .collect()
    }
}

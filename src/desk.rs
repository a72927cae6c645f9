//! Operator actions over the backend: list, advance, create and print.
//!
//! Each handler returns its error instead of reporting it; `main` turns
//! errors into notifications.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::GlasslineError;
use crate::erp::ProductionApi;
use crate::print::{ArtifactFetcher, PrintComposer, PrintSink};
use crate::production::{
    Advance, JobCard, JobCardRegistry, NewJobCard, StageFilter, StageSequencer,
};

/// The operator's interaction handlers: each method is one user action,
/// and each leaves local state untouched unless the backend confirmed it.
pub struct ProductionDesk<'a, A> {
    api: &'a A,
    /// Shared by every advance so the in-flight guard spans them all.
    sequencer: StageSequencer<'a, A>,
    composer: PrintComposer,
    /// Where composed tags and reports go.
    sink: Box<dyn PrintSink + 'a>,
}

impl<'a, A: ProductionApi> ProductionDesk<'a, A> {
    pub fn new(api: &'a A, composer: PrintComposer, sink: Box<dyn PrintSink + 'a>) -> Self {
        Self {
            api,
            sequencer: StageSequencer::new(api),
            composer,
            sink,
        }
    }

    /// Lists job cards for `filter` into `registry`. Re-selecting the
    /// filter the registry already shows sends nothing.
    pub async fn load(
        &self,
        registry: &mut JobCardRegistry,
        filter: StageFilter,
    ) -> Result<(), GlasslineError> {
        registry.set_filter(self.api, filter).await?;
        Ok(())
    }

    /// Lists like [`load`](Self::load) unless `closed` resolves first.
    ///
    /// Closing drops the outstanding listing and detaches `registry`, which
    /// keeps whatever it held before. Returns `Ok(false)` when closed.
    pub async fn load_or_close(
        &self,
        registry: &mut JobCardRegistry,
        filter: StageFilter,
        closed: impl Future<Output = ()>,
    ) -> Result<bool, GlasslineError> {
        let loaded = tokio::select! {
            loaded = registry.set_filter(self.api, filter) => Some(loaded.map(|_| ())),
            () = closed => None,
        };
        match loaded {
            Some(result) => {
                result?;
                Ok(true)
            }
            None => {
                debug!(%filter, "view closed before the listing arrived");
                registry.detach();
                Ok(false)
            }
        }
    }

    /// Moves a listed job card to its next stage, then re-lists.
    ///
    /// The confirmed card is written into `registry` before the re-list, so
    /// a failed re-list still leaves the view on the confirmed stage. That
    /// failure is logged and the advance still counts as done.
    pub async fn advance(
        &self,
        registry: &mut JobCardRegistry,
        job_card_id: i64,
    ) -> Result<Advance, GlasslineError> {
        let current = registry
            .cards()
            .iter()
            .find(|c| c.id == job_card_id)
            .map(|c| c.current_stage)
            .ok_or(GlasslineError::UnknownJobCard(job_card_id))?;

        let outcome = self.sequencer.advance(job_card_id, current).await?;
        if let Advance::Moved(card) = &outcome {
            registry.apply_confirmed(card.clone());
            if let Err(err) = registry.refresh(self.api).await {
                warn!(job_card_id, error = %err, "re-list after stage change failed");
            }
        }
        Ok(outcome)
    }

    /// Validates locally, then asks the backend to open a new job card.
    pub async fn create(&self, spec: &NewJobCard) -> Result<JobCard, GlasslineError> {
        spec.validate().map_err(crate::erp::ErpError::from)?;
        let card = self.api.create_job_card(spec).await?;
        info!(job_card_number = %card.job_card_number, "job card created");
        Ok(card)
    }

    /// Fetches fresh print data and prints the tag. Nothing is printed if
    /// the fetch fails.
    pub async fn print_tag(&self, job_card_number: &str) -> Result<PathBuf, GlasslineError> {
        let artifact = ArtifactFetcher::new(self.api)
            .fetch_print_data(job_card_number)
            .await?;
        Ok(self.composer.print_job_card(&artifact, self.sink.as_ref())?)
    }

    /// Prints the cards currently held by `registry`.
    pub fn print_report(&self, registry: &JobCardRegistry) -> Result<PathBuf, GlasslineError> {
        Ok(self.composer.print_batch_report(
            registry.cards(),
            registry.filter().label(),
            self.sink.as_ref(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::erp::ErpError;
    use crate::erp::testing::{Call, FakeProduction};
    use crate::print::{Document, PrintArtifact, PrintError};
    use crate::production::fixtures::job_card;
    use crate::production::{Priority, Stage};

    // Shares its log with the test after the desk takes ownership of the sink.
    #[derive(Default, Clone)]
    struct SharedSink(Arc<std::sync::Mutex<Vec<Document>>>);

    impl PrintSink for SharedSink {
        fn submit(&self, document: &Document) -> Result<PathBuf, PrintError> {
            self.0.lock().unwrap().push(document.clone());
            Ok(PathBuf::from("spooled.html"))
        }
    }

    fn desk<'a>(api: &'a FakeProduction, sink: &SharedSink) -> ProductionDesk<'a, FakeProduction> {
        ProductionDesk::new(api, PrintComposer::new("Glass Co"), Box::new(sink.clone()))
    }

    fn artifact(number: &str) -> PrintArtifact {
        let mut card = job_card(1, Stage::Packing);
        card.job_card_number = number.into();
        PrintArtifact {
            job_card_number: card.job_card_number,
            glass_type: card.glass_type,
            thickness: card.thickness,
            width: card.width,
            height: card.height,
            quantity: card.quantity,
            priority: Priority::Urgent,
            current_stage: card.current_stage,
            created_at: card.created_at,
            qr_code_image: "data:image/png;base64,AA==".into(),
            barcode_image: "data:image/png;base64,BB==".into(),
        }
    }

    #[tokio::test]
    async fn advance_then_relist() {
        let api = FakeProduction::with_cards(vec![job_card(4, Stage::Grinding)]);
        let sink = SharedSink::default();
        let desk = desk(&api, &sink);
        let mut registry = JobCardRegistry::default();

        desk.load(&mut registry, StageFilter::All).await.unwrap();
        let outcome = desk.advance(&mut registry, 4).await.unwrap();

        assert!(matches!(outcome, Advance::Moved(ref c) if c.current_stage == Stage::Toughening));
        assert_eq!(registry.cards()[0].current_stage, Stage::Toughening);
        assert_eq!(
            api.calls(),
            vec![
                Call::List(None),
                Call::Advance(4, Stage::Toughening),
                Call::List(None)
            ]
        );
    }

    #[tokio::test]
    async fn closing_the_view_mid_listing_detaches_the_registry() {
        let api = FakeProduction {
            latency: Some(Duration::from_millis(200)),
            ..FakeProduction::with_cards(vec![job_card(1, Stage::Cutting)])
        };
        let sink = SharedSink::default();
        let desk = desk(&api, &sink);
        let mut registry = JobCardRegistry::default();

        let loaded = desk
            .load_or_close(
                &mut registry,
                StageFilter::All,
                tokio::time::sleep(Duration::from_millis(5)),
            )
            .await
            .unwrap();
        assert!(!loaded);
        assert!(registry.cards().is_empty());

        // A detached view takes nothing more, not even a later listing.
        registry.refresh(&api).await.unwrap();
        assert!(registry.cards().is_empty());
    }

    #[tokio::test]
    async fn open_view_loads_normally() {
        let api = FakeProduction::with_cards(vec![job_card(1, Stage::Cutting)]);
        let sink = SharedSink::default();
        let mut registry = JobCardRegistry::default();

        let loaded = desk(&api, &sink)
            .load_or_close(&mut registry, StageFilter::All, std::future::pending())
            .await
            .unwrap();
        assert!(loaded);
        assert_eq!(registry.cards().len(), 1);
    }

    #[tokio::test]
    async fn advancing_a_dispatched_card_sends_nothing() {
        let api = FakeProduction::with_cards(vec![job_card(6, Stage::Dispatched)]);
        let sink = SharedSink::default();
        let desk = desk(&api, &sink);
        let mut registry = JobCardRegistry::default();

        desk.load(&mut registry, StageFilter::All).await.unwrap();
        let outcome = desk.advance(&mut registry, 6).await.unwrap();

        assert_eq!(outcome, Advance::Terminal);
        assert_eq!(api.calls(), vec![Call::List(None)]);
    }

    #[tokio::test]
    async fn failed_advance_keeps_the_listed_stage() {
        let api = FakeProduction::with_cards(vec![job_card(2, Stage::Cutting)]);
        let sink = SharedSink::default();
        let mut registry = JobCardRegistry::default();
        desk(&api, &sink)
            .load(&mut registry, StageFilter::All)
            .await
            .unwrap();

        let broken = FakeProduction {
            unavailable: true,
            ..Default::default()
        };
        let err = desk(&broken, &sink)
            .advance(&mut registry, 2)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "service");
        assert_eq!(registry.cards()[0].current_stage, Stage::Cutting);
    }

    #[tokio::test]
    async fn confirmed_advance_survives_a_failed_relist() {
        let sink = SharedSink::default();
        let mut registry = JobCardRegistry::default();
        let listing = FakeProduction::with_cards(vec![job_card(4, Stage::Grinding)]);
        desk(&listing, &sink)
            .load(&mut registry, StageFilter::All)
            .await
            .unwrap();

        let api = FakeProduction {
            listing_unavailable: true,
            ..FakeProduction::with_cards(vec![job_card(4, Stage::Grinding)])
        };
        let outcome = desk(&api, &sink).advance(&mut registry, 4).await.unwrap();

        assert!(matches!(outcome, Advance::Moved(ref c) if c.current_stage == Stage::Toughening));
        assert_eq!(registry.cards()[0].current_stage, Stage::Toughening);
        assert_eq!(
            api.calls(),
            vec![Call::Advance(4, Stage::Toughening), Call::List(None)]
        );
    }

    #[tokio::test]
    async fn unlisted_card_is_rejected() {
        let api = FakeProduction::default();
        let sink = SharedSink::default();
        let mut registry = JobCardRegistry::default();
        let err = desk(&api, &sink)
            .advance(&mut registry, 99)
            .await
            .unwrap_err();
        assert!(matches!(err, GlasslineError::UnknownJobCard(99)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_number_opens_no_print_view() {
        let api = FakeProduction::default();
        let sink = SharedSink::default();
        let err = desk(&api, &sink).print_tag("JC-404").await.unwrap_err();

        assert!(matches!(err, GlasslineError::Erp(ErpError::NotFound(_))));
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn print_tag_spools_the_composed_document() {
        let api = FakeProduction {
            artifacts: vec![artifact("JC-77")],
            ..Default::default()
        };
        let sink = SharedSink::default();
        let location = desk(&api, &sink).print_tag("JC-77").await.unwrap();

        assert_eq!(location, PathBuf::from("spooled.html"));
        let docs = sink.0.lock().unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].html.contains(">URGENT</span>"));
    }

    #[tokio::test]
    async fn create_validates_before_sending() {
        let api = FakeProduction::default();
        let sink = SharedSink::default();
        let desk = desk(&api, &sink);
        let mut spec = NewJobCard {
            glass_type: "clear".into(),
            thickness: 5.0,
            width: 20.0,
            height: 30.0,
            quantity: 0,
            priority: Priority::Normal,
            order_id: None,
        };

        let err = desk.create(&spec).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(api.calls().is_empty());

        spec.quantity = 4;
        let card = desk.create(&spec).await.unwrap();
        assert_eq!(card.job_card_number, "JC-2026-0001");
        assert_eq!(card.current_stage, Stage::Pending);
    }

    #[tokio::test]
    async fn report_uses_the_registry_filter() {
        let api = FakeProduction::with_cards(vec![
            job_card(1, Stage::Packing),
            job_card(2, Stage::Packing),
            job_card(3, Stage::Cutting),
        ]);
        let sink = SharedSink::default();
        let desk = desk(&api, &sink);
        let mut registry = JobCardRegistry::default();

        desk.load(&mut registry, StageFilter::Only(Stage::Packing))
            .await
            .unwrap();
        desk.print_report(&registry).unwrap();

        let docs = sink.0.lock().unwrap();
        assert!(docs[0].html.contains("Filter: Packing"));
        assert!(docs[0].html.contains("Total job cards: 2"));
    }
}

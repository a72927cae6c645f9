use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use glassline::cli::{Cli, Command};
use glassline::config::GlasslineConfig;
use glassline::desk::ProductionDesk;
use glassline::erp::ErpClient;
use glassline::error::GlasslineError;
use glassline::print::{HtmlSpool, PrintComposer};
use glassline::production::{JobCardRegistry, NewJobCard};
use glassline::ui::{Busy, Console};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = GlasslineConfig::load()?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    debug!(base_url = %config.base_url, "configuration loaded");

    let console = Console::default();
    if let Command::Stages = cli.command {
        console.pipeline();
        return Ok(ExitCode::SUCCESS);
    }

    let client = match ErpClient::new(&config.base_url, config.credentials(), config.timeouts()) {
        Ok(client) => client,
        Err(err) => {
            console.error(&GlasslineError::from(err));
            return Ok(ExitCode::FAILURE);
        }
    };
    let desk = ProductionDesk::new(
        &client,
        PrintComposer::new(config.organization_name.clone()),
        Box::new(HtmlSpool::new(&config.spool_dir, config.print_command.clone())),
    );

    match run(cli.command, &desk, &console).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            console.error(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Runs one operator action. Every failure comes back here and is shown
/// as a notification by the caller.
async fn run(
    command: Command,
    desk: &ProductionDesk<'_, ErpClient>,
    console: &Console,
) -> Result<(), GlasslineError> {
    match command {
        Command::List { stage } => {
            let mut registry = JobCardRegistry::new(stage);
            let busy = Busy::start("Loading job cards");
            let loaded = desk.load_or_close(&mut registry, stage, interrupted()).await;
            busy.finish();
            if !loaded? {
                console.notice("Cancelled");
                return Ok(());
            }
            console.job_cards(registry.cards(), stage.label());
            console.stage_counts(&registry.stage_counts());
        }
        Command::Advance { id } => {
            let mut registry = JobCardRegistry::default();
            let busy = Busy::start("Advancing job card");
            let outcome = match desk.load(&mut registry, Default::default()).await {
                Ok(()) => desk.advance(&mut registry, id).await,
                Err(err) => Err(err),
            };
            busy.finish();
            console.advance(&outcome?);
        }
        Command::Create(args) => {
            let spec = NewJobCard::from(args);
            let busy = Busy::start("Creating job card");
            let created = desk.create(&spec).await;
            busy.finish();
            let card = created?;
            console.success(&format!(
                "Created {} ({}, {} pcs)",
                card.job_card_number,
                card.size_label(),
                card.quantity
            ));
        }
        Command::Print { job_card_number } => {
            let busy = Busy::start("Fetching QR and barcode");
            let printed = desk.print_tag(&job_card_number).await;
            busy.finish();
            let path = printed?;
            console.success(&format!("Tag ready: {}", path.display()));
        }
        Command::Report { stage } => {
            let mut registry = JobCardRegistry::new(stage);
            let busy = Busy::start("Loading job cards");
            let loaded = desk.load_or_close(&mut registry, stage, interrupted()).await;
            busy.finish();
            if !loaded? {
                console.notice("Cancelled");
                return Ok(());
            }
            let path = desk.print_report(&registry)?;
            console.success(&format!(
                "Report with {} job cards ready: {}",
                registry.cards().len(),
                path.display()
            ));
        }
        Command::Stages => console.pipeline(),
    }
    Ok(())
}

/// Resolves when the operator presses Ctrl-C, which closes the view.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

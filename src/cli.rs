//! Command-line interface built on clap.
//!
//! Defines [`Cli`] with the [`Command`] subcommands and the global flags
//! (`--base-url`, `--verbose`).

use clap::{Args, Parser, Subcommand};

use crate::production::{NewJobCard, Priority, StageFilter};

/// glassline: track glass job cards through production and print their tags.
#[derive(Debug, Parser)]
#[command(name = "glassline", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// ERP API root, overriding config and environment.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enables debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lists job cards, optionally for a single stage.
    List {
        /// `all` or a stage name such as `cutting` or `quality_check`.
        #[arg(long, default_value = "all")]
        stage: StageFilter,
    },

    /// Moves a job card to its next production stage.
    Advance {
        /// Backend id of the job card (the `ID` column of `list`).
        id: i64,
    },

    /// Opens a new job card.
    Create(CreateArgs),

    /// Prints the QR/barcode tag for a job card.
    Print {
        /// Job-card number, e.g. JC-2026-0001.
        job_card_number: String,
    },

    /// Prints a batch report of job cards.
    Report {
        /// `all` or a stage name.
        #[arg(long, default_value = "all")]
        stage: StageFilter,
    },

    /// Shows the production pipeline.
    Stages,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub glass_type: String,

    /// Millimetres.
    #[arg(long)]
    pub thickness: f64,

    /// Inches.
    #[arg(long)]
    pub width: f64,

    /// Inches.
    #[arg(long)]
    pub height: f64,

    #[arg(long, default_value_t = 1)]
    pub quantity: u32,

    #[arg(long, default_value = "normal")]
    pub priority: Priority,

    /// Sales order this job card fulfils.
    #[arg(long)]
    pub order_id: Option<i64>,
}

impl From<CreateArgs> for NewJobCard {
    fn from(args: CreateArgs) -> Self {
        NewJobCard {
            glass_type: args.glass_type,
            thickness: args.thickness,
            width: args.width,
            height: args.height,
            quantity: args.quantity,
            priority: args.priority,
            order_id: args.order_id,
        }
    }
}

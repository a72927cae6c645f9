mod job_card;
mod registry;
mod sequencer;
mod stage;

pub use job_card::{InvalidJobCard, JobCard, NewJobCard, Priority, format_date, format_size};
pub use registry::{JobCardRegistry, StageFilter};
pub use sequencer::{Advance, StageSequencer};
pub use stage::{STAGE_SEQUENCE, Stage, UnknownStage, next_stage};

#[cfg(test)]
pub(crate) use job_card::fixtures;

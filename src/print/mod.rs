mod artifact;
mod composer;
mod sink;

pub use artifact::{ArtifactFetcher, PrintArtifact};
pub use composer::{Document, PrintComposer};
pub use sink::{HtmlSpool, PrintError, PrintSink};

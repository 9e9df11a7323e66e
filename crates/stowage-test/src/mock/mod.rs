//! Mock implementations of the pipeline seams.
//!
//! Every mock shares its state between clones, so a test can hand one clone
//! to the code under test and inspect the other afterwards.

mod extractor;
mod provider;
mod storage;

pub use extractor::{ExtractCall, RecordingExtractor};
pub use provider::MockClientProvider;
pub use storage::{MockStorage, StorageCall};

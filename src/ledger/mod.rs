//! Append-only checkpoint ledger and the state derived from replaying it.

pub mod record;
pub mod state;
pub mod store;

pub use record::{CheckpointRecord, LedgerLine, Phase3Stats};
pub use state::ResumableState;
pub use store::StateLedger;

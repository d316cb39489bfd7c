pub mod entry;

pub use entry::{Entry, EntryPayload, NewEntry, SyncState};

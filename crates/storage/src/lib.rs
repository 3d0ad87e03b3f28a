//! Storage fallback layer for in-flight order drafts.
//!
//! A draft must survive an external, uncontrolled full-page hand-off to the
//! hosted payment page. No single storage substrate is guaranteed available
//! to the client shell, so durability comes from diversity: every save is
//! attempted against three independent substrates and the layer succeeds if
//! at least one write lands. Reads walk the substrates in a fixed priority
//! order and take the first structurally valid, fresh candidate.

pub mod draft;
pub mod fallback;
pub mod substrate;

pub use draft::{PersistedDraft, PersistedItem};
pub use fallback::{FallbackStore, SaveReceipt, StorageSettings};
pub use substrate::{
    DraftSubstrate, FileBackupStore, FragmentStore, SessionStore, StorageError,
};

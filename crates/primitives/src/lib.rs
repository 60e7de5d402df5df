//! Core types shared across the session crates: keys, semantic events and
//! session termination values.

/// Semantic events consumed by the session driver.
pub mod event;
/// Termination payloads and exit status extraction.
pub mod exit;
/// Key representation.
pub mod key;

pub use event::{PasteBlock, SemanticEvent};
pub use exit::{ExitValue, Initiator, Termination};
pub use key::{Key, KeyCode, Modifiers};

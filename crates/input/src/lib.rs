//! Input side of the session driver.
//!
//! Raw units come out of a [`RawInputSource`], pass through a
//! [`TriggeredSource`] (which splices in events fired by triggers) and are
//! turned into [`SemanticEvent`]s by the [`EventCoalescer`].
//!
//! ```text
//! terminal thread ─┐
//! wakers ──────────┴─► ChannelSource ─► TriggeredSource ─► EventCoalescer ─► driver
//!                                         ▲
//!                     immediate/scheduled/threadsafe triggers
//! ```
//!
//! [`SemanticEvent`]: tidal_primitives::SemanticEvent

pub mod coalesce;
pub mod error;
pub mod source;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod trigger;

pub use coalesce::{DEFAULT_PASTE_THRESHOLD, EventCoalescer};
pub use error::InputError;
pub use source::{ChannelSource, RawInputSource, RawUnit, SourceMessage, Waker};
pub use trigger::{ImmediateTrigger, ScheduledTrigger, ThreadsafeTrigger, TriggerRegistry, TriggeredSource};

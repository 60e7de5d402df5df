//! The interactive session driver.
//!
//! [`SessionDriver`] pulls coalesced events, hands them to an
//! [`Interpreter`], paints every cycle through a [`Renderer`], and walks the
//! terminal through suspend and resume with [`JobControl`]. A session ends
//! only through a [`Termination`], which is always painted before it is
//! returned.
//!
//! [`Termination`]: tidal_primitives::Termination

pub mod config;
pub mod driver;
pub mod error;
pub mod handle;
pub mod interface;
pub mod state;

pub use config::{ConfigError, RunOptions, SessionConfig};
pub use driver::{HELPER_IMPORT, SessionDriver, SessionExit};
pub use error::SessionError;
pub use handle::SessionHandle;
pub use interface::{Binding, Cursor, Dispatch, Frame, Interpreter, JobControl, PaintRequest, Renderer};
pub use state::{Phase, SessionState};

//! Driver-owned session state.

/// Terminal geometry and paint bookkeeping, owned by the driver thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
	pub height: u16,
	pub width: u16,
	/// Total lines the terminal has scrolled; never decreases.
	pub scroll_offset: u64,
	/// True only while the terminal is released for a job-control stop.
	pub suspended: bool,
}

/// Where the driver is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	WarmingUp,
	AwaitingEvent,
	Dispatching,
	Painting,
	Suspended,
	Exited,
}

//! Module source watching.
//!
//! [`ModuleWatcher`] remembers imported modules by their path without a
//! suffix, watches their directories non-recursively, and reports edits to
//! `<module>.py` through a callback. Without the `watch` feature, or when the
//! platform watcher cannot be created, it only keeps the bookkeeping.

mod error;

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use error::{Result, WatchError};
use parking_lot::Mutex;

/// File suffixes stripped from module paths.
pub const MODULE_SUFFIXES: &[&str] = &["py", "pyc", "so", "pyd"];

/// Tracked modules grouped by directory.
#[derive(Debug, Default)]
struct Modules {
	dirs: HashMap<PathBuf, HashSet<PathBuf>>,
}

impl Modules {
	/// Records `module`, returning its directory.
	fn insert(&mut self, module: PathBuf) -> PathBuf {
		let dir = module.parent().map(Path::to_path_buf).unwrap_or_default();
		self.dirs.entry(dir.clone()).or_default().insert(module);
		dir
	}

	/// Whether `path` is the source file of a tracked module.
	fn is_module_source(&self, path: &Path) -> bool {
		let Some(dir) = path.parent() else {
			return false;
		};
		self.dirs
			.get(dir)
			.is_some_and(|modules| modules.iter().any(|module| source_file(module) == path))
	}
}

/// `<module>.py` for a suffix-less module path.
fn source_file(module: &Path) -> PathBuf {
	let mut name = OsString::from(module.as_os_str());
	name.push(".py");
	PathBuf::from(name)
}

/// Absolute module path with a known suffix removed.
pub fn module_key(path: &Path) -> Result<PathBuf> {
	let absolute = std::path::absolute(path).map_err(|source| WatchError::Resolve {
		path: path.to_path_buf(),
		source,
	})?;
	let known_suffix = absolute
		.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| MODULE_SUFFIXES.contains(&ext));
	Ok(if known_suffix {
		absolute.with_extension("")
	} else {
		absolute
	})
}

type ChangeCallback = Arc<dyn Fn(Vec<PathBuf>) + Send + Sync>;

/// Watches module sources and calls back when one is modified.
pub struct ModuleWatcher {
	modules: Arc<Mutex<Modules>>,
	/// Modules tracked while inactive, added on activation.
	deferred: Vec<PathBuf>,
	active: bool,
	backend: Backend,
}

impl ModuleWatcher {
	/// Creates an inactive watcher already tracking `paths`.
	pub fn new<I, P, F>(paths: I, on_change: F) -> Result<Self>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
		F: Fn(Vec<PathBuf>) + Send + Sync + 'static,
	{
		let modules = Arc::new(Mutex::new(Modules::default()));
		let backend = Backend::new(Arc::clone(&modules), Arc::new(on_change));
		let watcher = Self {
			modules,
			deferred: Vec::new(),
			active: false,
			backend,
		};
		for path in paths {
			watcher.modules.lock().insert(module_key(path.as_ref())?);
		}
		Ok(watcher)
	}

	/// Whether events are currently being delivered.
	pub fn is_active(&self) -> bool {
		self.active
	}

	/// Whether a platform watcher backs this instance.
	pub fn is_enabled(&self) -> bool {
		self.backend.is_enabled()
	}

	/// Tracks `path` now if active, otherwise on the next activation.
	pub fn track_module(&mut self, path: impl AsRef<Path>) -> Result<()> {
		let module = module_key(path.as_ref())?;
		if self.active {
			self.add(module)
		} else {
			tracing::trace!(module = %module.display(), "deferring module until activation");
			self.deferred.push(module);
			Ok(())
		}
	}

	fn add(&mut self, module: PathBuf) -> Result<()> {
		let dir = self.modules.lock().insert(module);
		self.backend.watch(&dir)
	}

	/// Starts watching every tracked directory, then adds deferred modules.
	///
	/// A module whose directory cannot be watched stays tracked, and the
	/// deferred modules after it stay deferred for the next attempt.
	///
	/// # Errors
	///
	/// [`WatchError::AlreadyActive`] if called twice without deactivating.
	pub fn activate(&mut self) -> Result<()> {
		if self.active {
			return Err(WatchError::AlreadyActive);
		}
		let dirs: Vec<PathBuf> = self.modules.lock().dirs.keys().cloned().collect();
		for dir in &dirs {
			self.backend.watch(dir)?;
		}
		let mut deferred = std::mem::take(&mut self.deferred).into_iter();
		while let Some(module) = deferred.next() {
			if let Err(err) = self.add(module) {
				self.deferred.extend(deferred);
				return Err(err);
			}
		}
		self.active = true;
		tracing::debug!(dirs = self.modules.lock().dirs.len(), "module watcher activated");
		Ok(())
	}

	/// Stops watching; tracked modules are kept for the next activation.
	///
	/// # Errors
	///
	/// [`WatchError::NotActive`] if the watcher is not active.
	pub fn deactivate(&mut self) -> Result<()> {
		if !self.active {
			return Err(WatchError::NotActive);
		}
		self.backend.unwatch_all();
		self.active = false;
		tracing::debug!("module watcher deactivated");
		Ok(())
	}

	/// Forgets every tracked module and stops watching.
	pub fn reset(&mut self) {
		self.modules.lock().dirs.clear();
		self.deferred.clear();
		self.backend.unwatch_all();
	}

	/// Directories holding tracked modules.
	pub fn tracked_dirs(&self) -> Vec<PathBuf> {
		let mut dirs: Vec<PathBuf> = self.modules.lock().dirs.keys().cloned().collect();
		dirs.sort();
		dirs
	}

	/// Modules waiting for activation.
	pub fn deferred(&self) -> &[PathBuf] {
		&self.deferred
	}
}

impl std::fmt::Debug for ModuleWatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModuleWatcher")
			.field("active", &self.active)
			.field("deferred", &self.deferred.len())
			.field("enabled", &self.backend.is_enabled())
			.finish()
	}
}

#[cfg(feature = "watch")]
struct Backend {
	watcher: Option<notify::RecommendedWatcher>,
	watched: HashSet<PathBuf>,
}

#[cfg(feature = "watch")]
impl Backend {
	fn new(modules: Arc<Mutex<Modules>>, on_change: ChangeCallback) -> Self {
		use notify::{Event, EventKind};

		let handler = move |res: notify::Result<Event>| {
			let event = match res {
				Ok(event) => event,
				Err(err) => {
					tracing::warn!(error = %err, "file watcher error");
					return;
				}
			};
			if matches!(event.kind, EventKind::Access(_)) {
				return;
			}
			let changed: Vec<PathBuf> = {
				let modules = modules.lock();
				event.paths.into_iter().filter(|p| modules.is_module_source(p)).collect()
			};
			if !changed.is_empty() {
				tracing::debug!(files = ?changed, "module source changed");
				on_change(changed);
			}
		};

		let watcher = match notify::recommended_watcher(handler) {
			Ok(watcher) => Some(watcher),
			Err(err) => {
				tracing::warn!(error = %err, "file watching unavailable");
				None
			}
		};
		Self {
			watcher,
			watched: HashSet::new(),
		}
	}

	fn is_enabled(&self) -> bool {
		self.watcher.is_some()
	}

	fn watch(&mut self, dir: &Path) -> Result<()> {
		use notify::{RecursiveMode, Watcher};

		let Some(watcher) = self.watcher.as_mut() else {
			return Ok(());
		};
		if self.watched.contains(dir) {
			return Ok(());
		}
		watcher
			.watch(dir, RecursiveMode::NonRecursive)
			.map_err(|source| WatchError::Watch {
				path: dir.to_path_buf(),
				source,
			})?;
		self.watched.insert(dir.to_path_buf());
		Ok(())
	}

	fn unwatch_all(&mut self) {
		use notify::Watcher;

		let Some(watcher) = self.watcher.as_mut() else {
			return;
		};
		for dir in self.watched.drain() {
			if let Err(err) = watcher.unwatch(&dir) {
				tracing::debug!(dir = %dir.display(), error = %err, "unwatch failed");
			}
		}
	}
}

#[cfg(not(feature = "watch"))]
struct Backend;

#[cfg(not(feature = "watch"))]
impl Backend {
	fn new(_modules: Arc<Mutex<Modules>>, _on_change: ChangeCallback) -> Self {
		Backend
	}

	fn is_enabled(&self) -> bool {
		false
	}

	fn watch(&mut self, _dir: &Path) -> Result<()> {
		Ok(())
	}

	fn unwatch_all(&mut self) {}
}

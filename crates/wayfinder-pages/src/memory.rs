//! In-memory environment for tests and non-browser hosts.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use url::Url;

use crate::guard::{ListenerId, UnloadRequest, UnloadSignal};
use crate::history::{History, HistoryError, Location};

/// Origin used by [`MemoryHistory::new`].
pub const DEFAULT_ORIGIN: &str = "http://localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
	ScrollToTop,
	Traverse(i32),
}

/// A [`History`] and [`UnloadSignal`] backed by plain data.
///
/// Deferred work (scrolling, back/forward traversals) is queued the way a
/// browser queues it and runs only when [`run_pending`](Self::run_pending)
/// is called.
///
/// ```
/// use wayfinder_pages::{History, MemoryHistory};
///
/// let history = MemoryHistory::new("/").unwrap();
/// history.push("/users/5?tab=posts").unwrap();
/// history.go(-1);
/// assert_eq!(history.location().path, "/users/5");
///
/// history.run_pending();
/// assert_eq!(history.location().path, "/");
/// ```
pub struct MemoryHistory {
	entries: RefCell<Vec<Url>>,
	index: Cell<usize>,
	listeners: RefCell<Vec<Rc<dyn Fn()>>>,
	tasks: RefCell<VecDeque<Task>>,
	scroll: Cell<(f64, f64)>,
	unload_listeners: RefCell<BTreeMap<ListenerId, Rc<dyn Fn(&UnloadRequest)>>>,
	next_listener_id: Cell<u64>,
}

impl MemoryHistory {
	/// Creates a history with a single entry for `initial` on
	/// [`DEFAULT_ORIGIN`].
	///
	/// # Errors
	///
	/// Returns [`HistoryError::InvalidUrl`] if `initial` cannot be resolved.
	pub fn new(initial: &str) -> Result<Self, HistoryError> {
		Self::with_origin(DEFAULT_ORIGIN, initial)
	}

	/// Creates a history with a single entry for `initial` resolved against
	/// `origin`.
	///
	/// # Errors
	///
	/// Returns [`HistoryError::InvalidUrl`] if `origin` or `initial` cannot be
	/// parsed.
	pub fn with_origin(origin: &str, initial: &str) -> Result<Self, HistoryError> {
		let base = Url::parse(origin).map_err(|source| HistoryError::InvalidUrl {
			url: origin.to_string(),
			source,
		})?;
		let first = base.join(initial).map_err(|source| HistoryError::InvalidUrl {
			url: initial.to_string(),
			source,
		})?;

		Ok(Self {
			entries: RefCell::new(vec![first]),
			index: Cell::new(0),
			listeners: RefCell::new(Vec::new()),
			tasks: RefCell::new(VecDeque::new()),
			scroll: Cell::new((0.0, 0.0)),
			unload_listeners: RefCell::new(BTreeMap::new()),
			next_listener_id: Cell::new(0),
		})
	}

	/// Every entry as `path?query#fragment`, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.entries
			.borrow()
			.iter()
			.map(|url| Location::from_url(url).to_string())
			.collect()
	}

	/// Position of the current entry.
	pub fn index(&self) -> usize {
		self.index.get()
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Number of queued tasks.
	pub fn pending_tasks(&self) -> usize {
		self.tasks.borrow().len()
	}

	/// Runs queued tasks, including tasks queued while running, and returns
	/// how many ran.
	pub fn run_pending(&self) -> usize {
		let mut ran = 0;
		loop {
			let task = self.tasks.borrow_mut().pop_front();
			let Some(task) = task else {
				return ran;
			};
			ran += 1;
			match task {
				Task::ScrollToTop => self.scroll.set((0.0, 0.0)),
				Task::Traverse(delta) => self.traverse(delta),
			}
		}
	}

	pub fn scroll_position(&self) -> (f64, f64) {
		self.scroll.get()
	}

	/// Sets the scroll position, as a user scrolling the page would.
	pub fn scroll_to(&self, x: f64, y: f64) {
		self.scroll.set((x, y));
	}

	/// Number of installed unload listeners.
	pub fn unload_listener_count(&self) -> usize {
		self.unload_listeners.borrow().len()
	}

	/// Fires every unload listener with a fresh request and returns it.
	pub fn simulate_unload(&self) -> UnloadRequest {
		let request = UnloadRequest::new();
		let listeners: Vec<_> = self.unload_listeners.borrow().values().cloned().collect();
		for listener in listeners {
			listener(&request);
		}
		request
	}

	fn current_url(&self) -> Url {
		let entries = self.entries.borrow();
		entries[self.index.get()].clone()
	}

	fn resolve(&self, url: &str) -> Result<Url, HistoryError> {
		let current = self.current_url();
		let resolved = current.join(url).map_err(|source| {
			tracing::warn!(url, error = %source, "invalid history URL");
			HistoryError::InvalidUrl {
				url: url.to_string(),
				source,
			}
		})?;
		if resolved.origin() != current.origin() {
			tracing::warn!(url = %resolved, "refusing to write a cross-origin history entry");
			return Err(HistoryError::CrossOrigin {
				url: resolved.to_string(),
			});
		}
		Ok(resolved)
	}

	fn traverse(&self, delta: i32) {
		let target = self.index.get() as i64 + i64::from(delta);
		if delta == 0 || target < 0 || target >= self.len() as i64 {
			return;
		}
		self.index.set(target as usize);

		let listeners: Vec<_> = self.listeners.borrow().clone();
		for listener in listeners {
			listener();
		}
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryHistory")
			.field("entries", &self.entries())
			.field("index", &self.index.get())
			.field("pending_tasks", &self.pending_tasks())
			.finish()
	}
}

impl History for MemoryHistory {
	fn location(&self) -> Location {
		Location::from_url(&self.current_url())
	}

	fn origin(&self) -> String {
		self.current_url().origin().ascii_serialization()
	}

	fn push(&self, url: &str) -> Result<(), HistoryError> {
		let url = self.resolve(url)?;
		let next = self.index.get() + 1;
		let mut entries = self.entries.borrow_mut();
		entries.truncate(next);
		entries.push(url);
		self.index.set(next);
		Ok(())
	}

	fn replace(&self, url: &str) -> Result<(), HistoryError> {
		let url = self.resolve(url)?;
		let index = self.index.get();
		self.entries.borrow_mut()[index] = url;
		Ok(())
	}

	fn go(&self, delta: i32) {
		self.tasks.borrow_mut().push_back(Task::Traverse(delta));
	}

	fn listen(&self, listener: Rc<dyn Fn()>) {
		self.listeners.borrow_mut().push(listener);
	}

	fn schedule_scroll_to_top(&self) {
		self.tasks.borrow_mut().push_back(Task::ScrollToTop);
	}
}

impl UnloadSignal for MemoryHistory {
	fn add_unload_listener(&self, listener: Rc<dyn Fn(&UnloadRequest)>) -> ListenerId {
		let id = ListenerId(self.next_listener_id.get());
		self.next_listener_id.set(id.0 + 1);
		self.unload_listeners.borrow_mut().insert(id, listener);
		id
	}

	fn remove_unload_listener(&self, id: ListenerId) {
		self.unload_listeners.borrow_mut().remove(&id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_push_truncates_forward_entries() {
		let history = MemoryHistory::new("/a").unwrap();
		history.push("/b").unwrap();
		history.push("/c").unwrap();
		history.go(-2);
		history.run_pending();

		history.push("/d").unwrap();

		assert_eq!(history.entries(), vec!["/a", "/d"]);
		assert_eq!(history.index(), 1);
	}

	#[rstest]
	fn test_relative_urls_resolve_against_current_entry() {
		let history = MemoryHistory::new("/users/5").unwrap();

		history.push("edit?draft=1").unwrap();

		assert_eq!(history.location().path_and_query(), "/users/edit?draft=1");
	}

	#[rstest]
	fn test_cross_origin_push_is_refused() {
		let history = MemoryHistory::new("/").unwrap();

		let pushed = history.push("https://example.com/elsewhere");
		let replaced = history.replace("https://example.com/elsewhere");

		assert!(matches!(pushed, Err(HistoryError::CrossOrigin { .. })));
		assert!(matches!(replaced, Err(HistoryError::CrossOrigin { .. })));
		assert_eq!(history.len(), 1);
		assert_eq!(history.location().path, "/");
	}

	#[rstest]
	fn test_replace_keeps_length() {
		let history = MemoryHistory::new("/a").unwrap();
		history.push("/b").unwrap();

		history.replace("/c").unwrap();

		assert_eq!(history.entries(), vec!["/a", "/c"]);
	}

	#[rstest]
	fn test_go_is_deferred_and_fires_listeners() {
		let history = MemoryHistory::new("/a").unwrap();
		history.push("/b").unwrap();
		let fired = Rc::new(Cell::new(0));
		let counter = Rc::clone(&fired);
		history.listen(Rc::new(move || counter.set(counter.get() + 1)));

		history.go(-1);
		assert_eq!(fired.get(), 0);
		assert_eq!(history.location().path, "/b");

		assert_eq!(history.run_pending(), 1);
		assert_eq!(fired.get(), 1);
		assert_eq!(history.location().path, "/a");
	}

	#[rstest]
	#[case(-1)]
	#[case(5)]
	#[case(0)]
	fn test_out_of_range_traversal_is_ignored(#[case] delta: i32) {
		let history = MemoryHistory::new("/a").unwrap();
		let fired = Rc::new(Cell::new(false));
		let flag = Rc::clone(&fired);
		history.listen(Rc::new(move || flag.set(true)));

		history.go(delta);
		history.run_pending();

		assert!(!fired.get());
		assert_eq!(history.index(), 0);
	}

	#[rstest]
	fn test_push_and_replace_do_not_fire_listeners() {
		let history = MemoryHistory::new("/").unwrap();
		let fired = Rc::new(Cell::new(false));
		let flag = Rc::clone(&fired);
		history.listen(Rc::new(move || flag.set(true)));

		history.push("/a").unwrap();
		history.replace("/b").unwrap();

		assert!(!fired.get());
	}

	#[rstest]
	fn test_scroll_to_top_waits_for_pending_tasks() {
		let history = MemoryHistory::new("/").unwrap();
		history.scroll_to(0.0, 480.0);

		history.schedule_scroll_to_top();

		assert_eq!(history.scroll_position(), (0.0, 480.0));
		history.run_pending();
		assert_eq!(history.scroll_position(), (0.0, 0.0));
	}

	#[rstest]
	fn test_origin() {
		let history = MemoryHistory::with_origin("https://app.example.com:8443", "/").unwrap();

		assert_eq!(history.origin(), "https://app.example.com:8443");
		assert_eq!(MemoryHistory::new("/").unwrap().origin(), DEFAULT_ORIGIN);
	}

	#[rstest]
	fn test_invalid_origin() {
		let result = MemoryHistory::with_origin("not a url", "/");

		assert!(matches!(result, Err(HistoryError::InvalidUrl { .. })));
	}

	#[rstest]
	fn test_unload_listeners() {
		let history = MemoryHistory::new("/").unwrap();
		let id = history.add_unload_listener(Rc::new(|request: &UnloadRequest| request.prevent_default()));

		assert!(history.simulate_unload().is_default_prevented());

		history.remove_unload_listener(id);
		history.remove_unload_listener(id);

		assert!(!history.simulate_unload().requests_confirmation());
		assert_eq!(history.unload_listener_count(), 0);
	}
}

//! Navigation gate and the unsaved-changes guard.
//!
//! A [`NavigationGate`] is shared between the router and any number of
//! [`UnsavedChangesGuard`]s. A guard writes the gate only on its own
//! transitions: activating blocks, and deactivating or dropping an active
//! guard lifts the block. An inactive guard never touches the gate.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Whether in-app navigation may proceed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GateState {
	/// Navigation proceeds normally.
	#[default]
	Allowed,
	/// A guard holds unsaved changes; navigation is refused.
	Blocked,
	/// The last guard was torn down. Behaves like [`GateState::Allowed`].
	Released,
}

impl GateState {
	/// Returns whether navigation may proceed in this state.
	pub fn allows_navigation(self) -> bool {
		!matches!(self, GateState::Blocked)
	}
}

/// Shared handle to the current [`GateState`].
#[derive(Debug, Clone, Default)]
pub struct NavigationGate(Rc<Cell<GateState>>);

impl NavigationGate {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> GateState {
		self.0.get()
	}

	pub fn set(&self, state: GateState) {
		self.0.set(state);
	}

	pub fn allows_navigation(&self) -> bool {
		self.state().allows_navigation()
	}
}

/// Identifier returned by [`UnloadSignal::add_unload_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// The "page is about to unload" event handed to unload listeners.
///
/// Calling [`prevent_default`](Self::prevent_default) asks the host to show
/// its leave-page confirmation.
#[derive(Debug, Default)]
pub struct UnloadRequest {
	default_prevented: Cell<bool>,
	return_value: RefCell<Option<String>>,
}

impl UnloadRequest {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	pub fn set_return_value(&self, value: &str) {
		*self.return_value.borrow_mut() = Some(value.to_string());
	}

	pub fn is_default_prevented(&self) -> bool {
		self.default_prevented.get()
	}

	pub fn return_value(&self) -> Option<String> {
		self.return_value.borrow().clone()
	}

	/// Returns whether the host should ask the user to confirm leaving.
	pub fn requests_confirmation(&self) -> bool {
		self.is_default_prevented() || self.return_value.borrow().is_some()
	}
}

/// Source of page-unload notifications.
pub trait UnloadSignal {
	fn add_unload_listener(&self, listener: Rc<dyn Fn(&UnloadRequest)>) -> ListenerId;

	/// Removing an unknown or already removed id does nothing.
	fn remove_unload_listener(&self, id: ListenerId);
}

fn confirm_unload(request: &UnloadRequest) {
	request.prevent_default();
	request.set_return_value("");
}

/// Blocks navigation and asks for confirmation on unload while a view holds
/// unsaved changes.
///
/// A new guard is inactive and leaves the gate alone. Dropping an active
/// guard removes its unload listener and sets the gate to
/// [`GateState::Released`].
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use wayfinder_pages::{GateState, MemoryHistory, NavigationGate, UnsavedChangesGuard};
///
/// let history = Rc::new(MemoryHistory::new("/edit").unwrap());
/// let gate = NavigationGate::new();
/// let guard = UnsavedChangesGuard::new(gate.clone(), history.clone());
///
/// guard.set_active(true);
/// assert_eq!(gate.state(), GateState::Blocked);
/// assert!(history.simulate_unload().requests_confirmation());
///
/// drop(guard);
/// assert_eq!(gate.state(), GateState::Released);
/// assert!(!history.simulate_unload().requests_confirmation());
/// ```
pub struct UnsavedChangesGuard {
	gate: NavigationGate,
	signal: Rc<dyn UnloadSignal>,
	listener: Rc<dyn Fn(&UnloadRequest)>,
	installed: Cell<Option<ListenerId>>,
	active: Cell<bool>,
}

impl UnsavedChangesGuard {
	pub fn new(gate: NavigationGate, signal: Rc<dyn UnloadSignal>) -> Self {
		Self {
			gate,
			signal,
			listener: Rc::new(confirm_unload),
			installed: Cell::new(None),
			active: Cell::new(false),
		}
	}

	/// Turns the guard on or off.
	///
	/// Calling this repeatedly with the same value installs at most one
	/// unload listener.
	pub fn set_active(&self, active: bool) {
		let was_active = self.active.replace(active);
		if active {
			if self.installed.get().is_none() {
				let id = self.signal.add_unload_listener(Rc::clone(&self.listener));
				self.installed.set(Some(id));
			}
			self.gate.set(GateState::Blocked);
		} else {
			self.uninstall();
			if was_active {
				self.gate.set(GateState::Allowed);
			}
		}
		tracing::debug!(active, "unsaved changes guard toggled");
	}

	pub fn is_active(&self) -> bool {
		self.active.get()
	}

	pub fn gate(&self) -> &NavigationGate {
		&self.gate
	}

	fn uninstall(&self) {
		if let Some(id) = self.installed.take() {
			self.signal.remove_unload_listener(id);
		}
	}
}

impl fmt::Debug for UnsavedChangesGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UnsavedChangesGuard")
			.field("active", &self.active.get())
			.field("installed", &self.installed.get())
			.field("gate", &self.gate.state())
			.finish()
	}
}

impl Drop for UnsavedChangesGuard {
	fn drop(&mut self) {
		self.uninstall();
		if self.active.get() {
			self.gate.set(GateState::Released);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryHistory;
	use rstest::{fixture, rstest};

	#[fixture]
	fn history() -> Rc<MemoryHistory> {
		Rc::new(MemoryHistory::new("/").unwrap())
	}

	#[rstest]
	#[case(GateState::Allowed, true)]
	#[case(GateState::Blocked, false)]
	#[case(GateState::Released, true)]
	fn test_gate_state_allows_navigation(#[case] state: GateState, #[case] expected: bool) {
		assert_eq!(state.allows_navigation(), expected);
	}

	#[rstest]
	fn test_gate_clones_share_state() {
		let gate = NavigationGate::new();
		let other = gate.clone();

		other.set(GateState::Blocked);

		assert!(!gate.allows_navigation());
	}

	#[rstest]
	fn test_new_guard_is_inactive(history: Rc<MemoryHistory>) {
		let gate = NavigationGate::new();
		let guard = UnsavedChangesGuard::new(gate.clone(), history.clone());

		assert!(!guard.is_active());
		assert_eq!(gate.state(), GateState::Allowed);
		assert_eq!(history.unload_listener_count(), 0);
	}

	#[rstest]
	fn test_activation_is_idempotent(history: Rc<MemoryHistory>) {
		let gate = NavigationGate::new();
		let guard = UnsavedChangesGuard::new(gate.clone(), history.clone());

		guard.set_active(true);
		guard.set_active(true);

		assert_eq!(history.unload_listener_count(), 1);
		assert_eq!(gate.state(), GateState::Blocked);

		let request = history.simulate_unload();
		assert!(request.is_default_prevented());
		assert_eq!(request.return_value().as_deref(), Some(""));
	}

	#[rstest]
	fn test_deactivation_allows_and_removes_listener(history: Rc<MemoryHistory>) {
		let gate = NavigationGate::new();
		let guard = UnsavedChangesGuard::new(gate.clone(), history.clone());

		guard.set_active(true);
		guard.set_active(false);
		guard.set_active(false);

		assert_eq!(gate.state(), GateState::Allowed);
		assert_eq!(history.unload_listener_count(), 0);
		assert!(!history.simulate_unload().requests_confirmation());
	}

	#[rstest]
	fn test_drop_releases_gate(history: Rc<MemoryHistory>) {
		let gate = NavigationGate::new();
		{
			let guard = UnsavedChangesGuard::new(gate.clone(), history.clone());
			guard.set_active(true);
		}

		assert_eq!(gate.state(), GateState::Released);
		assert!(gate.allows_navigation());
		assert_eq!(history.unload_listener_count(), 0);
	}

	#[rstest]
	fn test_deactivating_an_inactive_guard_keeps_block(history: Rc<MemoryHistory>) {
		// Arrange
		let gate = NavigationGate::new();
		let first = UnsavedChangesGuard::new(gate.clone(), history.clone());
		let second = UnsavedChangesGuard::new(gate.clone(), history.clone());
		first.set_active(true);

		// Act
		second.set_active(false);

		// Assert
		assert_eq!(gate.state(), GateState::Blocked);
		assert!(history.simulate_unload().requests_confirmation());
	}

	#[rstest]
	fn test_dropping_an_inactive_guard_keeps_block(history: Rc<MemoryHistory>) {
		// Arrange
		let gate = NavigationGate::new();
		let editor = UnsavedChangesGuard::new(gate.clone(), history.clone());
		editor.set_active(true);

		// Act
		{
			let _other = UnsavedChangesGuard::new(gate.clone(), history.clone());
		}

		// Assert
		assert_eq!(gate.state(), GateState::Blocked);
		assert!(editor.is_active());
		assert_eq!(history.unload_listener_count(), 1);
	}

	#[rstest]
	fn test_last_active_writer_wins_between_guards(history: Rc<MemoryHistory>) {
		// Arrange
		let gate = NavigationGate::new();
		let first = UnsavedChangesGuard::new(gate.clone(), history.clone());
		let second = UnsavedChangesGuard::new(gate.clone(), history.clone());
		first.set_active(true);
		second.set_active(true);

		// Act
		second.set_active(false);

		// Assert
		assert_eq!(gate.state(), GateState::Allowed);
		// The first guard still asks for confirmation on unload.
		assert!(history.simulate_unload().requests_confirmation());
	}
}

//! Navigation controller.
//!
//! [`Router`] is the single place that writes the session history and the
//! four navigation buses. Every change goes through [`Router::navigate`] or
//! the traversal listener, both of which re-derive route, path, path
//! parameters and query parameters from the environment's address.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use wayfinder_reactive::Bus;
use wayfinder_urls::query::{decode_query, params_to_search};
use wayfinder_urls::{Params, PatternError, Route, RouterError};

use crate::config::{NavigateOptions, RouterConfig};
use crate::context::NavigationContext;
use crate::guard::{NavigationGate, UnloadSignal, UnsavedChangesGuard};
use crate::history::{History, NavigationType};
use crate::link::{self, ClickEvent, LinkDecision};

/// Partial query update: `None` removes the key.
pub type QueryUpdate = IndexMap<String, Option<String>>;

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
	/// The request was handed to the environment.
	Committed,
	/// An unsaved-changes guard refused the navigation.
	Blocked,
	/// The target route name does not exist or its path could not be built.
	Unresolved,
	/// The environment refused to write the history entry, for example a
	/// cross-origin URL. Nothing changed.
	Rejected,
}

impl NavigationOutcome {
	pub fn is_committed(self) -> bool {
		self == NavigationOutcome::Committed
	}
}

struct RouterInner<V: 'static> {
	context: NavigationContext<V>,
	history: Rc<dyn History>,
	config: RouterConfig,
	route: Bus<Option<Rc<Route<V>>>>,
	path: Bus<String>,
	params: Bus<Rc<Params>>,
	query_params: Bus<Rc<Params>>,
	/// Buses whose staged value has not been published yet.
	pending: Cell<u8>,
	reacting: Cell<bool>,
}

const ROUTE_PENDING: u8 = 1;
const PATH_PENDING: u8 = 1 << 1;
const PARAMS_PENDING: u8 = 1 << 2;
const QUERY_PENDING: u8 = 1 << 3;

/// Clears the reentrancy marker when the traversal reaction ends.
struct Reacting<'a>(&'a Cell<bool>);

impl<'a> Reacting<'a> {
	fn enter(flag: &'a Cell<bool>) -> Option<Self> {
		if flag.replace(true) {
			return None;
		}
		Some(Self(flag))
	}
}

impl Drop for Reacting<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

/// Client-side router.
///
/// Cloning is cheap and every clone drives the same state.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use wayfinder_pages::{MemoryHistory, NavigationContext, Router, RouterConfig};
/// use wayfinder_urls::Params;
///
/// let history = Rc::new(MemoryHistory::new("/").unwrap());
/// let router = Router::new(NavigationContext::new(), history, RouterConfig::default());
/// router.define_route("home", "/", "Home", None).unwrap();
/// router.define_route("user", "/users/:id", "User", None).unwrap();
/// assert_eq!(router.route_name().as_deref(), Some("home"));
///
/// let mut params = Params::new();
/// params.insert("id".to_string(), "5".to_string());
/// router.go("user", &params, &Params::new(), None);
///
/// assert_eq!(router.route_name().as_deref(), Some("user"));
/// assert_eq!(router.param("id").as_deref(), Some("5"));
/// ```
pub struct Router<V: 'static> {
	inner: Rc<RouterInner<V>>,
}

impl<V: 'static> Clone for Router<V> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<V: 'static> fmt::Debug for Router<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("route", &self.route_name())
			.field("path", &self.current_path())
			.field("gate", &self.inner.context.gate().state())
			.field("routes", &self.inner.context.route_count())
			.finish()
	}
}

impl<V: 'static> Router<V> {
	/// Creates a router over `context` and `history`.
	///
	/// The path and query buses start from the current address; the route bus
	/// starts empty unless `context` already holds a matching route. The
	/// router subscribes to history traversals once, here.
	pub fn new(context: NavigationContext<V>, history: Rc<dyn History>, config: RouterConfig) -> Self {
		let location = history.location();
		let inner = Rc::new(RouterInner {
			context,
			route: Bus::new(None),
			path: Bus::new(location.path_and_query()),
			params: Bus::new(Rc::new(Params::new())),
			query_params: Bus::new(Rc::new(decode_query(&location.query))),
			history,
			config,
			pending: Cell::new(0),
			reacting: Cell::new(false),
		});

		let weak: Weak<RouterInner<V>> = Rc::downgrade(&inner);
		inner.history.listen(Rc::new(move || {
			if let Some(inner) = weak.upgrade() {
				Router { inner }.handle_history_change();
			}
		}));

		let router = Self { inner };
		if let Some(route) = router.inner.context.find_first_match(&location.path) {
			router.commit(Some(route));
		}
		router
	}

	/// Registers a route.
	///
	/// While no route is active, a newly registered route that matches the
	/// current address becomes the current route. Registering an existing
	/// name does nothing and returns `Ok(None)`.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if `template` cannot be compiled.
	pub fn define_route(
		&self,
		name: &str,
		template: &str,
		component: V,
		layout: Option<V>,
	) -> Result<Option<Rc<Route<V>>>, PatternError> {
		let registered = self
			.inner
			.context
			.register(name, template, component, layout)?;

		if let Some(route) = &registered
			&& self.inner.route.with(Option::is_none)
			&& route.test(&self.inner.history.location().path)
		{
			self.commit(Some(Rc::clone(route)));
		}
		Ok(registered)
	}

	/// Navigates to `to`, a path with optional query string and fragment.
	///
	/// `None` options fall back to [`RouterConfig::navigate_options`].
	pub fn navigate(&self, to: &str, options: Option<NavigateOptions>) -> NavigationOutcome {
		if !self.inner.context.gate().allows_navigation() {
			tracing::debug!(to, "navigation blocked by unsaved changes");
			return NavigationOutcome::Blocked;
		}

		let options = options.unwrap_or_else(|| self.inner.config.navigate_options());
		let kind = if options.replace_state {
			NavigationType::Replace
		} else {
			NavigationType::Push
		};
		if let Err(err) = self.inner.history.write(to, kind) {
			tracing::warn!(to, error = %err, "navigation rejected by the environment");
			return NavigationOutcome::Rejected;
		}
		if options.scroll_to_top {
			self.inner.history.schedule_scroll_to_top();
		}
		tracing::debug!(to, ?kind, "navigating");

		self.resolve();
		NavigationOutcome::Committed
	}

	/// Navigates to `to`, pushing a history entry.
	pub fn push(&self, to: &str) -> NavigationOutcome {
		let options = self.inner.config.navigate_options().with_replace_state(false);
		self.navigate(to, Some(options))
	}

	/// Navigates to `to`, replacing the current history entry.
	pub fn replace(&self, to: &str) -> NavigationOutcome {
		let options = self.inner.config.navigate_options().with_replace_state(true);
		self.navigate(to, Some(options))
	}

	/// Navigates to an absolute path or a named route.
	///
	/// A `target` starting with `/` is used as is and `params`/`query` are
	/// ignored. Anything else is a route name; unknown names are logged and
	/// yield [`NavigationOutcome::Unresolved`] without touching the history.
	pub fn go(
		&self,
		target: &str,
		params: &Params,
		query: &Params,
		options: Option<NavigateOptions>,
	) -> NavigationOutcome {
		if target.starts_with('/') {
			return self.navigate(target, options);
		}

		match self.create_link(target, params, query) {
			Ok(link) => self.navigate(&link, options),
			Err(_) => NavigationOutcome::Unresolved,
		}
	}

	/// Builds `path?query` for the route named `name`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidRouteName`] for unknown names and
	/// [`RouterError::MissingParameter`] when `params` lacks a required
	/// value. Both are also logged.
	pub fn create_link(&self, name: &str, params: &Params, query: &Params) -> Result<String, RouterError> {
		let result = self
			.inner
			.context
			.find_by_name(name)
			.and_then(|route| route.create_path(params));

		match result {
			Ok(path) => Ok(format!("{}{}", path, params_to_search(query))),
			Err(err) => {
				tracing::error!(route = name, error = %err, "failed to create link");
				Err(err)
			}
		}
	}

	/// Merges `partial` into the current path parameters and navigates to the
	/// rebuilt path, keeping the current query string.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NoActiveRoute`] when no route is active, or
	/// [`RouterError::MissingParameter`] if the merged parameters cannot
	/// build the route's path.
	pub fn set_params(
		&self,
		partial: &Params,
		options: Option<NavigateOptions>,
	) -> Result<NavigationOutcome, RouterError> {
		let Some(route) = self.current_route() else {
			tracing::warn!("set_params called without an active route");
			return Err(RouterError::NoActiveRoute);
		};

		let mut merged = (*self.params()).clone();
		merged.extend(partial.iter().map(|(key, value)| (key.clone(), value.clone())));
		let path = route.create_path(&merged)?;
		let query = self.inner.history.location().query;

		Ok(self.navigate(&format!("{}{}", path, query), options))
	}

	/// Sets a single path parameter. See [`set_params`](Self::set_params).
	pub fn set_param(
		&self,
		key: &str,
		value: impl Into<String>,
		options: Option<NavigateOptions>,
	) -> Result<NavigationOutcome, RouterError> {
		let mut partial = Params::new();
		partial.insert(key.to_string(), value.into());
		self.set_params(&partial, options)
	}

	/// Merges `partial` into the current query parameters and navigates to
	/// the current path with the new query string.
	pub fn set_query_params(&self, partial: &QueryUpdate, options: Option<NavigateOptions>) -> NavigationOutcome {
		let mut merged = (*self.query_params()).clone();
		for (key, value) in partial {
			match value {
				Some(value) => {
					merged.insert(key.clone(), value.clone());
				}
				None => {
					merged.shift_remove(key);
				}
			}
		}

		let path = self.inner.history.location().path;
		self.navigate(&format!("{}{}", path, params_to_search(&merged)), options)
	}

	/// Sets or, with `None`, removes a single query parameter.
	pub fn set_query_param(
		&self,
		key: &str,
		value: Option<&str>,
		options: Option<NavigateOptions>,
	) -> NavigationOutcome {
		let mut partial = QueryUpdate::new();
		partial.insert(key.to_string(), value.map(str::to_string));
		self.set_query_params(&partial, options)
	}

	/// Goes one entry back in the session history.
	pub fn back(&self) -> NavigationOutcome {
		self.go_back(1)
	}

	/// Goes `steps` entries back in the session history.
	///
	/// The traversal itself completes asynchronously; the buses update when
	/// the environment reports it.
	pub fn go_back(&self, steps: i32) -> NavigationOutcome {
		if !self.inner.context.gate().allows_navigation() {
			tracing::debug!(steps, "history traversal blocked by unsaved changes");
			return NavigationOutcome::Blocked;
		}
		self.inner.history.go(steps.saturating_neg());
		NavigationOutcome::Committed
	}

	/// Routes a document click through the link interceptor.
	///
	/// Returns `true` when the click was taken over, in which case the caller
	/// must prevent the browser's default action.
	pub fn handle_click(&self, event: &ClickEvent) -> bool {
		let current = format!(
			"{}{}",
			self.inner.history.origin(),
			self.inner.history.location()
		);

		match link::intercept(event, &current) {
			LinkDecision::Navigate(to) => {
				self.navigate(&to, None);
				true
			}
			LinkDecision::Ignore(reason) => {
				tracing::trace!(?reason, "click left to the browser");
				false
			}
		}
	}

	/// Reacts to a back/forward traversal reported by the environment.
	///
	/// While navigation is blocked the last known path is pushed back onto
	/// the address bar and the buses are left alone.
	pub fn handle_history_change(&self) {
		let Some(_reacting) = Reacting::enter(&self.inner.reacting) else {
			return;
		};

		if !self.inner.context.gate().allows_navigation() {
			let last = self.inner.path.state();
			tracing::debug!(path = %last, "traversal blocked, restoring address");
			if let Err(err) = self.inner.history.push(&last) {
				tracing::error!(path = %last, error = %err, "failed to restore address");
			}
			return;
		}

		self.resolve();
	}

	/// Creates an unsaved-changes guard bound to this router's gate.
	pub fn guard(&self, signal: Rc<dyn UnloadSignal>) -> UnsavedChangesGuard {
		UnsavedChangesGuard::new(self.inner.context.gate().clone(), signal)
	}

	pub fn current_route(&self) -> Option<Rc<Route<V>>> {
		self.inner.route.state()
	}

	pub fn route_name(&self) -> Option<String> {
		self.inner
			.route
			.with(|route| route.as_ref().map(|route| route.name().to_string()))
	}

	/// Current path and query string.
	pub fn current_path(&self) -> String {
		self.inner.path.state()
	}

	pub fn params(&self) -> Rc<Params> {
		self.inner.params.state()
	}

	pub fn query_params(&self) -> Rc<Params> {
		self.inner.query_params.state()
	}

	pub fn param(&self, key: &str) -> Option<String> {
		self.inner.params.with(|params| params.get(key).cloned())
	}

	pub fn query_param(&self, key: &str) -> Option<String> {
		self.inner.query_params.with(|params| params.get(key).cloned())
	}

	pub fn route_bus(&self) -> Bus<Option<Rc<Route<V>>>> {
		self.inner.route.clone()
	}

	pub fn path_bus(&self) -> Bus<String> {
		self.inner.path.clone()
	}

	pub fn params_bus(&self) -> Bus<Rc<Params>> {
		self.inner.params.clone()
	}

	pub fn query_params_bus(&self) -> Bus<Rc<Params>> {
		self.inner.query_params.clone()
	}

	pub fn context(&self) -> &NavigationContext<V> {
		&self.inner.context
	}

	pub fn gate(&self) -> &NavigationGate {
		self.inner.context.gate()
	}

	pub fn config(&self) -> &RouterConfig {
		&self.inner.config
	}

	pub fn history(&self) -> &Rc<dyn History> {
		&self.inner.history
	}

	fn resolve(&self) {
		let path = self.inner.history.location().path;
		let route = self.inner.context.find_first_match(&path);
		if route.is_none() {
			tracing::debug!(path, "no route matches");
		}
		self.commit(route);
	}

	/// Stages all four buses from the current address, then notifies the ones
	/// that changed, so every subscriber observes a consistent set.
	///
	/// A subscriber may navigate again while being notified. The nested commit
	/// flushes every pending bus with the newest values, and this commit then
	/// skips whatever was already published.
	fn commit(&self, route: Option<Rc<Route<V>>>) {
		let location = self.inner.history.location();
		let params = route
			.as_ref()
			.map(|route| route.params(&location.path))
			.unwrap_or_default();
		let query = decode_query(&location.query);

		let mut staged = 0;
		if self.inner.route.replace(route) {
			staged |= ROUTE_PENDING;
		}
		if self.inner.path.replace(location.path_and_query()) {
			staged |= PATH_PENDING;
		}
		if self.inner.params.replace(Rc::new(params)) {
			staged |= PARAMS_PENDING;
		}
		if self.inner.query_params.replace(Rc::new(query)) {
			staged |= QUERY_PENDING;
		}
		self.inner.pending.set(self.inner.pending.get() | staged);

		if self.take_pending(ROUTE_PENDING) {
			self.inner.route.notify();
		}
		if self.take_pending(PATH_PENDING) {
			self.inner.path.notify();
		}
		if self.take_pending(PARAMS_PENDING) {
			self.inner.params.notify();
		}
		if self.take_pending(QUERY_PENDING) {
			self.inner.query_params.notify();
		}
	}

	fn take_pending(&self, flag: u8) -> bool {
		let pending = self.inner.pending.get();
		self.inner.pending.set(pending & !flag);
		pending & flag != 0
	}
}

//! Shared navigation context: the route registry plus the navigation gate.

use std::cell::RefCell;
use std::rc::Rc;

use wayfinder_urls::{PatternError, PatternLimits, Route, RouteRegistry, RouterError};

use crate::config::RouterConfig;
use crate::guard::NavigationGate;

/// Owns the state every part of one application's navigation agrees on.
///
/// Registry borrows never escape a method call, so route subscribers may
/// define routes while a navigation is being published.
#[derive(Debug)]
pub struct NavigationContext<V> {
	registry: RefCell<RouteRegistry<V>>,
	gate: NavigationGate,
}

impl<V> Default for NavigationContext<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> NavigationContext<V> {
	pub fn new() -> Self {
		Self::with_limits(PatternLimits::default())
	}

	pub fn with_limits(limits: PatternLimits) -> Self {
		Self {
			registry: RefCell::new(RouteRegistry::with_limits(limits)),
			gate: NavigationGate::new(),
		}
	}

	/// Creates a context whose registry uses the limits from `config`.
	pub fn from_config(config: &RouterConfig) -> Self {
		Self::with_limits(config.pattern_limits())
	}

	pub fn gate(&self) -> &NavigationGate {
		&self.gate
	}

	/// See [`RouteRegistry::register`].
	pub fn register(
		&self,
		name: &str,
		template: &str,
		component: V,
		layout: Option<V>,
	) -> Result<Option<Rc<Route<V>>>, PatternError> {
		self.registry
			.borrow_mut()
			.register(name, template, component, layout)
	}

	pub fn find_by_name(&self, name: &str) -> Result<Rc<Route<V>>, RouterError> {
		self.registry.borrow().find_by_name(name)
	}

	pub fn find_first_match(&self, path: &str) -> Option<Rc<Route<V>>> {
		self.registry.borrow().find_first_match(path)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.registry.borrow().contains(name)
	}

	pub fn route_count(&self) -> usize {
		self.registry.borrow().len()
	}

	/// Runs `f` with a shared borrow of the registry.
	pub fn with_registry<R>(&self, f: impl FnOnce(&RouteRegistry<V>) -> R) -> R {
		f(&self.registry.borrow())
	}
}

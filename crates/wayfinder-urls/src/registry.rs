//! Route definitions and the ordered route registry.

use std::fmt;
use std::rc::Rc;

use crate::Params;
use crate::error::{PatternError, RouterError};
use crate::pattern::{PathPattern, PatternLimits};

/// A named mapping from a path template to a view and a layout.
///
/// `V` is opaque to the router; it is whatever the view layer renders
/// (a component factory, an enum of pages, ...). A `layout` of `None` means
/// the view is rendered without a wrapping layout.
pub struct Route<V> {
	name: String,
	pattern: PathPattern,
	component: V,
	layout: Option<V>,
}

impl<V> Route<V> {
	/// Creates a route from an already compiled pattern.
	pub fn new(name: impl Into<String>, pattern: PathPattern, component: V, layout: Option<V>) -> Self {
		Self {
			name: name.into(),
			pattern,
			component,
			layout,
		}
	}

	/// Returns the unique route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the raw template string.
	pub fn path(&self) -> &str {
		self.pattern.template()
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns the view value.
	pub fn component(&self) -> &V {
		&self.component
	}

	/// Returns the layout value, if any.
	pub fn layout(&self) -> Option<&V> {
		self.layout.as_ref()
	}

	/// Tests whether `path` matches this route.
	pub fn test(&self, path: &str) -> bool {
		self.pattern.is_match(path)
	}

	/// Extracts the path parameters of `path` according to this route.
	pub fn params(&self, path: &str) -> Params {
		self.pattern.extract_params(path)
	}

	/// Builds a concrete path for this route from `params`.
	pub fn create_path(&self, params: &Params) -> Result<String, RouterError> {
		self.pattern.build_path(params)
	}
}

impl<V> fmt::Debug for Route<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("name", &self.name)
			.field("path", &self.pattern.template())
			.field("has_layout", &self.layout.is_some())
			.finish()
	}
}

/// Ordered, append-only collection of routes.
///
/// Registration order decides precedence: [`find_first_match`] returns the
/// earliest route that matches. Names are unique and the first registration
/// of a name wins.
///
/// [`find_first_match`]: RouteRegistry::find_first_match
pub struct RouteRegistry<V> {
	routes: Vec<Rc<Route<V>>>,
	limits: PatternLimits,
}

impl<V> Default for RouteRegistry<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> fmt::Debug for RouteRegistry<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteRegistry")
			.field("routes", &self.routes.iter().map(|r| r.name()).collect::<Vec<_>>())
			.field("limits", &self.limits)
			.finish()
	}
}

impl<V> RouteRegistry<V> {
	/// Creates an empty registry with the default [`PatternLimits`].
	pub fn new() -> Self {
		Self::with_limits(PatternLimits::default())
	}

	/// Creates an empty registry that compiles templates with `limits`.
	pub fn with_limits(limits: PatternLimits) -> Self {
		Self {
			routes: Vec::new(),
			limits,
		}
	}

	/// Registers a route.
	///
	/// Returns `Ok(None)` without touching the registry when `name` is
	/// already taken, and `Ok(Some(route))` when the route was appended.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if `template` cannot be compiled.
	pub fn register(
		&mut self,
		name: &str,
		template: &str,
		component: V,
		layout: Option<V>,
	) -> Result<Option<Rc<Route<V>>>, PatternError> {
		if self.contains(name) {
			tracing::debug!(route = name, "route already registered, keeping the first definition");
			return Ok(None);
		}

		let pattern = PathPattern::compile_with_limits(template, self.limits)?;
		let route = Rc::new(Route::new(name, pattern, component, layout));
		self.routes.push(Rc::clone(&route));
		tracing::debug!(route = name, template, "route registered");
		Ok(Some(route))
	}

	/// Looks a route up by name.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidRouteName`] if no route has that name.
	pub fn find_by_name(&self, name: &str) -> Result<Rc<Route<V>>, RouterError> {
		self.routes
			.iter()
			.find(|route| route.name() == name)
			.cloned()
			.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))
	}

	/// Returns the first route, in registration order, that matches `path`.
	pub fn find_first_match(&self, path: &str) -> Option<Rc<Route<V>>> {
		self.routes.iter().find(|route| route.test(path)).cloned()
	}

	/// Returns the first registered catch-all route.
	pub fn catch_all(&self) -> Option<Rc<Route<V>>> {
		self.routes
			.iter()
			.find(|route| route.pattern().is_catch_all())
			.cloned()
	}

	/// Returns whether a route named `name` exists.
	pub fn contains(&self, name: &str) -> bool {
		self.routes.iter().any(|route| route.name() == name)
	}

	/// Returns the number of registered routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether the registry is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Iterates over the routes in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &Rc<Route<V>>> {
		self.routes.iter()
	}

	/// Returns the limits used to compile templates.
	pub fn limits(&self) -> PatternLimits {
		self.limits
	}
}

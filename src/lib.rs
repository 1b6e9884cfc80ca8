//! # Wayfinder
//!
//! A client-side navigation engine: it maps URL paths to application views,
//! keeps the current route, path, path parameters and query parameters in
//! reactive buses synchronized with the address bar, and routes every path
//! change through one place so unsaved-changes guards and scroll behavior
//! apply uniformly.
//!
//! ## Crates
//!
//! - [`reactive`]: the single-value publish/subscribe [`Bus`](reactive::Bus)
//! - [`urls`]: route templates, the route registry and the query codec
//! - [`pages`]: the [`Router`](pages::Router), guards, link interception and
//!   the history environments
//!
//! ## Feature Flags
//!
//! - `browser` - `web-sys` bindings for `window.history`, `popstate`,
//!   `beforeunload` and document link clicks (wasm32 only)
//!
//! ## Quick Example
//!
//! ```
//! use std::rc::Rc;
//! use wayfinder::prelude::*;
//!
//! let history = Rc::new(MemoryHistory::new("/").unwrap());
//! let router = Router::new(NavigationContext::new(), history.clone(), RouterConfig::default());
//! router.define_route("home", "/", "Home", None).unwrap();
//! router.define_route("article", "/articles/:slug", "Article", None).unwrap();
//!
//! router.navigate("/articles/hello?lang=en", None);
//! assert_eq!(router.param("slug").as_deref(), Some("hello"));
//! assert_eq!(router.query_param("lang").as_deref(), Some("en"));
//!
//! let guard = router.guard(history);
//! guard.set_active(true);
//! assert_eq!(router.navigate("/", None), NavigationOutcome::Blocked);
//! ```

pub use wayfinder_pages as pages;
pub use wayfinder_reactive as reactive;
pub use wayfinder_urls as urls;

pub mod prelude {
	pub use wayfinder_pages::{
		Anchor, ClickEvent, GateState, History, Location, MemoryHistory, NavigateOptions,
		NavigationContext, NavigationGate, NavigationOutcome, QueryUpdate, Router, RouterConfig,
		UnloadSignal, UnsavedChangesGuard,
	};
	pub use wayfinder_reactive::{Bus, Identity, Subscription, SubscriptionGuard};
	pub use wayfinder_urls::{Params, PathPattern, Route, RouteRegistry, RouterError};

	#[cfg(all(target_arch = "wasm32", feature = "browser"))]
	pub use wayfinder_pages::{BrowserHistory, install_link_interceptor};
}

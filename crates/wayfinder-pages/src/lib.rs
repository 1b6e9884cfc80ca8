//! Client-side navigation for wayfinder.
//!
//! The [`Router`] keeps four reactive buses (current route, path, path
//! parameters, query parameters) in step with the host's address bar. The
//! host is reached only through the [`History`] and [`UnloadSignal`] traits:
//!
//! - [`MemoryHistory`] implements both in plain data, for tests and
//!   non-browser hosts.
//! - `BrowserHistory` (wasm32 with the `browser` feature) implements them
//!   with `web-sys`, and `install_link_interceptor` turns same-origin link
//!   clicks into router navigations.
//!
//! Navigation can be paused with an [`UnsavedChangesGuard`], which blocks
//! in-app navigation and asks for confirmation before the page unloads.

pub mod config;
pub mod context;
pub mod guard;
pub mod history;
pub mod link;
pub mod memory;
pub mod navigation;

#[cfg(all(target_arch = "wasm32", feature = "browser"))]
pub mod browser;

pub use config::{ConfigError, NavigateOptions, RouterConfig};
pub use context::NavigationContext;
pub use guard::{GateState, ListenerId, NavigationGate, UnloadRequest, UnloadSignal, UnsavedChangesGuard};
pub use history::{History, HistoryError, Location, NavigationType};
pub use link::{Anchor, ClickEvent, IgnoreReason, LinkDecision};
pub use memory::MemoryHistory;
pub use navigation::{NavigationOutcome, QueryUpdate, Router};

#[cfg(all(target_arch = "wasm32", feature = "browser"))]
pub use browser::{BrowserHistory, LinkInterceptor, install_link_interceptor};

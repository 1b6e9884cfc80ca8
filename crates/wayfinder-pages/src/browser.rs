//! Browser environment built on `web-sys`.
//!
//! Only compiled for `wasm32` with the `browser` feature.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{BeforeUnloadEvent, Document, Event, HtmlAnchorElement, MouseEvent, Window};

use crate::guard::{ListenerId, UnloadRequest, UnloadSignal};
use crate::history::{History, HistoryError, Location};
use crate::link::{Anchor, ClickEvent};
use crate::navigation::Router;

type Listener = Closure<dyn FnMut(Event)>;

/// [`History`] and [`UnloadSignal`] over `window.history`, `popstate` and
/// `beforeunload`.
///
/// Listeners are removed from the window when this value is dropped.
pub struct BrowserHistory {
	window: Window,
	popstate: RefCell<Vec<Listener>>,
	unload: RefCell<BTreeMap<ListenerId, Listener>>,
	next_listener_id: Cell<u64>,
}

impl BrowserHistory {
	/// Binds to the global `window`.
	pub fn new() -> Result<Self, JsValue> {
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
		Ok(Self {
			window,
			popstate: RefCell::new(Vec::new()),
			unload: RefCell::new(BTreeMap::new()),
			next_listener_id: Cell::new(0),
		})
	}

	fn session_history(&self) -> Option<web_sys::History> {
		match self.window.history() {
			Ok(history) => Some(history),
			Err(err) => {
				tracing::error!(error = ?err, "window.history is unavailable");
				None
			}
		}
	}

	fn require_session_history(&self) -> Result<web_sys::History, HistoryError> {
		self.session_history()
			.ok_or_else(|| HistoryError::Environment("window.history is unavailable".to_string()))
	}
}

impl History for BrowserHistory {
	fn location(&self) -> Location {
		let location = self.window.location();
		Location {
			path: location.pathname().unwrap_or_else(|_| "/".to_string()),
			query: location.search().unwrap_or_default(),
			fragment: location.hash().unwrap_or_default(),
		}
	}

	fn origin(&self) -> String {
		self.window.location().origin().unwrap_or_default()
	}

	fn push(&self, url: &str) -> Result<(), HistoryError> {
		self.require_session_history()?
			.push_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(|err| {
				tracing::error!(url, error = ?err, "pushState failed");
				HistoryError::Environment(format!("pushState failed: {:?}", err))
			})
	}

	fn replace(&self, url: &str) -> Result<(), HistoryError> {
		self.require_session_history()?
			.replace_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(|err| {
				tracing::error!(url, error = ?err, "replaceState failed");
				HistoryError::Environment(format!("replaceState failed: {:?}", err))
			})
	}

	fn go(&self, delta: i32) {
		if let Some(history) = self.session_history()
			&& let Err(err) = history.go_with_delta(delta)
		{
			tracing::error!(delta, error = ?err, "history.go failed");
		}
	}

	fn listen(&self, listener: Rc<dyn Fn()>) {
		let handler = Closure::wrap(Box::new(move |_event: Event| listener()) as Box<dyn FnMut(Event)>);
		match self
			.window
			.add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref::<Function>())
		{
			Ok(()) => self.popstate.borrow_mut().push(handler),
			Err(err) => tracing::error!(error = ?err, "failed to listen for popstate"),
		}
	}

	fn schedule_scroll_to_top(&self) {
		let window = self.window.clone();
		let callback = Closure::once_into_js(move || window.scroll_to_with_x_and_y(0.0, 0.0));
		if let Err(err) = self
			.window
			.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref::<Function>(), 0)
		{
			tracing::error!(error = ?err, "failed to schedule scroll to top");
		}
	}
}

impl UnloadSignal for BrowserHistory {
	fn add_unload_listener(&self, listener: Rc<dyn Fn(&UnloadRequest)>) -> ListenerId {
		let id = ListenerId(self.next_listener_id.get());
		self.next_listener_id.set(id.0 + 1);

		let handler = Closure::wrap(Box::new(move |event: Event| {
			let request = UnloadRequest::new();
			listener(&request);
			if request.is_default_prevented() {
				event.prevent_default();
			}
			if let Some(value) = request.return_value()
				&& let Some(event) = event.dyn_ref::<BeforeUnloadEvent>()
			{
				event.set_return_value(&value);
			}
		}) as Box<dyn FnMut(Event)>);

		match self
			.window
			.add_event_listener_with_callback("beforeunload", handler.as_ref().unchecked_ref::<Function>())
		{
			Ok(()) => {
				self.unload.borrow_mut().insert(id, handler);
			}
			Err(err) => tracing::error!(error = ?err, "failed to listen for beforeunload"),
		}
		id
	}

	fn remove_unload_listener(&self, id: ListenerId) {
		if let Some(handler) = self.unload.borrow_mut().remove(&id) {
			let _ = self
				.window
				.remove_event_listener_with_callback("beforeunload", handler.as_ref().unchecked_ref::<Function>());
		}
	}
}

impl Drop for BrowserHistory {
	fn drop(&mut self) {
		for handler in self.popstate.borrow_mut().drain(..) {
			let _ = self
				.window
				.remove_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref::<Function>());
		}
		let ids: Vec<ListenerId> = self.unload.borrow().keys().copied().collect();
		for id in ids {
			self.remove_unload_listener(id);
		}
	}
}

/// Document-level click listener that routes same-origin link clicks through
/// a [`Router`].
///
/// Dropping the value removes the listener; call [`forget`](Self::forget) to
/// keep it for the lifetime of the page.
pub struct LinkInterceptor {
	document: Document,
	handler: Listener,
}

impl LinkInterceptor {
	/// Leaks the listener so it stays installed.
	pub fn forget(self) {
		std::mem::forget(self);
	}
}

impl Drop for LinkInterceptor {
	fn drop(&mut self) {
		let _ = self
			.document
			.remove_event_listener_with_callback("click", self.handler.as_ref().unchecked_ref::<Function>());
	}
}

/// Installs the link interceptor on the global document.
pub fn install_link_interceptor<V: 'static>(router: &Router<V>) -> Result<LinkInterceptor, JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("No document object"))?;

	let router = router.clone();
	let handler = Closure::wrap(Box::new(move |event: Event| {
		let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
			return;
		};
		let click = ClickEvent {
			button: mouse.button(),
			meta_key: mouse.meta_key(),
			ctrl_key: mouse.ctrl_key(),
			shift_key: mouse.shift_key(),
			alt_key: mouse.alt_key(),
			default_prevented: event.default_prevented(),
			anchor: closest_anchor(&event),
		};
		if router.handle_click(&click) {
			event.prevent_default();
		}
	}) as Box<dyn FnMut(Event)>);

	document.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref::<Function>())?;
	Ok(LinkInterceptor { document, handler })
}

/// First `<a>` on the event's composed path, so clicks inside shadow roots
/// and on nested elements resolve to their link.
fn closest_anchor(event: &Event) -> Option<Anchor> {
	let anchor = event
		.composed_path()
		.iter()
		.find_map(|target| target.dyn_into::<HtmlAnchorElement>().ok())?;

	let target = anchor.target();
	Some(Anchor {
		href: anchor.href(),
		target: (!target.is_empty()).then_some(target),
		download: anchor.has_attribute("download"),
	})
}

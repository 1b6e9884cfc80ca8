//! Router configuration and per-navigation options.
//!
//! Both types deserialize with serde and fall back to their defaults for
//! missing fields, so a partial `[router]` table is enough:
//!
//! ```toml
//! [router]
//! scroll_to_top = false
//! max_template_segments = 16
//! ```

use serde::{Deserialize, Serialize};
use wayfinder_urls::PatternLimits;
use wayfinder_urls::pattern::{MAX_TEMPLATE_LENGTH, MAX_TEMPLATE_SEGMENTS};

/// Error raised while loading a [`RouterConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The TOML document could not be parsed or has the wrong shape.
	#[error("Invalid router configuration: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Options recognized by [`Router::navigate`](crate::Router::navigate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigateOptions {
	/// Replace the current history entry instead of pushing a new one.
	pub replace_state: bool,
	/// Scroll to the origin after the view has re-rendered.
	pub scroll_to_top: bool,
}

impl Default for NavigateOptions {
	fn default() -> Self {
		Self {
			replace_state: false,
			scroll_to_top: true,
		}
	}
}

impl NavigateOptions {
	/// Default options with `replace_state` set.
	pub fn replace() -> Self {
		Self::default().with_replace_state(true)
	}

	/// Sets `replace_state`.
	pub fn with_replace_state(mut self, replace_state: bool) -> Self {
		self.replace_state = replace_state;
		self
	}

	/// Sets `scroll_to_top`.
	pub fn with_scroll_to_top(mut self, scroll_to_top: bool) -> Self {
		self.scroll_to_top = scroll_to_top;
		self
	}
}

/// Router-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Default for [`NavigateOptions::replace_state`].
	pub replace_state: bool,
	/// Default for [`NavigateOptions::scroll_to_top`].
	pub scroll_to_top: bool,
	/// Longest accepted route template, in bytes.
	pub max_template_length: usize,
	/// Most segments accepted in a route template.
	pub max_template_segments: usize,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			replace_state: false,
			scroll_to_top: true,
			max_template_length: MAX_TEMPLATE_LENGTH,
			max_template_segments: MAX_TEMPLATE_SEGMENTS,
		}
	}
}

#[derive(Deserialize)]
struct ConfigDocument {
	#[serde(default)]
	router: RouterConfig,
}

impl RouterConfig {
	/// Reads the `[router]` table of a TOML document.
	///
	/// A document without a `[router]` table yields the defaults.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Toml`] if the document is not valid TOML or a
	/// field has the wrong type.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let document: ConfigDocument = toml::from_str(source)?;
		Ok(document.router)
	}

	/// Options used when a navigation does not specify its own.
	pub fn navigate_options(&self) -> NavigateOptions {
		NavigateOptions {
			replace_state: self.replace_state,
			scroll_to_top: self.scroll_to_top,
		}
	}

	/// Template limits applied when registering routes.
	pub fn pattern_limits(&self) -> PatternLimits {
		PatternLimits {
			max_length: self.max_template_length,
			max_segments: self.max_template_segments,
		}
	}
}

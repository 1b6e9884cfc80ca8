//! Environment abstraction for the address bar and the session history.

use std::fmt;
use std::rc::Rc;

use url::Url;

/// Error raised when an environment cannot be set up from a URL or refuses
/// to write a history entry.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
	/// The URL could not be parsed or resolved.
	#[error("Invalid URL \"{url}\": {source}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	/// The URL resolves to another origin.
	#[error("Refusing to write cross-origin URL \"{url}\"")]
	CrossOrigin { url: String },

	/// The host environment rejected the write.
	#[error("History update failed: {0}")]
	Environment(String),
}

/// How a navigation writes the session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// Append a new entry.
	Push,
	/// Overwrite the current entry.
	Replace,
}

/// The address currently shown in the address bar.
///
/// `query` and `fragment` keep their leading `?` and `#`, and are empty when
/// absent, matching `location.search` and `location.hash`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
	pub path: String,
	pub query: String,
	pub fragment: String,
}

impl Location {
	/// Builds a location from an absolute URL.
	pub fn from_url(url: &Url) -> Self {
		Self {
			path: url.path().to_string(),
			query: prefixed('?', url.query()),
			fragment: prefixed('#', url.fragment()),
		}
	}

	/// Path followed by the query string; the value tracked by the path bus.
	pub fn path_and_query(&self) -> String {
		format!("{}{}", self.path, self.query)
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}{}", self.path, self.query, self.fragment)
	}
}

fn prefixed(prefix: char, part: Option<&str>) -> String {
	match part {
		Some(part) if !part.is_empty() => format!("{}{}", prefix, part),
		_ => String::new(),
	}
}

/// The host environment's address bar and history stack.
///
/// Implementations use interior mutability; the router only ever holds an
/// `Rc<dyn History>`.
pub trait History {
	/// Returns the current address.
	fn location(&self) -> Location;

	/// Returns the origin (`scheme://host[:port]`) of the current document.
	fn origin(&self) -> String;

	/// Appends a history entry for `url`. Does not fire traversal listeners.
	///
	/// # Errors
	///
	/// Returns an error, and leaves the history untouched, when the entry
	/// cannot be written.
	fn push(&self, url: &str) -> Result<(), HistoryError>;

	/// Overwrites the current entry with `url`. Does not fire traversal
	/// listeners.
	///
	/// # Errors
	///
	/// Same as [`History::push`].
	fn replace(&self, url: &str) -> Result<(), HistoryError>;

	/// Moves `delta` entries through the history stack. Listeners fire once the
	/// traversal has happened, which may be after this call returns.
	fn go(&self, delta: i32);

	/// Registers a listener fired after every back/forward traversal.
	fn listen(&self, listener: Rc<dyn Fn()>);

	/// Scrolls the viewport to the origin on a later turn of the event loop.
	fn schedule_scroll_to_top(&self);

	/// Writes an entry using `kind`.
	fn write(&self, url: &str, kind: NavigationType) -> Result<(), HistoryError> {
		match kind {
			NavigationType::Push => self.push(url),
			NavigationType::Replace => self.replace(url),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("http://localhost/", "/", "", "")]
	#[case("http://localhost/users/5?tab=posts", "/users/5", "?tab=posts", "")]
	#[case("http://localhost/docs?#intro", "/docs", "", "#intro")]
	#[case("http://localhost/a b", "/a%20b", "", "")]
	fn test_location_from_url(
		#[case] url: &str,
		#[case] path: &str,
		#[case] query: &str,
		#[case] fragment: &str,
	) {
		let location = Location::from_url(&Url::parse(url).unwrap());

		assert_eq!(location.path, path);
		assert_eq!(location.query, query);
		assert_eq!(location.fragment, fragment);
	}

	#[rstest]
	fn test_path_and_query_excludes_fragment() {
		let location = Location {
			path: "/search".to_string(),
			query: "?q=rust".to_string(),
			fragment: "#top".to_string(),
		};

		assert_eq!(location.path_and_query(), "/search?q=rust");
		assert_eq!(location.to_string(), "/search?q=rust#top");
	}
}

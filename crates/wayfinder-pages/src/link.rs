//! Link click interception.
//!
//! [`intercept`] decides, from a plain description of a click, whether the
//! router should take the navigation over from the browser. The DOM binding
//! that builds [`ClickEvent`]s lives in the `browser` module.

use url::Url;

/// The `<a>` element a click landed on (or inside of).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
	/// The raw `href` attribute.
	pub href: String,
	/// The `target` attribute, if set.
	pub target: Option<String>,
	/// Whether the anchor carries a `download` attribute.
	pub download: bool,
}

impl Anchor {
	pub fn new(href: impl Into<String>) -> Self {
		Self {
			href: href.into(),
			..Self::default()
		}
	}

	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	pub fn with_download(mut self) -> Self {
		self.download = true;
		self
	}
}

/// A mouse click as seen by the document-level listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
	/// `0` is the primary button.
	pub button: i16,
	pub meta_key: bool,
	pub ctrl_key: bool,
	pub shift_key: bool,
	pub alt_key: bool,
	pub default_prevented: bool,
	/// Closest anchor on the event's composed path.
	pub anchor: Option<Anchor>,
}

impl ClickEvent {
	/// A plain primary-button click on `anchor`.
	pub fn on(anchor: Anchor) -> Self {
		Self {
			anchor: Some(anchor),
			..Self::default()
		}
	}

	fn has_modifier(&self) -> bool {
		self.meta_key || self.ctrl_key || self.shift_key || self.alt_key
	}
}

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
	ModifierKey,
	NonPrimaryButton,
	DefaultPrevented,
	NoAnchor,
	/// The anchor opens in another browsing context.
	ExternalTarget,
	Download,
	CrossOrigin,
	InvalidHref,
	/// Only the fragment differs from the current address.
	SamePageFragment,
}

/// Outcome of [`intercept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
	Ignore(IgnoreReason),
	/// Navigate in-app to this `path?query#fragment`.
	Navigate(String),
}

/// Decides whether `event` should become an in-app navigation.
///
/// `current_url` is the absolute URL of the document; relative hrefs are
/// resolved against it and the two origins must agree.
///
/// ```
/// use wayfinder_pages::link::{intercept, Anchor, ClickEvent, IgnoreReason, LinkDecision};
///
/// let current = "http://localhost/users";
///
/// assert_eq!(
/// 	intercept(&ClickEvent::on(Anchor::new("/users/5?tab=posts")), current),
/// 	LinkDecision::Navigate("/users/5?tab=posts".to_string())
/// );
/// assert_eq!(
/// 	intercept(&ClickEvent::on(Anchor::new("https://example.com/")), current),
/// 	LinkDecision::Ignore(IgnoreReason::CrossOrigin)
/// );
/// ```
pub fn intercept(event: &ClickEvent, current_url: &str) -> LinkDecision {
	if event.default_prevented {
		return LinkDecision::Ignore(IgnoreReason::DefaultPrevented);
	}
	if event.has_modifier() {
		return LinkDecision::Ignore(IgnoreReason::ModifierKey);
	}
	if event.button != 0 {
		return LinkDecision::Ignore(IgnoreReason::NonPrimaryButton);
	}

	let Some(anchor) = &event.anchor else {
		return LinkDecision::Ignore(IgnoreReason::NoAnchor);
	};
	if anchor.download {
		return LinkDecision::Ignore(IgnoreReason::Download);
	}
	if let Some(target) = anchor.target.as_deref()
		&& !target.is_empty()
		&& !target.eq_ignore_ascii_case("_self")
	{
		return LinkDecision::Ignore(IgnoreReason::ExternalTarget);
	}

	let Ok(current) = Url::parse(current_url) else {
		return LinkDecision::Ignore(IgnoreReason::InvalidHref);
	};
	let Ok(resolved) = current.join(&anchor.href) else {
		return LinkDecision::Ignore(IgnoreReason::InvalidHref);
	};
	if resolved.origin() != current.origin() {
		return LinkDecision::Ignore(IgnoreReason::CrossOrigin);
	}
	if resolved.fragment().is_some()
		&& resolved.path() == current.path()
		&& resolved.query() == current.query()
	{
		return LinkDecision::Ignore(IgnoreReason::SamePageFragment);
	}

	let mut target = resolved.path().to_string();
	if let Some(query) = resolved.query().filter(|query| !query.is_empty()) {
		target.push('?');
		target.push_str(query);
	}
	if let Some(fragment) = resolved.fragment().filter(|fragment| !fragment.is_empty()) {
		target.push('#');
		target.push_str(fragment);
	}
	LinkDecision::Navigate(target)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const CURRENT: &str = "http://localhost:8000/users?page=2";

	fn navigate(path: &str) -> LinkDecision {
		LinkDecision::Navigate(path.to_string())
	}

	#[rstest]
	#[case("/users/5", navigate("/users/5"))]
	#[case("/search?q=a+b", navigate("/search?q=a+b"))]
	#[case("settings", navigate("/settings"))]
	#[case("http://localhost:8000/about#team", navigate("/about#team"))]
	#[case("http://localhost:9000/about", LinkDecision::Ignore(IgnoreReason::CrossOrigin))]
	#[case("https://localhost:8000/about", LinkDecision::Ignore(IgnoreReason::CrossOrigin))]
	#[case("mailto:team@example.com", LinkDecision::Ignore(IgnoreReason::CrossOrigin))]
	#[case("#details", LinkDecision::Ignore(IgnoreReason::SamePageFragment))]
	#[case("http://[::1", LinkDecision::Ignore(IgnoreReason::InvalidHref))]
	fn test_href_resolution(#[case] href: &str, #[case] expected: LinkDecision) {
		assert_eq!(intercept(&ClickEvent::on(Anchor::new(href)), CURRENT), expected);
	}

	#[rstest]
	#[case::meta(ClickEvent { meta_key: true, ..ClickEvent::on(Anchor::new("/a")) }, IgnoreReason::ModifierKey)]
	#[case::ctrl(ClickEvent { ctrl_key: true, ..ClickEvent::on(Anchor::new("/a")) }, IgnoreReason::ModifierKey)]
	#[case::shift(ClickEvent { shift_key: true, ..ClickEvent::on(Anchor::new("/a")) }, IgnoreReason::ModifierKey)]
	#[case::alt(ClickEvent { alt_key: true, ..ClickEvent::on(Anchor::new("/a")) }, IgnoreReason::ModifierKey)]
	#[case::middle(ClickEvent { button: 1, ..ClickEvent::on(Anchor::new("/a")) }, IgnoreReason::NonPrimaryButton)]
	#[case::prevented(ClickEvent { default_prevented: true, ..ClickEvent::on(Anchor::new("/a")) }, IgnoreReason::DefaultPrevented)]
	#[case::no_anchor(ClickEvent::default(), IgnoreReason::NoAnchor)]
	#[case::blank(ClickEvent::on(Anchor::new("/a").with_target("_blank")), IgnoreReason::ExternalTarget)]
	#[case::download(ClickEvent::on(Anchor::new("/a").with_download()), IgnoreReason::Download)]
	fn test_ignored_clicks(#[case] event: ClickEvent, #[case] reason: IgnoreReason) {
		assert_eq!(intercept(&event, CURRENT), LinkDecision::Ignore(reason));
	}

	#[rstest]
	#[case("_self")]
	#[case("_SELF")]
	#[case("")]
	fn test_self_target_is_intercepted(#[case] target: &str) {
		let event = ClickEvent::on(Anchor::new("/a").with_target(target));
		assert_eq!(intercept(&event, CURRENT), navigate("/a"));
	}

	#[rstest]
	fn test_invalid_current_url() {
		let event = ClickEvent::on(Anchor::new("/a"));
		assert_eq!(
			intercept(&event, "not a url"),
			LinkDecision::Ignore(IgnoreReason::InvalidHref)
		);
	}
}

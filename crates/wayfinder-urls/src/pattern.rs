//! Path Pattern Matching for client-side routes.
//!
//! Templates are `/`-delimited. Each segment is one of:
//!
//! - `users` - literal, must match exactly
//! - `:id` - required parameter, matches any single segment
//! - `:id?` - optional parameter, may be missing at the end of the path
//! - `*` - wildcard, matches any single segment and binds it under its index
//!
//! A template that is exactly `*` is a catch-all and matches every path.
//!
//! Matching is strict in both directions: every segment of the candidate
//! path has to be accounted for by the template, and every non-optional
//! segment of the template has to be present in the candidate. So
//! `/users/:id` rejects both `/users` and `/users/5/edit`, while
//! `/users/:id?` accepts `/users` and `/users/5`.
//!
//! Parameter values are percent-decoded when extracted and percent-encoded
//! when a path is built, so `build_path(extract_params(path))` reproduces
//! `path` and a value may contain `/`, `?` or `#`.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::Params;
use crate::error::{PatternError, RouterError};

/// Maximum allowed length for a route template in bytes.
pub const MAX_TEMPLATE_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a route template.
pub const MAX_TEMPLATE_SEGMENTS: usize = 32;

/// Template that matches every path.
pub const CATCH_ALL: &str = "*";

/// Bytes escaped in a parameter value written into a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'%')
	.add(b'/')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}');

fn decode_segment(part: &str) -> String {
	percent_decode_str(part).decode_utf8_lossy().into_owned()
}

fn encode_segment(value: &str) -> Cow<'_, str> {
	utf8_percent_encode(value, SEGMENT).into()
}

/// Size limits applied when compiling a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternLimits {
	/// Maximum template length in bytes.
	pub max_length: usize,
	/// Maximum number of `/`-separated segments.
	pub max_segments: usize,
}

impl Default for PatternLimits {
	fn default() -> Self {
		Self {
			max_length: MAX_TEMPLATE_LENGTH,
			max_segments: MAX_TEMPLATE_SEGMENTS,
		}
	}
}

/// Splits a path into segments, discarding the empty segment produced by a
/// leading `/`.
///
/// `"/users/5"` yields `["users", "5"]`, `"/"` yields `[""]` and the empty
/// string yields no segments at all.
pub fn split(path: &str) -> Vec<&str> {
	if path.is_empty() {
		return Vec::new();
	}
	path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

/// One compiled unit of a route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	/// Must equal the path segment exactly.
	Literal(String),
	/// `:name`
	Param(String),
	/// `:name?`
	OptionalParam(String),
	/// `*`
	Wildcard,
}

impl Segment {
	fn parse(token: &str, index: usize, template: &str) -> Result<Self, PatternError> {
		if token == "*" {
			return Ok(Self::Wildcard);
		}
		let Some(name) = token.strip_prefix(':') else {
			return Ok(Self::Literal(token.to_string()));
		};
		let (name, optional) = match name.strip_suffix('?') {
			Some(name) => (name, true),
			None => (name, false),
		};
		if name.is_empty() {
			return Err(PatternError::EmptyParamName {
				template: template.to_string(),
				index,
			});
		}
		Ok(if optional {
			Self::OptionalParam(name.to_string())
		} else {
			Self::Param(name.to_string())
		})
	}

	/// Returns the bound name for parameter segments.
	pub fn param_name(&self) -> Option<&str> {
		match self {
			Self::Param(name) | Self::OptionalParam(name) => Some(name),
			Self::Literal(_) | Self::Wildcard => None,
		}
	}

	/// Returns whether this segment may be missing from the end of a path.
	pub fn is_optional(&self) -> bool {
		matches!(self, Self::OptionalParam(_))
	}

	fn accepts(&self, part: &str) -> bool {
		match self {
			Self::Literal(literal) => literal == part,
			Self::Param(_) | Self::OptionalParam(_) | Self::Wildcard => true,
		}
	}
}

impl fmt::Display for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(literal) => f.write_str(literal),
			Self::Param(name) => write!(f, ":{}", name),
			Self::OptionalParam(name) => write!(f, ":{}?", name),
			Self::Wildcard => f.write_str("*"),
		}
	}
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct PathPattern {
	template: String,
	segments: Vec<Segment>,
	catch_all: bool,
}

impl PathPattern {
	/// Compiles `template` with the default [`PatternLimits`].
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if the template exceeds the size limits or
	/// declares a parameter without a name.
	pub fn compile(template: &str) -> Result<Self, PatternError> {
		Self::compile_with_limits(template, PatternLimits::default())
	}

	/// Compiles `template`, rejecting it if it exceeds `limits`.
	pub fn compile_with_limits(template: &str, limits: PatternLimits) -> Result<Self, PatternError> {
		if template.len() > limits.max_length {
			return Err(PatternError::TooLong {
				length: template.len(),
				max: limits.max_length,
			});
		}

		if template == CATCH_ALL {
			return Ok(Self {
				template: template.to_string(),
				segments: Vec::new(),
				catch_all: true,
			});
		}

		let tokens = split(template);
		if tokens.len() > limits.max_segments {
			return Err(PatternError::TooManySegments {
				count: tokens.len(),
				max: limits.max_segments,
			});
		}

		let segments = tokens
			.into_iter()
			.enumerate()
			.map(|(index, token)| Segment::parse(token, index, template))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			template: template.to_string(),
			segments,
			catch_all: false,
		})
	}

	/// Returns the raw template string.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Returns the compiled segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns whether this is the `*` catch-all template.
	pub fn is_catch_all(&self) -> bool {
		self.catch_all
	}

	/// Returns the names of all named parameters, in template order.
	pub fn param_names(&self) -> Vec<&str> {
		self.segments.iter().filter_map(Segment::param_name).collect()
	}

	/// Tests `path` against this template.
	pub fn is_match(&self, path: &str) -> bool {
		if self.catch_all {
			return true;
		}

		let parts = split(path);
		if parts.len() > self.segments.len() {
			return false;
		}

		// Missing parts can only be trailing, so this also enforces that
		// omitted optional segments sit at the end.
		self.segments
			.iter()
			.enumerate()
			.all(|(i, segment)| match parts.get(i) {
				Some(part) => segment.accepts(part),
				None => segment.is_optional(),
			})
	}

	/// Extracts parameter values from `path`.
	///
	/// Call only after [`is_match`](Self::is_match) succeeded. Optional
	/// parameters that are absent from the path are left out; wildcards are
	/// keyed by their segment index.
	pub fn extract_params(&self, path: &str) -> Params {
		let parts = split(path);
		let mut params = Params::new();

		for (i, (segment, part)) in self.segments.iter().zip(parts).enumerate() {
			match segment {
				Segment::Param(name) | Segment::OptionalParam(name) => {
					params.insert(name.clone(), decode_segment(part));
				}
				Segment::Wildcard => {
					params.insert(i.to_string(), decode_segment(part));
				}
				Segment::Literal(_) => {}
			}
		}

		params
	}

	/// Builds a concrete path by substituting `params` into the template.
	///
	/// An optional parameter without a value drops its segment, so only
	/// trailing optional parameters should be omitted.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MissingParameter`] when a required parameter or
	/// a wildcard has no value.
	pub fn build_path(&self, params: &Params) -> Result<String, RouterError> {
		let mut parts: Vec<Cow<'_, str>> = Vec::with_capacity(self.segments.len());

		for (i, segment) in self.segments.iter().enumerate() {
			match segment {
				Segment::Literal(literal) => parts.push(Cow::Borrowed(literal.as_str())),
				Segment::Param(name) => {
					let value = params
						.get(name)
						.ok_or_else(|| RouterError::MissingParameter(name.clone()))?;
					parts.push(encode_segment(value));
				}
				Segment::OptionalParam(name) => {
					if let Some(value) = params.get(name) {
						parts.push(encode_segment(value));
					}
				}
				Segment::Wildcard => {
					let key = i.to_string();
					let value = params
						.get(&key)
						.ok_or(RouterError::MissingParameter(key))?;
					parts.push(encode_segment(value));
				}
			}
		}

		Ok(format!("/{}", parts.join("/")))
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.template == other.template
	}
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.template)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn params(pairs: &[(&str, &str)]) -> Params {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[rstest]
	#[case("/users/5", vec!["users", "5"])]
	#[case("/", vec![""])]
	#[case("/users/", vec!["users", ""])]
	#[case("", vec![])]
	fn test_split(#[case] path: &str, #[case] expected: Vec<&str>) {
		assert_eq!(split(path), expected);
	}

	#[rstest]
	fn test_compile_classifies_segments() {
		let pattern = PathPattern::compile("/files/:dir/*/:name?").unwrap();

		assert_eq!(
			pattern.segments(),
			&[
				Segment::Literal("files".to_string()),
				Segment::Param("dir".to_string()),
				Segment::Wildcard,
				Segment::OptionalParam("name".to_string()),
			]
		);
		assert_eq!(pattern.param_names(), vec!["dir", "name"]);
		assert!(!pattern.is_catch_all());
	}

	#[rstest]
	#[case("/users/5", true)]
	#[case("/users", false)]
	#[case("/users/5/edit", false)]
	#[case("/posts/5", false)]
	fn test_required_param(#[case] path: &str, #[case] expected: bool) {
		let pattern = PathPattern::compile("/users/:id").unwrap();
		assert_eq!(pattern.is_match(path), expected);
	}

	#[rstest]
	fn test_required_param_extraction() {
		let pattern = PathPattern::compile("/users/:id").unwrap();
		assert_eq!(pattern.extract_params("/users/5"), params(&[("id", "5")]));
	}

	#[rstest]
	#[case("/users", true, params(&[]))]
	#[case("/users/5", true, params(&[("id", "5")]))]
	#[case("/users/5/edit", false, params(&[("id", "5")]))]
	fn test_optional_param(#[case] path: &str, #[case] matched: bool, #[case] expected: Params) {
		let pattern = PathPattern::compile("/users/:id?").unwrap();

		assert_eq!(pattern.is_match(path), matched);
		if matched {
			assert_eq!(pattern.extract_params(path), expected);
		}
	}

	#[rstest]
	fn test_optional_param_only_trailing_may_be_missing() {
		let pattern = PathPattern::compile("/a/:x?/b").unwrap();

		assert!(pattern.is_match("/a/1/b"));
		assert!(!pattern.is_match("/a"));
	}

	#[rstest]
	fn test_wildcard_binds_by_index() {
		let pattern = PathPattern::compile("/static/*/:file").unwrap();

		assert!(pattern.is_match("/static/css/main.css"));
		assert!(!pattern.is_match("/static/css"));
		assert_eq!(
			pattern.extract_params("/static/css/main.css"),
			params(&[("1", "css"), ("file", "main.css")])
		);
	}

	#[rstest]
	#[case("/")]
	#[case("/anything/at/all")]
	#[case("")]
	fn test_catch_all_matches_everything(#[case] path: &str) {
		let pattern = PathPattern::compile("*").unwrap();

		assert!(pattern.is_catch_all());
		assert!(pattern.is_match(path));
		assert!(pattern.extract_params(path).is_empty());
	}

	#[rstest]
	fn test_root_template() {
		let pattern = PathPattern::compile("/").unwrap();

		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match("/users"));
		assert_eq!(pattern.build_path(&Params::new()).unwrap(), "/");
	}

	#[rstest]
	fn test_trailing_slash_is_significant() {
		let pattern = PathPattern::compile("/users/").unwrap();

		assert!(pattern.is_match("/users/"));
		assert!(!pattern.is_match("/users"));
	}

	#[rstest]
	fn test_build_path() {
		let pattern = PathPattern::compile("/users/:user/posts/:post").unwrap();

		assert_eq!(
			pattern
				.build_path(&params(&[("user", "7"), ("post", "99")]))
				.unwrap(),
			"/users/7/posts/99"
		);
	}

	#[rstest]
	fn test_build_path_missing_required() {
		let pattern = PathPattern::compile("/users/:id").unwrap();

		assert_eq!(
			pattern.build_path(&Params::new()),
			Err(RouterError::MissingParameter("id".to_string()))
		);
	}

	#[rstest]
	fn test_build_path_omits_trailing_optional() {
		let pattern = PathPattern::compile("/users/:id?").unwrap();

		assert_eq!(pattern.build_path(&Params::new()).unwrap(), "/users");
		assert_eq!(
			pattern.build_path(&params(&[("id", "3")])).unwrap(),
			"/users/3"
		);
	}

	#[rstest]
	#[case("a?b=1", "/users/a%3Fb=1")]
	#[case("docs/intro#top", "/users/docs%2Fintro%23top")]
	#[case("john doe", "/users/john%20doe")]
	#[case("50%", "/users/50%25")]
	#[case("café", "/users/caf%C3%A9")]
	fn test_build_path_encodes_values(#[case] value: &str, #[case] expected: &str) {
		let pattern = PathPattern::compile("/users/:id").unwrap();

		let path = pattern.build_path(&params(&[("id", value)])).unwrap();

		assert_eq!(path, expected);
		assert!(pattern.is_match(&path));
		assert_eq!(pattern.extract_params(&path), params(&[("id", value)]));
	}

	#[rstest]
	fn test_extract_params_decodes_values() {
		let pattern = PathPattern::compile("/files/*/:name").unwrap();

		let extracted = pattern.extract_params("/files/my%20docs/caf%C3%A9");

		assert_eq!(extracted, params(&[("1", "my docs"), ("name", "café")]));
	}

	#[rstest]
	fn test_build_path_catch_all() {
		let pattern = PathPattern::compile("*").unwrap();
		assert_eq!(pattern.build_path(&Params::new()).unwrap(), "/");
	}

	#[rstest]
	#[case("/users/:")]
	#[case("/users/:?")]
	fn test_compile_rejects_nameless_param(#[case] template: &str) {
		assert!(matches!(
			PathPattern::compile(template),
			Err(PatternError::EmptyParamName { index: 1, .. })
		));
	}

	#[rstest]
	fn test_compile_rejects_excessive_length() {
		// Arrange
		let template = "/".to_string() + &"a".repeat(MAX_TEMPLATE_LENGTH + 1);

		// Act
		let result = PathPattern::compile(&template);

		// Assert
		assert!(matches!(result, Err(PatternError::TooLong { .. })));
	}

	#[rstest]
	fn test_compile_rejects_excessive_segments() {
		// Arrange
		let template = "/seg".repeat(MAX_TEMPLATE_SEGMENTS + 1);

		// Act
		let result = PathPattern::compile(&template);

		// Assert
		assert_eq!(
			result.unwrap_err(),
			PatternError::TooManySegments {
				count: MAX_TEMPLATE_SEGMENTS + 1,
				max: MAX_TEMPLATE_SEGMENTS,
			}
		);
	}

	#[rstest]
	fn test_custom_limits() {
		let limits = PatternLimits {
			max_length: 8,
			max_segments: 2,
		};

		assert!(PathPattern::compile_with_limits("/a/b", limits).is_ok());
		assert!(PathPattern::compile_with_limits("/a/b/c", limits).is_err());
		assert!(PathPattern::compile_with_limits("/abcdefgh", limits).is_err());
	}

	#[rstest]
	fn test_display_and_equality() {
		let a = PathPattern::compile("/users/:id").unwrap();
		let b = PathPattern::compile("/users/:id").unwrap();
		let c = PathPattern::compile("/users/:user").unwrap();

		assert_eq!(a.to_string(), "/users/:id");
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(
			a.segments().iter().map(ToString::to_string).collect::<Vec<_>>(),
			vec!["users", ":id"]
		);
	}
}

//! Error types for route templates and route resolution.

/// Error raised while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	/// Template exceeds the configured byte length.
	#[error("Template length {length} exceeds maximum allowed length of {max} bytes")]
	TooLong {
		/// Length of the rejected template.
		length: usize,
		/// Configured maximum.
		max: usize,
	},
	/// Template has more segments than allowed.
	#[error("Template has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Number of segments in the rejected template.
		count: usize,
		/// Configured maximum.
		max: usize,
	},
	/// A `:` parameter without a name, e.g. `/users/:` or `/users/:?`.
	#[error("Parameter at segment {index} of '{template}' has no name")]
	EmptyParamName {
		/// The offending template.
		template: String,
		/// Segment index of the nameless parameter.
		index: usize,
	},
}

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// No route is registered under this name.
	#[error("Route \"{0}\" does not exist")]
	InvalidRouteName(String),
	/// A parameter required to build a path was not supplied.
	#[error("Missing parameter: {0}")]
	MissingParameter(String),
	/// The operation needs an active route and none has matched yet.
	#[error("No route is currently active")]
	NoActiveRoute,
	/// Template compilation failed.
	#[error("Invalid route template: {0}")]
	Pattern(#[from] PatternError),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::InvalidRouteName("profile".to_string()).to_string(),
			"Route \"profile\" does not exist"
		);
		assert_eq!(
			RouterError::MissingParameter("id".to_string()).to_string(),
			"Missing parameter: id"
		);
	}

	#[rstest]
	fn test_pattern_error_converts_into_router_error() {
		let err: RouterError = PatternError::TooLong {
			length: 2048,
			max: 1024,
		}
		.into();

		assert!(matches!(err, RouterError::Pattern(_)));
		assert!(err.to_string().contains("exceeds maximum allowed length"));
	}
}

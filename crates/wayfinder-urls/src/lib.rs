//! URL layer for wayfinder.
//!
//! - [`pattern`]: route template compilation and strict path matching
//! - [`registry`]: named routes kept in registration order
//! - [`query`]: query-string encoding and decoding
//! - [`error`]: error types shared by the routing crates
//!
//! ## Example
//!
//! ```
//! use wayfinder_urls::RouteRegistry;
//!
//! let mut routes = RouteRegistry::new();
//! routes.register("user", "/users/:id", "UserPage", None).unwrap();
//! routes.register("not_found", "*", "NotFound", None).unwrap();
//!
//! let route = routes.find_first_match("/users/5").unwrap();
//! assert_eq!(route.name(), "user");
//! assert_eq!(route.params("/users/5").get("id").map(String::as_str), Some("5"));
//! assert_eq!(routes.find_first_match("/nope").unwrap().name(), "not_found");
//! ```

pub mod error;
pub mod pattern;
pub mod query;
pub mod registry;

pub use error::{PatternError, RouterError};
pub use pattern::{PathPattern, PatternLimits, Segment};
pub use query::{decode_query, encode_query, encode_search};
pub use registry::{Route, RouteRegistry};

/// Ordered mapping from parameter name to value.
///
/// Used for both path parameters and query parameters.
pub type Params = indexmap::IndexMap<String, String>;

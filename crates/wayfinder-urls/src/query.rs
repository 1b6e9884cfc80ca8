//! Query-string codec.
//!
//! Encoding and decoding use `application/x-www-form-urlencoded` rules (spaces
//! become `+`), the same format the browser's `URLSearchParams` produces.

use crate::Params;

/// Encodes `pairs` as a query string without the leading `?`.
///
/// Pairs whose value is `None` are left out.
///
/// # Example
///
/// ```
/// use wayfinder_urls::query::encode_query;
///
/// let qs = encode_query([("q", Some("rust lang")), ("page", None), ("sort", Some("new"))]);
/// assert_eq!(qs, "q=rust+lang&sort=new");
/// ```
pub fn encode_query<I, K, V>(pairs: I) -> String
where
	I: IntoIterator<Item = (K, Option<V>)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let pairs: Vec<(K, V)> = pairs
		.into_iter()
		.filter_map(|(key, value)| value.map(|value| (key, value)))
		.collect();
	let borrowed: Vec<(&str, &str)> = pairs
		.iter()
		.map(|(key, value)| (key.as_ref(), value.as_ref()))
		.collect();

	serde_urlencoded::to_string(&borrowed).unwrap_or_else(|err| {
		tracing::error!(error = %err, "failed to encode query string");
		String::new()
	})
}

/// Like [`encode_query`], but prefixed with `?` when the result is non-empty.
pub fn encode_search<I, K, V>(pairs: I) -> String
where
	I: IntoIterator<Item = (K, Option<V>)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let query = encode_query(pairs);
	if query.is_empty() {
		query
	} else {
		format!("?{}", query)
	}
}

/// Encodes a complete parameter map as a search string (`?a=1&b=2` or empty).
pub fn params_to_search(params: &Params) -> String {
	encode_search(params.iter().map(|(key, value)| (key, Some(value))))
}

/// Decodes a query string into an ordered map.
///
/// A leading `?` is accepted. When a key repeats, the last value wins and the
/// key keeps the position of its first occurrence.
pub fn decode_query(query: &str) -> Params {
	let query = query.strip_prefix('?').unwrap_or(query);
	if query.is_empty() {
		return Params::new();
	}

	match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
		Ok(pairs) => pairs.into_iter().collect(),
		Err(err) => {
			tracing::warn!(error = %err, query, "failed to decode query string");
			Params::new()
		}
	}
}

//! Path & Query Normalizer (`spec.md` §4.2).
//!
//! Turns a raw HTTP request target (path + query string) into a sanitized
//! key and a case-sensitive query parameter map, applying the six ordered
//! rules this gateway's wire format depends on.

use percent_encoding::percent_decode_str;

use crate::error::GatewayError;

/// A case-sensitive query parameter map. Duplicate keys keep the
/// first-seen value, matching `std::unordered_map::emplace` semantics in
/// the system this was ported from.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The outcome of normalization: a sanitized key and the parsed query map.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub key: String,
    pub params: QueryParams,
}

/// Apply the six normalization rules to `target` (path + optional `?query`)
/// given the gateway's single `bucket_name`.
pub fn normalize(target: &str, bucket_name: &str) -> Result<Normalized, GatewayError> {
    // Rule 1: parse as a relative URI reference. We don't carry a full
    // RFC 3986 parser; a target that isn't valid percent-encoded UTF-8 in
    // either component is rejected as malformed.
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, q),
        None => (target, ""),
    };

    let path = decode_strict(path)?;
    let params = parse_query_params(query)?;

    // Rule 3: strip a leading `/{bucket_name}` if present (exact match
    // followed by end-of-string or `/`).
    let stripped = path.strip_prefix('/').and_then(|rest| rest.strip_prefix(bucket_name));
    let key = match stripped {
        Some(after_bucket) if after_bucket.is_empty() || after_bucket.starts_with('/') => after_bucket,
        _ => path.as_str(),
    };

    finish(key, params)
}

fn finish(key: &str, params: QueryParams) -> Result<Normalized, GatewayError> {
    // Rule 4: empty or starting with `?` => empty key (bucket-level request).
    let key = if key.is_empty() || key.starts_with('?') { "" } else { key };

    // Rule 5: strip a single leading `/` if present.
    let key = key.strip_prefix('/').unwrap_or(key);

    // Rule 6: delimiter must be empty or `/`.
    if let Some(delim) = params.get("delimiter") {
        if !delim.is_empty() && delim != "/" {
            return Err(GatewayError::BadRequest("/ is the only supported delimiter.".into()));
        }
    }

    Ok(Normalized { key: key.to_owned(), params })
}

fn decode_strict(s: &str) -> Result<String, GatewayError> {
    percent_decode_str(s)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|_| GatewayError::BadRequest("Malformed request".into()))
}

fn parse_query_params(query: &str) -> Result<QueryParams, GatewayError> {
    let mut params = Vec::new();
    if query.is_empty() {
        return Ok(QueryParams(params));
    }
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let k = decode_strict(k)?;
        let v = decode_strict(v)?;
        if !params.iter().any(|(existing, _): &(String, String)| existing == &k) {
            params.push((k, v));
        }
    }
    Ok(QueryParams(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bucket_prefix_and_leading_slash() {
        let n = normalize("/mybucket/a/b.txt", "mybucket").unwrap();
        assert_eq!(n.key, "a/b.txt");
    }

    #[test]
    fn bucket_only_target_yields_empty_key() {
        let n = normalize("/mybucket", "mybucket").unwrap();
        assert_eq!(n.key, "");
    }

    #[test]
    fn bucket_with_query_yields_empty_key_and_parsed_params() {
        let n = normalize("/mybucket?list-type=2&prefix=d1/", "mybucket").unwrap();
        assert_eq!(n.key, "");
        assert_eq!(n.params.get("list-type"), Some("2"));
        assert_eq!(n.params.get("prefix"), Some("d1/"));
    }

    #[test]
    fn root_target_yields_empty_key() {
        let n = normalize("/", "mybucket").unwrap();
        assert_eq!(n.key, "");
    }

    #[test]
    fn duplicate_query_keys_keep_first_seen() {
        let n = normalize("/mybucket?a=1&a=2", "mybucket").unwrap();
        assert_eq!(n.params.get("a"), Some("1"));
    }

    #[test]
    fn unsupported_delimiter_is_rejected() {
        let err = normalize("/mybucket?foo=bar&delimiter=,", "mybucket").unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(msg) if msg == "/ is the only supported delimiter."));
    }

    #[test]
    fn empty_delimiter_is_accepted() {
        let n = normalize("/mybucket?delimiter=", "mybucket").unwrap();
        assert_eq!(n.params.get("delimiter"), Some(""));
    }

    #[test]
    fn slash_delimiter_is_accepted() {
        let n = normalize("/mybucket?delimiter=/", "mybucket").unwrap();
        assert_eq!(n.params.get("delimiter"), Some("/"));
    }
}

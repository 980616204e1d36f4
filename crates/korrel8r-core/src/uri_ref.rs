//! URI references: console links that may be relative, absolute-path or absolute
//!
//! A [`UriRef`] keeps the path exactly as given so that console paths such as
//! `/k8s/ns/netobserv/core~v1~Pod` survive a round trip unchanged. Query
//! parameters are decoded and re-encoded as `application/x-www-form-urlencoded`.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use url::{form_urlencoded, Position, Url};

/// Ordered string multimap of query parameters
///
/// Insertion order is preserved and duplicate keys are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(Vec<(String, String)>);

impl SearchParams {
    /// Decode a form-urlencoded query string (without the leading `?`)
    pub fn parse(query: &str) -> Self {
        Self(form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Set `key` to a single value
    ///
    /// The first existing entry is overwritten in place and later duplicates
    /// are removed; an unknown key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter().position(|(k, _)| *k == key) {
            Some(i) => {
                self.0[i].1 = value;
                let mut seen = 0;
                self.0.retain(|(k, _)| {
                    if *k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.0.push((key, value)),
        }
    }

    /// Append an entry, keeping existing entries for the same key
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Remove every entry for `key`
    pub fn delete(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    /// Iterate over entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish();
        f.write_str(&encoded)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A parsed, re-serializable URI reference
///
/// Grammar: `[scheme "://" host] path ["?" query] ["#" fragment]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriRef {
    /// `scheme://host[:port]` if the reference is absolute
    pub origin: Option<String>,

    /// Path, kept verbatim
    pub pathname: String,

    /// Decoded query parameters
    pub search_params: SearchParams,

    /// Fragment including the leading `#`, or empty
    pub hash: String,
}

impl UriRef {
    /// Parse a URI reference
    ///
    /// # Errors
    /// Returns [`Error::InvalidUri`] if a scheme is present without a host.
    ///
    /// # Examples
    ///
    /// ```
    /// use korrel8r_core::UriRef;
    ///
    /// let u = UriRef::parse("/a/b?c=d&x=y#z").unwrap();
    /// assert_eq!(u.pathname, "/a/b");
    /// assert_eq!(u.search_params.get("x"), Some("y"));
    /// assert_eq!(u.hash, "#z");
    /// assert_eq!(u.to_string(), "/a/b?c=d&x=y#z");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (rest, hash) = match s.split_once('#') {
            Some((rest, "")) => (rest, String::new()),
            Some((rest, fragment)) => (rest, format!("#{}", fragment)),
            None => (s, String::new()),
        };
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (origin, pathname) = match split_origin(rest) {
            Some(("", _)) => return Err(Error::invalid_uri(s, "missing host")),
            Some((origin, path)) if path.is_empty() => (Some(origin.to_string()), "/"),
            Some((origin, path)) => (Some(origin.to_string()), path),
            None => (None, rest),
        };
        Ok(Self {
            origin,
            pathname: pathname.to_string(),
            search_params: SearchParams::parse(query),
            hash,
        })
    }

    /// Parse a URI reference and set additional query parameters
    ///
    /// Each parameter overrides an existing key in place or is appended.
    pub fn with_params<I, K, V>(s: &str, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut uri = Self::parse(s)?;
        for (k, v) in params {
            uri.search_params.set(k, v);
        }
        Ok(uri)
    }

    /// Build a reference from an absolute URL
    pub fn from_url(url: &Url) -> Self {
        let origin = &url[..Position::BeforePath];
        Self {
            origin: (!origin.is_empty()).then(|| origin.to_string()),
            pathname: url.path().to_string(),
            search_params: url.query_pairs().into_owned().collect(),
            hash: url.fragment().map(|f| format!("#{}", f)).unwrap_or_default(),
        }
    }

    /// Non-empty path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.pathname.split('/').filter(|s| !s.is_empty())
    }

    /// First non-empty path segment, ignoring origin and leading `/`
    pub fn first_segment(&self) -> Option<&str> {
        self.segments().next()
    }

    /// Path with leading slashes removed, for matching domain link shapes
    pub fn relative_path(&self) -> &str {
        self.pathname.trim_start_matches('/')
    }

    /// True if the reference carries a scheme and host
    pub fn is_absolute(&self) -> bool {
        self.origin.is_some()
    }

    /// Resolve this reference against `base`
    ///
    /// A reference starting with `/` replaces the base path; any other
    /// relative reference is appended to the base directory. A reference
    /// that already has an origin is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use korrel8r_core::UriRef;
    ///
    /// let u = UriRef::parse("a/b?c=d").unwrap();
    /// let abs = u.resolve("http://example/x/").unwrap();
    /// assert_eq!(abs.to_string(), "http://example/x/a/b?c=d");
    /// ```
    pub fn resolve(&self, base: &str) -> Result<Self> {
        if self.is_absolute() {
            return Ok(self.clone());
        }
        let base_url = Url::parse(base).map_err(|e| Error::invalid_uri(base, e))?;
        let joined = base_url
            .join(&self.to_string())
            .map_err(|e| Error::invalid_uri(self.to_string(), e))?;
        Ok(Self::from_url(&joined))
    }

    /// Convert an absolute reference to a [`Url`]
    pub fn to_url(&self) -> Result<Url> {
        let s = self.to_string();
        Url::parse(&s).map_err(|e| Error::invalid_uri(s, e))
    }
}

impl fmt::Display for UriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            f.write_str(origin)?;
        }
        f.write_str(&self.pathname)?;
        if !self.search_params.is_empty() {
            write!(f, "?{}", self.search_params)?;
        }
        f.write_str(&self.hash)
    }
}

impl FromStr for UriRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split `scheme://authority` off the front of `s`, returning (origin, path)
///
/// An empty origin means the scheme had no host.
fn split_origin(s: &str) -> Option<(&str, &str)> {
    let (scheme, after) = s.split_once("://")?;
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_scheme {
        return None;
    }
    let host_len = after.find('/').unwrap_or(after.len());
    if host_len == 0 {
        return Some(("", after));
    }
    let split = scheme.len() + 3 + host_len;
    Some((&s[..split], &s[split..]))
}

/// Join path segments with exactly one `/` between them
///
/// Trailing slashes are trimmed from the first segment and surrounding
/// slashes from every later one, so a leading `/` on the first segment is
/// kept.
///
/// # Examples
///
/// ```
/// use korrel8r_core::join_path;
///
/// assert_eq!(join_path("/api/", &["//v1beta1/", "graphs"]), "/api/v1beta1/graphs");
/// assert_eq!(join_path("", &["p"]), "/p");
/// ```
pub fn join_path(first: &str, rest: &[&str]) -> String {
    let mut path = first.trim_end_matches('/').to_string();
    for segment in rest {
        path.push('/');
        path.push_str(segment.trim_matches('/'));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parts() {
        let u = UriRef::parse("/a/b?c=d&x=y#z").unwrap();
        assert_eq!(u.origin, None);
        assert_eq!(u.pathname, "/a/b");
        let params: Vec<_> = u.search_params.iter().collect();
        assert_eq!(params, vec![("c", "d"), ("x", "y")]);
        assert_eq!(u.hash, "#z");
    }

    #[test]
    fn test_with_params() {
        let u = UriRef::with_params("/a/b?c=d&x=y", [("c", "dd"), ("q", "foo")]).unwrap();
        assert_eq!(u.pathname, "/a/b");
        let params: Vec<_> = u.search_params.iter().collect();
        assert_eq!(params, vec![("c", "dd"), ("x", "y"), ("q", "foo")]);
    }

    #[test]
    fn test_round_trip() {
        for s in ["", "/a/b?c=d&x=y#z", "/path", "relpath", "/k8s/ns/netobserv/core~v1~Pod"] {
            assert_eq!(UriRef::parse(s).unwrap().to_string(), s, "round trip {:?}", s);
        }
    }

    #[test]
    fn test_absolute_reference() {
        let u = UriRef::parse("http://blah/a/b?c=d").unwrap();
        assert_eq!(u.origin.as_deref(), Some("http://blah"));
        assert_eq!(u.pathname, "/a/b");
        assert_eq!(u.first_segment(), Some("a"));
        assert_eq!(u.to_string(), "http://blah/a/b?c=d");

        assert!(UriRef::parse("http:///a").is_err());
    }

    #[test]
    fn test_encoded_params() {
        let u = UriRef::with_params("monitoring/logs", [("q", r#"{name="x y"}"#)]).unwrap();
        assert_eq!(u.to_string(), "monitoring/logs?q=%7Bname%3D%22x+y%22%7D");
        assert_eq!(UriRef::parse(&u.to_string()).unwrap(), u);
    }

    #[test]
    fn test_set_removes_duplicates() {
        let mut params = SearchParams::parse("a=1&b=2&a=3");
        params.set("a", "4");
        assert_eq!(params.to_string(), "a=4&b=2");
        params.append("b", "5");
        assert_eq!(params.get_all("b").collect::<Vec<_>>(), vec!["2", "5"]);
        params.delete("b");
        assert_eq!(params.to_string(), "a=4");
    }

    #[test]
    fn test_resolve() {
        let relative = UriRef::parse("a/b?c=d&x=y#z").unwrap();
        assert_eq!(
            relative.resolve("http://example/x/").unwrap().to_string(),
            "http://example/x/a/b?c=d&x=y#z"
        );

        let absolute_path = UriRef::parse("/a/b?c=d&x=y#z").unwrap();
        assert_eq!(
            absolute_path.resolve("http://example/x/").unwrap().to_string(),
            "http://example/a/b?c=d&x=y#z"
        );

        assert!(relative.resolve("not a url").is_err());
    }

    #[test]
    fn test_join_path() {
        let cases: &[(&str, &[&str], &str)] = &[
            ("path1", &["path2"], "path1/path2"),
            ("path1", &["path2", "path3"], "path1/path2/path3"),
            ("path1/", &["path2"], "path1/path2"),
            ("path1//", &["path2"], "path1/path2"),
            ("path1", &["/path2"], "path1/path2"),
            ("path1", &["//path2"], "path1/path2"),
            ("path1", &["path2/"], "path1/path2"),
            ("path1", &["path2//"], "path1/path2"),
            ("path1/", &["/path2/", "/path3/"], "path1/path2/path3"),
            ("/path1/", &["//path2//", "///path3///"], "/path1/path2/path3"),
            ("", &["path2"], "/path2"),
            ("path1", &[""], "path1/"),
            ("", &[""], "/"),
            ("single", &[], "single"),
            ("single/", &[], "single"),
            ("/single/", &[], "/single"),
            ("/absolute", &["relative"], "/absolute/relative"),
            ("/absolute/", &["/relative/"], "/absolute/relative"),
        ];
        for (first, rest, want) in cases {
            assert_eq!(join_path(first, rest), *want, "join {:?} {:?}", first, rest);
        }
    }
}

//! Query module - the uniform `domain:class:selector` string

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A class of signal within a domain, e.g. `log:application` or `k8s:Pod.v1`
///
/// Classes are immutable; [`Class::query`] appends a selector to form a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Class {
    /// Domain name, the first segment of the class string
    pub domain: String,

    /// Class name within the domain
    pub name: String,
}

impl Class {
    /// Create a new class
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }

    /// Parse a `domain:name` class string
    ///
    /// Splits on the first colon; the name may contain further colons.
    ///
    /// # Examples
    ///
    /// ```
    /// use korrel8r_core::Class;
    ///
    /// let class = Class::parse("k8s:Pod.v1").unwrap();
    /// assert_eq!(class.domain, "k8s");
    /// assert_eq!(class.name, "Pod.v1");
    /// assert!(Class::parse("foobar").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((domain, name)) => Ok(Self::new(domain, name)),
            None => Err(Error::InvalidClass(s.to_string())),
        }
    }

    /// Build a query in this class. Never fails.
    pub fn query(&self, selector: impl Into<String>) -> Query {
        Query {
            class: self.clone(),
            selector: selector.into(),
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.name)
    }
}

impl FromStr for Class {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A query: a class plus a domain-specific selector
///
/// The canonical form is `domain:class:selector`. The selector is opaque to
/// this layer and may itself contain colons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    /// Class the query selects from
    pub class: Class,

    /// Domain-specific selector, everything after the second colon
    pub selector: String,
}

impl Query {
    /// Parse a query string, splitting on the first two colons only
    ///
    /// # Examples
    ///
    /// ```
    /// use korrel8r_core::Query;
    ///
    /// let q = Query::parse("metric:metric:rate(x[5m]):y").unwrap();
    /// assert_eq!(q.class.name, "metric");
    /// assert_eq!(q.selector, "rate(x[5m]):y");
    /// assert_eq!(q.to_string(), "metric:metric:rate(x[5m]):y");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(domain), Some(name), Some(selector)) => {
                Ok(Class::new(domain, name).query(selector))
            }
            _ => Err(Error::InvalidQuery(s.to_string())),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.selector)
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any selector survives a string round trip, colons included
        #[test]
        fn test_query_string_roundtrip(
            domain in "[a-z0-9]{1,8}",
            name in "[A-Za-z0-9._]{1,12}",
            selector in ".*",
        ) {
            let s = format!("{}:{}:{}", domain, name, selector);
            let q = Query::parse(&s).unwrap();
            prop_assert_eq!(&q.selector, &selector);
            prop_assert_eq!(q.to_string(), s);
        }

        /// Property: strings with fewer than two colons never parse
        #[test]
        fn test_query_needs_two_colons(s in "[^:]*(:[^:]*)?") {
            prop_assert!(Query::parse(&s).is_err());
        }
    }
}

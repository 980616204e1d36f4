//! Domain capability and the registry that dispatches to it
//!
//! Each signal domain (alerts, logs, metrics, Kubernetes objects, network
//! flows) knows the shape of its console links and of its query selectors.
//! Implementations live in other crates; this module only defines the
//! boundary and the name-keyed dispatch.

use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::query::{Class, Query};
use crate::uri_ref::UriRef;
use std::fmt;
use tracing::debug;

/// Conversion between queries and console links for one signal domain
///
/// `link_to_query(query_to_link(q))` must give back `q` for every query the
/// domain accepts, up to parameter order where the domain ignores order.
pub trait Domain: Send + Sync {
    /// Domain name, the first segment of queries in this domain
    fn name(&self) -> &str;

    /// Validate a class name and build the [`Class`]
    fn class(&self, name: &str) -> Result<Class>;

    /// Convert a query in this domain to a console link
    ///
    /// The constraint, if any, is encoded the way this domain's console page
    /// expects it.
    fn query_to_link(&self, query: &Query, constraint: Option<&Constraint>) -> Result<UriRef>;

    /// Convert a console link of this domain's shape to a query
    fn link_to_query(&self, link: &UriRef) -> Result<Query>;

    /// Error for a query that does not belong to this domain
    fn bad_query(&self, query: &Query) -> Error {
        Error::BadQuery {
            domain: self.name().to_string(),
            query: query.to_string(),
        }
    }

    /// Error for a link that does not match this domain's link shape
    fn bad_link(&self, link: &UriRef) -> Error {
        Error::BadLink {
            domain: self.name().to_string(),
            link: link.to_string(),
        }
    }

    /// True if the link has one of this domain's page shapes
    ///
    /// A domain that claims a link but fails to convert it reports the
    /// failure; the default claims links whose first segment is the domain
    /// name.
    fn claims_link(&self, link: &UriRef) -> bool {
        link.first_segment() == Some(self.name())
    }

    /// Fail with [`Domain::bad_query`] unless the query is in this domain
    fn check_query(&self, query: &Query) -> Result<()> {
        if query.class.domain == self.name() {
            Ok(())
        } else {
            Err(self.bad_query(query))
        }
    }
}

/// Ordered registry of domains
///
/// Names are not deduplicated by [`Domains::new`]; lookups return the first
/// domain with a matching name. Use [`Domains::with`] to replace a domain.
#[derive(Default)]
pub struct Domains {
    domains: Vec<Box<dyn Domain>>,
}

impl Domains {
    /// Create a registry from domains in dispatch order
    pub fn new(domains: Vec<Box<dyn Domain>>) -> Self {
        Self { domains }
    }

    /// Replace any domain with the same name, appending the new one
    pub fn with(mut self, domain: Box<dyn Domain>) -> Self {
        self.domains.retain(|d| d.name() != domain.name());
        self.domains.push(domain);
        self
    }

    /// Look up a domain by name
    pub fn get(&self, name: &str) -> Option<&dyn Domain> {
        self.domains.iter().find(|d| d.name() == name).map(|d| d.as_ref())
    }

    /// Domain names in registry order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.name())
    }

    /// Number of registered domains
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// True if no domain is registered
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Validate a `domain:name` class string against its domain
    pub fn class(&self, class: &str) -> Result<Class> {
        let parsed = Class::parse(class)?;
        let domain = self.get(&parsed.domain).ok_or_else(|| Error::UnknownDomain {
            domain: parsed.domain.clone(),
            input: class.to_string(),
        })?;
        domain.class(&parsed.name)
    }

    /// Convert a query to a link using the domain named by the query
    pub fn query_to_link(&self, query: &Query, constraint: Option<&Constraint>) -> Result<UriRef> {
        let domain = self.get(&query.class.domain).ok_or_else(|| Error::UnknownDomain {
            domain: query.class.domain.clone(),
            input: query.to_string(),
        })?;
        let link = domain.query_to_link(query, constraint)?;
        debug!(%query, %link, "query to link");
        Ok(link)
    }

    /// Convert a link to a query
    ///
    /// The domain named by the first path segment is asked first. Console
    /// links are rooted at console pages rather than domain names (and a
    /// `k8s/...` page may belong to another domain), so the remaining
    /// domains are then tried in registry order.
    ///
    /// # Errors
    /// If nobody accepts the link, the error of the named domain is returned,
    /// else the error of the first domain that [claims](Domain::claims_link)
    /// the link, else [`Error::UnknownDomain`].
    pub fn link_to_query(&self, link: &UriRef) -> Result<Query> {
        let segment = link.first_segment().unwrap_or_default();
        let mut named_error = None;
        if let Some(domain) = self.get(segment) {
            match domain.link_to_query(link) {
                Ok(query) => return Ok(query),
                Err(e) => named_error = Some(e),
            }
        }
        let mut claimed_error = None;
        for domain in self.domains.iter().filter(|d| d.name() != segment) {
            match domain.link_to_query(link) {
                Ok(query) => {
                    debug!(%link, %query, domain = domain.name(), "link to query");
                    return Ok(query);
                }
                Err(error) => {
                    debug!(%link, %error, domain = domain.name(), "link rejected");
                    if claimed_error.is_none() && domain.claims_link(link) {
                        claimed_error = Some(error);
                    }
                }
            }
        }
        Err(named_error.or(claimed_error).unwrap_or_else(|| Error::UnknownDomain {
            domain: segment.to_string(),
            input: link.to_string(),
        }))
    }
}

impl fmt::Debug for Domains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl FromIterator<Box<dyn Domain>> for Domains {
    fn from_iter<I: IntoIterator<Item = Box<dyn Domain>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Links are `<domain>/<class>?<selector>`
    struct FakeDomain(String);

    impl Domain for FakeDomain {
        fn name(&self) -> &str {
            &self.0
        }

        fn class(&self, name: &str) -> Result<Class> {
            Ok(Class::new(self.name(), name))
        }

        fn link_to_query(&self, link: &UriRef) -> Result<Query> {
            let mut segments = link.segments();
            match (segments.next(), segments.next()) {
                (Some(d), Some(class)) if d == self.name() => {
                    Ok(Class::new(d, class).query(link.search_params.to_string()))
                }
                _ => Err(self.bad_link(link)),
            }
        }

        fn query_to_link(&self, query: &Query, _: Option<&Constraint>) -> Result<UriRef> {
            self.check_query(query)?;
            let class = &query.class;
            UriRef::parse(&format!("{}/{}?{}", class.domain, class.name, query.selector))
        }
    }

    fn fake(name: &str) -> Box<dyn Domain> {
        Box::new(FakeDomain(name.to_string()))
    }

    #[test]
    fn test_domain_query_to_link() {
        let d = FakeDomain("a".to_string());
        let abc = d.class("b").unwrap().query("c=d");
        assert_eq!(d.query_to_link(&abc, None).unwrap().to_string(), "a/b?c=d");

        let err = d.query_to_link(&Query::parse("x:b:c").unwrap(), None).unwrap_err();
        assert_eq!(err.to_string(), "invalid query for domain a: x:b:c");
    }

    #[test]
    fn test_domain_link_to_query() {
        let d = FakeDomain("a".to_string());
        let abc = Query::parse("a:b:c=d").unwrap();
        for link in ["a/b?c=d", "/a/b?c=d", "http://blah/a/b?c=d"] {
            assert_eq!(d.link_to_query(&UriRef::parse(link).unwrap()).unwrap(), abc);
        }
        let err = d.link_to_query(&UriRef::parse("x/y").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "invalid link for domain a: x/y");
    }

    #[test]
    fn test_domains_query_to_link() {
        let ds = Domains::new(vec![fake("a"), fake("x")]);
        let abc = Query::parse("a:b:c=d").unwrap();
        let xyz = Query::parse("x:y:z=z").unwrap();
        assert_eq!(ds.query_to_link(&abc, None).unwrap().to_string(), "a/b?c=d");
        assert_eq!(ds.query_to_link(&xyz, None).unwrap().to_string(), "x/y?z=z");

        let err = ds.query_to_link(&Query::parse("z:b:c").unwrap(), None).unwrap_err();
        assert_eq!(err.to_string(), "unknown domain z: z:b:c");
    }

    #[test]
    fn test_domains_link_to_query() {
        let ds = Domains::new(vec![fake("a"), fake("x")]);
        let xyz = Query::parse("x:y:z=z").unwrap();
        let abc = Query::parse("a:b:c=d").unwrap();
        assert_eq!(ds.link_to_query(&UriRef::parse("x/y?z=z").unwrap()).unwrap(), xyz);
        assert_eq!(ds.link_to_query(&UriRef::parse("/x/y?z=z").unwrap()).unwrap(), xyz);
        assert_eq!(ds.link_to_query(&UriRef::parse("http://blah/a/b?c=d").unwrap()).unwrap(), abc);

        let err = ds.link_to_query(&UriRef::parse("/z/b?c=d").unwrap()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownDomain {
                domain: "z".to_string(),
                input: "/z/b?c=d".to_string()
            }
        );

        // A named domain that rejects the link keeps its own error
        let err = ds.link_to_query(&UriRef::parse("/a").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "invalid link for domain a: /a");
    }

    /// Owns the `page/...` links, which carry the selector in `q`
    struct PageDomain;

    impl Domain for PageDomain {
        fn name(&self) -> &str {
            "p"
        }

        fn class(&self, name: &str) -> Result<Class> {
            Ok(Class::new("p", name))
        }

        fn query_to_link(&self, query: &Query, _: Option<&Constraint>) -> Result<UriRef> {
            UriRef::with_params("page", [("q", query.selector.as_str())])
        }

        fn link_to_query(&self, link: &UriRef) -> Result<Query> {
            match link.search_params.get("q") {
                Some(q) if self.claims_link(link) => Ok(Class::new("p", "c").query(q)),
                _ => Err(self.bad_link(link)),
            }
        }

        fn claims_link(&self, link: &UriRef) -> bool {
            link.relative_path() == "page"
        }
    }

    #[test]
    fn test_domains_link_claimed_by_fallback() {
        let ds = Domains::new(vec![fake("a"), Box::new(PageDomain)]);
        let q = ds.link_to_query(&UriRef::parse("/page?q=x").unwrap()).unwrap();
        assert_eq!(q.to_string(), "p:c:x");

        // The claiming domain's rejection is reported, not an unknown domain
        let err = ds.link_to_query(&UriRef::parse("/page?other=x").unwrap()).unwrap_err();
        assert_eq!(
            err,
            Error::BadLink {
                domain: "p".to_string(),
                link: "/page?other=x".to_string()
            }
        );

        let err = ds.link_to_query(&UriRef::parse("/elsewhere").unwrap()).unwrap_err();
        assert!(matches!(err, Error::UnknownDomain { .. }));
    }

    #[test]
    fn test_domains_class() {
        let ds = Domains::new(vec![fake("a")]);
        assert_eq!(ds.class("a:b").unwrap(), Class::new("a", "b"));
        assert!(matches!(ds.class("z:b"), Err(Error::UnknownDomain { .. })));
        assert!(matches!(ds.class("nocolon"), Err(Error::InvalidClass(_))));
    }

    #[test]
    fn test_domains_with_replaces() {
        let ds = Domains::new(vec![fake("a"), fake("x")]).with(fake("a"));
        assert_eq!(ds.names().collect::<Vec<_>>(), vec!["x", "a"]);
        assert_eq!(ds.len(), 2);
    }
}

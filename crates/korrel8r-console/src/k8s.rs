//! Kubernetes domain: resources and the console resource pages

use korrel8r_core::{Class, Constraint, Domain, Error, Query, Result, UriRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Plural resource names the console uses in place of `group~version~Kind`
const WELL_KNOWN: &[(&str, &str, &str, &str)] = &[
    // (plural, group, version, Kind)
    ("pods", "", "v1", "Pod"),
    ("services", "", "v1", "Service"),
    ("configmaps", "", "v1", "ConfigMap"),
    ("secrets", "", "v1", "Secret"),
    ("nodes", "", "v1", "Node"),
    ("namespaces", "", "v1", "Namespace"),
    ("persistentvolumeclaims", "", "v1", "PersistentVolumeClaim"),
    ("persistentvolumes", "", "v1", "PersistentVolume"),
    ("events", "", "v1", "Event"),
    ("serviceaccounts", "", "v1", "ServiceAccount"),
    ("deployments", "apps", "v1", "Deployment"),
    ("statefulsets", "apps", "v1", "StatefulSet"),
    ("daemonsets", "apps", "v1", "DaemonSet"),
    ("replicasets", "apps", "v1", "ReplicaSet"),
    ("jobs", "batch", "v1", "Job"),
    ("cronjobs", "batch", "v1", "CronJob"),
    ("projects", "project.openshift.io", "v1", "Project"),
    ("routes", "route.openshift.io", "v1", "Route"),
];

/// Resource type: kind, version and API group (empty for the core group)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gvk {
    /// API group, empty for core
    pub group: String,
    /// API version
    pub version: String,
    /// Kind, capitalized
    pub kind: String,
}

impl Gvk {
    /// Parse a class name `Kind.version[.group]`
    pub fn from_class_name(name: &str) -> Option<Self> {
        let mut parts = name.splitn(3, '.');
        let gvk = Self {
            kind: parts.next()?.to_string(),
            version: parts.next()?.to_string(),
            group: parts.next().unwrap_or_default().to_string(),
        };
        // `Pod.v1.` would come back as `Pod.v1`
        (gvk.is_valid() && !name.ends_with('.')).then_some(gvk)
    }

    /// Kind is capitalized, version alphanumeric, group a DNS-style name
    ///
    /// `core` is reserved: the console spells the empty core group that way.
    fn is_valid(&self) -> bool {
        let alnum = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
        alnum(&self.kind)
            && self.kind.starts_with(|c: char| c.is_ascii_uppercase())
            && alnum(&self.version)
            && self.group != "core"
            && self
                .group
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    }

    /// Class name `Kind.version[.group]`
    pub fn class_name(&self) -> String {
        if self.group.is_empty() {
            format!("{}.{}", self.kind, self.version)
        } else {
            format!("{}.{}.{}", self.kind, self.version, self.group)
        }
    }

    /// Parse a console resource segment, `group~version~Kind` or a plural
    pub fn from_resource(resource: &str) -> Option<Self> {
        let well_known = WELL_KNOWN.iter().find(|(plural, ..)| *plural == resource);
        if let Some(&(_, group, version, kind)) = well_known {
            return Some(Self {
                group: group.to_string(),
                version: version.to_string(),
                kind: kind.to_string(),
            });
        }
        let mut parts = resource.split('~');
        let gvk = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(version), Some(kind), None) => Self {
                group: if group == "core" { String::new() } else { group.to_string() },
                version: version.to_string(),
                kind: kind.to_string(),
            },
            _ => return None,
        };
        gvk.is_valid().then_some(gvk)
    }

    /// Console resource segment `group~version~Kind`
    pub fn resource(&self) -> String {
        let group = if self.group.is_empty() { "core" } else { &self.group };
        format!("{}~{}~{}", group, self.version, self.kind)
    }
}

/// Object selector, serialized as the query selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selector {
    /// Namespace, absent for cluster-scoped or all-namespace queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Object name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Label match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Kubernetes domain
///
/// Classes are `Kind.version[.group]`, e.g. `Pod.v1` or `Deployment.v1.apps`.
/// Selectors are JSON objects with optional `namespace`, `name` and `labels`.
///
/// Selectors come back from a link as compact JSON with fields in the order
/// `namespace`, `name`, `labels` and labels sorted by key. A selector the
/// console pages cannot carry is rejected: `name` together with `labels`,
/// path-unsafe namespaces or names, and labels containing `,` or padded
/// with whitespace.
#[derive(Debug, Clone, Default)]
pub struct K8sDomain;

impl K8sDomain {
    /// Domain name
    pub const NAME: &'static str = "k8s";

    fn query_for(&self, gvk: &Gvk, selector: &Selector) -> Result<Query> {
        let json = serde_json::to_string(selector).map_err(|e| {
            Error::InvalidQuery(format!("{}:{}:{}", Self::NAME, gvk.class_name(), e))
        })?;
        Ok(Class::new(Self::NAME, gvk.class_name()).query(json))
    }

    fn search_link(&self, link: &UriRef, namespace: Option<&str>) -> Result<Query> {
        let kind = link.search_params.get("kind").ok_or_else(|| self.bad_link(link))?;
        let gvk = Gvk::from_resource(kind).ok_or_else(|| self.bad_link(link))?;
        let labels = match link.search_params.get("q") {
            Some(q) => Some(parse_labels(q).ok_or_else(|| self.bad_link(link))?),
            None => None,
        };
        let selector = Selector {
            namespace: namespace.map(str::to_string),
            name: None,
            labels,
        };
        self.query_for(&gvk, &selector)
    }
}

impl Domain for K8sDomain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn class(&self, name: &str) -> Result<Class> {
        Gvk::from_class_name(name)
            .map(|gvk| Class::new(Self::NAME, gvk.class_name()))
            .ok_or_else(|| Error::InvalidClass(format!("{}:{}", Self::NAME, name)))
    }

    fn query_to_link(&self, query: &Query, _constraint: Option<&Constraint>) -> Result<UriRef> {
        self.check_query(query)?;
        let gvk = Gvk::from_class_name(&query.class.name).ok_or_else(|| self.bad_query(query))?;
        let selector: Selector =
            serde_json::from_str(&query.selector).map_err(|_| self.bad_query(query))?;
        let names = [&selector.namespace, &selector.name];
        if names.into_iter().flatten().any(|s| !is_path_segment(s)) {
            return Err(self.bad_query(query));
        }
        let resource = gvk.resource();
        if let Some(labels) = &selector.labels {
            let encodable = labels.iter().all(|(k, v)| is_label_term(k, v));
            if selector.name.is_some() || !encodable {
                return Err(self.bad_query(query));
            }
            let q = labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(",");
            let path = match &selector.namespace {
                Some(ns) => format!("search/ns/{}", ns),
                None => "search/all-namespaces".to_string(),
            };
            return UriRef::with_params(&path, [("kind", resource), ("q", q)]);
        }
        let path = match (&selector.namespace, &selector.name) {
            (Some(ns), Some(name)) => format!("k8s/ns/{}/{}/{}", ns, resource, name),
            (Some(ns), None) => format!("k8s/ns/{}/{}", ns, resource),
            (None, Some(name)) => format!("k8s/cluster/{}/{}", resource, name),
            (None, None) => format!("k8s/all-namespaces/{}", resource),
        };
        UriRef::parse(&path)
    }

    fn link_to_query(&self, link: &UriRef) -> Result<Query> {
        let segments: Vec<&str> = link.segments().collect();
        let (resource, namespace, name) = match segments.as_slice() {
            ["search", "ns", ns] => return self.search_link(link, Some(*ns)),
            ["search", "all-namespaces"] => return self.search_link(link, None),
            ["k8s", "ns", ns, resource] => (*resource, Some(*ns), None),
            ["k8s", "ns", ns, resource, name] => (*resource, Some(*ns), Some(*name)),
            ["k8s", "ns", ns, resource, name, tab] if *tab != "aggregated-logs" => {
                debug!(%link, tab, "ignoring resource page tab");
                (*resource, Some(*ns), Some(*name))
            }
            ["k8s", "cluster", resource] => (*resource, None, None),
            ["k8s", "cluster", resource, name] => (*resource, None, Some(*name)),
            ["k8s", "all-namespaces", resource] => (*resource, None, None),
            _ => return Err(self.bad_link(link)),
        };
        let gvk = Gvk::from_resource(resource).ok_or_else(|| self.bad_link(link))?;
        let selector = Selector {
            namespace: namespace.map(str::to_string),
            name: name.map(str::to_string),
            labels: None,
        };
        self.query_for(&gvk, &selector)
    }

    fn claims_link(&self, link: &UriRef) -> bool {
        matches!(link.first_segment(), Some("k8s" | "search"))
    }
}

/// Namespace or object name that survives as one path segment
fn is_path_segment(s: &str) -> bool {
    !matches!(s, "" | "." | "..")
        && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}

/// Label match that survives the `k=v,k2=v2` search form
fn is_label_term(key: &str, value: &str) -> bool {
    let bare = |s: &str| !s.contains(',') && s.trim() == s;
    !key.is_empty() && !key.contains('=') && bare(key) && bare(value)
}

/// Parse a `k=v,k2=v2` label selector; only equality matches are supported
fn parse_labels(s: &str) -> Option<BTreeMap<String, String>> {
    s.split(',')
        .filter(|term| !term.trim().is_empty())
        .map(|term| {
            let (k, v) = term.split_once('=')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty()).then(|| (k.to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(s: &str) -> UriRef {
        UriRef::parse(s).unwrap()
    }

    #[test]
    fn test_class_names() {
        let d = K8sDomain;
        assert_eq!(d.class("Pod.v1").unwrap().to_string(), "k8s:Pod.v1");
        assert_eq!(d.class("Deployment.v1.apps").unwrap().to_string(), "k8s:Deployment.v1.apps");
        assert_eq!(
            d.class("Route.v1.route.openshift.io").unwrap().to_string(),
            "k8s:Route.v1.route.openshift.io"
        );
        assert!(d.class("pod.v1").is_err());
        assert!(d.class("Pod").is_err());
        assert!(d.class("Pod.v1.").is_err());
        assert!(d.class("Pod.v1.core").is_err());
        assert!(d.class("Pod~x.v1").is_err());
    }

    #[test]
    fn test_resource_segments() {
        let pod = Gvk::from_resource("core~v1~Pod").unwrap();
        assert_eq!(pod, Gvk::from_resource("pods").unwrap());
        assert_eq!(pod.resource(), "core~v1~Pod");
        let deploy = Gvk::from_resource("apps~v1~Deployment").unwrap();
        assert_eq!(deploy.class_name(), "Deployment.v1.apps");
        assert!(Gvk::from_resource("nosuch").is_none());
        assert!(Gvk::from_resource("a~b~c~d").is_none());
    }

    #[test]
    fn test_links_to_queries() {
        let d = K8sDomain;
        let cases = [
            ("/k8s/ns/netobserv/core~v1~Pod", r#"k8s:Pod.v1:{"namespace":"netobserv"}"#),
            ("k8s/ns/demo/pods/web-1", r#"k8s:Pod.v1:{"namespace":"demo","name":"web-1"}"#),
            (
                "k8s/ns/demo/deployments/web/events",
                r#"k8s:Deployment.v1.apps:{"namespace":"demo","name":"web"}"#,
            ),
            ("k8s/cluster/nodes/worker-0", r#"k8s:Node.v1:{"name":"worker-0"}"#),
            ("k8s/cluster/core~v1~Namespace", "k8s:Namespace.v1:{}"),
            ("k8s/all-namespaces/apps~v1~StatefulSet", "k8s:StatefulSet.v1.apps:{}"),
            (
                "search/ns/demo?kind=core~v1~Pod&q=app%3Dweb%2Ctier%3Dfront",
                r#"k8s:Pod.v1:{"namespace":"demo","labels":{"app":"web","tier":"front"}}"#,
            ),
        ];
        for (l, want) in cases {
            assert_eq!(d.link_to_query(&link(l)).unwrap().to_string(), want, "link {}", l);
        }
    }

    #[test]
    fn test_round_trip() {
        let d = K8sDomain;
        for q in [
            r#"k8s:Pod.v1:{"namespace":"netobserv"}"#,
            r#"k8s:Pod.v1:{"namespace":"demo","name":"web-1"}"#,
            r#"k8s:Node.v1:{"name":"worker-0"}"#,
            "k8s:Deployment.v1.apps:{}",
            r#"k8s:Pod.v1:{"labels":{"app":"web"}}"#,
        ] {
            let q = Query::parse(q).unwrap();
            let l = d.query_to_link(&q, None).unwrap();
            assert_eq!(d.link_to_query(&l).unwrap(), q, "link {}", l);
        }
        let q = Query::parse(r#"k8s:Pod.v1:{"namespace":"netobserv"}"#).unwrap();
        assert_eq!(
            d.query_to_link(&q, None).unwrap().to_string(),
            "k8s/ns/netobserv/core~v1~Pod"
        );
    }

    #[test]
    fn test_label_values() {
        let d = K8sDomain;
        for q in [
            r#"k8s:Pod.v1:{"namespace":"demo","labels":{"app":"a=b","tier":""}}"#,
            r#"k8s:Pod.v1:{"labels":{}}"#,
            r#"k8s:Pod.v1:{"labels":{"app.kubernetes.io/name":"web server"}}"#,
        ] {
            let q = Query::parse(q).unwrap();
            let l = d.query_to_link(&q, None).unwrap();
            assert_eq!(d.link_to_query(&l).unwrap(), q, "link {}", l);
        }
    }

    #[test]
    fn test_selector_normalized() {
        let q = Query::parse(r#"k8s:Pod.v1:{ "labels": {"b":"2","a":"1"}, "namespace": "x" }"#)
            .unwrap();
        let l = K8sDomain.query_to_link(&q, None).unwrap();
        assert_eq!(
            K8sDomain.link_to_query(&l).unwrap().selector,
            r#"{"namespace":"x","labels":{"a":"1","b":"2"}}"#
        );
    }

    #[test]
    fn test_unencodable_selectors() {
        let d = K8sDomain;
        for selector in [
            r#"{"namespace":"demo","name":"web","labels":{"app":"web"}}"#,
            r#"{"labels":{"app":"x,y"}}"#,
            r#"{"labels":{"a,b":"x"}}"#,
            r#"{"labels":{"a=b":"x"}}"#,
            r#"{"labels":{"":"x"}}"#,
            r#"{"labels":{"app":" x"}}"#,
            r#"{"namespace":"a/b"}"#,
            r#"{"namespace":"demo","name":"a/b"}"#,
            r#"{"name":".."}"#,
            r#"{"namespace":""}"#,
            r#"{"namespace":"a?b"}"#,
        ] {
            let q = Class::new("k8s", "Pod.v1").query(selector);
            assert!(
                matches!(d.query_to_link(&q, None), Err(Error::BadQuery { .. })),
                "selector {}",
                selector
            );
        }
    }

    #[test]
    fn test_rejects() {
        let d = K8sDomain;
        assert!(d.link_to_query(&link("k8s/ns/demo/pods/web/aggregated-logs")).is_err());
        assert!(d.link_to_query(&link("k8s/ns/demo/nosuch/web")).is_err());
        assert!(d.link_to_query(&link("monitoring/logs")).is_err());
        assert!(d.link_to_query(&link("search/ns/demo?q=app%3Dweb")).is_err());
        assert!(d.link_to_query(&link("search/ns/demo?kind=core~v1~pod")).is_err());
        assert!(d.claims_link(&link("/search/all-namespaces")));
        assert!(d.claims_link(&link("k8s/nosuch")));
        assert!(!d.claims_link(&link("monitoring/logs")));
        let bad = Query::parse(r#"k8s:Pod.v1:{"nosuch":"x"}"#).unwrap();
        assert!(matches!(d.query_to_link(&bad, None), Err(Error::BadQuery { .. })));
    }
}

//! Log domain: LokiStack tenants and the console log pages

use korrel8r_core::{Class, Constraint, Domain, Error, Query, Result, UriRef};
use regex::Regex;
use std::sync::LazyLock;

const LOG_PATH: &str = "monitoring/logs";

static POD_LOGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^k8s/ns/([^/]+)/pods/([^/]+)/aggregated-logs/?$").expect("valid regex")
});

static LOG_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[^}]*log_type=~?"([^"]+)""#).expect("valid regex"));

/// Log tenant, used as the class name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogClass {
    /// Workload logs
    Application,
    /// Platform logs
    Infrastructure,
    /// API audit logs
    Audit,
}

impl LogClass {
    /// Tenant name
    pub fn as_str(&self) -> &'static str {
        match self {
            LogClass::Application => "application",
            LogClass::Infrastructure => "infrastructure",
            LogClass::Audit => "audit",
        }
    }

    /// Parse a tenant name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "application" => Some(LogClass::Application),
            "infrastructure" => Some(LogClass::Infrastructure),
            "audit" => Some(LogClass::Audit),
            _ => None,
        }
    }

    /// Tenant for pod logs in a namespace
    pub fn for_namespace(namespace: &str) -> Self {
        if namespace.starts_with("kube") || namespace.starts_with("openshift-") {
            LogClass::Infrastructure
        } else {
            LogClass::Application
        }
    }
}

/// Log domain
///
/// Selectors are LogQL. Links go to the log search page, with the tenant as
/// a parameter; aggregated pod-log pages are also accepted.
#[derive(Debug, Clone, Default)]
pub struct LogDomain;

impl LogDomain {
    /// Domain name
    pub const NAME: &'static str = "log";
}

impl Domain for LogDomain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn class(&self, name: &str) -> Result<Class> {
        LogClass::parse(name)
            .map(|c| Class::new(Self::NAME, c.as_str()))
            .ok_or_else(|| Error::InvalidClass(format!("{}:{}", Self::NAME, name)))
    }

    fn query_to_link(&self, query: &Query, constraint: Option<&Constraint>) -> Result<UriRef> {
        self.check_query(query)?;
        let class = LogClass::parse(&query.class.name).ok_or_else(|| self.bad_query(query))?;
        let params = [("q", query.selector.as_str()), ("tenant", class.as_str())];
        let mut link = UriRef::with_params(LOG_PATH, params)?;
        if let Some(c) = constraint {
            if let Some(start) = c.start {
                link.search_params.set("start", start.timestamp_millis().to_string());
            }
            if let Some(end) = c.end {
                link.search_params.set("end", end.timestamp_millis().to_string());
            }
        }
        Ok(link)
    }

    fn link_to_query(&self, link: &UriRef) -> Result<Query> {
        let path = link.relative_path();
        if let Some(m) = POD_LOGS.captures(path) {
            let (namespace, pod) = (&m[1], &m[2]);
            let class = LogClass::for_namespace(namespace);
            return Ok(Class::new(Self::NAME, class.as_str()).query(format!(
                r#"{{kubernetes_namespace_name="{}",kubernetes_pod_name="{}"}}"#,
                namespace, pod
            )));
        }
        if path.trim_end_matches('/') != LOG_PATH {
            return Err(self.bad_link(link));
        }
        let logql = link.search_params.get("q").ok_or_else(|| self.bad_link(link))?;
        let tenant = link
            .search_params
            .get("tenant")
            .or_else(|| LOG_TYPE.captures(logql).and_then(|m| m.get(1)).map(|m| m.as_str()));
        let class = tenant.and_then(LogClass::parse).ok_or_else(|| self.bad_link(link))?;
        Ok(Class::new(Self::NAME, class.as_str()).query(logql))
    }

    fn claims_link(&self, link: &UriRef) -> bool {
        let path = link.relative_path();
        path.trim_end_matches('/') == LOG_PATH || POD_LOGS.is_match(path)
    }
}

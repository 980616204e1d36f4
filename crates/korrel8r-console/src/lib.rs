//! korrel8r Console Domains
//!
//! [`Domain`](korrel8r_core::Domain) implementations for the OpenShift web
//! console link scheme, one module per signal domain.
//!
//! | Domain    | Classes                                  | Console page                  |
//! |-----------|------------------------------------------|-------------------------------|
//! | `alert`   | `alert`                                  | `monitoring/alerts`           |
//! | `log`     | `application`, `infrastructure`, `audit` | `monitoring/logs`             |
//! | `metric`  | `metric`                                 | `monitoring/query-browser`    |
//! | `netflow` | `network`                                | `netflow-traffic`             |
//! | `k8s`     | `Kind.version[.group]`                   | `k8s/...`, `search/...`       |
//!
//! # Examples
//!
//! ```
//! use korrel8r_console::all_domains;
//! use korrel8r_core::{Query, UriRef};
//!
//! let domains = all_domains();
//! let query = domains
//!     .link_to_query(&UriRef::parse("/k8s/ns/netobserv/core~v1~Pod").unwrap())
//!     .unwrap();
//! assert_eq!(query.to_string(), r#"k8s:Pod.v1:{"namespace":"netobserv"}"#);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alert;
pub mod k8s;
pub mod log;
pub mod metric;
pub mod netflow;

pub use alert::AlertDomain;
pub use k8s::K8sDomain;
pub use log::{LogClass, LogDomain};
pub use metric::MetricDomain;
pub use netflow::NetflowDomain;

use korrel8r_core::Domains;
use std::collections::BTreeMap;

/// Default registry of every console domain
///
/// The alert domain starts with an empty rule ID table; see [`with_alert_ids`].
pub fn all_domains() -> Domains {
    Domains::new(vec![
        Box::new(AlertDomain::default()),
        Box::new(LogDomain),
        Box::new(MetricDomain),
        Box::new(NetflowDomain),
        Box::new(K8sDomain),
    ])
}

/// Default registry with an alert-rule ID → alert name table
pub fn with_alert_ids(ids: BTreeMap<String, String>) -> Domains {
    tracing::debug!(count = ids.len(), "alert rule ids");
    all_domains().with(Box::new(AlertDomain::new(ids)))
}

//! Alert domain: Prometheus alerts and the console alerting pages

use korrel8r_core::{Class, Constraint, Domain, Error, Query, Result, UriRef};
use std::collections::BTreeMap;

const ALERTS_PATH: &str = "monitoring/alerts";
const CLASS: &str = "alert";
const ALERTNAME: &str = "alertname";

/// Alert domain
///
/// Selectors are JSON label maps such as `{"alertname":"KubePodCrashLooping"}`.
/// Console alert pages are addressed by alert-rule ID, so the domain carries
/// an ID → alert name table supplied by the caller from the rules it has
/// loaded. Alerts without a known ID link to the filtered alert list.
///
/// Console alert pages filter on the alert name only, so a selector with any
/// other label is rejected. Selectors come back from a link as compact JSON.
#[derive(Debug, Clone, Default)]
pub struct AlertDomain {
    ids: BTreeMap<String, String>,
}

impl AlertDomain {
    /// Domain name
    pub const NAME: &'static str = "alert";

    /// Create an alert domain with an alert-rule ID → alert name table
    pub fn new(ids: BTreeMap<String, String>) -> Self {
        Self { ids }
    }

    /// Alert name for a rule ID
    pub fn name_for_id(&self, id: &str) -> Option<&str> {
        self.ids.get(id).map(String::as_str)
    }

    /// First rule ID (in ID order) for an alert name
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.ids.iter().find(|(_, n)| *n == name).map(|(id, _)| id.as_str())
    }

    fn query_for(&self, alertname: &str) -> Result<Query> {
        let labels = BTreeMap::from([(ALERTNAME, alertname)]);
        let selector = serde_json::to_string(&labels)
            .map_err(|e| Error::InvalidQuery(format!("{}:{}:{}", Self::NAME, CLASS, e)))?;
        Ok(Class::new(Self::NAME, CLASS).query(selector))
    }
}

impl Domain for AlertDomain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn class(&self, name: &str) -> Result<Class> {
        if name == CLASS {
            Ok(Class::new(Self::NAME, CLASS))
        } else {
            Err(Error::InvalidClass(format!("{}:{}", Self::NAME, name)))
        }
    }

    fn query_to_link(&self, query: &Query, _constraint: Option<&Constraint>) -> Result<UriRef> {
        self.check_query(query)?;
        if query.class.name != CLASS {
            return Err(self.bad_query(query));
        }
        let labels: BTreeMap<String, String> =
            serde_json::from_str(&query.selector).map_err(|_| self.bad_query(query))?;
        let alertname = match labels.get(ALERTNAME) {
            Some(name) if labels.len() == 1 => name,
            _ => return Err(self.bad_query(query)),
        };
        match self.id_for_name(alertname) {
            Some(id) => UriRef::parse(&format!("{}/{}", ALERTS_PATH, id)),
            None => UriRef::with_params(ALERTS_PATH, [("alerts", alertname.as_str())]),
        }
    }

    fn link_to_query(&self, link: &UriRef) -> Result<Query> {
        let segments: Vec<&str> = link.segments().collect();
        match segments.as_slice() {
            ["monitoring", "alerts" | "alertrules", id] => {
                let name = self.name_for_id(id).ok_or_else(|| self.bad_link(link))?;
                self.query_for(name)
            }
            ["monitoring", "alerts"] => {
                let name = link.search_params.get("alerts").ok_or_else(|| self.bad_link(link))?;
                self.query_for(name)
            }
            _ => Err(self.bad_link(link)),
        }
    }

    fn claims_link(&self, link: &UriRef) -> bool {
        let segments: Vec<&str> = link.segments().take(2).collect();
        matches!(segments.as_slice(), ["monitoring", "alerts" | "alertrules"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> AlertDomain {
        AlertDomain::new(BTreeMap::from([
            ("a1b2".to_string(), "KubePodCrashLooping".to_string()),
            ("c3d4".to_string(), "Watchdog".to_string()),
        ]))
    }

    #[test]
    fn test_link_by_id() {
        let d = domain();
        let q = Query::parse(r#"alert:alert:{"alertname":"Watchdog"}"#).unwrap();
        let l = d.query_to_link(&q, None).unwrap();
        assert_eq!(l.to_string(), "monitoring/alerts/c3d4");
        assert_eq!(d.link_to_query(&l).unwrap(), q);
        let rule_page = UriRef::parse("/monitoring/alertrules/a1b2").unwrap();
        assert_eq!(
            d.link_to_query(&rule_page).unwrap().selector,
            r#"{"alertname":"KubePodCrashLooping"}"#
        );
    }

    #[test]
    fn test_link_without_id() {
        let d = AlertDomain::default();
        let q = Query::parse(r#"alert:alert:{"alertname":"Watchdog"}"#).unwrap();
        let l = d.query_to_link(&q, None).unwrap();
        assert_eq!(l.to_string(), "monitoring/alerts?alerts=Watchdog");
        assert_eq!(d.link_to_query(&l).unwrap(), q);
    }

    #[test]
    fn test_selector_normalized() {
        let d = AlertDomain::default();
        let q = Query::parse(r#"alert:alert:{ "alertname" : "a b&c" }"#).unwrap();
        let l = d.query_to_link(&q, None).unwrap();
        assert_eq!(d.link_to_query(&l).unwrap().selector, r#"{"alertname":"a b&c"}"#);
    }

    #[test]
    fn test_rejects() {
        let d = domain();
        let link = |s: &str| UriRef::parse(s).unwrap();
        assert!(d.link_to_query(&link("monitoring/alerts/unknown")).is_err());
        assert!(d.link_to_query(&link("monitoring/logs")).is_err());
        assert!(d.claims_link(&link("/monitoring/alertrules/unknown")));
        assert!(!d.claims_link(&link("/monitoring/logs")));
        for selector in [
            r#"{"severity":"critical"}"#,
            r#"{"alertname":"Watchdog","severity":"critical"}"#,
        ] {
            let q = Class::new("alert", "alert").query(selector);
            assert!(matches!(d.query_to_link(&q, None), Err(Error::BadQuery { .. })));
        }
        let not_json = Query::parse("alert:alert:Watchdog").unwrap();
        assert!(d.query_to_link(&not_json, None).is_err());
    }
}

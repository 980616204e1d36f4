//! Network observability domain: flow filters and the netflow traffic page

use korrel8r_core::{Class, Constraint, Domain, Error, Query, Result, UriRef};
use regex::Regex;
use std::sync::LazyLock;

const TRAFFIC_PATH: &str = "netflow-traffic";
const CLASS: &str = "network";

static FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)\s*=\s*"([^"]*)""#).expect("valid regex"));

static FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").expect("valid regex"));

/// Network flow domain
///
/// Selectors are flow-field matches in label-selector form,
/// `{SrcK8S_Namespace="demo",DstK8S_Name="web"}`. The console traffic page
/// takes them as `filters=SrcK8S_Namespace=demo;DstK8S_Name=web`.
///
/// The traffic page has no escape for `;`, so a value containing one is
/// rejected. Selectors come back from a link in canonical form: no
/// whitespace around `=` and `,`, field order kept.
#[derive(Debug, Clone, Default)]
pub struct NetflowDomain;

impl NetflowDomain {
    /// Domain name
    pub const NAME: &'static str = "netflow";
}

/// Field matches in a selector, in order; `None` if anything else is present
fn parse_selector(selector: &str) -> Option<Vec<(String, String)>> {
    let inner = selector.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut filters = Vec::new();
    let mut rest = inner.trim();
    while !rest.is_empty() {
        let m = FILTER
            .captures(rest)
            .filter(|m| m.get(0).is_some_and(|all| all.start() == 0))?;
        filters.push((m[1].to_string(), m[2].to_string()));
        rest = rest[m[0].len()..].trim_start();
        rest = match rest.strip_prefix(',') {
            Some(after) => after.trim_start(),
            None if rest.is_empty() => rest,
            None => return None,
        };
    }
    Some(filters)
}

fn format_selector<'a>(filters: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let terms: Vec<String> = filters.map(|(k, v)| format!(r#"{}="{}""#, k, v)).collect();
    format!("{{{}}}", terms.join(","))
}

/// One `field=value` entry of the `filters` parameter
fn parse_filter(filter: &str) -> Option<(&str, &str)> {
    let (field, value) = filter.split_once('=')?;
    (FIELD.is_match(field) && !value.contains('"')).then_some((field, value))
}

impl Domain for NetflowDomain {
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

    fn query_to_link(&self, query: &Query, constraint: Option<&Constraint>) -> Result<UriRef> {
        self.check_query(query)?;
        if query.class.name != CLASS {
            return Err(self.bad_query(query));
        }
        let filters = parse_selector(&query.selector).ok_or_else(|| self.bad_query(query))?;
        if filters.iter().any(|(_, v)| v.contains(';')) {
            return Err(self.bad_query(query));
        }
        let encoded: Vec<String> =
            filters.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let mut link = UriRef::with_params(TRAFFIC_PATH, [("filters", encoded.join(";"))])?;
        if let Some(c) = constraint {
            if let Some(start) = c.start {
                link.search_params.set("startTime", start.timestamp().to_string());
            }
            if let Some(end) = c.end {
                link.search_params.set("endTime", end.timestamp().to_string());
            }
            if let Some(limit) = c.limit {
                link.search_params.set("limit", limit.to_string());
            }
        }
        Ok(link)
    }

    fn link_to_query(&self, link: &UriRef) -> Result<Query> {
        if !self.claims_link(link) {
            return Err(self.bad_link(link));
        }
        let filters = link.search_params.get("filters").unwrap_or_default();
        let pairs = filters
            .split(';')
            .filter(|f| !f.is_empty())
            .map(parse_filter)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.bad_link(link))?;
        Ok(Class::new(Self::NAME, CLASS).query(format_selector(pairs.into_iter())))
    }

    fn claims_link(&self, link: &UriRef) -> bool {
        link.relative_path().trim_end_matches('/') == TRAFFIC_PATH
    }
}

//! Metric domain: PromQL and the console query browser

use korrel8r_core::{Class, Constraint, Domain, Error, Query, Result, UriRef};

const QUERY_BROWSER: &str = "monitoring/query-browser";
const CLASS: &str = "metric";

/// Metric domain
///
/// There is a single class, `metric`; the selector is a PromQL expression
/// carried in the query browser's `query0` parameter.
#[derive(Debug, Clone, Default)]
pub struct MetricDomain;

impl MetricDomain {
    /// Domain name
    pub const NAME: &'static str = "metric";
}

impl Domain for MetricDomain {
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
        let params = [("query0", query.selector.as_str())];
        let mut link = UriRef::with_params(QUERY_BROWSER, params)?;
        if let Some(c) = constraint {
            if let (Some(start), Some(end)) = (c.start, c.end) {
                link.search_params
                    .set("timeRange", (end - start).num_milliseconds().to_string());
            }
            if let Some(end) = c.end {
                link.search_params.set("endTime", end.timestamp_millis().to_string());
            }
        }
        Ok(link)
    }

    fn link_to_query(&self, link: &UriRef) -> Result<Query> {
        if !self.claims_link(link) {
            return Err(self.bad_link(link));
        }
        let promql = link.search_params.get("query0").ok_or_else(|| self.bad_link(link))?;
        Ok(Class::new(Self::NAME, CLASS).query(promql))
    }

    fn claims_link(&self, link: &UriRef) -> bool {
        link.relative_path().trim_end_matches('/') == QUERY_BROWSER
    }
}

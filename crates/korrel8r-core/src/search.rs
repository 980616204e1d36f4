//! Search parameters for a correlation request

use crate::api;
use crate::constraint::Constraint;
use crate::domain::Domains;
use crate::error::Result;
use crate::query::Query;
use serde::Serialize;

/// Default neighbourhood depth
pub const DEFAULT_DEPTH: u32 = 3;

/// Largest neighbourhood depth the panel allows
pub const MAX_DEPTH: u32 = 10;

/// Kind of graph search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchType {
    /// Follow rules outward up to a depth
    Depth(u32),
    /// Find paths to a goal class string
    Goal(String),
}

impl SearchType {
    /// Neighbourhood search with depth clamped to `1..=MAX_DEPTH`
    pub fn depth(depth: u32) -> Self {
        SearchType::Depth(depth.clamp(1, MAX_DEPTH))
    }
}

impl Default for SearchType {
    fn default() -> Self {
        SearchType::Depth(DEFAULT_DEPTH)
    }
}

/// Request body for one of the graph endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Request {
    /// `POST /graphs/neighbours`
    Neighbours(api::Neighbours),
    /// `POST /graphs/goals`
    Goals(api::Goals),
}

impl Request {
    /// Endpoint path relative to the korrel8r API root
    pub fn path(&self) -> &'static str {
        match self {
            Request::Neighbours(_) => "graphs/neighbours",
            Request::Goals(_) => "graphs/goals",
        }
    }
}

/// A correlation search: start query, search type and constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Search {
    /// Start query string, possibly empty
    pub query: String,

    /// Neighbourhood or goal search
    pub search_type: SearchType,

    /// Time window and limits
    pub constraint: Option<Constraint>,
}

impl Search {
    /// Create a default-depth search from a query string
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the search type
    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Set the constraint
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Search start; a blank query sends no queries
    pub fn start(&self) -> api::Start {
        let query = self.query.trim();
        api::Start {
            queries: (!query.is_empty()).then(|| vec![query.to_string()]),
            constraint: self.constraint.as_ref().map(Constraint::to_api),
        }
    }

    /// Build the request body for this search
    pub fn request(&self) -> Request {
        let start = self.start();
        match &self.search_type {
            SearchType::Depth(depth) => Request::Neighbours(api::Neighbours {
                start,
                depth: (*depth).clamp(1, MAX_DEPTH),
            }),
            SearchType::Goal(goal) => Request::Goals(api::Goals {
                start,
                goals: vec![goal.trim().to_string()],
            }),
        }
    }

    /// Check the query converts to a link and, for a goal search, that the
    /// goal class is known
    pub fn validate(&self, domains: &Domains) -> Result<()> {
        let query = Query::parse(self.query.trim())?;
        domains.query_to_link(&query, None)?;
        if let SearchType::Goal(goal) = &self.search_type {
            domains.class(goal.trim())?;
        }
        Ok(())
    }
}

//! Error taxonomy for the correlation model

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the value objects, domains and graph construction.
///
/// Errors are `Clone + PartialEq` because they are captured inside
/// [`QueryCount`](crate::QueryCount) and [`Node`](crate::Node) values and
/// compared by content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A query string without at least two colons
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// A class string without a domain prefix
    #[error("invalid class: {0}")]
    InvalidClass(String),

    /// A URI reference that cannot be parsed or resolved
    #[error("invalid URI reference {uri}: {reason}")]
    InvalidUri {
        /// Offending input
        uri: String,
        /// Underlying parse failure
        reason: String,
    },

    /// A wire constraint with a malformed field
    #[error("invalid constraint {field}: {value}")]
    InvalidConstraint {
        /// Wire field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// A query routed to a domain it does not belong to
    #[error("invalid query for domain {domain}: {query}")]
    BadQuery {
        /// Domain that rejected the query
        domain: String,
        /// Full query string
        query: String,
    },

    /// A link routed to a domain whose link shape it does not match
    #[error("invalid link for domain {domain}: {link}")]
    BadLink {
        /// Domain that rejected the link
        domain: String,
        /// Full link string
        link: String,
    },

    /// No registered domain matched a query, class or link
    #[error("unknown domain {domain}: {input}")]
    UnknownDomain {
        /// The unmatched domain name or path segment
        domain: String,
        /// The original query, class or link string
        input: String,
    },

    /// An edge whose endpoint is not among the graph's nodes
    #[error("unresolved edge {start} -> {goal}: no node {missing}")]
    UnresolvedEdge {
        /// Start class id as sent by the API
        start: String,
        /// Goal class id as sent by the API
        goal: String,
        /// The id that has no node
        missing: String,
    },

    /// A comparison against an absent value
    #[error("cannot compare {0} with a missing value")]
    MissingOperand(String),
}

impl Error {
    /// Build an [`Error::InvalidUri`] from any displayable reason.
    pub fn invalid_uri(uri: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::InvalidUri {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }
}

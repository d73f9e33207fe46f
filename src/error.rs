use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An atom was constructed with a missing predicate, a missing or
    /// wrongly-sorted argument, or the wrong number of arguments.
    #[error("invalid atom: {0}")]
    InvalidAtom(String),

    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// A built-in atom names a function the engine does not implement. This
    /// is an authoring error in the rule, so evaluation stops.
    #[error("unsupported built-in {0:?}")]
    UnsupportedBuiltIn(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("malformed rule graph: {0}")]
    MalformedGraph(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

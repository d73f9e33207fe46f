use std::fmt;

use num_bigint::BigInt;

use crate::vocab::{self, xsd};

/// An absolute (or CURIE-like) resource identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The text after the last `#` or `/`, or the whole IRI when neither
    /// occurs (or nothing follows it).
    pub fn local_name(&self) -> &str {
        match self.0.rfind(|c| c == '#' || c == '/') {
            Some(index) if index + 1 < self.0.len() => &self.0[index + 1..],
            _ => &self.0,
        }
    }

    pub fn in_namespace(&self, namespace: &str) -> Option<&str> {
        self.0.strip_prefix(namespace)
    }
}

impl From<&str> for Iri {
    fn from(iri: &str) -> Self {
        Self::new(iri)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// Identifier of an anonymous individual (a blank node), without the `_:`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankId(String);

impl BlankId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub const BLANK_NODE_PREFIX: &str = "_:";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Individual {
    Named(Iri),
    Anonymous(BlankId),
}

impl Individual {
    pub fn named(iri: impl Into<String>) -> Self {
        Self::Named(Iri::new(iri))
    }

    pub fn anonymous(id: impl Into<String>) -> Self {
        Self::Anonymous(BlankId::new(id))
    }

    /// Decides named vs. anonymous from a serialized identifier. This is the
    /// only place the `_:` convention is looked at.
    pub fn parse(serialized: &str) -> Self {
        match serialized.strip_prefix(BLANK_NODE_PREFIX) {
            Some(id) => Self::anonymous(id),
            None => Self::named(serialized),
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// The serialized identifier: the IRI text or `_:id`.
    pub fn serialize(&self) -> String {
        match self {
            Self::Named(iri) => iri.as_str().to_owned(),
            Self::Anonymous(id) => format!("{}{}", BLANK_NODE_PREFIX, id.as_str()),
        }
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(iri) => iri.fmt(f),
            Self::Anonymous(id) => write!(f, "{}{}", BLANK_NODE_PREFIX, id.as_str()),
        }
    }
}

/// An RDF literal. Plain literals are `xsd:string` typed literals; language
/// tags are kept lower-case so that tags differing only in case are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Literal {
    Typed { lexical: String, datatype: Iri },
    Lang { lexical: String, lang: String },
}

impl Literal {
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        Self::Typed {
            lexical: lexical.into(),
            datatype: datatype.into(),
        }
    }

    pub fn string(lexical: impl Into<String>) -> Self {
        Self::typed(lexical, xsd::STRING)
    }

    pub fn lang(lexical: impl Into<String>, lang: &str) -> Self {
        Self::Lang {
            lexical: lexical.into(),
            lang: lang.to_ascii_lowercase(),
        }
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        let value: BigInt = value.into();
        Self::typed(value.to_string(), xsd::INTEGER)
    }

    pub fn double(value: f64) -> Self {
        Self::typed(value.to_string(), xsd::DOUBLE)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), xsd::BOOLEAN)
    }

    pub fn lexical(&self) -> &str {
        match self {
            Self::Typed { lexical, .. } | Self::Lang { lexical, .. } => lexical,
        }
    }

    pub fn datatype(&self) -> &str {
        match self {
            Self::Typed { datatype, .. } => datatype.as_str(),
            Self::Lang { .. } => vocab::rdf::LANG_STRING,
        }
    }

    pub fn is_numeric(&self) -> bool {
        vocab::is_numeric_datatype(self.datatype())
    }

    /// Numeric value of a numeric-typed literal. `None` for other datatypes
    /// and for ill-typed lexical forms.
    pub fn as_f64(&self) -> Option<f64> {
        if !self.is_numeric() {
            return None;
        }
        match self.lexical().trim() {
            "INF" | "+INF" => Some(f64::INFINITY),
            "-INF" => Some(f64::NEG_INFINITY),
            "NaN" => Some(f64::NAN),
            lexical => lexical.parse().ok(),
        }
    }

    /// Exact value of an integer-typed literal.
    pub fn as_integer(&self) -> Option<BigInt> {
        if !vocab::is_integer_datatype(self.datatype()) {
            return None;
        }
        let lexical = self.lexical().trim();
        lexical.strip_prefix('+').unwrap_or(lexical).parse().ok()
    }
}

/// A value bound to a variable in a binding table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Individual(Individual),
    Literal(Literal),
}

impl Term {
    pub fn as_individual(&self) -> Option<&Individual> {
        match self {
            Self::Individual(individual) => Some(individual),
            Self::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            Self::Individual(_) => None,
        }
    }

    /// Text used by string built-ins: the literal's lexical form, or the
    /// individual's serialized identifier.
    pub fn lexical_form(&self) -> String {
        match self {
            Self::Individual(individual) => individual.serialize(),
            Self::Literal(literal) => literal.lexical().to_owned(),
        }
    }
}

impl From<Individual> for Term {
    fn from(individual: Individual) -> Self {
        Self::Individual(individual)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

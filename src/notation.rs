//! The human-readable notation of atoms and rules. Inference provenance is
//! the notation of the producing atom, so the format is part of the
//! contract: `Agent(?P)`, `knows(?P,?Q)`, `sameAs(?L,?R)`,
//! `not(ex:dtprop(?L,?R))`, `"hello"@EN-US`, `"44"^^xsd:integer`.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;

use crate::ast::{Argument, Atom, Rule};
use crate::table::BindingTable;
use crate::term::{Individual, Literal, Term};
use crate::vocab::{OWL, RDF, RDFS, XSD};

const COMPACTED_NAMESPACES: [(&str, &str); 4] =
    [("xsd", XSD), ("rdf", RDF), ("rdfs", RDFS), ("owl", OWL)];

fn write_quoted(f: &mut Formatter<'_>, lexical: &str) -> FmtResult {
    write!(f, "\"")?;
    for c in lexical.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Literal::Lang { lexical, lang } => {
                write_quoted(f, lexical)?;
                write!(f, "@{}", lang.to_ascii_uppercase())
            }
            Literal::Typed { lexical, datatype } => {
                write_quoted(f, lexical)?;
                let compact = COMPACTED_NAMESPACES
                    .iter()
                    .find_map(|(prefix, namespace)| {
                        datatype.in_namespace(namespace).map(|local| (prefix, local))
                    });
                match compact {
                    Some((prefix, local)) => write!(f, "^^{}:{}", prefix, local),
                    None => write!(f, "^^{}", datatype),
                }
            }
        }
    }
}

/// An individual as it appears inside an atom: local name or `_:id`.
struct IndividualNotation<'a>(&'a Individual);

impl Display for IndividualNotation<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.0 {
            Individual::Named(iri) => write!(f, "{}", iri.local_name()),
            anonymous => write!(f, "{}", anonymous),
        }
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Argument::Variable(name) => write!(f, "?{}", name),
            Argument::Individual(individual) => IndividualNotation(individual).fmt(f),
            Argument::Literal(literal) => literal.fmt(f),
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Atom::Class { class, subject } => write!(f, "{}({})", class.local_name(), subject),
            Atom::DataRange { datatype, subject } => {
                write!(f, "{}({})", datatype.local_name(), subject)
            }
            Atom::ObjectProperty {
                property,
                subject,
                object: second,
            }
            | Atom::DataProperty {
                property,
                subject,
                value: second,
            } => write!(f, "{}({},{})", property.local_name(), subject, second),
            Atom::SameIndividual { left, right } => write!(f, "sameAs({},{})", left, right),
            Atom::DifferentIndividuals { left, right } => {
                write!(f, "differentFrom({},{})", left, right)
            }
            Atom::BuiltIn {
                builtin,
                left,
                right,
                operand,
            } => {
                write!(f, "{}({},{}", builtin.local_name(), left, right)?;
                if let Some(operand) = operand {
                    write!(f, ",{}", operand)?;
                }
                write!(f, ")")
            }
            Atom::NegativeClass { class, subject } => {
                write!(f, "not({}({}))", class.local_name(), subject)
            }
            Atom::NegativeObjectProperty {
                property,
                subject,
                object: second,
            }
            | Atom::NegativeDataProperty {
                property,
                subject,
                value: second,
            } => write!(f, "not({}({},{}))", property.local_name(), subject, second),
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} -> {}",
            self.antecedent().iter().join(" ^ "),
            self.consequent().iter().join(" ^ ")
        )
    }
}

/// Shorthand used by the command line front end.
pub fn render_rule(rule: &Rule) -> String {
    match rule.name() {
        Some(name) => format!("[{}] {}", name, rule),
        None => rule.to_string(),
    }
}

/// Tab-separated, one line per row under a header of `?column` names.
impl Display for BindingTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}", self.columns().iter().map(|c| format!("?{}", c)).join("\t"))?;
        for row in self.rows() {
            let cells = row.iter().map(|term| match term {
                Term::Individual(individual) => IndividualNotation(individual).to_string(),
                Term::Literal(literal) => literal.to_string(),
            });
            writeln!(f, "{}", cells.format("\t"))?;
        }
        Ok(())
    }
}

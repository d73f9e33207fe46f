pub mod antecedent;
pub mod ast;
pub mod builtins;
pub mod consequent;
pub mod error;
pub mod kb;
pub mod notation;
pub mod ontology;
pub mod parser;
pub mod rdf;
pub mod reasoner;
pub mod table;
pub mod term;
pub mod vocab;

#[cfg(test)]
mod tests;

pub use ast::{Argument, Atom, Rule};
pub use consequent::Inference;
pub use error::{Error, Result};
pub use kb::KnowledgeBase;
pub use ontology::{Axiom, ClassExpression, ObjectPropertyExpression, Ontology};
pub use parser::{parse_atom, parse_document, parse_literal, parse_rule, Document};
pub use reasoner::{Reasoner, ReasonerConfig, Saturation};
pub use table::BindingTable;
pub use term::{Individual, Iri, Literal, Term};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::ast::{Argument, Atom};
use crate::ontology::{Axiom, ClassExpression, ObjectPropertyExpression};
use crate::table::BindingTable;
use crate::term::{Individual, Literal, Term};

/// An axiom derived by a rule, with the notation of the consequent atom that
/// produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Inference {
    pub axiom: Axiom,
    pub provenance: String,
}

impl Atom {
    /// One inference per row of `table` that binds every variable of this
    /// atom with a value of the right sort. Duplicates are removed. Data
    /// ranges and built-ins never infer anything.
    pub fn evaluate_consequent(&self, table: &BindingTable) -> Vec<Inference> {
        if self.is_consequent_inert() {
            return vec![];
        }
        let missing: Vec<&str> = self
            .variables()
            .into_iter()
            .filter(|variable| !table.has_column(variable))
            .collect();
        if !missing.is_empty() {
            debug!("{}: variables {:?} are never bound, skipping", self, missing);
            return vec![];
        }

        let provenance = self.to_string();
        table
            .bindings()
            .filter_map(|binding| {
                let axiom = self.instantiate(|argument| match argument {
                    Argument::Variable(name) => binding.get(name).cloned(),
                    constant => constant.as_term(),
                });
                if axiom.is_none() {
                    trace!("{}: row {:?} does not fit, skipping", self, binding.row());
                }
                axiom
            })
            .unique()
            .map(|axiom| Inference {
                axiom,
                provenance: provenance.clone(),
            })
            .collect()
    }

    /// The axiom this atom states once `value_of` supplies every argument.
    /// `None` when a value is missing or of the wrong sort, when the atom is
    /// consequent-inert, or when an equality atom relates an individual to
    /// itself.
    pub fn instantiate(&self, value_of: impl Fn(&Argument) -> Option<Term>) -> Option<Axiom> {
        let individual = |argument: &Argument| -> Option<Individual> {
            match value_of(argument)? {
                Term::Individual(individual) => Some(individual),
                Term::Literal(_) => None,
            }
        };
        let literal = |argument: &Argument| -> Option<Literal> {
            match value_of(argument)? {
                Term::Literal(literal) => Some(literal),
                Term::Individual(_) => None,
            }
        };

        let axiom = match self {
            Atom::Class { class, subject } => Axiom::ClassAssertion {
                class: ClassExpression::Class(class.clone()),
                individual: individual(subject)?,
            },
            Atom::NegativeClass { class, subject } => Axiom::ClassAssertion {
                class: ClassExpression::ComplementOf(class.clone()),
                individual: individual(subject)?,
            },
            Atom::ObjectProperty {
                property,
                subject,
                object,
            } => Axiom::ObjectPropertyAssertion {
                property: ObjectPropertyExpression::Property(property.clone()),
                subject: individual(subject)?,
                object: individual(object)?,
            },
            Atom::NegativeObjectProperty {
                property,
                subject,
                object,
            } => Axiom::NegativeObjectPropertyAssertion {
                property: ObjectPropertyExpression::Property(property.clone()),
                subject: individual(subject)?,
                object: individual(object)?,
            },
            Atom::DataProperty {
                property,
                subject,
                value,
            } => Axiom::DataPropertyAssertion {
                property: property.clone(),
                subject: individual(subject)?,
                value: literal(value)?,
            },
            Atom::NegativeDataProperty {
                property,
                subject,
                value,
            } => Axiom::NegativeDataPropertyAssertion {
                property: property.clone(),
                subject: individual(subject)?,
                value: literal(value)?,
            },
            Atom::SameIndividual { left, right } => {
                let (left, right) = (individual(left)?, individual(right)?);
                if left == right {
                    return None;
                }
                Axiom::same_individual([left, right])
            }
            Atom::DifferentIndividuals { left, right } => {
                let (left, right) = (individual(left)?, individual(right)?);
                if left == right {
                    return None;
                }
                Axiom::different_individuals([left, right])
            }
            Atom::DataRange { .. } | Atom::BuiltIn { .. } => return None,
        };
        Some(axiom)
    }
}

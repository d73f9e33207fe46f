//! Antecedent evaluation: each atom kind turns knowledge base answers into a
//! binding table with one column per distinct variable of the atom.

use tracing::trace;

use crate::ast::{Argument, Atom};
use crate::error::Result;
use crate::kb::KnowledgeBase;
use crate::ontology::ClassExpression;
use crate::table::{BindingTable, BindingTableBuilder};
use crate::term::{Individual, Term};

/// Matches one argument against a candidate value: a variable binds it
/// (consistently with an earlier occurrence), a constant must equal it.
fn bind(
    argument: &Argument,
    value: &Term,
    columns: &[String],
    row: &mut [Option<Term>],
) -> bool {
    match argument {
        Argument::Variable(name) => {
            let Some(index) = columns.iter().position(|column| column == name) else {
                return false;
            };
            match &row[index] {
                Some(bound) => bound == value,
                None => {
                    row[index] = Some(value.clone());
                    true
                }
            }
        }
        constant => constant.as_term().as_ref() == Some(value),
    }
}

/// Builds the table for `arguments` from candidate value tuples, keeping the
/// tuples every argument accepts.
fn bind_all<I>(atom: &Atom, arguments: &[&Argument], candidates: I) -> BindingTable
where
    I: IntoIterator<Item = Vec<Term>>,
{
    let columns: Vec<String> = atom.variables().into_iter().map(str::to_owned).collect();
    let mut builder = BindingTableBuilder::new(columns.clone());
    for candidate in candidates {
        let mut row = vec![None; columns.len()];
        let matched = arguments
            .iter()
            .zip(&candidate)
            .all(|(argument, value)| bind(argument, value, &columns, &mut row));
        if matched {
            builder.push_row(row.into_iter().flatten().collect());
        }
    }
    builder.build()
}

fn individual_pairs(pairs: Vec<(Individual, Individual)>) -> impl Iterator<Item = Vec<Term>> {
    pairs
        .into_iter()
        .map(|(source, target)| vec![Term::Individual(source), Term::Individual(target)])
}

fn unary<I>(atom: &Atom, subject: &Argument, values: I) -> BindingTable
where
    I: IntoIterator<Item = Term>,
{
    bind_all(atom, &[subject], values.into_iter().map(|value| vec![value]))
}

impl Atom {
    fn empty_table(&self) -> BindingTable {
        BindingTable::empty(self.variables().into_iter().map(str::to_owned).collect())
    }

    /// Matches this atom against `kb`. Built-ins generate nothing on their
    /// own (see [`crate::builtins::filter_table`]) and yield an empty table.
    pub fn evaluate_antecedent<K>(&self, kb: &K) -> Result<BindingTable>
    where
        K: KnowledgeBase + ?Sized,
    {
        let table = match self {
            Atom::Class { class, subject } => {
                if subject.as_variable().is_none() {
                    trace!("{}: constant subject, no bindings", self);
                    return Ok(self.empty_table());
                }
                let members = kb.individuals_of(&ClassExpression::Class(class.clone()));
                unary(self, subject, members.into_iter().map(Term::Individual))
            }
            Atom::NegativeClass { class, subject } => {
                if subject.as_variable().is_none() {
                    trace!("{}: constant subject, no bindings", self);
                    return Ok(self.empty_table());
                }
                let members = kb.individuals_of(&ClassExpression::ComplementOf(class.clone()));
                unary(self, subject, members.into_iter().map(Term::Individual))
            }
            Atom::ObjectProperty {
                property,
                subject,
                object,
            } => {
                let pairs = kb.calibrated_object_assertions(property);
                bind_all(self, &[subject, object], individual_pairs(pairs))
            }
            Atom::NegativeObjectProperty {
                property,
                subject,
                object,
            } => {
                let pairs = kb.negative_object_assertions(property);
                bind_all(self, &[subject, object], individual_pairs(pairs))
            }
            Atom::DataProperty {
                property,
                subject,
                value,
            } => {
                let pairs = kb.data_assertions(property).into_iter().map(|(source, literal)| {
                    vec![Term::Individual(source), Term::Literal(literal)]
                });
                bind_all(self, &[subject, value], pairs)
            }
            Atom::NegativeDataProperty {
                property,
                subject,
                value,
            } => {
                let pairs = kb
                    .negative_data_assertions(property)
                    .into_iter()
                    .map(|(source, literal)| {
                        vec![Term::Individual(source), Term::Literal(literal)]
                    });
                bind_all(self, &[subject, value], pairs)
            }
            Atom::DataRange { datatype, subject } => {
                if subject.as_variable().is_none() {
                    trace!("{}: constant subject, no bindings", self);
                    return Ok(self.empty_table());
                }
                let members = kb
                    .data_literals()
                    .into_iter()
                    .filter(|literal| kb.literal_is_member(datatype, literal))
                    .map(Term::Literal);
                unary(self, subject, members)
            }
            Atom::SameIndividual { left, right } => {
                let pairs = equality_pairs(kb, left, right, |individual| {
                    kb.same_individuals(individual)
                });
                bind_all(self, &[left, right], individual_pairs(pairs))
            }
            Atom::DifferentIndividuals { left, right } => {
                let pairs = equality_pairs(kb, left, right, |individual| {
                    kb.different_individuals(individual)
                });
                bind_all(self, &[left, right], individual_pairs(pairs))
            }
            Atom::BuiltIn { .. } => self.empty_table(),
        };
        trace!("{}: {} rows", self, table.len());
        Ok(table)
    }
}

/// Candidate pairs for a symmetric individual relation. A constant on either
/// side anchors the lookup; with two variables every named individual in the
/// signature is expanded, which keeps the pair set closed under swapping.
fn equality_pairs<K, F>(
    kb: &K,
    left: &Argument,
    right: &Argument,
    related: F,
) -> Vec<(Individual, Individual)>
where
    K: KnowledgeBase + ?Sized,
    F: Fn(&Individual) -> Vec<Individual>,
{
    match (left, right) {
        (_, Argument::Individual(anchor)) => related(anchor)
            .into_iter()
            .map(|member| (member, anchor.clone()))
            .collect(),
        (Argument::Individual(anchor), _) => related(anchor)
            .into_iter()
            .map(|member| (anchor.clone(), member))
            .collect(),
        _ => kb
            .declared_individuals()
            .into_iter()
            .flat_map(|individual| {
                related(&individual)
                    .into_iter()
                    .map(move |member| (individual.clone(), member))
            })
            .collect(),
    }
}

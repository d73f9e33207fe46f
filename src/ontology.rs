//! A set-semantics, in-memory axiom store answering the [`KnowledgeBase`]
//! queries. It exposes told facts plus the sub-class, equality and
//! inequality closures; it is not a description-logic reasoner.

use std::collections::{btree_map, BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use itertools::Itertools;

use crate::consequent::Inference;
use crate::kb::KnowledgeBase;
use crate::term::{Individual, Iri, Literal};
use crate::vocab;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entity {
    Class(Iri),
    ObjectProperty(Iri),
    DataProperty(Iri),
    Datatype(Iri),
    NamedIndividual(Iri),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassExpression {
    Class(Iri),
    ComplementOf(Iri),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectPropertyExpression {
    Property(Iri),
    InverseOf(Iri),
}

impl ObjectPropertyExpression {
    /// Normalizes an assertion `(self, subject, object)` into the direction
    /// of the named property.
    pub fn calibrate<'a>(
        &'a self,
        subject: &'a Individual,
        object: &'a Individual,
    ) -> (&'a Iri, &'a Individual, &'a Individual) {
        match self {
            Self::Property(property) => (property, subject, object),
            Self::InverseOf(property) => (property, object, subject),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axiom {
    Declaration(Entity),
    SubClassOf {
        sub: Iri,
        sup: Iri,
    },
    ClassAssertion {
        class: ClassExpression,
        individual: Individual,
    },
    ObjectPropertyAssertion {
        property: ObjectPropertyExpression,
        subject: Individual,
        object: Individual,
    },
    NegativeObjectPropertyAssertion {
        property: ObjectPropertyExpression,
        subject: Individual,
        object: Individual,
    },
    DataPropertyAssertion {
        property: Iri,
        subject: Individual,
        value: Literal,
    },
    NegativeDataPropertyAssertion {
        property: Iri,
        subject: Individual,
        value: Literal,
    },
    SameIndividual(Vec<Individual>),
    DifferentIndividuals(Vec<Individual>),
}

impl Axiom {
    /// Member order does not matter for equality axioms, so members are kept
    /// sorted and unique.
    pub fn same_individual(members: impl IntoIterator<Item = Individual>) -> Self {
        Self::SameIndividual(members.into_iter().sorted().dedup().collect())
    }

    pub fn different_individuals(members: impl IntoIterator<Item = Individual>) -> Self {
        Self::DifferentIndividuals(members.into_iter().sorted().dedup().collect())
    }

    pub fn individuals(&self) -> Vec<&Individual> {
        match self {
            Self::Declaration(_) | Self::SubClassOf { .. } => vec![],
            Self::ClassAssertion { individual, .. } => vec![individual],
            Self::ObjectPropertyAssertion {
                subject, object, ..
            }
            | Self::NegativeObjectPropertyAssertion {
                subject, object, ..
            } => vec![subject, object],
            Self::DataPropertyAssertion { subject, .. }
            | Self::NegativeDataPropertyAssertion { subject, .. } => vec![subject],
            Self::SameIndividual(members) | Self::DifferentIndividuals(members) => {
                members.iter().collect()
            }
        }
    }
}

impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => class.fmt(f),
            Self::ComplementOf(class) => write!(f, "ObjectComplementOf({})", class),
        }
    }
}

impl fmt::Display for ObjectPropertyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(property) => property.fmt(f),
            Self::InverseOf(property) => write!(f, "ObjectInverseOf({})", property),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(iri) => write!(f, "Class({})", iri),
            Self::ObjectProperty(iri) => write!(f, "ObjectProperty({})", iri),
            Self::DataProperty(iri) => write!(f, "DataProperty({})", iri),
            Self::Datatype(iri) => write!(f, "Datatype({})", iri),
            Self::NamedIndividual(iri) => write!(f, "NamedIndividual({})", iri),
        }
    }
}

/// OWL functional-style rendering with full IRIs.
impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(entity) => write!(f, "Declaration({})", entity),
            Self::SubClassOf { sub, sup } => write!(f, "SubClassOf({} {})", sub, sup),
            Self::ClassAssertion { class, individual } => {
                write!(f, "ClassAssertion({} {})", class, individual)
            }
            Self::ObjectPropertyAssertion {
                property,
                subject,
                object,
            } => write!(
                f,
                "ObjectPropertyAssertion({} {} {})",
                property, subject, object
            ),
            Self::NegativeObjectPropertyAssertion {
                property,
                subject,
                object,
            } => write!(
                f,
                "NegativeObjectPropertyAssertion({} {} {})",
                property, subject, object
            ),
            Self::DataPropertyAssertion {
                property,
                subject,
                value,
            } => write!(
                f,
                "DataPropertyAssertion({} {} {})",
                property, subject, value
            ),
            Self::NegativeDataPropertyAssertion {
                property,
                subject,
                value,
            } => write!(
                f,
                "NegativeDataPropertyAssertion({} {} {})",
                property, subject, value
            ),
            Self::SameIndividual(members) => {
                write!(f, "SameIndividual({})", members.iter().join(" "))
            }
            Self::DifferentIndividuals(members) => {
                write!(f, "DifferentIndividuals({})", members.iter().join(" "))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Asserted,
    /// Derived by a rule; carries the notation of the producing atom.
    Inferred { provenance: String },
}

#[derive(Clone, Debug, Default)]
pub struct Ontology {
    axioms: BTreeMap<Axiom, Origin>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a told axiom. Returns whether it was absent before.
    pub fn insert(&mut self, axiom: Axiom) -> bool {
        match self.axioms.entry(axiom) {
            btree_map::Entry::Vacant(vacant) => {
                vacant.insert(Origin::Asserted);
                true
            }
            btree_map::Entry::Occupied(mut occupied) => {
                // A later assertion of an inferred axiom makes it told.
                occupied.insert(Origin::Asserted);
                false
            }
        }
    }

    /// Adds a derived axiom unless an equal axiom is already present.
    pub fn insert_inference(&mut self, inference: Inference) -> bool {
        match self.axioms.entry(inference.axiom) {
            btree_map::Entry::Vacant(vacant) => {
                vacant.insert(Origin::Inferred {
                    provenance: inference.provenance,
                });
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, axiom: &Axiom) -> bool {
        self.axioms.contains_key(axiom)
    }

    pub fn origin(&self, axiom: &Axiom) -> Option<&Origin> {
        self.axioms.get(axiom)
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn axioms(&self) -> impl Iterator<Item = (&Axiom, &Origin)> {
        self.axioms.iter()
    }

    /// Derived axioms with their provenance.
    pub fn inferred(&self) -> impl Iterator<Item = (&Axiom, &str)> {
        self.axioms.iter().filter_map(|(axiom, origin)| match origin {
            Origin::Inferred { provenance } => Some((axiom, provenance.as_str())),
            Origin::Asserted => None,
        })
    }

    fn keys(&self) -> impl Iterator<Item = &Axiom> {
        self.axioms.keys()
    }

    /// `class` and everything reachable from it along `SubClassOf` edges,
    /// upwards (`up`) or downwards.
    fn class_closure(&self, class: &Iri, up: bool) -> BTreeSet<Iri> {
        let mut closure = BTreeSet::from([class.clone()]);
        let mut queue = VecDeque::from([class.clone()]);
        while let Some(current) = queue.pop_front() {
            for axiom in self.keys() {
                let Axiom::SubClassOf { sub, sup } = axiom else {
                    continue;
                };
                let (from, to) = if up { (sub, sup) } else { (sup, sub) };
                if from == &current && closure.insert(to.clone()) {
                    queue.push_back(to.clone());
                }
            }
        }
        closure
    }

    /// The equality group of `individual`, including itself.
    fn same_group(&self, individual: &Individual) -> BTreeSet<Individual> {
        let mut group = BTreeSet::from([individual.clone()]);
        let mut queue = VecDeque::from([individual.clone()]);
        while let Some(current) = queue.pop_front() {
            for axiom in self.keys() {
                let Axiom::SameIndividual(members) = axiom else {
                    continue;
                };
                if !members.contains(&current) {
                    continue;
                }
                for member in members {
                    if group.insert(member.clone()) {
                        queue.push_back(member.clone());
                    }
                }
            }
        }
        group
    }

    fn object_pairs(&self, property: &Iri, negative: bool) -> Vec<(Individual, Individual)> {
        self.keys()
            .filter_map(|axiom| match (axiom, negative) {
                (
                    Axiom::ObjectPropertyAssertion {
                        property: expression,
                        subject,
                        object,
                    },
                    false,
                )
                | (
                    Axiom::NegativeObjectPropertyAssertion {
                        property: expression,
                        subject,
                        object,
                    },
                    true,
                ) => Some(expression.calibrate(subject, object)),
                _ => None,
            })
            .filter(|(named, _, _)| *named == property)
            .map(|(_, source, target)| (source.clone(), target.clone()))
            .unique()
            .collect()
    }

    fn data_pairs(&self, property: &Iri, negative: bool) -> Vec<(Individual, Literal)> {
        self.keys()
            .filter_map(|axiom| match (axiom, negative) {
                (
                    Axiom::DataPropertyAssertion {
                        property: asserted,
                        subject,
                        value,
                    },
                    false,
                )
                | (
                    Axiom::NegativeDataPropertyAssertion {
                        property: asserted,
                        subject,
                        value,
                    },
                    true,
                ) if asserted == property => Some((subject.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}

impl Extend<Axiom> for Ontology {
    fn extend<I: IntoIterator<Item = Axiom>>(&mut self, axioms: I) {
        for axiom in axioms {
            self.insert(axiom);
        }
    }
}

impl FromIterator<Axiom> for Ontology {
    fn from_iter<I: IntoIterator<Item = Axiom>>(axioms: I) -> Self {
        let mut ontology = Self::new();
        ontology.extend(axioms);
        ontology
    }
}

impl KnowledgeBase for Ontology {
    fn individuals_of(&self, class: &ClassExpression) -> Vec<Individual> {
        // i ∈ C for every C above a told class of i, and i ∈ ¬C for every C
        // below a told complement of i.
        let (classes, complement) = match class {
            ClassExpression::Class(class) => (self.class_closure(class, false), false),
            ClassExpression::ComplementOf(class) => (self.class_closure(class, true), true),
        };
        self.keys()
            .filter_map(|axiom| match axiom {
                Axiom::ClassAssertion {
                    class: ClassExpression::Class(told),
                    individual,
                } if !complement && classes.contains(told) => Some(individual.clone()),
                Axiom::ClassAssertion {
                    class: ClassExpression::ComplementOf(told),
                    individual,
                } if complement && classes.contains(told) => Some(individual.clone()),
                _ => None,
            })
            .unique()
            .collect()
    }

    fn calibrated_object_assertions(&self, property: &Iri) -> Vec<(Individual, Individual)> {
        self.object_pairs(property, false)
    }

    fn negative_object_assertions(&self, property: &Iri) -> Vec<(Individual, Individual)> {
        self.object_pairs(property, true)
    }

    fn data_assertions(&self, property: &Iri) -> Vec<(Individual, Literal)> {
        self.data_pairs(property, false)
    }

    fn negative_data_assertions(&self, property: &Iri) -> Vec<(Individual, Literal)> {
        self.data_pairs(property, true)
    }

    fn data_literals(&self) -> Vec<Literal> {
        self.keys()
            .filter_map(|axiom| match axiom {
                Axiom::DataPropertyAssertion { value, .. } => Some(value.clone()),
                _ => None,
            })
            .unique()
            .collect()
    }

    fn literal_is_member(&self, datatype: &Iri, literal: &Literal) -> bool {
        if !vocab::datatype_derives_from(literal.datatype(), datatype.as_str()) {
            return false;
        }
        // Ill-typed numeric lexical forms belong to no numeric datatype.
        !literal.is_numeric() || literal.as_f64().is_some()
    }

    fn same_individuals(&self, individual: &Individual) -> Vec<Individual> {
        self.same_group(individual)
            .into_iter()
            .filter(|member| member != individual)
            .collect()
    }

    fn different_individuals(&self, individual: &Individual) -> Vec<Individual> {
        let group = self.same_group(individual);
        let mut different = BTreeSet::new();
        for axiom in self.keys() {
            let Axiom::DifferentIndividuals(members) = axiom else {
                continue;
            };
            if !members.iter().any(|member| group.contains(member)) {
                continue;
            }
            for member in members.iter().filter(|member| !group.contains(*member)) {
                different.extend(self.same_group(member));
            }
        }
        different.into_iter().collect()
    }

    fn declared_individuals(&self) -> Vec<Individual> {
        let declared = self.keys().filter_map(|axiom| match axiom {
            Axiom::Declaration(Entity::NamedIndividual(iri)) => {
                Some(Individual::Named(iri.clone()))
            }
            _ => None,
        });
        let used = self
            .keys()
            .flat_map(Axiom::individuals)
            .filter(|individual| individual.is_named())
            .cloned();
        declared.chain(used).sorted().dedup().collect()
    }
}

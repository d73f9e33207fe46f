use itertools::Itertools;

use crate::error::{Error, Result};
use crate::term::{Individual, Iri, Literal, Term};

pub type Identifier = String;
pub type VariableName = Identifier;
pub type RuleName = Identifier;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Argument {
    Variable(VariableName),
    Individual(Individual),
    Literal(Literal),
}

impl Argument {
    pub fn variable(name: impl Into<VariableName>) -> Self {
        Self::Variable(name.into())
    }

    pub fn individual(iri: impl Into<String>) -> Self {
        Self::Individual(Individual::named(iri))
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// The value of a constant argument.
    pub fn as_term(&self) -> Option<Term> {
        match self {
            Self::Variable(_) => None,
            Self::Individual(individual) => Some(Term::Individual(individual.clone())),
            Self::Literal(literal) => Some(Term::Literal(literal.clone())),
        }
    }

    fn is_individual_sort(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    fn is_data_sort(&self) -> bool {
        !matches!(self, Self::Individual(_))
    }
}

impl From<Individual> for Argument {
    fn from(individual: Individual) -> Self {
        Self::Individual(individual)
    }
}

impl From<Literal> for Argument {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

/// One pattern clause of a rule. Build atoms through the checked
/// constructors; they reject arguments of the wrong sort.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Atom {
    Class {
        class: Iri,
        subject: Argument,
    },
    ObjectProperty {
        property: Iri,
        subject: Argument,
        object: Argument,
    },
    DataProperty {
        property: Iri,
        subject: Argument,
        value: Argument,
    },
    DataRange {
        datatype: Iri,
        subject: Argument,
    },
    SameIndividual {
        left: Argument,
        right: Argument,
    },
    DifferentIndividuals {
        left: Argument,
        right: Argument,
    },
    BuiltIn {
        builtin: Iri,
        left: Argument,
        right: Argument,
        operand: Option<Literal>,
    },
    NegativeClass {
        class: Iri,
        subject: Argument,
    },
    NegativeObjectProperty {
        property: Iri,
        subject: Argument,
        object: Argument,
    },
    NegativeDataProperty {
        property: Iri,
        subject: Argument,
        value: Argument,
    },
}

fn check_predicate(kind: &str, predicate: &Iri) -> Result<()> {
    if predicate.is_empty() {
        return Err(Error::InvalidAtom(format!("{} atom without a predicate", kind)));
    }
    Ok(())
}

fn check_argument(kind: &str, position: &str, argument: &Argument, ok: bool) -> Result<()> {
    if let Argument::Variable(name) = argument {
        if name.is_empty() {
            return Err(Error::InvalidAtom(format!(
                "{} atom has an unnamed variable as its {} argument",
                kind, position
            )));
        }
    }
    if !ok {
        return Err(Error::InvalidAtom(format!(
            "{} atom cannot take {:?} as its {} argument",
            kind, argument, position
        )));
    }
    Ok(())
}

impl Atom {
    pub fn class(class: Iri, subject: Argument) -> Result<Self> {
        check_predicate("class", &class)?;
        check_argument("class", "subject", &subject, subject.is_individual_sort())?;
        Ok(Self::Class { class, subject })
    }

    pub fn object_property(property: Iri, subject: Argument, object: Argument) -> Result<Self> {
        check_predicate("object property", &property)?;
        check_argument("object property", "subject", &subject, subject.is_individual_sort())?;
        check_argument("object property", "object", &object, object.is_individual_sort())?;
        Ok(Self::ObjectProperty {
            property,
            subject,
            object,
        })
    }

    pub fn data_property(property: Iri, subject: Argument, value: Argument) -> Result<Self> {
        check_predicate("data property", &property)?;
        check_argument("data property", "subject", &subject, subject.is_individual_sort())?;
        check_argument("data property", "value", &value, value.is_data_sort())?;
        Ok(Self::DataProperty {
            property,
            subject,
            value,
        })
    }

    pub fn data_range(datatype: Iri, subject: Argument) -> Result<Self> {
        check_predicate("data range", &datatype)?;
        check_argument("data range", "subject", &subject, subject.is_data_sort())?;
        Ok(Self::DataRange { datatype, subject })
    }

    pub fn same_individual(left: Argument, right: Argument) -> Result<Self> {
        check_argument("sameAs", "left", &left, left.is_individual_sort())?;
        check_argument("sameAs", "right", &right, right.is_individual_sort())?;
        Ok(Self::SameIndividual { left, right })
    }

    pub fn different_individuals(left: Argument, right: Argument) -> Result<Self> {
        check_argument("differentFrom", "left", &left, left.is_individual_sort())?;
        check_argument("differentFrom", "right", &right, right.is_individual_sort())?;
        Ok(Self::DifferentIndividuals { left, right })
    }

    /// Built-in identifiers are only resolved at evaluation time, so an
    /// unknown name is accepted here. Operand-taking arithmetic built-ins
    /// must be given a numeric operand.
    pub fn built_in(
        builtin: Iri,
        left: Argument,
        right: Argument,
        operand: Option<Literal>,
    ) -> Result<Self> {
        check_predicate("built-in", &builtin)?;
        check_argument("built-in", "left", &left, true)?;
        check_argument("built-in", "right", &right, true)?;
        if let Some(operand) = &operand {
            if operand.as_f64().is_none() {
                return Err(Error::InvalidAtom(format!(
                    "built-in {} has non-numeric operand {:?}",
                    builtin.local_name(),
                    operand
                )));
            }
        }
        let requires_operand = crate::builtins::BuiltIn::from_iri(&builtin)
            .map_or(false, |function| function.requires_operand());
        if requires_operand && operand.is_none() {
            return Err(Error::InvalidAtom(format!(
                "built-in {} requires an operand",
                builtin.local_name()
            )));
        }
        Ok(Self::BuiltIn {
            builtin,
            left,
            right,
            operand,
        })
    }

    pub fn negative_class(class: Iri, subject: Argument) -> Result<Self> {
        check_predicate("negative class", &class)?;
        check_argument("negative class", "subject", &subject, subject.is_individual_sort())?;
        Ok(Self::NegativeClass { class, subject })
    }

    pub fn negative_object_property(
        property: Iri,
        subject: Argument,
        object: Argument,
    ) -> Result<Self> {
        check_predicate("negative object property", &property)?;
        check_argument(
            "negative object property",
            "subject",
            &subject,
            subject.is_individual_sort(),
        )?;
        check_argument(
            "negative object property",
            "object",
            &object,
            object.is_individual_sort(),
        )?;
        Ok(Self::NegativeObjectProperty {
            property,
            subject,
            object,
        })
    }

    pub fn negative_data_property(
        property: Iri,
        subject: Argument,
        value: Argument,
    ) -> Result<Self> {
        check_predicate("negative data property", &property)?;
        check_argument(
            "negative data property",
            "subject",
            &subject,
            subject.is_individual_sort(),
        )?;
        check_argument("negative data property", "value", &value, value.is_data_sort())?;
        Ok(Self::NegativeDataProperty {
            property,
            subject,
            value,
        })
    }

    /// Arguments in notation order: left, then right if the atom is binary.
    pub fn arguments(&self) -> Vec<&Argument> {
        match self {
            Self::Class { subject, .. }
            | Self::NegativeClass { subject, .. }
            | Self::DataRange { subject, .. } => vec![subject],
            Self::ObjectProperty {
                subject, object, ..
            }
            | Self::NegativeObjectProperty {
                subject, object, ..
            } => vec![subject, object],
            Self::DataProperty { subject, value, .. }
            | Self::NegativeDataProperty { subject, value, .. } => vec![subject, value],
            Self::SameIndividual { left, right }
            | Self::DifferentIndividuals { left, right }
            | Self::BuiltIn { left, right, .. } => vec![left, right],
        }
    }

    /// Distinct variable names, in order of first occurrence. These are
    /// exactly the columns of the atom's antecedent table.
    pub fn variables(&self) -> Vec<&str> {
        self.arguments()
            .into_iter()
            .filter_map(Argument::as_variable)
            .unique()
            .collect()
    }

    pub fn predicate(&self) -> Option<&Iri> {
        match self {
            Self::Class { class, .. } | Self::NegativeClass { class, .. } => Some(class),
            Self::ObjectProperty { property, .. }
            | Self::DataProperty { property, .. }
            | Self::NegativeObjectProperty { property, .. }
            | Self::NegativeDataProperty { property, .. } => Some(property),
            Self::DataRange { datatype, .. } => Some(datatype),
            Self::BuiltIn { builtin, .. } => Some(builtin),
            Self::SameIndividual { .. } | Self::DifferentIndividuals { .. } => None,
        }
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self, Self::BuiltIn { .. })
    }

    /// Data ranges and built-ins never produce inferences.
    pub fn is_consequent_inert(&self) -> bool {
        matches!(self, Self::DataRange { .. } | Self::BuiltIn { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    name: Option<RuleName>,
    antecedent: Vec<Atom>,
    consequent: Vec<Atom>,
}

impl Rule {
    /// A built-in filters the table built by the atoms before it, so it can
    /// never open an antecedent.
    pub fn new(antecedent: Vec<Atom>, consequent: Vec<Atom>) -> Result<Self> {
        if let Some(first) = antecedent.first() {
            if first.is_built_in() {
                return Err(Error::InvalidRule(format!(
                    "built-in {} cannot be the first antecedent atom",
                    first
                )));
            }
        }
        Ok(Self {
            name: None,
            antecedent,
            consequent,
        })
    }

    pub fn with_name(mut self, name: impl Into<RuleName>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn antecedent(&self) -> &[Atom] {
        &self.antecedent
    }

    pub fn consequent(&self) -> &[Atom] {
        &self.consequent
    }

    /// Consequent variables that no generating antecedent atom binds. Rows
    /// can never populate them, so the atoms using them stay silent.
    pub fn unbound_variables(&self) -> Vec<&str> {
        let bound: Vec<&str> = self
            .antecedent
            .iter()
            .filter(|atom| !atom.is_built_in())
            .flat_map(Atom::variables)
            .collect();
        self.consequent
            .iter()
            .flat_map(Atom::variables)
            .filter(|variable| !bound.contains(variable))
            .unique()
            .collect()
    }
}

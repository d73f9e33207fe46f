//! The SWRL RDF vocabulary mapping. Every atom becomes a blank node typed
//! with its atom class, rules become `swrl:Imp` resources whose body and head
//! are RDF lists of atoms, and variables are `swrl:Variable` resources minted
//! under [`VARIABLE_NS`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::debug;

use crate::ast::{Argument, Atom, Rule};
use crate::error::{Error, Result};
use crate::term::{BlankId, Individual, Iri, Literal};
use crate::vocab::{rdf, rdfs, swrl, SWRL, VARIABLE_NS};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Iri(Iri),
    Blank(BlankId),
    Literal(Literal),
}

impl Node {
    fn iri(iri: &str) -> Self {
        Node::Iri(Iri::new(iri))
    }

    fn as_iri(&self) -> Option<&Iri> {
        match self {
            Node::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl From<&Individual> for Node {
    fn from(individual: &Individual) -> Self {
        match individual {
            Individual::Named(iri) => Node::Iri(iri.clone()),
            Individual::Anonymous(id) => Node::Blank(id.clone()),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

/// N-Triples term syntax.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(iri) => iri.fmt(f),
            Node::Blank(id) => write!(f, "_:{}", id.as_str()),
            Node::Literal(Literal::Typed { lexical, datatype }) => {
                f.write_str("\"")?;
                write_escaped(f, lexical)?;
                write!(f, "\"^^{}", datatype)
            }
            Node::Literal(Literal::Lang { lexical, lang }) => {
                f.write_str("\"")?;
                write_escaped(f, lexical)?;
                write!(f, "\"@{}", lang)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Iri,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: &str, object: Node) -> Self {
        Self {
            subject,
            predicate: Iri::new(predicate),
            object,
        }
    }
}

/// One N-Triples line, without the trailing newline.
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[derive(Default)]
struct Writer {
    triples: Vec<Triple>,
    blanks: usize,
    variables: BTreeSet<String>,
}

impl Writer {
    fn fresh(&mut self, kind: &str) -> Node {
        self.blanks += 1;
        Node::Blank(BlankId::new(format!("swrl-{}{}", kind, self.blanks)))
    }

    fn emit(&mut self, subject: &Node, predicate: &str, object: Node) {
        self.triples
            .push(Triple::new(subject.clone(), predicate, object));
    }

    fn argument(&mut self, argument: &Argument) -> Node {
        match argument {
            Argument::Variable(name) => {
                let node = Node::Iri(Iri::new(format!("{}{}", VARIABLE_NS, name)));
                if self.variables.insert(name.clone()) {
                    self.emit(&node, rdf::TYPE, Node::iri(swrl::VARIABLE));
                }
                node
            }
            Argument::Individual(individual) => individual.into(),
            Argument::Literal(literal) => Node::Literal(literal.clone()),
        }
    }

    fn atom(&mut self, atom: &Atom) -> Node {
        let node = self.fresh("atom");
        let (atom_type, predicate) = match atom {
            Atom::Class { class, .. } => {
                (swrl::CLASS_ATOM, Some((swrl::CLASS_PREDICATE, class)))
            }
            Atom::NegativeClass { class, .. } => (
                swrl::NEGATIVE_CLASS_ATOM,
                Some((swrl::CLASS_PREDICATE, class)),
            ),
            Atom::ObjectProperty { property, .. } => (
                swrl::INDIVIDUAL_PROPERTY_ATOM,
                Some((swrl::PROPERTY_PREDICATE, property)),
            ),
            Atom::NegativeObjectProperty { property, .. } => (
                swrl::NEGATIVE_INDIVIDUAL_PROPERTY_ATOM,
                Some((swrl::PROPERTY_PREDICATE, property)),
            ),
            Atom::DataProperty { property, .. } => (
                swrl::DATAVALUED_PROPERTY_ATOM,
                Some((swrl::PROPERTY_PREDICATE, property)),
            ),
            Atom::NegativeDataProperty { property, .. } => (
                swrl::NEGATIVE_DATAVALUED_PROPERTY_ATOM,
                Some((swrl::PROPERTY_PREDICATE, property)),
            ),
            Atom::DataRange { datatype, .. } => {
                (swrl::DATA_RANGE_ATOM, Some((swrl::DATA_RANGE, datatype)))
            }
            Atom::BuiltIn { builtin, .. } => {
                (swrl::BUILTIN_ATOM, Some((swrl::BUILTIN, builtin)))
            }
            Atom::SameIndividual { .. } => (swrl::SAME_INDIVIDUAL_ATOM, None),
            Atom::DifferentIndividuals { .. } => (swrl::DIFFERENT_INDIVIDUALS_ATOM, None),
        };
        self.emit(&node, rdf::TYPE, Node::iri(atom_type));
        if let Some((property, predicate)) = predicate {
            self.emit(&node, property, Node::Iri(predicate.clone()));
        }
        let slots = [swrl::ARGUMENT1, swrl::ARGUMENT2];
        for (slot, argument) in slots.iter().zip(atom.arguments()) {
            let object = self.argument(argument);
            self.emit(&node, slot, object);
        }
        if let Atom::BuiltIn {
            operand: Some(operand),
            ..
        } = atom
        {
            self.emit(&node, swrl::ARGUMENT3, Node::Literal(operand.clone()));
        }
        node
    }

    fn list(&mut self, atoms: &[Atom]) -> Node {
        let cells: Vec<Node> = atoms.iter().map(|_| self.fresh("list")).collect();
        for (index, atom) in atoms.iter().enumerate() {
            let item = self.atom(atom);
            self.emit(&cells[index], rdf::TYPE, Node::iri(swrl::ATOM_LIST));
            self.emit(&cells[index], rdf::FIRST, item);
            let rest = cells
                .get(index + 1)
                .cloned()
                .unwrap_or_else(|| Node::iri(rdf::NIL));
            self.emit(&cells[index], rdf::REST, rest);
        }
        cells.into_iter().next().unwrap_or_else(|| Node::iri(rdf::NIL))
    }

    fn rule(&mut self, rule: &Rule) {
        let node = self.fresh("rule");
        self.emit(&node, rdf::TYPE, Node::iri(swrl::IMP));
        if let Some(name) = rule.name() {
            self.emit(&node, rdfs::LABEL, Node::Literal(Literal::string(name)));
        }
        let body = self.list(rule.antecedent());
        self.emit(&node, swrl::BODY, body);
        let head = self.list(rule.consequent());
        self.emit(&node, swrl::HEAD, head);
    }
}

/// The triples describing a single atom. The atom's own node is the subject
/// of the first triple.
pub fn atom_to_triples(atom: &Atom) -> Vec<Triple> {
    let mut writer = Writer::default();
    writer.atom(atom);
    writer.triples
}

pub fn rule_to_triples(rule: &Rule) -> Vec<Triple> {
    rules_to_triples(std::slice::from_ref(rule))
}

/// Serializes rules into one graph; blank node labels are unique across it.
pub fn rules_to_triples(rules: &[Rule]) -> Vec<Triple> {
    let mut writer = Writer::default();
    for rule in rules {
        writer.rule(rule);
    }
    writer.triples
}

struct Graph<'a> {
    triples: &'a [Triple],
    by_subject: HashMap<&'a Node, Vec<&'a Triple>>,
}

fn malformed(message: String) -> Error {
    Error::MalformedGraph(message)
}

impl<'a> Graph<'a> {
    fn new(triples: &'a [Triple]) -> Self {
        let mut by_subject: HashMap<&Node, Vec<&Triple>> = HashMap::new();
        for triple in triples {
            by_subject.entry(&triple.subject).or_default().push(triple);
        }
        Self {
            triples,
            by_subject,
        }
    }

    fn objects(&self, subject: &Node, predicate: &str) -> impl Iterator<Item = &'a Node> + '_ {
        let predicate = predicate.to_owned();
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |triple| triple.predicate.as_str() == predicate)
            .map(|triple| &triple.object)
    }

    fn object(&self, subject: &Node, predicate: &str) -> Option<&'a Node> {
        self.objects(subject, predicate).next()
    }

    fn required(&self, subject: &Node, predicate: &str) -> Result<&'a Node> {
        self.object(subject, predicate)
            .ok_or_else(|| malformed(format!("{} has no {}", subject, predicate)))
    }

    fn has_type(&self, subject: &Node, class: &str) -> bool {
        self.objects(subject, rdf::TYPE)
            .any(|object| object.as_iri().map(Iri::as_str) == Some(class))
    }

    fn rule_nodes(&self) -> Vec<&'a Node> {
        let mut seen = BTreeSet::new();
        self.triples
            .iter()
            .filter(|triple| {
                triple.predicate.as_str() == rdf::TYPE
                    && triple.object.as_iri().map(Iri::as_str) == Some(swrl::IMP)
            })
            .map(|triple| &triple.subject)
            .filter(|subject| seen.insert(*subject))
            .collect()
    }

    fn list(&self, head: &'a Node) -> Result<Vec<&'a Node>> {
        let mut items = vec![];
        let mut cell = head;
        while cell != &Node::iri(rdf::NIL) {
            if items.len() > self.triples.len() {
                return Err(malformed(format!("atom list at {} does not end", head)));
            }
            items.push(self.required(cell, rdf::FIRST)?);
            cell = self.required(cell, rdf::REST)?;
        }
        Ok(items)
    }

    fn argument(&self, node: &Node) -> Argument {
        match node {
            Node::Literal(literal) => Argument::Literal(literal.clone()),
            Node::Iri(iri) => match iri.in_namespace(VARIABLE_NS) {
                Some(name) => Argument::Variable(name.to_owned()),
                None if self.has_type(node, swrl::VARIABLE) => {
                    Argument::Variable(iri.local_name().to_owned())
                }
                None => Argument::Individual(Individual::Named(iri.clone())),
            },
            Node::Blank(id) if self.has_type(node, swrl::VARIABLE) => {
                Argument::Variable(id.as_str().to_owned())
            }
            Node::Blank(id) => Argument::Individual(Individual::Anonymous(id.clone())),
        }
    }

    fn predicate(&self, atom: &Node, property: &str) -> Result<Iri> {
        self.required(atom, property)?
            .as_iri()
            .cloned()
            .ok_or_else(|| malformed(format!("{} of {} is not an IRI", property, atom)))
    }

    fn atom(&self, node: &Node) -> Result<Atom> {
        let atom_type = self
            .objects(node, rdf::TYPE)
            .filter_map(Node::as_iri)
            .find(|iri| iri.in_namespace(SWRL).is_some())
            .ok_or_else(|| malformed(format!("{} has no atom type", node)))?;
        let first = || -> Result<Argument> {
            Ok(self.argument(self.required(node, swrl::ARGUMENT1)?))
        };
        let second = || -> Result<Argument> {
            Ok(self.argument(self.required(node, swrl::ARGUMENT2)?))
        };

        match atom_type.as_str() {
            swrl::CLASS_ATOM => Atom::class(self.predicate(node, swrl::CLASS_PREDICATE)?, first()?),
            swrl::NEGATIVE_CLASS_ATOM => {
                Atom::negative_class(self.predicate(node, swrl::CLASS_PREDICATE)?, first()?)
            }
            swrl::INDIVIDUAL_PROPERTY_ATOM => Atom::object_property(
                self.predicate(node, swrl::PROPERTY_PREDICATE)?,
                first()?,
                second()?,
            ),
            swrl::NEGATIVE_INDIVIDUAL_PROPERTY_ATOM => Atom::negative_object_property(
                self.predicate(node, swrl::PROPERTY_PREDICATE)?,
                first()?,
                second()?,
            ),
            swrl::DATAVALUED_PROPERTY_ATOM => Atom::data_property(
                self.predicate(node, swrl::PROPERTY_PREDICATE)?,
                first()?,
                second()?,
            ),
            swrl::NEGATIVE_DATAVALUED_PROPERTY_ATOM => Atom::negative_data_property(
                self.predicate(node, swrl::PROPERTY_PREDICATE)?,
                first()?,
                second()?,
            ),
            swrl::DATA_RANGE_ATOM => {
                Atom::data_range(self.predicate(node, swrl::DATA_RANGE)?, first()?)
            }
            swrl::SAME_INDIVIDUAL_ATOM => Atom::same_individual(first()?, second()?),
            swrl::DIFFERENT_INDIVIDUALS_ATOM => Atom::different_individuals(first()?, second()?),
            swrl::BUILTIN_ATOM => {
                let operand = match self.object(node, swrl::ARGUMENT3) {
                    None => None,
                    Some(Node::Literal(literal)) => Some(literal.clone()),
                    Some(other) => {
                        return Err(malformed(format!(
                            "built-in operand {} of {} is not a literal",
                            other, node
                        )))
                    }
                };
                Atom::built_in(
                    self.predicate(node, swrl::BUILTIN)?,
                    first()?,
                    second()?,
                    operand,
                )
            }
            other => Err(malformed(format!("unknown atom type <{}>", other))),
        }
    }

    fn atoms(&self, list: &'a Node) -> Result<Vec<Atom>> {
        self.list(list)?
            .into_iter()
            .map(|node| self.atom(node))
            .collect()
    }

    fn rule(&self, node: &Node) -> Result<Rule> {
        let antecedent = match self.object(node, swrl::BODY) {
            Some(body) => self.atoms(body)?,
            None => vec![],
        };
        let consequent = match self.object(node, swrl::HEAD) {
            Some(head) => self.atoms(head)?,
            None => vec![],
        };
        let rule = Rule::new(antecedent, consequent)?;
        Ok(match self.object(node, rdfs::LABEL) {
            Some(Node::Literal(label)) => rule.with_name(label.lexical()),
            _ => rule,
        })
    }
}

/// Reads back every `swrl:Imp` in `triples`, in the order their type triples
/// appear.
pub fn rules_from_triples(triples: &[Triple]) -> Result<Vec<Rule>> {
    let graph = Graph::new(triples);
    let rules = graph
        .rule_nodes()
        .into_iter()
        .map(|node| graph.rule(node))
        .collect::<Result<Vec<_>>>()?;
    debug!("read {} rules from {} triples", rules.len(), triples.len());
    Ok(rules)
}

use std::collections::HashMap;

use pest::Parser as _;
use pest_derive::Parser;
use tracing::debug;

use crate::ast::{Argument, Atom, Rule as SwrlRule};
use crate::builtins::BuiltIn;
use crate::error::{Error, Result};
use crate::ontology::{Axiom, Entity, ObjectPropertyExpression, Ontology};
use crate::term::{Individual, Iri, Literal};
use crate::vocab::{self, owl, rdfs, xsd, SWRLB, XSD};

#[derive(Parser)]
#[grammar = "ontorule.pest"]
struct Parser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    Datatype,
    Individual,
}

/// Prefixes and declared entity kinds in scope while parsing. Atom kinds are
/// taken from declarations first and from the atom's shape otherwise.
#[derive(Clone, Debug)]
pub struct Context {
    prefixes: HashMap<String, String>,
    kinds: HashMap<Iri, EntityKind>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            prefixes: vocab::STANDARD_PREFIXES
                .iter()
                .map(|(prefix, namespace)| (prefix.to_string(), namespace.to_string()))
                .collect(),
            kinds: HashMap::new(),
        }
    }
}

fn parse_pair(start: Rule, code: &str) -> Result<Pair<'_>> {
    Parser::parse(start, code)
        .map_err(|err| Error::Parse(err.to_string()))?
        .next()
        .ok_or_else(|| Error::Parse("empty input".to_owned()))
}

/// Next inner pair, which the grammar guarantees to exist.
fn expect_next<'a>(pairs: &mut pest::iterators::Pairs<'a, Rule>, expected: Rule) -> Result<Pair<'a>> {
    match pairs.next() {
        Some(pair) if pair.as_rule() == expected => Ok(pair),
        other => Err(Error::Parse(format!("expected {:?}, found {:?}", expected, other))),
    }
}

fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('r') => unescaped.push('\r'),
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

fn take<const N: usize>(predicate: &Iri, arguments: Vec<Argument>) -> Result<[Argument; N]> {
    let count = arguments.len();
    arguments.try_into().map_err(|_| {
        Error::InvalidAtom(format!(
            "{} takes {} argument(s), got {}",
            predicate.local_name(),
            N,
            count
        ))
    })
}

impl Context {
    pub fn declare_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    pub fn declare(&mut self, iri: Iri, kind: EntityKind) {
        self.kinds.insert(iri, kind);
    }

    pub fn kind_of(&self, iri: &Iri) -> Option<EntityKind> {
        self.kinds.get(iri).copied()
    }

    /// Expands `prefix:local`. An unknown prefix leaves the name as written,
    /// so CURIE-like identifiers such as `ex:val` survive a round trip.
    pub fn expand(&self, prefixed: &str) -> Iri {
        match prefixed.split_once(':') {
            Some((prefix, local)) => match self.prefixes.get(prefix) {
                Some(namespace) => Iri::new(format!("{}{}", namespace, local)),
                None => {
                    debug!("unknown prefix {:?}, keeping {:?} as is", prefix, prefixed);
                    Iri::new(prefixed)
                }
            },
            None => Iri::new(prefixed),
        }
    }

    pub fn parse_rule(&self, code: &str) -> Result<SwrlRule> {
        let pair = parse_pair(Rule::rule_only, code)?;
        let rule = expect_next(&mut pair.into_inner(), Rule::rule)?;
        self.convert_rule(rule)
    }

    pub fn parse_atom(&self, code: &str) -> Result<Atom> {
        let pair = parse_pair(Rule::atom_only, code)?;
        let atom = pair
            .into_inner()
            .next()
            .ok_or_else(|| Error::Parse("missing atom".to_owned()))?;
        self.convert_atom(atom)
    }

    fn convert_iri(&self, pair: Pair) -> Result<Iri> {
        match pair.as_rule() {
            Rule::iri_ref => Ok(Iri::new(
                expect_next(&mut pair.into_inner(), Rule::iri_body)?.as_str(),
            )),
            Rule::prefixed_name => Ok(self.expand(pair.as_str())),
            Rule::bare_name => Ok(Iri::new(pair.as_str())),
            other => Err(Error::Parse(format!("expected an IRI, found {:?}", other))),
        }
    }

    fn convert_literal(&self, pair: Pair) -> Result<Literal> {
        let pair = expect_any(pair)?;
        let literal = match pair.as_rule() {
            Rule::typed_string => {
                let mut pairs = pair.into_inner();
                let lexical = quoted_text(expect_next(&mut pairs, Rule::quoted)?)?;
                let datatype = self.convert_iri(
                    pairs
                        .next()
                        .ok_or_else(|| Error::Parse("missing datatype".to_owned()))?,
                )?;
                Literal::typed(lexical, datatype)
            }
            Rule::lang_string => {
                let mut pairs = pair.into_inner();
                let lexical = quoted_text(expect_next(&mut pairs, Rule::quoted)?)?;
                let tag = expect_next(&mut pairs, Rule::lang_tag)?;
                Literal::lang(lexical, tag.as_str().trim_start_matches('@'))
            }
            Rule::plain_string => {
                let quoted = expect_next(&mut pair.into_inner(), Rule::quoted)?;
                Literal::string(quoted_text(quoted)?)
            }
            Rule::number => {
                let text = pair.as_str();
                let datatype = if text.contains(['e', 'E']) {
                    xsd::DOUBLE
                } else if text.contains('.') {
                    xsd::DECIMAL
                } else {
                    xsd::INTEGER
                };
                Literal::typed(text, datatype)
            }
            Rule::boolean => Literal::typed(pair.as_str(), xsd::BOOLEAN),
            other => return Err(Error::Parse(format!("expected a literal, found {:?}", other))),
        };
        Ok(literal)
    }

    fn convert_argument(&self, pair: Pair) -> Result<Argument> {
        match pair.as_rule() {
            Rule::variable => Ok(Argument::Variable(
                expect_next(&mut pair.into_inner(), Rule::name)?.as_str().to_owned(),
            )),
            Rule::literal => Ok(Argument::Literal(self.convert_literal(pair)?)),
            Rule::individual => {
                let inner = expect_any(pair)?;
                let individual = match inner.as_rule() {
                    Rule::blank_node => Individual::anonymous(
                        expect_next(&mut inner.into_inner(), Rule::name)?.as_str(),
                    ),
                    _ => Individual::Named(self.convert_iri(inner)?),
                };
                Ok(Argument::Individual(individual))
            }
            other => Err(Error::Parse(format!("expected an argument, found {:?}", other))),
        }
    }

    fn convert_arguments(&self, pair: Pair) -> Result<Vec<Argument>> {
        pair.into_inner()
            .map(|pair| self.convert_argument(pair))
            .collect()
    }

    fn convert_atom(&self, pair: Pair) -> Result<Atom> {
        match pair.as_rule() {
            Rule::negated_atom => {
                let inner = expect_next(&mut pair.into_inner(), Rule::predicate_atom)?;
                let (predicate, arguments) = self.convert_predicate_atom(inner)?;
                self.negated_atom(predicate, arguments)
            }
            Rule::same_as_atom => {
                let arguments = self.convert_arguments(expect_any(pair)?)?;
                let [left, right] = take(&Iri::new(owl::SAME_AS), arguments)?;
                Atom::same_individual(left, right)
            }
            Rule::different_from_atom => {
                let arguments = self.convert_arguments(expect_any(pair)?)?;
                let [left, right] = take(&Iri::new(owl::DIFFERENT_FROM), arguments)?;
                Atom::different_individuals(left, right)
            }
            Rule::predicate_atom => {
                let (predicate, arguments) = self.convert_predicate_atom(pair)?;
                self.atom(predicate, arguments)
            }
            other => Err(Error::Parse(format!("expected an atom, found {:?}", other))),
        }
    }

    fn convert_predicate_atom(&self, pair: Pair) -> Result<(Iri, Vec<Argument>)> {
        let mut pairs = pair.into_inner();
        let predicate = self.convert_iri(
            pairs
                .next()
                .ok_or_else(|| Error::Parse("missing predicate".to_owned()))?,
        )?;
        let arguments = self.convert_arguments(expect_next(&mut pairs, Rule::arguments)?)?;
        Ok((predicate, arguments))
    }

    fn kind_for(&self, predicate: &Iri, arguments: &[Argument]) -> EntityKind {
        if let Some(kind) = self.kind_of(predicate) {
            return kind;
        }
        if predicate.in_namespace(XSD).is_some() || predicate.as_str() == rdfs::LITERAL {
            return EntityKind::Datatype;
        }
        match arguments {
            [_] => EntityKind::Class,
            [_, Argument::Literal(_)] => EntityKind::DataProperty,
            _ => EntityKind::ObjectProperty,
        }
    }

    /// Builds the atom a predicate and its arguments denote.
    /// Undeclared bare built-in names (`add`, `greaterThan`) are read as
    /// built-ins, which is how the atom notation renders them.
    pub fn atom(&self, predicate: Iri, arguments: Vec<Argument>) -> Result<Atom> {
        let bare_built_in =
            self.kind_of(&predicate).is_none() && BuiltIn::from_name(predicate.as_str()).is_some();
        if predicate.in_namespace(SWRLB).is_some() || bare_built_in {
            return built_in_atom(predicate, arguments);
        }
        match predicate.as_str() {
            owl::SAME_AS => {
                let [left, right] = take(&predicate, arguments)?;
                return Atom::same_individual(left, right);
            }
            owl::DIFFERENT_FROM => {
                let [left, right] = take(&predicate, arguments)?;
                return Atom::different_individuals(left, right);
            }
            _ => {}
        }
        match self.kind_for(&predicate, &arguments) {
            EntityKind::Class => {
                let [subject] = take(&predicate, arguments)?;
                Atom::class(predicate, subject)
            }
            EntityKind::Datatype => {
                let [subject] = take(&predicate, arguments)?;
                Atom::data_range(predicate, subject)
            }
            EntityKind::ObjectProperty => {
                let [subject, object] = take(&predicate, arguments)?;
                Atom::object_property(predicate, subject, object)
            }
            EntityKind::DataProperty => {
                let [subject, value] = take(&predicate, arguments)?;
                Atom::data_property(predicate, subject, value)
            }
            EntityKind::Individual => Err(Error::InvalidAtom(format!(
                "individual {} used as a predicate",
                predicate.local_name()
            ))),
        }
    }

    fn negated_atom(&self, predicate: Iri, arguments: Vec<Argument>) -> Result<Atom> {
        match self.kind_for(&predicate, &arguments) {
            EntityKind::Class => {
                let [subject] = take(&predicate, arguments)?;
                Atom::negative_class(predicate, subject)
            }
            EntityKind::ObjectProperty => {
                let [subject, object] = take(&predicate, arguments)?;
                Atom::negative_object_property(predicate, subject, object)
            }
            EntityKind::DataProperty => {
                let [subject, value] = take(&predicate, arguments)?;
                Atom::negative_data_property(predicate, subject, value)
            }
            EntityKind::Datatype | EntityKind::Individual => Err(Error::InvalidAtom(format!(
                "{} cannot be negated",
                predicate.local_name()
            ))),
        }
    }

    fn convert_rule(&self, pair: Pair) -> Result<SwrlRule> {
        let mut pairs = pair.into_inner();
        let antecedent = expect_next(&mut pairs, Rule::antecedent)?
            .into_inner()
            .map(|atom| self.convert_atom(atom))
            .collect::<Result<Vec<_>>>()?;
        let consequent = expect_next(&mut pairs, Rule::consequent)?
            .into_inner()
            .map(|atom| self.convert_atom(atom))
            .collect::<Result<Vec<_>>>()?;
        SwrlRule::new(antecedent, consequent)
    }

    fn convert_fact(&self, pair: Pair) -> Result<Axiom> {
        let inner = expect_any(pair)?;
        if inner.as_rule() == Rule::inverse_atom {
            let (property, arguments) = self.convert_predicate_atom(inner)?;
            let [subject, object] = take(&property, arguments)?;
            return match (subject, object) {
                (Argument::Individual(subject), Argument::Individual(object)) => {
                    Ok(Axiom::ObjectPropertyAssertion {
                        property: ObjectPropertyExpression::InverseOf(property),
                        subject,
                        object,
                    })
                }
                (subject, object) => Err(Error::Parse(format!(
                    "inverse({}) fact needs two individuals, got {} and {}",
                    property.local_name(),
                    subject,
                    object
                ))),
            };
        }
        let atom = self.convert_atom(inner)?;
        atom.instantiate(Argument::as_term)
            .ok_or_else(|| Error::Parse(format!("{} is not a ground assertion", atom)))
    }
}

fn expect_any(pair: Pair) -> Result<Pair> {
    let kind = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| Error::Parse(format!("empty {:?}", kind)))
}

fn quoted_text(pair: Pair) -> Result<String> {
    Ok(unescape(expect_next(&mut pair.into_inner(), Rule::string_inner)?.as_str()))
}

fn built_in_atom(predicate: Iri, arguments: Vec<Argument>) -> Result<Atom> {
    let mut arguments = arguments.into_iter();
    match (arguments.next(), arguments.next(), arguments.next(), arguments.next()) {
        (Some(left), Some(right), None, None) => Atom::built_in(predicate, left, right, None),
        (Some(left), Some(right), Some(Argument::Literal(operand)), None) => {
            Atom::built_in(predicate, left, right, Some(operand))
        }
        _ => Err(Error::InvalidAtom(format!(
            "built-in {} takes two arguments and an optional literal operand",
            predicate.local_name()
        ))),
    }
}

/// A parsed rule document: the asserted ontology plus its rules, with the
/// parsing context needed to read further rules against it.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub context: Context,
    pub ontology: Ontology,
    pub rules: Vec<SwrlRule>,
}

impl Document {
    pub fn parse_rule(&self, code: &str) -> Result<SwrlRule> {
        self.context.parse_rule(code)
    }

    fn add_statement(&mut self, pair: Pair) -> Result<()> {
        match pair.as_rule() {
            Rule::prefix_decl => {
                let mut pairs = pair.into_inner();
                let prefix = expect_next(&mut pairs, Rule::pname_ns)?.as_str();
                let namespace = self.context.convert_iri(expect_next(&mut pairs, Rule::iri_ref)?)?;
                self.context
                    .declare_prefix(prefix.trim_end_matches(':'), namespace.as_str());
            }
            Rule::declaration => {
                let mut pairs = pair.into_inner();
                let kind = match expect_next(&mut pairs, Rule::entity_kind)?.as_str() {
                    "class" => EntityKind::Class,
                    "objectProperty" => EntityKind::ObjectProperty,
                    "dataProperty" => EntityKind::DataProperty,
                    "datatype" => EntityKind::Datatype,
                    _ => EntityKind::Individual,
                };
                let iri = self.context.convert_iri(
                    pairs
                        .next()
                        .ok_or_else(|| Error::Parse("missing declared IRI".to_owned()))?,
                )?;
                let entity = match kind {
                    EntityKind::Class => Entity::Class(iri.clone()),
                    EntityKind::ObjectProperty => Entity::ObjectProperty(iri.clone()),
                    EntityKind::DataProperty => Entity::DataProperty(iri.clone()),
                    EntityKind::Datatype => Entity::Datatype(iri.clone()),
                    EntityKind::Individual => Entity::NamedIndividual(iri.clone()),
                };
                self.context.declare(iri, kind);
                self.ontology.insert(Axiom::Declaration(entity));
            }
            Rule::sub_class_of => {
                let mut iris = pair.into_inner().map(|pair| self.context.convert_iri(pair));
                let (Some(sub), Some(sup)) = (iris.next(), iris.next()) else {
                    return Err(Error::Parse("subClassOf takes two classes".to_owned()));
                };
                let axiom = Axiom::SubClassOf { sub: sub?, sup: sup? };
                self.ontology.insert(axiom);
            }
            Rule::fact => {
                let axiom = self.context.convert_fact(pair)?;
                self.ontology.insert(axiom);
            }
            Rule::rule_stmt => {
                let mut pairs = pair.into_inner().peekable();
                let labelled = pairs
                    .peek()
                    .map_or(false, |pair| pair.as_rule() == Rule::rule_label);
                let label = if labelled {
                    pairs
                        .next()
                        .and_then(|label| label.into_inner().next())
                        .map(|name| name.as_str().to_owned())
                } else {
                    None
                };
                let rule = pairs
                    .next()
                    .ok_or_else(|| Error::Parse("missing rule".to_owned()))?;
                let rule = self.context.convert_rule(rule)?;
                self.rules.push(match label {
                    Some(label) => rule.with_name(label),
                    None => rule,
                });
            }
            Rule::EOI => {}
            other => return Err(Error::Parse(format!("unexpected {:?}", other))),
        }
        Ok(())
    }
}

/// Parses a document of prefix declarations, entity declarations, facts and
/// rules. Statements are read in order: declarations affect the atoms that
/// follow them.
pub fn parse_document(code: &str) -> Result<Document> {
    let pair = parse_pair(Rule::document, code)?;
    let mut document = Document::default();
    for statement in pair.into_inner() {
        document.add_statement(statement)?;
    }
    debug!(
        "parsed {} axioms and {} rules",
        document.ontology.len(),
        document.rules.len()
    );
    Ok(document)
}

/// Parses a rule in notation form, with the standard prefixes only.
pub fn parse_rule(code: &str) -> Result<SwrlRule> {
    Context::default().parse_rule(code)
}

/// Parses an atom in notation form, with the standard prefixes only.
pub fn parse_atom(code: &str) -> Result<Atom> {
    Context::default().parse_atom(code)
}

pub fn parse_literal(code: &str) -> Result<Literal> {
    let pair = parse_pair(Rule::literal_only, code)?;
    let literal = expect_next(&mut pair.into_inner(), Rule::literal)?;
    Context::default().convert_literal(literal)
}

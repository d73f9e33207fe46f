use hashbag::HashBag;
use std::iter::FromIterator;

use crate::ast::{Argument, Atom};
use crate::builtins::{self, BuiltIn};
use crate::ontology::{Axiom, ClassExpression, ObjectPropertyExpression, Ontology, Origin};
use crate::parser::{parse_atom, parse_document, parse_literal, parse_rule};
use crate::rdf::{atom_to_triples, rule_to_triples, rules_from_triples, Node};
use crate::reasoner::{Reasoner, ReasonerConfig};
use crate::table::{BindingTable, BindingTableBuilder};
use crate::term::{Individual, Iri, Literal, Term};
use crate::vocab::{swrl, xsd};
use crate::{Error, KnowledgeBase};

const EX: &str = "http://example.org/#";

const PRELUDE_PEOPLE: &str = r#"
prefix ex: <http://example.org/#>

declare class ex:Person
declare class ex:Agent
declare objectProperty ex:knows
declare dataProperty ex:age
declare dataProperty ex:name
declare individual ex:Mark
declare individual ex:Anna

subClassOf(ex:Person, ex:Agent)

fact ex:Person(ex:Mark)
fact ex:age(ex:Mark, 44)
fact ex:age(ex:Anna, 34)
fact ex:name(ex:Mark, "Mark Twain")
fact ex:name(ex:Anna, "Anna"@en)
"#;

fn test_rule(prelude_code: &str, code: &str, columns: &[&str], expected: &[&[Term]]) {
    let document = parse_document(prelude_code).unwrap();
    let rule = document.parse_rule(code).unwrap();
    let table = rule.evaluate_antecedent(&document.ontology).unwrap();
    println!("***** {} *****", rule);
    print!("{}", table);

    assert_eq!(table.columns(), columns);
    let result_rows = HashBag::from_iter(table.rows().iter().map(|row| row.as_slice()));
    let expected = HashBag::from_iter(expected.iter().copied());
    assert_eq!(result_rows, expected);
}

fn iri(local: &str) -> Iri {
    Iri::new(format!("{}{}", EX, local))
}

fn named(local: &str) -> Individual {
    Individual::Named(iri(local))
}

fn ind(local: &str) -> Term {
    Term::Individual(named(local))
}

fn int(n: i64) -> Term {
    Term::Literal(Literal::integer(n))
}

fn var(name: &str) -> Argument {
    Argument::variable(name)
}

#[test]
fn test_class_atom_includes_subclass_members() {
    test_rule(PRELUDE_PEOPLE, "ex:Agent(?P) -> ex:Agent(?P)", &["P"], &[&[ind("Mark")]]);
}

#[test]
fn test_class_atom_consequent() {
    let document = parse_document(PRELUDE_PEOPLE).unwrap();
    let rule = document.parse_rule("ex:Agent(?P) -> ex:Agent(?P)").unwrap();
    let inferences = rule.evaluate(&document.ontology).unwrap();
    assert_eq!(inferences.len(), 1);
    assert_eq!(
        inferences[0].axiom,
        Axiom::ClassAssertion {
            class: ClassExpression::Class(iri("Agent")),
            individual: named("Mark"),
        }
    );
    assert_eq!(inferences[0].provenance, "Agent(?P)");
}

#[test]
fn test_column_per_distinct_variable() {
    let prelude = r#"
        prefix ex: <http://example.org/#>
        fact ex:knows(ex:a, ex:a)
        fact ex:knows(ex:a, ex:b)
        fact ex:knows(ex:b, ex:c)
    "#;
    test_rule(prelude, "ex:knows(?X, ?X) ->", &["X"], &[&[ind("a")]]);
    test_rule(
        prelude,
        "ex:knows(ex:a, ?Y) ->",
        &["Y"],
        &[&[ind("a")], &[ind("b")]],
    );
    test_rule(
        prelude,
        "ex:knows(?X, ?Y) ->",
        &["X", "Y"],
        &[
            &[ind("a"), ind("a")],
            &[ind("a"), ind("b")],
            &[ind("b"), ind("c")],
        ],
    );
}

#[test]
fn test_class_atom_with_constant_subject_is_empty() {
    test_rule(PRELUDE_PEOPLE, "ex:Person(ex:Mark) ->", &[], &[]);
}

#[test]
fn test_inverse_assertion_is_calibrated() {
    let prelude = r#"
        prefix ex: <http://example.org/#>
        declare objectProperty ex:knows
        fact inverse(ex:knows)(ex:a, ex:b)
    "#;
    test_rule(
        prelude,
        "ex:knows(?X, ?Y) ->",
        &["X", "Y"],
        &[&[ind("b"), ind("a")]],
    );
}

#[test]
fn test_join_on_shared_variable() {
    let prelude = r#"
        prefix ex: <http://example.org/#>
        declare objectProperty ex:parent
        fact ex:parent(ex:a, ex:b)
        fact ex:parent(ex:b, ex:c)
        fact ex:parent(ex:b, ex:d)
    "#;
    test_rule(
        prelude,
        "ex:parent(?X, ?Y) ^ ex:parent(?Y, ?Z) ->",
        &["X", "Y", "Z"],
        &[
            &[ind("a"), ind("b"), ind("c")],
            &[ind("a"), ind("b"), ind("d")],
        ],
    );
}

#[test]
fn test_join_without_shared_columns_is_cartesian() {
    let mut left = BindingTableBuilder::new(vec!["A".to_owned()]);
    left.push_row(vec![int(1)]);
    left.push_row(vec![int(2)]);
    let mut right = BindingTableBuilder::new(vec!["B".to_owned()]);
    right.push_row(vec![int(3)]);
    right.push_row(vec![int(4)]);
    let joined = left.build().join(&right.build());
    assert_eq!(joined.columns(), ["A", "B"]);
    assert_eq!(joined.len(), 4);
    assert_eq!(BindingTable::unit().join(&joined), joined);
}

#[test]
fn test_builder_drops_duplicate_rows() {
    let mut builder = BindingTableBuilder::new(vec!["A".to_owned()]);
    assert!(builder.push_row(vec![int(1)]));
    assert!(!builder.push_row(vec![int(1)]));
    assert_eq!(builder.build().len(), 1);
}

#[test]
fn test_same_as_is_symmetric() {
    let prelude = r#"
        prefix ex: <http://example.org/#>
        fact sameAs(ex:a, ex:b)
    "#;
    test_rule(
        prelude,
        "sameAs(?L, ?R) ->",
        &["L", "R"],
        &[&[ind("a"), ind("b")], &[ind("b"), ind("a")]],
    );
    test_rule(prelude, "sameAs(?L, ex:b) ->", &["L"], &[&[ind("a")]]);
    test_rule(prelude, "sameAs(ex:b, ?R) ->", &["R"], &[&[ind("a")]]);
}

#[test]
fn test_different_from_is_symmetric_over_same_groups() {
    let prelude = r#"
        prefix ex: <http://example.org/#>
        fact sameAs(ex:a, ex:b)
        fact differentFrom(ex:a, ex:c)
    "#;
    test_rule(
        prelude,
        "differentFrom(?L, ?R) ->",
        &["L", "R"],
        &[
            &[ind("a"), ind("c")],
            &[ind("c"), ind("a")],
            &[ind("b"), ind("c")],
            &[ind("c"), ind("b")],
        ],
    );
}

#[test]
fn test_negative_property_assertions() {
    let prelude = r#"
        prefix ex: <http://example.org/#>
        declare objectProperty ex:knows
        fact ex:knows(ex:a, ex:b)
        fact not(ex:knows(ex:a, ex:c))
    "#;
    test_rule(
        prelude,
        "not(ex:knows(?X, ?Y)) ->",
        &["X", "Y"],
        &[&[ind("a"), ind("c")]],
    );
}

#[test]
fn test_data_range_atom() {
    test_rule(
        PRELUDE_PEOPLE,
        "ex:age(?P, ?A) ^ xsd:integer(?A) ->",
        &["P", "A"],
        &[&[ind("Mark"), int(44)], &[ind("Anna"), int(34)]],
    );
    test_rule(
        PRELUDE_PEOPLE,
        "ex:name(?P, ?N) ^ xsd:integer(?N) ->",
        &["P", "N"],
        &[],
    );
}

#[test]
fn test_add_with_operand() {
    test_rule(
        PRELUDE_PEOPLE,
        "ex:age(ex:Mark, ?P) ^ ex:age(ex:Anna, ?Q) ^ swrlb:add(?P, ?Q, 10) ->",
        &["P", "Q"],
        &[&[int(44), int(34)]],
    );
    test_rule(
        PRELUDE_PEOPLE,
        "ex:age(ex:Mark, ?P) ^ ex:age(ex:Anna, ?Q) ^ swrlb:add(?P, ?Q, 11) ->",
        &["P", "Q"],
        &[],
    );
}

#[test]
fn test_built_in_with_missing_column_drops_rows() {
    let document = parse_document(PRELUDE_PEOPLE).unwrap();
    let rule = document
        .parse_rule("ex:age(ex:Mark, ?P) ^ ex:age(ex:Anna, ?Q) ->")
        .unwrap();
    let table = rule.evaluate_antecedent(&document.ontology).unwrap();
    assert_eq!(table.len(), 1);

    let table = table.without_column("Q");
    let filtered = builtins::filter_table(
        &BuiltIn::Add.iri(),
        &var("P"),
        &var("Q"),
        Some(&Literal::integer(10)),
        &table,
    )
    .unwrap();
    assert!(filtered.is_empty());
    assert_eq!(filtered.columns(), ["P"]);
}

#[test]
fn test_comparison_built_ins() {
    test_rule(
        PRELUDE_PEOPLE,
        "ex:age(?P, ?A) ^ swrlb:greaterThan(?A, 40) ->",
        &["P", "A"],
        &[&[ind("Mark"), int(44)]],
    );
    test_rule(
        PRELUDE_PEOPLE,
        "ex:age(?P, ?A) ^ swrlb:lessThanOrEqual(?A, 34.0) ->",
        &["P", "A"],
        &[&[ind("Anna"), int(34)]],
    );
    test_rule(
        PRELUDE_PEOPLE,
        "ex:age(?P, ?A) ^ swrlb:notEqual(?A, 44) ->",
        &["P", "A"],
        &[&[ind("Anna"), int(34)]],
    );
}

#[test]
fn test_string_built_ins() {
    let twain = Term::Literal(Literal::string("Mark Twain"));
    test_rule(
        PRELUDE_PEOPLE,
        r#"ex:name(?P, ?N) ^ swrlb:startsWith(?N, "Mark") ->"#,
        &["P", "N"],
        &[&[ind("Mark"), twain.clone()]],
    );
    test_rule(
        PRELUDE_PEOPLE,
        r#"ex:name(?P, ?N) ^ swrlb:containsIgnoreCase(?N, "TWAIN") ->"#,
        &["P", "N"],
        &[&[ind("Mark"), twain.clone()]],
    );
    test_rule(
        PRELUDE_PEOPLE,
        r#"ex:name(?P, ?N) ^ swrlb:matches(?N, "^M.*n$") ->"#,
        &["P", "N"],
        &[&[ind("Mark"), twain]],
    );
}

#[test]
fn test_rounding_built_ins() {
    let prelude = r#"
        prefix ex: <http://example.org/#>
        declare dataProperty ex:value
        fact ex:value(ex:x, 2.5)
        fact ex:value(ex:y, 3)
        fact ex:value(ex:z, 2)
    "#;
    // round(2.5) = 3, roundHalfToEven(2.5) = 2
    test_rule(
        prelude,
        "ex:value(ex:x, ?V) ^ ex:value(?I, ?R) ^ swrlb:round(?R, ?V) ->",
        &["V", "I", "R"],
        &[&[
            Term::Literal(Literal::typed("2.5", xsd::DECIMAL)),
            ind("y"),
            int(3),
        ]],
    );
    test_rule(
        prelude,
        "ex:value(ex:x, ?V) ^ ex:value(?I, ?R) ^ swrlb:roundHalfToEven(?R, ?V) ->",
        &["V", "I", "R"],
        &[&[
            Term::Literal(Literal::typed("2.5", xsd::DECIMAL)),
            ind("z"),
            int(2),
        ]],
    );
}

#[test]
fn test_unsupported_built_in_is_an_error() {
    let document = parse_document(PRELUDE_PEOPLE).unwrap();
    let rule = document
        .parse_rule("ex:Person(?P) ^ swrlb:frobnicate(?P, ?P) -> ex:Agent(?P)")
        .unwrap();
    assert!(matches!(
        rule.evaluate(&document.ontology),
        Err(Error::UnsupportedBuiltIn(_))
    ));
}

#[test]
fn test_invalid_atoms() {
    assert!(matches!(
        Atom::class(iri("Person"), Argument::Literal(Literal::integer(1))),
        Err(Error::InvalidAtom(_))
    ));
    assert!(matches!(
        Atom::class(Iri::new(""), var("x")),
        Err(Error::InvalidAtom(_))
    ));
    assert!(matches!(
        Atom::data_property(iri("age"), Argument::Literal(Literal::integer(1)), var("a")),
        Err(Error::InvalidAtom(_))
    ));
    assert!(matches!(
        Atom::built_in(BuiltIn::Add.iri(), var("x"), var("y"), None),
        Err(Error::InvalidAtom(_))
    ));

    let document = parse_document(PRELUDE_PEOPLE).unwrap();
    assert!(matches!(
        document.parse_rule("ex:Person(?x, ?y) ->"),
        Err(Error::InvalidAtom(_))
    ));
}

#[test]
fn test_built_in_cannot_open_antecedent() {
    assert!(matches!(
        parse_rule("swrlb:equal(?x, ?y) -> "),
        Err(Error::InvalidRule(_))
    ));
}

#[test]
fn test_literal_round_trip() {
    let literal = parse_literal(r#""hello"@en-US--RTL"#).unwrap();
    assert_eq!(literal.to_string(), r#""hello"@EN-US--RTL"#);
    assert_eq!(parse_literal(&literal.to_string()).unwrap(), literal);

    let literal = parse_literal(r#""44"^^xsd:integer"#).unwrap();
    assert_eq!(literal, Literal::integer(44));
    assert_eq!(literal.to_string(), r#""44"^^xsd:integer"#);

    let literal = parse_literal(r#""say \"hi\"""#).unwrap();
    assert_eq!(literal.lexical(), r#"say "hi""#);
    assert_eq!(parse_literal(&literal.to_string()).unwrap(), literal);
}

#[test]
fn test_atom_notation() {
    let cases = [
        "Agent(?P)",
        "knows(?P,?Q)",
        "sameAs(?L,?R)",
        "differentFrom(?L,ex:val)",
        "not(ex:class(?C))",
        "not(ex:dtprop(?L,?R))",
    ];
    for case in cases {
        assert_eq!(parse_atom(case).unwrap().to_string(), case);
    }

    let add = Atom::built_in(
        BuiltIn::Add.iri(),
        var("P"),
        var("Q"),
        Some(Literal::integer(10)),
    )
    .unwrap();
    assert_eq!(add.to_string(), r#"add(?P,?Q,"10"^^xsd:integer)"#);
    assert_eq!(parse_atom(&add.to_string()).unwrap().to_string(), add.to_string());
}

#[test]
fn test_consequent_is_idempotent() {
    let document = parse_document(PRELUDE_PEOPLE).unwrap();
    let rule = document
        .parse_rule("ex:age(?P, ?A) -> ex:Person(?P) ^ ex:Agent(ex:Anna)")
        .unwrap();
    let table = rule.evaluate_antecedent(&document.ontology).unwrap();
    for atom in rule.consequent() {
        let first = atom.evaluate_consequent(&table);
        assert_eq!(first, atom.evaluate_consequent(&table));
    }
    // Two rows, one ground consequent: a single inference.
    assert_eq!(rule.consequent()[1].evaluate_consequent(&table).len(), 1);
}

#[test]
fn test_no_op_consequents() {
    let document = parse_document(PRELUDE_PEOPLE).unwrap();
    let rule = document
        .parse_rule("ex:age(?P, ?A) -> xsd:integer(?A) ^ swrlb:add(?A, ?A, 0) ^ ex:Agent(?Z)")
        .unwrap();
    assert_eq!(rule.unbound_variables(), ["Z"]);
    assert!(rule.evaluate(&document.ontology).unwrap().is_empty());
}

#[test]
fn test_same_as_consequent_skips_reflexive_pairs() {
    let document = parse_document(PRELUDE_PEOPLE).unwrap();
    let rule = document
        .parse_rule("ex:Person(?P) -> sameAs(?P, ?P) ^ sameAs(?P, ex:Anna)")
        .unwrap();
    let inferences = rule.evaluate(&document.ontology).unwrap();
    assert_eq!(inferences.len(), 1);
    assert_eq!(
        inferences[0].axiom,
        Axiom::same_individual([named("Anna"), named("Mark")])
    );
}

#[test]
fn test_parse_document() {
    let document = parse_document(
        r#"
        prefix ex: <http://example.org/#>
        // a comment
        declare class ex:Person
        fact ex:Person(ex:Mark)
        fact ex:Person(_:someone)
        fact inverse(ex:knows)(ex:a, ex:b)
        rule [adult] ex:Person(?p) ^ ex:age(?p, ?a) ^ swrlb:greaterThan(?a, 17) -> ex:Adult(?p)
        rule ex:Adult(?p) -> ex:Agent(?p)
        "#,
    )
    .unwrap();
    assert_eq!(document.ontology.len(), 4);
    assert!(document.ontology.contains(&Axiom::ClassAssertion {
        class: ClassExpression::Class(iri("Person")),
        individual: Individual::anonymous("someone"),
    }));
    assert!(document
        .ontology
        .contains(&Axiom::ObjectPropertyAssertion {
            property: ObjectPropertyExpression::InverseOf(iri("knows")),
            subject: named("a"),
            object: named("b"),
        }));
    assert_eq!(document.rules.len(), 2);
    assert_eq!(document.rules[0].name(), Some("adult"));
    assert_eq!(document.rules[1].name(), None);
    assert_eq!(
        document.rules[0].to_string(),
        "Person(?p) ^ age(?p,?a) ^ greaterThan(?a,\"17\"^^xsd:integer) -> Adult(?p)"
    );
    assert_eq!(
        document.ontology.declared_individuals(),
        vec![named("Mark"), named("a"), named("b")]
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!(parse_document("fact ex:Person("), Err(Error::Parse(_))));
    assert!(matches!(
        parse_document("fact ex:Person(?x)"),
        Err(Error::Parse(_))
    ));
}

const PRELUDE_FAMILY: &str = r#"
prefix ex: <http://example.org/#>
declare objectProperty ex:parent
declare objectProperty ex:ancestor
fact ex:parent(ex:a, ex:b)
fact ex:parent(ex:b, ex:c)
fact ex:parent(ex:c, ex:d)
rule ex:parent(?x, ?y) -> ex:ancestor(?x, ?y)
rule ex:ancestor(?x, ?y) ^ ex:ancestor(?y, ?z) -> ex:ancestor(?x, ?z)
"#;

fn ancestor(from: &str, to: &str) -> Axiom {
    Axiom::ObjectPropertyAssertion {
        property: ObjectPropertyExpression::Property(iri("ancestor")),
        subject: named(from),
        object: named(to),
    }
}

#[test]
fn test_saturation_reaches_fixpoint() {
    let mut document = parse_document(PRELUDE_FAMILY).unwrap();
    let reasoner = Reasoner::new(document.rules.clone(), ReasonerConfig::default());
    let saturation = reasoner.saturate(&mut document.ontology).unwrap();
    assert!(saturation.fixpoint);
    assert_eq!(saturation.inferred, 6);
    assert_eq!(saturation.iterations, 4);
    assert_eq!(
        document.ontology.origin(&ancestor("a", "d")),
        Some(&Origin::Inferred {
            provenance: "ancestor(?x,?z)".to_owned()
        })
    );
    assert_eq!(
        document.ontology.origin(&ancestor("a", "b")),
        Some(&Origin::Inferred {
            provenance: "ancestor(?x,?y)".to_owned()
        })
    );

    // A second run finds nothing new.
    let again = reasoner.saturate(&mut document.ontology).unwrap();
    assert_eq!(again.inferred, 0);
    assert_eq!(again.iterations, 1);
}

#[test]
fn test_saturation_honors_iteration_bound() {
    let mut document = parse_document(PRELUDE_FAMILY).unwrap();
    let reasoner = Reasoner::new(
        document.rules.clone(),
        ReasonerConfig { max_iterations: 1 },
    );
    let saturation = reasoner.saturate(&mut document.ontology).unwrap();
    assert!(!saturation.fixpoint);
    assert_eq!(saturation.iterations, 1);
    assert_eq!(saturation.inferred, 3);
    assert!(!document.ontology.contains(&ancestor("a", "c")));
}

#[test]
fn test_asserting_an_inferred_axiom_makes_it_told() {
    let mut ontology = Ontology::new();
    let axiom = ancestor("a", "b");
    assert!(ontology.insert_inference(crate::Inference {
        axiom: axiom.clone(),
        provenance: "ancestor(?x,?y)".to_owned(),
    }));
    assert!(!ontology.insert(axiom.clone()));
    assert_eq!(ontology.origin(&axiom), Some(&Origin::Asserted));
    assert_eq!(ontology.inferred().count(), 0);
}

#[test]
fn test_rule_rdf_round_trip() {
    let document = parse_document(
        r#"
        prefix ex: <http://example.org/#>
        declare class ex:Person
        rule [rdf] ex:Person(?p) ^ ex:age(?p, ?a) ^ swrlb:add(?a, ?a, 2.5) ^ not(ex:knows(?p, _:b1)) ^ differentFrom(?p, ex:Mark) -> ex:Adult(?p) ^ ex:label(?p, "adult"@en)
        "#,
    )
    .unwrap();
    let rule = &document.rules[0];
    let triples = rule_to_triples(rule);
    let rules = rules_from_triples(&triples).unwrap();
    assert_eq!(rules, vec![rule.clone()]);
}

#[test]
fn test_atom_triples() {
    let atom = parse_atom("ex:Person(?p)").unwrap();
    let triples = atom_to_triples(&atom);
    let atom_node = &triples[0].subject;
    assert_eq!(triples[0].object, Node::Iri(Iri::new(swrl::CLASS_ATOM)));
    assert!(triples.iter().any(|triple| &triple.subject == atom_node
        && triple.predicate.as_str() == swrl::ARGUMENT1
        && triple.object == Node::Iri(Iri::new("urn:swrl:var#p"))));
    assert!(triples
        .iter()
        .any(|triple| triple.object == Node::Iri(Iri::new(swrl::VARIABLE))));
}

#[test]
fn test_malformed_rule_graph() {
    let rule = parse_rule("Person(?p) -> Agent(?p)").unwrap();
    let triples: Vec<_> = rule_to_triples(&rule)
        .into_iter()
        .filter(|triple| triple.predicate.as_str() != swrl::CLASS_PREDICATE)
        .collect();
    assert!(matches!(
        rules_from_triples(&triples),
        Err(Error::MalformedGraph(_))
    ));
}

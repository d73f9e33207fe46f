//! Namespaces and the handful of IRIs the engine interprets.

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const SWRL: &str = "http://www.w3.org/2003/11/swrl#";
pub const SWRLB: &str = "http://www.w3.org/2003/11/swrlb#";

/// Variables have no IRI of their own in the rule notation; on the wire they
/// are minted under this namespace.
pub const VARIABLE_NS: &str = "urn:swrl:var#";

/// Prefixes every document and every notation parse starts with.
pub const STANDARD_PREFIXES: [(&str, &str); 6] = [
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("xsd", XSD),
    ("owl", OWL),
    ("swrl", SWRL),
    ("swrlb", SWRLB),
];

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod rdfs {
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
}

pub mod owl {
    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
    pub const DIFFERENT_FROM: &str = "http://www.w3.org/2002/07/owl#differentFrom";
}

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
}

pub mod swrl {
    pub const IMP: &str = "http://www.w3.org/2003/11/swrl#Imp";
    pub const BODY: &str = "http://www.w3.org/2003/11/swrl#body";
    pub const HEAD: &str = "http://www.w3.org/2003/11/swrl#head";
    pub const VARIABLE: &str = "http://www.w3.org/2003/11/swrl#Variable";
    pub const ATOM_LIST: &str = "http://www.w3.org/2003/11/swrl#AtomList";

    pub const CLASS_ATOM: &str = "http://www.w3.org/2003/11/swrl#ClassAtom";
    pub const INDIVIDUAL_PROPERTY_ATOM: &str =
        "http://www.w3.org/2003/11/swrl#IndividualPropertyAtom";
    pub const DATAVALUED_PROPERTY_ATOM: &str =
        "http://www.w3.org/2003/11/swrl#DatavaluedPropertyAtom";
    pub const DATA_RANGE_ATOM: &str = "http://www.w3.org/2003/11/swrl#DataRangeAtom";
    pub const SAME_INDIVIDUAL_ATOM: &str = "http://www.w3.org/2003/11/swrl#SameIndividualAtom";
    pub const DIFFERENT_INDIVIDUALS_ATOM: &str =
        "http://www.w3.org/2003/11/swrl#DifferentIndividualsAtom";
    pub const BUILTIN_ATOM: &str = "http://www.w3.org/2003/11/swrl#BuiltinAtom";
    pub const NEGATIVE_CLASS_ATOM: &str = "http://www.w3.org/2003/11/swrl#NegativeClassAtom";
    pub const NEGATIVE_INDIVIDUAL_PROPERTY_ATOM: &str =
        "http://www.w3.org/2003/11/swrl#NegativeIndividualPropertyAtom";
    pub const NEGATIVE_DATAVALUED_PROPERTY_ATOM: &str =
        "http://www.w3.org/2003/11/swrl#NegativeDatavaluedPropertyAtom";

    pub const CLASS_PREDICATE: &str = "http://www.w3.org/2003/11/swrl#classPredicate";
    pub const PROPERTY_PREDICATE: &str = "http://www.w3.org/2003/11/swrl#propertyPredicate";
    pub const DATA_RANGE: &str = "http://www.w3.org/2003/11/swrl#dataRange";
    pub const BUILTIN: &str = "http://www.w3.org/2003/11/swrl#builtin";
    pub const ARGUMENT1: &str = "http://www.w3.org/2003/11/swrl#argument1";
    pub const ARGUMENT2: &str = "http://www.w3.org/2003/11/swrl#argument2";
    pub const ARGUMENT3: &str = "http://www.w3.org/2003/11/swrl#argument3";
}

const INTEGER_TYPES: [&str; 13] = [
    "integer",
    "nonPositiveInteger",
    "negativeInteger",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "positiveInteger",
];

/// XSD local name of `datatype`, if it lives in the XSD namespace.
pub fn xsd_local_name(datatype: &str) -> Option<&str> {
    datatype.strip_prefix(XSD)
}

pub fn is_integer_datatype(datatype: &str) -> bool {
    xsd_local_name(datatype).map_or(false, |name| INTEGER_TYPES.contains(&name))
}

pub fn is_numeric_datatype(datatype: &str) -> bool {
    is_integer_datatype(datatype)
        || matches!(
            xsd_local_name(datatype),
            Some("decimal" | "double" | "float")
        )
}

/// The parent of an XSD integer type in the built-in datatype hierarchy.
fn integer_parent(name: &str) -> Option<&'static str> {
    Some(match name {
        "integer" => "decimal",
        "nonPositiveInteger" | "long" | "nonNegativeInteger" => "integer",
        "negativeInteger" => "nonPositiveInteger",
        "int" => "long",
        "short" => "int",
        "byte" => "short",
        "unsignedLong" | "positiveInteger" => "nonNegativeInteger",
        "unsignedInt" => "unsignedLong",
        "unsignedShort" => "unsignedInt",
        "unsignedByte" => "unsignedShort",
        _ => return None,
    })
}

/// Whether values of `sub` are also values of `sup` (reflexive).
pub fn datatype_derives_from(sub: &str, sup: &str) -> bool {
    if sub == sup || sup == rdfs::LITERAL {
        return true;
    }
    let (Some(mut current), Some(target)) = (xsd_local_name(sub), xsd_local_name(sup)) else {
        return false;
    };
    while let Some(parent) = integer_parent(current) {
        if parent == target {
            return true;
        }
        current = parent;
    }
    false
}

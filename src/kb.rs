//! The read-only query surface atoms evaluate against.

use crate::ontology::ClassExpression;
use crate::term::{Individual, Iri, Literal};

/// Query primitives over an ontology snapshot. Implementations must not
/// change their answers while an evaluation pass borrows them.
pub trait KnowledgeBase {
    /// Individuals known to be members of `class`.
    fn individuals_of(&self, class: &ClassExpression) -> Vec<Individual>;

    /// `(source, target)` pairs for `property`, with assertions stated
    /// through `inverse(property)` turned around into the same direction.
    fn calibrated_object_assertions(&self, property: &Iri) -> Vec<(Individual, Individual)>;

    /// Calibrated pairs of negative object property assertions.
    fn negative_object_assertions(&self, property: &Iri) -> Vec<(Individual, Individual)>;

    fn data_assertions(&self, property: &Iri) -> Vec<(Individual, Literal)>;

    fn negative_data_assertions(&self, property: &Iri) -> Vec<(Individual, Literal)>;

    /// Every literal used as the value of a data property assertion.
    fn data_literals(&self) -> Vec<Literal>;

    fn literal_is_member(&self, datatype: &Iri, literal: &Literal) -> bool;

    /// Individuals equal to `individual`, excluding itself.
    fn same_individuals(&self, individual: &Individual) -> Vec<Individual>;

    /// Individuals different from `individual`. Symmetric: `b` is in the
    /// answer for `a` iff `a` is in the answer for `b`.
    fn different_individuals(&self, individual: &Individual) -> Vec<Individual>;

    /// Named individuals in the ontology's signature.
    fn declared_individuals(&self) -> Vec<Individual>;
}

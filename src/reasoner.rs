use tracing::{debug, info, warn};

use crate::ast::{Atom, Rule};
use crate::builtins::{self, BuiltIn};
use crate::consequent::Inference;
use crate::error::{Error, Result};
use crate::kb::KnowledgeBase;
use crate::ontology::Ontology;
use crate::table::BindingTable;

impl Rule {
    /// Joins the antecedent left to right. Generating atoms are natural-joined
    /// into the accumulated table; built-ins filter it where they appear. An
    /// empty antecedent yields the single empty binding.
    pub fn evaluate_antecedent<K>(&self, kb: &K) -> Result<BindingTable>
    where
        K: KnowledgeBase + ?Sized,
    {
        self.check_built_ins()?;

        let mut accumulated: Option<BindingTable> = None;
        for atom in self.antecedent() {
            let next = match (accumulated, atom) {
                (
                    Some(table),
                    Atom::BuiltIn {
                        builtin,
                        left,
                        right,
                        operand,
                    },
                ) => builtins::filter_table(builtin, left, right, operand.as_ref(), &table)?,
                (Some(table), atom) => table.join(&atom.evaluate_antecedent(kb)?),
                // Rule::new keeps built-ins out of the first position.
                (None, atom) => atom.evaluate_antecedent(kb)?,
            };
            accumulated = Some(next);
        }
        Ok(accumulated.unwrap_or_else(BindingTable::unit))
    }

    /// Unknown built-ins are fatal even when an earlier atom already emptied
    /// the table.
    fn check_built_ins(&self) -> Result<()> {
        for atom in self.antecedent() {
            if let Atom::BuiltIn { builtin, .. } = atom {
                if BuiltIn::from_iri(builtin).is_none() {
                    return Err(Error::UnsupportedBuiltIn(builtin.as_str().to_owned()));
                }
            }
        }
        Ok(())
    }

    /// Antecedent join followed by every consequent atom.
    pub fn evaluate<K>(&self, kb: &K) -> Result<Vec<Inference>>
    where
        K: KnowledgeBase + ?Sized,
    {
        let table = self.evaluate_antecedent(kb)?;
        debug!("rule {} matched {} rows", self, table.len());
        Ok(self
            .consequent()
            .iter()
            .flat_map(|atom| atom.evaluate_consequent(&table))
            .collect())
    }
}

#[derive(Clone, Debug)]
pub struct ReasonerConfig {
    /// Upper bound on saturation passes.
    pub max_iterations: usize,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self { max_iterations: 64 }
    }
}

/// Outcome of [`Reasoner::saturate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Saturation {
    pub iterations: usize,
    /// Axioms added to the ontology.
    pub inferred: usize,
    /// False when the iteration bound stopped the run first.
    pub fixpoint: bool,
}

/// Forward chaining over a fixed rule set.
#[derive(Clone, Debug, Default)]
pub struct Reasoner {
    rules: Vec<Rule>,
    config: ReasonerConfig,
}

impl Reasoner {
    pub fn new(rules: Vec<Rule>, config: ReasonerConfig) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// One pass: every rule, in order, against the same snapshot.
    pub fn infer<K>(&self, kb: &K) -> Result<Vec<Inference>>
    where
        K: KnowledgeBase + ?Sized,
    {
        let mut inferences = vec![];
        for rule in &self.rules {
            inferences.extend(rule.evaluate(kb)?);
        }
        Ok(inferences)
    }

    /// Runs passes until one adds no axiom the ontology lacks, or until
    /// `max_iterations` passes have run. Each pass reads an unchanged
    /// ontology; its inferences are inserted afterwards.
    pub fn saturate(&self, ontology: &mut Ontology) -> Result<Saturation> {
        let mut inferred = 0;
        for iteration in 1..=self.config.max_iterations {
            let inferences = self.infer(&*ontology)?;
            let candidates = inferences.len();
            let mut added = 0;
            for inference in inferences {
                if ontology.insert_inference(inference) {
                    added += 1;
                }
            }
            inferred += added;
            debug!(
                "saturation pass {}: {} candidate inferences, {} new",
                iteration, candidates, added
            );
            if added == 0 {
                info!(
                    "reached fixpoint after {} passes, {} axioms inferred",
                    iteration, inferred
                );
                return Ok(Saturation {
                    iterations: iteration,
                    inferred,
                    fixpoint: true,
                });
            }
        }
        warn!(
            "stopped after {} passes without reaching a fixpoint",
            self.config.max_iterations
        );
        Ok(Saturation {
            iterations: self.config.max_iterations,
            inferred,
            fixpoint: false,
        })
    }
}

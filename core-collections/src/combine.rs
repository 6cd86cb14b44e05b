//! Combinators
//!
//! Pure functions merging multiple `(records, options)` inputs into one
//! output sequence. Exclusion applies before combination: an excluded input
//! contributes nothing, and any record identical (by [`RecordKey`]) to a
//! record of an excluded input is subtracted from the other inputs too.

use core_catalog::{RecordKey, StandardRecord};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Per-input options for a derived collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOptions {
    /// Excluded inputs contribute zero records and subtract their records
    /// from every other input.
    pub excluded: bool,
}

impl InputOptions {
    pub fn exclude() -> Self {
        Self { excluded: true }
    }
}

/// How a derived collection merges its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Inputs in list order, records in input order.
    Concatenate,
    /// Uniform random permutation (Fisher-Yates) of the concatenation.
    Shuffle,
}

impl Combinator {
    pub fn combine(
        &self,
        inputs: Vec<(Vec<StandardRecord>, InputOptions)>,
    ) -> Vec<StandardRecord> {
        let mut records = subtract_excluded(inputs);
        if let Combinator::Shuffle = self {
            records.shuffle(&mut rand::rng());
        }
        records
    }
}

fn subtract_excluded(inputs: Vec<(Vec<StandardRecord>, InputOptions)>) -> Vec<StandardRecord> {
    let excluded: HashSet<RecordKey> = inputs
        .iter()
        .filter(|(_, options)| options.excluded)
        .flat_map(|(records, _)| records.iter().map(|r| r.record().key()))
        .collect();

    inputs
        .into_iter()
        .filter(|(_, options)| !options.excluded)
        .flat_map(|(records, _)| records)
        .filter(|r| !excluded.contains(&r.record().key()))
        .collect()
}

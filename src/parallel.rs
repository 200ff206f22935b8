//! Parallel processing support for hivfacts
//!
//! This module provides parallel variants of mutation parsing and
//! validation using rayon. Enable with the `parallel` feature.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() {
//! use hivfacts::parallel::parse_mutations_parallel;
//!
//! let texts = vec!["RT:M41L", "RT:K65R", "PR:L90M"];
//!
//! let parsed: Vec<_> = parse_mutations_parallel(&texts, None)
//!     .into_iter()
//!     .filter_map(|r| r.ok())
//!     .collect();
//! assert_eq!(parsed.len(), 3);
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::cache::ParseCache;
use crate::error::FactsError;
use crate::gene::{Gene, GeneKind};
use crate::mutation::{parse_mutation, parse_mutation_set, Mutation, MutationSet};
use crate::validation::{ValidationResult, Validator};

/// Parse many mutation strings in parallel
///
/// Returns one result per input string. Order is preserved.
pub fn parse_mutations_parallel<S: AsRef<str> + Sync>(
    texts: &[S],
    default_gene: Option<Gene>,
) -> Vec<Result<Mutation, FactsError>> {
    texts
        .par_iter()
        .map(|s| parse_mutation(s.as_ref(), default_gene))
        .collect()
}

/// Parse many mutation strings in parallel, dropping the ones that fail
pub fn parse_mutations_parallel_ok<S: AsRef<str> + Sync>(
    texts: &[S],
    default_gene: Option<Gene>,
) -> Vec<Mutation> {
    texts
        .par_iter()
        .filter_map(|s| parse_mutation(s.as_ref(), default_gene).ok())
        .collect()
}

/// Parse many mutation lists (e.g. one per sample) in parallel
pub fn parse_mutation_sets_parallel<S: AsRef<str> + Sync>(
    lists: &[S],
    default_gene: Option<Gene>,
) -> Vec<Result<MutationSet, FactsError>> {
    lists
        .par_iter()
        .map(|s| parse_mutation_set(Some(s.as_ref()), default_gene))
        .collect()
}

/// [`parse_mutation_sets_parallel`] sharing one [`ParseCache`]
///
/// Samples from one cohort repeat most of their mutations, so each
/// distinct token is parsed once.
pub fn parse_mutation_sets_parallel_cached<S: AsRef<str> + Sync>(
    lists: &[S],
    default_gene: Option<Gene>,
    cache: &ParseCache,
) -> Vec<Result<MutationSet, FactsError>> {
    lists
        .par_iter()
        .map(|s| cache.parse_mutation_set(Some(s.as_ref()), default_gene))
        .collect()
}

/// Validate many inputs in parallel with one validator
///
/// Returns the results of each input in input order.
pub fn validate_parallel<V>(
    validator: &V,
    inputs: &[V::Input],
    include: &[GeneKind],
) -> Vec<Vec<ValidationResult>>
where
    V: Validator + Sync,
    V::Input: Sized + Sync,
{
    inputs
        .par_iter()
        .map(|input| validator.validate(input, include))
        .collect()
}

/// Statistics from parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelStats {
    /// Total items processed
    pub total: usize,
    /// Successfully processed
    pub success: usize,
    /// Failed to process
    pub errors: usize,
}

impl ParallelStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count successes and failures of a batch
    pub fn from_results<T, E>(results: &[Result<T, E>]) -> Self {
        let success = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            success,
            errors: results.len() - success,
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}

//! Position-keyed mutation sets and their algebra

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gene::Gene;
use crate::mutation::model::Mutation;
use crate::position::GenePosition;

/// At most one [`Mutation`] per [`GenePosition`], ordered by position
///
/// Inserting at an occupied position unions the AA sets. All algebra
/// returns new sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSet {
    mutations: BTreeMap<GenePosition, Mutation>,
}

impl MutationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, merging with any mutation already at the same position
    pub fn insert(&mut self, mutation: Mutation) {
        let key = mutation.gene_position();
        let merged = match self.mutations.get(&key) {
            // same key, so the merge cannot fail
            Some(existing) => existing.merge_with(&mutation).unwrap_or(mutation),
            None => mutation,
        };
        self.mutations.insert(key, merged);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.values()
    }

    pub fn get(&self, position: &GenePosition) -> Option<&Mutation> {
        self.mutations.get(position)
    }

    pub fn get_at(&self, gene: Gene, pos: u32) -> Option<&Mutation> {
        self.get(&GenePosition::new(gene, pos))
    }

    pub fn contains_position(&self, position: &GenePosition) -> bool {
        self.mutations.contains_key(position)
    }

    /// True when the set holds any AA of `mutation` at its position
    pub fn has_shared_aa(&self, mutation: &Mutation) -> bool {
        self.get(&mutation.gene_position())
            .is_some_and(|m| m.overlaps(mutation))
    }

    pub fn positions(&self) -> impl Iterator<Item = &GenePosition> {
        self.mutations.keys()
    }

    /// Union by position; AA sets unioned
    pub fn merge_with(&self, other: &MutationSet) -> MutationSet {
        let mut merged = self.clone();
        for m in other.iter() {
            merged.insert(m.clone());
        }
        merged
    }

    /// Remove `other`'s AAs at shared positions, dropping emptied positions
    pub fn subtract_by(&self, other: &MutationSet) -> MutationSet {
        self.iter()
            .filter_map(|m| match other.get(&m.gene_position()) {
                Some(o) => m.subtract_by(o).ok().flatten(),
                None => Some(m.clone()),
            })
            .collect()
    }

    /// Shared AAs at shared positions
    pub fn intersect_with(&self, other: &MutationSet) -> MutationSet {
        self.iter()
            .filter_map(|m| {
                other
                    .get(&m.gene_position())
                    .and_then(|o| m.intersect_with(o).ok().flatten())
            })
            .collect()
    }

    /// One single-AA mutation per AA, in position then AA order
    pub fn split(&self) -> Vec<Mutation> {
        self.iter().flat_map(|m| m.split()).collect()
    }

    pub fn filter_by<F>(&self, pred: F) -> MutationSet
    where
        F: Fn(&Mutation) -> bool,
    {
        self.iter().filter(|m| pred(m)).cloned().collect()
    }

    /// Split, then keep single-AA mutations matching `pred`
    pub fn filter_and_split_by<F>(&self, pred: F) -> Vec<Mutation>
    where
        F: Fn(&Mutation) -> bool,
    {
        self.split().into_iter().filter(|m| pred(m)).collect()
    }

    /// Mutations of one gene
    pub fn for_gene(&self, gene: Gene) -> MutationSet {
        self.filter_by(|m| m.gene() == gene)
    }

    pub fn group_by_gene(&self) -> BTreeMap<Gene, MutationSet> {
        let mut groups: BTreeMap<Gene, MutationSet> = BTreeMap::new();
        for m in self.iter() {
            groups.entry(m.gene()).or_default().insert(m.clone());
        }
        groups
    }

    /// Distinct genes in order
    pub fn genes(&self) -> Vec<Gene> {
        let mut genes: Vec<Gene> = self.iter().map(|m| m.gene()).collect();
        genes.dedup();
        genes
    }

    /// Format every mutation and join with `sep`
    pub fn join<F>(&self, sep: &str, format: F) -> String
    where
        F: Fn(&Mutation) -> String,
    {
        join_mutations(self.iter(), sep, format)
    }
}

/// Format and join a sequence of mutations
pub fn join_mutations<'a, I, F>(mutations: I, sep: &str, format: F) -> String
where
    I: IntoIterator<Item = &'a Mutation>,
    F: Fn(&Mutation) -> String,
{
    mutations
        .into_iter()
        .map(|m| format(m))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Group split mutations by gene, keeping order within each gene
pub fn group_list_by_gene(mutations: &[Mutation]) -> BTreeMap<Gene, Vec<Mutation>> {
    let mut groups: BTreeMap<Gene, Vec<Mutation>> = BTreeMap::new();
    for m in mutations {
        groups.entry(m.gene()).or_default().push(m.clone());
    }
    groups
}

impl FromIterator<Mutation> for MutationSet {
    fn from_iter<T: IntoIterator<Item = Mutation>>(iter: T) -> Self {
        let mut set = MutationSet::new();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

impl Extend<Mutation> for MutationSet {
    fn extend<T: IntoIterator<Item = Mutation>>(&mut self, iter: T) {
        for m in iter {
            self.insert(m);
        }
    }
}

impl<'a> IntoIterator for &'a MutationSet {
    type Item = &'a Mutation;
    type IntoIter = std::collections::btree_map::Values<'a, GenePosition, Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.values()
    }
}

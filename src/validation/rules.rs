//! Rule families shared by the validators
//!
//! Each rule is independent and pure: it looks at classified mutations or
//! coverage and returns zero or more results. Levels and count thresholds
//! are passed in because they differ between scopes.

use std::collections::BTreeSet;

use crate::gene::{Gene, GeneKind};
use crate::mutation::{group_list_by_gene, Mutation, MutationSet};
use crate::position::{GenePosition, GeneRegion};
use crate::tables::ReferenceTables;
use crate::validation::message::{GeneMutations, ValidationMessage};
use crate::validation::{ValidationLevel, ValidationResult};

fn result(level: ValidationLevel, message: ValidationMessage) -> ValidationResult {
    ValidationResult::new(level, message)
}

pub(crate) fn is_included(include: &[GeneKind], mutation: &Mutation) -> bool {
    include.contains(&mutation.gene().kind())
}

/// CRITICAL `NoGeneFound` when none of `present` is included
pub(crate) fn validate_not_empty(present: &[Gene], include: &[GeneKind]) -> Vec<ValidationResult> {
    if present.iter().any(|g| include.contains(&g.kind())) {
        return Vec::new();
    }
    vec![result(
        ValidationLevel::Critical,
        ValidationMessage::NoGeneFound {
            genes: include.to_vec(),
        },
    )]
}

/// Levels for one and for several stop codons in a gene
#[derive(Debug, Clone, Copy)]
pub(crate) struct StopCodonLevels {
    pub single: ValidationLevel,
    pub multiple: ValidationLevel,
}

pub(crate) fn validate_stop_codons(
    mutations: &MutationSet,
    include: &[GeneKind],
    levels: StopCodonLevels,
) -> Vec<ValidationResult> {
    let stops = mutations.filter_by(|m| m.is_stop_codon() && is_included(include, m));
    stops
        .group_by_gene()
        .into_iter()
        .filter_map(|(gene, set)| {
            let mut list: Vec<Mutation> = set.iter().cloned().collect();
            match list.len() {
                0 => None,
                1 => list.pop().map(|mutation| {
                    result(
                        levels.single,
                        ValidationMessage::SingleStopCodon {
                            gene: gene.kind(),
                            mutation,
                        },
                    )
                }),
                _ => Some(result(
                    levels.multiple,
                    ValidationMessage::MultipleStopCodons {
                        gene: gene.kind(),
                        mutations: list,
                    },
                )),
            }
        })
        .collect()
}

/// Unusual mutations of the included genes, grouped by gene
fn unusual_by_gene(
    mutations: &MutationSet,
    include: &[GeneKind],
    tables: &ReferenceTables,
) -> Vec<(GeneKind, Vec<Mutation>, Vec<Mutation>)> {
    mutations
        .filter_by(|m| is_included(include, m) && tables.is_unusual(m))
        .group_by_gene()
        .into_iter()
        .map(|(gene, set)| {
            let all: Vec<Mutation> = set.iter().cloned().collect();
            let at_drp: Vec<Mutation> = all
                .iter()
                .filter(|m| tables.is_at_drug_resistance_position(m))
                .cloned()
                .collect();
            (gene.kind(), all, at_drp)
        })
        .collect()
}

/// Unusual-mutation rule of the mutation-list scope
///
/// DRP subset: >1 SEVERE, 1 WARNING. When the gene has more than one
/// unusual mutation, the remainder outside DRPs is reported separately so
/// positions already named are not repeated.
pub(crate) fn validate_unusual_for_mutations(
    mutations: &MutationSet,
    include: &[GeneKind],
    tables: &ReferenceTables,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for (gene, all, at_drp) in unusual_by_gene(mutations, include, tables) {
        match at_drp.as_slice() {
            [] => {}
            [one] => results.push(result(
                ValidationLevel::Warning,
                ValidationMessage::SingleUnusualMutationAtDrp {
                    gene,
                    mutation: one.clone(),
                },
            )),
            _ => results.push(result(
                ValidationLevel::SevereWarning,
                ValidationMessage::MultipleUnusualMutationsAtDrp {
                    gene,
                    mutations: at_drp.clone(),
                },
            )),
        }
        if all.len() <= 1 {
            continue;
        }
        if at_drp.is_empty() {
            results.push(result(
                ValidationLevel::Warning,
                ValidationMessage::MultipleUnusualMutations {
                    gene,
                    mutations: all,
                },
            ));
            continue;
        }
        let mut additional: Vec<Mutation> =
            all.into_iter().filter(|m| !at_drp.contains(m)).collect();
        match additional.len() {
            0 => {}
            1 => {
                if let Some(mutation) = additional.pop() {
                    results.push(result(
                        ValidationLevel::Warning,
                        ValidationMessage::SingleAdditionalUnusualMutation { gene, mutation },
                    ));
                }
            }
            _ => results.push(result(
                ValidationLevel::SevereWarning,
                ValidationMessage::MultipleAdditionalUnusualMutations {
                    gene,
                    mutations: additional,
                },
            )),
        }
    }
    results
}

/// Unusual-mutation rule of the sequence scope
///
/// Totals: >8 SEVERE, >4 WARNING, >2 NOTE. DRP subset: >1 WARNING, 1 NOTE.
pub(crate) fn validate_unusual_for_sequence(
    mutations: &MutationSet,
    include: &[GeneKind],
    tables: &ReferenceTables,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for (gene, all, at_drp) in unusual_by_gene(mutations, include, tables) {
        let level = match all.len() {
            n if n > 8 => Some(ValidationLevel::SevereWarning),
            n if n > 4 => Some(ValidationLevel::Warning),
            n if n > 2 => Some(ValidationLevel::Note),
            _ => None,
        };
        if let Some(level) = level {
            results.push(result(
                level,
                ValidationMessage::MultipleUnusualMutations {
                    gene,
                    mutations: all,
                },
            ));
        }
        match at_drp.as_slice() {
            [] => {}
            [one] => results.push(result(
                ValidationLevel::Note,
                ValidationMessage::SingleUnusualMutationAtDrp {
                    gene,
                    mutation: one.clone(),
                },
            )),
            _ => results.push(result(
                ValidationLevel::Warning,
                ValidationMessage::MultipleUnusualMutationsAtDrp {
                    gene,
                    mutations: at_drp,
                },
            )),
        }
    }
    results
}

/// Count tiers of the APOBEC rule
#[derive(Debug, Clone, Copy)]
pub(crate) struct ApobecTiers {
    /// Exact count reported as a single-mutation NOTE
    pub single_at: usize,
    /// Counts above this are a WARNING
    pub warning_above: usize,
    /// Counts above this are SEVERE
    pub severe_above: usize,
}

fn grouped(mutations: &[Mutation]) -> Vec<GeneMutations> {
    group_list_by_gene(mutations)
        .into_iter()
        .map(|(gene, mutations)| GeneMutations {
            gene: gene.kind(),
            mutations,
        })
        .collect()
}

/// APOBEC signature rule plus its drug-resistance-position sub-rule
pub(crate) fn validate_apobec(
    mutations: &MutationSet,
    include: &[GeneKind],
    tables: &ReferenceTables,
    tiers: ApobecTiers,
) -> Vec<ValidationResult> {
    let apobecs: Vec<Mutation> = tables
        .apobecs
        .apobec_mutations_of(mutations)
        .into_iter()
        .filter(|m| is_included(include, m))
        .collect();
    let apobec_drms: Vec<Mutation> = tables
        .apobecs
        .apobec_drms_of(mutations)
        .into_iter()
        .filter(|m| is_included(include, m))
        .collect();

    let mut results = Vec::new();
    let count = apobecs.len();
    let level = if count > tiers.severe_above {
        Some(ValidationLevel::SevereWarning)
    } else if count > tiers.warning_above {
        Some(ValidationLevel::Warning)
    } else if count == tiers.single_at {
        Some(ValidationLevel::Note)
    } else {
        None
    };
    if let Some(level) = level {
        let message = if level == ValidationLevel::Note {
            ValidationMessage::SingleApobec {
                apobecs: grouped(&apobecs),
                apobec_drms: grouped(&apobec_drms),
            }
        } else {
            ValidationMessage::MultipleApobec {
                count,
                apobecs: grouped(&apobecs),
                apobec_drms: grouped(&apobec_drms),
            }
        };
        results.push(result(level, message));
    }

    let mut at_drp: Vec<Mutation> = apobecs
        .into_iter()
        .filter(|m| tables.is_at_drug_resistance_position(m))
        .collect();
    match at_drp.len() {
        0 => {}
        1 => {
            if let Some(mutation) = at_drp.pop() {
                results.push(result(
                    ValidationLevel::Warning,
                    ValidationMessage::SingleApobecAtDrp { mutation },
                ));
            }
        }
        _ => results.push(result(
            ValidationLevel::SevereWarning,
            ValidationMessage::MultipleApobecAtDrp { mutations: at_drp },
        )),
    }
    results
}

/// Missing-position rule over an expected range
///
/// `needed` and `needed_drps` must be in position order; a position is
/// missing when it is not in `available`.
pub(crate) fn validate_missing_positions(
    needed: &[GenePosition],
    needed_drps: &[GenePosition],
    available: &BTreeSet<GenePosition>,
) -> Vec<ValidationResult> {
    let missing: Vec<GenePosition> = needed
        .iter()
        .filter(|gp| !available.contains(gp))
        .copied()
        .collect();
    let missing_drps: Vec<GenePosition> = needed_drps
        .iter()
        .filter(|gp| !available.contains(gp))
        .copied()
        .collect();
    let positions = missing.len();
    let drps = missing_drps.len();
    let position_regions = GeneRegion::from_positions(&missing);
    let drp_regions = GeneRegion::from_positions(&missing_drps);

    let (level, message) = if drps > 1 {
        let level = if drps > 5 {
            ValidationLevel::SevereWarning
        } else if drps > 3 {
            ValidationLevel::Warning
        } else {
            ValidationLevel::Note
        };
        (
            level,
            ValidationMessage::MultiplePositionsMissingWithMultipleDrps {
                positions,
                position_regions,
                drps,
                drp_regions,
            },
        )
    } else if drps > 0 && positions > 1 {
        (
            ValidationLevel::Warning,
            ValidationMessage::MultiplePositionsMissingWithSingleDrp {
                positions,
                position_regions,
                drp_regions,
            },
        )
    } else if drps > 0 {
        (
            ValidationLevel::Note,
            ValidationMessage::SingleDrpMissing { drp_regions },
        )
    } else if positions > 1 {
        (
            ValidationLevel::Warning,
            ValidationMessage::MultiplePositionsMissingWithoutDrp {
                positions,
                position_regions,
            },
        )
    } else if positions > 0 {
        (
            ValidationLevel::Note,
            ValidationMessage::SinglePositionMissingWithoutDrp { position_regions },
        )
    } else {
        return Vec::new();
    };
    vec![result(level, message)]
}

/// Missing positions of the included genes between the first and last present gene
///
/// `unsequenced` gives the unsequenced regions of a present gene; genes not
/// present count as entirely unsequenced.
pub(crate) fn validate_missing_gene_positions<F>(
    present: &[Gene],
    include: &[GeneKind],
    tables: &ReferenceTables,
    unsequenced: F,
) -> Vec<ValidationResult>
where
    F: Fn(Gene) -> Option<Vec<GeneRegion>>,
{
    let included: Vec<Gene> = present
        .iter()
        .filter(|g| include.contains(&g.kind()))
        .copied()
        .collect();
    let (Some(first), Some(last)) = (included.first(), included.last()) else {
        return Vec::new();
    };
    let start = GenePosition::new(*first, 1);
    let end = GenePosition::new(*last, last.length());
    let needed = match GenePosition::positions_between_in(&start, &end, include) {
        Ok(needed) => needed,
        Err(e) => {
            log::warn!("Cannot compute expected positions: {}", e);
            return Vec::new();
        }
    };
    let needed_drps: Vec<GenePosition> = needed
        .iter()
        .filter(|gp| tables.is_drug_resistance_position(gp))
        .copied()
        .collect();

    let regions: Vec<(Gene, Vec<GeneRegion>)> = GeneKind::ALL
        .iter()
        .filter(|kind| include.contains(kind))
        .map(|kind| {
            let gene = first.strain().gene(*kind);
            let regions = unsequenced(gene)
                .unwrap_or_else(|| vec![GeneRegion::new(gene, 1, gene.length())]);
            (gene, regions)
        })
        .collect();
    let available: BTreeSet<GenePosition> = needed
        .iter()
        .filter(|gp| {
            !regions
                .iter()
                .any(|(gene, rs)| *gene == gp.gene() && rs.iter().any(|r| r.contains(gp)))
        })
        .copied()
        .collect();

    validate_missing_positions(&needed, &needed_drps, &available)
}

/// SEVERE warning when the prevalence cutoff is 0.1% or 0.2%
pub(crate) fn validate_too_low_threshold(cutoff: f64) -> Vec<ValidationResult> {
    if (cutoff - 0.001).abs() < 1e-5 || (cutoff - 0.002).abs() < 1e-5 {
        vec![result(
            ValidationLevel::SevereWarning,
            ValidationMessage::NgsTooLowThreshold,
        )]
    } else {
        Vec::new()
    }
}

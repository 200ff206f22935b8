//! Typed validation messages and their rendered text

use std::fmt;

use serde::Serialize;

use crate::gene::GeneKind;
use crate::mutation::Mutation;
use crate::position::{GenePosition, GeneRegion};
use crate::validation::input::FrameShift;

/// Mutations of one gene, rendered as `RT: M41L, T215Y`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneMutations {
    pub gene: GeneKind,
    pub mutations: Vec<Mutation>,
}

/// Which end of a gene sequence was trimmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequenceEnd {
    FivePrime,
    ThreePrime,
}

impl fmt::Display for SequenceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceEnd::FivePrime => f.write_str("5′"),
            SequenceEnd::ThreePrime => f.write_str("3′"),
        }
    }
}

/// One kind of validation finding with its data
///
/// The level is not part of the message: several messages are emitted at
/// different levels depending on the scope and the counts involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ValidationMessage {
    NoGeneFound {
        genes: Vec<GeneKind>,
    },
    /// HIV-2 reads variant naming all three genes
    NoKnownGeneFound,
    ReverseComplement,
    SequenceTrimmed {
        gene: GeneKind,
        count: u32,
        end: SequenceEnd,
    },
    FastaGapTooLong,
    InvalidNasRemoved {
        chars: String,
    },
    MultiplePositionsMissingWithMultipleDrps {
        positions: usize,
        position_regions: Vec<GeneRegion>,
        drps: usize,
        drp_regions: Vec<GeneRegion>,
    },
    MultiplePositionsMissingWithSingleDrp {
        positions: usize,
        position_regions: Vec<GeneRegion>,
        drp_regions: Vec<GeneRegion>,
    },
    SingleDrpMissing {
        drp_regions: Vec<GeneRegion>,
    },
    MultiplePositionsMissingWithoutDrp {
        positions: usize,
        position_regions: Vec<GeneRegion>,
    },
    SinglePositionMissingWithoutDrp {
        position_regions: Vec<GeneRegion>,
    },
    MultipleStopCodons {
        gene: GeneKind,
        mutations: Vec<Mutation>,
    },
    SingleStopCodon {
        gene: GeneKind,
        mutation: Mutation,
    },
    /// Stop codons across genes, listed with full gene names
    StopCodons {
        mutations: Vec<Mutation>,
    },
    MultipleUnusualMutations {
        gene: GeneKind,
        mutations: Vec<Mutation>,
    },
    MultipleUnusualMutationsAtDrp {
        gene: GeneKind,
        mutations: Vec<Mutation>,
    },
    SingleUnusualMutationAtDrp {
        gene: GeneKind,
        mutation: Mutation,
    },
    SingleAdditionalUnusualMutation {
        gene: GeneKind,
        mutation: Mutation,
    },
    MultipleAdditionalUnusualMutations {
        gene: GeneKind,
        mutations: Vec<Mutation>,
    },
    MultipleApobec {
        count: usize,
        apobecs: Vec<GeneMutations>,
        apobec_drms: Vec<GeneMutations>,
    },
    SingleApobec {
        apobecs: Vec<GeneMutations>,
        apobec_drms: Vec<GeneMutations>,
    },
    MultipleApobecAtDrp {
        mutations: Vec<Mutation>,
    },
    SingleApobecAtDrp {
        mutation: Mutation,
    },
    MultipleUnusualIndelsAndFrameshifts {
        gene: GeneKind,
        count: usize,
        indels: Vec<Mutation>,
        frameshifts: Vec<FrameShift>,
    },
    MultipleFrameShifts {
        gene: GeneKind,
        count: usize,
        frameshifts: Vec<FrameShift>,
    },
    MultipleUnusualIndels {
        gene: GeneKind,
        count: usize,
        indels: Vec<Mutation>,
    },
    SingleFrameshift {
        gene: GeneKind,
        frameshift: FrameShift,
    },
    SingleUnusualIndel {
        gene: GeneKind,
        indels: Vec<Mutation>,
    },
    NgsTooLowThreshold,
    NgsMinReadDepthTooLow {
        min_read_depth: u64,
        positions: usize,
        percent: f64,
    },
    NgsTooManyUnusualMutations {
        cutoff: f64,
    },
    NgsTooManyApobecMutationsNoApobecDrm {
        cutoff: f64,
    },
    NgsTooManyApobecMutationsOneApobecDrm {
        cutoff: f64,
        mutation: Mutation,
    },
    NgsTooManyApobecMutationsMultipleApobecDrms {
        cutoff: f64,
        mutations: Vec<Mutation>,
    },
    PositionsMissing {
        count: usize,
        percent: f64,
        start: GenePosition,
        end: GenePosition,
    },
    DrpPositionsMissing {
        count: usize,
        percent: f64,
        total: usize,
        start: GenePosition,
        end: GenePosition,
    },
}

/// Join as `A`, `A and B` or `A, B, and C`
pub fn and_list<T: fmt::Display>(items: &[T]) -> String {
    let texts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    match texts.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn to_be(n: usize) -> &'static str {
    if n == 1 {
        "is"
    } else {
        "are"
    }
}

fn human(mutations: &[Mutation]) -> String {
    mutations
        .iter()
        .map(Mutation::human_format)
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_gene(mutations: &[Mutation]) -> String {
    mutations
        .iter()
        .map(Mutation::human_format_with_gene)
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_full_gene(mutations: &[Mutation]) -> String {
    mutations
        .iter()
        .map(|m| format!("{}_{}", m.gene().name(), m.human_format()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn regions(regions: &[GeneRegion]) -> String {
    GeneRegion::join(regions)
}

fn frameshifts(shifts: &[FrameShift]) -> String {
    shifts
        .iter()
        .map(|fs| fs.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn grouped(groups: &[GeneMutations], list: fn(&[Mutation]) -> String) -> String {
    groups
        .iter()
        .map(|g| format!("{}: {}", g.gene, list(&g.mutations)))
        .collect::<Vec<_>>()
        .join("; ")
}

fn and_list_human(mutations: &[Mutation]) -> String {
    let texts: Vec<String> = mutations.iter().map(Mutation::human_format).collect();
    and_list(&texts)
}

fn apobec_drm_clause(drms: &[GeneMutations]) -> String {
    let count: usize = drms.iter().map(|g| g.mutations.len()).sum();
    if count == 0 {
        return String::new();
    }
    format!(
        " The following {} DRMs in this sequence could reflect APOBEC activity: {}.",
        count,
        grouped(drms, and_list_human)
    )
}

const APOBEC_NGS_PREFIX: &str = "APOBEC mutations. At this threshold, the sequence";

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ValidationMessage::*;
        match self {
            NoGeneFound { genes } => write!(
                f,
                "There were no {} genes found, refuse to process.",
                and_list(genes)
            ),
            NoKnownGeneFound => f.write_str(
                "There were no Protease, Reverse Transcriptase, or Integrase genes found, \
                 refuse to process.",
            ),
            ReverseComplement => f.write_str(
                "This report was derived from the reverse complement of input sequence.",
            ),
            SequenceTrimmed { gene, count, end } => write!(
                f,
                "The {} sequence had {} amino acids trimmed from its {}-end due to poor quality.",
                gene, count, end
            ),
            FastaGapTooLong => f.write_str(
                "This sequence has critical potentially correctable errors. It has a large \
                 sequence gap, defined as an insertion or deletion of >30 bps. One possible \
                 cause of this error is that the input sequence was concatenated from multiple \
                 partial sequences. Adding 'N's in place of the missing sequence will allow the \
                 sequence to be processed.",
            ),
            InvalidNasRemoved { chars } => write!(
                f,
                "Non-NA character(s) {} were found and removed from the sequence.",
                serde_json::to_string(chars).map_err(|_| fmt::Error)?
            ),
            MultiplePositionsMissingWithMultipleDrps {
                positions,
                position_regions,
                drps,
                drp_regions,
            } => write!(
                f,
                "{} positions were not sequenced or aligned: {}. Of them, {} are at \
                 drug-resistance positions: {}.",
                positions,
                regions(position_regions),
                drps,
                regions(drp_regions)
            ),
            MultiplePositionsMissingWithSingleDrp {
                positions,
                position_regions,
                drp_regions,
            } => write!(
                f,
                "{} positions were not sequenced or aligned: {}. Of them, one is at a \
                 drug-resistance position: {}.",
                positions,
                regions(position_regions),
                regions(drp_regions)
            ),
            SingleDrpMissing { drp_regions } => write!(
                f,
                "One drug-resistance position was not sequenced or aligned: {}.",
                regions(drp_regions)
            ),
            MultiplePositionsMissingWithoutDrp {
                positions,
                position_regions,
            } => write!(
                f,
                "{} positions were not sequenced or aligned: {}.",
                positions,
                regions(position_regions)
            ),
            SinglePositionMissingWithoutDrp { position_regions } => write!(
                f,
                "One position was not sequenced or aligned: {}.",
                regions(position_regions)
            ),
            MultipleStopCodons { gene, mutations } => write!(
                f,
                "There are {} stop codons in {}: {}.",
                mutations.len(),
                gene,
                with_gene(mutations)
            ),
            SingleStopCodon { gene, mutation } => write!(
                f,
                "There is one stop codon in {}: {}.",
                gene,
                mutation.human_format_with_gene()
            ),
            StopCodons { mutations } => match mutations.as_slice() {
                [one] => write!(
                    f,
                    "There is one stop codon: {}.",
                    with_full_gene(std::slice::from_ref(one))
                ),
                _ => write!(
                    f,
                    "There are {} stop codons: {}.",
                    mutations.len(),
                    with_full_gene(mutations)
                ),
            },
            MultipleUnusualMutations { gene, mutations } => write!(
                f,
                "There are {} unusual mutations in {}: {}.",
                mutations.len(),
                gene,
                human(mutations)
            ),
            MultipleUnusualMutationsAtDrp { gene, mutations } => write!(
                f,
                "There are {} unusual mutations at drug-resistance positions in {}: {}.",
                mutations.len(),
                gene,
                human(mutations)
            ),
            SingleUnusualMutationAtDrp { gene, mutation } => write!(
                f,
                "There is one unusual mutation at a drug-resistance position in {}: {}.",
                gene,
                mutation.human_format()
            ),
            SingleAdditionalUnusualMutation { gene, mutation } => write!(
                f,
                "There is one additional unusual mutation in {}: {}.",
                gene,
                mutation.human_format()
            ),
            MultipleAdditionalUnusualMutations { gene, mutations } => write!(
                f,
                "There are {} additional unusual mutations in {}: {}.",
                mutations.len(),
                gene,
                human(mutations)
            ),
            MultipleApobec {
                count,
                apobecs,
                apobec_drms,
            } => write!(
                f,
                "The following {} APOBEC mutations were present in the sequence: {}.{}",
                count,
                grouped(apobecs, human),
                apobec_drm_clause(apobec_drms)
            ),
            SingleApobec {
                apobecs,
                apobec_drms,
            } => write!(
                f,
                "This following APOBEC mutation was present in the sequence: {}.{}",
                grouped(apobecs, human),
                apobec_drm_clause(apobec_drms)
            ),
            MultipleApobecAtDrp { mutations } => write!(
                f,
                "There are {} APOBEC-associated mutations at drug-resistance positions: {}.",
                mutations.len(),
                with_gene(mutations)
            ),
            SingleApobecAtDrp { mutation } => write!(
                f,
                "There is one APOBEC-associated mutation at a drug-resistance position: {}.",
                mutation.human_format_with_gene()
            ),
            MultipleUnusualIndelsAndFrameshifts {
                gene,
                count,
                indels,
                frameshifts: shifts,
            } => write!(
                f,
                "The {} gene has {} unusual indels and/or frameshifts. The indels include {}. \
                 The frameshifts include {}.",
                gene,
                count,
                human(indels),
                frameshifts(shifts)
            ),
            MultipleFrameShifts {
                gene,
                count,
                frameshifts: shifts,
            } => write!(
                f,
                "The {} gene has {} frameshifts: {}.",
                gene,
                count,
                frameshifts(shifts)
            ),
            MultipleUnusualIndels {
                gene,
                count,
                indels,
            } => write!(
                f,
                "The {} gene has {} unusual indels: {}.",
                gene,
                count,
                human(indels)
            ),
            SingleFrameshift { gene, frameshift } => {
                write!(f, "The {} gene has a frameshift: {}.", gene, frameshift)
            }
            SingleUnusualIndel { gene, indels } => write!(
                f,
                "The {} gene has an unusual indel: {}.",
                gene,
                human(indels)
            ),
            NgsTooLowThreshold => f.write_str(
                "Extensive empirical data, as well as, modeling data suggest that the risk of \
                 sequence artifact is almost inevitable at thresholds below 0.5% to 1.0% unless \
                 unique molecular identifiers (UMI) are used prior to PCR. We display quality \
                 control data for the 0.1% and 0.2% thresholds solely to indicate that choosing \
                 a threshold that is too low will result in sequence artifacts.",
            ),
            NgsMinReadDepthTooLow {
                min_read_depth,
                positions,
                percent,
            } => write!(
                f,
                "You have selected a minimal read-depth of {}. However, {} ({:.1}%) position{} \
                 in your sequence {} fewer than {} reads. Click the ‘Read Coverage’ button to \
                 review.",
                min_read_depth,
                positions,
                percent,
                plural(*positions),
                if *positions == 1 { "has" } else { "have" },
                min_read_depth
            ),
            NgsTooManyUnusualMutations { cutoff } => write!(
                f,
                "At this threshold ({:.1}%), >= 1.0% of positions have a highly unusual \
                 mutation (defined as a prevalence <0.01% in published group M direct PCR \
                 sequences). This indicates that there may be an unacceptably high risk that \
                 some mutations at this threshold represent sequence artifacts.",
                cutoff * 100.0
            ),
            NgsTooManyApobecMutationsNoApobecDrm { cutoff } => write!(
                f,
                "At this threshold ({:.1}%), >=3 positions with signature {} contains no \
                 drug-resistance mutations that could be caused by APOBEC-mediated G-to-A \
                 hypermutation.",
                cutoff * 100.0,
                APOBEC_NGS_PREFIX
            ),
            NgsTooManyApobecMutationsOneApobecDrm { cutoff, mutation } => write!(
                f,
                "At this threshold ({:.1}%), >=3 positions with signature {} also contains \
                 one drug-resistance mutation that could be caused by APOBEC-mediated G-to-A \
                 hypermutation ({}). This DRM therefore should be considered possible sequence \
                 artifacts.",
                cutoff * 100.0,
                APOBEC_NGS_PREFIX,
                mutation.human_format_with_gene()
            ),
            NgsTooManyApobecMutationsMultipleApobecDrms { cutoff, mutations } => write!(
                f,
                "At this threshold ({:.1}%), >=3 positions with signature {} also contains \
                 {} drug-resistance mutations that could be caused by APOBEC-mediated G-to-A \
                 hypermutation ({}). These DRMs therefore should be considered possible \
                 sequence artifacts.",
                cutoff * 100.0,
                APOBEC_NGS_PREFIX,
                mutations.len(),
                with_gene(mutations)
            ),
            PositionsMissing {
                count,
                percent,
                start,
                end,
            } => write!(
                f,
                "{} ({:.1}%) position{} {} missing between {} and {}. Click the ‘Read \
                 Coverage’ button to review.",
                count,
                percent,
                plural(*count),
                to_be(*count),
                start,
                end
            ),
            DrpPositionsMissing {
                count,
                percent,
                total,
                start,
                end,
            } => write!(
                f,
                "{} ({:.1}%) out of {} position{} that may have a drug resistance mutation {} \
                 missing between {} and {}. Click the ‘Read Coverage’ button to review.",
                count,
                percent,
                total,
                plural(*count),
                to_be(*count),
                start,
                end
            ),
        }
    }
}

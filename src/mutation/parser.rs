//! Mutation notation parser using nom
//!
//! Accepted notation:
//!
//! ```text
//! [__ASI__][GENE][:_-][CONSENSUS]POSITION CHANGE[:TRIPLET]
//! ```
//!
//! - `GENE` is `PR`, `RT` or `IN` in any case
//! - `POSITION` has one to three digits
//! - `CHANGE` is an amino-acid group (`184VI`, `67D-`, `69T_SS`, `69#SS`),
//!   a sentinel (`69i`, `44d`, `69_`, `44-`, `69#`, `44~`) or a word
//!   (`69Insertion`, `44Del`)
//! - `TRIPLET` is a nucleotide codon such as `ATG`
//!
//! Batch input separates mutations with whitespace, `,`, `;`, `+` or `.`.

use std::collections::BTreeSet;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while_m_n},
    character::complete::{char, multispace0, one_of, satisfy},
    combinator::{eof, map, map_opt, map_res, opt, peek},
    error::ErrorKind,
    sequence::{preceded, terminated},
    IResult, Parser,
};

use crate::error::{ErrorCode, FactsError, MUTATION_SYNTAX_EXAMPLE};
use crate::gene::{Gene, GeneKind, Strain};
use crate::mutation::aa::AminoAcid;
use crate::mutation::model::{normalize_aa, Mutation, MutationFlavor};
use crate::mutation::set::MutationSet;

/// Marker prefix used by ASI rule files
pub const ASI_MARKER: &str = "__ASI__";

type Change = (BTreeSet<AminoAcid>, String);

#[derive(Debug)]
struct ParsedMutation<'a> {
    gene: Option<GeneKind>,
    position: u32,
    aas: BTreeSet<AminoAcid>,
    inserted: String,
    triplet: Option<&'a str>,
}

/// Consensus letters: `[AC-IK-NP-TV-Y]`
const fn is_consensus_char(c: char) -> bool {
    matches!(c, 'A' | 'C'..='I' | 'K'..='N' | 'P'..='T' | 'V'..='Y')
}

/// Letters allowed in an AA group: consensus letters plus `Z . *`
const fn is_group_char(c: char) -> bool {
    is_consensus_char(c) || matches!(c, 'Z' | '.' | '*')
}

const fn is_triplet_char(c: char) -> bool {
    matches!(
        c,
        'A' | 'C' | 'G' | 'T' | 'R' | 'Y' | 'M' | 'W' | 'S' | 'K' | 'B' | 'D' | 'H' | 'V' | 'N'
            | '-'
    )
}

fn gene_token(input: &str) -> IResult<&str, GeneKind> {
    alt((
        map(tag_no_case("PR"), |_| GeneKind::PR),
        map(tag_no_case("RT"), |_| GeneKind::RT),
        map(tag_no_case("IN"), |_| GeneKind::IN),
    ))
    .parse(input)
}

fn position(input: &str) -> IResult<&str, u32> {
    map_res(
        take_while_m_n(1, 3, |c: char| c.is_ascii_digit()),
        str::parse::<u32>,
    )
    .parse(input)
}

/// `:TRIPLET`, `:` or nothing
fn triplet_suffix(input: &str) -> IResult<&str, Option<&str>> {
    map(
        opt(preceded(
            char(':'),
            opt(take_while_m_n(3, 3, is_triplet_char)),
        )),
        Option::flatten,
    )
    .parse(input)
}

/// Everything after the change: optional triplet, trailing whitespace, end
fn tail(input: &str) -> IResult<&str, Option<&str>> {
    terminated(triplet_suffix, (multispace0, eof)).parse(input)
}

fn single(aa: AminoAcid) -> Change {
    (BTreeSet::from([aa]), String::new())
}

/// `Ins`, `insertion`, `Del`, `deletion`
fn word_change(input: &str) -> IResult<&str, Change> {
    alt((
        map((one_of("iI"), tag("ns"), opt(tag("ertion"))), |_| {
            single(AminoAcid::Ins)
        }),
        map((one_of("dD"), tag("el"), opt(tag("etion"))), |_| {
            single(AminoAcid::Del)
        }),
    ))
    .parse(input)
}

/// A single `i _ #` or `d - ~`
fn sentinel_change(input: &str) -> IResult<&str, Change> {
    map_opt(one_of("id_#~-"), |c| normalize_aa(c).map(single)).parse(input)
}

/// One AA group, optionally followed by `#`/`_` and the inserted AAs.
/// `-` may appear among the group letters or after the insertion.
fn group_change(asi: bool) -> impl FnMut(&str) -> IResult<&str, Change> {
    move |input: &str| {
        let (rest, first) = take_while(|c: char| {
            is_group_char(c) || c == '-' || (asi && matches!(c, 'i' | 'd'))
        })
        .parse(input)?;
        let (rest, insertion) = opt((one_of("#_"), take_while(is_group_char))).parse(rest)?;
        let (rest, trailing_del) = if insertion.is_some() {
            opt(char('-')).parse(rest)?
        } else {
            (rest, None)
        };
        if first.is_empty() && insertion.is_none() {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                ErrorKind::TakeWhile1,
            )));
        }

        let mut aas: BTreeSet<AminoAcid> = first.chars().filter_map(normalize_aa).collect();
        if trailing_del.is_some() {
            aas.insert(AminoAcid::Del);
        }
        let inserted = match insertion {
            Some((_, inserted)) => {
                aas.insert(AminoAcid::Ins);
                inserted
                    .chars()
                    .filter_map(normalize_aa)
                    .map(AminoAcid::to_char)
                    .collect()
            }
            None => String::new(),
        };
        Ok((rest, (aas, inserted)))
    }
}

fn change(asi: bool) -> impl FnMut(&str) -> IResult<&str, Change> {
    move |input: &str| {
        alt((
            terminated(word_change, peek(tail)),
            terminated(group_change(asi), peek(tail)),
            terminated(sentinel_change, peek(tail)),
        ))
        .parse(input)
    }
}

fn mutation_text(input: &str, with_gene: bool) -> IResult<&str, ParsedMutation<'_>> {
    let (rest, _) = multispace0(input)?;
    let (rest, asi) = opt(tag(ASI_MARKER)).parse(rest)?;
    let (rest, gene) = if with_gene {
        map(gene_token, Some).parse(rest)?
    } else {
        (rest, None)
    };
    let (rest, _) = opt(one_of(":_-")).parse(rest)?;
    let (rest, _consensus) = opt(satisfy(is_consensus_char)).parse(rest)?;
    let (rest, position) = position(rest)?;
    let (rest, (aas, inserted)) = change(asi.is_some()).parse(rest)?;
    let (rest, triplet) = tail(rest)?;
    Ok((
        rest,
        ParsedMutation {
            gene,
            position,
            aas,
            inserted,
            triplet,
        },
    ))
}

/// Column at which the furthest-reaching attempt stopped
fn error_column(text: &str, errors: &[nom::Err<nom::error::Error<&str>>]) -> usize {
    errors
        .iter()
        .map(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => text.len() - e.input.len(),
            nom::Err::Incomplete(_) => 0,
        })
        .max()
        .unwrap_or(0)
}

fn syntax_hint() -> String {
    format!(
        "The correct format for an input mutation string is, for example, {}.",
        MUTATION_SYNTAX_EXAMPLE
    )
}

/// Parse one mutation, resolving gene tokens in `strain`
///
/// A gene token in the text wins over `default_gene`. Without either the
/// parse fails with [`ErrorCode::UnresolvedGene`].
pub fn parse_mutation_in(
    strain: Strain,
    default_gene: Option<Gene>,
    text: &str,
) -> Result<Mutation, FactsError> {
    // gene token first, then the same text read without one
    let parsed = match mutation_text(text, true) {
        Ok((_, parsed)) => parsed,
        Err(with_gene) => match mutation_text(text, false) {
            Ok((_, parsed)) => parsed,
            Err(without_gene) => {
                let column = error_column(text, &[with_gene, without_gene]);
                return Err(FactsError::notation(
                    text,
                    column,
                    format!("unexpected input. {}", syntax_hint()),
                    ErrorCode::InvalidNotation,
                ));
            }
        },
    };

    let gene = match (parsed.gene, default_gene) {
        (Some(kind), _) => strain.gene(kind),
        (None, Some(gene)) => gene,
        (None, None) => {
            return Err(FactsError::notation(
                text,
                0,
                format!(
                    "Gene is not specified and also not found in the given text: {}. {}",
                    text,
                    syntax_hint()
                ),
                ErrorCode::UnresolvedGene,
            ))
        }
    };

    let mut mutation = Mutation::new(gene, parsed.position, parsed.aas)?;
    if !parsed.inserted.is_empty() {
        mutation = mutation.with_inserted_aas(parsed.inserted);
    }
    if let Some(triplet) = parsed.triplet {
        mutation = mutation.with_triplet(triplet);
    }
    Ok(mutation)
}

/// Parse one HIV-1 mutation
///
/// # Example
///
/// ```
/// use hivfacts::parse_mutation;
///
/// let m = parse_mutation("RT:M41L", None).unwrap();
/// assert_eq!(m.human_format_with_gene(), "RT_M41L");
/// ```
pub fn parse_mutation(text: &str, default_gene: Option<Gene>) -> Result<Mutation, FactsError> {
    parse_mutation_in(Strain::Hiv1, default_gene, text)
}

/// Parse one HIV-1 mutation and require the given flavor
pub fn parse_mutation_as(
    text: &str,
    default_gene: Option<Gene>,
    flavor: MutationFlavor,
) -> Result<Mutation, FactsError> {
    let mutation = parse_mutation(text, default_gene)?;
    if mutation.flavor() != flavor {
        return Err(FactsError::notation(
            text,
            0,
            format!(
                "expected a {:?} mutation but found a {:?} mutation",
                flavor,
                mutation.flavor()
            ),
            ErrorCode::UnexpectedFlavor,
        ));
    }
    Ok(mutation)
}

/// Split batch input on whitespace, `,`, `;`, `+` and `.`
pub fn split_mutation_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '+' | '.'))
        .filter(|token| !token.is_empty())
}

/// Parse every token, keeping one result per token
pub fn parse_mutation_list(text: &str, default_gene: Option<Gene>) -> Vec<Result<Mutation, FactsError>> {
    split_mutation_tokens(text)
        .map(|token| parse_mutation(token, default_gene))
        .collect()
}

/// Parse batch input into a [`MutationSet`], failing on the first bad token
///
/// `None` yields an empty set.
pub fn parse_mutation_set(
    text: Option<&str>,
    default_gene: Option<Gene>,
) -> Result<MutationSet, FactsError> {
    let Some(text) = text else {
        return Ok(MutationSet::new());
    };
    split_mutation_tokens(text)
        .map(|token| parse_mutation(token, default_gene))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hiv1(kind: GeneKind) -> Gene {
        Gene::new(Strain::Hiv1, kind)
    }

    fn short(text: &str) -> String {
        parse_mutation(text, Some(hiv1(GeneKind::RT)))
            .unwrap()
            .short_text()
    }

    #[test]
    fn test_gene_token() {
        let m = parse_mutation("RT:215Y", None).unwrap();
        assert_eq!(m.gene(), hiv1(GeneKind::RT));
        assert_eq!(m.position(), 215);
        let m = parse_mutation("pr_L90M", None).unwrap();
        assert_eq!(m.gene(), hiv1(GeneKind::PR));
        let m = parse_mutation("IN-Q148H", None).unwrap();
        assert_eq!(m.human_format_with_gene(), "IN_Q148H");
        let m = parse_mutation("In148H", None).unwrap();
        assert_eq!(m.gene(), hiv1(GeneKind::IN));
    }

    #[test]
    fn test_default_gene() {
        let m = parse_mutation("M41L", Some(hiv1(GeneKind::RT))).unwrap();
        assert_eq!(m.gene(), hiv1(GeneKind::RT));
        let m = parse_mutation("PR:90M", Some(hiv1(GeneKind::RT))).unwrap();
        assert_eq!(m.gene(), hiv1(GeneKind::PR));
    }

    #[test]
    fn test_missing_gene() {
        let err = parse_mutation("41L", None).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UnresolvedGene));
        let msg = err.to_string();
        assert!(msg.contains("41L"));
        assert!(msg.contains("RT:215Y"));
    }

    #[test]
    fn test_change_forms() {
        assert_eq!(short("P1X"), "1X");
        assert_eq!(short("52R"), "52R");
        assert_eq!(short("69i"), "69_");
        assert_eq!(short("44d"), "44-");
        assert_eq!(short("69_XX"), "69_XX");
        assert_eq!(short("44-"), "44-");
        assert_eq!(short("69#XX"), "69_XX");
        assert_eq!(short("44~"), "44-");
        assert_eq!(short("69Insertion"), "69_");
        assert_eq!(short("69ins"), "69_");
        assert_eq!(short("44Deletion"), "44-");
        assert_eq!(short("44Del"), "44-");
        assert_eq!(short("122*"), "122*");
        assert_eq!(short("122Z"), "122*");
        assert_eq!(short("69T_SS"), "69T_SS");
        assert_eq!(short("184VIV"), "184IV");
    }

    #[test]
    fn test_word_versus_group() {
        // upper-case IN is a mixture of I and N, not a word
        assert_eq!(short("69IN"), "69IN");
        assert_eq!(short("69I"), "69I");
    }

    #[test]
    fn test_asi_lowercase_indels() {
        let m = parse_mutation("__ASI__RT69Ti", None).unwrap();
        assert_eq!(m.short_text(), "69T_");
        assert!(parse_mutation("RT69Ti", None).is_err());
        let m = parse_mutation("__ASI__RT67Dd", None).unwrap();
        assert!(m.is_deletion());
    }

    #[test]
    fn test_indel_mixtures() {
        let m = parse_mutation("__ASI__RT67Dd", None).unwrap();
        assert_eq!(m.short_text(), "67D-");
        assert_eq!(m.human_format_with_gene(), "RT_D67D-");
        assert_eq!(short("67D-"), "67D-");
        assert_eq!(short("69-_"), "69-_");
        assert_eq!(short("69_-"), "69-_");
        assert_eq!(short("69T-_SS"), "69T-_SS");
        assert_eq!(short("69*_"), "69*_");
        let m = parse_mutation("RT_D67D-", None).unwrap();
        assert!(m.is_deletion() && m.is_mixture());
    }

    #[test]
    fn test_triplet_flavor() {
        let m = parse_mutation("RT:41L:CTG", None).unwrap();
        assert_eq!(m.flavor(), MutationFlavor::Codon);
        assert_eq!(m.triplet(), Some("CTG"));
        let m = parse_mutation("RT:41L:", None).unwrap();
        assert_eq!(m.flavor(), MutationFlavor::Amino);
        assert!(parse_mutation("RT:41L:CT", None).is_err());

        assert!(parse_mutation_as("RT:41L:CTG", None, MutationFlavor::Codon).is_ok());
        let err = parse_mutation_as("RT:41L", None, MutationFlavor::Codon).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UnexpectedFlavor));
    }

    #[test]
    fn test_whitespace_allowed() {
        assert_eq!(short("  41L \t"), "41L");
    }

    #[test]
    fn test_invalid_inputs() {
        for text in ["", "RT", "RT:", "RT:2155Y", "RT:41B", "RT:41L@", "RT:41 L", "69A~"] {
            let err = parse_mutation(text, Some(hiv1(GeneKind::RT)));
            assert!(err.is_err(), "{:?} should fail", text);
        }
    }

    #[test]
    fn test_error_column() {
        let err = parse_mutation("RT:215@", None).unwrap_err();
        match err {
            FactsError::InvalidMutationNotation { text, pos, .. } => {
                assert_eq!(text, "RT:215@");
                assert_eq!(pos, 6);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_position_out_of_range() {
        let err = parse_mutation("PR:100L", None).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::OutOfRange));
        assert!(parse_mutation("PR:0L", None).is_err());
    }

    #[test]
    fn test_other_strain() {
        let m = parse_mutation_in(Strain::Hiv2a, None, "IN:293K").unwrap();
        assert_eq!(m.gene().name(), "HIV2AIN");
        assert!(parse_mutation("IN:293K", None).is_err());
    }

    #[test]
    fn test_split_tokens() {
        let tokens: Vec<&str> = split_mutation_tokens(" RT:41L,,M184V;+ T215Y.\nK65R ").collect();
        assert_eq!(tokens, vec!["RT:41L", "M184V", "T215Y", "K65R"]);
    }

    #[test]
    fn test_parse_mutation_set() {
        let set = parse_mutation_set(Some("RT:41L, RT:M41L RT:184V RT:184I"), None).unwrap();
        assert_eq!(set.len(), 2);
        assert!(parse_mutation_set(None, None).unwrap().is_empty());
        assert!(parse_mutation_set(Some("  "), None).unwrap().is_empty());
        assert!(parse_mutation_set(Some("RT:41L 41L"), None).is_err());
    }

    #[test]
    fn test_parse_mutation_list_keeps_errors() {
        let results = parse_mutation_list("RT:41L bad RT:215Y", None);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}

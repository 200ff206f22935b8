//! Gene positions and contiguous gene regions
//!
//! A [`GenePosition`] is a 1-based amino-acid position inside a [`Gene`].
//! Positions order by gene (strain, then kind) and then by position, which
//! is also the order of the `pol` polyprotein.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FactsError;
use crate::gene::{Gene, GeneKind};

/// A 1-based amino-acid position in a gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenePosition {
    gene: Gene,
    position: u32,
}

impl GenePosition {
    /// Create a position without range checking
    ///
    /// Use [`Gene::position`] to validate against the gene length.
    pub const fn new(gene: Gene, position: u32) -> Self {
        Self { gene, position }
    }

    pub fn gene(&self) -> Gene {
        self.gene
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Reference amino acid at this position
    pub fn reference(&self) -> Result<char, FactsError> {
        self.gene.reference_at(self.position)
    }

    /// Position in the concatenated PR-RT-IN polyprotein of the same strain
    pub fn pol_position(&self) -> u32 {
        let offset: u32 = self
            .gene
            .strain()
            .genes()
            .iter()
            .take_while(|g| **g < self.gene)
            .map(|g| g.length())
            .sum();
        offset + self.position
    }

    /// All positions from `start` to `end` inclusive, walking every gene
    /// of the strain in order
    pub fn positions_between(
        start: &GenePosition,
        end: &GenePosition,
    ) -> Result<Vec<GenePosition>, FactsError> {
        Self::positions_between_in(start, end, &GeneKind::ALL)
    }

    /// Like [`GenePosition::positions_between`], restricted to genes whose
    /// kind is listed in `include`
    pub fn positions_between_in(
        start: &GenePosition,
        end: &GenePosition,
        include: &[GeneKind],
    ) -> Result<Vec<GenePosition>, FactsError> {
        let strain = start.gene.strain();
        if strain != end.gene.strain() {
            return Err(FactsError::CrossStrainComparison {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let mut positions = Vec::new();
        for gene in strain.genes() {
            if gene < start.gene || gene > end.gene || !include.contains(&gene.kind()) {
                continue;
            }
            let first = if gene == start.gene { start.position } else { 1 };
            let last = if gene == end.gene {
                end.position
            } else {
                gene.length()
            };
            positions.extend(gene.positions_between(first, last));
        }
        Ok(positions)
    }
}

impl fmt::Display for GenePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.gene, self.position)
    }
}

impl FromStr for GenePosition {
    type Err = FactsError;

    /// Parse `HIV1RT:215`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (gene, pos) = s.trim().split_once(':').ok_or_else(|| {
            FactsError::notation(
                s,
                0,
                "expected GENE:POSITION",
                crate::error::ErrorCode::InvalidNotation,
            )
        })?;
        let gene: Gene = gene.parse()?;
        let pos: u32 = pos.parse().map_err(|_| {
            FactsError::notation(
                s,
                gene.name().len() + 1,
                "position is not a number",
                crate::error::ErrorCode::InvalidNotation,
            )
        })?;
        gene.position(pos)
    }
}

/// A contiguous run of positions in one gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeneRegion {
    gene: Gene,
    start: u32,
    end: u32,
}

impl GeneRegion {
    pub fn new(gene: Gene, start: u32, end: u32) -> Self {
        Self {
            gene,
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn gene(&self) -> Gene {
        self.gene
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of positions covered; zero when `end` precedes `start`
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start) as usize
    }

    /// [`GeneRegion::new`] orders its bounds, but a deserialized region
    /// may arrive inverted and cover nothing
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, pos: &GenePosition) -> bool {
        pos.gene == self.gene && (self.start..=self.end).contains(&pos.position)
    }

    /// Collapse positions into maximal contiguous regions
    ///
    /// Positions are sorted and deduplicated first.
    pub fn from_positions<'a, I>(positions: I) -> Vec<GeneRegion>
    where
        I: IntoIterator<Item = &'a GenePosition>,
    {
        let mut sorted: Vec<GenePosition> = positions.into_iter().copied().collect();
        sorted.sort();
        sorted.dedup();

        let mut regions: Vec<GeneRegion> = Vec::new();
        for gp in sorted {
            match regions.last_mut() {
                Some(last) if last.gene == gp.gene && last.end + 1 == gp.position => {
                    last.end = gp.position;
                }
                _ => regions.push(GeneRegion::new(gp.gene, gp.position, gp.position)),
            }
        }
        regions
    }

    /// Render regions as `RT 41-48; RT 60`
    pub fn join(regions: &[GeneRegion]) -> String {
        regions
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for GeneRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{} {}", self.gene.abstract_name(), self.start)
        } else {
            write!(f, "{} {}-{}", self.gene.abstract_name(), self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::Strain;

    fn gp(s: &str) -> GenePosition {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_and_parse() {
        let pos = gp("HIV1RT:215");
        assert_eq!(pos.to_string(), "HIV1RT:215");
        assert_eq!(pos.position(), 215);
        assert_eq!(pos.gene().name(), "HIV1RT");
        assert!("HIV1RT:561".parse::<GenePosition>().is_err());
        assert!("HIV1RT".parse::<GenePosition>().is_err());
        assert!("HIV1RT:abc".parse::<GenePosition>().is_err());
    }

    #[test]
    fn test_pol_position() {
        assert_eq!(gp("HIV1PR:1").pol_position(), 1);
        assert_eq!(gp("HIV1RT:1").pol_position(), 100);
        assert_eq!(gp("HIV1IN:1").pol_position(), 660);
        assert_eq!(gp("HIV2AIN:1").pol_position(), 659);
    }

    #[test]
    fn test_ordering() {
        assert!(gp("HIV1PR:99") < gp("HIV1RT:1"));
        assert!(gp("HIV1RT:5") < gp("HIV1RT:6"));
        assert!(gp("HIV1IN:288") < gp("HIV2APR:1"));
    }

    #[test]
    fn test_positions_between_across_genes() {
        let positions = GenePosition::positions_between(&gp("HIV1PR:97"), &gp("HIV1RT:2")).unwrap();
        let text: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            text,
            vec!["HIV1PR:97", "HIV1PR:98", "HIV1PR:99", "HIV1RT:1", "HIV1RT:2"]
        );
    }

    #[test]
    fn test_positions_between_cross_strain() {
        let err = GenePosition::positions_between(&gp("HIV1PR:1"), &gp("HIV2APR:2")).unwrap_err();
        assert!(matches!(err, FactsError::CrossStrainComparison { .. }));
    }

    #[test]
    fn test_positions_between_reversed_is_empty() {
        let positions = GenePosition::positions_between(&gp("HIV1RT:2"), &gp("HIV1PR:97")).unwrap();
        assert!(positions.is_empty());
    }

    #[test]
    fn test_positions_between_in_skips_genes() {
        let positions = GenePosition::positions_between_in(
            &gp("HIV1PR:99"),
            &gp("HIV1IN:1"),
            &[GeneKind::PR, GeneKind::IN],
        )
        .unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[1].to_string(), "HIV1IN:1");
    }

    #[test]
    fn test_regions_from_positions() {
        let rt = Gene::new(Strain::Hiv1, GeneKind::RT);
        let pr = Gene::new(Strain::Hiv1, GeneKind::PR);
        let positions = vec![
            GenePosition::new(rt, 43),
            GenePosition::new(rt, 41),
            GenePosition::new(rt, 42),
            GenePosition::new(rt, 60),
            GenePosition::new(pr, 10),
        ];
        let regions = GeneRegion::from_positions(&positions);
        assert_eq!(regions.len(), 3);
        assert_eq!(GeneRegion::join(&regions), "PR 10; RT 41-43; RT 60");
        assert_eq!(regions[1].len(), 3);
        assert!(regions[1].contains(&GenePosition::new(rt, 42)));
        assert!(!regions[1].contains(&GenePosition::new(pr, 42)));
    }

    #[test]
    fn test_region_len_and_is_empty() {
        let rt = Gene::new(Strain::Hiv1, GeneKind::RT);
        let single = GeneRegion::new(rt, 60, 60);
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
        let swapped = GeneRegion::new(rt, 48, 41);
        assert_eq!((swapped.start(), swapped.end()), (41, 48));
        assert_eq!(swapped.len(), 8);

        let inverted: GeneRegion = serde_json::from_str(
            r#"{"gene": {"strain": "HIV1", "kind": "RT"}, "start": 50, "end": 40}"#,
        )
        .unwrap();
        assert!(inverted.is_empty());
        assert_eq!(inverted.len(), 0);
        assert!(!inverted.contains(&GenePosition::new(rt, 45)));
    }
}

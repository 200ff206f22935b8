//! Table sources and the memoizing table registry

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{CacheStats, MemoCache};
use crate::config::FactsConfig;
use crate::error::FactsError;
use crate::gene::Strain;
use crate::tables::{
    AminoAcidPercents, ApobecMutations, CodonPercents, DrugResistanceMutations, ReferenceTables,
};

/// Trait for providing raw table resources
///
/// Implementations might include:
/// - DirectorySource for a local data checkout
/// - MemorySource for tests and embedded data
pub trait TableSource: Send + Sync {
    /// Read the resource `name` (e.g. `drms_hiv1.json`) as text
    ///
    /// A resource that does not exist fails with `ResourceNotFound`.
    fn read(&self, name: &str) -> Result<String, FactsError>;

    /// Check if a resource exists
    fn has_resource(&self, name: &str) -> bool {
        self.read(name).is_ok()
    }
}

/// Resources as files under a root directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TableSource for DirectorySource {
    fn read(&self, name: &str) -> Result<String, FactsError> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FactsError::ResourceNotFound {
                name: name.to_string(),
            },
            _ => FactsError::from(e),
        })
    }

    fn has_resource(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }
}

/// In-memory resources keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    resources: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the source
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.resources.insert(name.into(), content.into());
    }

    /// Builder form of [`MemorySource::add`]
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.add(name, content);
        self
    }
}

impl MemorySource {
    /// A small HIV-1 table set covering a handful of well-known positions
    ///
    /// Tabled positions: PR 30, 90; RT 41, 65, 100-110, 103, 184, 215;
    /// IN 148. DRMs sit at PR 30, 90, RT 41, 65, 103, 184, 215 and IN 148.
    pub fn with_test_data() -> Self {
        Self::new()
            .with(names::aa_percents("all", "All"), test_data::AA_PERCENTS)
            .with(names::codon_percents("all", "All"), test_data::CODON_PERCENTS)
            .with(names::apobecs(Strain::Hiv1), test_data::APOBECS)
            .with(names::apobec_drms(Strain::Hiv1), test_data::APOBEC_DRMS)
            .with(names::drms(Strain::Hiv1), test_data::DRMS)
            .with(names::sdrms(Strain::Hiv1), test_data::SDRMS)
    }
}

mod test_data {
    pub const AA_PERCENTS: &str = r#"[
        {"gene": "PR", "position": 30, "aa": "D", "percent": 0.995, "count": 995, "total": 1000, "isUnusual": false},
        {"gene": "PR", "position": 30, "aa": "N", "percent": 0.004, "count": 4, "total": 1000, "isUnusual": false},
        {"gene": "PR", "position": 90, "aa": "L", "percent": 0.97, "count": 970, "total": 1000, "isUnusual": false},
        {"gene": "PR", "position": 90, "aa": "M", "percent": 0.03, "count": 30, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 41, "aa": "M", "percent": 0.9, "count": 900, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 41, "aa": "L", "percent": 0.1, "count": 100, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 65, "aa": "K", "percent": 0.98, "count": 980, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 65, "aa": "R", "percent": 0.02, "count": 20, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 100, "aa": "L", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 101, "aa": "K", "percent": 0.97, "count": 970, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 102, "aa": "K", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 103, "aa": "K", "percent": 0.95, "count": 950, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 103, "aa": "N", "percent": 0.05, "count": 50, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 104, "aa": "K", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 105, "aa": "S", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 106, "aa": "V", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 107, "aa": "T", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 108, "aa": "V", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 109, "aa": "L", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 110, "aa": "D", "percent": 0.99, "count": 990, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 110, "aa": "W", "percent": 0.0001, "count": 0, "total": 1000, "reason": "PCNT", "isUnusual": true},
        {"gene": "RT", "position": 184, "aa": "M", "percent": 0.9, "count": 900, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 184, "aa": "V", "percent": 0.09, "count": 90, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 184, "aa": "I", "percent": 0.01, "count": 10, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 215, "aa": "T", "percent": 0.9, "count": 900, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 215, "aa": "Y", "percent": 0.06, "count": 60, "total": 1000, "isUnusual": false},
        {"gene": "RT", "position": 215, "aa": "F", "percent": 0.04, "count": 40, "total": 1000, "isUnusual": false},
        {"gene": "IN", "position": 148, "aa": "Q", "percent": 0.98, "count": 980, "total": 1000, "isUnusual": false},
        {"gene": "IN", "position": 148, "aa": "H", "percent": 0.01, "count": 10, "total": 1000, "isUnusual": false},
        {"gene": "IN", "position": 148, "aa": "R", "percent": 0.01, "count": 10, "total": 1000, "isUnusual": false}
    ]"#;

    pub const CODON_PERCENTS: &str = r#"[
        {"gene": "RT", "position": 184, "codon": "ATG", "aa": "M", "percent": 0.9, "count": 900, "total": 1000},
        {"gene": "RT", "position": 184, "codon": "GTG", "aa": "V", "percent": 0.09, "count": 90, "total": 1000},
        {"gene": "RT", "position": 184, "codon": "ATA", "aa": "I", "percent": 0.01, "count": 10, "total": 1000}
    ]"#;

    pub const APOBECS: &str = r#"[
        {"gene": "PR", "position": 25, "aa": "N"},
        {"gene": "RT", "position": 42, "aa": "K"},
        {"gene": "RT", "position": 28, "aa": "K"},
        {"gene": "RT", "position": 44, "aa": "K"},
        {"gene": "RT", "position": 56, "aa": "K"},
        {"gene": "RT", "position": 60, "aa": "K"},
        {"gene": "RT", "position": 184, "aa": "I"},
        {"gene": "IN", "position": 140, "aa": "S"}
    ]"#;

    pub const APOBEC_DRMS: &str = r#"[
        {"gene": "RT", "position": 184, "aa": "I"}
    ]"#;

    pub const DRMS: &str = r#"{
        "PI": [
            {"gene": "PR", "position": 30, "aas": "N"},
            {"gene": "PR", "position": 90, "aas": "M"}
        ],
        "NRTI": [
            {"gene": "RT", "position": 41, "aas": "L"},
            {"gene": "RT", "position": 65, "aas": "R"},
            {"gene": "RT", "position": 184, "aas": "IV"},
            {"gene": "RT", "position": 215, "aas": "FY"}
        ],
        "NNRTI": [
            {"gene": "RT", "position": 103, "aas": "NS"}
        ],
        "INSTI": [
            {"gene": "IN", "position": 148, "aas": "HKR"}
        ]
    }"#;

    pub const SDRMS: &str = r#"{
        "NRTI": [
            {"gene": "RT", "position": 184, "aas": "IV"}
        ],
        "NNRTI": [
            {"gene": "RT", "position": 103, "aas": "N"}
        ]
    }"#;
}

impl TableSource for MemorySource {
    fn read(&self, name: &str) -> Result<String, FactsError> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| FactsError::ResourceNotFound {
                name: name.to_string(),
            })
    }

    fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }
}

/// Resource names for each table kind
///
/// The percent tables carry no strain in their names. A strain whose
/// percent tables differ from HIV-1's needs its own source, see
/// [`TableRegistry::with_strain_source`].
pub mod names {
    use crate::gene::Strain;

    pub fn aa_percents(treatment: &str, subtype: &str) -> String {
        format!("aapcnt/rx-{}_subtype-{}.json", treatment, subtype)
    }

    pub fn codon_percents(treatment: &str, subtype: &str) -> String {
        format!("codonpcnt/rx-{}_subtype-{}.json", treatment, subtype)
    }

    pub fn apobecs(strain: Strain) -> String {
        match strain {
            Strain::Hiv1 => "apobecs/apobecs.json".to_string(),
            _ => format!("apobecs/apobecs_{}.json", strain.resource_suffix()),
        }
    }

    pub fn apobec_drms(strain: Strain) -> String {
        match strain {
            Strain::Hiv1 => "apobecs/apobec_drms.json".to_string(),
            _ => format!("apobecs/apobec_drms_{}.json", strain.resource_suffix()),
        }
    }

    pub fn drms(strain: Strain) -> String {
        format!("drms_{}.json", strain.resource_suffix())
    }

    pub fn sdrms(strain: Strain) -> String {
        format!("sdrms_{}.json", strain.resource_suffix())
    }
}

type PercentKey = (Strain, String, String);

/// Parses each table at most once and hands out shared references
///
/// Concurrent first requests for the same table share a single parse.
/// Tables of a strain are read from that strain's source when one was
/// registered, else from the default source.
pub struct TableRegistry {
    source: Box<dyn TableSource>,
    strain_sources: HashMap<Strain, Box<dyn TableSource>>,
    aa_percents: MemoCache<PercentKey, AminoAcidPercents>,
    codon_percents: MemoCache<PercentKey, CodonPercents>,
    apobecs: MemoCache<Strain, ApobecMutations>,
    drms: MemoCache<Strain, DrugResistanceMutations>,
    sdrms: MemoCache<Strain, DrugResistanceMutations>,
}

impl TableRegistry {
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            strain_sources: HashMap::new(),
            aa_percents: MemoCache::new(),
            codon_percents: MemoCache::new(),
            apobecs: MemoCache::new(),
            drms: MemoCache::new(),
            sdrms: MemoCache::new(),
        }
    }

    /// Read every table of `strain` from `source` instead of the default
    pub fn with_strain_source(
        mut self,
        strain: Strain,
        source: impl TableSource + 'static,
    ) -> Self {
        self.strain_sources.insert(strain, Box::new(source));
        self
    }

    /// Registry over the configured table directories, if one is set
    ///
    /// `tables.hiv2_dir` serves both HIV-2 groups.
    pub fn from_config(config: &FactsConfig) -> Option<Self> {
        let tables = &config.tables;
        let registry = Self::new(DirectorySource::new(tables.dir.as_ref()?));
        Some(match &tables.hiv2_dir {
            Some(dir) => registry
                .with_strain_source(Strain::Hiv2a, DirectorySource::new(dir))
                .with_strain_source(Strain::Hiv2b, DirectorySource::new(dir)),
            None => registry,
        })
    }

    fn source_for(&self, strain: Strain) -> &dyn TableSource {
        self.strain_sources
            .get(&strain)
            .map_or(self.source.as_ref(), |source| source.as_ref())
    }

    fn read(&self, strain: Strain, name: &str) -> Result<String, FactsError> {
        log::debug!("Loading table resource {} for {}", name, strain);
        self.source_for(strain).read(name)
    }

    pub fn aa_percents(
        &self,
        strain: Strain,
        treatment: &str,
        subtype: &str,
    ) -> Result<Arc<AminoAcidPercents>, FactsError> {
        let key = (strain, treatment.to_string(), subtype.to_string());
        self.aa_percents.get_or_try_build(&key, || {
            log::trace!("Building amino-acid percents for {} {}/{}", strain, treatment, subtype);
            let json = self.read(strain, &names::aa_percents(treatment, subtype))?;
            AminoAcidPercents::from_json(strain, &json)
        })
    }

    pub fn codon_percents(
        &self,
        strain: Strain,
        treatment: &str,
        subtype: &str,
    ) -> Result<Arc<CodonPercents>, FactsError> {
        let key = (strain, treatment.to_string(), subtype.to_string());
        self.codon_percents.get_or_try_build(&key, || {
            log::trace!("Building codon percents for {} {}/{}", strain, treatment, subtype);
            let json = self.read(strain, &names::codon_percents(treatment, subtype))?;
            CodonPercents::from_json(strain, &json)
        })
    }

    pub fn apobecs(&self, strain: Strain) -> Result<Arc<ApobecMutations>, FactsError> {
        self.apobecs.get_or_try_build(&strain, || {
            log::trace!("Building APOBEC tables for {}", strain);
            let apobecs = self.read(strain, &names::apobecs(strain))?;
            let apobec_drms = self.read(strain, &names::apobec_drms(strain))?;
            ApobecMutations::from_json(strain, &apobecs, &apobec_drms)
        })
    }

    pub fn drms(&self, strain: Strain) -> Result<Arc<DrugResistanceMutations>, FactsError> {
        self.drms.get_or_try_build(&strain, || {
            log::trace!("Building DRM table for {}", strain);
            let json = self.read(strain, &names::drms(strain))?;
            DrugResistanceMutations::from_json(strain, &json)
        })
    }

    pub fn sdrms(&self, strain: Strain) -> Result<Arc<DrugResistanceMutations>, FactsError> {
        self.sdrms.get_or_try_build(&strain, || {
            log::trace!("Building SDRM table for {}", strain);
            let json = self.read(strain, &names::sdrms(strain))?;
            DrugResistanceMutations::from_json(strain, &json)
        })
    }

    /// Every table for one strain, treatment and subtype
    pub fn reference_tables(
        &self,
        strain: Strain,
        treatment: &str,
        subtype: &str,
    ) -> Result<ReferenceTables, FactsError> {
        Ok(ReferenceTables {
            strain,
            aa_percents: self.aa_percents(strain, treatment, subtype)?,
            codon_percents: self.codon_percents(strain, treatment, subtype)?,
            apobecs: self.apobecs(strain)?,
            drms: self.drms(strain)?,
            sdrms: self.sdrms(strain)?,
        })
    }

    /// Tables named by the `[tables]` section of `config`
    pub fn configured_tables(&self, config: &FactsConfig) -> Result<ReferenceTables, FactsError> {
        let tables = &config.tables;
        self.reference_tables(tables.strain, &tables.treatment, &tables.subtype)
    }

    /// Drop every parsed table
    pub fn clear(&self) {
        self.aa_percents.clear();
        self.codon_percents.clear();
        self.apobecs.clear();
        self.drms.clear();
        self.sdrms.clear();
    }

    /// Combined statistics over all table caches
    pub fn stats(&self) -> CacheStats {
        [
            self.aa_percents.stats(),
            self.codon_percents.stats(),
            self.apobecs.stats(),
            self.drms.stats(),
            self.sdrms.stats(),
        ]
        .into_iter()
        .fold(CacheStats::default(), |acc, s| CacheStats {
            hits: acc.hits + s.hits,
            misses: acc.misses + s.misses,
            builds: acc.builds + s.builds,
            size: acc.size + s.size,
            capacity: 0,
            evictions: 0,
        })
    }
}

impl fmt::Debug for TableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRegistry")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{Gene, GeneKind};

    fn source() -> MemorySource {
        MemorySource::new()
            .with(
                "aapcnt/rx-all_subtype-All.json",
                r#"[{"gene": "RT", "position": 184, "aa": "M", "percent": 0.95,
                     "count": 95, "total": 100, "reason": "", "isUnusual": false}]"#,
            )
            .with(
                "codonpcnt/rx-all_subtype-All.json",
                r#"[{"gene": "RT", "position": 184, "codon": "ATG", "aa": "M",
                     "percent": 0.95, "count": 95, "total": 100}]"#,
            )
            .with("apobecs/apobecs.json", r#"[{"gene": "RT", "position": 41, "aa": "I"}]"#)
            .with("apobecs/apobec_drms.json", "[]")
            .with("drms_hiv1.json", r#"{"NRTI": [{"gene": "RT", "position": 184, "aas": "IV"}]}"#)
            .with("sdrms_hiv1.json", r#"{"NRTI": [{"gene": "RT", "position": 184, "aa": "V"}]}"#)
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(names::aa_percents("art", "C"), "aapcnt/rx-art_subtype-C.json");
        assert_eq!(names::codon_percents("all", "B"), "codonpcnt/rx-all_subtype-B.json");
        assert_eq!(names::apobecs(Strain::Hiv1), "apobecs/apobecs.json");
        assert_eq!(names::apobec_drms(Strain::Hiv1), "apobecs/apobec_drms.json");
        assert_eq!(names::drms(Strain::Hiv1), "drms_hiv1.json");
        assert_eq!(names::sdrms(Strain::Hiv1), "sdrms_hiv1.json");
    }

    #[test]
    fn test_hiv2_groups_share_resource_names() {
        for strain in [Strain::Hiv2a, Strain::Hiv2b] {
            assert_eq!(names::drms(strain), "drms_hiv2.json");
            assert_eq!(names::sdrms(strain), "sdrms_hiv2.json");
            assert_eq!(names::apobecs(strain), "apobecs/apobecs_hiv2.json");
            assert_eq!(names::apobec_drms(strain), "apobecs/apobec_drms_hiv2.json");
        }
    }

    #[test]
    fn test_strain_source() {
        let hiv2 = MemorySource::new()
            .with(
                names::aa_percents("all", "All"),
                r#"[{"gene": "RT", "position": 65, "aa": "K", "percent": 1.0,
                     "count": 10, "total": 10, "isUnusual": false}]"#,
            )
            .with(
                names::drms(Strain::Hiv2a),
                r#"{"NRTI": [{"gene": "RT", "position": 65, "aas": "R"}]}"#,
            );
        let registry = TableRegistry::new(source()).with_strain_source(Strain::Hiv2a, hiv2);

        let hiv1_pcnt = registry.aa_percents(Strain::Hiv1, "all", "All").unwrap();
        assert!(hiv1_pcnt.is_tabled(Gene::new(Strain::Hiv1, GeneKind::RT), 184));
        let hiv2_pcnt = registry.aa_percents(Strain::Hiv2a, "all", "All").unwrap();
        assert!(hiv2_pcnt.is_tabled(Gene::new(Strain::Hiv2a, GeneKind::RT), 65));
        assert!(!hiv2_pcnt.is_tabled(Gene::new(Strain::Hiv2a, GeneKind::RT), 184));
        assert_eq!(registry.drms(Strain::Hiv2a).unwrap().all().len(), 1);

        // HIV-2B has no source of its own
        let hiv2b = registry.aa_percents(Strain::Hiv2b, "all", "All").unwrap();
        assert!(hiv2b.is_tabled(Gene::new(Strain::Hiv2b, GeneKind::RT), 184));
        assert!(registry.drms(Strain::Hiv2b).is_err());
    }

    #[test]
    fn test_missing_resource() {
        let registry = TableRegistry::new(source());
        let err = registry.aa_percents(Strain::Hiv1, "rx", "E").unwrap_err();
        assert_eq!(err.to_string(), "Invalid resource name (aapcnt/rx-rx_subtype-E.json)");
        assert!(registry.drms(Strain::Hiv2a).is_err());
    }

    #[test]
    fn test_tables_built_once() {
        let registry = TableRegistry::new(source());
        let a = registry.reference_tables(Strain::Hiv1, "all", "All").unwrap();
        let b = registry.reference_tables(Strain::Hiv1, "all", "All").unwrap();
        assert!(Arc::ptr_eq(&a.drms, &b.drms));
        assert!(Arc::ptr_eq(&a.aa_percents, &b.aa_percents));
        let stats = registry.stats();
        assert_eq!(stats.builds, 5);
        assert_eq!(stats.hits, 5);
        assert_eq!(stats.size, 5);

        registry.clear();
        assert_eq!(registry.stats().size, 0);
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("apobecs")).unwrap();
        fs::write(dir.path().join("apobecs/apobecs.json"), "[]").unwrap();
        let src = DirectorySource::new(dir.path());
        assert!(src.has_resource("apobecs/apobecs.json"));
        assert_eq!(src.read("apobecs/apobecs.json").unwrap(), "[]");
        assert!(matches!(
            src.read("drms_hiv1.json"),
            Err(FactsError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_with_test_data() {
        let registry = TableRegistry::new(MemorySource::with_test_data());
        let tables = registry.reference_tables(Strain::Hiv1, "all", "All").unwrap();
        assert_eq!(tables.drms.drug_classes().count(), 4);
        assert_eq!(tables.sdrms.all().len(), 2);
        assert_eq!(tables.apobecs.apobecs().len(), 8);
        assert!(tables.aa_percents.is_tabled(Gene::new(Strain::Hiv1, GeneKind::RT), 105));
    }

    #[test]
    fn test_from_config() {
        assert!(TableRegistry::from_config(&FactsConfig::default()).is_none());
        let mut config = FactsConfig::default();
        config.tables.dir = Some(PathBuf::from("/nonexistent"));
        let registry = TableRegistry::from_config(&config).unwrap();
        assert!(matches!(
            registry.configured_tables(&config),
            Err(FactsError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_from_config_hiv2_dir() {
        let hiv1 = tempfile::tempdir().unwrap();
        let hiv2 = tempfile::tempdir().unwrap();
        fs::write(hiv1.path().join("drms_hiv1.json"), "{}").unwrap();
        fs::write(
            hiv2.path().join("drms_hiv2.json"),
            r#"{"NRTI": [{"gene": "RT", "position": 65, "aas": "R"}]}"#,
        )
        .unwrap();
        let mut config = FactsConfig::default();
        config.tables.dir = Some(hiv1.path().to_path_buf());
        config.tables.hiv2_dir = Some(hiv2.path().to_path_buf());
        let registry = TableRegistry::from_config(&config).unwrap();
        assert!(registry.drms(Strain::Hiv1).is_ok());
        assert_eq!(registry.drms(Strain::Hiv2a).unwrap().all().len(), 1);
        assert_eq!(registry.drms(Strain::Hiv2b).unwrap().all().len(), 1);
    }
}

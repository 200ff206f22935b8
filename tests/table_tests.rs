//! Loading reference tables from a data directory named in a config file

use std::fs;
use std::path::Path;

use hivfacts::tables::registry::names;
use hivfacts::tables::{DirectorySource, MemorySource, TableRegistry, TableSource};
use hivfacts::validation::MutationsValidator;
use hivfacts::{parse_mutation, parse_mutation_set, FactsConfig, FactsError, Strain, Validator};

/// Write the bundled test tables as files under `root`, named for `strain`
fn write_tables_for(root: &Path, strain: Strain) {
    let memory = MemorySource::with_test_data();
    let named = |name: fn(Strain) -> String| (name(strain), name(Strain::Hiv1));
    for (name, hiv1_name) in [
        (names::aa_percents("all", "All"), names::aa_percents("all", "All")),
        (names::codon_percents("all", "All"), names::codon_percents("all", "All")),
        named(names::apobecs),
        named(names::apobec_drms),
        named(names::drms),
        named(names::sdrms),
    ] {
        let path = root.join(&name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, memory.read(&hiv1_name).unwrap()).unwrap();
    }
}

fn write_tables(root: &Path) {
    write_tables_for(root, Strain::Hiv1);
}

#[test]
fn test_directory_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path());

    let registry = TableRegistry::new(DirectorySource::new(dir.path()));
    let tables = registry.reference_tables(Strain::Hiv1, "all", "All").unwrap();
    assert!(tables.is_drm(&parse_mutation("RT:M184V", None).unwrap()));
    assert!(tables.is_sdrm(&parse_mutation("RT:K103N", None).unwrap()));
    assert!(!tables.is_drm(&parse_mutation("RT:M184L", None).unwrap()));
    assert!(tables.is_apobec_drm(&parse_mutation("RT:M184I", None).unwrap()));
    assert!(tables.is_unusual(&parse_mutation("RT:L110W", None).unwrap()));
}

#[test]
fn test_tables_shared_between_requests() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path());

    let registry = TableRegistry::new(DirectorySource::new(dir.path()));
    let first = registry.drms(Strain::Hiv1).unwrap();
    let second = registry.drms(Strain::Hiv1).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(registry.stats().builds, 1);
}

#[test]
fn test_missing_table() {
    let dir = tempfile::tempdir().unwrap();
    let registry = TableRegistry::new(DirectorySource::new(dir.path()));
    match registry.drms(Strain::Hiv1) {
        Err(FactsError::ResourceNotFound { name }) => assert_eq!(name, "drms_hiv1.json"),
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_config_driven_validation() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    write_tables(&data);
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[tables]\ndir = {:?}\nstrain = \"HIV1\"\n\n[validation]\ngenes = [\"RT\"]\n",
            data.display().to_string()
        ),
    )
    .unwrap();

    let config = FactsConfig::load_from_path(&config_path).unwrap();
    let registry = TableRegistry::from_config(&config).unwrap();
    let tables = registry.configured_tables(&config).unwrap();
    let validator = MutationsValidator::new(tables);

    let mutations = parse_mutation_set(Some("RT:300* PR:50*"), None).unwrap();
    let results = validator.validate(&mutations, &config.validation.genes);
    assert_eq!(results.len(), 1);
    assert!(results[0].text().contains("RT"));
}

#[test]
fn test_hiv2_tables_from_own_directory() {
    let dir = tempfile::tempdir().unwrap();
    let hiv1 = dir.path().join("hiv1");
    let hiv2 = dir.path().join("hiv2");
    write_tables(&hiv1);
    write_tables_for(&hiv2, Strain::Hiv2a);
    assert!(hiv2.join("drms_hiv2.json").is_file());
    assert!(hiv2.join("apobecs/apobecs_hiv2.json").is_file());

    let mut config = FactsConfig::default();
    config.tables.dir = Some(hiv1);
    config.tables.hiv2_dir = Some(hiv2);
    let registry = TableRegistry::from_config(&config).unwrap();
    for strain in [Strain::Hiv1, Strain::Hiv2a, Strain::Hiv2b] {
        let tables = registry.reference_tables(strain, "all", "All").unwrap();
        assert_eq!(tables.strain, strain);
        assert_eq!(tables.drms.all().len(), 8);
    }
}

// Copyright (c) 2025 The hivfacts authors
// SPDX-License-Identifier: MIT

//! hivfacts: HIV gene facts, mutation notation and sequence validation
//!
//! Coordinates and references for the HIV-1 and HIV-2 protease, reverse
//! transcriptase and integrase genes, a mutation notation parser, set
//! algebra over mutations, reference tables for classifying them and the
//! quality-control rules run over mutation lists, aligned sequences and
//! deep-sequencing reads.
//!
//! # Example
//!
//! ```
//! use hivfacts::tables::{MemorySource, TableRegistry};
//! use hivfacts::validation::{MutationsValidator, Validator};
//! use hivfacts::{parse_mutation_set, GeneKind, Strain};
//!
//! // Parse a mutation list
//! let mutations = parse_mutation_set(Some("RT:M41L, RT:300*"), None).unwrap();
//!
//! // Load the reference tables once and share them
//! let registry = TableRegistry::new(MemorySource::with_test_data());
//! let tables = registry.reference_tables(Strain::Hiv1, "all", "All").unwrap();
//!
//! // Validate
//! let validator = MutationsValidator::new(tables);
//! for result in validator.validate(&mutations, &GeneKind::ALL) {
//!     println!("{}", result);
//! }
//! ```

pub mod alignment;
pub mod cache;
pub mod config;
pub mod drug;
pub mod error;
pub mod gene;
pub mod mutation;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod position;
pub mod tables;
pub mod validation;

// Re-export commonly used types
pub use config::FactsConfig;
pub use drug::{Drug, DrugClass};
pub use error::{ErrorCode, FactsError};
pub use gene::{Gene, GeneKind, Strain};
pub use mutation::{
    parse_mutation, parse_mutation_in, parse_mutation_list, parse_mutation_set, AminoAcid,
    Mutation, MutationSet,
};
pub use position::{GenePosition, GeneRegion};
pub use tables::{ReferenceTables, TableRegistry};
pub use validation::{ValidationLevel, ValidationMessage, ValidationResult, Validator};

/// Result type alias for hivfacts operations
pub type Result<T> = std::result::Result<T, FactsError>;

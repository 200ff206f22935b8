//! Mutations, mutation sets and mutation notation
//!
//! # Example
//!
//! ```
//! use hivfacts::mutation::parse_mutation_set;
//!
//! let set = parse_mutation_set(Some("RT:M41L, RT:T215Y; RT:M184VI"), None).unwrap();
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.split().len(), 4);
//! ```

pub mod aa;
pub mod model;
pub mod parser;
pub mod set;

pub use aa::AminoAcid;
pub use model::{normalize_aas, Mutation, MutationFlavor};
pub use parser::{
    parse_mutation, parse_mutation_as, parse_mutation_in, parse_mutation_list,
    parse_mutation_set, split_mutation_tokens, ASI_MARKER,
};
pub use set::{group_list_by_gene, join_mutations, MutationSet};

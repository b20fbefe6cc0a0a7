//! The CloudFormation schema corpus.
//!
//! - [`refresh`] downloads AWS's schema bundle, trims each document down to
//!   what a template author needs and writes it as YAML into the corpus
//!   directory.
//! - [`index`] reads that directory back into a name → file map and answers
//!   fuzzy lookups ("s3 bucket" → `AWS::S3::Bucket`).

pub mod error;
pub mod fuzzy;
pub mod index;
pub mod normalize;
pub mod refresh;

pub use error::SchemaError;
pub use index::{
    LoadReport, SchemaEntry, SchemaIndex, SchemaIndexHandle, SchemaLookup, SkippedDocument,
};
pub use refresh::{CorpusRefresher, RefreshReport};

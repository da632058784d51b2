//! # irlab core
//!
//! Platform-independent library for running information-retrieval experiments:
//! scoring a fixed collection with several ranking models, writing TREC-style
//! run files, and comparing the resulting rankings.
//!
//! ## Modules
//!
//! - [`scoring`] - Probabilistic ranking models (DFR family, BM25, Dirichlet LM, MATF)
//! - [`index`] - Index and analyzer collaborator traits plus an in-memory index
//! - [`search`] - Query/track loading, searcher, run files, explanations, batch orchestrator
//! - [`comparison`] - Similarity/divergence metrics between two ranked lists
//! - [`evaluation`] - Effectiveness score tables, paired statistics, significance verdicts
//! - [`config`] - Production constants and the experiment configuration file
//! - [`error`] - Error types shared across the crate

pub mod comparison;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod index;
pub mod scoring;
pub mod search;

#[cfg(test)]
pub(crate) mod test_utils;

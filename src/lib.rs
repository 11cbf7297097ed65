//! Mglda: Multi-grain latent Dirichlet allocation in pure Rust.
//!
//! Mglda fits the multi-grain topic model of Titov & McDonald (2008) to a
//! corpus of sentence-segmented documents using collapsed Gibbs sampling.
//! Every token carries a three-part latent assignment: a sliding-window
//! offset binding it to a nearby sentence "panel", a granularity (global
//! or local), and a topic index within that granularity. Global topics
//! capture document-wide themes; local topics capture what a small
//! neighborhood of sentences is about.
//!
//! # Quick Start
//!
//! ```
//! use mglda::prelude::*;
//!
//! // Two tiny documents over a 6-word vocabulary.
//! let corpus = Corpus::new(
//!     vec![
//!         Document::new(vec![
//!             Sentence::new(vec![0, 1, 2]),
//!             Sentence::new(vec![2, 3]),
//!         ]),
//!         Document::new(vec![Sentence::new(vec![4, 5, 0])]),
//!     ],
//!     6,
//! )
//! .unwrap();
//!
//! let config = MgldaConfig {
//!     global_topics: 2,
//!     local_topics: 2,
//!     window: 2,
//!     ..MgldaConfig::default()
//! };
//!
//! let mut model = MultiGrainLda::new(config, corpus).unwrap();
//! model.fit(5);
//!
//! let (phi_global, _phi_local) = model.word_distributions();
//! assert_eq!(phi_global.shape(), (2, 6));
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Dense row-major matrix used for the count tables
//! - [`corpus`]: Immutable corpus model (documents, sentences, word ids)
//! - [`model`]: The sampler, sufficient statistics, and topic-word estimator
//! - [`error`]: Crate error type

pub mod corpus;
pub mod error;
pub mod model;
pub mod prelude;
pub mod primitives;

pub use corpus::{Corpus, Document, Sentence};
pub use error::{MgldaError, Result};
pub use model::{
    Assignment, IterationReport, MgldaConfig, MultiGrainLda, TopWord, Topic, TopicSummary,
    PHI_SMOOTHING, TOP_WORD_LIMIT,
};
pub use primitives::Matrix;

//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use mglda::prelude::*;
//! ```

pub use crate::corpus::{Corpus, Document, Sentence};
pub use crate::error::{MgldaError, Result};
pub use crate::model::{
    Assignment, IterationReport, MgldaConfig, MultiGrainLda, TopWord, Topic, TopicSummary,
};
pub use crate::primitives::Matrix;

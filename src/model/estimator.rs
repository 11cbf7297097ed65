//! Topic-word distribution estimator and per-iteration reporting.
//!
//! Smooths the final corpus-wide count tables into row-normalized
//! probability distributions and extracts the top words per topic.

use serde::{Deserialize, Serialize};

use crate::error::{MgldaError, Result};
use crate::model::counts::CorpusCounts;
use crate::model::MgldaConfig;
use crate::primitives::Matrix;

/// Number of top words reported per topic.
pub const TOP_WORD_LIMIT: usize = 20;

/// Additive (Laplace) smoothing constant for the topic-word estimator.
pub const PHI_SMOOTHING: f64 = 1.0;

/// One word in a topic's top-N list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopWord {
    /// The vocabulary entry.
    pub word: String,
    /// Smoothed probability of the word under the topic.
    pub probability: f64,
    /// Raw observed count of the (topic, word) pair.
    pub count: usize,
}

/// Per-topic summary: observed token mass and top words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Topic index within its granularity.
    pub topic: usize,
    /// Observed tokens currently assigned to the topic.
    pub token_count: usize,
    /// Top words in descending probability order.
    pub words: Vec<TopWord>,
}

/// The estimator output handed to the reporting consumer once per iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationReport {
    /// Summaries for the global topics, in topic order.
    pub global: Vec<TopicSummary>,
    /// Summaries for the local topics, in topic order.
    pub local: Vec<TopicSummary>,
}

/// Smooths and normalizes one count table into a distribution matrix.
///
/// Row `z` is `(counts[z][.] + PHI_SMOOTHING) / (total[z] + W * PHI_SMOOTHING)`,
/// so each row sums to exactly 1.
fn smooth_rows(counts: &Matrix<f64>, totals: &[f64]) -> Matrix<f64> {
    let (topics, vocab) = counts.shape();
    let mut phi = Matrix::zeros(topics, vocab);
    for z in 0..topics {
        let denom = totals[z] + vocab as f64 * PHI_SMOOTHING;
        for w in 0..vocab {
            phi.set(z, w, (counts.get(z, w) + PHI_SMOOTHING) / denom);
        }
    }
    phi
}

/// Computes `(phi_global, phi_local)` from the corpus-wide tables.
pub(crate) fn word_distributions(tables: &CorpusCounts) -> (Matrix<f64>, Matrix<f64>) {
    (
        smooth_rows(&tables.n_gl_zw, &tables.n_gl_z),
        smooth_rows(&tables.n_loc_zw, &tables.n_loc_z),
    )
}

/// Returns word indices ranked by probability descending, truncated to
/// `limit`. Ties break toward the lower word id for determinism.
#[must_use]
pub fn top_indices(row: &[f64], limit: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..row.len()).collect();
    indices.sort_by(|&a, &b| {
        row[b]
            .partial_cmp(&row[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    indices.truncate(limit);
    indices
}

fn summarize(
    phi: &Matrix<f64>,
    counts: &Matrix<f64>,
    totals: &[f64],
    vocabulary: &[String],
) -> Vec<TopicSummary> {
    (0..phi.n_rows())
        .map(|z| {
            let row = phi.row(z);
            let words = top_indices(row, TOP_WORD_LIMIT)
                .into_iter()
                .map(|w| TopWord {
                    word: vocabulary[w].clone(),
                    probability: row[w],
                    count: counts.get(z, w) as usize,
                })
                .collect();
            TopicSummary {
                topic: z,
                token_count: totals[z] as usize,
                words,
            }
        })
        .collect()
}

/// Builds the per-iteration report from the corpus-wide tables.
///
/// Observed counts are read off the maintained tables, which by the
/// count-consistency invariant equal a fresh rescan of the latent state.
pub(crate) fn build_report(
    tables: &CorpusCounts,
    config: &MgldaConfig,
    vocab_size: usize,
    vocabulary: &[String],
) -> Result<IterationReport> {
    if vocabulary.len() != vocab_size {
        return Err(MgldaError::DimensionMismatch {
            expected: format!("vocabulary of {vocab_size} words"),
            actual: vocabulary.len().to_string(),
        });
    }
    debug_assert_eq!(tables.n_gl_z.len(), config.global_topics);
    debug_assert_eq!(tables.n_loc_z.len(), config.local_topics);

    let (phi_global, phi_local) = word_distributions(tables);
    Ok(IterationReport {
        global: summarize(&phi_global, &tables.n_gl_zw, &tables.n_gl_z, vocabulary),
        local: summarize(&phi_local, &tables.n_loc_zw, &tables.n_loc_z, vocabulary),
    })
}

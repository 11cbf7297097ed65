//! Latent assignments and the sufficient-statistics count tables.
//!
//! The tables split along the ownership boundary the sampler needs:
//! [`CorpusCounts`] is shared by every document task and lives behind a
//! lock; [`DocState`] is owned exclusively by one document's task and
//! needs no synchronization.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::corpus::Document;
use crate::model::MgldaConfig;
use crate::primitives::Matrix;

/// Which topic vocabulary a token draws from, with the topic index.
///
/// Global topics are shared corpus-wide; local topics belong to the
/// sliding-window panel the token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topic {
    /// Document-global topic, index in `[0, global_topics)`.
    Global(usize),
    /// Panel-local topic, index in `[0, local_topics)`.
    Local(usize),
}

/// The per-token latent state: a window offset and a granular topic.
///
/// The token's governing panel is sentence `s + window` of its document,
/// where `s` is the token's own sentence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Sliding-window offset `v` in `[0, window)`.
    pub window: usize,
    /// Granularity and topic index.
    pub topic: Topic,
}

impl Assignment {
    /// Draws a uniformly random assignment: offset uniform over the
    /// window, a fair coin for granularity, topic uniform in range.
    pub(crate) fn random(config: &MgldaConfig, rng: &mut StdRng) -> Self {
        let window = rng.gen_range(0..config.window);
        let topic = if rng.gen_bool(0.5) {
            Topic::Global(rng.gen_range(0..config.global_topics))
        } else {
            Topic::Local(rng.gen_range(0..config.local_topics))
        };
        Self { window, topic }
    }
}

/// Corpus-wide count tables, written by every document's task.
///
/// Field names follow the usual collapsed-Gibbs notation: `n_gl_zw[z][w]`
/// counts tokens of word `w` assigned to global topic `z`, `n_gl_z[z]`
/// is its row total, and the `loc` pair is the local-topic mirror.
#[derive(Debug, Clone)]
pub(crate) struct CorpusCounts {
    pub n_gl_zw: Matrix<f64>,
    pub n_gl_z: Vec<f64>,
    pub n_loc_zw: Matrix<f64>,
    pub n_loc_z: Vec<f64>,
}

impl CorpusCounts {
    pub(crate) fn new(config: &MgldaConfig, vocab_size: usize) -> Self {
        Self {
            n_gl_zw: Matrix::zeros(config.global_topics, vocab_size),
            n_gl_z: vec![0.0; config.global_topics],
            n_loc_zw: Matrix::zeros(config.local_topics, vocab_size),
            n_loc_z: vec![0.0; config.local_topics],
        }
    }
}

/// Per-document latent state and count tables, owned by one task.
///
/// Panel arrays are indexed by `p = s + v` and sized
/// `n_sentences + window` so the largest reachable panel index,
/// `(n_sentences - 1) + (window - 1)`, is always in range.
#[derive(Debug, Clone)]
pub(crate) struct DocState {
    /// One assignment per token, `assignments[s][w]`.
    pub assignments: Vec<Vec<Assignment>>,
    /// Per-global-topic token counts for this document.
    pub n_d_gl_z: Vec<f64>,
    /// Total global-granularity tokens in this document.
    pub n_d_gl: f64,
    /// Per-panel global / local / combined token counts.
    pub n_dv_gl: Vec<f64>,
    pub n_dv_loc: Vec<f64>,
    pub n_dv: Vec<f64>,
    /// Per-panel local-topic counts (panels x local_topics).
    pub n_dv_loc_z: Matrix<f64>,
    /// Per-sentence window-offset counts, `n_ds_v[s][v]`.
    pub n_ds_v: Vec<Vec<f64>>,
    /// Per-sentence token totals.
    pub n_ds: Vec<f64>,
}

impl DocState {
    /// Builds the initial latent state for one document, drawing a random
    /// assignment per token and accumulating every count table to match.
    pub(crate) fn init(
        doc: &Document,
        config: &MgldaConfig,
        shared: &mut CorpusCounts,
        rng: &mut StdRng,
    ) -> Self {
        let n_sentences = doc.n_sentences();
        let panels = n_sentences + config.window;

        let mut state = Self {
            assignments: Vec::with_capacity(n_sentences),
            n_d_gl_z: vec![0.0; config.global_topics],
            n_d_gl: 0.0,
            n_dv_gl: vec![0.0; panels],
            n_dv_loc: vec![0.0; panels],
            n_dv: vec![0.0; panels],
            n_dv_loc_z: Matrix::zeros(panels, config.local_topics),
            n_ds_v: vec![vec![0.0; config.window]; n_sentences],
            n_ds: vec![0.0; n_sentences],
        };

        for (s, sentence) in doc.sentences.iter().enumerate() {
            let mut row = Vec::with_capacity(sentence.len());
            for &word in &sentence.words {
                let assignment = Assignment::random(config, rng);
                state.apply(shared, s, word, assignment, 1.0);
                row.push(assignment);
            }
            state.assignments.push(row);
        }

        state
    }

    /// Adds `delta` to every table entry implied by one token's assignment.
    ///
    /// Called with `+1.0` at construction and on commit, `-1.0` on
    /// retract; the two must touch exactly the same entries so the
    /// count-consistency invariant survives every resampling step.
    pub(crate) fn apply(
        &mut self,
        shared: &mut CorpusCounts,
        s: usize,
        word: usize,
        assignment: Assignment,
        delta: f64,
    ) {
        let panel = s + assignment.window;
        match assignment.topic {
            Topic::Global(z) => {
                shared.n_gl_zw.add_at(z, word, delta);
                shared.n_gl_z[z] += delta;
                self.n_dv_gl[panel] += delta;
                self.n_d_gl_z[z] += delta;
                self.n_d_gl += delta;
            }
            Topic::Local(z) => {
                shared.n_loc_zw.add_at(z, word, delta);
                shared.n_loc_z[z] += delta;
                self.n_dv_loc[panel] += delta;
                self.n_dv_loc_z.add_at(panel, z, delta);
            }
        }
        self.n_ds_v[s][assignment.window] += delta;
        self.n_ds[s] += delta;
        self.n_dv[panel] += delta;
    }

    /// Total tokens currently assigned in this document, by the
    /// per-sentence totals.
    #[cfg(test)]
    pub(crate) fn total_tokens(&self) -> f64 {
        self.n_ds.iter().sum()
    }
}

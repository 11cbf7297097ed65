//! The collapsed-Gibbs resampling sweep.
//!
//! One sweep visits every token of a document in sentence/position
//! order and runs the four-step cycle: retract the token's counts,
//! score every candidate `(offset, granularity, topic)` triple,
//! draw one candidate proportionally to its weight, and commit the
//! new assignment. Corpus-wide tables are guarded by a `RwLock`:
//! retract and commit each take one write guard, candidate scoring
//! takes a single read guard.

use std::sync::RwLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::corpus::Document;
use crate::model::counts::{Assignment, CorpusCounts, DocState, Topic};
use crate::model::MgldaConfig;

/// Derives the RNG stream for one document within one sweep.
///
/// Streams depend only on (seed, sweep, doc), never on scheduling, so a
/// serial run is exactly reproducible under a fixed seed.
pub(crate) fn doc_rng(seed: u64, sweep: u64, doc: usize) -> StdRng {
    let stream = seed
        ^ sweep.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (doc as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    StdRng::seed_from_u64(stream)
}

/// Resamples every token of one document once.
pub(crate) fn sweep_document(
    doc: &Document,
    state: &mut DocState,
    shared: &RwLock<CorpusCounts>,
    config: &MgldaConfig,
    vocab_size: usize,
    rng: &mut StdRng,
) {
    let n_candidates = config.window * (config.global_topics + config.local_topics);
    let mut candidates: Vec<(Assignment, f64)> = Vec::with_capacity(n_candidates);

    for (s, sentence) in doc.sentences.iter().enumerate() {
        for (w, &word) in sentence.words.iter().enumerate() {
            let current = state.assignments[s][w];

            {
                let mut tables = shared.write().expect("corpus count table lock poisoned");
                state.apply(&mut tables, s, word, current, -1.0);
            }

            candidates.clear();
            {
                let tables = shared.read().expect("corpus count table lock poisoned");
                score_candidates(&tables, state, config, vocab_size, s, word, &mut candidates);
            }

            let next = candidates[draw_weighted(&candidates, rng)].0;

            {
                let mut tables = shared.write().expect("corpus count table lock poisoned");
                state.apply(&mut tables, s, word, next, 1.0);
            }
            state.assignments[s][w] = next;
        }
    }
}

/// Computes the unnormalized weight of every candidate triple for one
/// token with its own counts already retracted.
///
/// Each weight is the product of four smoothed count ratios: how well
/// the topic explains the word, how popular the offset is in this
/// sentence, how strongly the panel favors the granularity, and how
/// prominent the topic is within its region (document for global,
/// panel for local).
fn score_candidates(
    tables: &CorpusCounts,
    state: &DocState,
    config: &MgldaConfig,
    vocab_size: usize,
    s: usize,
    word: usize,
    candidates: &mut Vec<(Assignment, f64)>,
) {
    let w = vocab_size as f64;
    let mix_denom_base = config.global_alpha_mix + config.local_alpha_mix;

    for v in 0..config.window {
        let panel = s + v;
        let offset_term = (state.n_ds_v[s][v] + config.gamma)
            / (state.n_ds[s] + config.window as f64 * config.gamma);
        let mix_denom = state.n_dv[panel] + mix_denom_base;

        for z in 0..config.global_topics {
            let word_term = (tables.n_gl_zw.get(z, word) + config.global_beta)
                / (tables.n_gl_z[z] + w * config.global_beta);
            let mix_term = (state.n_dv_gl[panel] + config.global_alpha) / mix_denom;
            let region_term = (state.n_d_gl_z[z] + config.global_alpha)
                / (state.n_d_gl + config.global_topics as f64 * config.global_alpha);
            candidates.push((
                Assignment {
                    window: v,
                    topic: Topic::Global(z),
                },
                word_term * offset_term * mix_term * region_term,
            ));
        }

        for z in 0..config.local_topics {
            let word_term = (tables.n_loc_zw.get(z, word) + config.local_beta)
                / (tables.n_loc_z[z] + w * config.local_beta);
            let mix_term = (state.n_dv_loc[panel] + config.local_alpha_mix) / mix_denom;
            let region_term = (state.n_dv_loc_z.get(panel, z) + config.local_alpha)
                / (state.n_dv_loc[panel] + config.local_topics as f64 * config.local_alpha);
            candidates.push((
                Assignment {
                    window: v,
                    topic: Topic::Local(z),
                },
                word_term * offset_term * mix_term * region_term,
            ));
        }
    }
}

/// Draws one candidate index with probability proportional to its weight.
///
/// The weight sum is strictly positive whenever every hyperparameter is
/// strictly positive, which construction enforces.
pub(crate) fn draw_weighted<R: Rng>(candidates: &[(Assignment, f64)], rng: &mut R) -> usize {
    let total: f64 = candidates.iter().map(|(_, weight)| weight).sum();
    let mut target = rng.gen::<f64>() * total;
    for (i, (_, weight)) in candidates.iter().enumerate() {
        target -= weight;
        if target < 0.0 {
            return i;
        }
    }
    candidates.len() - 1
}

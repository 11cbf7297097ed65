//! Multi-grain LDA model: configuration, sufficient statistics,
//! Gibbs sampler, and topic-word estimator.
//!
//! The model couples two topic vocabularies. Global topics are mixed
//! per document; local topics are mixed per "panel", a virtual context
//! a token reaches through a sliding window over nearby sentences.
//! Inference is collapsed Gibbs sampling over the per-token
//! `(offset, granularity, topic)` triples, with the continuous model
//! parameters integrated out into smoothed count ratios.

use std::sync::RwLock;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::{MgldaError, Result};
use crate::primitives::Matrix;

mod counts;
mod estimator;
mod sampler;

pub use counts::{Assignment, Topic};
pub use estimator::{
    top_indices, IterationReport, TopWord, TopicSummary, PHI_SMOOTHING, TOP_WORD_LIMIT,
};

use counts::{CorpusCounts, DocState};

/// Fixed run configuration: topic counts, window radius, hyperparameters.
///
/// Defaults mirror the common review-mining setup: 60 global topics,
/// 30 local topics, a window of 3 sentences, and 0.1 for every
/// Dirichlet hyperparameter.
///
/// # Examples
///
/// ```
/// use mglda::MgldaConfig;
///
/// let config = MgldaConfig {
///     global_topics: 4,
///     local_topics: 2,
///     ..MgldaConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MgldaConfig {
    /// Number of global topics `K_g`.
    pub global_topics: usize,
    /// Number of local topics `K_l`.
    pub local_topics: usize,
    /// Window radius `T`: candidate offsets per token.
    pub window: usize,
    /// Dirichlet prior on per-sentence window-offset choice.
    pub gamma: f64,
    /// Dirichlet prior on the document-wide global topic mixture.
    pub global_alpha: f64,
    /// Dirichlet prior on each panel's local topic mixture.
    pub local_alpha: f64,
    /// Granularity-mix pseudo-count for the global branch.
    pub global_alpha_mix: f64,
    /// Granularity-mix pseudo-count for the local branch.
    pub local_alpha_mix: f64,
    /// Dirichlet prior on global topic-word distributions.
    pub global_beta: f64,
    /// Dirichlet prior on local topic-word distributions.
    pub local_beta: f64,
    /// Random seed for initialization and sampling.
    pub seed: u64,
    /// Run document sweeps on the rayon pool. Serial runs are exactly
    /// reproducible under a fixed seed; parallel runs interleave the
    /// shared tables in scheduling order.
    pub parallel: bool,
}

impl Default for MgldaConfig {
    fn default() -> Self {
        Self {
            global_topics: 60,
            local_topics: 30,
            window: 3,
            gamma: 0.1,
            global_alpha: 0.1,
            local_alpha: 0.1,
            global_alpha_mix: 0.1,
            local_alpha_mix: 0.1,
            global_beta: 0.1,
            local_beta: 0.1,
            seed: 42,
            parallel: true,
        }
    }
}

impl MgldaConfig {
    /// Validates the configuration.
    ///
    /// Topic counts and the window radius must be at least 1, and every
    /// hyperparameter strictly positive. Strict positivity rules out a
    /// zero candidate-weight sum during sampling by invariant.
    ///
    /// # Errors
    ///
    /// Returns [`MgldaError::InvalidHyperparameter`] naming the first
    /// offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.global_topics == 0 {
            return Err(MgldaError::invalid_hyperparameter(
                "global_topics",
                self.global_topics,
                ">= 1",
            ));
        }
        if self.local_topics == 0 {
            return Err(MgldaError::invalid_hyperparameter(
                "local_topics",
                self.local_topics,
                ">= 1",
            ));
        }
        if self.window == 0 {
            return Err(MgldaError::invalid_hyperparameter(
                "window",
                self.window,
                ">= 1",
            ));
        }
        for (param, value) in [
            ("gamma", self.gamma),
            ("global_alpha", self.global_alpha),
            ("local_alpha", self.local_alpha),
            ("global_alpha_mix", self.global_alpha_mix),
            ("local_alpha_mix", self.local_alpha_mix),
            ("global_beta", self.global_beta),
            ("local_beta", self.local_beta),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MgldaError::invalid_hyperparameter(param, value, "> 0"));
            }
        }
        Ok(())
    }
}

/// Multi-grain LDA fitted by collapsed Gibbs sampling.
///
/// Construction assigns every token a uniformly random latent triple
/// and builds count tables consistent with it; [`fit`](Self::fit) and
/// [`learn`](Self::learn) then mutate both in place, one sweep per
/// iteration.
///
/// # Examples
///
/// ```
/// use mglda::prelude::*;
///
/// let corpus = Corpus::new(
///     vec![Document::new(vec![
///         Sentence::new(vec![0, 1, 2, 0]),
///         Sentence::new(vec![3, 1]),
///     ])],
///     4,
/// )
/// .unwrap();
/// let config = MgldaConfig {
///     global_topics: 3,
///     local_topics: 2,
///     window: 2,
///     ..MgldaConfig::default()
/// };
///
/// let mut model = MultiGrainLda::new(config, corpus).unwrap();
/// model.fit(10);
/// assert_eq!(model.sweeps_run(), 10);
/// ```
#[derive(Debug)]
pub struct MultiGrainLda {
    config: MgldaConfig,
    corpus: Corpus,
    shared: RwLock<CorpusCounts>,
    doc_states: Vec<DocState>,
    sweeps_run: usize,
}

impl MultiGrainLda {
    /// Creates the model and initializes the latent state.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails
    /// [`MgldaConfig::validate`].
    pub fn new(config: MgldaConfig, corpus: Corpus) -> Result<Self> {
        config.validate()?;

        let mut shared = CorpusCounts::new(&config, corpus.vocab_size());
        let mut rng = StdRng::seed_from_u64(config.seed);
        let doc_states = corpus
            .docs()
            .iter()
            .map(|doc| DocState::init(doc, &config, &mut shared, &mut rng))
            .collect();

        Ok(Self {
            config,
            corpus,
            shared: RwLock::new(shared),
            doc_states,
            sweeps_run: 0,
        })
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &MgldaConfig {
        &self.config
    }

    /// The corpus the model was built over.
    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Number of completed sampling sweeps.
    #[must_use]
    pub fn sweeps_run(&self) -> usize {
        self.sweeps_run
    }

    /// Runs one full sampling sweep: every token of every document is
    /// resampled once. One task per document when `config.parallel`.
    pub fn sweep(&mut self) {
        let sweep = self.sweeps_run as u64;
        let config = &self.config;
        let shared = &self.shared;
        let vocab_size = self.corpus.vocab_size();
        let docs = self.corpus.docs();

        if config.parallel {
            self.doc_states
                .par_iter_mut()
                .enumerate()
                .for_each(|(d, state)| {
                    let mut rng = sampler::doc_rng(config.seed, sweep, d);
                    sampler::sweep_document(&docs[d], state, shared, config, vocab_size, &mut rng);
                });
        } else {
            for (d, state) in self.doc_states.iter_mut().enumerate() {
                let mut rng = sampler::doc_rng(config.seed, sweep, d);
                sampler::sweep_document(&docs[d], state, shared, config, vocab_size, &mut rng);
            }
        }

        self.sweeps_run += 1;
    }

    /// Runs `iterations` sampling sweeps without reporting.
    pub fn fit(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.sweep();
        }
    }

    /// Runs `iterations` sweeps, invoking `on_iteration` with the
    /// estimator's report after each one.
    ///
    /// The callback is the reporting seam: serialization, file writing,
    /// and console mirroring all live on the caller's side of it.
    ///
    /// # Errors
    ///
    /// Returns an error if `vocabulary` length doesn't match the corpus
    /// vocabulary size.
    ///
    /// # Examples
    ///
    /// ```
    /// use mglda::prelude::*;
    ///
    /// let corpus = Corpus::new(
    ///     vec![Document::new(vec![Sentence::new(vec![0, 1, 1])])],
    ///     2,
    /// )
    /// .unwrap();
    /// let config = MgldaConfig {
    ///     global_topics: 2,
    ///     local_topics: 2,
    ///     window: 1,
    ///     ..MgldaConfig::default()
    /// };
    /// let vocabulary = vec!["company".to_string(), "product".to_string()];
    ///
    /// let mut model = MultiGrainLda::new(config, corpus).unwrap();
    /// let mut reports = 0;
    /// model
    ///     .learn(3, &vocabulary, |_iteration, _report| reports += 1)
    ///     .unwrap();
    /// assert_eq!(reports, 3);
    /// ```
    pub fn learn<F>(
        &mut self,
        iterations: usize,
        vocabulary: &[String],
        mut on_iteration: F,
    ) -> Result<()>
    where
        F: FnMut(usize, &IterationReport),
    {
        for iteration in 0..iterations {
            self.sweep();
            let report = self.report(vocabulary)?;
            on_iteration(iteration, &report);
        }
        Ok(())
    }

    /// Builds the per-iteration report: per topic, the observed token
    /// count and the top-N words with smoothed probabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if `vocabulary` length doesn't match the corpus
    /// vocabulary size.
    pub fn report(&self, vocabulary: &[String]) -> Result<IterationReport> {
        let tables = self.shared.read().expect("corpus count table lock poisoned");
        estimator::build_report(&tables, &self.config, self.corpus.vocab_size(), vocabulary)
    }

    /// Smoothed, row-normalized topic-word distributions
    /// `(phi_global, phi_local)` derived from the current counts.
    #[must_use]
    pub fn word_distributions(&self) -> (Matrix<f64>, Matrix<f64>) {
        let tables = self.shared.read().expect("corpus count table lock poisoned");
        estimator::word_distributions(&tables)
    }

    /// Observed token counts per (global, local) topic.
    #[must_use]
    pub fn topic_token_counts(&self) -> (Vec<usize>, Vec<usize>) {
        let tables = self.shared.read().expect("corpus count table lock poisoned");
        (
            tables.n_gl_z.iter().map(|&n| n as usize).collect(),
            tables.n_loc_z.iter().map(|&n| n as usize).collect(),
        )
    }

    /// The latent assignments of one document, `[sentence][position]`.
    ///
    /// # Panics
    ///
    /// Panics if `doc` is out of range.
    #[must_use]
    pub fn assignments(&self, doc: usize) -> &[Vec<Assignment>] {
        &self.doc_states[doc].assignments
    }

    #[cfg(test)]
    pub(crate) fn counts(&self) -> std::sync::RwLockReadGuard<'_, CorpusCounts> {
        self.shared.read().expect("corpus count table lock poisoned")
    }

    #[cfg(test)]
    pub(crate) fn doc_states(&self) -> &[DocState] {
        &self.doc_states
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
#[path = "sampler_proptests.rs"]
mod sampler_proptests;

use super::sampler::draw_weighted;
use super::*;
use crate::corpus::{Corpus, Document, Sentence};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Review-style fixture: one document, six sentences, 29-word vocabulary.
fn review_corpus() -> Corpus {
    Corpus::new(
        vec![Document::new(vec![
            Sentence::new(vec![0, 1, 2, 3, 4, 5]),
            Sentence::new(vec![
                6, 7, 8, 2, 3, 9, 8, 2, 3, 5, 10, 1, 11, 0, 12, 4, 13, 14, 15, 16,
            ]),
            Sentence::new(vec![17, 2, 0, 18, 19, 15, 20, 21, 22, 23]),
            Sentence::new(vec![22, 24, 25]),
            Sentence::new(vec![26]),
            Sentence::new(vec![27, 28, 1]),
        ])],
        29,
    )
    .expect("corpus should succeed")
}

fn review_vocabulary() -> Vec<String> {
    [
        "company", "money", "email", "telling", "product", "shipped", "week", "half", "received",
        "item", "finally", "back", "buy", "wo", "work", "phone", "depicts", "numerous", "ca",
        "find", "number", "website", "kind", "response", "customer", "service", "problem",
        "advice", "waste",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn small_config() -> MgldaConfig {
    MgldaConfig {
        global_topics: 4,
        local_topics: 2,
        window: 3,
        parallel: false,
        ..MgldaConfig::default()
    }
}

fn assert_counts_consistent(model: &MultiGrainLda) {
    let tables = model.counts();
    for z in 0..tables.n_gl_z.len() {
        assert_eq!(
            tables.n_gl_zw.row_sum(z),
            tables.n_gl_z[z],
            "global topic {z} row sum diverged from maintained total"
        );
    }
    for z in 0..tables.n_loc_z.len() {
        assert_eq!(
            tables.n_loc_zw.row_sum(z),
            tables.n_loc_z[z],
            "local topic {z} row sum diverged from maintained total"
        );
    }
}

fn assert_tokens_conserved(model: &MultiGrainLda) {
    let tables = model.counts();
    let global: f64 = tables.n_gl_z.iter().sum();
    let local: f64 = tables.n_loc_z.iter().sum();
    assert_eq!(
        global + local,
        model.corpus().total_tokens() as f64,
        "global + local token mass must equal corpus token count"
    );
    for state in model.doc_states() {
        let per_doc_global: f64 = state.n_d_gl_z.iter().sum();
        assert_eq!(per_doc_global, state.n_d_gl);
    }
}

#[test]
fn test_config_zero_global_topics_rejected() {
    let config = MgldaConfig {
        global_topics: 0,
        ..MgldaConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("global_topics"));
}

#[test]
fn test_config_zero_window_rejected() {
    let config = MgldaConfig {
        window: 0,
        ..MgldaConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("window"));
}

#[test]
fn test_config_nonpositive_hyperparameters_rejected() {
    for field in ["gamma", "global_beta", "local_alpha_mix"] {
        let mut config = MgldaConfig::default();
        match field {
            "gamma" => config.gamma = 0.0,
            "global_beta" => config.global_beta = -0.1,
            _ => config.local_alpha_mix = f64::NAN,
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(field), "expected error for {field}");
    }
}

#[test]
fn test_new_rejects_bad_config() {
    let config = MgldaConfig {
        local_topics: 0,
        ..MgldaConfig::default()
    };
    assert!(MultiGrainLda::new(config, review_corpus()).is_err());
}

#[test]
fn test_counts_consistent_after_construction() {
    let model = MultiGrainLda::new(small_config(), review_corpus()).expect("model");
    assert_counts_consistent(&model);
    assert_tokens_conserved(&model);
}

#[test]
fn test_counts_consistent_after_sweeps() {
    let mut model = MultiGrainLda::new(small_config(), review_corpus()).expect("model");
    for _ in 0..5 {
        model.sweep();
        assert_counts_consistent(&model);
        assert_tokens_conserved(&model);
    }
    assert_eq!(model.sweeps_run(), 5);
}

#[test]
fn test_doc_state_token_totals() {
    let model = MultiGrainLda::new(small_config(), review_corpus()).expect("model");
    let expected = model.corpus().docs()[0].n_tokens() as f64;
    assert_eq!(model.doc_states()[0].total_tokens(), expected);
}

#[test]
fn test_phi_rows_normalized() {
    let mut model = MultiGrainLda::new(small_config(), review_corpus()).expect("model");
    model.fit(3);
    let (phi_global, phi_local) = model.word_distributions();
    for z in 0..phi_global.n_rows() {
        assert!((phi_global.row_sum(z) - 1.0).abs() < 1e-9);
    }
    for z in 0..phi_local.n_rows() {
        assert!((phi_local.row_sum(z) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_top_indices_fixtures() {
    assert_eq!(top_indices(&[3.0, 7.0, 8.0], 2), vec![2, 1]);
    assert_eq!(top_indices(&[8.0, 11.0, 2.0, 19.0], 2), vec![3, 1]);
    assert_eq!(top_indices(&[], 2), Vec::<usize>::new());
    assert_eq!(top_indices(&[1.0], 20), vec![0]);
}

#[test]
fn test_top_indices_ties_break_by_word_id() {
    assert_eq!(top_indices(&[5.0, 9.0, 5.0, 9.0], 4), vec![1, 3, 0, 2]);
}

#[test]
fn test_draw_weighted_is_proportional_not_uniform() {
    // One candidate holds all of the mass; a uniform draw over the
    // candidate set would pick the others three times out of four.
    let candidates: Vec<(Assignment, f64)> = (0..4)
        .map(|z| {
            (
                Assignment {
                    window: 0,
                    topic: Topic::Global(z),
                },
                if z == 2 { 1.0 } else { 0.0 },
            )
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        assert_eq!(draw_weighted(&candidates, &mut rng), 2);
    }
}

#[test]
fn test_draw_weighted_respects_relative_mass() {
    let candidates: Vec<(Assignment, f64)> = [1.0, 9.0]
        .iter()
        .enumerate()
        .map(|(z, &weight)| {
            (
                Assignment {
                    window: 0,
                    topic: Topic::Local(z),
                },
                weight,
            )
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(11);
    let draws = 2000;
    let heavy = (0..draws)
        .filter(|_| draw_weighted(&candidates, &mut rng) == 1)
        .count();
    let fraction = heavy as f64 / draws as f64;
    assert!(
        (fraction - 0.9).abs() < 0.05,
        "expected ~0.9 of draws on the heavy candidate, got {fraction}"
    );
}

#[test]
fn test_serial_runs_are_deterministic() {
    let config = small_config();
    let mut a = MultiGrainLda::new(config.clone(), review_corpus()).expect("model");
    let mut b = MultiGrainLda::new(config, review_corpus()).expect("model");
    a.fit(10);
    b.fit(10);

    assert_eq!(a.assignments(0), b.assignments(0));
    let vocabulary = review_vocabulary();
    assert_eq!(
        a.report(&vocabulary).expect("report"),
        b.report(&vocabulary).expect("report")
    );
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = MultiGrainLda::new(small_config(), review_corpus()).expect("model");
    let mut b = MultiGrainLda::new(
        MgldaConfig {
            seed: 1234,
            ..small_config()
        },
        review_corpus(),
    )
    .expect("model");
    a.fit(3);
    b.fit(3);
    assert_ne!(a.assignments(0), b.assignments(0));
}

#[test]
fn test_panel_capacity_boundary() {
    // Window equal to the sentence count puts the largest reachable
    // panel index at (n_sentences - 1) + (window - 1); 100 sweeps must
    // stay in range.
    let corpus = Corpus::new(
        vec![Document::new(vec![
            Sentence::new(vec![0, 1]),
            Sentence::new(vec![2, 0]),
            Sentence::new(vec![1, 2]),
        ])],
        3,
    )
    .expect("corpus");
    let config = MgldaConfig {
        global_topics: 2,
        local_topics: 2,
        window: 3,
        parallel: false,
        ..MgldaConfig::default()
    };
    let mut model = MultiGrainLda::new(config, corpus).expect("model");
    model.fit(100);
    assert_counts_consistent(&model);
    assert_tokens_conserved(&model);
}

#[test]
fn test_report_shape_and_counts() {
    let mut model = MultiGrainLda::new(small_config(), review_corpus()).expect("model");
    model.fit(2);
    let report = model.report(&review_vocabulary()).expect("report");

    assert_eq!(report.global.len(), 4);
    assert_eq!(report.local.len(), 2);

    let (global_counts, local_counts) = model.topic_token_counts();
    let reported: usize = report.global.iter().map(|t| t.token_count).sum::<usize>()
        + report.local.iter().map(|t| t.token_count).sum::<usize>();
    let maintained: usize =
        global_counts.iter().sum::<usize>() + local_counts.iter().sum::<usize>();
    assert_eq!(reported, maintained);
    assert_eq!(maintained, model.corpus().total_tokens());

    for summary in report.global.iter().chain(report.local.iter()) {
        assert!(summary.words.len() <= TOP_WORD_LIMIT);
        for pair in summary.words.windows(2) {
            assert!(pair[0].probability >= pair[1].probability);
        }
    }
}

#[test]
fn test_report_vocabulary_mismatch() {
    let model = MultiGrainLda::new(small_config(), review_corpus()).expect("model");
    let result = model.report(&["too".to_string(), "short".to_string()]);
    assert!(matches!(
        result,
        Err(crate::error::MgldaError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_parallel_sweep_preserves_invariants() {
    let config = MgldaConfig {
        parallel: true,
        ..small_config()
    };
    let corpus = Corpus::new(
        vec![
            Document::new(vec![Sentence::new(vec![0, 1, 2]), Sentence::new(vec![3, 4])]),
            Document::new(vec![Sentence::new(vec![2, 2, 0])]),
            Document::new(vec![Sentence::new(vec![4]), Sentence::new(vec![1, 3, 0])]),
        ],
        5,
    )
    .expect("corpus");
    let mut model = MultiGrainLda::new(config, corpus).expect("model");
    model.fit(20);
    assert_counts_consistent(&model);
    assert_tokens_conserved(&model);
}

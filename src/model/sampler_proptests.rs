use proptest::prelude::*;

use super::*;
use crate::corpus::{Corpus, Document, Sentence};

fn corpus_strategy() -> impl Strategy<Value = Corpus> {
    (2usize..8).prop_flat_map(|vocab| {
        let sentence = proptest::collection::vec(0..vocab, 0..6).prop_map(Sentence::new);
        let document = proptest::collection::vec(sentence, 1..4).prop_map(Document::new);
        proptest::collection::vec(document, 1..4)
            .prop_map(move |docs| Corpus::new(docs, vocab).expect("generated ids are in range"))
    })
}

fn check_invariants(model: &MultiGrainLda) {
    let tables = model.counts();
    for z in 0..tables.n_gl_z.len() {
        assert_eq!(tables.n_gl_zw.row_sum(z), tables.n_gl_z[z]);
    }
    for z in 0..tables.n_loc_z.len() {
        assert_eq!(tables.n_loc_zw.row_sum(z), tables.n_loc_z[z]);
    }
    let assigned: f64 =
        tables.n_gl_z.iter().sum::<f64>() + tables.n_loc_z.iter().sum::<f64>();
    assert_eq!(assigned, model.corpus().total_tokens() as f64);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Count rows stay consistent with their maintained totals, and no
    /// token is lost or duplicated, across random corpora and shapes.
    #[test]
    fn prop_invariants_survive_sweeps(
        corpus in corpus_strategy(),
        global_topics in 1_usize..4,
        local_topics in 1_usize..4,
        window in 1_usize..4,
        seed in any::<u64>(),
    ) {
        let config = MgldaConfig {
            global_topics,
            local_topics,
            window,
            seed,
            parallel: false,
            ..MgldaConfig::default()
        };
        let mut model = MultiGrainLda::new(config, corpus).expect("model");
        check_invariants(&model);
        for _ in 0..3 {
            model.sweep();
            check_invariants(&model);
        }
    }

    /// Same seed, same corpus: identical latent state after two sweeps.
    #[test]
    fn prop_serial_runs_reproduce(seed in any::<u64>()) {
        let corpus = || {
            Corpus::new(
                vec![Document::new(vec![
                    Sentence::new(vec![0, 1, 2]),
                    Sentence::new(vec![2, 0]),
                ])],
                3,
            )
            .expect("corpus")
        };
        let config = MgldaConfig {
            global_topics: 3,
            local_topics: 2,
            window: 2,
            seed,
            parallel: false,
            ..MgldaConfig::default()
        };
        let mut a = MultiGrainLda::new(config.clone(), corpus()).expect("model");
        let mut b = MultiGrainLda::new(config, corpus()).expect("model");
        a.fit(2);
        b.fit(2);
        prop_assert_eq!(a.assignments(0), b.assignments(0));
    }

    /// top_indices returns a descending, deduplicated prefix.
    #[test]
    fn prop_top_indices_sorted(
        row in proptest::collection::vec(0.0_f64..100.0, 0..20),
        limit in 0_usize..25,
    ) {
        let top = top_indices(&row, limit);
        prop_assert_eq!(top.len(), limit.min(row.len()));
        for pair in top.windows(2) {
            prop_assert!(row[pair[0]] >= row[pair[1]]);
        }
        let mut seen = top.clone();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), top.len());
    }
}

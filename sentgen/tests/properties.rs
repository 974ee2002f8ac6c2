//! Properties of the combinators, and the grammar round trip that fuzzes the fuzzer with itself.

use std::{collections::HashMap, str::FromStr};

use ebnfgram::ebnf::GrammarAST;
use proptest::prelude::*;
use sentgen::{
    every_combination, every_combination_many, every_labelling, BufferedIterable, CompiledGrammar,
};

/// Number of set partitions of `k` indexed positions into at most `m` blocks: at each position a
/// value may join one of the blocks already in use, or open a new one if any remain.
fn partition_count(k: usize, m: usize, used: usize) -> u64 {
    if k == 0 {
        return 1;
    }
    let mut n = used as u64 * partition_count(k - 1, m, used);
    if used < m {
        n += partition_count(k - 1, m, used + 1);
    }
    n
}

proptest! {
    /// The labellings of k positions over m symbols are in bijection with the set partitions of
    /// k with at most m blocks.
    #[test]
    fn prop_labelling_partition_count(m in 0usize..5, k in 0usize..8) {
        let alphabet = (0..m).collect::<Vec<_>>();
        let count = every_labelling(alphabet, k).count() as u64;
        prop_assert_eq!(count, partition_count(k, m, 0));
    }

    /// Every labelling is canonical (the j-th distinct symbol to appear is alphabet[j]) and no
    /// labelling repeats; the first is alphabet[0] at every position.
    #[test]
    fn prop_labellings_canonical_and_distinct(m in 1usize..5, k in 1usize..8) {
        let alphabet = (0..m).collect::<Vec<_>>();
        let all = every_labelling(alphabet, k).collect::<Vec<_>>();
        prop_assert_eq!(&all[0], &vec![0; k]);
        for labelling in &all {
            let mut next_fresh = 0;
            for &sym in labelling {
                prop_assert!(sym <= next_fresh, "non-canonical {:?}", labelling);
                if sym == next_fresh {
                    next_fresh += 1;
                }
            }
        }
        let mut dedup = all.clone();
        dedup.sort();
        dedup.dedup();
        prop_assert_eq!(dedup.len(), all.len());
    }

    /// The pair interleaver emits the full cross product, each pair exactly once, and fairly:
    /// the pair of the i-th and j-th values appears within (max(i, j) + 1)² outputs.
    #[test]
    fn prop_pair_interleaver_complete_and_fair(a_len in 0usize..8, b_len in 0usize..8) {
        let pairs = every_combination(0..a_len, 0..b_len).collect::<Vec<_>>();
        prop_assert_eq!(pairs.len(), a_len * b_len);
        let mut seen = HashMap::new();
        for (idx, pair) in pairs.iter().enumerate() {
            prop_assert!(seen.insert(*pair, idx).is_none(), "{:?} repeated", pair);
        }
        for i in 0..a_len {
            for j in 0..b_len {
                let bound = (i.max(j) + 1) * (i.max(j) + 1);
                prop_assert!(seen[&(i, j)] < bound);
            }
        }
    }

    /// The n-ary interleaver emits exactly the cross product of its streams.
    #[test]
    fn prop_many_counts(sizes in prop::collection::vec(0usize..5, 0..4)) {
        let streams = sizes
            .iter()
            .enumerate()
            .map(|(s, &len)| {
                Box::new((0..len).map(move |v| (s, v))) as Box<dyn Iterator<Item = (usize, usize)>>
            })
            .collect::<Vec<_>>();
        let tuples = every_combination_many(streams).collect::<Vec<_>>();
        let expected: usize = sizes.iter().product();
        prop_assert_eq!(tuples.len(), expected);
        let mut dedup = tuples.clone();
        dedup.sort();
        dedup.dedup();
        prop_assert_eq!(dedup.len(), tuples.len());
    }

    /// Replaying a buffered stream gives back the underlying sequence, every time.
    #[test]
    fn prop_buffered_replay(values: Vec<u16>) {
        let buf = BufferedIterable::new(values.clone().into_iter());
        prop_assert_eq!(&buf.iter().collect::<Vec<_>>(), &values);
        prop_assert_eq!(&buf.iter().collect::<Vec<_>>(), &values);
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(buf.get(i), Some(*v));
        }
        prop_assert_eq!(buf.get(values.len()), None);
    }
}

/// A grammar, in the dialect, whose language is grammar source text: rule names are a labelled
/// rule, so references and definitions corefer across each generated candidate.
const META_GRAMMAR: &str = r#"Language "meta":
grammar = 'Language "g": ' rules;
rules = rule | rule " " rules;
rule = name " = " production ";";
production = sequence | sequence " | " production;
sequence = term | term " " term;
term = atom | atom "*" | atom "+" | atom "?";
atom = '"x"' | '"y"' | name | "(" production ")";
name! = "a" | "b" | "c";
"#;

#[test]
fn round_trip_through_own_output() {
    let meta = GrammarAST::from_str(META_GRAMMAR).unwrap();
    let grm = CompiledGrammar::new(&meta).unwrap();
    let candidates = grm.sentences().take(2_000).collect::<Vec<_>>();

    let mut valid = 0usize;
    for candidate in &candidates {
        let ast = match GrammarAST::from_str(candidate) {
            Ok(ast) => ast,
            Err(_) => continue,
        };
        valid += 1;
        let printed = ast.to_string();
        let reprinted = GrammarAST::from_str(&printed).unwrap().to_string();
        assert_eq!(reprinted, printed, "printing not a fixed point for {:?}", candidate);
    }
    assert!(
        valid * 100 >= candidates.len() * 3,
        "only {}/{} candidates were valid grammars",
        valid,
        candidates.len()
    );
}

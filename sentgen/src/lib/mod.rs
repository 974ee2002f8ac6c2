//! Deterministic, fair enumeration of every sentence in the language of an EBNF-like grammar,
//! intended for building exhaustive, progressively-growing fuzzing corpora. The enumeration
//! interleaves depth and breadth: for every length bound N there is a finite index by which
//! every sentence of length at most N has been produced, even for infinite languages.
//!
//! ```
//! use std::str::FromStr;
//!
//! use ebnfgram::ebnf::GrammarAST;
//! use sentgen::CompiledGrammar;
//!
//! let ast = GrammarAST::from_str("Language \"demo\": foo = \"a\" | \"b\" foo;").unwrap();
//! let grm = CompiledGrammar::new(&ast).unwrap();
//! let first = grm.sentences().take(4).collect::<Vec<_>>();
//! assert_eq!(first, ["a", "ba", "bba", "bbba"]);
//! ```
//!
//! Everything is lazy and pull-based on a single thread: consumers simply stop pulling to stop
//! the enumeration, and the i-th sentence for a given grammar is byte-identical across runs and
//! platforms. The price of fairness is memory: interleaving buffers what it has seen, so a long
//! enumeration holds onto previous results.
//!
//! The building blocks — [every_combination], [every_combination_many], [every_labelling] and
//! [BufferedIterable] — are exposed for direct use.

mod buffer;
mod combine;
mod compile;
mod generate;
mod labelling;

pub use buffer::{BufferedIter, BufferedIterable};
pub use combine::{every_combination, every_combination_many, EveryCombination};
pub use compile::CompiledGrammar;
pub use generate::{Fragment, Sentences, Skeleton};
pub use labelling::{every_labelling, EveryLabelling};

//! A library for manipulating the EBNF-like grammars consumed by the sentence enumeration
//! engine. A note on the terminology we use, since EBNF's own now seems partially anachronistic:
//!
//!   * A rule is a mapping from a name to exactly one production; alternation lives inside the
//!     production as a choice.
//!   * A production is a literal, a rule reference, a sequence, a choice, or a postfix-operated
//!     (`*`, `+`, `?`) production. The empty production `ℇ` is the empty sequence.
//!   * A labelled rule (written `name!`) is one whose concrete tokens are interchangeable: only
//!     their coreference pattern across a sentence matters.
//!
//! ebnfgram makes the following guarantees about grammars it validates:
//!
//!   * Rules retain the order they were declared in; the first rule is the root production.
//!   * Every rule reference resolves to a declared rule.
//!   * Every rule can derive at least one finite sentence, so a generator pulling on the
//!     grammar's leftmost choices makes progress.
//!
//! For most uses, the entry points to investigate are [`ebnf::ASTWithValidityInfo::new`] (which
//! always returns an AST together with everything wrong with it) and `GrammarAST`'s `FromStr`
//! impl (which fails on the first error).

pub mod ebnf;
mod newlinecache;
mod span;

pub use newlinecache::NewlineCache;
pub use span::Span;

use vob::Vob;

use super::{
    ast::{GrammarAST, Production, UnaryOp},
    parser::{GrammarError, GrammarErrorKind},
};

/// Check that every rule can derive at least one finite sentence.
///
/// A rule that cannot bottom out (`start = start;`, `start = "a" start;`, or a mutual cycle with
/// no escape) would make the round-robin spin on its first pull without ever yielding, so such
/// grammars are rejected up front. A sequence needs every element to bottom out; a choice needs
/// some alternative to; `X*` and `X?` bottom out trivially (both can match ℇ); `X+` bottoms out
/// iff `X` does.
///
/// This is only about the existence of a terminating derivation, not about the order the
/// generator explores alternatives in: a rule whose recursive alternative is tried before its
/// terminating one still validates, and may still diverge at pull time. Tightening that is out
/// of scope.
///
/// We loop looking for changes to the termination set until we reach a fixed point: rules left
/// unmarked are reported, one error per rule, at the rule's name.
pub(crate) fn check(ast: &GrammarAST) -> Vec<GrammarError> {
    let mut terminates = Vob::new();
    terminates.resize(ast.rules.len(), false);
    loop {
        let mut changed = false;
        for (i, rule) in ast.rules.values().enumerate() {
            if terminates[i] {
                continue;
            }
            if bottoms_out(&rule.prod, ast, &terminates) {
                terminates.set(i, true);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    ast.rules
        .values()
        .enumerate()
        .filter(|&(i, _)| !terminates[i])
        .map(|(_, rule)| GrammarError {
            kind: GrammarErrorKind::InfiniteLoopInLeftmostChoice,
            spans: vec![rule.name.1],
        })
        .collect()
}

fn bottoms_out(prod: &Production, ast: &GrammarAST, done: &Vob) -> bool {
    match prod {
        Production::Literal(_) => true,
        // Undeclared references are reported separately; don't cascade a loop error too.
        Production::RuleRef(name, _) => ast.rules.get_index_of(name).is_none_or(|i| done[i]),
        Production::Sequence(ps) => ps.iter().all(|p| bottoms_out(p, ast, done)),
        Production::Choice(ps) => ps.iter().any(|p| bottoms_out(p, ast, done)),
        Production::Unary(UnaryOp::Star | UnaryOp::Opt, _) => true,
        Production::Unary(UnaryOp::Plus, inner) => bottoms_out(inner, ast, done),
    }
}

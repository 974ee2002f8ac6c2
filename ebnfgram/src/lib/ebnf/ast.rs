use std::fmt;

use indexmap::IndexMap;

use super::{
    parser::{EbnfParser, GrammarError, GrammarErrorKind},
    termination,
};
use crate::Span;

/// An AST representing a grammar. Rule order is retained: the first rule declared is the root
/// production that enumeration starts from.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
#[non_exhaustive]
pub struct GrammarAST {
    pub name: Option<(String, Span)>,
    pub rules: IndexMap<String, Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: (String, Span),
    pub prod: Production,
    /// Rules marked `name!` in the source. Their concrete tokens are interchangeable; only the
    /// coreference pattern across a sentence matters.
    pub labeled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
    /// Emits exactly this string.
    Literal(String),
    /// Inlines the named rule. The span points at the reference site.
    RuleRef(String, Span),
    /// Concatenation. The empty sequence is the empty production `ℇ`.
    Sequence(Vec<Production>),
    /// Alternation.
    Choice(Vec<Production>),
    /// Postfix `*`, `+` or `?`.
    Unary(UnaryOp, Box<Production>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Star,
    Plus,
    Opt,
}

impl GrammarAST {
    pub fn new() -> GrammarAST {
        GrammarAST {
            name: None,
            // Using an IndexMap means that we retain the order of rules as they're found in the
            // input file.
            rules: IndexMap::new(),
        }
    }

    pub fn add_rule(&mut self, (name, name_span): (String, Span), labeled: bool, prod: Production) {
        self.rules.insert(
            name.clone(),
            Rule {
                name: (name, name_span),
                prod,
                labeled,
            },
        );
    }

    pub fn get_rule(&self, key: &str) -> Option<&Rule> {
        self.rules.get(key)
    }

    /// The rule enumeration starts from: the first rule declared.
    pub fn root_rule(&self) -> Option<&Rule> {
        self.rules.values().next()
    }

    /// Validate the grammar, checking that:
    ///   1) Every rule reference references a rule in the grammar
    ///   2) Every rule's leftmost choice chain reaches a terminating production
    ///
    /// Errors are collected across the whole grammar so one invocation can report every
    /// undeclared reference and every looping rule.
    pub fn validate(&self) -> Result<(), Vec<GrammarError>> {
        let mut errs = Vec::new();
        for rule in self.rules.values() {
            self.check_refs(&rule.prod, &mut errs);
        }
        errs.extend(termination::check(self));
        if errs.is_empty() {
            Ok(())
        } else {
            Err(errs)
        }
    }

    fn check_refs(&self, prod: &Production, errs: &mut Vec<GrammarError>) {
        match prod {
            Production::Literal(_) => (),
            Production::RuleRef(name, span) => {
                if !self.rules.contains_key(name) {
                    errs.push(GrammarError {
                        kind: GrammarErrorKind::RuleNotDeclared,
                        spans: vec![*span],
                    });
                }
            }
            Production::Sequence(ps) | Production::Choice(ps) => {
                for p in ps {
                    self.check_refs(p, errs);
                }
            }
            Production::Unary(_, inner) => self.check_refs(inner, errs),
        }
    }
}

impl Default for GrammarAST {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for GrammarAST {
    type Err = GrammarError;

    /// Parse and validate a grammar, failing with the first collected error. Use
    /// [ASTWithValidityInfo](super::ASTWithValidityInfo) to see every error at once.
    fn from_str(src: &str) -> Result<Self, GrammarError> {
        let mut errs = Vec::new();
        let mut ep = EbnfParser::new(src);
        ep.parse().map_err(|e| errs.extend(e)).ok();
        let ast = ep.build();
        ast.validate().map_err(|e| errs.extend(e)).ok();
        match errs.into_iter().next() {
            None => Ok(ast),
            Some(e) => Err(e),
        }
    }
}

// Printing levels: a child is parenthesised when its binding is looser than the position it
// appears in (choice < sequence < unary operand).
fn fmt_prod(f: &mut fmt::Formatter, prod: &Production, level: u8) -> fmt::Result {
    match prod {
        Production::Literal(s) => write!(f, "\"{}\"", escape_literal(s)),
        Production::RuleRef(name, _) => write!(f, "{}", name),
        Production::Sequence(ps) if ps.is_empty() => write!(f, "\u{2107}"),
        Production::Sequence(ps) => {
            if level > 1 {
                write!(f, "(")?;
            }
            for (i, p) in ps.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                fmt_prod(f, p, 2)?;
            }
            if level > 1 {
                write!(f, ")")?;
            }
            Ok(())
        }
        Production::Choice(ps) => {
            if level > 0 {
                write!(f, "(")?;
            }
            for (i, p) in ps.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                fmt_prod(f, p, 1)?;
            }
            if level > 0 {
                write!(f, ")")?;
            }
            Ok(())
        }
        Production::Unary(op, inner) => {
            fmt_prod(f, inner, 2)?;
            let c = match op {
                UnaryOp::Star => "*",
                UnaryOp::Plus => "+",
                UnaryOp::Opt => "?",
            };
            write!(f, "{}", c)
        }
    }
}

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_prod(f, self, 0)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{} = ", self.name.0, if self.labeled { "!" } else { "" })?;
        fmt_prod(f, &self.prod, 0)?;
        write!(f, ";")
    }
}

impl fmt::Display for GrammarAST {
    /// Emit the grammar back out in the textual dialect. Reparsing the output yields an
    /// equivalent AST, and printing is a fixed point on its own output.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some((name, _)) = &self.name {
            writeln!(f, "Language \"{}\":", escape_literal(name))?;
        }
        for rule in self.rules.values() {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

use lazy_static::lazy_static;
use regex::Regex;
use std::{collections::HashMap, error::Error, fmt};

use super::ast::{GrammarAST, Production, UnaryOp};
use crate::Span;

pub type GrammarResult<T> = Result<T, Vec<GrammarError>>;

/// The various different possible grammar errors.
#[derive(Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum GrammarErrorKind {
    IllegalName,
    IllegalString,
    InvalidEscape,
    IncompleteRule,
    MissingLanguageDeclaration,
    MissingColon,
    MissingEquals,
    MissingSemicolon,
    MismatchedParenthesis,
    PrematureEnd,
    DuplicateRule,
    RuleNotDeclared,
    InfiniteLoopInLeftmostChoice,
}

/// Any error from the grammar parser or validator returns an instance of this struct.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GrammarError {
    /// Uniquely identifies each error.
    pub(crate) kind: GrammarErrorKind,
    /// Always contains at least 1 span.
    ///
    /// Refer to [SpansKind] via [spanskind](Self::spanskind) for the meaning and interpretation
    /// of spans and their ordering.
    pub(crate) spans: Vec<Span>,
}

impl Error for GrammarError {}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for GrammarErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            GrammarErrorKind::IllegalName => "Illegal name",
            GrammarErrorKind::IllegalString => "Illegal string",
            GrammarErrorKind::InvalidEscape => "Invalid escape sequence",
            GrammarErrorKind::IncompleteRule => "Incomplete rule",
            GrammarErrorKind::MissingLanguageDeclaration => "Missing 'Language' declaration",
            GrammarErrorKind::MissingColon => "Missing ':'",
            GrammarErrorKind::MissingEquals => "Missing '='",
            GrammarErrorKind::MissingSemicolon => "Missing ';'",
            GrammarErrorKind::MismatchedParenthesis => "Mismatched parenthesis",
            GrammarErrorKind::PrematureEnd => "File ends prematurely",
            GrammarErrorKind::DuplicateRule => "Duplicate rule",
            GrammarErrorKind::RuleNotDeclared => "Rule not declared",
            GrammarErrorKind::InfiniteLoopInLeftmostChoice => {
                "Infinite loop detected in leftmost choice"
            }
        };
        write!(f, "{}", s)
    }
}

/// Indicates how to interpret the spans of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpansKind {
    /// The first span is the first occurrence, and a span for each subsequent occurrence.
    DuplicationError,
    /// Contains a single span at the site of the error.
    Error,
}

impl GrammarError {
    /// Returns the spans associated with the error, always containing at least 1 span.
    ///
    /// Refer to [SpansKind] via [spanskind](Self::spanskind) for the meaning and interpretation
    /// of spans and their ordering.
    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.spans.iter().copied()
    }

    /// Returns the [SpansKind] associated with this error.
    pub fn spanskind(&self) -> SpansKind {
        match self.kind {
            GrammarErrorKind::DuplicateRule => SpansKind::DuplicationError,
            _ => SpansKind::Error,
        }
    }
}

lazy_static! {
    static ref RE_NAME: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap();
}

/// The empty production symbol `ℇ`.
const EPSILON: &str = "\u{2107}";

pub(crate) struct EbnfParser {
    src: String,
    ast: GrammarAST,
    /// The key is the span of the rule name being duplicated. The value contains one span for
    /// every duplicate of the key.
    duplicate_rule_spans: HashMap<Span, Vec<Span>>,
}

/// The actual parser is intended to be entirely opaque from outside users.
impl EbnfParser {
    pub(crate) fn new(src: &str) -> EbnfParser {
        EbnfParser {
            src: src.to_owned(),
            ast: GrammarAST::new(),
            duplicate_rule_spans: HashMap::new(),
        }
    }

    pub(crate) fn parse(&mut self) -> GrammarResult<()> {
        // We pass around an index into the *bytes* of self.src. We guarantee that at all times
        // this points to the beginning of a UTF-8 character (since multibyte characters exist,
        // not every byte within the string is also a valid character).
        self.parse_header_and_rules().map_err(|e| vec![e])?;
        if !self.duplicate_rule_spans.is_empty() {
            let mut dups = self.duplicate_rule_spans.drain().collect::<Vec<_>>();
            dups.sort_by_key(|(orig_span, _)| orig_span.start());
            return Err(dups
                .into_iter()
                .map(|(orig_span, spans)| {
                    let mut tmp = vec![orig_span];
                    tmp.extend(spans);
                    GrammarError {
                        kind: GrammarErrorKind::DuplicateRule,
                        spans: tmp,
                    }
                })
                .collect());
        }
        Ok(())
    }

    pub(crate) fn build(self) -> GrammarAST {
        self.ast
    }

    fn parse_header_and_rules(&mut self) -> Result<(), GrammarError> {
        let mut i = self.parse_ws(0);
        i = match self.lookahead_is("Language", i) {
            Some(j) => j,
            None => return Err(self.mk_error(GrammarErrorKind::MissingLanguageDeclaration, i)),
        };
        i = self.parse_ws(i);
        let (j, name) = self.parse_string(i)?;
        self.ast.name = Some((name, Span::new(i, j)));
        i = self.parse_ws(j);
        i = match self.lookahead_is(":", i) {
            Some(j) => j,
            None => return Err(self.mk_error(GrammarErrorKind::MissingColon, i)),
        };
        i = self.parse_ws(i);
        while i < self.src.len() {
            i = self.parse_rule(i)?;
            i = self.parse_ws(i);
        }
        Ok(())
    }

    fn parse_rule(&mut self, mut i: usize) -> Result<usize, GrammarError> {
        let (j, rn) = self.parse_name(i)?;
        let name_span = Span::new(i, j);
        i = self.parse_ws(j);
        let labeled = match self.lookahead_is("!", i) {
            Some(j) => {
                i = self.parse_ws(j);
                true
            }
            None => false,
        };
        i = match self.lookahead_is("=", i) {
            Some(j) => j,
            None => return Err(self.mk_error(GrammarErrorKind::MissingEquals, i)),
        };
        i = self.parse_ws(i);
        let (j, prod) = self.parse_production(i)?;
        i = self.parse_ws(j);
        i = match self.lookahead_is(";", i) {
            Some(j) => j,
            None => return Err(self.mk_error(GrammarErrorKind::MissingSemicolon, i)),
        };
        self.add_rule((rn, name_span), labeled, prod);
        Ok(i)
    }

    fn add_rule(&mut self, (name, name_span): (String, Span), labeled: bool, prod: Production) {
        match self.ast.get_rule(&name) {
            Some(orig) => {
                let orig_span = orig.name.1;
                self.duplicate_rule_spans
                    .entry(orig_span)
                    .or_default()
                    .push(name_span);
            }
            None => self.ast.add_rule((name, name_span), labeled, prod),
        }
    }

    fn parse_production(&mut self, mut i: usize) -> Result<(usize, Production), GrammarError> {
        let mut alts = Vec::new();
        loop {
            let (j, seq) = self.parse_sequence(i)?;
            alts.push(seq);
            i = self.parse_ws(j);
            match self.lookahead_is("|", i) {
                Some(j) => i = self.parse_ws(j),
                None => break,
            }
        }
        if alts.len() == 1 {
            Ok((i, alts.pop().unwrap()))
        } else {
            Ok((i, Production::Choice(alts)))
        }
    }

    fn parse_sequence(&mut self, mut i: usize) -> Result<(usize, Production), GrammarError> {
        let mut elems = Vec::new();
        loop {
            i = self.parse_ws(i);
            if !self.at_atom_start(i) {
                break;
            }
            let (j, p) = self.parse_postfix(i)?;
            elems.push(p);
            i = j;
        }
        match elems.len() {
            0 => Err(self.mk_error(GrammarErrorKind::IncompleteRule, i)),
            1 => Ok((i, elems.pop().unwrap())),
            _ => Ok((i, Production::Sequence(elems))),
        }
    }

    fn parse_postfix(&mut self, i: usize) -> Result<(usize, Production), GrammarError> {
        let (mut i, mut p) = self.parse_atom(i)?;
        // Operators bind tightly to their operand, with no intervening whitespace.
        loop {
            let op = match self.src[i..].chars().next() {
                Some('*') => UnaryOp::Star,
                Some('+') => UnaryOp::Plus,
                Some('?') => UnaryOp::Opt,
                _ => break,
            };
            p = Production::Unary(op, Box::new(p));
            i += 1;
        }
        Ok((i, p))
    }

    fn parse_atom(&mut self, i: usize) -> Result<(usize, Production), GrammarError> {
        if let Some(j) = self.lookahead_is("(", i) {
            let j = self.parse_ws(j);
            let (k, p) = self.parse_production(j)?;
            let k = self.parse_ws(k);
            return match self.lookahead_is(")", k) {
                Some(k) => Ok((k, p)),
                None => Err(self.mk_error(GrammarErrorKind::MismatchedParenthesis, k)),
            };
        }
        if let Some(j) = self.lookahead_is(EPSILON, i) {
            return Ok((j, Production::Sequence(Vec::new())));
        }
        match self.src[i..].chars().next() {
            Some('"') | Some('\'') => {
                let (j, s) = self.parse_string(i)?;
                Ok((j, Production::Literal(s)))
            }
            _ => {
                let (j, n) = self.parse_name(i)?;
                Ok((j, Production::RuleRef(n, Span::new(i, j))))
            }
        }
    }

    fn parse_name(&self, i: usize) -> Result<(usize, String), GrammarError> {
        match RE_NAME.find(&self.src[i..]) {
            Some(m) => Ok((i + m.end(), m.as_str().to_owned())),
            None => Err(self.mk_error(GrammarErrorKind::IllegalName, i)),
        }
    }

    fn parse_string(&self, i: usize) -> Result<(usize, String), GrammarError> {
        let quote = match self.src[i..].chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.mk_error(GrammarErrorKind::IllegalString, i)),
        };
        let start = i + 1;
        let mut out = String::new();
        let mut cs = self.src[start..].char_indices();
        loop {
            match cs.next() {
                None => {
                    return Err(self.mk_error(GrammarErrorKind::PrematureEnd, self.src.len()));
                }
                Some((off, c)) if c == quote => {
                    return Ok((start + off + c.len_utf8(), out));
                }
                Some((off, '\\')) => match cs.next() {
                    Some((_, '\\')) => out.push('\\'),
                    Some((_, '"')) => out.push('"'),
                    Some((_, '\'')) => out.push('\''),
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    _ => return Err(self.mk_error(GrammarErrorKind::InvalidEscape, start + off)),
                },
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn at_atom_start(&self, i: usize) -> bool {
        match self.src[i..].chars().next() {
            Some('"' | '\'' | '(') => true,
            Some(c) => self.src[i..].starts_with(EPSILON) || c == '_' || c.is_ascii_alphabetic(),
            None => false,
        }
    }

    fn parse_ws(&self, i: usize) -> usize {
        self.src[i..]
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(off, _)| i + off)
            .unwrap_or(self.src.len())
    }

    fn lookahead_is(&self, s: &str, i: usize) -> Option<usize> {
        if self.src[i..].starts_with(s) {
            Some(i + s.len())
        } else {
            None
        }
    }

    fn mk_error(&self, kind: GrammarErrorKind, off: usize) -> GrammarError {
        GrammarError {
            kind,
            spans: vec![Span::new(off, off)],
        }
    }
}

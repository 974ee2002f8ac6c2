pub mod ast;
pub mod parser;
mod termination;

pub use ast::{GrammarAST, Production, Rule, UnaryOp};
pub use parser::{GrammarError, GrammarErrorKind, GrammarResult, SpansKind};

use parser::EbnfParser;

/// Contains a `GrammarAST` structure produced from a grammar source file, as well as any errors
/// which occurred during its construction.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ASTWithValidityInfo {
    ast: GrammarAST,
    errs: Vec<GrammarError>,
}

impl ASTWithValidityInfo {
    /// Parses a source file into an AST, returning the AST and any errors that were encountered
    /// during its construction and validation. Validation collects everything it can: one
    /// invocation reports every duplicate rule, every undeclared reference and every rule that
    /// can never bottom out.
    pub fn new(src: &str) -> Self {
        let mut errs = Vec::new();
        let ast = {
            let mut ep = EbnfParser::new(src);
            ep.parse().map_err(|e| errs.extend(e)).ok();
            let ast = ep.build();
            ast.validate().map_err(|e| errs.extend(e)).ok();
            ast
        };
        ASTWithValidityInfo { ast, errs }
    }

    /// Returns the `GrammarAST` constructed as the result of parsing the source file. When errors
    /// have occurred and `is_valid` returns false, this AST is the subset of the source file
    /// which parsed correctly.
    pub fn ast(&self) -> &GrammarAST {
        &self.ast
    }

    /// Returns whether any errors were encountered during the parsing and validation of the AST.
    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Returns all errors which were encountered during AST construction.
    pub fn errors(&self) -> &[GrammarError] {
        self.errs.as_slice()
    }
}

#[cfg(test)]
mod test {
    use super::{ASTWithValidityInfo, GrammarAST, GrammarErrorKind};
    use std::str::FromStr;

    #[test]
    fn test_collects_all_errors() {
        let src = "Language \"x\":
            start = honk;
            start = \"a\";
            loopy = loopy;";
        let valid = ASTWithValidityInfo::new(src);
        assert!(!valid.is_valid());
        let kinds = valid
            .errors()
            .iter()
            .map(|e| e.kind.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                GrammarErrorKind::DuplicateRule,
                GrammarErrorKind::RuleNotDeclared,
                GrammarErrorKind::InfiniteLoopInLeftmostChoice,
            ]
        );
    }

    #[test]
    fn test_from_str_takes_first_error() {
        let err = GrammarAST::from_str("Language \"x\": start = honk;").unwrap_err();
        assert_eq!(err.to_string(), "Rule not declared");
        assert!(GrammarAST::from_str("Language \"x\": start = \"a\";").is_ok());
    }

    #[test]
    fn test_valid_ast_roundtrips_through_display() {
        let src = "Language \"x\":
            start = \"a\" bs | \u{2107};
            bs! = (\"b\" | \"c\")+ \"d\"?;";
        let ast = GrammarAST::from_str(src).unwrap();
        let printed = ast.to_string();
        let reparsed = GrammarAST::from_str(&printed).unwrap();
        assert_eq!(reparsed.to_string(), printed);
    }
}

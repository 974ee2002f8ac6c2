use std::{cell::RefCell, collections::HashMap, rc::Rc};

use ebnfgram::ebnf::{GrammarAST, GrammarError, Production, UnaryOp};

/// A grammar lowered to the graph the generator walks. Unary operators are rewritten into
/// choice/sequence cycles, every reference to a rule shares that rule's node, and labelled rules
/// are wrapped in a marker carrying their name. The graph is genuinely cyclic for recursive
/// grammars and immutable once built, so it can be shared by any number of simultaneous
/// enumerations.
#[derive(Debug)]
pub struct CompiledGrammar {
    pub(crate) root: Rc<Prod>,
    pub(crate) rules: HashMap<String, Rc<Prod>>,
    pub(crate) has_labels: bool,
}

#[derive(Debug)]
pub(crate) enum Prod {
    Literal(String),
    /// Body slots sit behind a `RefCell` solely so the second construction pass can close rule
    /// cycles; nothing mutates them after [CompiledGrammar::new] returns.
    Sequence(RefCell<Vec<Rc<Prod>>>),
    Choice(RefCell<Vec<Rc<Prod>>>),
    Labeled(String, Rc<Prod>),
}

impl CompiledGrammar {
    /// Validate `ast` and lower it. All of the grammar's validation errors are reported, not
    /// just the first.
    pub fn new(ast: &GrammarAST) -> Result<CompiledGrammar, Vec<GrammarError>> {
        ast.validate()?;
        // Rule bodies can reference rules in cycles, so build in two passes: allocate an empty
        // body node per rule first, then compile the bodies, with references resolving to the
        // already-allocated nodes.
        let mut bodies = HashMap::new();
        let mut rules = HashMap::new();
        for rule in ast.rules.values() {
            let body = Rc::new(Prod::Choice(RefCell::new(Vec::new())));
            let node = if rule.labeled {
                Rc::new(Prod::Labeled(rule.name.0.clone(), Rc::clone(&body)))
            } else {
                Rc::clone(&body)
            };
            bodies.insert(rule.name.0.clone(), body);
            rules.insert(rule.name.0.clone(), node);
        }
        for rule in ast.rules.values() {
            let alts = match &rule.prod {
                Production::Choice(ps) => ps.iter().map(|p| compile_prod(p, &rules)).collect(),
                p => vec![compile_prod(p, &rules)],
            };
            fill(&bodies[&rule.name.0], alts);
        }
        let root = match ast.root_rule() {
            Some(rule) => Rc::clone(&rules[&rule.name.0]),
            // A grammar with no rules has no sentences.
            None => Rc::new(Prod::Choice(RefCell::new(Vec::new()))),
        };
        Ok(CompiledGrammar {
            root,
            rules,
            has_labels: ast.rules.values().any(|r| r.labeled),
        })
    }
}

fn compile_prod(prod: &Production, rules: &HashMap<String, Rc<Prod>>) -> Rc<Prod> {
    match prod {
        Production::Literal(s) => Rc::new(Prod::Literal(s.clone())),
        Production::RuleRef(name, _) => Rc::clone(&rules[name]),
        Production::Sequence(ps) => Rc::new(Prod::Sequence(RefCell::new(
            ps.iter().map(|p| compile_prod(p, rules)).collect(),
        ))),
        Production::Choice(ps) => Rc::new(Prod::Choice(RefCell::new(
            ps.iter().map(|p| compile_prod(p, rules)).collect(),
        ))),
        Production::Unary(op, inner) => {
            let inner = compile_prod(inner, rules);
            match op {
                // X* becomes C where C = ℇ | X C
                UnaryOp::Star => {
                    let c = Rc::new(Prod::Choice(RefCell::new(Vec::new())));
                    let rep = Rc::new(Prod::Sequence(RefCell::new(vec![inner, Rc::clone(&c)])));
                    fill(&c, vec![epsilon(), rep]);
                    c
                }
                // X+ becomes S where S = X (ℇ | S)
                UnaryOp::Plus => {
                    let s = Rc::new(Prod::Sequence(RefCell::new(Vec::new())));
                    let more = Rc::new(Prod::Choice(RefCell::new(vec![
                        epsilon(),
                        Rc::clone(&s),
                    ])));
                    fill(&s, vec![inner, more]);
                    s
                }
                // X? becomes ℇ | X
                UnaryOp::Opt => Rc::new(Prod::Choice(RefCell::new(vec![epsilon(), inner]))),
            }
        }
    }
}

fn epsilon() -> Rc<Prod> {
    Rc::new(Prod::Sequence(RefCell::new(Vec::new())))
}

fn fill(node: &Rc<Prod>, elems: Vec<Rc<Prod>>) {
    match &**node {
        Prod::Sequence(cell) | Prod::Choice(cell) => *cell.borrow_mut() = elems,
        _ => unreachable!("only sequence and choice nodes have fillable bodies"),
    }
}

#[cfg(test)]
mod test {
    use super::CompiledGrammar;
    use ebnfgram::ebnf::GrammarAST;
    use std::str::FromStr;

    #[test]
    fn test_validates_before_compiling() {
        // FromStr validates too, so build the invalid AST by hand.
        let mut ast = GrammarAST::new();
        ast.add_rule(
            ("start".to_string(), ebnfgram::Span::new(0, 0)),
            false,
            ebnfgram::ebnf::Production::RuleRef("honk".to_string(), ebnfgram::Span::new(0, 0)),
        );
        let errs = CompiledGrammar::new(&ast).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].to_string(), "Rule not declared");
    }

    #[test]
    fn test_empty_grammar_has_no_sentences() {
        let ast = GrammarAST::from_str("Language \"empty\":").unwrap();
        let grm = CompiledGrammar::new(&ast).unwrap();
        assert_eq!(grm.sentences().count(), 0);
    }

    #[test]
    fn test_shared_graph_supports_independent_enumerations() {
        let ast = GrammarAST::from_str("Language \"x\": foo = \"a\" | \"b\" foo;").unwrap();
        let grm = CompiledGrammar::new(&ast).unwrap();
        let mut first = grm.sentences();
        let mut second = grm.sentences();
        assert_eq!(first.next().as_deref(), Some("a"));
        assert_eq!(first.next().as_deref(), Some("ba"));
        // A second enumeration starts from the beginning regardless of the first's progress.
        assert_eq!(second.next().as_deref(), Some("a"));
        assert_eq!(first.next().as_deref(), Some("bba"));
    }
}

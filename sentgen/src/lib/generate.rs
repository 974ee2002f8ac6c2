use std::{collections::HashMap, iter, rc::Rc};

use indexmap::IndexMap;

use crate::{
    combine::{defer, every_combination, every_combination_many},
    compile::{CompiledGrammar, Prod},
    labelling::every_labelling,
};

/// One element of a sentence skeleton: either a literal fragment, or a placeholder standing for
/// one occurrence of a yet-to-be-chosen value from the named labelled rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Literal(String),
    Label(String),
}

/// A sentence with labelled-rule occurrences still unresolved.
pub type Skeleton = Vec<Fragment>;

pub(crate) type SkelStream = Box<dyn Iterator<Item = Skeleton>>;

/// A fresh stream of a node's skeletons. With `expand_labels` set, labelled rules generate
/// their bodies like any other rule; otherwise each labelled rule yields a single placeholder
/// for later substitution.
pub(crate) fn generate(node: &Rc<Prod>, expand_labels: bool) -> SkelStream {
    match &**node {
        Prod::Literal(s) => Box::new(iter::once(vec![Fragment::Literal(s.clone())])),
        Prod::Sequence(elems) => generate_seq(elems.borrow().clone(), expand_labels),
        Prod::Choice(alts) => {
            let alts = alts.borrow().clone();
            if alts.len() == 1 {
                generate(&alts[0], expand_labels)
            } else {
                Box::new(RoundRobin::new(alts, expand_labels))
            }
        }
        Prod::Labeled(name, inner) => {
            if expand_labels {
                generate(inner, true)
            } else {
                Box::new(iter::once(vec![Fragment::Label(name.clone())]))
            }
        }
    }
}

/// Interleave the head's skeletons against the rest of the sequence, concatenating prefix and
/// suffix at each step. The continuation is deferred: building it eagerly would recurse forever
/// on cyclic rules.
fn generate_seq(mut elems: Vec<Rc<Prod>>, expand_labels: bool) -> SkelStream {
    match elems.len() {
        0 => Box::new(iter::once(Vec::new())),
        1 => generate(&elems.pop().unwrap(), expand_labels),
        _ => {
            let head = elems.remove(0);
            let rest = elems;
            Box::new(
                every_combination(
                    generate(&head, expand_labels),
                    defer(move || generate_seq(rest, expand_labels)),
                )
                .map(|(mut prefix, suffix)| {
                    prefix.extend(suffix);
                    prefix
                }),
            )
        }
    }
}

/// Runs every alternative's generator concurrently: each cycle pulls one value from each
/// still-live generator in insertion order, yielding as it goes; exhausted generators drop out.
/// So the output carries every alternative's first skeleton, then every alternative's second,
/// and so on.
struct RoundRobin {
    gens: Vec<SkelStream>,
    idx: usize,
}

impl RoundRobin {
    fn new(alts: Vec<Rc<Prod>>, expand_labels: bool) -> RoundRobin {
        let gens = alts
            .into_iter()
            .map(|alt| -> SkelStream { Box::new(defer(move || generate(&alt, expand_labels))) })
            .collect();
        RoundRobin { gens, idx: 0 }
    }
}

impl Iterator for RoundRobin {
    type Item = Skeleton;

    fn next(&mut self) -> Option<Skeleton> {
        while !self.gens.is_empty() {
            if self.idx >= self.gens.len() {
                self.idx = 0;
            }
            match self.gens[self.idx].next() {
                Some(v) => {
                    self.idx += 1;
                    return Some(v);
                }
                None => {
                    self.gens.remove(self.idx);
                }
            }
        }
        None
    }
}

impl CompiledGrammar {
    /// A fresh enumeration of every sentence in the language. The order interleaves depth and
    /// breadth fairly: for every length bound N there is an index by which all sentences of
    /// length at most N have appeared. Infinite whenever the language is; the iterator owns all
    /// of its cursor state, so concurrent enumerations of one grammar never interfere.
    pub fn sentences(&self) -> Sentences {
        let inner: Box<dyn Iterator<Item = String>> = if !self.has_labels {
            Box::new(generate(&self.root, true).map(|skel| concat(&skel)))
        } else {
            let rules = self.rules.clone();
            Box::new(
                generate(&self.root, false).flat_map(move |skel| expand_skeleton(skel, &rules)),
            )
        };
        Sentences { inner }
    }
}

/// Iterator over the sentences of a [CompiledGrammar], produced by
/// [sentences](CompiledGrammar::sentences).
pub struct Sentences {
    inner: Box<dyn Iterator<Item = String>>,
}

impl Iterator for Sentences {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next()
    }
}

/// Resolve a skeleton's placeholders: for each labelled rule with k occurrences, draw the first
/// k values the rule can produce as the labelling alphabet, then substitute every canonical
/// labelling, pairing the per-rule labelling streams through the fair tuple interleaver. A
/// skeleton with no placeholders passes through as a single sentence.
fn expand_skeleton(
    skel: Skeleton,
    rules: &HashMap<String, Rc<Prod>>,
) -> Box<dyn Iterator<Item = String>> {
    // Occurrence counts per rule name, in first-occurrence order so the tuple order (and thus
    // the output order) is deterministic.
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for frag in &skel {
        if let Fragment::Label(name) = frag {
            *counts.entry(name.clone()).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return Box::new(iter::once(concat(&skel)));
    }
    let names: Vec<String> = counts.keys().cloned().collect();
    let labellings: Vec<Box<dyn Iterator<Item = Vec<String>>>> = counts
        .iter()
        .map(|(name, &k)| {
            let node = match rules.get(name) {
                Some(n) => Rc::clone(n),
                None => panic!("no rule behind label placeholder {{{}}}", name),
            };
            // The first k values, deduplicated preserving order. A rule with fewer than k
            // distinct values gets a shorter alphabet and its expansion simply completes early.
            let mut alphabet: Vec<String> = Vec::with_capacity(k);
            for v in generate(&node, true).take(k).map(|s| concat(&s)) {
                if !alphabet.contains(&v) {
                    alphabet.push(v);
                }
            }
            Box::new(every_labelling(alphabet, k)) as Box<dyn Iterator<Item = Vec<String>>>
        })
        .collect();
    Box::new(every_combination_many(labellings).map(move |assignment| {
        let mut occurrence: HashMap<&str, usize> = HashMap::new();
        let mut out = String::new();
        for frag in &skel {
            match frag {
                Fragment::Literal(s) => out.push_str(s),
                Fragment::Label(name) => {
                    let name_idx = names.iter().position(|n| n == name).unwrap();
                    let slot = occurrence.entry(name.as_str()).or_insert(0);
                    out.push_str(&assignment[name_idx][*slot]);
                    *slot += 1;
                }
            }
        }
        out
    }))
}

fn concat(skel: &Skeleton) -> String {
    let mut out = String::new();
    for frag in skel {
        match frag {
            Fragment::Literal(s) => out.push_str(s),
            Fragment::Label(name) => {
                panic!("label placeholder {{{}}} in a fully expanded sentence", name)
            }
        }
    }
    out
}

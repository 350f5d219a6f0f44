//! Heuristic dependency assignment.
//!
//! One projective pass per sentence: the first main verb becomes the root,
//! auxiliaries attach forward to their verb, nominal runs collapse into a
//! head nominal, and run heads pick up subject/object/prepositional roles
//! from their position relative to the root.

use crate::{Dep, Pos, Token};

/// Assign dependency roles and heads for the tokens of one sentence,
/// given as `tokens[first..last]` with document-level indices.
pub fn assign_deps(tokens: &mut [Token], first: usize, last: usize) {
    debug_assert!(first < last && last <= tokens.len());

    let root = find_root(tokens, first, last);
    tokens[root].dep = Dep::Root;
    tokens[root].head = root;

    attach_verbs(tokens, first, last, root);

    let runs = nominal_runs(tokens, first, last);
    for run in &runs {
        attach_run(tokens, first, root, run);
    }

    attach_rest(tokens, first, last, root, &runs);
}

/// Root preference: first main verb, then first auxiliary, then the head of
/// the first nominal run, then the first token.
fn find_root(tokens: &[Token], first: usize, last: usize) -> usize {
    if let Some(i) = (first..last).find(|&i| tokens[i].pos == Pos::Verb) {
        return i;
    }
    if let Some(i) = (first..last).find(|&i| tokens[i].pos == Pos::Aux) {
        return i;
    }
    if let Some(run) = nominal_runs(tokens, first, last).first() {
        return run.head;
    }
    first
}

/// Auxiliaries attach forward to the next main verb; later main verbs chain
/// back to the previous one.
fn attach_verbs(tokens: &mut [Token], first: usize, last: usize, root: usize) {
    let mut prev_main: Option<usize> = None;

    for i in first..last {
        if i == root {
            if tokens[i].pos == Pos::Verb {
                prev_main = Some(i);
            }
            continue;
        }
        match tokens[i].pos {
            Pos::Aux => {
                let next_verb = (i + 1..last).find(|&j| tokens[j].pos == Pos::Verb);
                let head = next_verb.unwrap_or(root);
                tokens[i].dep = Dep::Aux;
                tokens[i].head = head;
            }
            Pos::Verb => {
                tokens[i].dep = Dep::Conj;
                tokens[i].head = prev_main.unwrap_or(root);
                prev_main = Some(i);
            }
            _ => {}
        }
    }
}

/// A maximal consecutive sequence of nominal tokens; the last one heads it
#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    /// Head nominal (last token of the run)
    head: usize,
}

fn nominal_runs(tokens: &[Token], first: usize, last: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut i = first;
    while i < last {
        if tokens[i].pos.is_nominal() {
            let start = i;
            while i + 1 < last && tokens[i + 1].pos.is_nominal() {
                i += 1;
            }
            runs.push(Run { start, head: i });
        }
        i += 1;
    }
    runs
}

/// Attach one nominal run: compounds to the run head, then the run head to
/// a governing preposition, the root (subject side), or the nearest verb
/// (object side).
fn attach_run(tokens: &mut [Token], first: usize, root: usize, run: &Run) {
    for i in run.start..run.head {
        tokens[i].dep = Dep::Compound;
        tokens[i].head = run.head;
    }

    if run.head == root {
        return;
    }

    // Look back past modifiers for a governing adposition
    let mut back = run.start;
    let prep = loop {
        if back == first {
            break None;
        }
        back -= 1;
        match tokens[back].pos {
            Pos::Determiner | Pos::Adjective | Pos::Adverb | Pos::Numeral => continue,
            Pos::Adposition => break Some(back),
            _ => break None,
        }
    };

    if let Some(prep) = prep {
        tokens[run.head].dep = Dep::Pobj;
        tokens[run.head].head = prep;
    } else if run.head < root {
        tokens[run.head].dep = Dep::Nsubj;
        tokens[run.head].head = root;
    } else {
        let verb = (first..run.head)
            .rev()
            .find(|&i| tokens[i].pos == Pos::Verb)
            .unwrap_or(root);
        tokens[run.head].dep = Dep::Dobj;
        tokens[run.head].head = verb;
    }
}

/// Attach everything still carrying the placeholder role.
fn attach_rest(tokens: &mut [Token], first: usize, last: usize, root: usize, runs: &[Run]) {
    for i in first..last {
        if i == root || !matches!(tokens[i].dep, Dep::Dep) || tokens[i].head != i {
            continue;
        }
        match tokens[i].pos {
            Pos::Adposition => {
                let verb = (first..i)
                    .rev()
                    .find(|&j| tokens[j].pos.is_verbal())
                    .unwrap_or(root);
                tokens[i].dep = Dep::Prep;
                tokens[i].head = verb;
            }
            Pos::Determiner | Pos::Adjective => {
                // Attach to the head of the next nominal run
                let next_head = runs.iter().map(|r| r.head).find(|&h| h > i);
                match next_head {
                    Some(h) => {
                        tokens[i].dep = if tokens[i].pos == Pos::Determiner {
                            Dep::Det
                        } else {
                            Dep::Amod
                        };
                        tokens[i].head = h;
                    }
                    None => {
                        tokens[i].head = root;
                    }
                }
            }
            Pos::Punct => {
                tokens[i].dep = Dep::Punct;
                tokens[i].head = root;
            }
            _ => {
                tokens[i].head = root;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PosLexicon;

    fn parse(text: &str) -> Vec<Token> {
        let lexicon = PosLexicon::new();
        let spans = crate::tokenize::token_spans(text);
        let mut tokens: Vec<Token> = spans
            .iter()
            .enumerate()
            .map(|(i, &(s, e))| Token {
                text: text[s..e].to_string(),
                pos: lexicon.tag(&text[s..e], i == 0),
                dep: Dep::Dep,
                head: i,
                start: s,
                end: e,
            })
            .collect();
        let len = tokens.len();
        assign_deps(&mut tokens, 0, len);
        tokens
    }

    fn find(tokens: &[Token], text: &str) -> usize {
        tokens.iter().position(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_svo_attachment() {
        let tokens = parse("Researchers propose a new method");
        let subj = find(&tokens, "Researchers");
        let verb = find(&tokens, "propose");
        let obj = find(&tokens, "method");

        assert_eq!(tokens[verb].dep, Dep::Root);
        assert_eq!(tokens[subj].dep, Dep::Nsubj);
        assert_eq!(tokens[subj].head, verb);
        assert_eq!(tokens[obj].dep, Dep::Dobj);
        assert_eq!(tokens[obj].head, verb);
    }

    #[test]
    fn test_prepositional_object_is_not_dobj() {
        let tokens = parse("Teams compete in the AI race");
        let race = find(&tokens, "race");
        let prep = find(&tokens, "in");

        assert_eq!(tokens[race].dep, Dep::Pobj);
        assert_eq!(tokens[race].head, prep);
        assert_eq!(tokens[prep].dep, Dep::Prep);
        assert!(tokens.iter().all(|t| t.dep != Dep::Dobj));
    }

    #[test]
    fn test_coordinated_subjects_both_nsubj() {
        let tokens = parse("Alice and Bob release software");
        let verb = find(&tokens, "release");
        let subjects: Vec<&str> = tokens
            .iter()
            .filter(|t| t.dep == Dep::Nsubj && t.head == verb)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(subjects, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_compound_noun_head_is_last() {
        let tokens = parse("Startup ships language model");
        let lang = find(&tokens, "language");
        let model = find(&tokens, "model");

        assert_eq!(tokens[lang].dep, Dep::Compound);
        assert_eq!(tokens[lang].head, model);
        assert_eq!(tokens[model].dep, Dep::Dobj);
    }

    #[test]
    fn test_aux_chains_to_main_verb() {
        let tokens = parse("Model can generate code");
        let aux = find(&tokens, "can");
        let verb = find(&tokens, "generate");

        assert_eq!(tokens[aux].dep, Dep::Aux);
        assert_eq!(tokens[aux].head, verb);
        assert_eq!(tokens[verb].dep, Dep::Root);
    }

    #[test]
    fn test_verbless_title_roots_nominal() {
        let tokens = parse("The new model");
        let model = find(&tokens, "model");
        assert_eq!(tokens[model].dep, Dep::Root);
        assert_eq!(tokens[model].head, model);
    }
}

//! klink NLP - Deterministic linguistic annotation
//!
//! Produces the parse consumed by the extraction pipeline:
//! - Sentence splitting and tokenization
//! - Part-of-speech tagging (lexicons + morphology)
//! - Heuristic dependency assignment (subject, object, verb chains)
//! - Named entity recognition (patterns + dictionary)
//!
//! The `Annotator` trait is the explicit model handle: the caller loads one
//! annotator and threads it through every component that needs a parse.

use serde::{Deserialize, Serialize};

use klink_core::{EntityLabel, Result};

pub mod ner;
pub mod parse;
pub mod tag;
pub mod tokenize;

pub use ner::NerTagger;
pub use tag::PosLexicon;

// ============================================================================
// Parse Model
// ============================================================================

/// Coarse part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pos {
    Noun,
    ProperNoun,
    Pronoun,
    Verb,
    Aux,
    Adjective,
    Adverb,
    Determiner,
    Adposition,
    Numeral,
    Conjunction,
    Punct,
    Other,
}

impl Pos {
    /// Nominal tokens can head or fill subject/object slots
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun | Self::Pronoun)
    }

    /// Verbal tokens participate in verb chains
    pub fn is_verbal(&self) -> bool {
        matches!(self, Self::Verb | Self::Aux)
    }
}

/// Dependency roles assigned by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dep {
    /// Sentence root; its head index is itself
    Root,
    /// Nominal subject of a verb
    Nsubj,
    /// Direct object of a verb
    Dobj,
    /// Auxiliary attached to a following verb
    Aux,
    /// Verb conjoined to an earlier verb
    Conj,
    /// Non-head nominal inside a noun phrase
    Compound,
    /// Adjectival modifier
    Amod,
    /// Determiner
    Det,
    /// Adposition heading a prepositional phrase
    Prep,
    /// Object of an adposition
    Pobj,
    Punct,
    /// Unclassified attachment
    Dep,
}

/// One token of the analyzed text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub pos: Pos,
    pub dep: Dep,
    /// Index of the head token within the document; the root points to itself
    pub head: usize,
    /// Byte span in the source text
    pub start: usize,
    pub end: usize,
}

/// One sentence as a token range plus its surface text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    /// First token index (inclusive)
    pub first: usize,
    /// Last token index (exclusive)
    pub last: usize,
}

/// A recognized entity span with a byte span in the source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

/// The full analysis of one document's text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedDoc {
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
    /// Entity spans in left-to-right order
    pub entities: Vec<EntitySpan>,
}

impl ParsedDoc {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens of one sentence
    pub fn sentence_tokens(&self, sentence: &Sentence) -> &[Token] {
        &self.tokens[sentence.first..sentence.last]
    }

    /// Token indices whose head is `head` (excluding the root self-loop)
    pub fn children(&self, head: usize) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(i, t)| t.head == head && *i != head)
            .map(|(i, _)| i)
    }

    /// Whether the token at `index` is a verb whose own head is a different
    /// verb token (a compound/auxiliary verb chain member)
    pub fn is_chained_verb(&self, index: usize) -> bool {
        let token = &self.tokens[index];
        token.pos.is_verbal()
            && token.head != index
            && self.tokens[token.head].pos == Pos::Verb
    }
}

// ============================================================================
// Annotator
// ============================================================================

/// Trait for linguistic annotators.
///
/// Implementations are pure functions of the input text plus their loaded
/// resources; empty input yields an empty parse rather than an error.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<ParsedDoc>;
}

/// Rule-based annotator combining the tokenizer, tagger, dependency
/// assigner and NER into one deterministic analysis pass.
pub struct RuleAnnotator {
    lexicon: PosLexicon,
    ner: NerTagger,
}

impl RuleAnnotator {
    pub fn new() -> Self {
        Self {
            lexicon: PosLexicon::new(),
            ner: NerTagger::new(),
        }
    }
}

impl Default for RuleAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for RuleAnnotator {
    fn annotate(&self, text: &str) -> Result<ParsedDoc> {
        if text.trim().is_empty() {
            return Ok(ParsedDoc::default());
        }

        let mut tokens = Vec::new();
        let mut sentences = Vec::new();

        for (sent_start, sent_end) in tokenize::sentence_spans(text) {
            let sentence_text = &text[sent_start..sent_end];
            let first = tokens.len();

            for (tok_start, tok_end) in tokenize::token_spans(sentence_text) {
                let start = sent_start + tok_start;
                let end = sent_start + tok_end;
                let tok_text = &text[start..end];
                let pos = self.lexicon.tag(tok_text, tokens.len() == first);

                tokens.push(Token {
                    text: tok_text.to_string(),
                    pos,
                    // Placeholder until dependency assignment
                    dep: Dep::Dep,
                    head: tokens.len(),
                    start,
                    end,
                });
            }

            let last = tokens.len();
            if last > first {
                parse::assign_deps(&mut tokens, first, last);
                sentences.push(Sentence {
                    text: sentence_text.trim_end().to_string(),
                    first,
                    last,
                });
            }
        }

        let entities = self.ner.extract(text);

        Ok(ParsedDoc {
            tokens,
            sentences,
            entities,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Named Entity Recognition over raw text.
//!
//! Two strategies combined:
//! - Pattern rules: regex for organization suffixes, person title prefixes
//!   and versioned product names
//! - Dictionary matching: known organizations, people, places, products and
//!   works with aliases
//!
//! Overlapping candidates are resolved in favor of the longer span.

use std::collections::HashMap;

use regex::Regex;

use klink_core::EntityLabel;

use crate::EntitySpan;

// ============================================================================
// Dictionary
// ============================================================================

/// Dictionary entry for entity matching
#[derive(Debug, Clone)]
struct DictionaryEntry {
    label: EntityLabel,
    aliases: Vec<String>,
}

/// Rule-based named entity tagger
pub struct NerTagger {
    /// Pattern rules (regex -> entity label)
    patterns: Vec<(Regex, EntityLabel)>,
    /// Dictionary of known surface forms
    dictionary: HashMap<String, DictionaryEntry>,
}

impl NerTagger {
    pub fn new() -> Self {
        let mut tagger = Self {
            patterns: Vec::new(),
            dictionary: HashMap::new(),
        };

        tagger.init_patterns();
        tagger.init_dictionary();
        tagger
    }

    fn init_patterns(&mut self) {
        // Organization suffixes
        self.add_pattern(
            r"\b[A-Z][A-Za-z0-9&-]*(?:\s+[A-Z][A-Za-z0-9&-]*)*\s+(?:Inc\.?|Corp\.?|Ltd\.?|LLC|Labs|Systems|Technologies|University|Institute|Foundation)\b",
            EntityLabel::Org,
        );

        // Person title prefixes
        self.add_pattern(
            r"\b(?:Dr|Prof|Mr|Ms|Mrs)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\b",
            EntityLabel::Person,
        );

        // Versioned product names like GPT-4 or Llama-3.1
        self.add_pattern(
            r"\b[A-Z][A-Za-z]+-\d+(?:\.\d+)*[A-Za-z0-9]*\b",
            EntityLabel::Product,
        );
    }

    fn init_dictionary(&mut self) {
        // Organizations
        self.add_term("OpenAI", EntityLabel::Org, &[]);
        self.add_term("Google", EntityLabel::Org, &["Alphabet"]);
        self.add_term("Google DeepMind", EntityLabel::Org, &["DeepMind"]);
        self.add_term("Microsoft", EntityLabel::Org, &[]);
        self.add_term("Meta", EntityLabel::Org, &["Facebook"]);
        self.add_term("Anthropic", EntityLabel::Org, &[]);
        self.add_term("Nvidia", EntityLabel::Org, &["NVIDIA"]);
        self.add_term("Apple", EntityLabel::Org, &[]);
        self.add_term("Amazon", EntityLabel::Org, &["AWS"]);
        self.add_term("Hugging Face", EntityLabel::Org, &["HuggingFace"]);
        self.add_term("GitHub", EntityLabel::Org, &[]);
        self.add_term("Mozilla", EntityLabel::Org, &[]);
        self.add_term("Intel", EntityLabel::Org, &[]);
        self.add_term("IBM", EntityLabel::Org, &[]);
        self.add_term("Tesla", EntityLabel::Org, &[]);
        self.add_term("SpaceX", EntityLabel::Org, &[]);
        self.add_term("Netflix", EntityLabel::Org, &[]);
        self.add_term("Mistral AI", EntityLabel::Org, &["Mistral"]);
        self.add_term("xAI", EntityLabel::Org, &[]);
        self.add_term("Alibaba", EntityLabel::Org, &[]);
        self.add_term("Baidu", EntityLabel::Org, &[]);
        self.add_term("Tencent", EntityLabel::Org, &[]);
        self.add_term("ByteDance", EntityLabel::Org, &[]);
        self.add_term("Samsung", EntityLabel::Org, &[]);
        self.add_term("Oracle", EntityLabel::Org, &[]);
        self.add_term("Reddit", EntityLabel::Org, &[]);
        self.add_term("MIT", EntityLabel::Org, &[]);
        self.add_term("Stanford", EntityLabel::Org, &[]);
        self.add_term("DARPA", EntityLabel::Org, &[]);
        self.add_term("NASA", EntityLabel::Org, &[]);

        // Geopolitical entities
        self.add_term("United States", EntityLabel::Gpe, &["U.S.", "USA", "America"]);
        self.add_term("China", EntityLabel::Gpe, &[]);
        self.add_term("Japan", EntityLabel::Gpe, &[]);
        self.add_term("Germany", EntityLabel::Gpe, &[]);
        self.add_term("France", EntityLabel::Gpe, &[]);
        self.add_term("United Kingdom", EntityLabel::Gpe, &["UK", "Britain"]);
        self.add_term("India", EntityLabel::Gpe, &[]);
        self.add_term("Canada", EntityLabel::Gpe, &[]);
        self.add_term("Russia", EntityLabel::Gpe, &[]);
        self.add_term("South Korea", EntityLabel::Gpe, &[]);
        self.add_term("San Francisco", EntityLabel::Gpe, &[]);
        self.add_term("New York", EntityLabel::Gpe, &[]);
        self.add_term("London", EntityLabel::Gpe, &[]);
        self.add_term("Beijing", EntityLabel::Gpe, &[]);
        self.add_term("Seattle", EntityLabel::Gpe, &[]);
        self.add_term("California", EntityLabel::Gpe, &[]);

        // Products
        self.add_term("ChatGPT", EntityLabel::Product, &[]);
        self.add_term("Gemini", EntityLabel::Product, &[]);
        self.add_term("Claude", EntityLabel::Product, &[]);
        self.add_term("Llama", EntityLabel::Product, &[]);
        self.add_term("Copilot", EntityLabel::Product, &[]);
        self.add_term("iPhone", EntityLabel::Product, &[]);
        self.add_term("Android", EntityLabel::Product, &[]);
        self.add_term("Windows", EntityLabel::Product, &[]);
        self.add_term("Linux", EntityLabel::Product, &[]);
        self.add_term("Kubernetes", EntityLabel::Product, &[]);
        self.add_term("Docker", EntityLabel::Product, &[]);
        self.add_term("PostgreSQL", EntityLabel::Product, &["Postgres"]);
        self.add_term("SQLite", EntityLabel::Product, &[]);
        self.add_term("Chrome", EntityLabel::Product, &[]);
        self.add_term("Firefox", EntityLabel::Product, &[]);
        self.add_term("PyTorch", EntityLabel::Product, &[]);
        self.add_term("TensorFlow", EntityLabel::Product, &[]);
        self.add_term("Vision Pro", EntityLabel::Product, &[]);

        // People
        self.add_term("Sam Altman", EntityLabel::Person, &["Altman"]);
        self.add_term("Elon Musk", EntityLabel::Person, &["Musk"]);
        self.add_term("Mark Zuckerberg", EntityLabel::Person, &["Zuckerberg"]);
        self.add_term("Satya Nadella", EntityLabel::Person, &["Nadella"]);
        self.add_term("Sundar Pichai", EntityLabel::Person, &["Pichai"]);
        self.add_term("Jensen Huang", EntityLabel::Person, &[]);
        self.add_term("Demis Hassabis", EntityLabel::Person, &[]);
        self.add_term("Geoffrey Hinton", EntityLabel::Person, &["Hinton"]);
        self.add_term("Yann LeCun", EntityLabel::Person, &["LeCun"]);
        self.add_term("Andrej Karpathy", EntityLabel::Person, &["Karpathy"]);
        self.add_term("Linus Torvalds", EntityLabel::Person, &["Torvalds"]);
        self.add_term("Tim Cook", EntityLabel::Person, &[]);
        self.add_term("Jeff Bezos", EntityLabel::Person, &["Bezos"]);
        self.add_term("Bill Gates", EntityLabel::Person, &[]);

        // Works
        self.add_term("Attention Is All You Need", EntityLabel::WorkOfArt, &[]);
        self.add_term(
            "The Art of Computer Programming",
            EntityLabel::WorkOfArt,
            &[],
        );
    }

    fn add_pattern(&mut self, pattern: &str, label: EntityLabel) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, label));
        }
    }

    fn add_term(&mut self, term: &str, label: EntityLabel, aliases: &[&str]) {
        self.dictionary.insert(
            term.to_string(),
            DictionaryEntry {
                label,
                aliases: aliases.iter().map(|s| s.to_string()).collect(),
            },
        );
    }

    /// Extract entity spans from text, left-to-right, overlaps resolved
    pub fn extract(&self, text: &str) -> Vec<EntitySpan> {
        let mut candidates = Vec::new();

        candidates.extend(self.extract_by_patterns(text));
        candidates.extend(self.extract_by_dictionary(text));

        deduplicate(candidates)
    }

    fn extract_by_patterns(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();

        for (regex, label) in &self.patterns {
            for mat in regex.find_iter(text) {
                spans.push(EntitySpan {
                    text: mat.as_str().to_string(),
                    label: *label,
                    start: mat.start(),
                    end: mat.end(),
                });
            }
        }

        spans
    }

    fn extract_by_dictionary(&self, text: &str) -> Vec<EntitySpan> {
        // ASCII lowercasing keeps byte offsets aligned with the source text
        let text_lower = text.to_ascii_lowercase();
        let mut spans = Vec::new();

        for (term, entry) in &self.dictionary {
            find_term(&text_lower, text, term, entry.label, &mut spans);
            for alias in &entry.aliases {
                find_term(&text_lower, text, alias, entry.label, &mut spans);
            }
        }

        spans
    }
}

impl Default for NerTagger {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive whole-word occurrences of `term`, reported with the
/// original surface text.
fn find_term(
    text_lower: &str,
    text: &str,
    term: &str,
    label: EntityLabel,
    spans: &mut Vec<EntitySpan>,
) {
    let needle = term.to_ascii_lowercase();

    for (start, _) in text_lower.match_indices(&needle) {
        let end = start + needle.len();
        if !on_word_boundary(text.as_bytes(), start, end) {
            continue;
        }
        spans.push(EntitySpan {
            text: text[start..end].to_string(),
            label,
            start,
            end,
        });
    }
}

fn on_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before_ok && after_ok
}

/// Remove overlapping spans, preferring longer matches, then earlier ones.
fn deduplicate(mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then((b.end - b.start).cmp(&(a.end - a.start)))
            .then(a.label.as_str().cmp(b.label.as_str()))
    });

    let mut result: Vec<EntitySpan> = Vec::new();
    for span in spans {
        let overlaps = result
            .iter()
            .any(|kept| span.start < kept.end && kept.start < span.end);
        if !overlaps {
            result.push(span);
        }
    }

    result.sort_by_key(|e| e.start);
    result
}

// ============================================================================
// Tests
// ============================================================================

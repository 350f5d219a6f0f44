//! Part-of-speech tagging from closed-class lexicons and morphology.

use std::collections::HashSet;

use crate::Pos;

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "its", "their", "our", "his", "her", "my", "your",
];

const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "of", "for", "with", "by", "from", "to", "into", "over", "under", "about",
    "against", "between", "through", "during", "without", "within", "across", "via", "per",
    "toward", "towards", "onto", "among",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "them", "him", "us", "me", "who", "which",
    "what", "itself", "themselves",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "while", "because", "although", "if", "when",
    "where", "as", "than", "that",
];

const AUXILIARIES: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "has", "have", "had", "having",
    "do", "does", "did", "will", "would", "can", "could", "may", "might", "must", "shall",
    "should",
];

/// Open-class verbs common in paper abstracts and news titles, base and
/// inflected forms
const VERBS: &[&str] = &[
    "release", "releases", "released", "releasing", "announce", "announces", "announced",
    "launch", "launches", "launched", "introduce", "introduces", "introduced", "present",
    "presents", "presented", "propose", "proposes", "proposed", "show", "shows", "showed",
    "shown", "use", "uses", "used", "using", "build", "builds", "built", "ship", "ships",
    "shipped", "compete", "competes", "competed", "acquire", "acquires", "acquired", "develop",
    "develops", "developed", "train", "trains", "trained", "outperform", "outperforms",
    "outperformed", "achieve", "achieves", "achieved", "improve", "improves", "improved",
    "raise", "raises", "raised", "buy", "buys", "bought", "sell", "sells", "sold", "create",
    "creates", "created", "demonstrate", "demonstrates", "demonstrated", "enable", "enables",
    "enabled", "provide", "provides", "provided", "offer", "offers", "offered", "make",
    "makes", "made", "find", "finds", "found", "learn", "learns", "learned", "beat", "beats",
    "win", "wins", "won", "need", "needs", "needed", "support", "supports", "supported",
    "add", "adds", "added", "claim", "claims", "claimed", "plan", "plans", "planned",
    "unveil", "unveils", "unveiled", "reveal", "reveals", "revealed", "write", "writes",
    "wrote", "written", "run", "runs", "ran", "running", "work", "works", "worked", "fail",
    "fails", "failed", "help", "helps", "helped", "predict", "predicts", "predicted",
    "generate", "generates", "generated", "evaluate", "evaluates", "evaluated", "leverage",
    "leverages", "leveraged", "explore", "explores", "explored", "investigate", "investigates",
    "investigated", "study", "studies", "studied", "address", "addresses", "addressed",
    "consider", "considers", "considered", "suggest", "suggests", "suggested", "require",
    "requires", "required", "reduce", "reduces", "reduced", "increase", "increases",
    "increased", "solve", "solves", "solved", "design", "designs", "designed", "implement",
    "implements", "implemented", "apply", "applies", "applied", "integrate", "integrates",
    "integrated", "extend", "extends", "extended", "combine", "combines", "combined",
    "compare", "compares", "compared", "analyze", "analyzes", "analyzed", "describe",
    "describes", "described", "examine", "examines", "examined", "identify", "identifies",
    "identified", "like", "likes", "liked", "get", "gets", "got", "take", "takes", "took",
    "see", "sees", "saw", "say", "says", "said", "report", "reports", "reported", "test",
    "tests", "tested", "open-source", "open-sources", "open-sourced",
];

const ADJECTIVES: &[&str] = &[
    "new", "novel", "large", "small", "open", "deep", "neural", "big", "fast", "slow",
    "recent", "modern", "efficient", "robust", "simple", "complex", "powerful", "scalable",
    "popular", "free", "public", "private", "early", "late", "strong", "weak", "first",
    "last", "best", "better", "worse", "high", "low", "general", "specific",
];

/// Lexicon-driven part-of-speech tagger
pub struct PosLexicon {
    determiners: HashSet<&'static str>,
    adpositions: HashSet<&'static str>,
    pronouns: HashSet<&'static str>,
    conjunctions: HashSet<&'static str>,
    auxiliaries: HashSet<&'static str>,
    verbs: HashSet<&'static str>,
    adjectives: HashSet<&'static str>,
}

impl PosLexicon {
    pub fn new() -> Self {
        Self {
            determiners: DETERMINERS.iter().copied().collect(),
            adpositions: ADPOSITIONS.iter().copied().collect(),
            pronouns: PRONOUNS.iter().copied().collect(),
            conjunctions: CONJUNCTIONS.iter().copied().collect(),
            auxiliaries: AUXILIARIES.iter().copied().collect(),
            verbs: VERBS.iter().copied().collect(),
            adjectives: ADJECTIVES.iter().copied().collect(),
        }
    }

    /// Tag a single token. Sentence-initial capitalized words are checked
    /// against the closed-class lexicons before the proper-noun heuristic so
    /// "The" does not become a name.
    pub fn tag(&self, text: &str, sentence_initial: bool) -> Pos {
        let first = match text.chars().next() {
            Some(c) => c,
            None => return Pos::Other,
        };

        if !first.is_alphanumeric() {
            return Pos::Punct;
        }
        if first.is_ascii_digit() {
            return Pos::Numeral;
        }

        let lower = text.to_lowercase();
        let lower = lower.as_str();

        if self.determiners.contains(lower) {
            return Pos::Determiner;
        }
        if self.adpositions.contains(lower) {
            return Pos::Adposition;
        }
        if self.pronouns.contains(lower) {
            return Pos::Pronoun;
        }
        if self.conjunctions.contains(lower) {
            return Pos::Conjunction;
        }
        if self.auxiliaries.contains(lower) {
            return Pos::Aux;
        }
        if self.verbs.contains(lower) {
            return Pos::Verb;
        }
        if self.adjectives.contains(lower) {
            return Pos::Adjective;
        }

        if lower.ends_with("ly") && lower.len() > 3 {
            return Pos::Adverb;
        }
        if has_verb_suffix(lower) {
            return Pos::Verb;
        }

        if first.is_uppercase() {
            // Mid-sentence capitalization is a strong proper-noun signal;
            // sentence-initial needs internal caps or digits as evidence
            if !sentence_initial
                || text.chars().skip(1).any(|c| c.is_uppercase() || c.is_ascii_digit())
            {
                return Pos::ProperNoun;
            }
        }

        Pos::Noun
    }
}

impl Default for PosLexicon {
    fn default() -> Self {
        Self::new()
    }
}

fn has_verb_suffix(lower: &str) -> bool {
    const SUFFIXES: &[&str] = &["ize", "izes", "ized", "izing", "ise", "ises", "ised", "ising"];
    SUFFIXES.iter().any(|s| lower.ends_with(s) && lower.len() > s.len() + 2)
}

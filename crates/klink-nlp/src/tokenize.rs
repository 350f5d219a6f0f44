//! Sentence splitting and tokenization.
//!
//! Both passes return byte spans into the input so downstream offsets stay
//! valid for slicing the original text.

/// Abbreviations that end with a period without ending a sentence
const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "cf", "al", "fig", "dr", "prof", "mr", "ms", "mrs", "no", "vol",
];

/// Split text into sentence byte spans.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace, unless the
/// period terminates a known abbreviation or sits between digits.
pub fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'!' || b == b'?' || (b == b'.' && !is_non_terminal_period(text, i)) {
            // Consume trailing closers like quotes or parentheses
            let mut end = i + 1;
            while end < bytes.len() && matches!(bytes[end], b'"' | b'\'' | b')' | b']') {
                end += 1;
            }
            if end >= bytes.len() || bytes[end].is_ascii_whitespace() {
                spans.push((start, end));
                // Skip whitespace to the next sentence start
                while end < bytes.len() && bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                start = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }

    if start < bytes.len() {
        spans.push((start, bytes.len()));
    }

    spans
        .into_iter()
        .filter(|(s, e)| !text[*s..*e].trim().is_empty())
        .collect()
}

/// A period that does not terminate a sentence: decimal point, version
/// number, or known abbreviation.
fn is_non_terminal_period(text: &str, at: usize) -> bool {
    let bytes = text.as_bytes();

    let next_is_digit = at + 1 < bytes.len() && bytes[at + 1].is_ascii_digit();
    let prev_is_digit = at > 0 && bytes[at - 1].is_ascii_digit();
    if next_is_digit && prev_is_digit {
        return true;
    }

    // Word immediately before the period
    let mut word_start = at;
    while word_start > 0 && is_word_byte(bytes[word_start - 1]) {
        word_start -= 1;
    }
    let word = text[word_start..at].to_ascii_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
        // Single capital initials like "J." in author names
        || (word.len() == 1 && word.chars().all(|c| c.is_ascii_alphabetic()))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'\''
}

/// Split one sentence into token byte spans.
///
/// Word tokens keep internal hyphens, periods and apostrophes when flanked
/// by alphanumerics, so "GPT-4", "all-MiniLM" and "3.5" stay whole.
/// Everything else that is not whitespace becomes a single-char token.
pub fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if c.is_alphanumeric() {
            let mut end = start + c.len_utf8();
            while let Some(&(next_start, next)) = chars.peek() {
                if next.is_alphanumeric() {
                    end = next_start + next.len_utf8();
                    chars.next();
                } else if matches!(next, '-' | '.' | '\'') {
                    // Joiner only when another alphanumeric follows
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    match lookahead.peek() {
                        Some(&(_, after)) if after.is_alphanumeric() => {
                            chars.next();
                            if let Some((after_start, after)) = chars.next() {
                                end = after_start + after.len_utf8();
                            }
                        }
                        _ => break,
                    }
                } else {
                    break;
                }
            }
            spans.push((start, end));
        } else {
            spans.push((start, start + c.len_utf8()));
        }
    }

    spans
}

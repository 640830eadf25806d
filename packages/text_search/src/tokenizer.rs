//! Text analysis: word tokenization, stop-word removal, Porter2 stemming,
//! and negation marking.
//!
//! Words that follow a negation cue (`not`, `no`, `never`, `without`,
//! `nor`, or any `n't` contraction) are prefixed with `!` until the end of
//! the clause, so "no pool" and "pool" index as different terms. The cue
//! words themselves are dropped.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Prefix applied to stems inside a negated clause.
pub const NEGATION_PREFIX: char = '!';

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)*|[.,;:!?()\[\]]")
        .unwrap_or_else(|_| unreachable!())
});

static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

static NEGATION_CUES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["not", "no", "never", "without", "nor", "cannot"].into_iter().collect());

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as",
        "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
        "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
        "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
        "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
        "more", "most", "my", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
        "the", "their", "theirs", "them", "then", "there", "these", "they", "this", "those",
        "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what",
        "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
        "your", "yours",
    ]
    .into_iter()
    .collect()
});

fn is_clause_break(token: &str) -> bool {
    !token.chars().any(char::is_alphanumeric)
}

fn is_negation_cue(word: &str) -> bool {
    NEGATION_CUES.contains(word) || word.ends_with("n't") || word.ends_with("n’t")
}

/// Converts `text` into the index terms used for both documents and
/// queries.
#[must_use]
pub fn analyze(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut terms = Vec::new();
    let mut negated = false;

    for m in TOKEN_RE.find_iter(&lowered) {
        let token = m.as_str();

        if is_clause_break(token) {
            negated = false;
            continue;
        }

        if is_negation_cue(token) {
            negated = true;
            continue;
        }

        // possessives and other clitics index under the bare word
        let word = token.split(['\'', '’']).next().unwrap_or(token);

        if word.is_empty() || STOP_WORDS.contains(word) {
            continue;
        }

        let stem = STEMMER.stem(word);
        if negated {
            terms.push(format!("{NEGATION_PREFIX}{stem}"));
        } else {
            terms.push(stem.into_owned());
        }
    }

    terms
}

//! Word-list profanity filter.
//!
//! Player-supplied text (gamertags, rich presence, session titles) is
//! normalised before matching: lowercased, common character substitutions
//! undone, and separators removed between single letters ("f.u.c.k").

use std::path::Path;

use regex_lite::Regex;

use crate::infrastructure::ports::ProfanityPort;

/// Terms blocked when no word list is configured.
const DEFAULT_TERMS: &[&str] = &[
    "asshole", "bastard", "bitch", "bollock", "cock", "cunt", "dick", "fag", "fuck", "nigg",
    "penis", "pussy", "rape", "retard", "shit", "slut", "twat", "vagina", "wank", "whore",
];

/// Blocks text containing any listed term at the start of a word.
pub struct WordListFilter {
    pattern: Option<Regex>,
}

impl WordListFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternation = terms
            .into_iter()
            .map(|t| normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .map(|t| regex_lite::escape(&t))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = if alternation.is_empty() {
            None
        } else {
            match Regex::new(&format!(r"\b(?:{alternation})")) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(error = %e, "Invalid profanity pattern, filter disabled");
                    None
                }
            }
        };

        Self { pattern }
    }

    /// Built-in terms plus any extra terms from a newline-separated file.
    pub fn with_wordlist_file(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let extra = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        Ok(Self::new(DEFAULT_TERMS.iter().copied().chain(extra)))
    }
}

impl Default for WordListFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TERMS)
    }
}

impl ProfanityPort for WordListFilter {
    fn is_clean(&self, text: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        let normalized = normalize(text);
        !pattern.is_match(&normalized) && !pattern.is_match(&collapse_spelled_out(&normalized))
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_ascii_lowercase() {
            '0' => 'o',
            '1' | '!' | '|' => 'i',
            '3' => 'e',
            '4' | '@' => 'a',
            '5' | '$' => 's',
            '7' => 't',
            other => other,
        })
        .collect()
}

/// Join runs of single letters split by separators: "f u-c k" -> "fuck".
fn collapse_spelled_out(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();

    for token in text.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() == 1 {
            pending.push_str(token);
            continue;
        }
        if !pending.is_empty() {
            out.push_str(&pending);
            out.push(' ');
            pending.clear();
        }
        if !token.is_empty() {
            out.push_str(token);
            out.push(' ');
        }
    }
    out.push_str(&pending);
    out
}

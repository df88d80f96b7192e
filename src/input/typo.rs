//! Typing error model
//!
//! Decides how likely a character is to be mistyped and which wrong
//! character a human would plausibly produce instead.

use super::fatigue::error_factor;
use super::random::RandomSource;
use super::tables::{adjacent_keys, is_vowel, CHAR_CONFUSIONS, WORD_CONFUSIONS};

/// Relative error weight of a character class
///
/// Shifted and off-home characters are fumbled more often; vowels and the
/// space bar less.
pub fn error_weight(c: char) -> f64 {
    if c == ' ' {
        0.5
    } else if c.is_uppercase() {
        1.5
    } else if c.is_ascii_digit() {
        1.3
    } else if is_symbol(c) {
        1.4
    } else if is_vowel(c) {
        0.8
    } else {
        1.0
    }
}

/// Probability of mistyping `c`, with fatigue applied last and capped at 1
pub fn error_probability(c: char, error_rate: f64, fatigue: f64) -> f64 {
    if error_rate <= 0.0 {
        return 0.0;
    }
    (error_rate * error_weight(c) * error_factor(fatigue)).min(1.0)
}

/// Draws whether `c` is mistyped
pub fn should_mistype(c: char, error_rate: f64, fatigue: f64, rng: &mut dyn RandomSource) -> bool {
    rng.chance(error_probability(c, error_rate, fatigue))
}

/// Non-alphanumeric, non-whitespace characters
pub fn is_symbol(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Picks the wrong character typed in place of `chars[index]`
///
/// Preference order: the misspelling of the enclosing word if it differs at
/// this position, a hand-authored character confusion, a random adjacent
/// key, and finally the same key pressed twice.
pub fn substitute_char(chars: &[char], index: usize, rng: &mut dyn RandomSource) -> char {
    let Some(&target) = chars.get(index) else {
        return ' ';
    };

    if let Some(c) = word_confusion(chars, index) {
        return c;
    }

    let lower = target.to_ascii_lowercase();
    if let Some(options) = CHAR_CONFUSIONS.get(&lower) {
        let c = options[rng.pick_index(options.len())];
        return if target.is_ascii_uppercase() {
            c.to_ascii_uppercase()
        } else {
            c
        };
    }

    let neighbours = adjacent_keys(target);
    if !neighbours.is_empty() {
        return neighbours[rng.pick_index(neighbours.len())];
    }

    target
}

/// Misspelling lookup for the word that contains `chars[index]`
fn word_confusion(chars: &[char], index: usize) -> Option<char> {
    if !chars[index].is_alphabetic() {
        return None;
    }

    let start = chars[..index]
        .iter()
        .rposition(|c| !c.is_alphabetic())
        .map_or(0, |p| p + 1);
    let end = chars[index..]
        .iter()
        .position(|c| !c.is_alphabetic())
        .map_or(chars.len(), |p| index + p);

    let word: String = chars[start..end].iter().collect();
    let typo = WORD_CONFUSIONS.get(word.to_lowercase().as_str())?;
    let wrong = typo.chars().nth(index - start)?;

    let original = chars[index];
    if wrong == original.to_ascii_lowercase() {
        return None;
    }
    Some(if original.is_ascii_uppercase() {
        wrong.to_ascii_uppercase()
    } else {
        wrong
    })
}

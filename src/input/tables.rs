//! Static keyboard heuristics
//!
//! QWERTY adjacency, per-key difficulty, the common-word set and the table
//! of hand-authored confusions. All tables are built once on first use and
//! never mutated.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Physically neighbouring keys on a US QWERTY layout (lowercase base keys)
pub static KEY_ADJACENCY: Lazy<HashMap<char, &'static [char]>> = Lazy::new(|| {
    let entries: [(char, &'static [char]); 36] = [
        ('a', &['q', 'w', 's', 'z']),
        ('b', &['v', 'g', 'h', 'n']),
        ('c', &['x', 'd', 'f', 'v']),
        ('d', &['s', 'e', 'r', 'f', 'c', 'x']),
        ('e', &['w', 's', 'd', 'r']),
        ('f', &['d', 'r', 't', 'g', 'v', 'c']),
        ('g', &['f', 't', 'y', 'h', 'b', 'v']),
        ('h', &['g', 'y', 'u', 'j', 'n', 'b']),
        ('i', &['u', 'j', 'k', 'o']),
        ('j', &['h', 'u', 'i', 'k', 'm', 'n']),
        ('k', &['j', 'i', 'o', 'l', 'm']),
        ('l', &['k', 'o', 'p']),
        ('m', &['n', 'j', 'k']),
        ('n', &['b', 'h', 'j', 'm']),
        ('o', &['i', 'k', 'l', 'p']),
        ('p', &['o', 'l']),
        ('q', &['w', 'a']),
        ('r', &['e', 'd', 'f', 't']),
        ('s', &['a', 'w', 'e', 'd', 'x', 'z']),
        ('t', &['r', 'f', 'g', 'y']),
        ('u', &['y', 'h', 'j', 'i']),
        ('v', &['c', 'f', 'g', 'b']),
        ('w', &['q', 'a', 's', 'e']),
        ('x', &['z', 's', 'd', 'c']),
        ('y', &['t', 'g', 'h', 'u']),
        ('z', &['a', 's', 'x']),
        ('1', &['2', 'q']),
        ('2', &['1', '3', 'q', 'w']),
        ('3', &['2', '4', 'w', 'e']),
        ('4', &['3', '5', 'e', 'r']),
        ('5', &['4', '6', 'r', 't']),
        ('6', &['5', '7', 't', 'y']),
        ('7', &['6', '8', 'y', 'u']),
        ('8', &['7', '9', 'u', 'i']),
        ('9', &['8', '0', 'i', 'o']),
        ('0', &['9', 'o', 'p']),
    ];
    entries.into_iter().collect()
});

/// Character-level confusions that are not simple neighbour slips
pub static CHAR_CONFUSIONS: Lazy<HashMap<char, &'static [char]>> = Lazy::new(|| {
    let entries: [(char, &'static [char]); 10] = [
        ('m', &['n']),
        ('n', &['m']),
        ('b', &['v']),
        ('v', &['b']),
        ('i', &['o']),
        ('.', &[',']),
        (',', &['.']),
        (';', &[':']),
        ('\'', &['"']),
        ('-', &['_']),
    ];
    entries.into_iter().collect()
});

/// Whole-word misspellings; the substitute for position `k` of the word is
/// the `k`-th character of the misspelling when it differs
pub static WORD_CONFUSIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("the", "teh"),
        ("and", "adn"),
        ("that", "taht"),
        ("with", "wiht"),
        ("from", "form"),
        ("have", "ahve"),
        ("they", "tehy"),
        ("what", "waht"),
        ("their", "thier"),
        ("there", "tehre"),
        ("which", "whihc"),
        ("about", "abuot"),
        ("would", "woudl"),
        ("because", "becuase"),
        ("receive", "recieve"),
        ("just", "jsut"),
    ]
    .into_iter()
    .collect()
});

/// High-frequency English words typed faster than their letters suggest
pub static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not",
        "on", "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from",
        "they", "we", "say", "her", "she", "or", "an", "will", "my", "one", "all", "would",
        "there", "their", "what", "so", "up", "out", "if", "about", "who", "get", "which",
        "go", "me", "when", "make", "can", "like", "time", "no", "just", "him", "know",
        "take", "people", "into", "year", "your", "good", "some", "could", "them", "see",
        "other", "than", "then", "now", "look", "only", "come", "its", "over", "think",
        "also", "back", "after", "use", "two", "how", "our", "work", "first", "well", "way",
        "even", "new", "want", "any", "these", "give", "day", "most", "us", "is", "are",
        "was", "hello", "world", "yes", "ok", "thanks", "please",
    ]
    .into_iter()
    .collect()
});

const HOME_ROW: &str = "asdfghjkl";
const TOP_ROW: &str = "qwertyuiop";
const BOTTOM_ROW: &str = "zxcvbnm";

/// Static per-key difficulty multiplier based on keyboard row
///
/// Home row is fastest, bottom row, digits and punctuation slowest.
/// Uppercase letters share the difficulty of their lowercase key; the shift
/// cost is handled by the character-class multiplier.
pub fn key_difficulty(c: char) -> f64 {
    let base = c.to_ascii_lowercase();
    if base == ' ' {
        1.0
    } else if HOME_ROW.contains(base) {
        0.9
    } else if TOP_ROW.contains(base) {
        1.0
    } else if BOTTOM_ROW.contains(base) {
        1.1
    } else if base.is_ascii_digit() {
        1.15
    } else if base.is_ascii_punctuation() {
        1.2
    } else {
        1.0
    }
}

/// Keys adjacent to `c`, preserving its case
pub fn adjacent_keys(c: char) -> Vec<char> {
    let upper = c.is_ascii_uppercase();
    KEY_ADJACENCY
        .get(&c.to_ascii_lowercase())
        .map(|keys| {
            keys.iter()
                .map(|k| if upper { k.to_ascii_uppercase() } else { *k })
                .collect()
        })
        .unwrap_or_default()
}

/// Whether `word` (case-insensitive) is in the common-word set
pub fn is_common_word(word: &str) -> bool {
    COMMON_WORDS.contains(word.to_lowercase().as_str())
}

/// Sentence-ending punctuation
pub fn is_sentence_punctuation(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Lowercase vowels and their uppercase forms
pub fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

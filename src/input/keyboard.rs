//! Typing pattern planning
//!
//! Turns a string into a [`TypingPattern`]: one [`CharacterStep`] per input
//! character carrying its keystroke delay, whether it will be mistyped and
//! corrected, and any thinking pause taken before it.
//!
//! Delay composition for a character, applied in this order:
//! 1. base delay from the effective WPM (`60000 / (wpm * 5)`)
//! 2. character class (space, uppercase, digit, symbol)
//! 3. static key difficulty (keyboard row)
//! 4. context (word boundaries, sentence starts, common and long words)
//! 5. random variation (0.7 - 1.3, widened by fatigue)
//! 6. fatigue, always last
//!
//! # Example
//!
//! ```rust
//! use human_input::input::keyboard::{generate_pattern, TypingConfig};
//! use human_input::input::random::SeededRandom;
//!
//! let config = TypingConfig::default();
//! let mut rng = SeededRandom::from_seed(3);
//! let pattern = generate_pattern("Hello, World!", 45.0, &config, 0.0, &mut rng);
//! assert_eq!(pattern.len(), 13);
//! ```

use super::fatigue::{delay_factor, randomness_factor, speed_factor};
use super::random::RandomSource;
use super::tables::{is_common_word, is_sentence_punctuation, key_difficulty};
use super::timing::{base_char_delay_ms, DelayRange};
use super::typo::{is_symbol, should_mistype};
use super::InputError;
use serde::{Deserialize, Serialize};

/// Slowest effective typing speed the planner will produce
pub const MIN_WPM: f64 = 15.0;

/// Class multiplier for whitespace (thumb keys are fast)
const SPACE_MULTIPLIER: f64 = 0.8;

/// Half-width of the per-character variation band at zero fatigue
const VARIATION_SPREAD: f64 = 0.3;

/// Words longer than this are typed more slowly and invite pauses
const LONG_WORD_THRESHOLD: usize = 8;

/// Average word length above which the whole text is slowed down
const AVERAGE_WORD_THRESHOLD: f64 = 6.0;

const BOUNDARY_MULTIPLIER: f64 = 1.15;
const SENTENCE_START_MULTIPLIER: f64 = 1.5;
const COMMON_WORD_MULTIPLIER: f64 = 0.85;
const LONG_WORD_MULTIPLIER: f64 = 1.2;

/// Special keys that can be sent by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKey {
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
}

impl SpecialKey {
    /// Returns the key name for this special key
    pub fn key_code(&self) -> &'static str {
        match self {
            SpecialKey::Enter => "Enter",
            SpecialKey::Tab => "Tab",
            SpecialKey::Backspace => "Backspace",
            SpecialKey::Delete => "Delete",
            SpecialKey::Escape => "Escape",
            SpecialKey::ArrowUp => "ArrowUp",
            SpecialKey::ArrowDown => "ArrowDown",
            SpecialKey::ArrowLeft => "ArrowLeft",
            SpecialKey::ArrowRight => "ArrowRight",
            SpecialKey::Home => "Home",
            SpecialKey::End => "End",
            SpecialKey::PageUp => "PageUp",
            SpecialKey::PageDown => "PageDown",
        }
    }

    /// Key that produces a whitespace control character, if any
    pub fn for_char(c: char) -> Option<SpecialKey> {
        match c {
            '\n' | '\r' => Some(SpecialKey::Enter),
            '\t' => Some(SpecialKey::Tab),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpecialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key_code())
    }
}

impl std::str::FromStr for SpecialKey {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enter" | "return" => Ok(SpecialKey::Enter),
            "tab" => Ok(SpecialKey::Tab),
            "backspace" => Ok(SpecialKey::Backspace),
            "delete" | "del" => Ok(SpecialKey::Delete),
            "escape" | "esc" => Ok(SpecialKey::Escape),
            "arrowup" | "up" => Ok(SpecialKey::ArrowUp),
            "arrowdown" | "down" => Ok(SpecialKey::ArrowDown),
            "arrowleft" | "left" => Ok(SpecialKey::ArrowLeft),
            "arrowright" | "right" => Ok(SpecialKey::ArrowRight),
            "home" => Ok(SpecialKey::Home),
            "end" => Ok(SpecialKey::End),
            "pageup" => Ok(SpecialKey::PageUp),
            "pagedown" => Ok(SpecialKey::PageDown),
            _ => Err(InputError::InvalidKey { key: s.to_string() }),
        }
    }
}

/// Thinking pause settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingPauses {
    #[serde(default = "default_pauses_enabled")]
    pub enabled: bool,
    /// Base probability of pausing before a character
    #[serde(default = "default_pause_probability")]
    pub probability: f64,
    #[serde(default = "default_pause_duration")]
    pub duration: DelayRange,
}

fn default_pauses_enabled() -> bool {
    true
}

fn default_pause_probability() -> f64 {
    0.02
}

fn default_pause_duration() -> DelayRange {
    DelayRange::new(300, 1200)
}

impl Default for ThinkingPauses {
    fn default() -> Self {
        Self {
            enabled: default_pauses_enabled(),
            probability: default_pause_probability(),
            duration: default_pause_duration(),
        }
    }
}

/// Configuration for typing behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Nominal typing speed in words per minute
    #[serde(default = "default_wpm")]
    pub wpm: f64,
    /// Relative random WPM variation per call (0.15 = ±15%)
    #[serde(default = "default_wpm_variation")]
    pub wpm_variation: f64,
    /// Base probability of mistyping a character
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,
    /// Reaction delay between a typo and its correction
    #[serde(default = "default_correction_delay")]
    pub correction_delay: DelayRange,
    #[serde(default)]
    pub thinking_pauses: ThinkingPauses,
    /// Delay multiplier for uppercase letters
    #[serde(default = "default_capital_letter_delay")]
    pub capital_letter_delay: f64,
    /// Delay multiplier for digits
    #[serde(default = "default_number_delay")]
    pub number_delay: f64,
    /// Delay multiplier for punctuation and symbols
    #[serde(default = "default_symbol_delay")]
    pub symbol_delay: f64,
}

fn default_wpm() -> f64 {
    45.0
}

fn default_wpm_variation() -> f64 {
    0.15
}

fn default_error_rate() -> f64 {
    0.02
}

fn default_correction_delay() -> DelayRange {
    DelayRange::new(150, 400)
}

fn default_capital_letter_delay() -> f64 {
    1.3
}

fn default_number_delay() -> f64 {
    1.2
}

fn default_symbol_delay() -> f64 {
    1.4
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            wpm: default_wpm(),
            wpm_variation: default_wpm_variation(),
            error_rate: default_error_rate(),
            correction_delay: default_correction_delay(),
            thinking_pauses: ThinkingPauses::default(),
            capital_letter_delay: default_capital_letter_delay(),
            number_delay: default_number_delay(),
            symbol_delay: default_symbol_delay(),
        }
    }
}

/// Per-call overrides for [`TypingConfig`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeOptions {
    pub wpm: Option<f64>,
    pub error_rate: Option<f64>,
    pub thinking_pauses: Option<bool>,
}

impl TypeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wpm(mut self, wpm: f64) -> Self {
        self.wpm = Some(wpm);
        self
    }

    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = Some(error_rate);
        self
    }

    pub fn with_thinking_pauses(mut self, enabled: bool) -> Self {
        self.thinking_pauses = Some(enabled);
        self
    }

    /// The configuration with these overrides applied
    pub fn apply(&self, config: &TypingConfig) -> TypingConfig {
        let mut merged = config.clone();
        if let Some(wpm) = self.wpm {
            merged.wpm = wpm;
        }
        if let Some(error_rate) = self.error_rate {
            merged.error_rate = error_rate;
        }
        if let Some(enabled) = self.thinking_pauses {
            merged.thinking_pauses.enabled = enabled;
        }
        merged
    }
}

/// One planned unit of typing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterStep {
    /// The character that must end up in the text
    #[serde(rename = "char")]
    pub ch: char,
    /// Delay before the keystroke
    pub delay_ms: u64,
    /// Emit a wrong character first, then correct it
    pub is_error: bool,
    /// Thinking pause taken before this character (0 = none)
    pub pause_ms: u64,
}

/// Planned keystrokes for a text, one step per character
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TypingPattern {
    pub steps: Vec<CharacterStep>,
    /// Effective words per minute the delays were derived from
    pub wpm: f64,
}

impl TypingPattern {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CharacterStep> {
        self.steps.iter()
    }

    /// The characters of the planned text
    pub fn chars(&self) -> Vec<char> {
        self.steps.iter().map(|s| s.ch).collect()
    }

    /// Sum of keystroke delays and pauses, excluding correction costs
    pub fn planned_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.delay_ms + s.pause_ms).sum()
    }

    pub fn error_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_error).count()
    }

    pub fn pause_count(&self) -> usize {
        self.steps.iter().filter(|s| s.pause_ms > 0).count()
    }
}

/// Span `[start, end)` of the word containing each character, if any
fn word_spans(chars: &[char]) -> Vec<Option<(usize, usize)>> {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '\'';
    let mut spans = vec![None; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        if !is_word_char(chars[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && is_word_char(chars[i]) {
            i += 1;
        }
        for span in spans.iter_mut().take(i).skip(start) {
            *span = Some((start, i));
        }
    }
    spans
}

/// Whether `chars[index]` is the first non-whitespace character after a
/// sentence-ending punctuation mark
fn follows_sentence_end(chars: &[char], index: usize) -> bool {
    if chars[index].is_whitespace() {
        return false;
    }
    chars[..index]
        .iter()
        .rev()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| is_sentence_punctuation(*c))
}

/// Effective typing speed for a text
///
/// Random variation, a complexity penalty (share of uppercase, digit and
/// symbol characters, long average words), and a fatigue penalty, floored
/// at [`MIN_WPM`].
pub fn effective_wpm(
    chars: &[char],
    base_wpm: f64,
    config: &TypingConfig,
    fatigue: f64,
    rng: &mut dyn RandomSource,
) -> f64 {
    let variation = rng.range(-config.wpm_variation, config.wpm_variation);

    let complexity = if chars.is_empty() {
        1.0
    } else {
        let complex = chars
            .iter()
            .filter(|c| c.is_uppercase() || c.is_ascii_digit() || is_symbol(**c))
            .count();
        let complex_fraction = complex as f64 / chars.len() as f64;

        let text: String = chars.iter().collect();
        let words: Vec<&str> = text.split_whitespace().collect();
        let average_word = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
        };
        let length_penalty = ((average_word - AVERAGE_WORD_THRESHOLD).max(0.0) * 0.03).min(0.15);

        1.0 - complex_fraction * 0.3 - length_penalty
    };

    (base_wpm * (1.0 + variation) * complexity * speed_factor(fatigue)).max(MIN_WPM)
}

/// Character-class delay multiplier
pub fn char_class_multiplier(c: char, config: &TypingConfig) -> f64 {
    if c.is_whitespace() {
        SPACE_MULTIPLIER
    } else if c.is_uppercase() {
        config.capital_letter_delay
    } else if c.is_ascii_digit() {
        config.number_delay
    } else if is_symbol(c) {
        config.symbol_delay
    } else {
        1.0
    }
}

/// Contextual delay multiplier for `chars[index]`
pub fn context_multiplier(chars: &[char], index: usize) -> f64 {
    let spans = word_spans(chars);
    context_multiplier_with(chars, &spans, index)
}

fn context_multiplier_with(chars: &[char], spans: &[Option<(usize, usize)>], index: usize) -> f64 {
    let mut multiplier = 1.0;

    if let Some((start, end)) = spans[index] {
        if index == start || index + 1 == end {
            multiplier *= BOUNDARY_MULTIPLIER;
        }
        let word: String = chars[start..end].iter().collect();
        if is_common_word(&word) {
            multiplier *= COMMON_WORD_MULTIPLIER;
        }
        if end - start > LONG_WORD_THRESHOLD {
            multiplier *= LONG_WORD_MULTIPLIER;
        }
    }

    if follows_sentence_end(chars, index) {
        multiplier *= SENTENCE_START_MULTIPLIER;
    }

    multiplier
}

fn pause_probability(
    chars: &[char],
    spans: &[Option<(usize, usize)>],
    index: usize,
    config: &TypingConfig,
    fatigue: f64,
) -> f64 {
    let mut probability = config.thinking_pauses.probability;

    if follows_sentence_end(chars, index) {
        probability *= 4.0;
    } else if spans[index].is_some_and(|(start, end)| index == start || index + 1 == end) {
        probability *= 2.0;
    }

    if spans[index].is_some_and(|(start, end)| end - start > LONG_WORD_THRESHOLD) {
        probability *= 1.5;
    }

    (probability * randomness_factor(fatigue)).min(1.0)
}

/// Plans how `text` is typed
///
/// The pattern always has exactly one step per character of `text`;
/// errors and pauses only add execution-time cost.
pub fn generate_pattern(
    text: &str,
    base_wpm: f64,
    config: &TypingConfig,
    fatigue: f64,
    rng: &mut dyn RandomSource,
) -> TypingPattern {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return TypingPattern {
            steps: Vec::new(),
            wpm: base_wpm,
        };
    }

    let wpm = effective_wpm(&chars, base_wpm, config, fatigue, rng);
    let base = base_char_delay_ms(wpm);
    let fatigue_factor = delay_factor(fatigue);
    // Tired typists are less even: the variation band widens around 1.0
    let spread = VARIATION_SPREAD * randomness_factor(fatigue);
    let spans = word_spans(&chars);

    let steps = chars
        .iter()
        .enumerate()
        .map(|(index, &ch)| {
            let delay = base
                * char_class_multiplier(ch, config)
                * key_difficulty(ch)
                * context_multiplier_with(&chars, &spans, index)
                * rng.range(1.0 - spread, 1.0 + spread)
                * fatigue_factor;

            // Keys sent through `send_key` are never mistyped
            let is_error = SpecialKey::for_char(ch).is_none()
                && should_mistype(ch, config.error_rate, fatigue, rng);

            let pause_ms = if config.thinking_pauses.enabled
                && rng.chance(pause_probability(&chars, &spans, index, config, fatigue))
            {
                config.thinking_pauses.duration.sample(rng).max(1)
            } else {
                0
            };

            CharacterStep {
                ch,
                delay_ms: delay.round().max(1.0) as u64,
                is_error,
                pause_ms,
            }
        })
        .collect();

    TypingPattern { steps, wpm }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::random::{ScriptedRandom, SeededRandom};

    fn quiet_config() -> TypingConfig {
        TypingConfig {
            error_rate: 0.0,
            thinking_pauses: ThinkingPauses {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_special_key_from_str() {
        assert_eq!("enter".parse::<SpecialKey>(), Ok(SpecialKey::Enter));
        assert_eq!("ENTER".parse::<SpecialKey>(), Ok(SpecialKey::Enter));
        assert_eq!("Backspace".parse::<SpecialKey>(), Ok(SpecialKey::Backspace));
        assert!("invalid".parse::<SpecialKey>().is_err());
        assert_eq!(SpecialKey::for_char('\n'), Some(SpecialKey::Enter));
        assert_eq!(SpecialKey::for_char('a'), None);
    }

    #[test]
    fn test_pattern_length_matches_chars() {
        let config = TypingConfig {
            error_rate: 0.5,
            thinking_pauses: ThinkingPauses {
                enabled: true,
                probability: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut rng = SeededRandom::from_seed(21);
        for text in ["", "a", "héllo wörld", "Numbers 123 & symbols #!", "多言語テキスト"] {
            let pattern = generate_pattern(text, 60.0, &config, 0.7, &mut rng);
            assert_eq!(pattern.len(), text.chars().count());
            assert!(pattern.iter().all(|s| s.delay_ms >= 1));
        }
    }

    #[test]
    fn test_quiet_config_has_no_errors_or_pauses() {
        let mut rng = SeededRandom::from_seed(8);
        let pattern = generate_pattern("Hello, World!", 45.0, &quiet_config(), 1.0, &mut rng);
        assert_eq!(pattern.error_count(), 0);
        assert_eq!(pattern.pause_count(), 0);
    }

    #[test]
    fn test_effective_wpm_floor() {
        let config = TypingConfig::default();
        let chars: Vec<char> = "###".chars().collect();
        let wpm = effective_wpm(&chars, 1.0, &config, 1.0, &mut ScriptedRandom::constant(0.5));
        assert_eq!(wpm, MIN_WPM);
    }

    #[test]
    fn test_effective_wpm_complexity() {
        let config = TypingConfig::default();
        let mut rng = ScriptedRandom::constant(0.5);
        let plain: Vec<char> = "hello there".chars().collect();
        let complex: Vec<char> = "HELLO #1234".chars().collect();
        let plain_wpm = effective_wpm(&plain, 60.0, &config, 0.0, &mut rng);
        let complex_wpm = effective_wpm(&complex, 60.0, &config, 0.0, &mut rng);
        assert!((plain_wpm - 60.0).abs() < 1e-9);
        assert!(complex_wpm < plain_wpm);
    }

    #[test]
    fn test_class_multipliers() {
        let config = TypingConfig::default();
        assert!(char_class_multiplier(' ', &config) < 1.0);
        assert_eq!(char_class_multiplier('A', &config), config.capital_letter_delay);
        assert_eq!(char_class_multiplier('4', &config), config.number_delay);
        assert_eq!(char_class_multiplier('%', &config), config.symbol_delay);
        assert_eq!(char_class_multiplier('q', &config), 1.0);
    }

    #[test]
    fn test_context_multipliers() {
        let chars: Vec<char> = "Stop. Now extraordinary".chars().collect();
        // 'N' starts a sentence, starts a word and "now" is common
        let n = context_multiplier(&chars, 6);
        assert!((n - BOUNDARY_MULTIPLIER * COMMON_WORD_MULTIPLIER * SENTENCE_START_MULTIPLIER).abs() < 1e-12);
        // interior of a long uncommon word
        let x = context_multiplier(&chars, 12);
        assert!((x - LONG_WORD_MULTIPLIER).abs() < 1e-12);
        // the space after the period is not itself a sentence start
        assert_eq!(context_multiplier(&chars, 5), 1.0);
    }

    #[test]
    fn test_forced_error_marks_step() {
        let config = TypingConfig {
            error_rate: 1.0,
            thinking_pauses: ThinkingPauses {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let pattern = generate_pattern("a", 45.0, &config, 0.0, &mut ScriptedRandom::constant(0.5));
        assert_eq!(pattern.len(), 1);
        assert!(pattern.steps[0].is_error);
        assert_eq!(pattern.steps[0].pause_ms, 0);
    }

    #[test]
    fn test_special_keys_never_mistyped() {
        let config = TypingConfig {
            error_rate: 1.0,
            ..Default::default()
        };
        let pattern = generate_pattern("a\tb\n", 45.0, &config, 0.0, &mut ScriptedRandom::constant(0.5));
        let flags: Vec<bool> = pattern.iter().map(|s| s.is_error).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn test_pause_boost_after_sentence() {
        let config = TypingConfig {
            thinking_pauses: ThinkingPauses {
                enabled: true,
                probability: 0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        let chars: Vec<char> = "End. Next".chars().collect();
        let spans = word_spans(&chars);
        let sentence = pause_probability(&chars, &spans, 5, &config, 0.0);
        let interior = pause_probability(&chars, &spans, 6, &config, 0.0);
        assert!((sentence - 0.4).abs() < 1e-12);
        assert!((interior - 0.1).abs() < 1e-12);

        let word_start = pause_probability(&chars, &spans, 0, &config, 0.0);
        let word_end = pause_probability(&chars, &spans, 2, &config, 0.0);
        let last_char = pause_probability(&chars, &spans, 8, &config, 0.0);
        assert!((word_start - 0.2).abs() < 1e-12);
        assert!((word_end - 0.2).abs() < 1e-12);
        assert!((last_char - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_fatigue_widens_variation() {
        let config = TypingConfig {
            wpm_variation: 0.0,
            error_rate: 0.0,
            thinking_pauses: ThinkingPauses {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let band = |fatigue: f64| {
            let low = generate_pattern("go", 45.0, &config, fatigue, &mut ScriptedRandom::constant(0.0));
            let high = generate_pattern("go", 45.0, &config, fatigue, &mut ScriptedRandom::constant(0.999));
            high.steps[0].delay_ms as f64 / low.steps[0].delay_ms as f64
        };

        // 1.3 / 0.7 when rested, 1.45 / 0.55 when exhausted
        let rested = band(0.0);
        let tired = band(1.0);
        assert!((rested - 1.857).abs() < 0.03, "rested band {}", rested);
        assert!((tired - 2.63).abs() < 0.04, "tired band {}", tired);
    }

    #[test]
    fn test_type_options_apply() {
        let config = TypingConfig::default();
        let merged = TypeOptions::new()
            .with_wpm(90.0)
            .with_error_rate(0.0)
            .with_thinking_pauses(false)
            .apply(&config);
        assert_eq!(merged.wpm, 90.0);
        assert_eq!(merged.error_rate, 0.0);
        assert!(!merged.thinking_pauses.enabled);
        assert_eq!(merged.symbol_delay, config.symbol_delay);
    }
}

//! services/api/src/adapters/lexicon.rs
//!
//! A lexicon-based polarity scorer. It implements the `PolarityScorer` port from
//! the `core` crate.
//!
//! Every word found in the lexicon contributes its polarity. An intensifier
//! directly before a word scales it, a negator directly before a word flips and
//! halves it. The text's polarity is the mean of all contributions.

use feelscope_core::ports::PolarityScorer;
use regex::Regex;
use std::collections::HashMap;

const WORD_POLARITY: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("angry", -0.5),
    ("annoying", -0.8),
    ("awesome", 1.0),
    ("awful", -1.0),
    ("bad", -0.7),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("boring", -1.0),
    ("broken", -0.4),
    ("cool", 0.35),
    ("crazy", -0.6),
    ("disappointing", -0.6),
    ("disgusting", -1.0),
    ("easy", 0.43),
    ("enjoy", 0.4),
    ("excellent", 1.0),
    ("excited", 0.375),
    ("fantastic", 0.4),
    ("favorite", 0.5),
    ("fun", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("hard", -0.29),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("interesting", 0.5),
    ("love", 0.5),
    ("lovely", 0.5),
    ("nasty", -1.0),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("poor", -0.4),
    ("sad", -0.5),
    ("scary", -0.5),
    ("sick", -0.71),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("useless", -0.5),
    ("weird", -0.5),
    ("wonderful", 1.0),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("really", 1.3),
    ("super", 1.3),
    ("very", 1.3),
];

const NEGATORS: &[&str] = &["cannot", "never", "no", "not"];

/// Scale applied to a negated word's polarity.
const NEGATION_FACTOR: f64 = -0.5;

pub struct LexiconPolarityAdapter {
    words: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    token: Regex,
}

impl LexiconPolarityAdapter {
    pub fn new() -> Self {
        Self {
            words: WORD_POLARITY.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
            token: Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("static token pattern is valid"),
        }
    }

    fn is_negator(word: &str) -> bool {
        NEGATORS.contains(&word) || word.ends_with("n't")
    }
}

impl Default for LexiconPolarityAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconPolarityAdapter {
    fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let mut scores = Vec::new();
        let mut intensity = 1.0;
        let mut negated = false;

        for token in self.token.find_iter(&lowered) {
            let word = token.as_str();
            if Self::is_negator(word) {
                negated = true;
                continue;
            }
            if let Some(&factor) = self.intensifiers.get(word) {
                intensity = factor;
                continue;
            }
            if let Some(&polarity) = self.words.get(word) {
                let mut score = polarity * intensity;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
            }
            intensity = 1.0;
            negated = false;
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

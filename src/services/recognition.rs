//! Simulated pronunciation checking and object scanning.
//!
//! Neither recognizer looks at real audio or images: a weighted coin decides
//! whether the attempt "succeeds", and a plausible wrong reading is made up
//! otherwise.

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::Serialize;

use crate::db::operations::words::Word;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recognition {
    pub recognized: String,
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

pub trait Recognizer: Send + Sync {
    fn recognize(&self, target: &Word, pool: &[Word], rng: &mut dyn RngCore) -> Recognition;
}

#[derive(Debug, Clone, Copy)]
pub struct VoiceRecognizer {
    success_rate: f64,
}

impl VoiceRecognizer {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

impl Recognizer for VoiceRecognizer {
    fn recognize(&self, target: &Word, _pool: &[Word], rng: &mut dyn RngCore) -> Recognition {
        if rng.random_bool(self.success_rate) {
            return Recognition {
                recognized: target.word.clone(),
                correct: true,
                confidence: None,
            };
        }

        Recognition {
            recognized: mishear(&target.word, rng),
            correct: false,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArScanner {
    success_rate: f64,
}

impl ArScanner {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

impl Recognizer for ArScanner {
    fn recognize(&self, target: &Word, pool: &[Word], rng: &mut dyn RngCore) -> Recognition {
        if rng.random_bool(self.success_rate) {
            return Recognition {
                recognized: target.word.clone(),
                correct: true,
                confidence: Some(rng.random_range(80.0..100.0)),
            };
        }

        let others: Vec<&str> = pool
            .iter()
            .filter(|word| word.word != target.word)
            .map(|word| word.word.as_str())
            .collect();
        let recognized = match others.choose(rng) {
            Some(other) => other.to_string(),
            None => format!("{}s", target.word),
        };

        Recognition {
            recognized,
            correct: false,
            confidence: Some(rng.random_range(40.0..80.0)),
        }
    }
}

/// A one-letter corruption of `word`: either a dropped letter or a letter
/// swapped for a different one. Never returns `word` itself.
pub fn mishear<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    if letters.is_empty() {
        return "?".to_string();
    }

    let index = rng.random_range(0..letters.len());
    if letters.len() > 1 && rng.random_bool(0.5) {
        letters.remove(index);
    } else {
        let original = letters[index];
        let replacement = loop {
            let candidate = ALPHABET[rng.random_range(0..ALPHABET.len())] as char;
            if candidate != original {
                break candidate;
            }
        };
        letters[index] = replacement;
    }

    letters.into_iter().collect()
}

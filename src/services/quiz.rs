use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::db::operations::words::Word;

/// Number of wrong answers offered next to the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub word_id: String,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub options: Vec<String>,
    #[serde(skip)]
    pub answer: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.answer
    }
}

/// Shuffled copy of `words`, truncated to `size`.
pub fn select_quiz_words<R: Rng + ?Sized>(words: &[Word], size: usize, rng: &mut R) -> Vec<Word> {
    let mut selected = words.to_vec();
    selected.shuffle(rng);
    selected.truncate(size);
    selected
}

/// The correct meaning plus up to three distinct wrong meanings drawn from
/// `pool`, shuffled. A wrong meaning never equals the correct one, so exactly
/// one option is right.
pub fn generate_options<R: Rng + ?Sized>(pool: &[Word], target: &Word, rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut distractors: Vec<&str> = pool
        .iter()
        .filter(|word| word.id != target.id && word.meaning != target.meaning)
        .map(|word| word.meaning.as_str())
        .filter(|meaning| seen.insert(*meaning))
        .collect();

    distractors.shuffle(rng);
    distractors.truncate(DISTRACTOR_COUNT);

    let mut options: Vec<String> = distractors.into_iter().map(str::to_string).collect();
    options.push(target.meaning.clone());
    options.shuffle(rng);
    options
}

pub fn build_questions<R: Rng + ?Sized>(
    selected: &[Word],
    pool: &[Word],
    rng: &mut R,
) -> Vec<QuizQuestion> {
    selected
        .iter()
        .map(|word| QuizQuestion {
            word_id: word.id.clone(),
            word: word.word.clone(),
            context: word.context.clone(),
            options: generate_options(pool, word, rng),
            answer: word.meaning.clone(),
        })
        .collect()
}

use std::time::{Duration, Instant};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::operations::words::{ReviewOutcome, Word};
use crate::services::progress::{percentage, FeedbackTier};
use crate::services::quiz::{build_questions, select_quiz_words, QuizQuestion};
use crate::services::recognition::{ArScanner, Recognition, Recognizer, VoiceRecognizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    Learning,
    Quiz,
    Voice,
    Ar,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Answer {
    Know,
    StillLearning,
    Choose {
        option: String,
    },
    #[serde(rename_all = "camelCase")]
    Attempt {
        #[serde(default)]
        image_uri: Option<String>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("list has no words to study")]
    EmptyList,
    #[error("session is already complete")]
    AlreadyComplete,
    #[error("session is not complete yet")]
    NotComplete,
    #[error("answer kind does not match {0:?} mode")]
    WrongAnswerKind(StudyMode),
    #[error("only learning sessions can reveal a meaning")]
    RevealUnsupported,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CurrentStep {
    #[serde(rename_all = "camelCase")]
    Card {
        word_id: String,
        word: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        meaning: Option<String>,
    },
    Question(QuizQuestion),
    #[serde(rename_all = "camelCase")]
    Prompt {
        word_id: String,
        word: String,
        meaning: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub list_id: String,
    pub mode: StudyMode,
    pub index: usize,
    pub total: usize,
    pub progress_percent: u8,
    pub score: usize,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentStep>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StepOutcome {
    #[serde(rename_all = "camelCase")]
    Learning {
        word_id: String,
        known: bool,
        newly_learned: bool,
        meaning: String,
    },
    #[serde(rename_all = "camelCase")]
    Quiz {
        word_id: String,
        selected: String,
        correct: bool,
        correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    Recognition {
        word_id: String,
        expected: String,
        #[serde(flatten)]
        recognition: Recognition,
        #[serde(skip_serializing_if = "Option::is_none")]
        image_uri: Option<String>,
    },
}

/// What the caller has to persist after a step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub outcome: StepOutcome,
    pub review: Option<(String, ReviewOutcome)>,
    /// True exactly once per pass, on the step that finishes the deck.
    pub completed_now: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub mode: StudyMode,
    pub score: usize,
    pub total: usize,
    pub percentage: u8,
    pub tier: FeedbackTier,
    pub message: &'static str,
}

/// One linear pass over a deck of words: an index, a score and a reveal flag.
#[derive(Debug, Clone)]
pub struct StudySession {
    pub id: String,
    pub user_id: String,
    pub list_id: String,
    pub mode: StudyMode,
    deck: Vec<Word>,
    pool: Vec<Word>,
    questions: Vec<QuizQuestion>,
    quiz_size: usize,
    success_rate: f64,
    index: usize,
    score: usize,
    revealed: bool,
    completion_recorded: bool,
    last_touched: Instant,
}

impl StudySession {
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng + ?Sized>(
        id: String,
        user_id: String,
        list_id: String,
        mode: StudyMode,
        pool: Vec<Word>,
        quiz_size: usize,
        success_rate: f64,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if pool.is_empty() {
            return Err(SessionError::EmptyList);
        }

        let mut session = Self {
            id,
            user_id,
            list_id,
            mode,
            deck: Vec::new(),
            pool,
            questions: Vec::new(),
            quiz_size: quiz_size.max(1),
            success_rate,
            index: 0,
            score: 0,
            revealed: false,
            completion_recorded: false,
            last_touched: Instant::now(),
        };
        session.deal(rng);
        Ok(session)
    }

    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.mode {
            StudyMode::Quiz => {
                self.deck = select_quiz_words(&self.pool, self.quiz_size, rng);
                self.questions = build_questions(&self.deck, &self.pool, rng);
            }
            _ => {
                self.deck = self.pool.clone();
                self.questions.clear();
            }
        }
    }

    pub fn total(&self) -> usize {
        self.deck.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.deck.len()
    }

    pub fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched.elapsed()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            list_id: self.list_id.clone(),
            mode: self.mode,
            index: self.index,
            total: self.total(),
            progress_percent: percentage(self.index as i64, self.total() as i64),
            score: self.score,
            complete: self.is_complete(),
            current: self.current_step(),
        }
    }

    fn current_step(&self) -> Option<CurrentStep> {
        let word = self.deck.get(self.index)?;
        let step = match self.mode {
            StudyMode::Learning => CurrentStep::Card {
                word_id: word.id.clone(),
                word: word.word.clone(),
                context: word.context.clone(),
                meaning: self.revealed.then(|| word.meaning.clone()),
            },
            StudyMode::Quiz => CurrentStep::Question(self.questions.get(self.index)?.clone()),
            StudyMode::Voice | StudyMode::Ar => CurrentStep::Prompt {
                word_id: word.id.clone(),
                word: word.word.clone(),
                meaning: word.meaning.clone(),
                context: word.context.clone(),
            },
        };
        Some(step)
    }

    pub fn reveal(&mut self) -> Result<(), SessionError> {
        if self.mode != StudyMode::Learning {
            return Err(SessionError::RevealUnsupported);
        }
        if self.is_complete() {
            return Err(SessionError::AlreadyComplete);
        }
        self.revealed = true;
        Ok(())
    }

    pub fn answer(&mut self, answer: Answer, rng: &mut dyn RngCore) -> Result<StepResult, SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadyComplete);
        }

        let (outcome, review) = match (self.mode, answer) {
            (StudyMode::Learning, Answer::Know) => {
                let word = &mut self.deck[self.index];
                let newly_learned = !word.progress.learned;
                word.progress.learned = true;
                if newly_learned {
                    self.score += 1;
                }
                (
                    StepOutcome::Learning {
                        word_id: word.id.clone(),
                        known: true,
                        newly_learned,
                        meaning: word.meaning.clone(),
                    },
                    Some((
                        word.id.clone(),
                        ReviewOutcome {
                            correct: true,
                            mark_learned: true,
                        },
                    )),
                )
            }
            (StudyMode::Learning, Answer::StillLearning) => {
                let word = &self.deck[self.index];
                (
                    StepOutcome::Learning {
                        word_id: word.id.clone(),
                        known: false,
                        newly_learned: false,
                        meaning: word.meaning.clone(),
                    },
                    None,
                )
            }
            (StudyMode::Quiz, Answer::Choose { option }) => {
                let question = &self.questions[self.index];
                let correct = question.is_correct(&option);
                if correct {
                    self.score += 1;
                }
                (
                    StepOutcome::Quiz {
                        word_id: question.word_id.clone(),
                        selected: option,
                        correct,
                        correct_answer: question.answer.clone(),
                    },
                    Some((
                        question.word_id.clone(),
                        ReviewOutcome {
                            correct,
                            mark_learned: false,
                        },
                    )),
                )
            }
            (mode @ (StudyMode::Voice | StudyMode::Ar), Answer::Attempt { image_uri }) => {
                let voice = VoiceRecognizer::new(self.success_rate);
                let scanner = ArScanner::new(self.success_rate);
                let recognizer: &dyn Recognizer = if mode == StudyMode::Voice {
                    &voice
                } else {
                    &scanner
                };

                let word = &self.deck[self.index];
                let recognition = recognizer.recognize(word, &self.pool, rng);
                if recognition.correct {
                    self.score += 1;
                }
                (
                    StepOutcome::Recognition {
                        word_id: word.id.clone(),
                        expected: word.word.clone(),
                        recognition,
                        image_uri: image_uri.filter(|_| mode == StudyMode::Ar),
                    },
                    None,
                )
            }
            (mode, _) => return Err(SessionError::WrongAnswerKind(mode)),
        };

        self.index += 1;
        self.revealed = false;

        let completed_now = self.is_complete() && !self.completion_recorded;
        if completed_now {
            self.completion_recorded = true;
        }

        Ok(StepResult {
            outcome,
            review,
            completed_now,
        })
    }

    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        // Learned flags set during the previous pass carry over, so a known
        // word is not counted twice.
        if self.mode == StudyMode::Learning {
            for word in &mut self.pool {
                if let Some(seen) = self.deck.iter().find(|w| w.id == word.id) {
                    word.progress.learned = seen.progress.learned;
                }
            }
        }
        self.index = 0;
        self.score = 0;
        self.revealed = false;
        self.completion_recorded = false;
        self.deal(rng);
    }

    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::NotComplete);
        }
        let percentage = percentage(self.score as i64, self.total() as i64);
        let tier = FeedbackTier::from_percentage(percentage);
        Ok(SessionSummary {
            mode: self.mode,
            score: self.score,
            total: self.total(),
            percentage,
            tier,
            message: tier.message_for(self.mode),
        })
    }
}

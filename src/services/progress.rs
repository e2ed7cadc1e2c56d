use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::operations::lists::WordList;
use crate::services::study_session::StudyMode;

/// `round(part / total * 100)` clamped to `0..=100`; an empty total is 0%.
pub fn percentage(part: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }
    let ratio = part as f64 / total as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackTier {
    Excellent,
    Good,
    KeepPracticing,
}

impl FeedbackTier {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            _ => Self::KeepPracticing,
        }
    }

    /// Voice and AR sessions have their own wording; learning and quiz share one.
    pub fn message_for(self, mode: StudyMode) -> &'static str {
        match (mode, self) {
            (StudyMode::Voice, Self::Excellent) => "Excellent pronunciation!",
            (StudyMode::Voice, Self::KeepPracticing) => "Keep practicing your pronunciation.",
            (StudyMode::Ar, Self::Excellent) => "Excellent object recognition!",
            (StudyMode::Ar, Self::KeepPracticing) => "Keep practicing with real objects.",
            (StudyMode::Voice | StudyMode::Ar, Self::Good) => "Good job! Keep practicing.",
            (_, Self::Excellent) => "Excellent! Keep up the good work!",
            (_, Self::Good) => "Good job! Practice more to improve.",
            (_, Self::KeepPracticing) => "Keep practicing! You'll get better.",
        }
    }
}

/// Daily streak after activity at `now`: consecutive days extend it, the same
/// day keeps it, any gap restarts at 1.
pub fn next_streak(last_activity: Option<DateTime<Utc>>, streak: i64, now: DateTime<Utc>) -> i64 {
    let Some(last) = last_activity else {
        return 1;
    };

    let days = (now.date_naive() - last.date_naive()).num_days();
    match days {
        0 => streak.max(1),
        1 => streak.max(0) + 1,
        _ => 1,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProgressSummary {
    pub id: String,
    pub name: String,
    pub word_count: i64,
    pub learned_words: i64,
    pub percentage: u8,
    pub last_studied: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverview {
    pub total_words: i64,
    pub learned_words: i64,
    pub percentage: u8,
    pub lists: Vec<ListProgressSummary>,
}

pub fn overview(lists: &[WordList]) -> ProgressOverview {
    let summaries: Vec<ListProgressSummary> = lists
        .iter()
        .map(|list| ListProgressSummary {
            id: list.id.clone(),
            name: list.name.clone(),
            word_count: list.word_count,
            learned_words: list.progress.learned_words,
            percentage: percentage(list.progress.learned_words, list.word_count),
            last_studied: list.progress.last_studied.clone(),
        })
        .collect();

    let total_words = summaries.iter().map(|s| s.word_count).sum();
    let learned_words = summaries.iter().map(|s| s.learned_words).sum();

    ProgressOverview {
        total_words,
        learned_words,
        percentage: percentage(learned_words, total_words),
        lists: summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    use crate::db::operations::lists::ListProgress;

    fn list(name: &str, word_count: i64, learned: i64) -> WordList {
        WordList {
            id: format!("id-{name}"),
            user_id: "u1".to_string(),
            name: name.to_string(),
            description: String::new(),
            language: "English".to_string(),
            source: String::new(),
            word_count,
            progress: ListProgress {
                learned_words: learned,
                last_studied: None,
            },
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(10, 10), 100);
    }

    #[test]
    fn percentage_clamps_inconsistent_counts() {
        assert_eq!(percentage(12, 10), 100);
        assert_eq!(percentage(-3, 10), 0);
    }

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(FeedbackTier::from_percentage(100), FeedbackTier::Excellent);
        assert_eq!(FeedbackTier::from_percentage(80), FeedbackTier::Excellent);
        assert_eq!(FeedbackTier::from_percentage(79), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_percentage(60), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_percentage(59), FeedbackTier::KeepPracticing);
        assert_eq!(FeedbackTier::from_percentage(0), FeedbackTier::KeepPracticing);
    }

    #[test]
    fn feedback_wording_depends_on_mode() {
        assert_eq!(
            FeedbackTier::Excellent.message_for(StudyMode::Learning),
            "Excellent! Keep up the good work!"
        );
        assert_eq!(
            FeedbackTier::Good.message_for(StudyMode::Quiz),
            "Good job! Practice more to improve."
        );
        assert_eq!(FeedbackTier::Excellent.message_for(StudyMode::Voice), "Excellent pronunciation!");
        assert_eq!(FeedbackTier::Good.message_for(StudyMode::Voice), "Good job! Keep practicing.");
        assert_eq!(
            FeedbackTier::KeepPracticing.message_for(StudyMode::Voice),
            "Keep practicing your pronunciation."
        );
        assert_eq!(
            FeedbackTier::Excellent.message_for(StudyMode::Ar),
            "Excellent object recognition!"
        );
        assert_eq!(FeedbackTier::Good.message_for(StudyMode::Ar), "Good job! Keep practicing.");
        assert_eq!(
            FeedbackTier::KeepPracticing.message_for(StudyMode::Ar),
            "Keep practicing with real objects."
        );
    }

    #[test]
    fn streak_extends_on_consecutive_days() {
        let day1 = Utc.with_ymd_and_hms(2026, 3, 1, 22, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 3, 2, 7, 30, 0).unwrap();
        let day4 = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();

        assert_eq!(next_streak(None, 0, day1), 1);
        assert_eq!(next_streak(Some(day1), 1, day1), 1);
        assert_eq!(next_streak(Some(day1), 0, day1), 1);
        assert_eq!(next_streak(Some(day1), 1, day2), 2);
        assert_eq!(next_streak(Some(day2), 2, day4), 1);
    }

    #[test]
    fn overview_sums_list_counters() {
        let lists = vec![list("a", 10, 5), list("b", 0, 0), list("c", 6, 6)];
        let view = overview(&lists);
        assert_eq!(view.total_words, 16);
        assert_eq!(view.learned_words, 11);
        assert_eq!(view.percentage, 69);
        assert_eq!(view.lists[0].percentage, 50);
        assert_eq!(view.lists[1].percentage, 0);
        assert_eq!(view.lists[2].percentage, 100);
    }

    proptest! {
        #[test]
        fn percentage_stays_in_range(part in -1_000i64..10_000, total in -10i64..10_000) {
            let value = percentage(part, total);
            prop_assert!(value <= 100);
            if total > 0 && part >= 0 && part <= total {
                let expected = ((part as f64 / total as f64) * 100.0).round() as u8;
                prop_assert_eq!(value, expected);
            }
        }
    }
}

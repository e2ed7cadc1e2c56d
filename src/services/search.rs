use serde::{Deserialize, Serialize};

use crate::db::operations::lists::WordList;
use crate::db::operations::words::Word;

pub const MAX_RECENT_SEARCHES: usize = 5;
/// Queries at or below this length are not remembered.
pub const MIN_REMEMBERED_QUERY_LEN: usize = 2;
pub const UNKNOWN_LIST_NAME: &str = "Unknown List";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    #[default]
    All,
    Lists,
    Words,
}

impl SearchFilter {
    fn includes_lists(self) -> bool {
        matches!(self, Self::All | Self::Lists)
    }

    fn includes_words(self) -> bool {
        matches!(self, Self::All | Self::Words)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SearchResult {
    #[serde(rename_all = "camelCase")]
    List {
        id: String,
        name: String,
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    Word {
        id: String,
        name: String,
        description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        list_id: String,
        list_name: String,
    },
}

/// Normalized form of a raw query; `None` when nothing is left to search for.
pub fn normalize_query(raw: &str) -> Option<String> {
    let query = raw.trim().to_lowercase();
    (!query.is_empty()).then_some(query)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Case-insensitive substring search; `query` must already be normalized.
pub fn search(lists: &[WordList], words: &[Word], query: &str, filter: SearchFilter) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if filter.includes_lists() {
        results.extend(
            lists
                .iter()
                .filter(|list| contains(&list.name, query) || contains(&list.description, query))
                .map(|list| SearchResult::List {
                    id: list.id.clone(),
                    name: list.name.clone(),
                    description: list.description.clone(),
                }),
        );
    }

    if filter.includes_words() {
        results.extend(
            words
                .iter()
                .filter(|word| {
                    contains(&word.word, query)
                        || contains(&word.meaning, query)
                        || word.context.as_deref().is_some_and(|c| contains(c, query))
                })
                .map(|word| SearchResult::Word {
                    id: word.id.clone(),
                    name: word.word.clone(),
                    description: word.meaning.clone(),
                    context: word.context.clone(),
                    list_id: word.list_id.clone(),
                    list_name: lists
                        .iter()
                        .find(|list| list.id == word.list_id)
                        .map(|list| list.name.clone())
                        .unwrap_or_else(|| UNKNOWN_LIST_NAME.to_string()),
                }),
        );
    }

    results
}

/// Newest-first recent searches with `query` pushed to the front.
pub fn push_recent(mut recent: Vec<String>, query: &str) -> Vec<String> {
    if query.chars().count() <= MIN_REMEMBERED_QUERY_LEN || recent.iter().any(|q| q == query) {
        return recent;
    }
    recent.insert(0, query.to_string());
    recent.truncate(MAX_RECENT_SEARCHES);
    recent
}

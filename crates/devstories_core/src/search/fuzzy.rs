//! Fuzzy field matcher backed by `strsim` edit distance.
//!
//! Each field is scored as the best normalized Levenshtein distance between
//! the query and any same-length window of the field. Scores lie in `[0, 1]`
//! with `0` a perfect match; an article matches when its best field score is
//! within the threshold.
//!
//! Windows are pre-filtered by character overlap: an equal-length window
//! needs at least one edit per query char it cannot supply, so only windows
//! whose bound beats both the threshold and the best distance so far reach
//! `strsim`.

use crate::model::article::Article;
use std::collections::HashMap;
use std::sync::Arc;

/// Article field an index covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKey {
    Title,
    Excerpt,
    Content,
    Author,
    Category,
}

impl SearchKey {
    fn extract(self, article: &Article) -> &str {
        match self {
            Self::Title => &article.title,
            Self::Excerpt => &article.excerpt,
            Self::Content => &article.content,
            Self::Author => &article.author,
            Self::Category => article.category.as_str(),
        }
    }
}

/// Matching behavior for a [`SearchIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Maximum accepted score; `0.0` requires an exact substring.
    pub threshold: f64,
    pub keys: Vec<SearchKey>,
    /// Queries shorter than this (in chars, after trimming) are not searched.
    pub min_match_chars: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            keys: vec![
                SearchKey::Title,
                SearchKey::Excerpt,
                SearchKey::Content,
                SearchKey::Author,
                SearchKey::Category,
            ],
            min_match_chars: 2,
        }
    }
}

impl SearchOptions {
    /// Whether `query` activates matching.
    pub fn is_searching(&self, query: &str) -> bool {
        let trimmed = query.trim();
        !trimmed.is_empty() && trimmed.chars().count() >= self.min_match_chars
    }
}

/// One ranked match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub article: Article,
    pub score: f64,
}

/// Lowercased query plus what every field comparison needs.
struct Pattern {
    text: String,
    len: usize,
    counts: HashMap<char, usize>,
    /// Largest edit distance that still scores within the threshold.
    max_distance: Option<usize>,
}

impl Pattern {
    fn new(query: &str, threshold: f64) -> Self {
        let text = query.trim().to_lowercase();
        let mut counts = HashMap::new();
        for ch in text.chars() {
            *counts.entry(ch).or_insert(0) += 1;
        }
        let len = text.chars().count();
        let max_distance = (0..=len)
            .take_while(|distance| normalized(*distance, len) <= threshold)
            .last();
        Self {
            text,
            len,
            counts,
            max_distance,
        }
    }
}

/// Multiset overlap between the pattern and a sliding window.
struct WindowOverlap {
    /// `(wanted, held)` per pattern char.
    slots: HashMap<char, (usize, usize)>,
    matched: usize,
}

impl WindowOverlap {
    fn new(counts: &HashMap<char, usize>) -> Self {
        Self {
            slots: counts.iter().map(|(ch, wanted)| (*ch, (*wanted, 0))).collect(),
            matched: 0,
        }
    }

    fn push(&mut self, ch: char) {
        if let Some((wanted, held)) = self.slots.get_mut(&ch) {
            if *held < *wanted {
                self.matched += 1;
            }
            *held += 1;
        }
    }

    fn pop(&mut self, ch: char) {
        if let Some((wanted, held)) = self.slots.get_mut(&ch) {
            *held -= 1;
            if *held < *wanted {
                self.matched -= 1;
            }
        }
    }
}

struct IndexedField {
    text: String,
    chars: Vec<char>,
    /// Byte offset of every char boundary, including `text.len()`.
    boundaries: Vec<usize>,
}

impl IndexedField {
    fn new(raw: &str) -> Self {
        let text = raw.to_lowercase();
        let chars: Vec<char> = text.chars().collect();
        let mut boundaries: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        boundaries.push(text.len());
        Self {
            text,
            chars,
            boundaries,
        }
    }

    /// Normalized best distance, or `1.0` when no window is within the
    /// threshold.
    fn score(&self, pattern: &Pattern) -> f64 {
        if self.text.contains(&pattern.text) {
            return 0.0;
        }
        let Some(max_distance) = pattern.max_distance else {
            return 1.0;
        };

        let field_len = self.chars.len();
        if field_len <= pattern.len {
            if pattern.len - field_len > max_distance {
                return 1.0;
            }
            let distance = strsim::levenshtein(&pattern.text, &self.text);
            return within(distance, max_distance, pattern.len);
        }

        let mut overlap = WindowOverlap::new(&pattern.counts);
        for ch in &self.chars[..pattern.len] {
            overlap.push(*ch);
        }

        let mut best = max_distance + 1;
        for start in 0..=(field_len - pattern.len) {
            if start > 0 {
                overlap.pop(self.chars[start - 1]);
                overlap.push(self.chars[start + pattern.len - 1]);
            }
            if pattern.len - overlap.matched >= best {
                continue;
            }
            let window = &self.text[self.boundaries[start]..self.boundaries[start + pattern.len]];
            best = best.min(strsim::levenshtein(&pattern.text, window));
            // Distance 0 was ruled out by the substring check.
            if best == 1 {
                break;
            }
        }
        within(best, max_distance, pattern.len)
    }
}

fn within(distance: usize, max_distance: usize, pattern_len: usize) -> f64 {
    if distance > max_distance {
        1.0
    } else {
        normalized(distance, pattern_len)
    }
}

fn normalized(distance: usize, pattern_len: usize) -> f64 {
    (distance as f64 / pattern_len as f64).min(1.0)
}

/// Immutable index built from one article snapshot.
pub struct SearchIndex {
    source: Arc<Vec<Article>>,
    entries: Vec<Vec<IndexedField>>,
    options: SearchOptions,
}

impl SearchIndex {
    /// Indexes `articles` with default options.
    pub fn new(articles: Arc<Vec<Article>>) -> Self {
        Self::with_options(articles, SearchOptions::default())
    }

    /// Indexes `articles`. Cost is linear in total field length.
    pub fn with_options(articles: Arc<Vec<Article>>, options: SearchOptions) -> Self {
        let entries = articles
            .iter()
            .map(|article| {
                options
                    .keys
                    .iter()
                    .map(|key| IndexedField::new(key.extract(article)))
                    .collect()
            })
            .collect();
        Self {
            source: articles,
            entries,
            options,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Whether this index was built from exactly `snapshot`.
    pub fn is_built_from(&self, snapshot: &Arc<Vec<Article>>) -> bool {
        Arc::ptr_eq(&self.source, snapshot)
    }

    /// Matching articles best-first; the whole collection when not searching.
    /// Result limiting is left to callers.
    pub fn search(&self, query: &str) -> Vec<Article> {
        if !self.options.is_searching(query) {
            return self.source.as_ref().clone();
        }
        self.search_scored(query)
            .into_iter()
            .map(|hit| hit.article)
            .collect()
    }

    /// Ranked hits with scores; empty when not searching. Ties keep
    /// collection order.
    pub fn search_scored(&self, query: &str) -> Vec<SearchHit> {
        if !self.options.is_searching(query) {
            return Vec::new();
        }

        let pattern = Pattern::new(query, self.options.threshold);
        let mut scored: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(position, fields)| {
                let best = fields
                    .iter()
                    .map(|field| field.score(&pattern))
                    .fold(1.0_f64, f64::min);
                (best <= self.options.threshold).then_some((position, best))
            })
            .collect();
        scored.sort_by(|left, right| left.1.total_cmp(&right.1));

        scored
            .into_iter()
            .map(|(position, score)| SearchHit {
                article: self.source[position].clone(),
                score,
            })
            .collect()
    }
}

/// Search helper that rebuilds its index only when the snapshot changes.
#[derive(Default)]
pub struct CachedSearch {
    options: SearchOptions,
    index: Option<SearchIndex>,
}

impl CachedSearch {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            index: None,
        }
    }

    /// Searches `snapshot`, rebuilding the index first if it is stale.
    pub fn search(&mut self, snapshot: &Arc<Vec<Article>>, query: &str) -> Vec<Article> {
        self.index_for(snapshot).search(query)
    }

    fn index_for(&mut self, snapshot: &Arc<Vec<Article>>) -> &SearchIndex {
        if !self
            .index
            .as_ref()
            .is_some_and(|index| index.is_built_from(snapshot))
        {
            self.index = None;
        }
        self.index.get_or_insert_with(|| {
            SearchIndex::with_options(Arc::clone(snapshot), self.options.clone())
        })
    }
}

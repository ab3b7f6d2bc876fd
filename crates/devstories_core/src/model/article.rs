//! Article domain model.
//!
//! # Responsibility
//! - Define the canonical article record shared by store, adapters and search.
//! - Define the partial-update shape used by `updateArticle` flows.
//!
//! # Invariants
//! - `slug` is the primary lookup key and unique within a collection.
//! - `status` absent on the wire means `pending`.
//! - A `rejected` article is not editable by UI policy; the store does not enforce it.

use crate::model::category::Category;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Moderation state of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Pending,
    Published,
    Rejected,
}

impl ArticleStatus {
    /// Stable wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a wire value; case-insensitive, surrounding whitespace ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "published" => Some(Self::Published),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// One blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// URL-safe unique identifier derived from the title.
    pub slug: String,
    /// Author display name.
    pub author: String,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    pub date: String,
    pub category: Category,
    /// Cover image URL. The backend sends `null` when unset; read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpt: String,
    /// Markdown body.
    pub content: String,
    /// Assigned by the remote backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ArticleStatus>,
    /// Assigned by the remote backend on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

impl Article {
    /// Moderation state with the `pending` default applied.
    pub fn effective_status(&self) -> ArticleStatus {
        self.status.unwrap_or(ArticleStatus::Pending)
    }

    /// Whether authoring screens should offer editing.
    pub fn is_editable(&self) -> bool {
        self.effective_status() != ArticleStatus::Rejected
    }

    /// Parsed `date`, or `None` when it is not `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Exact slug comparison. Slugs are stored lowercase, so callers pass
    /// normalized input.
    pub fn has_slug(&self, slug: &str) -> bool {
        self.slug == slug
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial article update. Absent fields are left untouched on merge and
/// omitted from the serialized request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ArticleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

impl ArticlePatch {
    /// Returns whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges every present field into `article`.
    pub fn apply_to(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title.clone_from(title);
        }
        if let Some(author) = &self.author {
            article.author.clone_from(author);
        }
        if let Some(date) = &self.date {
            article.date.clone_from(date);
        }
        if let Some(category) = self.category {
            article.category = category;
        }
        if let Some(image) = &self.image {
            article.image.clone_from(image);
        }
        if let Some(excerpt) = &self.excerpt {
            article.excerpt.clone_from(excerpt);
        }
        if let Some(content) = &self.content {
            article.content.clone_from(content);
        }
        if let Some(status) = self.status {
            article.status = Some(status);
        }
        if let Some(id) = self.id {
            article.id = Some(id);
        }
        if let Some(author_id) = self.author_id {
            article.author_id = Some(author_id);
        }
    }
}

/// Body for the moderation status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ArticleStatus,
}

#[cfg(test)]
mod tests {
    use super::{Article, ArticlePatch, ArticleStatus};
    use crate::model::category::Category;

    fn sample() -> Article {
        Article {
            title: "Title".to_string(),
            slug: "title".to_string(),
            author: "ABEL R.".to_string(),
            date: "2026-01-25".to_string(),
            category: Category::Ia,
            image: "https://example.com/a.png".to_string(),
            excerpt: "short".to_string(),
            content: "# Title".to_string(),
            id: None,
            status: None,
            author_id: None,
        }
    }

    #[test]
    fn missing_status_defaults_to_pending() {
        let json = r#"{"title":"t","slug":"s","author":"a","date":"2026-01-01",
            "category":"CLOUD","image":"i","excerpt":"e","content":"c"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.status, None);
        assert_eq!(article.effective_status(), ArticleStatus::Pending);
        assert!(article.is_editable());
    }

    #[test]
    fn null_image_and_excerpt_read_as_empty() {
        let json = r#"{"title":"t","slug":"s","author":"a","date":"2026-01-01",
            "category":"DATA","image":null,"excerpt":null,"content":"c","id":1}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.image, "");
        assert_eq!(article.excerpt, "");

        let json = r#"{"title":"t","slug":"s","author":"a","date":"2026-01-01",
            "category":"DATA","content":"c"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.image.is_empty() && article.excerpt.is_empty());
    }

    #[test]
    fn rejected_article_is_not_editable() {
        let mut article = sample();
        article.status = Some(ArticleStatus::Rejected);
        assert!(!article.is_editable());
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let json = serde_json::to_value(sample()).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("id"));
        assert!(!object.contains_key("status"));
        assert!(!object.contains_key("author_id"));
        assert_eq!(object["category"], "IA");
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut article = sample();
        let patch = ArticlePatch {
            title: Some("New".to_string()),
            status: Some(ArticleStatus::Published),
            ..ArticlePatch::default()
        };
        patch.apply_to(&mut article);

        assert_eq!(article.title, "New");
        assert_eq!(article.status, Some(ArticleStatus::Published));
        assert_eq!(article.excerpt, "short");
        assert_eq!(article.slug, "title");
        assert_eq!(article.id, None);
    }

    #[test]
    fn patch_sets_backend_identifiers() {
        let mut article = sample();
        let patch = ArticlePatch {
            id: Some(12),
            author_id: Some(3),
            ..ArticlePatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut article);

        assert_eq!(article.id, Some(12));
        assert_eq!(article.author_id, Some(3));
        assert_eq!(article.title, "Title");
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = ArticlePatch {
            excerpt: Some("e".to_string()),
            ..ArticlePatch::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"excerpt":"e"}"#);
        assert!(ArticlePatch::default().is_empty());
    }

    #[test]
    fn parsed_date_rejects_non_iso_values() {
        let mut article = sample();
        assert!(article.parsed_date().is_some());
        article.date = "25/01/2026".to_string();
        assert!(article.parsed_date().is_none());
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(ArticleStatus::parse(" Published "), Some(ArticleStatus::Published));
        assert_eq!(ArticleStatus::parse("draft"), None);
    }
}

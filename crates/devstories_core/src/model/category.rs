//! Fixed article categories and their display metadata.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed set of article categories. `Home` is the "no filter" pseudo-category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Home,
    Story,
    Tendances,
    Ia,
    Cloud,
    Data,
    Back,
    Front,
    Securite,
    Mobile,
    Product,
    Rh,
    Podcast,
    Auteurs,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Self::Home,
        Self::Story,
        Self::Tendances,
        Self::Ia,
        Self::Cloud,
        Self::Data,
        Self::Back,
        Self::Front,
        Self::Securite,
        Self::Mobile,
        Self::Product,
        Self::Rh,
        Self::Podcast,
        Self::Auteurs,
    ];

    /// Stable wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Story => "STORY",
            Self::Tendances => "TENDANCES",
            Self::Ia => "IA",
            Self::Cloud => "CLOUD",
            Self::Data => "DATA",
            Self::Back => "BACK",
            Self::Front => "FRONT",
            Self::Securite => "SECURITE",
            Self::Mobile => "MOBILE",
            Self::Product => "PRODUCT",
            Self::Rh => "RH",
            Self::Podcast => "PODCAST",
            Self::Auteurs => "AUTEURS",
        }
    }

    /// Parses a category name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
    }

    /// Display metadata for this category.
    pub fn info(self) -> &'static CategoryInfo {
        // CATEGORIES is declared in the same order as `ALL`.
        &CATEGORIES[self as usize]
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static display metadata; never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub name: Category,
    pub label: &'static str,
    pub color: &'static str,
    pub bg_color: &'static str,
}

const fn info(
    name: Category,
    label: &'static str,
    color: &'static str,
    bg_color: &'static str,
) -> CategoryInfo {
    CategoryInfo {
        name,
        label,
        color,
        bg_color,
    }
}

static CATEGORIES: [CategoryInfo; 14] = [
    info(Category::Home, "Home", "text-gray-700 dark:text-gray-300", "bg-gray-100 dark:bg-gray-700"),
    info(Category::Story, "Story", "text-purple-700 dark:text-purple-300", "bg-purple-100 dark:bg-purple-900"),
    info(Category::Tendances, "Tendances", "text-pink-700 dark:text-pink-300", "bg-pink-100 dark:bg-pink-900"),
    info(Category::Ia, "IA", "text-blue-700 dark:text-blue-300", "bg-blue-100 dark:bg-blue-900"),
    info(Category::Cloud, "Cloud", "text-cyan-700 dark:text-cyan-300", "bg-cyan-100 dark:bg-cyan-900"),
    info(Category::Data, "Data", "text-green-700 dark:text-green-300", "bg-green-100 dark:bg-green-900"),
    info(Category::Back, "Back", "text-orange-700 dark:text-orange-300", "bg-orange-100 dark:bg-orange-900"),
    info(Category::Front, "Front", "text-yellow-700 dark:text-yellow-300", "bg-yellow-100 dark:bg-yellow-900"),
    info(Category::Securite, "Sécurité", "text-red-700 dark:text-red-300", "bg-red-100 dark:bg-red-900"),
    info(Category::Mobile, "Mobile", "text-indigo-700 dark:text-indigo-300", "bg-indigo-100 dark:bg-indigo-900"),
    info(Category::Product, "Product", "text-teal-700 dark:text-teal-300", "bg-teal-100 dark:bg-teal-900"),
    info(Category::Rh, "RH", "text-rose-700 dark:text-rose-300", "bg-rose-100 dark:bg-rose-900"),
    info(Category::Podcast, "Podcast", "text-violet-700 dark:text-violet-300", "bg-violet-100 dark:bg-violet-900"),
    info(Category::Auteurs, "Auteurs", "text-slate-700 dark:text-slate-300", "bg-slate-100 dark:bg-slate-900"),
];

/// Returns the whole category table in declaration order.
pub fn categories() -> &'static [CategoryInfo] {
    &CATEGORIES
}

/// Looks up display metadata by category name (case-insensitive).
pub fn category_info(name: &str) -> Option<&'static CategoryInfo> {
    Category::parse(name).map(Category::info)
}

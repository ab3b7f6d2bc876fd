//! Fixed default collection written to fallback storage on first run.

use crate::model::article::Article;
use crate::model::category::Category;

const SEED_AUTHOR: &str = "ABEL R.";

fn seed(
    title: &str,
    slug: &str,
    date: &str,
    category: Category,
    image: &str,
    excerpt: &str,
    content: &str,
) -> Article {
    Article {
        title: title.to_string(),
        slug: slug.to_string(),
        author: SEED_AUTHOR.to_string(),
        date: date.to_string(),
        category,
        image: image.to_string(),
        excerpt: excerpt.to_string(),
        content: content.to_string(),
        id: None,
        status: None,
        author_id: None,
    }
}

/// Returns the six sample articles, in storage order.
pub fn default_articles() -> Vec<Article> {
    vec![
        seed(
            "Au-delà du hype : pilotage, rentabilité et impact sociétal de l'IA",
            "au-dela-du-hype-ia",
            "2026-01-25",
            Category::Ia,
            "https://images.unsplash.com/photo-1485827404703-89b55fcc595e?w=800&h=500&fit=crop",
            "Une analyse approfondie de l'impact réel de l'IA sur les entreprises et la société.",
            "# Au-delà du hype : pilotage, rentabilité et impact sociétal de l'IA\n\n\
             L'intelligence artificielle est partout. Mais au-delà des promesses marketing, quel est son impact réel ?\n\n\
             ## Le coût caché de l'IA\n\n\
             - Infrastructure cloud\n\
             - Données d'entraînement\n\
             - Expertise technique\n\
             - Maintenance continue",
        ),
        seed(
            "Grokipedia : une simple encyclopédie ?",
            "grokipedia-encyclopedie",
            "2026-01-23",
            Category::Ia,
            "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=800&h=500&fit=crop",
            "Découverte de Grokipedia, le nouveau projet qui veut révolutionner l'accès au savoir.",
            "# Grokipedia : une simple encyclopédie ?\n\n\
             Grokipedia promet de transformer notre façon d'accéder à l'information.",
        ),
        seed(
            "Recruteur Tech : les 7 clés pour survivre",
            "recruteur-tech-7-cles",
            "2026-01-15",
            Category::Rh,
            "https://images.unsplash.com/photo-1573497019940-1c28c88b4f3e?w=800&h=500&fit=crop",
            "Le métier de recruteur tech évolue. Voici les compétences essentielles.",
            "# Recruteur Tech : les 7 clés pour survivre\n\n\
             Le recrutement tech est un métier à part.",
        ),
        seed(
            "Le principe de Peter",
            "principe-de-peter",
            "2026-01-13",
            Category::Story,
            "https://images.unsplash.com/photo-1552664730-d307ca884978?w=800&h=500&fit=crop",
            "Comprendre pourquoi certains managers semblent incompétents.",
            "# Le principe de Peter\n\n\
             \"Dans une hiérarchie, tout employé tend à s'élever à son niveau d'incompétence.\"",
        ),
        seed(
            "AbortController en JavaScript",
            "abort-controller-javascript",
            "2026-01-05",
            Category::Front,
            "https://images.unsplash.com/photo-1633356122544-f134324a6cee?w=800&h=500&fit=crop",
            "Maîtrisez l'AbortController pour gérer vos requêtes asynchrones.",
            "# AbortController en JavaScript\n\n\
             L'AbortController est un outil puissant pour gérer les requêtes HTTP.",
        ),
        seed(
            "Kubernetes en 2026",
            "kubernetes-2026",
            "2026-01-10",
            Category::Cloud,
            "https://images.unsplash.com/photo-1667372393119-3d4c48d07fc9?w=800&h=500&fit=crop",
            "Les nouvelles pratiques Kubernetes à adopter.",
            "# Kubernetes en 2026\n\n\
             Kubernetes continue d'évoluer. GitOps partout avec ArgoCD et Flux.",
        ),
    ]
}

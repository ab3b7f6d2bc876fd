//! Command-line front end over the article store.
//!
//! # Responsibility
//! - Read configuration from `.env` and the process environment.
//! - Run one store operation per invocation and print plain-text results.

use clap::{Parser, Subcommand};
use devstories_core::{
    categories, init_logging, open_repository, open_storage, Article, ArticleDraft,
    ArticlePatch, ArticleScope, ArticleStatus, ArticleStore, Category, StoreConfig,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "devstories")]
#[command(about = "Browse and edit DevStories articles")]
struct Cli {
    /// Write logs to this absolute directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level used with --log-dir.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List articles, optionally restricted to one category
    List {
        #[arg(long, short = 'c')]
        category: Option<String>,
        /// Newest first, capped to this many entries
        #[arg(long)]
        latest: Option<usize>,
    },
    /// Print one article
    Show { slug: String },
    /// Fuzzy search titles, excerpts, bodies, authors and categories
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the category table
    Categories,
    /// Create an article; slug and excerpt are derived when omitted
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        /// Markdown body
        #[arg(long)]
        content: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
    },
    /// Update fields of an existing article
    Update {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Delete an article
    Delete { slug: String },
    /// List your own submissions, any status
    Mine,
    /// List the moderation queue
    Pending,
    /// List every article, any status (administrators)
    All,
    /// Move an article to pending, published or rejected
    SetStatus { slug: String, status: String },
    /// Reload the collection from the remote backend
    Refresh,
}

fn main() -> ExitCode {
    // A missing .env file is normal; real environment variables still apply.
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&cli.log_level, &log_dir.to_string_lossy())?;
    }

    if let Commands::Categories = cli.command {
        for info in categories() {
            println!("{:<10} {}", info.name.as_str(), info.label);
        }
        return Ok(());
    }

    let config = StoreConfig::from_env()?;
    let storage = open_storage(config.storage_path.as_deref())?;
    let store = ArticleStore::open(open_repository(&config, storage)?);

    match cli.command {
        Commands::List { category, latest } => {
            let category = category.as_deref().map(parse_category).transpose()?;
            let mut articles = store.articles_in(category);
            if let Some(limit) = latest {
                articles = devstories_core::model::collection::latest(&articles, limit);
            }
            print_rows(&articles);
        }
        Commands::Show { slug } => {
            let article = store
                .article_by_slug(&slug)
                .ok_or_else(|| format!("no article with slug `{slug}`"))?;
            print_article(&article);
        }
        Commands::Search { query, limit } => {
            let mut hits = store.search(&query);
            hits.truncate(limit);
            print_rows(&hits);
        }
        Commands::Create {
            title,
            category,
            content,
            author,
            image,
            excerpt,
        } => {
            let mut draft = ArticleDraft::new(title, content, parse_category(&category)?);
            draft.author = author;
            draft.image = image;
            draft.excerpt = excerpt;
            let article = draft.into_article();
            if article.slug.is_empty() {
                return Err("title produces an empty slug".into());
            }
            let slug = article.slug.clone();
            store.add_article(article)?;
            println!("created {slug}");
        }
        Commands::Update {
            slug,
            title,
            excerpt,
            content,
            category,
            image,
            author,
        } => {
            let patch = ArticlePatch {
                title,
                excerpt,
                content,
                category: category.as_deref().map(parse_category).transpose()?,
                image,
                author,
                ..ArticlePatch::default()
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            store.update_article(&slug, &patch)?;
            println!("updated {slug}");
        }
        Commands::Delete { slug } => {
            store.delete_article(&slug)?;
            println!("deleted {slug}");
        }
        Commands::Mine => print_rows(&store.articles_for(ArticleScope::Mine)?),
        Commands::Pending => print_rows(&store.articles_for(ArticleScope::Pending)?),
        Commands::All => print_rows(&store.articles_for(ArticleScope::All)?),
        Commands::SetStatus { slug, status } => {
            let status = ArticleStatus::parse(&status)
                .ok_or_else(|| format!("unknown status `{status}`"))?;
            store.set_article_status(&slug, status)?;
            println!("{slug} is now {}", status.as_str());
        }
        Commands::Refresh => {
            store.refresh()?;
            println!(
                "refreshed {} article(s) from {}",
                store.snapshot().len(),
                store.backend().as_str()
            );
        }
        Commands::Categories => {}
    }
    Ok(())
}

fn parse_category(name: &str) -> Result<Category, String> {
    Category::parse(name).ok_or_else(|| format!("unknown category `{name}`"))
}

fn print_rows(articles: &[Article]) {
    if articles.is_empty() {
        println!("no articles");
        return;
    }
    for article in articles {
        println!(
            "{}  {:<9} {:<32} {}",
            article.date,
            article.category.as_str(),
            article.slug,
            article.title
        );
    }
}

fn print_article(article: &Article) {
    println!("{}", article.title);
    println!(
        "{} | {} | {} | {}",
        article.author,
        article.date,
        article.category.info().label,
        article.effective_status().as_str()
    );
    println!();
    println!("{}", article.content);
}

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use engine::persist::{load_artifacts, load_name_index, ArtifactPaths};
use engine::{Engine, FilterCriteria, Item, ItemId, Recommendation};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

// Year slider bounds of the source dataset.
const YEAR_MIN: i32 = 1913;
const YEAR_MAX: i32 = 2024;

#[derive(Parser)]
#[command(name = "query")]
#[command(about = "Filter the movie catalog and rank recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Artifact directory produced by ingest
    #[arg(long, default_value = "./artifacts")]
    artifacts: String,
    /// Keep only these genres; repeatable
    #[arg(long = "genre")]
    genres: Vec<String>,
    /// Keep only these languages; repeatable
    #[arg(long = "language")]
    languages: Vec<String>,
    /// Minimum rating, 0 to 10
    #[arg(long)]
    min_rating: Option<f32>,
    /// Earliest release year to keep
    #[arg(long)]
    min_year: Option<i32>,
    /// Latest release year to keep
    #[arg(long)]
    max_year: Option<i32>,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            genres: facet(&self.genres),
            languages: facet(&self.languages),
            min_rating: self.min_rating,
            year_range: match (self.min_year, self.max_year) {
                (None, None) => None,
                (lo, hi) => Some((lo.unwrap_or(YEAR_MIN), hi.unwrap_or(YEAR_MAX))),
            },
        }
    }
}

fn facet(values: &[String]) -> Option<std::collections::HashSet<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().cloned().collect())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog items matching the facet filters
    Filter {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Rank recommendations for a chosen movie within the filtered set
    Recommend {
        #[command(flatten)]
        filter: FilterArgs,
        /// Movie name to base recommendations on
        #[arg(long)]
        movie: String,
        /// Maximum number of recommendations
        #[arg(long, default_value_t = 10)]
        top_n: usize,
    },
}

#[derive(Serialize)]
struct ItemRow {
    id: ItemId,
    name: String,
    genre: String,
    language: String,
    rating: Option<f32>,
    year: Option<i32>,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            genre: item.genre.clone(),
            language: item.language.clone(),
            rating: item.rating,
            year: item.year,
        }
    }
}

#[derive(Serialize)]
struct FilterResponse {
    total: usize,
    items: Vec<ItemRow>,
}

#[derive(Serialize)]
struct RecommendResponse {
    movie: String,
    total: usize,
    results: Vec<Recommendation>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Filter { filter } => run_filter(&filter),
        Commands::Recommend { filter, movie, top_n } => run_recommend(&filter, &movie, top_n),
    }
}

fn load_engine(artifacts: &str) -> Result<Engine> {
    let paths = ArtifactPaths::new(artifacts);
    let (catalog, vocabulary, vectors, meta) = load_artifacts(&paths)?;
    tracing::debug!(num_items = meta.num_items, created_at = %meta.created_at, "artifacts loaded");
    Ok(Engine::from_artifacts(catalog, &meta.fingerprint, vocabulary, vectors)?)
}

fn run_filter(args: &FilterArgs) -> Result<()> {
    let engine = load_engine(&args.artifacts)?;
    let filtered = engine.filter(&args.criteria())?;
    let items: Vec<ItemRow> = filtered
        .iter()
        .filter_map(|&id| engine.catalog().get(id))
        .map(ItemRow::from)
        .collect();
    let response = FilterResponse { total: items.len(), items };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run_recommend(args: &FilterArgs, movie: &str, top_n: usize) -> Result<()> {
    let engine = load_engine(&args.artifacts)?;
    let filtered = engine.filter(&args.criteria())?;
    if filtered.is_empty() {
        bail!("no movies match the supplied filters");
    }

    let chosen = filtered
        .iter()
        .copied()
        .find(|&id| engine.catalog().get(id).map(|it| it.name == movie).unwrap_or(false));
    let chosen = match chosen {
        Some(id) => id,
        None => {
            // Distinguish "no such movie" from "excluded by the filters".
            let names = load_name_index(&ArtifactPaths::new(&args.artifacts))?;
            if names.contains_key(movie) {
                bail!("{movie:?} is excluded by the supplied filters");
            }
            bail!("{movie:?} is not in the catalog");
        }
    };

    let results = engine.recommend(&filtered, chosen, top_n)?;
    let response = RecommendResponse { movie: movie.to_string(), total: results.len(), results };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

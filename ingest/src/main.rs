use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::features::{FeatureBuilder, DEFAULT_MAX_FEATURES};
use engine::persist::{
    save_catalog, save_meta, save_name_index, save_vectors, save_vocabulary, ArtifactPaths,
    MetaFile,
};
use engine::{Catalog, Item, ItemId};
use std::collections::HashSet;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

/// One raw CSV row before cleaning. `record` keeps the full row for
/// duplicate detection.
struct RawRow {
    record: Vec<String>,
    name: String,
    genre: String,
    language: String,
    rating: String,
    year: String,
}

#[derive(Default)]
struct CleanStats {
    rows_read: usize,
    duplicates: usize,
    incomplete: usize,
}

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Clean the raw movie dataset and build recommendation artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a raw CSV catalog and fit the tf-idf artifacts
    Build {
        /// Raw CSV dataset
        #[arg(long)]
        input: String,
        /// Output artifact directory
        #[arg(long)]
        output: String,
        /// Vocabulary cap for the tf-idf fit
        #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
        max_features: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, max_features } => build(&input, &output, max_features),
    }
}

fn build(input: &str, output: &str, max_features: usize) -> Result<()> {
    let rows = read_rows(Path::new(input))?;
    let (catalog, stats) = clean(rows);
    tracing::info!(
        rows_read = stats.rows_read,
        duplicates = stats.duplicates,
        incomplete = stats.incomplete,
        num_items = catalog.len(),
        "catalog cleaned"
    );

    let (vocabulary, vectors) = FeatureBuilder::new()
        .with_max_features(max_features)
        .fit(&catalog)?;
    tracing::info!(terms = vocabulary.dictionary.len(), "fitted tf-idf artifacts");

    let paths = ArtifactPaths::new(output);
    save_catalog(&paths, &catalog)?;
    save_vocabulary(&paths, &vocabulary)?;
    save_vectors(&paths, &vectors)?;
    save_name_index(&paths, &catalog.name_index())?;
    let meta = MetaFile {
        num_items: catalog.len() as u32,
        fingerprint: catalog.fingerprint(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output, "artifact build complete");
    Ok(())
}

/// Read the raw CSV, auto-detecting the title and rating columns by header
/// the way the source dataset names them ("Movie Name", "Rating(10)").
fn read_rows(input: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("open {}", input.display()))?;
    let headers = reader.headers()?.clone();

    let name_col = headers
        .iter()
        .position(|h| h.contains("Movie") && h.contains("Name"));
    let rating_col = headers.iter().position(|h| h.contains("Rating"));
    let (name_col, rating_col) = match (name_col, rating_col) {
        (Some(n), Some(r)) => (n, r),
        _ => bail!(
            "could not detect the title or rating column; found columns: {:?}",
            headers.iter().collect::<Vec<_>>()
        ),
    };
    let column = |label: &str| {
        headers
            .iter()
            .position(|h| h.trim() == label)
            .with_context(|| format!("missing column {label:?}"))
    };
    let genre_col = column("Genre")?;
    let language_col = column("Language")?;
    let year_col = column("Year")?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |col: usize| record.get(col).unwrap_or("").to_string();
        rows.push(RawRow {
            record: record.iter().map(str::to_string).collect(),
            name: field(name_col),
            genre: field(genre_col),
            language: field(language_col),
            rating: field(rating_col),
            year: field(year_col),
        });
    }
    Ok(rows)
}

/// Cleaning rules: full-row duplicates removed (first occurrence wins), rows
/// with an empty name, genre or rating dropped, rating and year coerced
/// leniently to numbers. Ids are assigned densely in surviving-row order.
fn clean(rows: Vec<RawRow>) -> (Catalog, CleanStats) {
    let mut stats = CleanStats { rows_read: rows.len(), ..Default::default() };
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut items = Vec::new();
    for row in rows {
        if !seen.insert(row.record.clone()) {
            stats.duplicates += 1;
            continue;
        }
        if row.name.trim().is_empty()
            || row.genre.trim().is_empty()
            || row.rating.trim().is_empty()
        {
            stats.incomplete += 1;
            continue;
        }
        items.push(Item {
            id: items.len() as ItemId,
            name: row.name.trim().to_string(),
            genre: row.genre.trim().to_string(),
            language: row.language.trim().to_string(),
            rating: coerce_rating(&row.rating),
            year: coerce_year(&row.year),
        });
    }
    (Catalog::new(items), stats)
}

fn coerce_rating(raw: &str) -> Option<f32> {
    raw.trim().parse().ok()
}

fn coerce_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i32>()
        .ok()
        .or_else(|| trimmed.parse::<f32>().ok().map(|y| y as i32))
}

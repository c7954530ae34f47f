use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use reviewlens::models::{ClassifiedReview, ReviewSummary};
use reviewlens::{Config, FetchConfig, ProductId, ReviewPipeline, Storage};

#[derive(Parser, Debug)]
#[command(name = "reviewlens")]
#[command(version = "0.1.0")]
#[command(about = "Fetch marketplace reviews and flag sentiment and likely fakes")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Database path for storing results (overrides REVIEWS_DB)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: Format,

    /// Output file (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, classify and store reviews for a product URL or ID
    Analyze {
        /// Product URL or numeric product ID
        input: String,

        /// Maximum number of reviews to fetch (overrides MAX_REVIEWS)
        #[arg(long)]
        max_reviews: Option<usize>,

        /// Fetch every available page
        #[arg(long, conflicts_with = "max_reviews")]
        all: bool,
    },
    /// Show stored reviews
    List {
        /// Only reviews of this product (URL or ID)
        #[arg(long)]
        product: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("reviewlens=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;
    let database = args
        .database
        .clone()
        .unwrap_or_else(|| config.database_path.clone());
    let mut storage = Storage::new(&database)?;

    match &args.command {
        Command::Analyze {
            input,
            max_reviews,
            all,
        } => {
            let limit = if *all {
                None
            } else {
                Some(max_reviews.unwrap_or(config.max_reviews))
            };

            let pipeline = ReviewPipeline::new(FetchConfig::from(&config));

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            spinner.set_message(format!("Fetching reviews for {}", input));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let result = pipeline.run(input, limit).await;
            spinner.finish_and_clear();
            let reviews = result?;

            if reviews.is_empty() {
                tracing::warn!("No reviews fetched for {}", input);
                eprintln!("Could not fetch any reviews for {}", input);
                return Ok(());
            }

            let saved = storage.save_reviews(&reviews)?;
            tracing::info!("Stored {} reviews in {}", saved, database);

            emit(&reviews, &args)?;
        }
        Command::List { product } => {
            let product_id = product.as_deref().map(ProductId::extract).transpose()?;
            let reviews = storage.list_reviews(product_id.as_ref())?;

            if let Some(ref id) = product_id {
                if let Some(updated) = storage.last_updated(id)? {
                    tracing::info!("Product {} last refreshed {}", id, updated);
                }
            }

            emit(&reviews, &args)?;
        }
    }

    Ok(())
}

fn emit(reviews: &[ClassifiedReview], args: &Args) -> anyhow::Result<()> {
    let output = match args.format {
        Format::Json => serde_json::to_string_pretty(reviews)?,
        Format::Markdown => format_markdown(reviews),
        Format::Text => format_text(reviews),
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn preview(text: &str) -> String {
    let mut short: String = text.chars().take(80).collect();
    short.push_str("...");
    short.replace('\n', " ")
}

fn fake_label(review: &ClassifiedReview) -> &'static str {
    if review.is_fake {
        "yes"
    } else {
        "no"
    }
}

fn format_text(reviews: &[ClassifiedReview]) -> String {
    let summary = ReviewSummary::from_reviews(reviews);
    let mut output = String::new();

    output.push_str(&format!("\n=== Reviews ({}) ===\n\n", summary.total));
    output.push_str(&format!(
        "Sentiment: {} positive / {} negative / {} neutral\n",
        summary.positive, summary.negative, summary.neutral
    ));
    output.push_str(&format!(
        "Likely fake: {} ({:.0}%)\n",
        summary.fake,
        summary.fake_share() * 100.0
    ));
    if let Some(avg) = summary.average_rating {
        output.push_str(&format!("Average rating: {:.2}\n", avg));
    }
    output.push('\n');

    for review in reviews {
        output.push_str(&format!(
            "{}  {:>3.1}  {:<8}  fake: {:<3}  {}\n",
            review.posted_at.format("%Y-%m-%d"),
            review.rating,
            review.sentiment.as_str(),
            fake_label(review),
            preview(&review.text)
        ));
    }

    output
}

fn format_markdown(reviews: &[ClassifiedReview]) -> String {
    let summary = ReviewSummary::from_reviews(reviews);
    let mut output = String::new();

    output.push_str("# Review Analysis\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Reviews | {} |\n", summary.total));
    output.push_str(&format!("| Positive | {} |\n", summary.positive));
    output.push_str(&format!("| Negative | {} |\n", summary.negative));
    output.push_str(&format!("| Neutral | {} |\n", summary.neutral));
    output.push_str(&format!(
        "| Likely Fake | {} ({:.0}%) |\n",
        summary.fake,
        summary.fake_share() * 100.0
    ));
    if let Some(avg) = summary.average_rating {
        output.push_str(&format!("| Average Rating | {:.2} |\n", avg));
    }

    output.push_str("\n## Reviews\n\n");
    output.push_str("| Date | Rating | Sentiment | Fake | Text |\n");
    output.push_str("|------|--------|-----------|------|------|\n");

    for review in reviews {
        output.push_str(&format!(
            "| {} | {:.1} | {} | {} | {} |\n",
            review.posted_at.format("%Y-%m-%d"),
            review.rating,
            review.sentiment,
            fake_label(review),
            preview(&review.text).replace('|', "\\|")
        ));
    }

    output
}

use anyhow::Context;
use clap::Parser;
use kmeans_reduce::{image::io::Reader as ImageReader, Config, Reduction};
use std::path::PathBuf;
use tracing::info;

/// Reduce the colors of an image with k-means clustering.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Image to read
    input: PathBuf,

    /// Where to write the reduced image. The format follows the file extension
    output: PathBuf,

    /// Number of colors in the reduced image
    #[arg(short = 'k', long, default_value_t = kmeans_reduce::DEFAULT_CLUSTER_COUNT)]
    clusters: usize,

    #[arg(long, default_value_t = kmeans_reduce::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Seed for the initial centroids. Random if omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let reader = ImageReader::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let img = reader
        .decode()
        .with_context(|| format!("failed to decode {}", args.input.display()))?;
    let buf = img.to_rgb8();
    info!(width = buf.width(), height = buf.height(), "loaded {}", args.input.display());

    let config = Config {
        clusters: args.clusters,
        max_iterations: args.max_iterations,
        seed: args.seed,
    };

    let reduction = Reduction::from_image(buf).config(config).generate()?;

    reduction
        .image()
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    let mut swatches = reduction.swatches();
    swatches.sort_by_key(|swatch| std::cmp::Reverse(swatch.population()));

    for swatch in swatches {
        let (r, g, b) = swatch.rgb();
        println!("#{:02x}{:02x}{:02x} {}", r, g, b, swatch.population());
    }

    Ok(())
}

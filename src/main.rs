//! Chest X-ray Pairs CLI
//!
//! Inspects how a label table splits into groups and previews the image
//! pairs a sampler would serve.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use image::DynamicImage;
use tracing::info;

use chest_xray_pairs::utils::logging::init_env_logging;
use chest_xray_pairs::{
    AlignmentMode, ItemTransform, LabelPartitionedSampler, PartitionMode, SamplerConfig,
};

/// Paired chest X-ray dataset inspection
#[derive(Parser, Debug)]
#[command(name = "chest_xray_pairs")]
#[command(version)]
#[command(about = "Inspect label groups and A/B pairs of a chest X-ray label table", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// TOML sampler config; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the CSV label table
    #[arg(long)]
    table: Option<PathBuf>,

    /// Directory containing the images
    #[arg(long)]
    images: Option<PathBuf>,

    /// Label of group A
    #[arg(long)]
    key_a: Option<String>,

    /// Label of group B
    #[arg(long)]
    key_b: Option<String>,

    /// Pairing mode: aligned (random B) or unaligned (index-matched B)
    #[arg(long)]
    alignment: Option<AlignmentMode>,

    /// Partition mode: exact or exhaustive
    #[arg(long)]
    partition: Option<PartitionMode>,

    /// Seed for reproducible random pairing
    #[arg(long)]
    seed: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print group sizes after partitioning
    Groups {
        /// Emit the summary as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the A/B pairs for a range of indices
    Pairs {
        /// First index
        #[arg(short, long, default_value = "0")]
        start: usize,

        /// Number of pairs to print
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Decode both images and report their dimensions
        #[arg(long, default_value = "false")]
        load: bool,
    },
}

impl Cli {
    fn sampler_config(&self) -> Result<SamplerConfig> {
        let mut config = match &self.config {
            Some(path) => SamplerConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => SamplerConfig::default(),
        };

        if let Some(table) = &self.table {
            config.table_path = table.clone();
        }
        if let Some(images) = &self.images {
            config.image_root = images.clone();
        }
        if let Some(key_a) = &self.key_a {
            config.key_a = key_a.clone();
        }
        if let Some(key_b) = &self.key_b {
            config.key_b = key_b.clone();
        }
        if let Some(mode) = self.alignment {
            config.alignment_mode = mode;
        }
        if let Some(mode) = self.partition {
            config.partition_mode = mode;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }
}

/// Up to `count` indices from `start`, stopping at `usize::MAX`
fn pair_indices(start: usize, count: usize) -> impl Iterator<Item = usize> {
    (start..=usize::MAX).take(count)
}

fn dimensions(img: DynamicImage) -> chest_xray_pairs::Result<(u32, u32)> {
    Ok((img.width(), img.height()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_env_logging(cli.verbose)?;

    let config = cli.sampler_config()?;
    info!(
        "Building sampler: A = '{}', B = '{}', {} / {}",
        config.key_a, config.key_b, config.partition_mode, config.alignment_mode
    );

    let sampler = LabelPartitionedSampler::new(config, dimensions)
        .context("Failed to build sampler")?;

    match cli.command {
        Commands::Groups { json } => print_groups(&sampler, json)?,
        Commands::Pairs { start, count, load } => print_pairs(&sampler, start, count, load)?,
    }

    Ok(())
}

fn print_groups<F>(sampler: &LabelPartitionedSampler<F>, json: bool) -> Result<()> {
    let summary = sampler.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n{}", "📊 Label Groups".bold());
    println!("  Rows:       {}", summary.total_rows);
    println!("  Partition:  {}", summary.partition_mode);
    println!("  Alignment:  {}", summary.alignment_mode);
    println!(
        "  Group A:    {} ({})",
        summary.key_a.green(),
        summary.size_a
    );
    println!(
        "  Group B:    {} ({})",
        summary.key_b.green(),
        summary.size_b
    );
    println!("  Pairs/epoch: {}", summary.length.to_string().cyan());

    if summary.groups.len() > 2 {
        println!("\n  All groups:");
        let mut groups = summary.groups.clone();
        groups.sort_by(|x, y| y.members.cmp(&x.members).then(x.name.cmp(&y.name)));

        for group in groups {
            let single = group
                .single_label
                .map(|n| format!("{} alone", n))
                .unwrap_or_default();
            println!("    {:30} {:6} {}", group.name, group.members, single.dimmed());
        }
    }

    Ok(())
}

fn print_pairs<F>(
    sampler: &LabelPartitionedSampler<F>,
    start: usize,
    count: usize,
    load: bool,
) -> Result<()>
where
    F: ItemTransform<Output = (u32, u32)>,
{
    let resolver = sampler.resolver();

    for index in pair_indices(start, count) {
        let pair = sampler.sample_identifiers(index);
        println!(
            "{:>6}  {} {}  {} {}",
            index.to_string().cyan(),
            "A:".bold(),
            resolver.resolve(pair.a).display(),
            "B:".bold(),
            resolver.resolve(pair.b).display()
        );

        // Decode the printed pair; `sample` would redraw B in aligned mode
        if load {
            let dims = |id: &str| {
                resolver
                    .load(id)
                    .and_then(|img| sampler.transform().apply(img))
            };
            match dims(pair.a).and_then(|a| dims(pair.b).map(|b| (a, b))) {
                Ok(((aw, ah), (bw, bh))) => println!("        {}x{} / {}x{}", aw, ah, bw, bh),
                Err(e) => println!("        {}", e.to_string().red()),
            }
        }
    }

    Ok(())
}

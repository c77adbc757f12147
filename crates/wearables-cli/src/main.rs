use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use wearables_core::{
    hash_classify_bytes, Analyzer, CapabilityProfile, ClassificationResult, FaceShape,
    Recommendation,
};
use wearables_services::TryOnGenerator;

mod config;
mod engine;

use config::Config;

#[derive(Parser)]
#[command(name = "wearables", version, about = "Face-shape analysis and eyewear recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the capability snapshot reported to the gate.
#[derive(Args)]
struct HostArgs {
    /// User agent string of the host browser
    #[arg(long)]
    user_agent: Option<String>,
    /// Device memory estimate in GB
    #[arg(long)]
    device_memory: Option<f32>,
    /// Report that no WebGL context can be created
    #[arg(long)]
    no_webgl: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the face shape in an image and show recommendations
    Analyze {
        /// Image file (PNG, JPEG, ...)
        image: PathBuf,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
        #[command(flatten)]
        host: HostArgs,
    },
    /// Classify a file by content checksum
    Hash {
        /// Any file; its bytes are hashed
        file: PathBuf,
    },
    /// Show the capability profile for a host
    Check {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
        #[command(flatten)]
        host: HostArgs,
    },
    /// Show frame recommendations for a face shape
    Recommend {
        /// oval, round, square, heart, diamond, rectangle or triangle
        shape: FaceShape,
    },
    /// Generate try-on placeholders for an image
    TryOn {
        /// Image file
        image: PathBuf,
        /// Frame style; defaults to every style recommended for the image
        #[arg(short, long)]
        style: Option<String>,
        #[command(flatten)]
        host: HostArgs,
    },
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    image: String,
    result: &'a ClassificationResult,
    recommendation: &'a Recommendation,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    match cli.command {
        Commands::Analyze { image, json, host } => {
            let result = analyze(&cfg, image.clone(), host).await?;
            let catalog = cfg.catalog()?;
            let recommendation = catalog.get(result.shape);

            if json {
                let out = AnalyzeOutput {
                    image: image.display().to_string(),
                    result: &result,
                    recommendation,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_result(&result);
                println!();
                print_recommendation(result.shape, recommendation);
            }
        }
        Commands::Hash { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let shape = hash_classify_bytes(&bytes);
            println!("{}: {shape}", file.display());
        }
        Commands::Check { json, host } => {
            let snapshot = cfg.snapshot(host.user_agent, host.device_memory, host.no_webgl);
            let profile = cfg.gate().inspect(&snapshot);
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_profile(&profile);
            }
        }
        Commands::Recommend { shape } => {
            let catalog = cfg.catalog()?;
            print_recommendation(shape, catalog.get(shape));
        }
        Commands::TryOn { image, style, host } => {
            let key = image.display().to_string();
            let mut generator = TryOnGenerator::new(cfg.tryon_cache_capacity);
            let images = match style {
                Some(style) => vec![generator.generate(&key, &style)],
                None => {
                    let result = analyze(&cfg, image, host).await?;
                    let catalog = cfg.catalog()?;
                    println!("Face shape: {} ({:.0}%)", result.shape, result.confidence);
                    generator.for_recommendation(&key, catalog.get(result.shape))
                }
            };
            for img in images {
                println!("{:<20} {}", img.style, img.url);
            }
        }
    }

    Ok(())
}

/// Run the gate and classifier on the engine thread, bounded by the configured timeout.
async fn analyze(cfg: &Config, image: PathBuf, host: HostArgs) -> Result<ClassificationResult> {
    let snapshot = cfg.snapshot(host.user_agent, host.device_memory, host.no_webgl);
    let analyzer = Analyzer::new(cfg.gate());

    let decision = analyzer.decide(&snapshot)?;
    tracing::debug!(
        strategy = ?decision.strategy,
        primary_installed = analyzer.has_primary(),
        "capability gate passed"
    );
    for issue in &decision.profile.issues {
        tracing::info!(%issue, "host incompatibility");
    }

    let engine = engine::spawn_engine(analyzer)?;
    let result = engine
        .analyze_with_timeout(image.clone(), snapshot, cfg.analysis_timeout())
        .await
        .with_context(|| format!("analyzing {}", image.display()))?;
    Ok(result)
}

fn print_result(result: &ClassificationResult) {
    println!("Face shape:  {}", result.shape);
    println!("Confidence:  {:.0}%", result.confidence);
    println!("Strategy:    {:?}", result.strategy);
    println!("Landmarks:   {}", result.landmarks.len());
    println!("Alternatives:");
    for alt in result.alternative_shapes.iter().skip(1) {
        println!("  {:<10} {:.0}%", alt.shape.to_string(), alt.score);
    }
    println!("Measurements:");
    for (name, value) in result.measurements.iter() {
        println!("  {name:<22} {value:.2}");
    }
}

fn print_recommendation(shape: FaceShape, rec: &Recommendation) {
    println!("{shape}: {}", rec.description);
    println!("  Frames: {}", rec.frames.join(", "));
    let colors: Vec<&str> = rec.colors.iter().map(String::as_str).collect();
    println!("  Colors: {}", colors.join(", "));
    println!("  Avoid:  {}", rec.avoid.join(", "));
}

fn print_profile(profile: &CapabilityProfile) {
    let version = profile
        .browser_version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string());
    let memory = profile
        .device_memory_gb
        .map(|gb| format!("{gb} GB"))
        .unwrap_or_else(|| "unknown".to_string());

    println!("Browser:     {} {version}", profile.browser_name);
    println!("Mobile:      {}", profile.is_mobile);
    println!("WebGL:       {}", profile.webgl_supported);
    println!("Memory:      {memory}");
    println!("Compatible:  {}", profile.compatible);
    for issue in &profile.issues {
        println!("  - {issue}");
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drift_lib::{
    config::{read_config, AnalyzeConfig},
    io::logs::{load_chains, read_deltas_csv, read_detailed_csv, LoadedChain},
    metrics::{batch::simulate, histogram::bin_deviations, summary::summarize, trend::analyze_trend},
    plot::{figure_from_histogram, figure_from_percentiles, Figure, Series},
    report::{analyze_all, ChainReport},
    series::ChainSeries,
};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "drift",
    version,
    about = "Analyze block timestamp deviations for batching suitability"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full per-chain analysis over a logs directory
    Analyze {
        #[arg(long, default_value = "./logs")]
        logs_dir: PathBuf,
        /// Chains to analyze; defaults to every chain found in the logs
        #[arg(long, num_args = 1..)]
        chains: Option<Vec<String>>,
        #[arg(long)]
        batch_window_ms: Option<f64>,
        #[arg(long)]
        bin_width_ms: Option<f64>,
        /// Optional TOML config; CLI flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit the reports as a JSON array instead of text
        #[arg(long)]
        json: bool,
        /// Render percentile/distribution charts into this directory
        #[arg(long)]
        charts_dir: Option<PathBuf>,
    },
    /// Summary statistics for one deltas CSV, as JSON
    Summary {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "chain")]
        chain: String,
    },
    /// Batch-window simulation for one deltas CSV, as JSON
    BatchSim {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "chain")]
        chain: String,
        #[arg(long, default_value_t = 15000.0)]
        window_ms: f64,
    },
    /// Trend analysis for one detailed CSV, as JSON
    Trend {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "chain")]
        chain: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            logs_dir,
            chains,
            batch_window_ms,
            bin_width_ms,
            config,
            json,
            charts_dir,
        } => cmd_analyze(
            &logs_dir,
            chains,
            batch_window_ms,
            bin_width_ms,
            config.as_deref(),
            json,
            charts_dir.as_deref(),
        )?,
        Commands::Summary { input, chain } => cmd_summary(&input, &chain)?,
        Commands::BatchSim {
            input,
            chain,
            window_ms,
        } => cmd_batch_sim(&input, &chain, window_ms)?,
        Commands::Trend { input, chain } => cmd_trend(&input, &chain)?,
    }
    Ok(())
}

fn cmd_summary(input: &Path, chain: &str) -> Result<()> {
    let deltas = read_deltas_csv(input)?;
    let series = ChainSeries::from_deltas(chain, deltas);
    let stats = summarize(&series)?;
    println!("{}", serde_json::to_string(&stats)?);
    Ok(())
}

fn cmd_batch_sim(input: &Path, chain: &str, window_ms: f64) -> Result<()> {
    let deltas = read_deltas_csv(input)?;
    let series = ChainSeries::from_deltas(chain, deltas);
    let report = simulate(&series, window_ms)?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_trend(input: &Path, chain: &str) -> Result<()> {
    let records = read_detailed_csv(input)?;
    let series = ChainSeries::from_records(chain, records);
    let report = analyze_trend(&series)?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_analyze(
    logs_dir: &Path,
    chains: Option<Vec<String>>,
    batch_window_ms: Option<f64>,
    bin_width_ms: Option<f64>,
    config_path: Option<&Path>,
    json: bool,
    charts_dir: Option<&Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => read_config(path)?,
        None => AnalyzeConfig::default(),
    };
    if let Some(window) = batch_window_ms {
        config.batch_window_ms = window;
    }
    if let Some(width) = bin_width_ms {
        config.bin_width_ms = width;
    }
    if chains.is_some() {
        config.chains = chains;
    }
    config.validate()?;

    let loaded = load_chains(logs_dir, config.chains.as_deref())?;
    if loaded.is_empty() {
        println!("No usable chain data found in {}", logs_dir.display());
        return Ok(());
    }

    let series: Vec<ChainSeries> = loaded.iter().map(|l| l.series.clone()).collect();
    let reports = analyze_all(&series, &config);

    if json {
        println!("{}", serde_json::to_string(&reports)?);
    } else {
        print_precomputed_summary(&loaded);
        print_distributions(&reports, &series, config.bin_width_ms);
        print_batch_simulation(&reports, config.batch_window_ms);
        print_recommendations(&reports);
    }

    if let Some(dir) = charts_dir {
        render_charts(dir, &reports, &series, config.bin_width_ms)?;
    }
    Ok(())
}

fn print_precomputed_summary(loaded: &[LoadedChain]) {
    if loaded.iter().all(|l| l.precomputed.is_none()) {
        return;
    }
    println!("===== Timestamp Statistics Summary =====");
    for chain in loaded {
        let Some(stats) = &chain.precomputed else {
            continue;
        };
        let total = stats.total_blocks.max(1) as f64;
        println!("\n{}:", stats.chain);
        println!("  Total blocks analyzed: {}", stats.total_blocks);
        println!(
            "  Honest timestamps (in the past): {} blocks ({:.1}%)",
            stats.past_blocks,
            stats.past_blocks as f64 / total * 100.0
        );
        println!(
            "  Potentially dishonest timestamps (in the future): {} blocks ({:.1}%)",
            stats.future_blocks,
            stats.future_blocks as f64 / total * 100.0
        );
        println!("  Average time delta: {:.1} ms", stats.avg_delta_ms);
        println!("  Max past delta: {:.1} ms", stats.max_past_delta_ms);
        println!("  Max future delta: {:.1} ms", stats.max_future_delta_ms);
    }
    println!();
}

fn print_distributions(reports: &[ChainReport], series: &[ChainSeries], bin_width_ms: f64) {
    println!("===== Timestamp Delta Distribution =====");
    for report in reports {
        let Some(s) = series.iter().find(|s| s.chain == report.chain) else {
            continue;
        };
        let bins = bin_deviations(&s.deviations, bin_width_ms);
        println!("\n{} (bin width: {}ms):", report.chain, bin_width_ms);
        println!("  Range (ms)          | Count | Distribution");
        println!("  --------------------|-------|-------------");
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(1).max(1);
        for bin in &bins {
            let bar_len = bin.count * 40 / max_count;
            println!(
                "  {:8.0} to {:8.0} | {:5} | {}",
                bin.lower_ms,
                bin.upper_ms,
                bin.count,
                "#".repeat(bar_len)
            );
        }
    }
    println!();
}

fn print_batch_simulation(reports: &[ChainReport], window_ms: f64) {
    println!("===== Batch Simulation (Window: {}ms) =====", window_ms);
    for report in reports {
        let batch = &report.batch;
        println!("\n{}:", report.chain);
        println!(
            "  Blocks assigned to the wrong batch: {} ({:.2}%)",
            batch.mis_count, batch.mis_pct
        );
        println!(
            "  Future timestamps causing early assignment: {} ({:.2}%)",
            batch.future_mis_count, batch.future_mis_pct
        );
        println!(
            "  Past timestamps causing late assignment: {} ({:.2}%)",
            batch.past_mis_count, batch.past_mis_pct
        );
        println!(
            "  99th percentile of absolute delta: {:.2}ms",
            batch.p99_abs_ms
        );
        println!("  Batching reliability: {}", batch.reliability);
    }
    println!();
}

fn print_recommendations(reports: &[ChainReport]) {
    println!("===== Recommendations =====");
    for report in reports {
        let summary = &report.summary;
        let tiers = &report.classification;
        println!("\n{}:", report.chain);
        println!(
            "  {:.1}% of timestamps are honest (in the past)",
            summary.past_pct
        );
        println!(
            "  {:.1}% of timestamps are potentially dishonest (in the future)",
            summary.future_pct
        );
        println!(
            "  Timestamp accuracy: {} (median |delta| {:.1}ms)",
            tiers.accuracy, summary.median_abs_ms
        );
        println!(
            "  Timestamp variability: {} (stddev {:.1}ms)",
            tiers.variability, summary.std_abs_ms
        );
        println!("  Future-timestamp compliance: {}", tiers.compliance);
        println!(
            "  Recommended batch window: at least {:.0}ms ({:.1}s), buffered {:.0}ms",
            report.batch.recommended_window_ms,
            report.batch.recommended_window_ms / 1000.0,
            report.batch.buffered_window_ms
        );
        if let Some(trend) = &report.trend {
            let drift = &trend.drift;
            match drift.relative_pct {
                Some(pct) => println!(
                    "  Accuracy trend: {} (first half {:.1}ms, second half {:.1}ms, {:+.1}%)",
                    drift.direction, drift.first_half_mean_ms, drift.second_half_mean_ms, pct
                ),
                None => println!(
                    "  Accuracy trend: {} (first half {:.1}ms, second half {:.1}ms)",
                    drift.direction, drift.first_half_mean_ms, drift.second_half_mean_ms
                ),
            }
            match &trend.correlation {
                Some(corr) => println!(
                    "  Block-time correlation: {} (r = {:.2})",
                    corr.verdict, corr.coefficient
                ),
                None => println!("  Block-time correlation: undefined (sample too small or flat)"),
            }
            println!(
                "  Outliers: {} of {} ({:.1}%, {}) above {:.1}ms",
                trend.outliers.points.len(),
                trend.sample_count,
                trend.outliers.rate_pct,
                trend.outliers.severity,
                trend.outliers.threshold_ms
            );
            match &trend.shifts {
                Some(shifts) if !shifts.points.is_empty() => {
                    let first = &shifts.points[0];
                    println!(
                        "  Shifts: {} detected, first near block {} ({:.1}ms -> {:.1}ms)",
                        shifts.points.len() + shifts.unreported,
                        first.block_number,
                        first.before_mean_ms,
                        first.after_mean_ms
                    );
                }
                Some(_) => println!("  Shifts: none detected"),
                None => println!("  Shifts: not checked (needs 30+ records)"),
            }
        } else {
            println!("  Trend analysis: skipped (no detailed records)");
        }
    }
}

fn render_charts(
    dir: &Path,
    reports: &[ChainReport],
    series: &[ChainSeries],
    bin_width_ms: f64,
) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating charts directory {}", dir.display()))?;

    let curves: Vec<(String, Vec<f64>)> = reports
        .iter()
        .map(|r| (r.chain.clone(), r.summary.signed_percentiles.clone()))
        .collect();
    draw_figure(
        &dir.join("timestamp_percentiles.png"),
        &figure_from_percentiles(&curves),
    )?;

    for s in series {
        let bins = bin_deviations(&s.deviations, bin_width_ms);
        if bins.is_empty() {
            continue;
        }
        draw_figure(
            &dir.join(format!("{}_distribution.png", s.chain)),
            &figure_from_histogram(&s.chain, &bins),
        )?;
    }
    Ok(())
}

fn draw_figure(path: &Path, fig: &Figure) -> Result<()> {
    let backend = BitMapBackend::new(path, (800, 480));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let points: Vec<[f64; 2]> = fig
        .series
        .iter()
        .flat_map(|series| match series {
            Series::Line(line) => line.points.clone(),
        })
        .collect();
    let x_min = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let x_max = points
        .iter()
        .map(|p| p[0])
        .fold(f64::NEG_INFINITY, f64::max);
    let y_min = points.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
    let y_max = points
        .iter()
        .map(|p| p[1])
        .fold(f64::NEG_INFINITY, f64::max);
    if !x_min.is_finite() || !y_min.is_finite() {
        return Ok(());
    }
    let x_pad = if x_min == x_max { 1.0 } else { 0.0 };
    let y_pad = if y_min == y_max { 1.0 } else { 0.0 };

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(
            (x_min - x_pad)..(x_max + x_pad),
            (y_min - y_pad)..(y_max + y_pad),
        )?;
    chart.configure_mesh().draw()?;

    for series in &fig.series {
        match series {
            Series::Line(line) => {
                let color = RGBColor(
                    ((line.style.color.0 >> 16) & 0xFF) as u8,
                    ((line.style.color.0 >> 8) & 0xFF) as u8,
                    (line.style.color.0 & 0xFF) as u8,
                );
                chart
                    .draw_series(LineSeries::new(
                        line.points.iter().map(|p| (p[0], p[1])),
                        &color,
                    ))?
                    .label(line.name.clone());
            }
        }
    }
    root.present()?;
    Ok(())
}

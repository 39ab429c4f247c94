use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "packedgraph workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmarks with and without the `parallel` feature and compare
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Run the test suite under every feature combination
    Test,
}

/// A named feature set; the name doubles as the criterion baseline.
struct Profile {
    name: &'static str,
    cargo_args: &'static [&'static str],
}

const PROFILES: &[Profile] = &[
    Profile {
        name: "parallel",
        cargo_args: &[],
    },
    Profile {
        name: "sequential",
        cargo_args: &["--no-default-features"],
    },
];

const BENCHES: &[&str] = &["codec_benchmark", "compressed_graph_benchmark"];

const CRITERION_DIR: &str = "target/criterion";
const REPORT_PATH: &str = "benchmark_results/report.md";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
        Commands::Test => run_tests()?,
    }

    Ok(())
}

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

fn run_tests() -> Result<()> {
    let runs: &[&[&str]] = &[
        &["test", "--all-features"],
        &["test", "--no-default-features"],
        &["test", "--no-default-features", "--features", "proptest"],
    ];
    for args in runs {
        println!("\n>>> cargo {}", args.join(" "));
        let status = cargo(args)
            .status()
            .with_context(|| format!("failed to spawn cargo {}", args.join(" ")))?;
        if !status.success() {
            anyhow::bail!("cargo {} failed", args.join(" "));
        }
    }
    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running comparative benchmarks...");

    for profile in PROFILES {
        for bench in BENCHES {
            println!("\n>>> {} / {}", bench, profile.name);
            let start = Instant::now();

            let mut cmd = cargo(&["bench", "--bench", bench]);
            cmd.env("CARGO_INCREMENTAL", "0").args(profile.cargo_args);

            // Args for the test runner (Criterion) go after --
            cmd.arg("--").arg("--save-baseline").arg(profile.name);
            if quick {
                cmd.args(["--measurement-time", "0.1", "--noplot", "--sample-size", "10"]);
            }

            let status = cmd
                .status()
                .with_context(|| format!("failed to run {bench} for {}", profile.name))?;
            if status.success() {
                println!("Finished in {:.2?}", start.elapsed());
            } else {
                eprintln!("Warning: {bench} failed for {}", profile.name);
            }
        }
    }

    Ok(())
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

/// Mean time in nanoseconds, keyed by benchmark id and then baseline.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new(CRITERION_DIR);
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, criterion_dir, &mut results)?;

    let report_path = Path::new(REPORT_PATH);
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(report_path, render_report(&results))
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn render_report(results: &Results) -> String {
    use std::fmt::Write;

    let mut out = String::from("# Parallel vs Sequential Benchmark Report\n\n");
    out.push_str("| Benchmark |");
    for profile in PROFILES {
        let _ = write!(out, " {} |", profile.name);
    }
    out.push_str(" Speedup |\n|---|");
    for _ in PROFILES {
        out.push_str("---|");
    }
    out.push_str("---|\n");

    for (bench, by_profile) in results {
        let _ = write!(out, "| {bench} |");
        for profile in PROFILES {
            match by_profile.get(profile.name) {
                Some(&ns) => {
                    let _ = write!(out, " {} |", format_time(ns));
                }
                None => out.push_str(" N/A |"),
            }
        }
        match (by_profile.get("parallel"), by_profile.get("sequential")) {
            (Some(&par), Some(&seq)) if par > 0.0 => {
                let _ = writeln!(out, " **{:.2}x** |", seq / par);
            }
            _ => out.push_str(" - |\n"),
        }
    }
    out
}

fn format_time(ns: f64) -> String {
    if ns >= 1e9 {
        format!("{:.2} s", ns / 1e9)
    } else if ns >= 1e6 {
        format!("{:.2} ms", ns / 1e6)
    } else if ns >= 1e3 {
        format!("{:.2} µs", ns / 1e3)
    } else {
        format!("{ns:.0} ns")
    }
}

/// Walks criterion's output. Layout: `<root>/<group>/<id...>/<baseline>/estimates.json`.
fn collect_results(root: &Path, dir: &Path, results: &mut Results) -> Result<()> {
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(root, &path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(baseline_dir) = path.parent() else {
            continue;
        };
        let Some(baseline) = baseline_dir.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !PROFILES.iter().any(|p| p.name == baseline) {
            continue;
        }
        let Some(bench_dir) = baseline_dir.parent() else {
            continue;
        };
        let Ok(bench) = bench_dir.strip_prefix(root) else {
            continue;
        };

        let content = fs::read_to_string(&path)?;
        let estimates: Estimates = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        results
            .entry(bench.display().to_string())
            .or_default()
            .insert(baseline.to_string(), estimates.mean.point_estimate);
    }
    Ok(())
}

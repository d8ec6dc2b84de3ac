use std::path::PathBuf;
use std::process;

use cubecast_bench::report;
use cubecast_bench::runner::BenchmarkRunner;
use cubecast_bench::scenes;

fn usage() {
    eprintln!("Usage: bench-runner [OPTIONS]");
    eprintln!("  --ticks <n>                    Frames per scene (default: 120)");
    eprintln!("  --objects <n>                  Objects per scene (default: per scene)");
    eprintln!("  --output <path>                Save results as a JSON baseline");
    eprintln!("  --baseline <path>              Compare against a saved baseline");
    eprintln!("  --regression-threshold <pct>   Regression threshold percentage (default: 10)");
}

/// Value following flag `args[*i]`, parsed; exits with usage on failure.
fn flag_value<T: std::str::FromStr>(args: &[String], i: &mut usize) -> T {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i).and_then(|v| v.parse().ok()) {
        Some(value) => value,
        None => {
            eprintln!("invalid or missing value for {}", flag);
            usage();
            process::exit(2);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut tick_count = 120u32;
    let mut objects: Option<u32> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--ticks" => tick_count = flag_value(&args, &mut i),
            "--objects" => objects = Some(flag_value(&args, &mut i)),
            "--output" => output_path = Some(flag_value(&args, &mut i)),
            "--baseline" => baseline_path = Some(flag_value(&args, &mut i)),
            "--regression-threshold" => regression_threshold = flag_value(&args, &mut i),
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let runner = BenchmarkRunner::new(tick_count);
    let results: Vec<_> = scenes::standard_scenes(objects)
        .iter()
        .map(|scene| runner.run_scene(scene))
        .collect();

    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            label: format!("bench-{}", process::id()),
            results: results.clone(),
        };
        match report::save_baseline(path, &baseline) {
            Ok(()) => log::info!("Saved baseline to {}", path.display()),
            Err(e) => {
                log::error!("Failed to save baseline to {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

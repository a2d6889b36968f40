use anyhow::Result;
use memaddr::bench;
use memaddr::ir;
use memaddr::pin::Pin;
use memaddr::report::{self, AnalysisResult, Row};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(argh::FromArgs)]
/// memory-address instruction census over a directory of benchmarks
struct Arguments {
    #[argh(option, short = 'b', default = r#"PathBuf::from("benchmarks")"#)]
    /// directory containing one subdirectory per benchmark
    benchmarks: PathBuf,

    #[argh(option, short = 'p')]
    /// root of the PIN installation (contains `pin` and the memaddr tool)
    pin_root: PathBuf,

    #[argh(option, short = 'o', default = r#"PathBuf::from("results.csv")"#)]
    /// where to write the result table
    out: PathBuf,

    #[argh(option, short = 't', default = "3600")]
    /// seconds to allow one pin invocation before giving up on it
    timeout: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Arguments = argh::from_env();
    let pin = Pin::new(&args.pin_root, Duration::from_secs(args.timeout));

    let benchmarks = bench::discover(&args.benchmarks)?;
    info!("found {} benchmarks", benchmarks.len());

    let mut rows = Vec::new();
    for benchmark in &benchmarks {
        info!("analyzing {}", benchmark.name);

        // the argument file is required even when empty; without it we
        // record the benchmark as failed and touch neither aggregator
        let inputs = match benchmark.arguments() {
            Ok(inputs) => inputs,
            Err(e) => {
                warn!("{}: {e}", benchmark.name);
                rows.push(Row::failed(benchmark.name.clone()));
                continue;
            }
        };

        // the two levels run independently: pin falling over must not
        // suppress the IR numbers for the same benchmark, and vice versa
        let x86 = pin
            .analyze(&benchmark.executable(), &inputs, &benchmark.dir)
            .unwrap_or_else(|e| {
                warn!("{}: x86 analysis failed: {e}", benchmark.name);
                AnalysisResult::FAILED
            });

        let ir = ir::analyze(&benchmark.dir).unwrap_or_else(|e| {
            warn!("{}: IR analysis failed: {e}", benchmark.name);
            AnalysisResult::FAILED
        });

        rows.push(Row::new(benchmark.name.clone(), x86, ir));
    }

    report::write_csv(&args.out, &rows)?;
    info!("wrote {} rows to {}", rows.len(), args.out.display());

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feal4_cryptanalysis::corpus::PairCorpus;
use feal4_cryptanalysis::search::{self, RecoveredKey};

/// Known-plaintext linear cryptanalysis against FEAL-4.
///
/// Recovers the six 32-bit round subkeys given a corpus of plaintext/
/// ciphertext pairs encrypted under an unknown key.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the pair file (Plaintext=/Ciphertext= record pairs).
    #[arg(default_value = "known.txt")]
    pair_file: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Stop after this many accepted key tuples.
    #[arg(long, default_value_t = 256)]
    max_keys: usize,

    /// Worker-pool size for the K0 sweep (defaults to available parallelism).
    #[arg(long)]
    threads: Option<usize>,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "feal4_cryptanalysis=info",
        1 => "feal4_cryptanalysis=debug",
        _ => "feal4_cryptanalysis=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(keys: &[RecoveredKey], elapsed_ms: u128) {
    for tuple in keys {
        println!(
            "0x{:08x}\t0x{:08x}\t0x{:08x}\t0x{:08x}\t0x{:08x}\t0x{:08x}",
            tuple[0], tuple[1], tuple[2], tuple[3], tuple[4], tuple[5]
        );
    }
    println!("found {} key tuple(s) in {} ms", keys.len(), elapsed_ms);
}

fn run(args: Args) -> anyhow::Result<()> {
    println!("feal4-crack: known-plaintext linear cryptanalysis of FEAL-4");
    println!("loading pairs from {}", args.pair_file.display());

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure worker pool")?;
    }

    let corpus = PairCorpus::load(&args.pair_file)
        .with_context(|| format!("loading pair file {}", args.pair_file.display()))?;
    println!("loaded {} pair(s)", corpus.count());
    info!(pairs = corpus.count(), "corpus loaded");

    let start = Instant::now();
    let keys = search::search(&corpus, args.max_keys);
    let elapsed_ms = start.elapsed().as_millis();

    report(&keys, elapsed_ms);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mrengine::logging;
use mrengine::mr;
use mrengine::mrapps::search::{self, Search};

const USAGE: &str = "Usage: mrsearch <substring to search> <folders, separated by space>";

#[derive(Parser)]
#[command(name = "mrsearch")]
struct Args {
    /// Substring to look for in file names
    substring: Option<String>,
    folders: Vec<PathBuf>,
    /// Worker threads per phase, defaults to one per folder
    #[arg(short, long)]
    threads: Option<usize>,
    #[arg(long)]
    reduce_threads: Option<usize>,
    #[arg(long, default_value_t = mr::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    #[arg(long, default_value = logging::DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode, anyhow::Error> {
    let args = Args::parse();
    let Some(substring) = args.substring else {
        eprintln!("{}", USAGE);
        return Ok(ExitCode::FAILURE);
    };
    if args.folders.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    if let Err(e) = logging::init_file_log(&args.log_file) {
        mrengine::util::fatal("open log file", &e);
    }

    let threads = args.threads.unwrap_or(args.folders.len());
    let config = mr::Config::new(threads)
        .with_reduce_threads(args.reduce_threads.unwrap_or(threads))
        .with_chunk_size(args.chunk_size);
    let input = Search::input(args.folders);

    let output = tokio::task::spawn_blocking(move || {
        mr::run(&Search::new(substring), &input, config).map(|res| res.output)
    })
    .await??;

    let line = search::format_matches(&output);
    if !line.is_empty() {
        println!("{}", line);
    }
    Ok(ExitCode::SUCCESS)
}

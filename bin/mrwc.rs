use std::path::PathBuf;

use clap::Parser;
use mrengine::logging;
use mrengine::mr;
use mrengine::mrapps::wc::WC;
use mrengine::mrrt::sequential;
use tokio::fs::File;
use tokio::io::AsyncWriteExt as _;

#[derive(Parser)]
#[command(name = "mrwc")]
struct Args {
    input_files: Vec<String>,
    /// Worker threads per phase, defaults to the available parallelism
    #[arg(short, long)]
    threads: Option<usize>,
    #[arg(long)]
    reduce_threads: Option<usize>,
    #[arg(long, default_value_t = mr::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    /// Run on the calling thread instead of the threaded engine
    #[arg(long)]
    sequential: bool,
    #[arg(short, long, default_value = "mr-out-0")]
    out: PathBuf,
    #[arg(long, default_value = logging::DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    if let Err(e) = logging::init_file_log(&args.log_file) {
        mrengine::util::fatal("open log file", &e);
    }

    let mut files = Vec::with_capacity(args.input_files.len());
    for file in args.input_files {
        let contents = tokio::fs::read_to_string(&file).await?;
        files.push((file, contents));
    }
    let input = WC::input(files);

    let threads = args
        .threads
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()));
    let config = mr::Config::new(threads)
        .with_reduce_threads(args.reduce_threads.unwrap_or(threads))
        .with_chunk_size(args.chunk_size);
    let use_sequential = args.sequential;

    let output = tokio::task::spawn_blocking(move || {
        if use_sequential {
            Ok(sequential::run(&WC, &input))
        } else {
            mr::run(&WC, &input, config).map(|res| res.output)
        }
    })
    .await??;

    let mut out = File::create(&args.out).await?;
    for kv in output {
        out.write_all(format!("{} {}\n", kv.key, kv.value).as_bytes()).await?;
    }
    out.flush().await?;

    Ok(())
}

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use memvfs::config::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_NAME_LEN, DEFAULT_TOTAL_BLOCKS};
use memvfs::{Shell, Vfs, VfsConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive shell over an in-memory block file system")]
struct Args {
    /// Number of blocks on the simulated disk
    #[arg(long = "blocks", default_value_t = DEFAULT_TOTAL_BLOCKS)]
    total_blocks: usize,
    /// Size of each block in bytes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,
    /// Longest accepted file or directory name
    #[arg(long, default_value_t = DEFAULT_MAX_NAME_LEN)]
    max_name_len: usize,
    /// Run commands from this file instead of standard input
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = VfsConfig::new()
        .with_total_blocks(args.total_blocks)
        .with_block_size(args.block_size)
        .with_max_name_len(args.max_name_len);
    let vfs = match Vfs::new(config) {
        Ok(vfs) => vfs,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let mut shell = Shell::new(vfs);

    let stdout = io::stdout();
    let result = match &args.script {
        Some(path) => File::open(path)
            .and_then(|file| shell.run(BufReader::new(file), stdout.lock(), false)),
        None => shell.run(io::stdin().lock(), stdout.lock(), true),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("shell stopped: {}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

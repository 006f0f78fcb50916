use std::path::Path;
use std::process;

use clap::Parser;
use protpipe::cli::{Args, Commands};
use protpipe::pipelines::protpipe::protpipe;
use protpipe::pipelines::restore::restore_file;

fn main() {
    let args = Args::parse();

    let result = match args.command {
        Commands::Run(run_args) => protpipe(&run_args).map(|outcome| {
            println!("Model used for RAxML: {}", outcome.model.raxml_arg());
            if let Some(summary) = outcome.restored {
                for output in summary.restored() {
                    println!("Renamed tree: {}", output.display());
                }
            }
        }),
        Commands::Restore {
            input,
            target,
            output,
            tree,
        } => restore_file(Path::new(&input), Path::new(&target), Path::new(&output), tree),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

use colored::*;
use lbperm::{case, cli};

fn main() {
    let matches = cli::get_args();
    let config = cli::parse_matches(&matches).unwrap_or_else(|e| {
        eprintln!("{}", e.to_string().red().bold());
        std::process::exit(1);
    });

    if let Err(e) = cli::init_global_pool(config.get_number_of_threads(), config.core_affinity) {
        eprintln!("{}", e.to_string().red().bold());
        std::process::exit(1);
    }

    if let Err(e) = case::run(&config) {
        eprintln!("{}", e.to_string().red().bold());
        std::process::exit(1);
    }
}

// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! `latsearch [--no-tables] [config.json]`
//!
//! Prints the unpermute and stride tables of two small storages, then runs
//! the search described by the JSON configuration, or a demonstration
//! search when no path is given. Set `RUST_LOG` to change the log level.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lattice_search::config::{Method, SearchConfig};
use lattice_search::size::{Compress, SizeParam};
use lattice_search::storage::{PerLevelOrder, Storage};
use lattice_search::weights::{AnyWeights, ProductWeights};
use lattice_search::{LatticeError, Result};

#[derive(Parser)]
#[command(name = "latsearch")]
#[command(author, version, about = "Component-by-component search for rank-1 lattice rules")]
struct Cli {
    /// JSON search configuration; runs a demonstration search when absent
    config: Option<PathBuf>,

    /// Skip the unpermute and stride tables
    #[arg(long)]
    no_tables: bool,
}

fn print_tables(storage: &Storage, strides: &[u64]) -> Result<()> {
    println!(
        "storage {} {} {} (size {}, virtual size {})",
        storage.size_param(),
        storage.compress(),
        storage.order(),
        storage.size(),
        storage.virtual_size()
    );
    let slots = (0..storage.virtual_size() as u64)
        .map(|i| storage.unpermute(i).map(|s| s.to_string()))
        .collect::<Result<Vec<_>>>()?;
    println!("  unpermute: {}", slots.join(" "));
    for &a in strides {
        let stride = storage.stride(a)?;
        let map: Vec<String> = stride.iter().map(|j| j.to_string()).collect();
        println!("  stride {:>2}: {}", a, map.join(" "));
    }
    Ok(())
}

fn demo_tables() -> Result<()> {
    for compress in [Compress::None, Compress::Symmetric] {
        print_tables(&Storage::unilevel(SizeParam::ordinary(12), compress)?, &[1, 5, 7])?;
    }
    let sixteen = SizeParam::embedded(2, 4)?;
    for order in [PerLevelOrder::Basic, PerLevelOrder::Cyclic] {
        print_tables(&Storage::new(sixteen, Compress::None, order)?, &[1, 3, 5])?;
    }
    Ok(())
}

fn demo_config() -> SearchConfig {
    SearchConfig {
        modulus: Some(1021),
        dimension: 8,
        method: Method::FastCbc,
        weights: AnyWeights::Product(ProductWeights::uniform(0.7)),
        ..SearchConfig::default()
    }
}

fn run(cli: Cli) -> Result<()> {
    if !cli.no_tables {
        demo_tables()?;
    }
    let config = match cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                LatticeError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
            })?;
            SearchConfig::from_json(&text)?
        }
        None => demo_config(),
    };
    let mut task = config.build()?;
    info!(task = %task.name(), "starting search");
    task.execute()?;
    if let (Some(lat), Some(merit)) = (task.best_lattice(), task.best_merit()) {
        info!(lattice = %lat, merit = %merit, "best lattice");
        println!("{}", lat);
        println!("merit: {}", merit);
    }
    info!(statistics = %task.statistics(), "done");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "search failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["latsearch", "--no-tables", "search.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("search.json")));
        assert!(cli.no_tables);
        let bare = Cli::try_parse_from(["latsearch"]).unwrap();
        assert!(bare.config.is_none());
        assert!(!bare.no_tables);
        assert!(Cli::try_parse_from(["latsearch", "a.json", "b.json"]).is_err());
    }
}

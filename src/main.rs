/*!
 * Find the eighth register value that gets the teleporter past its
 * confirmation routine.
 *
 * Author: Dave Eddy <ysap@daveeddy.com>
 * Date: December 23, 2025
 * License: MIT
 */

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use synacor_teleporter::{
    Progress, ScanMode, Search, SearchConfig, Strategy,
};

#[derive(Parser)]
#[command(name = "teleporter")]
#[command(about = "Search for the teleporter confirmation value")]
struct Cli {
    /// JSON config file, flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial first argument
    #[arg(long)]
    a0: Option<u16>,

    /// Initial second argument
    #[arg(long)]
    b0: Option<u16>,

    /// Value the routine has to return
    #[arg(long)]
    target: Option<u16>,

    /// Wraparound base
    #[arg(long)]
    modulus: Option<u32>,

    /// First candidate (inclusive)
    #[arg(long)]
    start: Option<u16>,

    /// Last candidate (inclusive)
    #[arg(long)]
    end: Option<u16>,

    /// Stop at the first match
    #[arg(long)]
    first_match: bool,

    /// Spread candidates over a thread pool
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel
    #[arg(long)]
    threads: Option<usize>,

    /// Disable the memo table (only sensible for tiny domains)
    #[arg(long)]
    naive: bool,

    /// Use native recursion, falling back to the work stack when too deep
    #[arg(long)]
    recursive: bool,

    /// Print the final result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_file(path)?,
            None => SearchConfig::default(),
        };

        if let Some(v) = self.a0 {
            config.a0 = v;
        }
        if let Some(v) = self.b0 {
            config.b0 = v;
        }
        if let Some(v) = self.target {
            config.target = v;
        }
        if let Some(v) = self.modulus {
            config.modulus = v;
        }
        if let Some(v) = self.start {
            config.range.start = v;
        }
        if let Some(v) = self.end {
            config.range.end = Some(v);
        }
        if self.first_match {
            config.mode = ScanMode::FirstMatch;
        }
        if self.parallel {
            config.parallel = true;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if self.naive {
            config.memoize = false;
        }
        if self.recursive {
            config.strategy = Strategy::Recursive;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "> {}", record.args()))
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let config = cli.into_config()?;

    let search = Search::new(config).context("invalid search config")?;
    debug!("config: {:?}", search.config());

    let result = search.run(&|p| match p {
        Progress::Trying(c) => println!("trying to solve c={}", c),
        Progress::Matched(c) => println!("{} worked!", c),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    println!(
        "search finished: {} tried, matches: {:?}",
        result.tried, result.matches
    );

    Ok(())
}

// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

mod analyzer;
mod cmd;
mod constants;
mod convert;
mod database;
mod dialect;
mod differ;
mod duckdb;
mod error;
mod graph;
mod key;
mod merger;
mod parser;
mod pk;
mod progress;
mod query;
mod redactor;
mod rowdiff;
mod sample;
mod schema;
mod scheduler;
mod segment;
mod shard;
mod splitter;
mod tableschema;
mod validate;
mod writer;

use clap::Parser;
use cmd::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cmd::run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

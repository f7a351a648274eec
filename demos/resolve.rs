use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

#[derive(Debug, Parser)]
struct Cli {
    /// tsconfig.json files to resolve; defaults to the one governing the
    /// current directory
    #[arg()]
    pub tsconfig_files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let tsconfig_files = if cli.tsconfig_files.is_empty() {
        let current_dir = std::env::current_dir()?;
        let tsconfig_file = tsconfig_layout::find_tsconfig(&current_dir)
            .ok_or_else(|| anyhow!("no tsconfig.json found above {:?}", current_dir))?;
        vec![tsconfig_file]
    } else {
        cli.tsconfig_files
    };

    let resolutions = tsconfig_layout::resolve_tsconfig_files(&tsconfig_files)?;
    writeln!(io::stdout(), "{}", serde_json::to_string_pretty(&resolutions)?)?;
    Ok(())
}

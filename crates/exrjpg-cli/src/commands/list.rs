//! EXR listing command

use crate::ListArgs;
use anyhow::{Context, Result};
use exrjpg_pipeline::list_exr_files;

pub fn run(args: ListArgs) -> Result<()> {
    let files = list_exr_files(&args.input)
        .with_context(|| format!("Failed to list: {}", args.input.display()))?;

    if files.is_empty() {
        eprintln!("No EXR files in {}", args.input.display());
        return Ok(());
    }
    for file in &files {
        println!("{}", file.display());
    }
    Ok(())
}

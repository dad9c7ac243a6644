//! exrjpg - convert linear EXR images to display JPEGs

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use exrjpg_core::{InputSpace, OutputSpace};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "exrjpg")]
#[command(author, version, about = "Convert linear EXR images to display JPEGs")]
#[command(long_about = "
Converts every EXR in a folder to an 8-bit JPEG, either through an ACES
OCIO config (ACEScg input) or a plain sRGB / Rec.709 gamma curve (RAW input).

Output files are named {input}_to_{output}_{basename}.jpg.

Examples:
  exrjpg convert renders/ -o previews/ --from RAW --to sRGB
  exrjpg convert renders/ -o previews/ --from ACEScg --to Rec709 --config aces_1.2/config.ocio
  exrjpg convert renders/ -o previews/ --dry-run
  exrjpg list renders/
  exrjpg spaces --config aces_1.2/config.ocio
")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write log records to this file
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a folder of EXR files to JPEG
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// List the EXR files of a folder in processing order
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show color spaces, roles and displays of an OCIO config
    Spaces(SpacesArgs),
}

#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Folder containing EXR files
    pub input: PathBuf,

    /// Output folder (created if missing)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input color space: ACEScg or RAW
    #[arg(long, default_value = "ACEScg")]
    pub from: InputSpace,

    /// Output color space: sRGB or Rec709
    #[arg(long, default_value = "sRGB")]
    pub to: OutputSpace,

    /// OCIO config (defaults to $OCIO)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = exrjpg_io::DEFAULT_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Stop at the first file that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Print what would be written without converting
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Folder containing EXR files
    pub input: PathBuf,
}

#[derive(Args)]
pub(crate) struct SpacesArgs {
    /// OCIO config (defaults to $OCIO)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose, cli.log.as_deref())?;

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::List(args) => commands::list::run(args),
        Commands::Spaces(args) => commands::spaces::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_defaults() {
        let cli = Cli::try_parse_from(["exrjpg", "convert", "in"]).unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.from, InputSpace::AcesCg);
        assert_eq!(args.to, OutputSpace::Srgb);
        assert_eq!(args.quality, 98);
        assert!(args.output.is_none());
        assert!(!args.fail_fast);
    }

    #[test]
    fn convert_flags() {
        let cli = Cli::try_parse_from([
            "exrjpg", "-vv", "convert", "in", "-o", "out", "--from", "raw", "--to", "rec.709",
            "-q", "80", "--fail-fast", "-j", "2",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, 2);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.from, InputSpace::Raw);
        assert_eq!(args.to, OutputSpace::Rec709);
        assert_eq!(args.quality, 80);
        assert!(args.fail_fast);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["exrjpg", "convert", "in", "--to", "p3"]).is_err());
        assert!(Cli::try_parse_from(["exrjpg", "convert", "in", "-q", "0"]).is_err());
        assert!(Cli::try_parse_from(["exrjpg", "convert", "in", "-q", "101"]).is_err());
    }
}

//! Folder conversion command

use super::{display_name, format_duration};
use crate::ConvertArgs;
use anyhow::{bail, Context, Result};
use exrjpg_pipeline::{convert_batch, plan, BatchEvent, BatchRequest, ErrorPolicy, Notifier};
use tracing::{info, trace};

/// Prints batch progress to the terminal.
struct Console {
    verbose: u8,
}

impl Notifier for Console {
    fn notify(&mut self, event: &BatchEvent<'_>) {
        match event {
            BatchEvent::Started {
                total,
                output_dir,
                transform,
            } => {
                if self.verbose > 0 {
                    println!(
                        "Converting {} files to {} using {}",
                        total,
                        output_dir.display(),
                        transform
                    );
                }
            }
            BatchEvent::FileConverted { index, total, file } => {
                println!(
                    "[{}/{}] {} -> {} ({})",
                    index + 1,
                    total,
                    display_name(&file.input),
                    display_name(&file.output),
                    format_duration(file.elapsed)
                );
            }
            BatchEvent::FileFailed {
                index,
                total,
                input,
                error,
            } => {
                eprintln!("[{}/{}] {}: {}", index + 1, total, display_name(input), error);
            }
            BatchEvent::Finished { report } => {
                println!(
                    "Converted: {}, failed: {}, output: {} ({})",
                    report.converted_count(),
                    report.failed_count(),
                    report.output_dir.display(),
                    format_duration(report.elapsed)
                );
            }
        }
    }
}

pub fn run(args: ConvertArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), from = %args.from, to = %args.to, "convert::run");

    let mut request = BatchRequest::new(&args.input, args.from, args.to)
        .quality(args.quality)
        .policy(if args.fail_fast {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Continue
        });
    if let Some(output) = &args.output {
        request = request.output_dir(output);
    }
    if let Some(config) = &args.config {
        request = request.config(config);
    }

    if args.dry_run {
        let planned = plan(&request)
            .with_context(|| format!("Cannot convert {}", args.input.display()))?;
        for file in &planned {
            println!("{} -> {}", file.input.display(), file.output.display());
        }
        info!(files = planned.len(), "dry run, nothing written");
        return Ok(());
    }

    let report = convert_batch(&request, &mut Console { verbose })
        .with_context(|| format!("Conversion of {} stopped", args.input.display()))?;

    if !report.is_success() {
        bail!(
            "{} of {} files failed",
            report.failed_count(),
            report.failed_count() + report.converted_count()
        );
    }
    Ok(())
}

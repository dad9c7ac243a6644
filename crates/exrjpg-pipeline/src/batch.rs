//! Folder conversion.
//!
//! A batch lists the `.exr` files of one folder in lexicographic order and
//! converts each into the output folder. Pre-flight checks run before any
//! file is touched:
//!
//! 1. the input folder holds at least one EXR ([`ConvertError::NoInput`])
//! 2. an output folder is selected ([`ConvertError::NoOutputFolder`])
//! 3. the color transform resolves ([`ConvertError::ColorTransform`])
//!
//! Only then is the output folder created and the first file decoded.

use crate::{convert_with, ColorTransform, ConvertError, ConvertOptions, ConvertResult};
use exrjpg_core::{output_filename, InputSpace, OutputSpace};
use exrjpg_io::is_exr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What to do when a single file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Report the file and move on.
    #[default]
    Continue,
    /// Stop at the first failure and return it.
    Abort,
}

/// Lists `.exr` files (case-insensitive) directly inside `folder`, sorted
/// by file name. Subdirectories are not descended into.
pub fn list_exr_files(folder: &Path) -> ConvertResult<Vec<PathBuf>> {
    let io_err = |source| ConvertError::Io {
        path: folder.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_exr(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// A folder conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Folder to read EXR files from.
    pub input_dir: PathBuf,
    /// Folder to write JPEG files to. Created if absent.
    pub output_dir: Option<PathBuf>,
    /// Interpretation of the input pixels.
    pub input_space: InputSpace,
    /// Target display encoding.
    pub output_space: OutputSpace,
    /// Config path and JPEG quality.
    pub options: ConvertOptions,
    /// Per-file failure handling.
    pub policy: ErrorPolicy,
}

impl BatchRequest {
    /// Creates a request with default options and no output folder.
    pub fn new(input_dir: impl Into<PathBuf>, input_space: InputSpace, output_space: OutputSpace) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            input_space,
            output_space,
            options: ConvertOptions::default(),
            policy: ErrorPolicy::default(),
        }
    }

    /// Sets the output folder.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the OCIO config path.
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.config = Some(path.into());
        self
    }

    /// Sets the JPEG quality.
    pub fn quality(mut self, quality: u8) -> Self {
        self.options.quality = quality;
        self
    }

    /// Sets the error policy.
    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// One planned conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Source EXR.
    pub input: PathBuf,
    /// Destination JPEG.
    pub output: PathBuf,
}

/// Runs the listing and folder pre-flight checks and returns the mapping
/// of inputs to outputs. Nothing is written.
pub fn plan(request: &BatchRequest) -> ConvertResult<Vec<PlannedFile>> {
    let files = list_exr_files(&request.input_dir)?;
    if files.is_empty() {
        return Err(ConvertError::NoInput(request.input_dir.clone()));
    }
    let output_dir = request
        .output_dir
        .as_deref()
        .ok_or(ConvertError::NoOutputFolder)?;

    Ok(files
        .into_iter()
        .map(|input| {
            let name = output_filename(&input, request.input_space, request.output_space);
            PlannedFile {
                output: output_dir.join(name),
                input,
            }
        })
        .collect())
}

/// Progress notification.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Pre-flight passed; conversion is about to start.
    Started {
        /// Number of files to convert.
        total: usize,
        /// Destination folder.
        output_dir: &'a Path,
        /// Transform that will be applied.
        transform: &'a ColorTransform,
    },
    /// A file was written.
    FileConverted {
        /// Zero-based position in the batch.
        index: usize,
        /// Number of files in the batch.
        total: usize,
        /// The written file.
        file: &'a ConvertedFile,
    },
    /// A file failed.
    FileFailed {
        /// Zero-based position in the batch.
        index: usize,
        /// Number of files in the batch.
        total: usize,
        /// Source EXR.
        input: &'a Path,
        /// Why it failed.
        error: &'a ConvertError,
    },
    /// All files were attempted.
    Finished {
        /// Final report.
        report: &'a BatchReport,
    },
}

/// Receives [`BatchEvent`]s while a batch runs.
pub trait Notifier {
    /// Called for every event, in order.
    fn notify(&mut self, event: &BatchEvent<'_>);
}

impl<F: FnMut(&BatchEvent<'_>)> Notifier for F {
    fn notify(&mut self, event: &BatchEvent<'_>) {
        self(event)
    }
}

/// Notifier that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&mut self, _event: &BatchEvent<'_>) {}
}

/// A successfully converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    /// Source EXR.
    pub input: PathBuf,
    /// Written JPEG.
    pub output: PathBuf,
    /// Time spent on this file.
    pub elapsed: Duration,
}

/// A file that could not be converted.
#[derive(Debug)]
pub struct FailedFile {
    /// Source EXR.
    pub input: PathBuf,
    /// Why it failed.
    pub error: ConvertError,
}

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Destination folder.
    pub output_dir: PathBuf,
    /// Converted files, in processing order.
    pub converted: Vec<ConvertedFile>,
    /// Failed files, in processing order.
    pub failed: Vec<FailedFile>,
    /// Total wall time.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of files written.
    pub fn converted_count(&self) -> usize {
        self.converted.len()
    }

    /// Number of files that failed.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// True when every file converted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts every EXR of `request.input_dir`.
///
/// The color transform is resolved once and shared by all files. Per-file
/// errors follow `request.policy`: with [`ErrorPolicy::Continue`] they are
/// collected into the report, with [`ErrorPolicy::Abort`] the first one is
/// returned.
pub fn convert_batch(request: &BatchRequest, notifier: &mut dyn Notifier) -> ConvertResult<BatchReport> {
    let start = Instant::now();
    let planned = plan(request)?;
    let transform = ColorTransform::resolve(
        request.input_space,
        request.output_space,
        request.options.config.as_deref(),
    )?;

    let output_dir = request
        .output_dir
        .clone()
        .ok_or(ConvertError::NoOutputFolder)?;
    std::fs::create_dir_all(&output_dir).map_err(|source| ConvertError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let total = planned.len();
    info!(
        total,
        input_dir = %request.input_dir.display(),
        output_dir = %output_dir.display(),
        transform = %transform,
        "starting batch"
    );
    notifier.notify(&BatchEvent::Started {
        total,
        output_dir: &output_dir,
        transform: &transform,
    });

    let writer = request.options.writer();
    let mut report = BatchReport {
        output_dir: output_dir.clone(),
        converted: Vec::with_capacity(total),
        failed: Vec::new(),
        elapsed: Duration::ZERO,
    };

    for (index, PlannedFile { input, output }) in planned.into_iter().enumerate() {
        match convert_with(&input, &output, &transform, &writer) {
            Ok(stats) => {
                let file = ConvertedFile {
                    input,
                    output,
                    elapsed: stats.elapsed,
                };
                notifier.notify(&BatchEvent::FileConverted {
                    index,
                    total,
                    file: &file,
                });
                report.converted.push(file);
            }
            Err(error) => {
                debug!(input = %input.display(), kind = error.kind(), "{}", error);
                notifier.notify(&BatchEvent::FileFailed {
                    index,
                    total,
                    input: &input,
                    error: &error,
                });
                if request.policy == ErrorPolicy::Abort || !error.is_per_file() {
                    return Err(error);
                }
                report.failed.push(FailedFile { input, error });
            }
        }
    }

    report.elapsed = start.elapsed();
    debug!(
        converted = report.converted_count(),
        failed = report.failed_count(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "batch finished"
    );
    notifier.notify(&BatchEvent::Finished { report: &report });
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn listing_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.exr", "A.EXR", "c.jpg", "a.exr", "notes.txt", ".exr"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.exr")).unwrap();

        let names: Vec<_> = list_exr_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, [".exr", "A.EXR", "a.exr", "b.exr"]);
    }

    #[test]
    fn listing_missing_folder_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_exr_files(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn plan_checks_input_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let request = BatchRequest::new(dir.path(), InputSpace::Raw, OutputSpace::Srgb);
        assert!(matches!(plan(&request), Err(ConvertError::NoInput(_))));

        fs::write(dir.path().join("shot.exr"), b"").unwrap();
        assert!(matches!(plan(&request), Err(ConvertError::NoOutputFolder)));
    }

    #[test]
    fn plan_names_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("shot01.exr"), b"").unwrap();
        let out = dir.path().join("out");
        let request =
            BatchRequest::new(dir.path(), InputSpace::Raw, OutputSpace::Srgb).output_dir(&out);

        let planned = plan(&request).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].output, out.join("RAW_to_sRGB_shot01.jpg"));
        assert!(!out.exists());
    }

    #[test]
    fn request_builder() {
        let r = BatchRequest::new("in", InputSpace::AcesCg, OutputSpace::Rec709)
            .output_dir("out")
            .config("config.ocio")
            .quality(80)
            .policy(ErrorPolicy::Abort);
        assert_eq!(r.output_dir.as_deref(), Some(Path::new("out")));
        assert_eq!(r.options.config.as_deref(), Some(Path::new("config.ocio")));
        assert_eq!(r.options.quality, 80);
        assert_eq!(r.policy, ErrorPolicy::Abort);
    }
}

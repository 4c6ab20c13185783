//! Engine option values
//!
//! The enumeration and download phases get two distinct immutable values built
//! from one shared base; neither is modified after construction.

use std::path::{Path, PathBuf};

/// File name template used for every downloaded item
pub const ITEM_FILENAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Which engine call an options value is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Shared base, not meant to be passed to the engine directly
    Base,
    /// Metadata-only enumeration
    Enumerate,
    /// Full download
    Download,
}

/// Options passed to a [`MediaEngine`](super::MediaEngine) call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    phase: Phase,
    ignore_errors: bool,
    quiet: bool,
    no_warnings: bool,
    format: Option<String>,
    output_dir: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl EngineOptions {
    /// Shared base: skip unavailable items, suppress warnings
    pub fn base(extra_args: Vec<String>) -> Self {
        Self {
            phase: Phase::Base,
            ignore_errors: true,
            quiet: true,
            no_warnings: true,
            format: None,
            output_dir: None,
            extra_args,
        }
    }

    /// Metadata-only options derived from this base
    pub fn for_enumeration(&self) -> Self {
        Self {
            phase: Phase::Enumerate,
            format: None,
            output_dir: None,
            ..self.clone()
        }
    }

    /// Download options derived from this base
    ///
    /// Every item is written to `<output_dir>/<title>.<ext>`.
    pub fn for_download(&self, format: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            phase: Phase::Download,
            format: Some(format.into()),
            output_dir: Some(output_dir.into()),
            ..self.clone()
        }
    }

    /// Phase this value was built for
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether media download is suppressed (metadata-only)
    pub fn extract_flat(&self) -> bool {
        self.phase != Phase::Download
    }

    /// Whether per-item failures are skipped
    pub fn ignore_errors(&self) -> bool {
        self.ignore_errors
    }

    /// Whether engine chatter is suppressed
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Whether engine warnings are suppressed
    pub fn no_warnings(&self) -> bool {
        self.no_warnings
    }

    /// Format selector (download phase only)
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Output directory (download phase only)
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Full output template (download phase only)
    pub fn output_template(&self) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(ITEM_FILENAME_TEMPLATE))
    }

    /// Extra engine arguments
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }
}

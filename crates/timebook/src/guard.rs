//! Workbook open/save with retry
//!
//! The workbook is a shared file that another program may briefly hold
//! open. Opening is retried a few times; saving is attempted once.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use timebook_xlsx::XlsmDocument;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// How often, and how patiently, to retry opening the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of open attempts
    pub attempts: u32,
    /// Pause between two attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(1200),
        }
    }
}

impl RetryPolicy {
    /// Try exactly once
    pub fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Opens and saves the workbook file at a fixed path
#[derive(Debug, Clone)]
pub struct WorkbookGuard {
    path: PathBuf,
    retry: RetryPolicy,
}

impl WorkbookGuard {
    /// Create a guard for the workbook at `path`
    pub fn new<P: Into<PathBuf>>(path: P, retry: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            retry,
        }
    }

    /// Path of the guarded workbook
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retry policy used by [`WorkbookGuard::open`]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Open the workbook, keeping its macro payload.
    ///
    /// Failed attempts are retried until the policy is exhausted; the last
    /// cause is reported in [`Error::Unavailable`].
    pub fn open(&self) -> Result<XlsmDocument> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;

        loop {
            match XlsmDocument::open(&self.path) {
                Ok(doc) => {
                    debug!(path = %self.path.display(), attempt, "workbook opened");
                    return Ok(doc);
                }
                Err(source) if attempt >= attempts => {
                    return Err(Error::Unavailable {
                        path: self.path.clone(),
                        attempts,
                        source,
                    });
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        attempt,
                        attempts,
                        "cannot open workbook, retrying: {}",
                        e
                    );
                    thread::sleep(self.retry.delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Write the document back to the guarded path
    pub fn save(&self, doc: &mut XlsmDocument) -> Result<()> {
        doc.save(&self.path).map_err(|source| Error::Save {
            path: self.path.clone(),
            source,
        })
    }
}

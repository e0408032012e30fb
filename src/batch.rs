//! Parallel multi-font builds
//!
//! Each build runs on its own worker with its own pipeline; builds share
//! nothing except the work queue, so output directories must be distinct.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::BuildOptions;
use crate::pipeline::{BuildFailure, BuildResult};

/// Outcome of one build inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub font_name: String,
    pub result: BuildResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// In manifest order
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|entry| entry.result.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|entry| !entry.result.is_success())
    }
}

/// Run `build` for every option set using up to `jobs` worker threads
pub fn run_batch<F>(builds: &[BuildOptions], jobs: usize, build: F) -> Result<BatchReport>
where
    F: Fn(&BuildOptions) -> BuildResult + Sync,
{
    let mut outputs = HashSet::new();
    for options in builds {
        if !outputs.insert(&options.output_directory_path) {
            return Err(anyhow::anyhow!(
                "Output directory '{}' is used by more than one build",
                options.output_directory_path.display()
            ));
        }
    }

    let workers = jobs.clamp(1, builds.len().max(1));
    info!(builds = builds.len(), workers, "Starting batch build");

    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<BuildResult>>> = Mutex::new(vec![None; builds.len()]);

    thread::scope(|scope| {
        for worker in 0..workers {
            let next = &next;
            let slots = &slots;
            let build = &build;
            scope.spawn(move || {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(options) = builds.get(index) else {
                        break;
                    };
                    debug!(worker, font = %options.font_name, "Worker picked up build");

                    let result = panic::catch_unwind(AssertUnwindSafe(|| build(options)))
                        .unwrap_or_else(|_| {
                            warn!(font = %options.font_name, "Build panicked");
                            BuildResult::Failed(BuildFailure::Panicked)
                        });

                    slots.lock().unwrap_or_else(PoisonError::into_inner)[index] = Some(result);
                }
            });
        }
    });

    let results = slots.into_inner().unwrap_or_else(PoisonError::into_inner);
    let entries = builds
        .iter()
        .zip(results)
        .map(|(options, result)| BatchEntry {
            font_name: options.font_name.clone(),
            result: result.unwrap_or(BuildResult::Failed(BuildFailure::Panicked)),
        })
        .collect();

    let report = BatchReport { entries };
    info!(
        succeeded = report.entries.len() - report.failed().count(),
        failed = report.failed().count(),
        "Batch build finished"
    );
    Ok(report)
}

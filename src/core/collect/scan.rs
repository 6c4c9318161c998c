//! Release-candidate artifact scan.
//!
//! Walks the artifact listing page by page and hands the first same-day
//! occurrence of every expected artifact to a callback. The listing is assumed
//! newest-first: the first release-candidate artifact fixes the day, and the
//! first artifact from any other day ends the scan.

use chrono::NaiveDate;
use serde::Serialize;

use super::spec::ArtifactSpec;
use crate::error::Result;
use crate::github::{Artifact, ArtifactSource};

/// What to do with one listed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Not built from the release-candidate branch.
    Skip,
    /// Same-day candidate that is either unexpected or already handled.
    Seen,
    /// First occurrence of the expected artifact at this index.
    Take(usize),
    /// Built on a different day than the first candidate.
    Stop { day: NaiveDate },
}

/// Scan progress: the first-day marker plus one found-flag per expected artifact.
#[derive(Debug, Clone)]
pub struct ScanState {
    first_day: Option<NaiveDate>,
    found: Vec<bool>,
}

impl ScanState {
    pub fn new(expected: usize) -> Self {
        Self {
            first_day: None,
            found: vec![false; expected],
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.first_day
    }

    pub fn is_found(&self, index: usize) -> bool {
        self.found.get(index).copied().unwrap_or(false)
    }

    pub fn all_found(&self) -> bool {
        self.found.iter().all(|f| *f)
    }

    pub fn missing<'a>(&self, specs: &'a [ArtifactSpec]) -> Vec<&'a ArtifactSpec> {
        specs
            .iter()
            .zip(&self.found)
            .filter(|(_, found)| !**found)
            .map(|(spec, _)| spec)
            .collect()
    }

    /// Classify one artifact and update the state.
    ///
    /// The first release-candidate artifact sets the day marker. A `Take`
    /// flips that artifact's found-flag, so a repeated name is only ever
    /// taken once.
    pub fn classify(
        &mut self,
        artifact: &Artifact,
        specs: &[ArtifactSpec],
        rc_branch: &str,
    ) -> Result<Decision> {
        if artifact.branch() != Some(rc_branch) {
            return Ok(Decision::Skip);
        }

        let day = artifact.created_day()?;
        let first_day = *self.first_day.get_or_insert(day);
        if day != first_day {
            return Ok(Decision::Stop { day });
        }

        let index = specs.iter().position(|spec| spec.name == artifact.name);
        let slot = index.and_then(|i| self.found.get_mut(i).map(|flag| (i, flag)));

        match slot {
            Some((i, flag)) if !*flag => {
                *flag = true;
                Ok(Decision::Take(i))
            }
            _ => Ok(Decision::Seen),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every expected artifact was handled.
    AllFound,
    /// An artifact from an earlier run day was reached.
    DayBoundary,
    /// The page bound was reached first.
    PageLimit,
    /// The listing ran out of artifacts.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub rc_branch: String,
    pub max_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_day: Option<String>,
    pub missing: Vec<String>,
}

/// Scan the listing, calling `on_take` for the first same-day occurrence of
/// each expected artifact. Errors from the source or the callback end the scan.
pub fn scan<S, F>(
    source: &S,
    specs: &[ArtifactSpec],
    options: &ScanOptions,
    mut on_take: F,
) -> Result<ScanSummary>
where
    S: ArtifactSource + ?Sized,
    F: FnMut(&Artifact, &ArtifactSpec) -> Result<()>,
{
    let mut state = ScanState::new(specs.len());
    let mut pages_fetched = 0;

    let stop_reason = 'pages: {
        for page in 1..=options.max_pages {
            if state.all_found() {
                break 'pages StopReason::AllFound;
            }

            let listing = source.fetch_page(page)?;
            pages_fetched += 1;
            log_status!(
                "collect",
                "Page {}: {} artifacts in the repository",
                page,
                listing.total_count
            );

            if listing.artifacts.is_empty() {
                break 'pages StopReason::Exhausted;
            }

            for artifact in &listing.artifacts {
                let had_marker = state.first_day().is_some();

                match state.classify(artifact, specs, &options.rc_branch)? {
                    Decision::Skip => continue,
                    Decision::Seen => {}
                    Decision::Take(index) => {
                        let spec = &specs[index];
                        log_status!("collect", "Found {} artifact ({})", spec.label, artifact.name);
                        on_take(artifact, spec)?;
                    }
                    Decision::Stop { day } => {
                        let marker = state.first_day();
                        if marker.is_some_and(|m| day > m) {
                            log_status!(
                                "collect",
                                "Listing out of order: {} ({}) is newer than {}",
                                artifact.name,
                                day,
                                marker.map(|m| m.to_string()).unwrap_or_default()
                            );
                        }
                        log_status!(
                            "collect",
                            "End of {} artifacts ({} @ {})",
                            options.rc_branch,
                            artifact.name,
                            day
                        );
                        break 'pages StopReason::DayBoundary;
                    }
                }

                if !had_marker {
                    if let Some(day) = state.first_day() {
                        log_status!("collect", "First {} artifact at {}", options.rc_branch, day);
                    }
                }

                if state.all_found() {
                    break 'pages StopReason::AllFound;
                }
            }
        }

        if state.all_found() {
            StopReason::AllFound
        } else {
            StopReason::PageLimit
        }
    };

    Ok(ScanSummary {
        pages_fetched,
        stop_reason,
        first_day: state.first_day().map(|d| d.to_string()),
        missing: state
            .missing(specs)
            .into_iter()
            .map(|spec| spec.name.clone())
            .collect(),
    })
}

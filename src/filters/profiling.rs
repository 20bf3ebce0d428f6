//! Phase instrumentation for the domain transform filter.
//!
//! The filter reports the start and end of its phases to a
//! [`FilterObserver`]. Observers are purely observational and never change
//! the numerical result.

use std::time::{Duration, Instant};

/// Named phases of one filter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPhase {
    /// The whole filter call.
    Filter,
    /// Distance field construction and prefix sums.
    DomainTransform,
    /// One box filter pass over all rows of a buffer.
    BoxFilter,
}

impl FilterPhase {
    pub fn name(self) -> &'static str {
        match self {
            FilterPhase::Filter => "filter",
            FilterPhase::DomainTransform => "domain_transform",
            FilterPhase::BoxFilter => "box_filter",
        }
    }
}

/// Receives phase markers from the filter.
pub trait FilterObserver {
    fn phase_start(&mut self, _phase: FilterPhase) {}
    fn phase_end(&mut self, _phase: FilterPhase) {}
}

/// Observer that ignores every marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FilterObserver for NoopObserver {}

/// Observer that times phases and reports them through the `log` facade.
///
/// Box filter passes are accumulated; the total is logged when the
/// enclosing [`FilterPhase::Filter`] phase ends.
#[derive(Debug, Default)]
pub struct LogObserver {
    started: Vec<(FilterPhase, Instant)>,
    box_filter_total: Duration,
    box_filter_passes: usize,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time spent in box filter passes so far.
    pub fn box_filter_total(&self) -> Duration {
        self.box_filter_total
    }

    /// Number of completed box filter passes.
    pub fn box_filter_passes(&self) -> usize {
        self.box_filter_passes
    }
}

impl FilterObserver for LogObserver {
    fn phase_start(&mut self, phase: FilterPhase) {
        self.started.push((phase, Instant::now()));
    }

    fn phase_end(&mut self, phase: FilterPhase) {
        let Some(pos) = self.started.iter().rposition(|(p, _)| *p == phase) else {
            log::warn!("phase {} ended without start", phase.name());
            return;
        };
        let (_, start) = self.started.remove(pos);
        let elapsed = start.elapsed();

        match phase {
            FilterPhase::BoxFilter => {
                self.box_filter_total += elapsed;
                self.box_filter_passes += 1;
                log::trace!("box_filter pass {} took {:?}", self.box_filter_passes, elapsed);
            }
            FilterPhase::DomainTransform => {
                log::debug!("domain_transform took {:?}", elapsed);
            }
            FilterPhase::Filter => {
                log::debug!(
                    "filter took {:?} ({} box filter passes, {:?})",
                    elapsed,
                    self.box_filter_passes,
                    self.box_filter_total
                );
            }
        }
    }
}

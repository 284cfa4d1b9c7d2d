//! TickRunner - 1 回の起動で行う処理（per-tick driver）
//!
//! # フロー
//! 1. retention_days == 0 なら何もしない
//! 2. discover（失敗したら tick 全体が失敗）
//! 3. resource ごとに AgingTracker::evaluate
//! 4. Reap なら Reaper::reap → Notifier::notify
//!
//! resource 単位の失敗（store / delete / notify）は他の resource の処理を止めない。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::RetentionConfig;
use crate::domain::{Decision, Resource, TickError};
use crate::ports::{Clock, Inventory, Notifier, ResourceDeleter, TrackingStore};

use super::discovery::discover;
use super::reaper::Reaper;
use super::status::TickSummary;
use super::tracker::AgingTracker;

/// What happened to a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceOutcome {
    Tracked,
    Waiting,
    Reaped,
    WouldReap,
    Failed,
}

pub struct TickRunner {
    config: RetentionConfig,
    inventory: Arc<dyn Inventory>,
    tracker: AgingTracker,
    reaper: Reaper,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl TickRunner {
    pub fn new(
        config: RetentionConfig,
        inventory: Arc<dyn Inventory>,
        store: Arc<dyn TrackingStore>,
        deleter: Arc<dyn ResourceDeleter>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tracker: AgingTracker::new(Arc::clone(&store), config.retention_days),
            reaper: Reaper::new(deleter, store),
            config,
            inventory,
            notifier,
            clock,
        }
    }

    /// Entry point for the scheduler. Never fails; the summary carries the
    /// outcome.
    pub async fn trigger(&self) -> TickSummary {
        match self.run_tick().await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "tick failed");
                TickSummary::failed(e.to_string())
            }
        }
    }

    pub async fn run_tick(&self) -> Result<TickSummary, TickError> {
        if !self.config.reaping_enabled() {
            info!("retention_days is 0, reaping disabled");
            return Ok(TickSummary::disabled());
        }

        let resources = discover(self.inventory.as_ref(), &self.config).await?;
        let now = self.clock.now();

        info!(
            candidates = resources.len(),
            retention_days = self.config.retention_days,
            dry_run = self.config.dry_run,
            "starting tick"
        );

        let mut summary = TickSummary {
            success: true,
            enabled: true,
            dry_run: self.config.dry_run,
            discovered: resources.len(),
            ..TickSummary::default()
        };

        for resource in &resources {
            match self.process(resource, now).await {
                ResourceOutcome::Tracked => summary.tracked += 1,
                ResourceOutcome::Waiting => summary.waiting += 1,
                ResourceOutcome::Reaped => summary.reaped += 1,
                ResourceOutcome::WouldReap => summary.would_reap += 1,
                ResourceOutcome::Failed => summary.failed += 1,
            }
        }

        info!(
            discovered = summary.discovered,
            tracked = summary.tracked,
            waiting = summary.waiting,
            reaped = summary.reaped,
            would_reap = summary.would_reap,
            failed = summary.failed,
            "tick completed"
        );
        Ok(summary)
    }

    async fn process(&self, resource: &Resource, now: DateTime<Utc>) -> ResourceOutcome {
        let decision = match self.tracker.evaluate(resource, now).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(resource_id = %resource.id, error = %e, "skipping resource this tick");
                return ResourceOutcome::Failed;
            }
        };

        match decision {
            Decision::Track => ResourceOutcome::Tracked,
            Decision::Wait => ResourceOutcome::Waiting,
            Decision::Reap if self.config.dry_run => {
                info!(
                    resource_id = %resource.id,
                    cluster = ?resource.cluster_owner,
                    name = ?resource.display_name,
                    "dry run: would delete idle resource"
                );
                ResourceOutcome::WouldReap
            }
            Decision::Reap => {
                let event = match self.reaper.reap(resource, now).await {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(
                            resource_id = %resource.id,
                            error = %e,
                            "delete failed, tracking record kept for next tick"
                        );
                        return ResourceOutcome::Failed;
                    }
                };
                if let Err(e) = self.notifier.notify(&event).await {
                    warn!(resource_id = %resource.id, error = %e, "failed to send notification");
                }
                ResourceOutcome::Reaped
            }
        }
    }
}

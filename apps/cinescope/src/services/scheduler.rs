//! Scheduler service for running background jobs on a schedule.
//!
//! Keeps the home page cache warm and drops expired cache entries.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::config::SchedulerConfig;
use crate::error::{AppError, Result};
use crate::services::Catalog;

/// Job execution context providing access to application services.
#[derive(Clone)]
pub struct JobContext {
    pub catalog: Arc<Catalog>,
}

/// The scheduler service managing all background jobs.
pub struct Scheduler {
    scheduler: JobScheduler,
}

impl Scheduler {
    /// Create a new scheduler with all configured jobs.
    pub async fn new(config: &SchedulerConfig, ctx: JobContext) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create scheduler: {}", e)))?;

        Self::add_cache_top_rated_job(&scheduler, &config.cache_top_rated, ctx.clone()).await?;
        Self::add_purge_cache_job(&scheduler, &config.purge_cache, ctx).await?;

        Ok(Self { scheduler })
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start scheduler: {}", e)))
    }

    /// Shutdown the scheduler gracefully.
    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to shutdown scheduler: {}", e)))
    }

    /// Add the weekly top rated refresh job.
    async fn add_cache_top_rated_job(
        scheduler: &JobScheduler,
        cron: &str,
        ctx: JobContext,
    ) -> Result<()> {
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let ctx = ctx.clone();
            Box::pin(async move {
                run_cache_top_rated_job(&ctx).await;
            })
        })
        .map_err(map_scheduler_error)?;

        scheduler.add(job).await.map_err(map_scheduler_error)?;
        tracing::debug!(cron = cron, "Scheduled cache_top_rated job");
        Ok(())
    }

    /// Add the expired cache cleanup job.
    async fn add_purge_cache_job(
        scheduler: &JobScheduler,
        cron: &str,
        ctx: JobContext,
    ) -> Result<()> {
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let ctx = ctx.clone();
            Box::pin(async move {
                run_purge_cache_job(&ctx).await;
            })
        })
        .map_err(map_scheduler_error)?;

        scheduler.add(job).await.map_err(map_scheduler_error)?;
        tracing::debug!(cron = cron, "Scheduled purge_cache job");
        Ok(())
    }
}

fn map_scheduler_error(e: JobSchedulerError) -> AppError {
    AppError::Internal(format!("Scheduler error: {}", e))
}

// ============================================================================
// Job Implementations
// ============================================================================

/// Rebuild the home page listing from the upstream provider.
pub async fn run_cache_top_rated_job(ctx: &JobContext) {
    tracing::info!("Running cache_top_rated job");

    match ctx.catalog.refresh_top_rated(true).await {
        Ok(count) => tracing::info!(count = count, "cache_top_rated job completed"),
        Err(e) => tracing::error!(error = %e, "Failed to cache top rated movies"),
    }
}

/// Remove expired cache entries.
pub async fn run_purge_cache_job(ctx: &JobContext) {
    tracing::debug!("Running purge_cache job");

    if let Err(e) = ctx.catalog.purge_expired().await {
        tracing::error!(error = %e, "Failed to purge expired cache entries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::db::init_db_memory;
    use crate::services::{MovieProvider, ResponseCache};
    use async_trait::async_trait;
    use movie_metadata::{MovieDetails, SearchPage};
    use std::time::Duration;
    use tokio::sync::Mutex;

    struct Offline;

    #[async_trait]
    impl MovieProvider for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn search(&self, _query: &str, _page: u32) -> Result<SearchPage> {
            Err(AppError::Upstream("offline".to_string()))
        }

        async fn details(&self, _id: &str) -> Result<Option<MovieDetails>> {
            Err(AppError::Upstream("offline".to_string()))
        }

        async fn top_rated(&self, _page: u32) -> Result<SearchPage> {
            Err(AppError::Upstream("offline".to_string()))
        }

        async fn popular(&self, _page: u32) -> Result<SearchPage> {
            Err(AppError::Upstream("offline".to_string()))
        }
    }

    fn context() -> (JobContext, ResponseCache) {
        let cache = ResponseCache::new(Arc::new(Mutex::new(init_db_memory().unwrap())));
        let catalog = Catalog::new(Arc::new(Offline), cache.clone(), CacheConfig::default(), 8);
        (
            JobContext {
                catalog: Arc::new(catalog),
            },
            cache,
        )
    }

    #[test]
    fn test_job_context_clone() {
        // JobContext must be Clone for use in async jobs
        fn assert_clone<T: Clone>() {}
        assert_clone::<JobContext>();
    }

    #[tokio::test]
    async fn test_scheduler_accepts_default_crons() {
        let (ctx, _) = context();
        assert!(Scheduler::new(&SchedulerConfig::default(), ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_cron_rejected() {
        let (ctx, _) = context();
        let config = SchedulerConfig {
            purge_cache: "not a cron".to_string(),
            ..Default::default()
        };
        assert!(Scheduler::new(&config, ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_jobs_swallow_failures() {
        let (ctx, cache) = context();
        cache.put("stale", &1, Duration::ZERO).await.unwrap();

        run_cache_top_rated_job(&ctx).await;
        run_purge_cache_job(&ctx).await;

        assert_eq!(cache.len().await.unwrap(), 0);
    }
}

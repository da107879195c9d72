use async_trait::async_trait;

/// Invalidates cached renderings of named views after a write
#[async_trait]
pub trait ViewRevalidator: Send + Sync {
    async fn invalidate(&self, views: &[&str]);
}

/// Records invalidations in the log for the hosting layer to pick up
pub struct LoggingRevalidator;

#[async_trait]
impl ViewRevalidator for LoggingRevalidator {
    async fn invalidate(&self, views: &[&str]) {
        tracing::info!(target: "revalidation", views = ?views, "Views invalidated");
    }
}

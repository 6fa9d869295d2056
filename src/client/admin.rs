use std::future::Future;

use super::{ClientError, ServiceClient};
use crate::models::{SeedOutcome, ServiceHealth, TrainingOutcome};

pub const HEALTH_PATH: &str = "/api/health";
pub const SEED_PATH: &str = "/api/data/seed";
pub const TRAIN_PATH: &str = "/api/data/train";

/// Service maintenance: liveness, demo data, model training. Training itself
/// happens remotely; the client only triggers it.
pub trait AdminClient {
    fn health(&self) -> impl Future<Output = Result<ServiceHealth, ClientError>> + Send;

    fn seed(&self) -> impl Future<Output = Result<SeedOutcome, ClientError>> + Send;

    fn train(&self) -> impl Future<Output = Result<TrainingOutcome, ClientError>> + Send;
}

impl AdminClient for ServiceClient {
    async fn health(&self) -> Result<ServiceHealth, ClientError> {
        let url = self.url(HEALTH_PATH, &[])?;
        let health: ServiceHealth = self.get_json(url, &[]).await?;
        tracing::debug!(
            status = %health.status,
            database = %health.database,
            ml_model = %health.ml_model,
            "Health check"
        );
        Ok(health)
    }

    async fn seed(&self) -> Result<SeedOutcome, ClientError> {
        let url = self.url(SEED_PATH, &[])?;
        let outcome: SeedOutcome = self.post_json::<(), _>(url, None).await?;
        tracing::info!(count = outcome.count, "Seeded sample data");
        Ok(outcome)
    }

    async fn train(&self) -> Result<TrainingOutcome, ClientError> {
        let url = self.url(TRAIN_PATH, &[])?;
        let outcome: TrainingOutcome = self.post_json::<(), _>(url, None).await?;
        tracing::info!(
            accuracy = outcome.accuracy,
            n_classes = outcome.n_classes,
            n_samples = outcome.n_samples,
            "Model trained"
        );
        Ok(outcome)
    }
}

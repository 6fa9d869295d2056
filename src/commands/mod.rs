//! Terminal front end. One subcommand per page of the desk.
//!
//! Handlers return the text to print, or a one-line error message.

pub mod diagnosis;
pub mod records;
pub mod upload;

use std::path::PathBuf;

use clap::Subcommand;

use crate::client::{AdminClient, PredictionClient, RecordsClient};
use crate::models::{spreadsheet_columns, ImageType};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the prediction service is up
    Health,
    /// Predict a diagnosis for one patient
    Predict(diagnosis::PredictArgs),
    /// Run batch predictions over a CSV or Excel file
    Upload {
        path: PathBuf,
    },
    /// Analyze a medical image
    Analyze {
        path: PathBuf,
        #[arg(long, default_value = "xray")]
        image_type: ImageType,
    },
    /// List stored patients
    Patients(records::PatientsArgs),
    /// Show one stored patient
    Patient {
        id: String,
    },
    /// List past predictions
    History(records::HistoryArgs),
    /// Aggregate patient statistics
    Stats,
    /// Symptom vocabulary known to the model
    Symptoms,
    /// Diseases the model can predict
    Diseases,
    /// Load sample patients into the service
    Seed,
    /// Retrain the model on stored patients
    Train,
    /// Print the batch upload column header
    Template,
}

pub async fn dispatch<C>(client: &C, command: Command) -> Result<String, String>
where
    C: PredictionClient + RecordsClient + AdminClient,
{
    tracing::debug!(?command, "Running command");
    match command {
        Command::Health => health(client).await,
        Command::Predict(args) => diagnosis::predict(client, &args).await,
        Command::Upload { path } => upload::upload(client, &path).await,
        Command::Analyze { path, image_type } => upload::analyze(client, &path, image_type).await,
        Command::Patients(args) => records::patients(client, &args).await,
        Command::Patient { id } => records::patient(client, &id).await,
        Command::History(args) => records::history(client, &args).await,
        Command::Stats => records::stats(client).await,
        Command::Symptoms => diagnosis::symptoms(client).await,
        Command::Diseases => diagnosis::diseases(client).await,
        Command::Seed => seed(client).await,
        Command::Train => train(client).await,
        Command::Template => Ok(template()),
    }
}

pub async fn health<C: AdminClient>(client: &C) -> Result<String, String> {
    let health = client.health().await.map_err(|e| e.to_string())?;
    Ok(format!(
        "Service: {}\nDatabase: {}\nModel: {}",
        health.status, health.database, health.ml_model
    ))
}

pub async fn seed<C: AdminClient>(client: &C) -> Result<String, String> {
    let outcome = client
        .seed()
        .await
        .map_err(|e| e.user_message("Seeding failed"))?;
    Ok(outcome.message)
}

pub async fn train<C: AdminClient>(client: &C) -> Result<String, String> {
    let outcome = client
        .train()
        .await
        .map_err(|e| e.user_message("Training failed"))?;
    Ok(format!(
        "{}\nAccuracy: {:.1}%\nClasses: {}\nSamples: {}",
        outcome.message,
        outcome.accuracy * 100.0,
        outcome.n_classes,
        outcome.n_samples
    ))
}

/// CSV header for batch uploads. Multi-valued cells use `|`.
pub fn template() -> String {
    spreadsheet_columns().join(",")
}

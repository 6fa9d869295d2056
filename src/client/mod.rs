//! Remote prediction service client.
//!
//! `ServiceClient` is the one HTTP implementation. The operations are split
//! across three traits so workflows only depend on what they call, and the
//! in-memory `MockServiceClient` can stand in for all of them.

pub mod admin;
pub mod error;
pub mod http;
pub mod mock;
pub mod prediction;
pub mod records;
pub mod upload;

pub use admin::AdminClient;
pub use error::{ClientError, RequestFailure, ANALYSIS_FAILED, PREDICTION_FAILED, UPLOAD_FAILED};
pub use http::ServiceClient;
pub use mock::{MockFailure, MockServiceClient};
pub use prediction::PredictionClient;
pub use records::{PatientQuery, RecordsClient};
pub use upload::UploadFile;

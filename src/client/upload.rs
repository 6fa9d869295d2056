use std::path::Path;

use reqwest::multipart::Part;

use super::ClientError;

/// Spreadsheet extensions the batch endpoint parses.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];
/// Image extensions the analysis endpoint accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "dcm"];

/// An opaque file forwarded as a multipart part. The client never looks
/// inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl UploadFile {
    /// MIME type is guessed from the file name, defaulting to
    /// `application/octet-stream`.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            bytes,
            mime,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        tracing::debug!(file_name, size = bytes.len(), "Loaded upload file");
        Ok(Self::new(file_name, bytes))
    }

    /// Lowercased extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    pub fn is_spreadsheet(&self) -> bool {
        self.has_extension(SPREADSHEET_EXTENSIONS)
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/") || self.has_extension(IMAGE_EXTENSIONS)
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    fn has_extension(&self, allowed: &[&str]) -> bool {
        self.extension()
            .is_some_and(|ext| allowed.contains(&ext.as_str()))
    }

    pub(crate) fn to_part(&self) -> Result<Part, ClientError> {
        Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|e| ClientError::HttpClient(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_guessed_from_name() {
        assert_eq!(UploadFile::new("rows.csv", vec![]).mime, "text/csv");
        assert_eq!(UploadFile::new("scan.png", vec![]).mime, "image/png");
        assert_eq!(
            UploadFile::new("blob", vec![]).mime,
            "application/octet-stream"
        );
    }

    #[test]
    fn spreadsheet_detection_is_case_insensitive() {
        assert!(UploadFile::new("Ward-3.XLSX", vec![]).is_spreadsheet());
        assert!(UploadFile::new("a.csv", vec![]).is_spreadsheet());
        assert!(!UploadFile::new("a.pdf", vec![]).is_spreadsheet());
        assert!(!UploadFile::new("noext", vec![]).is_spreadsheet());
    }

    #[test]
    fn image_detection() {
        assert!(UploadFile::new("chest.jpeg", vec![]).is_image());
        assert!(UploadFile::new("head.dcm", vec![]).is_image());
        assert!(!UploadFile::new("rows.csv", vec![]).is_image());
    }

    #[test]
    fn size_in_kilobytes() {
        let file = UploadFile::new("a.csv", vec![0u8; 2048]);
        assert!((file.size_kb() - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_name() {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        tmp.write_all(b"age,gender,symptoms\n45,male,fever|cough\n").unwrap();

        let file = UploadFile::from_path(tmp.path()).await.unwrap();
        assert!(file.file_name.ends_with(".csv"));
        assert!(file.is_spreadsheet());
        assert!(file.bytes.starts_with(b"age,gender"));
    }

    #[tokio::test]
    async fn from_path_missing_file_is_file_error() {
        let err = UploadFile::from_path(Path::new("/nonexistent/rows.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::File { .. }));
        assert!(err.to_string().contains("/nonexistent/rows.csv"));
    }
}

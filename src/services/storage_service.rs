//! Thin client for the managed object storage REST API.

use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Thumbnails,
    Certificates,
    Resumes,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Thumbnails => "thumbnails",
            Bucket::Certificates => "certificates",
            Bucket::Resumes => "resumes",
        }
    }

    /// Content types the bucket accepts.
    fn allows(&self, content_type: &str) -> bool {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match self {
            Bucket::Thumbnails => mime.starts_with("image/"),
            Bucket::Resumes => matches!(
                mime.as_str(),
                "application/pdf"
                    | "application/msword"
                    | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Bucket::Certificates => mime == "application/pdf" || mime.starts_with("image/"),
        }
    }
}

impl FromStr for Bucket {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumbnails" => Ok(Bucket::Thumbnails),
            "certificates" => Ok(Bucket::Certificates),
            "resumes" => Ok(Bucket::Resumes),
            other => Err(AppError::NotFound(format!("Unknown bucket '{}'", other))),
        }
    }
}

/// Keeps ASCII letters, digits, dots, dashes and underscores; everything else becomes `_`.
/// Runs of dots collapse to one.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let mut cleaned = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            c
        } else {
            '_'
        };
        if c == '.' && cleaned.ends_with('.') {
            continue;
        }
        cleaned.push(c);
    }
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Object keys are single path segments of the form `<uuid>-<sanitized name>`.
/// Anything that could climb out of the bucket is refused before a URL is built.
pub fn validate_object_key(key: &str) -> AppResult<()> {
    let well_formed = !key.is_empty()
        && !key.starts_with('.')
        && !key.contains("..")
        && sanitize_file_name(key) == key;
    if well_formed {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid object key '{}'", key)))
    }
}

pub struct StorageService {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
    max_upload_bytes: usize,
}

impl StorageService {
    pub fn new(base_url: &str, service_key: SecretString, max_upload_bytes: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.storage_url,
            config.storage_service_key.clone(),
            config.max_upload_bytes,
        )
    }

    fn object_url(&self, bucket: Bucket, path: &str) -> AppResult<String> {
        validate_object_key(path)?;
        Ok(format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket.as_str(),
            path
        ))
    }

    pub fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket.as_str(),
            path
        )
    }

    /// Rejects empty, oversized and wrongly typed uploads before any network call.
    pub fn check_upload(&self, bucket: Bucket, size: usize, content_type: &str) -> AppResult<()> {
        if size == 0 {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if size > self.max_upload_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte upload limit",
                self.max_upload_bytes
            )));
        }
        if !bucket.allows(content_type) {
            return Err(AppError::BadRequest(format!(
                "Content type '{}' is not accepted for {}",
                content_type,
                bucket.as_str()
            )));
        }
        Ok(())
    }

    /// Stores the bytes under `<uuid>-<sanitized name>` and returns `(path, public url)`.
    pub async fn upload(
        &self,
        bucket: Bucket,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<(String, String)> {
        self.check_upload(bucket, bytes.len(), content_type)?;

        let path = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let response = self
            .client
            .post(self.object_url(bucket, &path)?)
            .bearer_auth(self.service_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check_status(response).await?;

        log::info!("Uploaded {}/{}", bucket.as_str(), path);
        let url = self.public_url(bucket, &path);
        Ok((path, url))
    }

    /// Returns the object bytes with the stored content type, if reported.
    pub async fn download(&self, bucket: Bucket, path: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        let response = self
            .client
            .get(self.object_url(bucket, path)?)
            .bearer_auth(self.service_key.expose_secret())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "File '{}/{}' not found",
                bucket.as_str(),
                path
            )));
        }
        let response = Self::check_status(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        Ok((bytes.to_vec(), content_type))
    }

    pub async fn delete(&self, bucket: Bucket, path: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.object_url(bucket, path)?)
            .bearer_auth(self.service_key.expose_secret())
            .send()
            .await?;
        Self::check_status(response).await?;
        log::info!("Deleted {}/{}", bucket.as_str(), path);
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::error!("Storage API returned {}: {}", status, body);
        Err(AppError::InternalError(format!(
            "Storage API error ({})",
            status.as_u16()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> StorageService {
        StorageService::new("http://storage.test/", SecretString::from("key".to_string()), 1024)
    }

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("My CV (final).pdf"), "My_CV__final_.pdf");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name("notes..v2.pdf"), "notes.v2.pdf");
    }

    #[test]
    fn object_keys_stay_inside_the_bucket() {
        assert!(validate_object_key("0b1e-My_CV.pdf").is_ok());
        assert!(validate_object_key("../resumes/cv.pdf").is_err());
        assert!(validate_object_key("..%2Fresumes%2Fcv.pdf").is_err());
        assert!(validate_object_key("nested/cv.pdf").is_err());
        assert!(validate_object_key("nested\\cv.pdf").is_err());
        assert!(validate_object_key(".hidden").is_err());
        assert!(validate_object_key("a..b").is_err());
        assert!(validate_object_key("").is_err());
    }

    #[test]
    fn object_url_refuses_traversal() {
        let storage = storage();
        assert!(storage.object_url(Bucket::Thumbnails, "../resumes/cv.pdf").is_err());
        assert_eq!(
            storage.object_url(Bucket::Resumes, "abc-cv.pdf").unwrap(),
            "http://storage.test/storage/v1/object/resumes/abc-cv.pdf"
        );
    }

    #[test]
    fn bucket_names_parse() {
        assert_eq!("resumes".parse::<Bucket>().unwrap(), Bucket::Resumes);
        assert!("secrets".parse::<Bucket>().is_err());
    }

    #[test]
    fn resumes_only_accept_documents() {
        let storage = storage();
        assert!(storage
            .check_upload(Bucket::Resumes, 10, "application/pdf")
            .is_ok());
        assert!(storage
            .check_upload(
                Bucket::Resumes,
                10,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            )
            .is_ok());
        assert!(storage.check_upload(Bucket::Resumes, 10, "image/png").is_err());
    }

    #[test]
    fn thumbnails_only_accept_images() {
        let storage = storage();
        assert!(storage
            .check_upload(Bucket::Thumbnails, 10, "image/jpeg; charset=binary")
            .is_ok());
        assert!(storage
            .check_upload(Bucket::Thumbnails, 10, "application/pdf")
            .is_err());
    }

    #[test]
    fn empty_and_oversized_uploads_are_rejected() {
        let storage = storage();
        assert!(storage.check_upload(Bucket::Thumbnails, 0, "image/png").is_err());
        assert!(storage
            .check_upload(Bucket::Thumbnails, 1025, "image/png")
            .is_err());
        assert!(storage
            .check_upload(Bucket::Thumbnails, 1024, "image/png")
            .is_ok());
    }

    #[test]
    fn public_url_has_no_double_slash() {
        assert_eq!(
            storage().public_url(Bucket::Thumbnails, "abc-logo.png"),
            "http://storage.test/storage/v1/object/public/thumbnails/abc-logo.png"
        );
    }
}

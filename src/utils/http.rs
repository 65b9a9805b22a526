use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use mime::Mime;
use reqwest::{Client, StatusCode};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use super::rate_limit::RateLimiter;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("rate limiter closed")]
    RateLimiterClosed,

    #[error("could not write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// GET `url` with the archive's required user agent and return the body.
///
/// A permit from `rate_limiter` is held for the whole request.
pub async fn fetch_bytes(
    client: &Client,
    url: &Url,
    user_agent: &str,
    accept: &Mime,
    rate_limiter: &RateLimiter,
) -> Result<Vec<u8>, FetchError> {
    let _permit = rate_limiter
        .acquire()
        .await
        .map_err(|_| FetchError::RateLimiterClosed)?;

    log::debug!("Fetching URL: {}", url);
    let network = |source| FetchError::Network {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url.as_str())
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(reqwest::header::ACCEPT, accept.as_ref())
        .send()
        .await
        .map_err(network)?;

    let status = response.status();
    log::debug!("Response status: {}", status);
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let content_length = response.content_length();
    let body = response.bytes().await.map_err(network)?;
    log::debug!(
        "Received {} bytes (declared {:?})",
        body.len(),
        content_length
    );

    Ok(body.to_vec())
}

/// Fetch `url` and store the body at `filepath`, creating parent directories.
pub async fn fetch_and_save(
    client: &Client,
    url: &Url,
    filepath: &Path,
    user_agent: &str,
    accept: &Mime,
    rate_limiter: &RateLimiter,
) -> Result<(), FetchError> {
    let body = fetch_bytes(client, url, user_agent, accept, rate_limiter).await?;

    let io_error = |source| FetchError::Io {
        path: filepath.to_path_buf(),
        source,
    };
    if let Some(parent) = filepath.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(filepath, &body).map_err(io_error)?;
    log::info!("Saved {} bytes to {:?}", body.len(), filepath);

    Ok(())
}

/// Decode downloaded text whatever its charset.
///
/// Older submissions are frequently Latin-1 or Windows-1252. A BOM wins;
/// otherwise the charset is sniffed and unknown labels fall back to UTF-8
/// with replacement characters.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let (charset, confidence, _) = chardet::detect(bytes);
    let encoding = Encoding::for_label(chardet::charset2encoding(&charset).as_bytes());
    log::debug!(
        "Body is not UTF-8, detected {} ({:.2}) -> {:?}",
        charset,
        confidence,
        encoding.map(|e| e.name())
    );

    let mut decoded = String::with_capacity(bytes.len());
    let mut reader = DecodeReaderBytesBuilder::new()
        .encoding(encoding)
        .build(bytes);
    match reader.read_to_string(&mut decoded) {
        Ok(_) => decoded,
        Err(e) => {
            log::warn!("Charset decoding failed ({}), using lossy UTF-8", e);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_passthrough() {
        assert_eq!(decode_text("Société Générale".as_bytes()), "Société Générale");
    }

    #[test]
    fn test_decode_latin1_body() {
        // "Café résumé" in ISO-8859-1 / Windows-1252.
        let bytes = b"Caf\xe9 r\xe9sum\xe9 and more text to sniff";
        let text = decode_text(bytes);
        assert!(text.starts_with("Caf"));
        assert!(text.ends_with("to sniff"));
    }

    #[test]
    fn test_not_found_status() {
        let err = FetchError::Status {
            url: "https://www.sec.gov/x".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("404"));
    }
}

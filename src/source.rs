use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, info_span};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("failed to transfer body from {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the events workbook comes from.
pub trait Source: Send + Sync {
    /// Store the current workbook at `dest`, returning the number of bytes written.
    /// `dest` is only replaced once the whole file is on disk.
    fn fetch(&self, dest: &Path) -> Result<u64, FetchError>;
}

/// Downloads the workbook with a single GET. Anything but `200 OK` is a failure.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self::with_agent(url, config.into())
    }

    /// Use a preconfigured agent, e.g. one with a proxy or TLS setup of its own.
    pub fn with_agent(url: impl Into<String>, agent: ureq::Agent) -> Self {
        Self { url: url.into(), agent }
    }
}

impl Source for HttpSource {
    fn fetch(&self, dest: &Path) -> Result<u64, FetchError> {
        let response = {
            let _span = info_span!("events_download", url = %self.url).entered();
            self.agent.get(&self.url).call()
        }
        .map_err(|source| match source {
            ureq::Error::StatusCode(status) => FetchError::Status { url: self.url.clone(), status },
            source => FetchError::Request { url: self.url.clone(), source },
        })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status { url: self.url.clone(), status });
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let part = part_path(dest);
        let written = (|| -> Result<u64, FetchError> {
            let mut file = File::create(&part).map_err(io_error(&part))?;
            let mut body = response.into_body().into_reader();
            let written = io::copy(&mut body, &mut file)
                .map_err(|source| FetchError::Transfer { url: self.url.clone(), source })?;
            file.sync_all().map_err(io_error(&part))?;
            fs::rename(&part, dest).map_err(io_error(dest))?;
            Ok(written)
        })();
        if written.is_err() {
            let _ = fs::remove_file(&part);
        }

        let written = written?;
        info!(bytes = written, path = %dest.display(), "Stored events workbook");
        Ok(written)
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> FetchError {
    let path = path.to_path_buf();
    move |source| FetchError::Io { path, source }
}

/// Sibling file the download streams into before it replaces `dest`.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

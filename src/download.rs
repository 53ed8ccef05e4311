//! Binary downloads of images and samples.
//!
//! Downloads stream the response body into an [`ImageSink`]. A sink receives
//! bytes through [`ImageSink::write`] and is then either persisted with
//! [`ImageSink::finalize`] or thrown away with [`ImageSink::discard`].
//! [`NekosClient::download`] only writes; [`NekosClient::save`] also picks
//! finalize or discard depending on whether the download succeeded.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::{with_cancel, NekosClient};
use crate::error::{NekosError, Result};
use crate::models::Image;

/// Destination of a download.
#[async_trait]
pub trait ImageSink: Send {
    /// Append a chunk of the body.
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Persist everything written so far. Calling it twice is a no-op.
    async fn finalize(&mut self) -> io::Result<()>;

    /// Throw away everything written so far.
    async fn discard(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Writing,
    Finalized,
    Discarded,
}

/// Sink writing to a file on disk.
///
/// Bytes go to `<path>.part`; [`ImageSink::finalize`] renames it onto
/// `path`, so `path` only ever holds a complete download.
/// [`ImageSink::discard`] deletes whatever was written.
///
/// [`FileSink::temp`] writes straight into a fresh file in the system temp
/// directory instead. That file outlives the sink; deleting it is up to the
/// caller.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    part_path: PathBuf,
    writer: Option<BufWriter<File>>,
    state: SinkState,
}

impl FileSink {
    /// Create the partial file next to `path`, truncating any previous one.
    pub async fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let mut part_path = path.clone().into_os_string();
        part_path.push(".part");
        let part_path = PathBuf::from(part_path);

        let file = File::create(&part_path).await?;

        Ok(Self {
            path,
            part_path,
            writer: Some(BufWriter::new(file)),
            state: SinkState::Writing,
        })
    }

    /// Create a file in the system temp directory and write the download there.
    ///
    /// The file is kept after finalize and after the sink is dropped. Remove
    /// it once done, or call [`ImageSink::discard`].
    pub async fn temp() -> io::Result<Self> {
        let (file, path) = tokio::task::spawn_blocking(|| {
            tempfile::Builder::new()
                .prefix("nekosapi-")
                .tempfile()?
                .keep()
                .map_err(io::Error::from)
        })
        .await
        .map_err(io::Error::other)??;

        Ok(Self {
            part_path: path.clone(),
            path,
            writer: Some(BufWriter::new(File::from_std(file))),
            state: SinkState::Writing,
        })
    }

    /// Final location of the download.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the download while it is in progress.
    pub fn part_path(&self) -> &Path {
        &self.part_path
    }

    pub fn is_finalized(&self) -> bool {
        self.state == SinkState::Finalized
    }

    async fn close_writer(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ImageSink for FileSink {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(chunk).await,
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "file sink is already closed",
            )),
        }
    }

    async fn finalize(&mut self) -> io::Result<()> {
        match self.state {
            SinkState::Finalized => return Ok(()),
            SinkState::Discarded => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "file sink was discarded",
                ))
            }
            SinkState::Writing => {}
        }

        self.close_writer().await?;
        if self.part_path != self.path {
            fs::rename(&self.part_path, &self.path).await?;
        }
        self.state = SinkState::Finalized;
        Ok(())
    }

    async fn discard(&mut self) -> io::Result<()> {
        // Dropping unflushed data is fine here
        self.writer = None;

        let target = match self.state {
            SinkState::Discarded => return Ok(()),
            SinkState::Finalized => &self.path,
            SinkState::Writing => &self.part_path,
        };
        match fs::remove_file(target).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        self.state = SinkState::Discarded;
        Ok(())
    }
}

/// Sink collecting the download in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: Vec<u8>,
    saved: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }
}

#[async_trait]
impl ImageSink for MemorySink {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    async fn finalize(&mut self) -> io::Result<()> {
        self.saved = true;
        Ok(())
    }

    async fn discard(&mut self) -> io::Result<()> {
        self.buffer.clear();
        self.saved = false;
        Ok(())
    }
}

impl NekosClient {
    /// Download `url` into `sink`.
    ///
    /// The status is checked before any byte is read: anything but `200 OK`
    /// fails with [`NekosError::BadStatus`] and leaves the sink untouched.
    /// The sink is never finalized or discarded here; see [`NekosClient::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the transport fails, the status
    /// isn't 200, or reading the body or writing to the sink fails.
    pub async fn download<S>(&self, url: &str, sink: &mut S) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        self.stream_into(None, url, sink).await
    }

    /// Same as [`NekosClient::download`], aborting with
    /// [`NekosError::Cancelled`] as soon as `cancel` fires. Bytes already
    /// written stay in the sink.
    pub async fn download_with_cancel<S>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        sink: &mut S,
    ) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        self.stream_into(Some(cancel), url, sink).await
    }

    /// Download the full-size image.
    pub async fn download_image<S>(&self, image: &Image, sink: &mut S) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        self.download(&image.image_url, sink).await
    }

    /// Download the sample of an image.
    ///
    /// # Errors
    ///
    /// Fails with [`NekosError::InvalidParameter`] if the image has no sample.
    pub async fn download_sample<S>(&self, image: &Image, sink: &mut S) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        let url = sample_url(image)?;
        self.download(url, sink).await
    }

    /// Download `url` into `sink`, finalizing it on success and discarding it
    /// on failure.
    ///
    /// If discarding also fails, the download error is the one returned.
    pub async fn save<S>(&self, url: &str, sink: &mut S) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        let outcome = self.stream_into(None, url, sink).await;
        settle(outcome, sink).await
    }

    /// Cancellable form of [`NekosClient::save`].
    pub async fn save_with_cancel<S>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        sink: &mut S,
    ) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        let outcome = self.stream_into(Some(cancel), url, sink).await;
        settle(outcome, sink).await
    }

    /// Save the full-size image; see [`NekosClient::save`].
    pub async fn save_image<S>(&self, image: &Image, sink: &mut S) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        self.save(&image.image_url, sink).await
    }

    /// Save the sample of an image; see [`NekosClient::save`].
    pub async fn save_sample<S>(&self, image: &Image, sink: &mut S) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        let url = sample_url(image)?;
        self.save(url, sink).await
    }

    #[tracing::instrument(skip(self, cancel, sink))]
    async fn stream_into<S>(
        &self,
        cancel: Option<&CancellationToken>,
        url: &str,
        sink: &mut S,
    ) -> Result<()>
    where
        S: ImageSink + ?Sized,
    {
        let url = Url::parse(url)?;

        let transfer = async {
            let mut response = self
                .http()
                .get(url)
                .send()
                .await
                .map_err(NekosError::HttpError)?;

            let status = response.status();
            tracing::debug!(%status, "received response");
            if status != StatusCode::OK {
                return Err(NekosError::BadStatus {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }

            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await.map_err(NekosError::BodyRead)? {
                sink.write(&chunk).await?;
                written += chunk.len() as u64;
            }
            tracing::debug!(bytes = written, "download complete");

            Ok(())
        };

        with_cancel(cancel, transfer).await
    }
}

fn sample_url(image: &Image) -> Result<&str> {
    image
        .sample_url
        .as_deref()
        .ok_or_else(|| NekosError::InvalidParameter {
            name: "sample_url",
            value: image.id.to_string(),
            reason: "image has no sample",
        })
}

async fn settle<S>(outcome: Result<()>, sink: &mut S) -> Result<()>
where
    S: ImageSink + ?Sized,
{
    match outcome {
        Ok(()) => Ok(sink.finalize().await?),
        Err(err) => {
            if let Err(discard_err) = sink.discard().await {
                tracing::debug!(error = %discard_err, "failed to discard sink");
            }
            Err(err)
        }
    }
}

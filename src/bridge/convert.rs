use std::process::Stdio;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::bridge::error::{truncate_diagnostic, Failure};

/// Fixed transcoder invocation: read the container from stdin, resample to
/// 10 fps at 600px width, loop forever, emit GIF on stdout.
const FFMPEG_ARGS: [&str; 12] = [
    "-hide_banner",
    "-loglevel",
    "error",
    "-i",
    "pipe:0",
    "-vf",
    "fps=10,scale=600:-1:flags=lanczos",
    "-loop",
    "0",
    "-f",
    "gif",
    "pipe:1",
];

/// Bytes of stderr kept while draining the diagnostic channel.
const DIAG_CAPTURE_BYTES: usize = 8 * 1024;
/// Bytes of diagnostics reported back to the caller.
const DIAG_REPORT_BYTES: usize = 200;

/// A finished conversion: the encoded payload plus its fixed media type.
pub struct Gif {
    pub bytes: Bytes,
}

impl Gif {
    pub const CONTENT_TYPE: &'static str = "image/gif";
}

/// Per-invocation knobs. Defaults come from the process config; tests build
/// their own with a stub transcoder.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub ffmpeg_path: String,
    pub timeout: Duration,
    pub max_input_bytes: usize,
    pub max_output_bytes: usize,
}

impl ConvertOptions {
    pub fn from_config() -> Self {
        let config = crate::config::config();
        Self {
            ffmpeg_path: config.ffmpeg_path().to_string(),
            timeout: config.convert_timeout(),
            max_input_bytes: config.max_input_bytes(),
            max_output_bytes: config.max_output_bytes(),
        }
    }
}

/// The transcode bridge. Owns the shared HTTP client; each `convert` call is
/// otherwise independent and holds its own process handle and buffers.
pub struct Converter {
    client: reqwest::Client,
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            options,
        }
    }

    /// Fetch `raw_url` and pipe it through the transcoder, returning the
    /// encoded GIF. All failures are terminal; nothing is retried.
    pub async fn convert(&self, raw_url: &str) -> Result<Gif, Failure> {
        let url = parse_source_url(raw_url)?;
        match tokio::time::timeout(self.options.timeout, self.run(url)).await {
            Ok(result) => result,
            // dropping `run` kills the child via kill_on_drop
            Err(_) => Err(Failure::Timeout(self.options.timeout)),
        }
    }

    async fn run(&self, url: reqwest::Url) -> Result<Gif, Failure> {
        log::info!("Bridge: fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Failure::UpstreamFetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Failure::UpstreamFetch(format!(
                "upstream returned {}",
                response.status()
            )));
        }

        let mut child = Command::new(&self.options.ffmpeg_path)
            .args(FFMPEG_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Failure::ProcessLaunch(format!("{}: {}", self.options.ffmpeg_path, e))
            })?;

        // The three channel ends move into their own tasks. They must drain
        // concurrently: the tool blocks writing output when nobody reads it
        // while it still waits for input, and vice versa.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Failure::Stream("transcoder stdin not piped".to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Failure::Stream("transcoder stdout not piped".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Failure::Stream("transcoder stderr not piped".to_string()))?;

        let max_input = self.options.max_input_bytes;
        let mut body = response.bytes_stream();
        let feed_handle = tokio::spawn(async move {
            let mut total = 0usize;
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| {
                    Failure::UpstreamFetch(format!("reading upstream body: {}", e))
                })?;
                total += chunk.len();
                if total > max_input {
                    // dropping stdin signals EOF to the tool
                    return Err(Failure::TooLarge("video download"));
                }
                stdin.write_all(&chunk).await.map_err(|e| {
                    Failure::Stream(format!("writing to transcoder: {}", e))
                })?;
            }
            let _ = stdin.shutdown().await;
            Ok::<(), Failure>(())
        });

        let max_output = self.options.max_output_bytes;
        let out_handle = tokio::spawn(async move {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 8192];
            loop {
                let n = stdout.read(&mut chunk).await.map_err(|e| {
                    Failure::Stream(format!("reading transcoder output: {}", e))
                })?;
                if n == 0 {
                    break;
                }
                if buf.len() + n > max_output {
                    return Err(Failure::TooLarge("encoded gif"));
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            Ok::<Vec<u8>, Failure>(buf)
        });

        let err_handle = tokio::spawn(async move {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 2048];
            loop {
                let n = match stderr.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                if buf.len() < DIAG_CAPTURE_BYTES {
                    let take = (DIAG_CAPTURE_BYTES - buf.len()).min(n);
                    buf.extend_from_slice(&chunk[..take]);
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        // Output first: it finishes at tool EOF or at the size cap. On the
        // cap the tool must die, or it could wedge writing unread output.
        let out = match out_handle.await {
            Ok(result) => result,
            Err(e) => Err(Failure::Stream(format!("output task failed: {}", e))),
        };
        if matches!(out, Err(Failure::TooLarge(_))) {
            let _ = child.start_kill();
        }
        let feed = match feed_handle.await {
            Ok(result) => result,
            Err(e) => Err(Failure::Stream(format!("input task failed: {}", e))),
        };
        let diag = err_handle.await.unwrap_or_default();

        // Exit status is only meaningful once every drain has joined.
        let status = child
            .wait()
            .await
            .map_err(|e| Failure::Stream(format!("waiting for transcoder: {}", e)))?;

        let diag = diag.trim();
        let bytes = match out {
            Ok(bytes) => bytes,
            Err(failure @ Failure::TooLarge(_)) => return Err(failure),
            Err(failure) => {
                if !status.success() && !diag.is_empty() {
                    return Err(Failure::Transcode(
                        truncate_diagnostic(diag, DIAG_REPORT_BYTES).to_string(),
                    ));
                }
                return Err(failure);
            }
        };

        if !status.success() {
            log::warn!("Bridge: transcoder failed for {}: {}", url, diag);
            if !diag.is_empty() {
                return Err(Failure::Transcode(
                    truncate_diagnostic(diag, DIAG_REPORT_BYTES).to_string(),
                ));
            }
            if let Err(failure) = feed {
                return Err(failure);
            }
            return Err(Failure::Transcode(format!(
                "transcoder exited with {}",
                status
            )));
        }

        // A clean exit after an aborted feed still means the download failed;
        // partial output is discarded.
        if let Err(failure) = feed {
            return Err(failure);
        }

        log::info!("Bridge: converted {} ({} bytes)", url, bytes.len());
        Ok(Gif {
            bytes: Bytes::from(bytes),
        })
    }
}

fn parse_source_url(raw: &str) -> Result<reqwest::Url, Failure> {
    if raw.trim().is_empty() {
        return Err(Failure::InvalidInput("empty url".to_string()));
    }
    let url = reqwest::Url::parse(raw)
        .map_err(|e| Failure::InvalidInput(format!("{:?}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Failure::InvalidInput(format!(
            "unsupported scheme {:?}",
            other
        ))),
    }
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod convert_test;

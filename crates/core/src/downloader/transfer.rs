//! Transfer seam: how bytes actually move.
//!
//! Either a direct streamed HTTP fetch, or an external command template
//! for setups that delegate to a dedicated downloader. Playlist-style
//! sources get their own template because a plain fetch of an m3u file
//! would save the playlist, not the media.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::process::Command;
use tracing::debug;

use super::config::DownloaderConfig;
use super::types::DownloadError;

/// Moves one URL to one destination file.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// `playlist` marks m3u-style sources that need the alternate
    /// external command.
    async fn fetch(&self, url: &str, dest: &Path, playlist: bool) -> Result<(), DownloadError>;
}

/// Picks the transfer implementation the configuration asks for.
pub fn transfer_from_config(config: &DownloaderConfig) -> Arc<dyn Transfer> {
    if config.command.is_empty() {
        Arc::new(HttpTransfer::new())
    } else {
        Arc::new(CommandTransfer::new(
            config.command.clone(),
            config.playlist_command.clone(),
        ))
    }
}

/// Streams the response body straight into the destination file.
pub struct HttpTransfer {
    client: reqwest::Client,
}

impl HttpTransfer {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn fetch(&self, url: &str, dest: &Path, _playlist: bool) -> Result<(), DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DownloadError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let file = tokio::fs::File::create(dest)
            .await
            .map_err(|source| DownloadError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DownloadError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|source| DownloadError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
        }
        writer.flush().await.map_err(|source| DownloadError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

/// Invokes an external command per transfer.
pub struct CommandTransfer {
    command: String,
    playlist_command: String,
}

impl CommandTransfer {
    pub fn new(command: String, playlist_command: String) -> Self {
        Self {
            command,
            playlist_command,
        }
    }
}

#[async_trait]
impl Transfer for CommandTransfer {
    async fn fetch(&self, url: &str, dest: &Path, playlist: bool) -> Result<(), DownloadError> {
        let template = if playlist {
            &self.playlist_command
        } else {
            &self.command
        };
        let argv = expand_template(template, url, dest)?;
        debug!(?argv, "running download command");

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| DownloadError::Spawn {
                command: argv[0].clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DownloadError::CommandFailed {
                command: template.clone(),
                status: status.code().unwrap_or(-1),
            })
        }
    }
}

/// Splits the template on whitespace, then substitutes placeholders per
/// argument, so a destination path containing spaces stays one argument.
fn expand_template(template: &str, url: &str, dest: &Path) -> Result<Vec<String>, DownloadError> {
    let dest = dest.to_string_lossy();
    let argv: Vec<String> = template
        .split_whitespace()
        .map(|arg| arg.replace("{url}", url).replace("{dest}", &dest))
        .collect();
    if argv.is_empty() {
        return Err(DownloadError::EmptyTemplate);
    }
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_expand_template_substitutes_placeholders() {
        let argv = expand_template(
            "curl -fsS -o {dest} {url}",
            "https://media.example/a.mp4",
            Path::new("/media/with space/a.mp4"),
        )
        .unwrap();
        assert_eq!(
            argv,
            vec![
                "curl",
                "-fsS",
                "-o",
                "/media/with space/a.mp4",
                "https://media.example/a.mp4",
            ]
        );
    }

    #[test]
    fn test_expand_empty_template_fails() {
        let err = expand_template("", "https://x", Path::new("/tmp/x")).unwrap_err();
        assert!(matches!(err, DownloadError::EmptyTemplate));
    }

    #[tokio::test]
    async fn test_command_transfer_reports_exit_status() {
        let transfer = CommandTransfer::new("false".to_string(), String::new());
        let err = transfer
            .fetch("https://x", Path::new("/tmp/x"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::CommandFailed { .. }));

        let transfer = CommandTransfer::new("true".to_string(), String::new());
        transfer
            .fetch("https://x", Path::new("/tmp/x"), false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_playlist_flag_selects_alternate_template() {
        // the main template would fail; the playlist one succeeds
        let transfer = CommandTransfer::new("false".to_string(), "true".to_string());
        transfer
            .fetch("https://x/list.m3u8", Path::new("/tmp/x"), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_transfer_writes_body_to_dest() {
        // serve one response from a local listener without an HTTP crate
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello")
                .await
                .unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let dest: PathBuf = dir.path().join("body.bin");
        let transfer = HttpTransfer::new();
        transfer
            .fetch(&format!("http://{addr}/file"), &dest, false)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
    }
}

use crate::error::ViewerError;
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024;
const GLB_MAGIC: u32 = 0x4654_6C67;

/// Where an asset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    File(PathBuf),
    Http(String),
}

impl AssetSource {
    /// `<root>/<relative>`, over HTTP when `root` is an http(s) URL.
    pub fn resolve(root: &str, relative: &str) -> Self {
        let relative = relative.trim_start_matches('/');
        if root.starts_with("http://") || root.starts_with("https://") {
            AssetSource::Http(format!("{}/{}", root.trim_end_matches('/'), relative))
        } else {
            AssetSource::File(PathBuf::from(root).join(relative))
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::File(path) => write!(f, "{}", path.display()),
            AssetSource::Http(url) => write!(f, "{}", url),
        }
    }
}

/// Total length declared by a binary glTF header, if `header` starts with one.
pub fn glb_declared_length(header: &[u8]) -> Option<u64> {
    if header.len() < 12 || LittleEndian::read_u32(&header[0..4]) != GLB_MAGIC {
        return None;
    }
    Some(LittleEndian::read_u32(&header[8..12]) as u64)
}

/// Read the whole asset, calling `on_progress(loaded, total)` after each chunk.
pub async fn fetch(
    source: &AssetSource,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> Result<Vec<u8>, ViewerError> {
    let mut data = Vec::new();
    match source {
        AssetSource::File(path) => {
            let mut file = tokio::fs::File::open(path).await.map_err(|e| {
                ViewerError::new("asset-open")
                    .with_arg("path", path.display())
                    .push_std(e)
            })?;
            let total = file.metadata().await?.len();
            data.reserve(total as usize);

            let mut chunk = vec![0u8; CHUNK_SIZE];
            loop {
                let n = file.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                data.extend_from_slice(&chunk[..n]);
                on_progress(data.len() as u64, Some(total));
            }
        }
        AssetSource::Http(url) => {
            let mut response = reqwest::get(url).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ViewerError::new("http-status")
                    .with_arg("status", status)
                    .with_arg("url", url));
            }

            let mut total = response.content_length();
            while let Some(chunk) = response.chunk().await? {
                data.extend_from_slice(&chunk);
                if total.is_none() {
                    total = glb_declared_length(&data);
                }
                on_progress(data.len() as u64, total);
            }
        }
    }

    log::debug!("Fetched {} bytes from {}", data.len(), source);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::fixture::knight_glb;

    #[test]
    fn resolve_picks_file_or_http() {
        assert_eq!(
            AssetSource::resolve("assets", "knight.glb"),
            AssetSource::File(PathBuf::from("assets/knight.glb"))
        );
        assert_eq!(
            AssetSource::resolve("https://example.org/assets/", "/hdr/venice_sunset_1k.hdr"),
            AssetSource::Http("https://example.org/assets/hdr/venice_sunset_1k.hdr".to_string())
        );
    }

    #[test]
    fn glb_header_declares_its_length() {
        let glb = knight_glb();
        assert_eq!(glb_declared_length(&glb), Some(glb.len() as u64));
        assert_eq!(glb_declared_length(&glb[..8]), None);
        assert_eq!(glb_declared_length(b"{\"asset\":{}}"), None);
    }

    #[tokio::test]
    async fn file_fetch_reports_progress_up_to_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let bytes = vec![7u8; CHUNK_SIZE * 2 + 10];
        std::fs::write(&path, &bytes).unwrap();

        let mut seen = Vec::new();
        let data = fetch(&AssetSource::File(path), |loaded, total| {
            seen.push((loaded, total))
        })
        .await
        .unwrap();

        assert_eq!(data, bytes);
        assert!(seen.len() >= 3);
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(seen.last(), Some(&(bytes.len() as u64, Some(bytes.len() as u64))));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch(&AssetSource::File(dir.path().join("nope.glb")), |_, _| {})
            .await
            .unwrap_err();
        assert_eq!(err.key, "asset-open");
    }
}

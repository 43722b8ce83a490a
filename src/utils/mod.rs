use std::io;
use std::path::{Path, PathBuf};

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// First free path for `file_name` in `dir`, numbering like a browser does:
/// `name.mp4`, `name (1).mp4`, `name (2).mp4`, ...
pub async fn unique_path(dir: &Path, file_name: &str) -> io::Result<PathBuf> {
    let candidate = dir.join(file_name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    for n in 1u32.. {
        let path = match ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        };
        if !tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {}", file_name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test/file.mp4"), "test_file.mp4");
        assert_eq!(sanitize_filename("zoom_recording.mp4"), "zoom_recording.mp4");
    }

    #[tokio::test]
    async fn test_unique_path_numbers_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            unique_path(dir.path(), "zoom_recording.mp4").await.unwrap(),
            dir.path().join("zoom_recording.mp4")
        );

        std::fs::write(dir.path().join("zoom_recording.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("zoom_recording (1).mp4"), b"").unwrap();
        assert_eq!(
            unique_path(dir.path(), "zoom_recording.mp4").await.unwrap(),
            dir.path().join("zoom_recording (2).mp4")
        );
    }

    #[tokio::test]
    async fn test_unique_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("recording"), b"").unwrap();
        assert_eq!(
            unique_path(dir.path(), "recording").await.unwrap(),
            dir.path().join("recording (1)")
        );
    }
}

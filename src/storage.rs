use crate::models::PageData;
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Reads the server-rendered dashboard data. A missing or unreadable file
/// yields an empty page rather than a startup failure.
pub async fn load_page_data(path: &Path) -> PageData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse page data file: {err}");
                PageData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => PageData::default(),
        Err(err) => {
            error!("failed to read page data file: {err}");
            PageData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("careconnect_ui_{}_{name}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn missing_file_gives_empty_page() {
        let data = load_page_data(&temp_path("missing")).await;
        assert!(data.actions.is_empty());
        assert!(data.scores.is_empty());
    }

    #[tokio::test]
    async fn reads_page_fields() {
        let path = temp_path("page");
        fs::write(
            &path,
            r#"{"scores":[12,9],"dates":["Oct 01","Oct 08"],"actions":["Take a walk"],"state_context":"moderate","test_id":"7"}"#,
        )
        .await
        .unwrap();
        let data = load_page_data(&path).await;
        let _ = fs::remove_file(&path).await;

        assert_eq!(data.score_series().scores, vec![12.0, 9.0]);
        assert_eq!(data.actions, vec!["Take a walk".to_string()]);
        assert_eq!(data.test_id.as_deref(), Some("7"));
        assert!(data.completed.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_gives_empty_page() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{not json").await.unwrap();
        let data = load_page_data(&path).await;
        let _ = fs::remove_file(&path).await;
        assert!(data.actions.is_empty());
    }
}

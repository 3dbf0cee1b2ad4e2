use tracing::{error, info};

use crate::server::context::{BridgeError, ConnectionContext};
use crate::server::file_api;
use crate::server::protocol::{FileEntryInfo, Response};

/// read: full file content as UTF-8
pub async fn handle_read(ctx: &ConnectionContext, path: String) -> Result<Response, BridgeError> {
    let content = {
        let (root, path) = (ctx.root().to_path_buf(), path.clone());
        tokio::task::spawn_blocking(move || file_api::read_file(&root, &path)).await??
    };
    info!("Read file: {}", path);
    Ok(Response::Read {
        path,
        content,
        success: true,
    })
}

/// write: overwrite an existing location
pub async fn handle_write(
    ctx: &ConnectionContext,
    path: String,
    content: String,
) -> Result<Response, BridgeError> {
    {
        let (root, path) = (ctx.root().to_path_buf(), path.clone());
        tokio::task::spawn_blocking(move || file_api::write_file(&root, &path, &content))
            .await??;
    }
    info!("Wrote file: {}", path);
    Ok(Response::Write {
        path,
        success: true,
    })
}

/// create: like write, but makes missing parent directories first
pub async fn handle_create(
    ctx: &ConnectionContext,
    path: String,
    content: String,
) -> Result<Response, BridgeError> {
    {
        let (root, path) = (ctx.root().to_path_buf(), path.clone());
        tokio::task::spawn_blocking(move || file_api::create_file(&root, &path, &content))
            .await??;
    }
    info!("Created file: {}", path);
    Ok(Response::Create {
        path,
        success: true,
    })
}

pub async fn handle_delete(ctx: &ConnectionContext, path: String) -> Result<Response, BridgeError> {
    {
        let (root, path) = (ctx.root().to_path_buf(), path.clone());
        tokio::task::spawn_blocking(move || file_api::delete_file(&root, &path)).await??;
    }
    info!("Deleted file: {}", path);
    Ok(Response::Delete {
        path,
        success: true,
    })
}

/// list: recursive file listing; failures are reported in the tagged shape
pub async fn handle_list(ctx: &ConnectionContext, path: String) -> Result<Response, BridgeError> {
    let result = {
        let (root, path) = (ctx.root().to_path_buf(), path.clone());
        tokio::task::spawn_blocking(move || file_api::list_files(&root, &path)).await?
    };

    match result {
        Ok(entries) => {
            info!(
                "Listed directory (recursive): {} - {} files",
                path,
                entries.len()
            );
            let files = entries
                .into_iter()
                .map(|e| FileEntryInfo {
                    name: e.name,
                    path: e.path,
                    is_directory: false,
                })
                .collect();
            Ok(Response::List {
                path,
                files: Some(files),
                error: None,
                success: true,
            })
        }
        Err(e) => {
            error!("Error listing directory: {}", e);
            Ok(Response::List {
                path,
                files: None,
                error: Some(e.to_string()),
                success: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::server::handlers::dispatch;
    use crate::server::protocol::Request;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ctx_for(temp: &TempDir) -> ConnectionContext {
        ConnectionContext::new(Arc::new(BridgeConfig::with_root(temp.path().to_path_buf())))
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx_for(&temp);

        let created = handle_create(&ctx, "a/b/c.txt".to_string(), "hi".to_string())
            .await
            .unwrap();
        assert_eq!(
            created,
            Response::Create {
                path: "a/b/c.txt".to_string(),
                success: true
            }
        );

        let read = handle_read(&ctx, "a/b/c.txt".to_string()).await.unwrap();
        assert_eq!(
            read,
            Response::Read {
                path: "a/b/c.txt".to_string(),
                content: "hi".to_string(),
                success: true
            }
        );
    }

    #[tokio::test]
    async fn test_create_with_null_content_is_empty() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx_for(&temp);

        for (raw, name) in [
            (r#"{"kind":"create","path":"n/null.txt","content":null}"#, "n/null.txt"),
            (r#"{"kind":"create","path":"n/none.txt"}"#, "n/none.txt"),
            (r#"{"kind":"create","path":"n/empty.txt","content":""}"#, "n/empty.txt"),
        ] {
            let request: Request = serde_json::from_str(raw).unwrap();
            let response = dispatch(&ctx, request).await.unwrap();
            assert!(matches!(response, Response::Create { success: true, .. }), "{}", raw);
            assert_eq!(std::fs::read_to_string(temp.path().join(name)).unwrap(), "");
        }
    }

    #[tokio::test]
    async fn test_delete_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let err = handle_delete(&ctx_for(&temp), "missing.txt".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::File(_)));
        assert!(!err.to_reply().error.is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_is_tagged() {
        let temp = TempDir::new().unwrap();
        let response = handle_list(&ctx_for(&temp), "nope".to_string())
            .await
            .unwrap();
        match response {
            Response::List {
                path,
                files,
                error,
                success,
            } => {
                assert_eq!(path, "nope");
                assert!(files.is_none());
                assert!(error.is_some());
                assert!(!success);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
}

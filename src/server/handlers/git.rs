use tracing::{info, warn};

use crate::server::context::{BridgeError, ConnectionContext};
use crate::server::git;
use crate::server::protocol::{Response, DEFAULT_COMMIT_MESSAGE};

pub async fn handle_git_status(ctx: &ConnectionContext) -> Result<Response, BridgeError> {
    let root = ctx.root().to_path_buf();
    let result = tokio::task::spawn_blocking(move || git::git_status(&root)).await?;

    info!("Git status: {} changes", result.changes.len());
    Ok(Response::GitStatus {
        changes: result.changes,
        message: result.message,
        success: true,
    })
}

pub async fn handle_git_diff(
    ctx: &ConnectionContext,
    file: Option<String>,
) -> Result<Response, BridgeError> {
    let file = file.filter(|f| !f.is_empty());
    let diff = {
        let (root, file) = (ctx.root().to_path_buf(), file.clone());
        tokio::task::spawn_blocking(move || git::git_diff(&root, file.as_deref())).await?
    };

    match &file {
        Some(f) => info!("Git diff for {}", f),
        None => info!("Git diff"),
    }
    Ok(Response::GitDiff {
        diff,
        file,
        success: true,
    })
}

/// Commits every working-tree change, not only files this client touched
pub async fn handle_git_commit(
    ctx: &ConnectionContext,
    message: Option<String>,
) -> Result<Response, BridgeError> {
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());
    let result = {
        let (root, message) = (ctx.root().to_path_buf(), message.clone());
        tokio::task::spawn_blocking(move || git::git_commit(&root, &message)).await?
    };

    if result.ok {
        info!("Committed: {}", message);
        Ok(Response::GitCommit {
            message: Some(result.message),
            error: None,
            success: true,
        })
    } else {
        warn!("Commit failed: {}", result.message);
        Ok(Response::GitCommit {
            message: None,
            error: Some(result.message),
            success: false,
        })
    }
}

pub async fn handle_git_push(ctx: &ConnectionContext) -> Result<Response, BridgeError> {
    let root = ctx.root().to_path_buf();
    let result = tokio::task::spawn_blocking(move || git::git_push(&root)).await?;

    if result.ok {
        info!("Pushed to remote");
        Ok(Response::GitPush {
            message: Some(result.message),
            error: None,
            success: true,
        })
    } else {
        warn!("Push failed: {}", result.message);
        Ok(Response::GitPush {
            message: None,
            error: Some(result.message),
            success: false,
        })
    }
}

// handlers module - request dispatch
// One function per domain; each returns the tagged response for its kinds.

pub mod file;
pub mod git;

use tracing::trace;

use crate::server::context::{BridgeError, ConnectionContext};
use crate::server::protocol::{Request, Response};

/// Route a decoded request to its handler
///
/// `Err` means the failure could not be expressed in the request's own
/// response shape; the caller turns it into an untagged error reply.
pub async fn dispatch(ctx: &ConnectionContext, request: Request) -> Result<Response, BridgeError> {
    trace!("Dispatching {}", request.kind());

    match request {
        Request::Read { path } => file::handle_read(ctx, path).await,
        Request::Write { path, content } => file::handle_write(ctx, path, content).await,
        Request::List { path } => file::handle_list(ctx, path).await,
        Request::Create { path, content } => {
            file::handle_create(ctx, path, content.unwrap_or_default()).await
        }
        Request::Delete { path } => file::handle_delete(ctx, path).await,
        Request::GitStatus => git::handle_git_status(ctx).await,
        Request::GitDiff { file } => git::handle_git_diff(ctx, file).await,
        Request::GitCommit { message } => git::handle_git_commit(ctx, message).await,
        Request::GitPush => git::handle_git_push(ctx).await,
    }
}

pub mod context;
pub mod file_api;
pub mod git;
pub mod handlers;
pub mod protocol;
pub mod watcher;
pub mod ws;

pub use context::{BridgeError, ConnectionContext, SharedConfig};
pub use file_api::{FileApiError, FileEntry};
pub use git::{git_commit, git_diff, git_push, git_status, GitOpResult, GitOutput, GitStatusResult};
pub use protocol::{ErrorReply, GitChange, Reply, Request, Response};
pub use watcher::{ChangeFilter, ChangeWatcher};
pub use ws::{router, run_server, serve};

use serde::{Deserialize, Deserializer, Serialize};

/// Commit message used when the client does not send one
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update files";

/// `null` and `""` both mean "not given"
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

// ============================================================================
// Client -> Bridge
// ============================================================================

/// One request per WebSocket frame, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Request {
    Read {
        path: String,
    },
    Write {
        path: String,
        content: String,
    },
    List {
        path: String,
    },
    Create {
        path: String,
        /// Missing or `null` creates an empty file
        #[serde(default)]
        content: Option<String>,
    },
    Delete {
        path: String,
    },
    GitStatus,
    GitDiff {
        #[serde(default, deserialize_with = "non_empty")]
        file: Option<String>,
    },
    GitCommit {
        #[serde(default, deserialize_with = "non_empty")]
        message: Option<String>,
    },
    GitPush,
}

impl Request {
    /// Wire name of the request kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Read { .. } => "read",
            Request::Write { .. } => "write",
            Request::List { .. } => "list",
            Request::Create { .. } => "create",
            Request::Delete { .. } => "delete",
            Request::GitStatus => "git-status",
            Request::GitDiff { .. } => "git-diff",
            Request::GitCommit { .. } => "git-commit",
            Request::GitPush => "git-push",
        }
    }
}

// ============================================================================
// Bridge -> Client
// ============================================================================

/// File reported by `list`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntryInfo {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
}

/// Classification of a porcelain status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Untracked,
    Added,
    Deleted,
    Modified,
    Renamed,
}

/// One uncommitted change reported by `git-status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitChange {
    pub file: String,
    pub status: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
}

/// Response tagged with the kind of the request it answers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Response {
    Read {
        path: String,
        content: String,
        success: bool,
    },
    Write {
        path: String,
        success: bool,
    },
    List {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        files: Option<Vec<FileEntryInfo>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        success: bool,
    },
    Create {
        path: String,
        success: bool,
    },
    Delete {
        path: String,
        success: bool,
    },
    GitStatus {
        changes: Vec<GitChange>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        success: bool,
    },
    GitDiff {
        diff: String,
        file: Option<String>,
        success: bool,
    },
    GitCommit {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        success: bool,
    },
    GitPush {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        success: bool,
    },
}

/// Failure that could not be attributed to a request kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReply {
    pub success: bool,
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Everything the bridge writes to the socket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Response(Response),
    Error(ErrorReply),
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<ErrorReply> for Reply {
    fn from(error: ErrorReply) -> Self {
        Reply::Error(error)
    }
}

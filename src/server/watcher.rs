//! 文件监控模块
//!
//! 每个连接一个 `ChangeWatcher`：
//! - 监控配置的 glob 根目录（默认 `src/**/*`、`public/**/*`）
//! - 防抖聚合事件（默认 500ms）
//! - 忽略路径中含 node_modules、dist 的文件
//! - 只报告已有文件的修改；新建文件第一次出现时只记下，不报告
//!
//! 变化只写日志，不推送给客户端。日志走启动监控时的 tracing dispatcher。

use glob::Pattern;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEvent, Debouncer};
use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, dispatcher, info, warn};
use walkdir::WalkDir;

use crate::config::WatchSection;

/// Decides which changed paths are worth reporting
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    patterns: Vec<Pattern>,
    ignore: Vec<String>,
}

impl ChangeFilter {
    pub fn new(root: &Path, config: &WatchSection) -> Result<Self, String> {
        let patterns = config
            .globs
            .iter()
            .map(|g| Pattern::new(g).map_err(|e| format!("Invalid watch glob '{}': {}", g, e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            patterns,
            ignore: config.ignore.clone(),
        })
    }

    /// Relative path of `path` if it is under the root, matches a glob and
    /// contains no ignored fragment
    pub fn matches(&self, path: &Path) -> Option<String> {
        let rel_path = path.strip_prefix(&self.root).ok()?;
        if self.is_ignored(rel_path) {
            return None;
        }
        if !self.patterns.iter().any(|p| p.matches_path(rel_path)) {
            return None;
        }
        Some(rel_path.to_string_lossy().to_string())
    }

    fn is_ignored(&self, rel_path: &Path) -> bool {
        let rel_str = rel_path.to_string_lossy();
        self.ignore.iter().any(|frag| rel_str.contains(frag.as_str()))
    }

    /// Files below `roots` that would be reported if they changed
    fn existing_files(&self, roots: &[PathBuf]) -> HashSet<PathBuf> {
        roots
            .iter()
            .flat_map(|dir| {
                WalkDir::new(dir).into_iter().filter_entry(move |entry| {
                    entry
                        .path()
                        .strip_prefix(&self.root)
                        .map_or(true, |rel| !self.is_ignored(rel))
                })
            })
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && self.matches(entry.path()).is_some())
            .map(|entry| entry.into_path())
            .collect()
    }

    /// Directories that have to be watched to see every glob match
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for pattern in &self.patterns {
            let base = self.root.join(glob_base(pattern.as_str()));
            if !roots.iter().any(|r| base.starts_with(r)) {
                roots.retain(|r| !r.starts_with(&base));
                roots.push(base);
            }
        }
        roots
    }
}

/// Literal leading directories of a glob, e.g. `src/**/*` -> `src`
pub fn glob_base(glob: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let components: Vec<Component> = Path::new(glob).components().collect();
    let last = components.len().saturating_sub(1);

    for (i, component) in components.into_iter().enumerate() {
        let has_wildcard = component
            .as_os_str()
            .to_string_lossy()
            .contains(['*', '?', '[', '{']);
        if i == last || has_wildcard {
            break;
        }
        base.push(component);
    }
    base
}

/// 连接级文件监控器，drop 即停止
pub struct ChangeWatcher {
    debouncer: Option<Debouncer<RecommendedWatcher>>,
    watched: Vec<PathBuf>,
}

impl ChangeWatcher {
    /// Start watching below `root`
    ///
    /// Glob roots that do not exist are skipped; a watcher with nothing to
    /// watch is still returned.
    pub fn start(root: &Path, config: &WatchSection) -> Result<Self, String> {
        // notify 上报的是规范化路径
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let filter = ChangeFilter::new(&root, config)?;

        let roots: Vec<PathBuf> = filter
            .watch_roots()
            .into_iter()
            .filter(|dir| {
                let exists = dir.is_dir();
                if !exists {
                    debug!("Watch root does not exist, skipping: {}", dir.display());
                }
                exists
            })
            .collect();

        if roots.is_empty() {
            return Ok(Self {
                debouncer: None,
                watched: roots,
            });
        }

        let mut known = filter.existing_files(&roots);
        // 防抖线程没有 thread-local subscriber，带上当前的
        let dispatch = dispatcher::get_default(|d| d.clone());

        let mut debouncer = new_debouncer(
            Duration::from_millis(config.debounce_ms),
            move |res: DebounceEventResult| {
                dispatcher::with_default(&dispatch, || match res {
                    Ok(events) => {
                        Self::process_events(events, &filter, &mut known);
                    }
                    Err(e) => warn!("Watch error: {}", e),
                })
            },
        )
        .map_err(|e| format!("Failed to create debouncer: {}", e))?;

        for dir in &roots {
            debouncer
                .watcher()
                .watch(dir, RecursiveMode::Recursive)
                .map_err(|e| format!("Failed to watch {}: {}", dir.display(), e))?;
        }

        info!("Watching for external changes in {:?}", roots);
        Ok(Self {
            debouncer: Some(debouncer),
            watched: roots,
        })
    }

    #[cfg(test)]
    fn watched_roots(&self) -> &[PathBuf] {
        &self.watched
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.debouncer.is_some()
    }

    /// 处理防抖后的事件，返回报告过的相对路径
    ///
    /// Only regular files already in `known` count as changed. A file seen
    /// for the first time is added to `known` silently; a path that is gone
    /// is dropped from it.
    fn process_events(
        events: Vec<DebouncedEvent>,
        filter: &ChangeFilter,
        known: &mut HashSet<PathBuf>,
    ) -> Vec<String> {
        let mut changed = BTreeSet::new();
        for event in events {
            if !event.path.is_file() {
                known.remove(&event.path);
                continue;
            }
            let Some(rel) = filter.matches(&event.path) else {
                continue;
            };
            if known.insert(event.path) {
                debug!("New file, not reported: {}", rel);
                continue;
            }
            changed.insert(rel);
        }

        for path in &changed {
            info!("File changed externally: {}", path);
        }
        changed.into_iter().collect()
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        if self.debouncer.take().is_some() {
            debug!("Stopped watching {:?}", self.watched);
        }
    }
}

//! The workspace: parse scheduling, deduplication, and the query surface.
//!
//! `add()` registers one parse task per file, deduplicated by
//! `(path, content hash)` against the in-flight registry; duplicate adds
//! join the existing task through its completion cell. Each task races a
//! fixed deadline and an optional cooperative cancellation token, and
//! failures stay local to their file. `with_parser_ready()` drains the
//! registry (the barrier no cross-file pass may start before), then runs
//! the two global passes over the shared model.

pub mod model;
mod passes;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::base::{ContentHash, normalize_path};
use crate::core::{Expired, TaskCell, with_deadline};
use crate::semantic::error::WorkspaceError;
use crate::semantic::ids::SourceUnitId;
use crate::semantic::imports::ImportResolver;
use crate::semantic::populate;

pub use model::Model;

/// How long one file may spend in parse before its task rejects.
const PARSER_DEADLINE: Duration = Duration::from_secs(3);

/// Capacity of the content-hash cache.
const CACHE_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    /// Recursively schedule resolved import targets.
    pub parse_imports: bool,
    /// Tag identifier uses with their resolved scope.
    pub resolve_identifiers: bool,
    /// Propagate inherited names during `with_parser_ready`.
    pub resolve_inheritance: bool,
    pub parser_deadline: Duration,
    pub cache_capacity: usize,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            parse_imports: true,
            resolve_identifiers: true,
            resolve_inheritance: true,
            parser_deadline: PARSER_DEADLINE,
            cache_capacity: CACHE_CAPACITY,
        }
    }
}

/// Per-call options for [`Workspace::add_with`].
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Parse this text instead of reading the file (synthetic units).
    pub content: Option<String>,
    /// Return the already-indexed unit for this path instead of
    /// reparsing; used when following imports so diamond-shaped graphs
    /// parse each file once.
    pub skip_existing: bool,
    /// Cooperative cancellation for this add and its import subtree.
    pub cancel: Option<CancellationToken>,
}

/// Outcome of one `with_parser_ready` drain.
#[derive(Debug, Default)]
pub struct ReadyReport {
    pub parsed: Vec<SourceUnitId>,
    pub failed: Vec<(PathBuf, WorkspaceError)>,
}

type AddResult = Result<SourceUnitId, WorkspaceError>;

#[derive(Clone)]
struct ParseTask {
    path: PathBuf,
    hash: ContentHash,
    cell: Arc<TaskCell<AddResult>>,
}

struct WorkspaceInner {
    options: WorkspaceOptions,
    basedirs: Vec<PathBuf>,
    model: RwLock<Model>,
    tasks: Mutex<Vec<ParseTask>>,
}

/// A session-long workspace over one Solidity source tree.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

impl Workspace {
    pub fn new(basedirs: Vec<PathBuf>) -> Self {
        Self::with_options(basedirs, WorkspaceOptions::default())
    }

    pub fn with_options(basedirs: Vec<PathBuf>, options: WorkspaceOptions) -> Self {
        let model = Model::new(basedirs.clone(), options.cache_capacity);
        Self {
            inner: Arc::new(WorkspaceInner {
                options,
                basedirs,
                model: RwLock::new(model),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.inner.options
    }

    /// Read access to the shared model. Do not hold the guard across
    /// `await` points.
    pub fn model(&self) -> RwLockReadGuard<'_, Model> {
        self.inner.model.read()
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Parse a file into the workspace. Resolves to the unit's ID once
    /// its task settles; identical in-flight work is joined, not repeated.
    pub async fn add(&self, path: impl AsRef<Path>) -> AddResult {
        self.add_with(path, AddOptions::default()).await
    }

    /// Parse raw source registered under a synthetic path.
    pub async fn add_source(&self, path: impl AsRef<Path>, content: impl Into<String>) -> AddResult {
        self.add_with(
            path,
            AddOptions {
                content: Some(content.into()),
                ..AddOptions::default()
            },
        )
        .await
    }

    pub async fn add_with(&self, path: impl AsRef<Path>, options: AddOptions) -> AddResult {
        let cell = self.schedule(path.as_ref().to_path_buf(), options).await?;
        cell.wait().await
    }

    /// Register (or join) the parse task for `(path, hash)`. Returns once
    /// the task is spawned and visible to the drain barrier; completion is
    /// observed through the returned cell.
    fn schedule(
        &self,
        path: PathBuf,
        options: AddOptions,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<Arc<TaskCell<AddResult>>, WorkspaceError>>
                + Send
                + '_,
        >,
    > {
        Box::pin(async move {
        let path = normalize_path(&path);
        let content = match options.content {
            Some(content) => content,
            None => tokio::fs::read_to_string(&path)
                .await
                .map_err(|error| WorkspaceError::Io {
                    path: path.clone(),
                    message: error.to_string(),
                })?,
        };
        let hash = ContentHash::of(&content);

        let cell = Arc::new(TaskCell::new());
        {
            let mut tasks = self.inner.tasks.lock();
            if let Some(task) = tasks
                .iter()
                .find(|task| task.path == path && task.hash == hash)
            {
                return Ok(task.cell.clone());
            }
            tasks.push(ParseTask {
                path: path.clone(),
                hash,
                cell: cell.clone(),
            });
        }

        let workspace = self.clone();
        let deadline = self.inner.options.parser_deadline;
        let cancel = options.cancel;
        let skip_existing = options.skip_existing;
        let task_cell = cell.clone();
        tokio::spawn(async move {
            let work = workspace.process(path.clone(), content, hash, skip_existing, cancel.clone());
            let result = match with_deadline(deadline, cancel.as_ref(), work).await {
                Ok(result) => result,
                Err(Expired::DeadlineElapsed) => Err(WorkspaceError::Timeout { path, deadline }),
                Err(Expired::Cancelled) => Err(WorkspaceError::Cancelled { path }),
            };
            task_cell.complete(result);
        });
        Ok(cell)
        })
    }

    /// The task body: cache lookups, parse, integration, import
    /// follow-up. Locks are scoped and never held across `await`.
    async fn process(
        &self,
        path: PathBuf,
        content: String,
        hash: ContentHash,
        skip_existing: bool,
        cancel: Option<CancellationToken>,
    ) -> AddResult {
        if skip_existing {
            let existing = self.inner.model.read().get(&path).map(|unit| unit.id);
            if let Some(id) = existing {
                return Ok(id);
            }
        }

        enum CacheOutcome {
            Miss,
            Reused(SourceUnitId),
            Cloned(SourceUnitId),
        }
        let outcome = {
            let mut model = self.inner.model.write();
            match model.cached(hash) {
                Some(existing) => {
                    if model.unit(existing).path == path {
                        model.touch(existing);
                        CacheOutcome::Reused(existing)
                    } else {
                        CacheOutcome::Cloned(model.clone_unit_as(existing, path.clone()))
                    }
                }
                None => CacheOutcome::Miss,
            }
        };
        match outcome {
            CacheOutcome::Reused(id) => {
                tracing::debug!(path = %path.display(), "cache hit");
                return Ok(id);
            }
            CacheOutcome::Cloned(id) => {
                tracing::debug!(path = %path.display(), "cache hit under new path");
                return Ok(id);
            }
            CacheOutcome::Miss => {}
        }

        let parsed = crate::parser::parse(&content);
        for error in &parsed.errors {
            tracing::debug!(path = %path.display(), error = %error, "recovered parse error");
        }
        if parsed.is_empty_with_errors() {
            return Err(WorkspaceError::Parse {
                path: path.clone(),
                source: parsed.errors[0].clone(),
            });
        }

        let unit = populate::build_source_unit(
            path.clone(),
            hash,
            &content,
            &parsed.unit,
            self.inner.options.resolve_identifiers,
        );
        let import_literals: Vec<String> = unit
            .imports
            .iter()
            .map(|import| import.path.clone())
            .collect();

        let id = {
            let mut model = self.inner.model.write();
            let id = model.register_unit(unit);
            model.classify_unit_calls(id);
            id
        };

        if self.inner.options.parse_imports {
            let resolver = ImportResolver::new(&self.inner.basedirs);
            let targets: Vec<PathBuf> = import_literals
                .iter()
                .filter_map(|literal| resolver.resolve(literal, &path))
                .collect();
            for target in targets {
                let child_options = AddOptions {
                    content: None,
                    skip_existing: true,
                    cancel: cancel.clone(),
                };
                // fire-and-forget: completion is observed by the drain
                // barrier, and a failing import never fails its parent
                if let Err(error) = self.schedule(target.clone(), child_options).await {
                    tracing::error!(
                        path = %target.display(),
                        error = %error,
                        "failed to schedule import"
                    );
                }
            }
        }
        Ok(id)
    }

    // =========================================================================
    // Drain and passes
    // =========================================================================

    /// Await every currently scheduled parse task, in batches, until the
    /// registry is empty; tasks registered by in-flight parents are
    /// caught by the next batch.
    async fn drain(&self) -> Vec<(PathBuf, AddResult)> {
        let mut settled = Vec::new();
        loop {
            let batch: Vec<ParseTask> = std::mem::take(&mut *self.inner.tasks.lock());
            if batch.is_empty() {
                break;
            }
            for task in batch {
                let result = task.cell.wait().await;
                settled.push((task.path, result));
            }
        }
        settled
    }

    /// Drain all scheduled adds, then run pass 1 (linearization and
    /// inherited names, restricted to `scope_file` unless `resolve_all`)
    /// and pass 2 (call refinement, always global). Idempotent for
    /// already-resolved contracts.
    pub async fn with_parser_ready(
        &self,
        scope_file: Option<&Path>,
        resolve_all: bool,
    ) -> Result<ReadyReport, WorkspaceError> {
        let settled = self.drain().await;
        let mut report = ReadyReport::default();
        for (path, result) in settled {
            match result {
                Ok(id) => report.parsed.push(id),
                Err(error) => report.failed.push((path, error)),
            }
        }

        let scope = scope_file.map(|p| normalize_path(p));
        {
            let mut model = self.inner.model.write();
            model.resolve_dependencies(
                scope.as_deref(),
                resolve_all,
                self.inner.options.resolve_inheritance,
            )?;
            model.refine_calls();
        }
        Ok(report)
    }
}

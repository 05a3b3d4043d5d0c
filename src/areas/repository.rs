//! The repository facade.
//!
//! Owns one instance of every store and exposes one operation per
//! user-facing verb. Operations return structured payloads; rendering them
//! (and mapping errors to exit codes) belongs entirely to the CLI layer.

use crate::areas::commit_store::{CommitStore, RestoreOutcome, COMMITS_DIR};
use crate::areas::index::{EntryStatus, StagingIndex, INDEX_FILE};
use crate::areas::refs::{HeadState, Refs, HEAD_FILE};
use crate::areas::workspace::{normalize_rel, Workspace};
use crate::artifacts::branch_name::BranchName;
use crate::artifacts::commit::{Commit, CommitId};
use crate::artifacts::config::{Config, CONFIG_FILE};
use crate::artifacts::diff::{DiffReport, DiffSource};
use crate::artifacts::ignore::{IgnoreMatcher, IGNORE_FILE};
use crate::artifacts::log::{GraphReport, HistoryReport};
use crate::artifacts::status::engine::ChangeEngine;
use crate::artifacts::status::StatusReport;
use crate::errors::{RepositoryError, Result};
use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use tracing::info;

pub const METADATA_DIR: &str = ".strata";
pub const DEFAULT_BRANCH: &str = "main";

const DEFAULT_IGNORE_TEMPLATE: &str = "\
# strata ignore file
# Patterns follow gitignore syntax

# Editors
*.swp
*.swo
*~

# OS
.DS_Store
Thumbs.db

# Build artifacts
target/
build/
dist/

# Add your custom patterns below
";

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub metadata_root: PathBuf,
    pub created: bool,
    pub default_branch: String,
}

#[derive(Debug, Clone, Default)]
pub struct AddOutcome {
    pub staged: Vec<(PathBuf, EntryStatus)>,
    pub ignored: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub commit: Commit,
    pub branch: Option<BranchName>,
    /// Staged paths that could not be read during the snapshot.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum CheckoutTarget {
    Branch(BranchName),
    Commit(CommitId),
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub target: CheckoutTarget,
    pub created_branch: bool,
    pub previous_branch: Option<BranchName>,
    pub restore: RestoreOutcome,
}

#[derive(Debug, Clone)]
pub struct BranchCreated {
    pub name: BranchName,
    pub at: CommitId,
}

#[derive(Debug, Clone)]
pub struct BranchDeleted {
    pub name: BranchName,
    pub was_at: Option<CommitId>,
}

#[derive(Debug, Clone)]
pub struct BranchRenamed {
    pub old: BranchName,
    pub new: BranchName,
    pub head_followed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BranchList {
    pub branches: Vec<BranchName>,
    pub current: Option<BranchName>,
    pub detached_at: Option<CommitId>,
}

#[derive(Debug, Clone)]
pub struct RevertOutcome {
    pub commit: Commit,
    pub restore: RestoreOutcome,
    pub hard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    Soft,
    Mixed,
    Hard,
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetMode::Soft => write!(f, "soft"),
            ResetMode::Mixed => write!(f, "mixed"),
            ResetMode::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResetOutcome {
    pub mode: ResetMode,
    pub head: CommitId,
    pub restore: Option<RestoreOutcome>,
}

pub struct Repository {
    root: Box<Path>,
    workspace: Workspace,
    refs: Refs,
    commits: CommitStore,
    index: RefCell<StagingIndex>,
    ignore: IgnoreMatcher,
    config: Config,
}

impl Repository {
    /// Create the metadata layout. Re-running on an initialized repository
    /// is a no-op reported through `created: false`.
    pub fn init(root: &Path) -> Result<InitOutcome> {
        let meta = root.join(METADATA_DIR);

        if meta.is_dir() {
            return Ok(InitOutcome {
                metadata_root: meta,
                created: false,
                default_branch: DEFAULT_BRANCH.to_string(),
            });
        }

        let heads = meta.join("refs").join("heads");
        std::fs::create_dir_all(meta.join(COMMITS_DIR))?;
        std::fs::create_dir_all(&heads)?;

        std::fs::write(
            meta.join(HEAD_FILE),
            format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
        )?;
        // Default branch exists from the start but points nowhere until the
        // first commit.
        std::fs::write(heads.join(DEFAULT_BRANCH), b"")?;

        StagingIndex::new(meta.join(INDEX_FILE).into_boxed_path()).save()?;
        Config::default().save(&meta.join(CONFIG_FILE))?;

        let ignore_path = root.join(IGNORE_FILE);
        if !ignore_path.exists() {
            std::fs::write(&ignore_path, DEFAULT_IGNORE_TEMPLATE)?;
        }

        info!(root = %meta.display(), "initialized empty repository");
        Ok(InitOutcome {
            metadata_root: meta,
            created: true,
            default_branch: DEFAULT_BRANCH.to_string(),
        })
    }

    pub fn open(root: &Path) -> Result<Self> {
        let root = root.canonicalize()?;
        let meta = root.join(METADATA_DIR);

        if !meta.is_dir() {
            return Err(RepositoryError::NotARepository);
        }

        let config = Config::load(&meta.join(CONFIG_FILE))?;
        let ignore = IgnoreMatcher::load(&root);
        let mut index = StagingIndex::new(meta.join(INDEX_FILE).into_boxed_path());
        index.load()?;

        Ok(Repository {
            workspace: Workspace::new(root.clone().into_boxed_path()),
            refs: Refs::new(meta.clone().into_boxed_path()),
            commits: CommitStore::new(meta.join(COMMITS_DIR).into_boxed_path()),
            index: RefCell::new(index),
            ignore,
            config,
            root: root.into_boxed_path(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn commits(&self) -> &CommitStore {
        &self.commits
    }

    pub fn ignore(&self) -> &IgnoreMatcher {
        &self.ignore
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> Ref<'_, StagingIndex> {
        self.index.borrow()
    }

    /// Stage files. Ignored paths and per-file failures are collected into
    /// the outcome instead of aborting the whole operation.
    pub fn add(&self, targets: &[String], all: bool) -> Result<AddOutcome> {
        let mut outcome = AddOutcome::default();
        let mut index = self.index.borrow_mut();

        if all {
            for path in index.stage_all(&self.workspace)? {
                outcome.staged.push((path, EntryStatus::Modified));
            }
        } else {
            for raw in targets {
                for path in self.workspace.expand_target(raw) {
                    match index.stage(&path, &self.workspace, &self.ignore) {
                        Ok(status) => outcome.staged.push((path, status)),
                        Err(RepositoryError::IgnoredPath(path)) => outcome.ignored.push(path),
                        Err(
                            err @ (RepositoryError::PathNotFound(_)
                            | RepositoryError::NotAFile(_)
                            | RepositoryError::Io(_)),
                        ) => outcome.failed.push((path, err.to_string())),
                        Err(err) => return Err(err),
                    }
                }
            }
        }

        index.save()?;
        Ok(outcome)
    }

    pub fn unstage(&self, target: &str) -> Result<PathBuf> {
        let path = normalize_rel(target);
        let mut index = self.index.borrow_mut();

        index.unstage(&path)?;
        index.save()?;

        Ok(path)
    }

    /// Commit the staging area. The snapshot is fully written before any
    /// reference moves; the staging area is cleared only afterwards.
    pub fn commit(&self, message: &str, all: bool) -> Result<CommitOutcome> {
        let mut index = self.index.borrow_mut();

        if all {
            index.stage_all(&self.workspace)?;
        }
        if !index.has_staged() {
            return Err(RepositoryError::NothingToCommit);
        }

        let head = self.refs.head()?;
        let parent = head.commit_id().cloned();
        let branch = head.branch().cloned();
        let staged_paths: Vec<PathBuf> = index.staged().keys().cloned().collect();

        let (commit, skipped) = self.commits.create_commit(
            message,
            &staged_paths,
            &self.workspace,
            self.config.author(),
            parent,
            branch.as_ref(),
        )?;

        self.refs.set_head(&commit.id, branch.as_ref())?;
        index.clear_staged();
        index.save()?;

        info!(id = %commit.id, files = commit.files.len(), "committed");
        Ok(CommitOutcome {
            commit,
            branch,
            skipped,
        })
    }

    /// Switch to a branch or commit, restoring its snapshot into the
    /// working tree. Blocked by uncommitted changes unless forced.
    pub fn checkout(&self, target: &str, create: bool, force: bool) -> Result<CheckoutOutcome> {
        let previous_branch = self.refs.current_branch()?;

        if !force && self.has_uncommitted_changes()? {
            return Err(RepositoryError::UncommittedChanges);
        }

        if create {
            let name = BranchName::try_parse(target)?;
            let head_id = self
                .refs
                .resolve_head()?
                .ok_or(RepositoryError::NoCommits)?;
            self.refs.create_branch(&name, &head_id)?;

            let commit = self.commits.require(&head_id)?;
            let restore = self.commits.restore(&commit, &self.workspace)?;
            self.refs.set_head(&head_id, Some(&name))?;
            self.reset_index_to(&commit)?;

            return Ok(CheckoutOutcome {
                target: CheckoutTarget::Branch(name),
                created_branch: true,
                previous_branch,
                restore,
            });
        }

        if let Ok(name) = BranchName::try_parse(target) {
            if self.refs.branch_exists(&name) {
                let id = self.refs.read_branch(&name)?.ok_or_else(|| {
                    RepositoryError::InvalidReference {
                        reason: format!("branch '{name}' has no commits"),
                    }
                })?;
                let commit = self.commits.require(&id)?;
                let restore = self.commits.restore(&commit, &self.workspace)?;
                self.refs.set_head(&id, Some(&name))?;
                self.reset_index_to(&commit)?;

                return Ok(CheckoutOutcome {
                    target: CheckoutTarget::Branch(name),
                    created_branch: false,
                    previous_branch,
                    restore,
                });
            }
        }

        if let Ok(id) = CommitId::try_parse(target) {
            if let Some(commit) = self.commits.commit(&id)? {
                let restore = self.commits.restore(&commit, &self.workspace)?;
                self.refs.set_head(&id, None)?;
                self.reset_index_to(&commit)?;

                return Ok(CheckoutOutcome {
                    target: CheckoutTarget::Commit(id),
                    created_branch: false,
                    previous_branch,
                    restore,
                });
            }
        }

        Err(RepositoryError::TargetNotFound(target.to_string()))
    }

    pub fn create_branch(&self, name: &str) -> Result<BranchCreated> {
        let name = BranchName::try_parse(name)?;
        let at = self
            .refs
            .resolve_head()?
            .ok_or(RepositoryError::NoCommits)?;

        self.refs.create_branch(&name, &at)?;
        Ok(BranchCreated { name, at })
    }

    pub fn delete_branch(&self, name: &str) -> Result<BranchDeleted> {
        let name = BranchName::try_parse(name)?;
        let was_at = self.refs.delete_branch(&name)?;

        Ok(BranchDeleted { name, was_at })
    }

    pub fn rename_branch(&self, old: &str, new: &str) -> Result<BranchRenamed> {
        let old = BranchName::try_parse(old)?;
        let new = BranchName::try_parse(new)?;
        let head_followed = self.refs.rename_branch(&old, &new)?;

        Ok(BranchRenamed {
            old,
            new,
            head_followed,
        })
    }

    pub fn list_branches(&self) -> Result<BranchList> {
        let head = self.refs.head()?;

        Ok(BranchList {
            branches: self.refs.list_branches()?,
            current: head.branch().cloned(),
            detached_at: match &head {
                HeadState::Detached(id) => Some(id.clone()),
                _ => None,
            },
        })
    }

    /// Move the working tree (and HEAD) back to a commit. Staged changes
    /// block the revert unless `hard`, which also clears them.
    pub fn revert(&self, target: &str, hard: bool) -> Result<RevertOutcome> {
        let id = CommitId::try_parse(target)
            .map_err(|_| RepositoryError::CommitNotFound(target.to_string()))?;
        let commit = self.commits.require(&id)?;

        if !hard && self.index.borrow().has_staged() {
            return Err(RepositoryError::UncommittedChanges);
        }

        let restore = self.commits.restore(&commit, &self.workspace)?;
        let branch = self.refs.current_branch()?;
        self.refs.set_head(&id, branch.as_ref())?;

        let mut index = self.index.borrow_mut();
        index.set_tracked(commit.files.iter().cloned());
        if hard {
            index.clear_staged();
        }
        index.save()?;

        info!(%id, hard, "reverted");
        Ok(RevertOutcome {
            commit,
            restore,
            hard,
        })
    }

    /// Re-apply the HEAD commit: `soft` moves nothing, `mixed` clears the
    /// staging area, `hard` also rebuilds the working tree from HEAD.
    pub fn reset(&self, mode: ResetMode) -> Result<ResetOutcome> {
        let head = self
            .refs
            .resolve_head()?
            .ok_or(RepositoryError::NoCommits)?;
        let mut restore = None;

        match mode {
            ResetMode::Soft => {}
            ResetMode::Mixed => {
                let mut index = self.index.borrow_mut();
                index.clear_staged();
                index.save()?;
            }
            ResetMode::Hard => {
                let commit = self.commits.require(&head)?;
                restore = Some(self.commits.restore(&commit, &self.workspace)?);

                let mut index = self.index.borrow_mut();
                index.set_tracked(commit.files.iter().cloned());
                index.clear_staged();
                index.save()?;
            }
        }

        Ok(ResetOutcome {
            mode,
            head,
            restore,
        })
    }

    pub fn status(&self) -> Result<StatusReport> {
        ChangeEngine::new(self).status()
    }

    pub fn diff(&self, from: &DiffSource, to: &DiffSource) -> Result<DiffReport> {
        ChangeEngine::new(self).diff(from, to)
    }

    pub fn history(&self, limit: Option<usize>) -> Result<HistoryReport> {
        let head = self.refs.head()?;
        let Some(id) = head.commit_id().cloned() else {
            return Ok(HistoryReport::default());
        };

        let mut commits = self.commits.commit_chain(&id)?;
        if let Some(limit) = limit {
            commits.truncate(limit);
        }

        Ok(HistoryReport {
            head: Some(id),
            branch: head.branch().cloned(),
            commits,
        })
    }

    pub fn graph(&self) -> Result<GraphReport> {
        let head = self.refs.head()?;
        let tips = self
            .refs
            .list_branches()?
            .into_iter()
            .filter_map(|branch| {
                self.refs
                    .read_branch(&branch)
                    .ok()
                    .flatten()
                    .map(|id| (branch, id))
            })
            .collect();

        Ok(GraphReport::assemble(
            self.commits.all_commits()?,
            tips,
            head.commit_id().cloned(),
            head.branch().cloned(),
        ))
    }

    /// Tracked files differing from the HEAD snapshot, or anything staged.
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let index = self.index.borrow();
        if index.has_staged() {
            return Ok(true);
        }

        let Some(head_id) = self.refs.resolve_head()? else {
            return Ok(false);
        };
        let Some(commit) = self.commits.commit(&head_id)? else {
            return Ok(false);
        };

        for path in index.tracked() {
            if !self.workspace.exists(path) {
                return Ok(true);
            }
            let Some(snapshot) = self.commits.snapshot_bytes(&commit.id, path)? else {
                continue;
            };
            if self.workspace.read_bytes(path)? != snapshot {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// After checkout/revert the tracked set mirrors the commit and the
    /// staging area starts empty.
    fn reset_index_to(&self, commit: &Commit) -> Result<()> {
        let mut index = self.index.borrow_mut();
        index.set_tracked(commit.files.iter().cloned());
        index.clear_staged();
        index.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn init_repo() -> (assert_fs::TempDir, Repository) {
        let dir = assert_fs::TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    fn write(repo: &Repository, rel: &str, content: &str) {
        repo.workspace()
            .write_file(Path::new(rel), content.as_bytes())
            .unwrap();
    }

    #[test]
    fn init_lays_out_the_metadata_root() {
        let dir = assert_fs::TempDir::new().unwrap();
        let outcome = Repository::init(dir.path()).unwrap();

        assert!(outcome.created);
        assert!(dir.path().join(".strata/commits").is_dir());
        assert!(dir.path().join(".strata/refs/heads/main").exists());
        assert!(dir.path().join(".strata/index.json").exists());
        assert!(dir.path().join(".strataignore").exists());

        let head = std::fs::read_to_string(dir.path().join(".strata/HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/main\n");

        let again = Repository::init(dir.path()).unwrap();
        assert!(!again.created);
    }

    #[test]
    fn open_refuses_uninitialized_directories() {
        let dir = assert_fs::TempDir::new().unwrap();

        assert!(matches!(
            Repository::open(dir.path()),
            Err(RepositoryError::NotARepository)
        ));
    }

    #[test]
    fn commit_updates_head_and_branch_ref_consistently() {
        let (_dir, repo) = init_repo();
        write(&repo, "a.txt", "one");
        repo.add(&["a.txt".to_string()], false).unwrap();

        let outcome = repo.commit("first", false).unwrap();

        let head = repo.refs().head().unwrap();
        assert_eq!(head.commit_id(), Some(&outcome.commit.id));
        assert_eq!(
            repo.refs()
                .read_branch(&BranchName::try_parse("main").unwrap())
                .unwrap(),
            Some(outcome.commit.id.clone())
        );
        assert!(!repo.index().has_staged());
    }

    #[test]
    fn commit_with_nothing_staged_is_refused() {
        let (_dir, repo) = init_repo();

        assert!(matches!(
            repo.commit("empty", false),
            Err(RepositoryError::NothingToCommit)
        ));
    }

    #[test]
    fn edit_after_commit_then_hard_revert_restores_content() {
        let (_dir, repo) = init_repo();
        write(&repo, "a.txt", "committed content");
        repo.add(&["a.txt".to_string()], false).unwrap();
        let first = repo.commit("first", false).unwrap();

        write(&repo, "a.txt", "dirty edit");
        let status = repo.status().unwrap();
        assert!(status
            .unstaged_modified
            .contains(&PathBuf::from("a.txt")));
        assert!(status.staged.is_empty());

        repo.revert(first.commit.id.as_str(), true).unwrap();

        assert_eq!(
            repo.workspace().read_bytes(Path::new("a.txt")).unwrap(),
            b"committed content"
        );
        assert!(!repo.index().has_staged());
    }

    #[test]
    fn checkout_of_unknown_target_reports_it() {
        let (_dir, repo) = init_repo();
        write(&repo, "a.txt", "one");
        repo.add(&["a.txt".to_string()], false).unwrap();
        repo.commit("first", false).unwrap();

        assert!(matches!(
            repo.checkout("nowhere", false, false),
            Err(RepositoryError::TargetNotFound(_))
        ));
    }

    #[test]
    fn checkout_detaches_on_commit_ids() {
        let (_dir, repo) = init_repo();
        write(&repo, "a.txt", "one");
        repo.add(&["a.txt".to_string()], false).unwrap();
        let first = repo.commit("first", false).unwrap();

        let outcome = repo
            .checkout(first.commit.id.as_str(), false, false)
            .unwrap();

        assert!(matches!(outcome.target, CheckoutTarget::Commit(_)));
        assert_eq!(repo.refs().current_branch().unwrap(), None);
    }

    #[test]
    fn uncommitted_changes_block_checkout_unless_forced() {
        let (_dir, repo) = init_repo();
        write(&repo, "a.txt", "one");
        repo.add(&["a.txt".to_string()], false).unwrap();
        repo.commit("first", false).unwrap();
        repo.create_branch("dev").unwrap();

        write(&repo, "a.txt", "edited");
        assert!(matches!(
            repo.checkout("dev", false, false),
            Err(RepositoryError::UncommittedChanges)
        ));

        assert!(repo.checkout("dev", false, true).is_ok());
        assert_eq!(
            repo.workspace().read_bytes(Path::new("a.txt")).unwrap(),
            b"one"
        );
    }
}

//! History and commit-graph payloads.

use crate::artifacts::branch_name::BranchName;
use crate::artifacts::commit::{Commit, CommitId};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Linear history from HEAD towards the root.
#[derive(Debug, Clone, Default)]
pub struct HistoryReport {
    pub head: Option<CommitId>,
    pub branch: Option<BranchName>,
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub commit: Commit,
    pub children: Vec<CommitId>,
    /// Branches whose tip is this commit.
    pub branches: Vec<BranchName>,
}

/// Whole-graph view over every stored commit.
#[derive(Debug, Clone, Default)]
pub struct GraphReport {
    pub head: Option<CommitId>,
    pub branch: Option<BranchName>,
    /// Newest first (timestamp, then id, for a stable order).
    pub nodes: Vec<GraphNode>,
    pub branch_count: usize,
    /// Commits not reachable from any branch tip.
    pub orphaned: BTreeSet<CommitId>,
}

impl GraphReport {
    pub fn assemble(
        commits: Vec<Commit>,
        tips: Vec<(BranchName, CommitId)>,
        head: Option<CommitId>,
        branch: Option<BranchName>,
    ) -> Self {
        let by_id: BTreeMap<CommitId, &Commit> =
            commits.iter().map(|c| (c.id.clone(), c)).collect();

        let mut children: BTreeMap<CommitId, Vec<CommitId>> = BTreeMap::new();
        for commit in &commits {
            if let Some(parent) = &commit.parent {
                children.entry(parent.clone()).or_default().push(commit.id.clone());
            }
        }

        let mut branches_at: BTreeMap<CommitId, Vec<BranchName>> = BTreeMap::new();
        for (name, id) in &tips {
            branches_at.entry(id.clone()).or_default().push(name.clone());
        }

        // Everything reachable from a branch tip, walking parents with a
        // visited guard so a corrupt cycle cannot loop.
        let mut reachable: HashSet<CommitId> = HashSet::new();
        for (_, tip) in &tips {
            let mut cursor = Some(tip.clone());
            while let Some(id) = cursor {
                if !reachable.insert(id.clone()) {
                    break;
                }
                cursor = by_id.get(&id).and_then(|c| c.parent.clone());
            }
        }

        let orphaned: BTreeSet<CommitId> = commits
            .iter()
            .filter(|c| !reachable.contains(&c.id))
            .map(|c| c.id.clone())
            .collect();

        let branch_count = tips.len();
        let mut nodes: Vec<GraphNode> = commits
            .into_iter()
            .map(|commit| GraphNode {
                children: children.remove(&commit.id).unwrap_or_default(),
                branches: branches_at.remove(&commit.id).unwrap_or_default(),
                commit,
            })
            .collect();
        nodes.sort_by(|a, b| {
            (&b.commit.timestamp, &b.commit.id).cmp(&(&a.commit.timestamp, &a.commit.id))
        });

        GraphReport {
            head,
            branch,
            nodes,
            branch_count,
            orphaned,
        }
    }

    pub fn total_commits(&self) -> usize {
        self.nodes.len()
    }
}

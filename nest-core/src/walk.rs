use std::fmt::{self, Display};

use derive_more::Deref;
use log::debug;

use crate::tree::TreeNode;

/// One slot per decision level: `Some(answer)` once decided, `None` otherwise.
#[derive(Clone, Debug, Default, Deref, PartialEq, Eq)]
pub struct TextPath(pub Vec<Option<bool>>);

impl TextPath {
    /// Placeholder for an undecided level.
    pub const UNSET: char = 'x';

    pub fn new(answers: &[bool], len: usize) -> Self {
        TextPath((0..len).map(|i| answers.get(i).copied()).collect())
    }
}

impl Display for TextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.0 {
            let ch = match slot {
                Some(false) => '0',
                Some(true) => '1',
                None => TextPath::UNSET,
            };
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

/// The path currently walked from the root.
///
/// The first `linked` steps go through branches that exist in the tree. Any
/// deeper steps lead into tentative nodes owned here, one per step, which only
/// join the tree on [`Walk::commit`]. Nodes are addressed by depth and
/// resolved against the tree root on demand, so no references into the tree
/// are held between operations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Walk {
    answers: Vec<bool>,
    linked: usize,
    tentative: Vec<TreeNode>,
}

impl Walk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of the current node (0 at the root).
    pub fn depth(&self) -> usize {
        self.answers.len()
    }

    pub fn answers(&self) -> &[bool] {
        &self.answers
    }

    pub fn last_answer(&self) -> Option<bool> {
        self.answers.last().copied()
    }

    /// Number of leading steps that run through committed branches.
    pub fn linked(&self) -> usize {
        self.linked
    }

    pub fn node<'a>(&'a self, root: &'a TreeNode, depth: usize) -> Option<&'a TreeNode> {
        if depth <= self.linked {
            root.follow(self.answers.get(..depth)?)
        } else {
            self.tentative.get(depth - self.linked - 1)
        }
    }

    pub fn node_mut<'a>(&'a mut self, root: &'a mut TreeNode, depth: usize) -> Option<&'a mut TreeNode> {
        if depth <= self.linked {
            root.follow_mut(self.answers.get(..depth)?)
        } else {
            self.tentative.get_mut(depth - self.linked - 1)
        }
    }

    pub fn current<'a>(&'a self, root: &'a TreeNode) -> Option<&'a TreeNode> {
        self.node(root, self.depth())
    }

    pub fn current_mut<'a>(&'a mut self, root: &'a mut TreeNode) -> Option<&'a mut TreeNode> {
        let depth = self.depth();
        self.node_mut(root, depth)
    }

    /// Steps to the `answer` child of the current node.
    ///
    /// Follows the existing branch when the current node is in the tree and
    /// has one; otherwise steps into the node built by `fresh`. Returns whether
    /// an existing branch was followed.
    pub fn push(&mut self, root: &TreeNode, answer: bool, fresh: impl FnOnce() -> TreeNode) -> bool {
        let follows = self.depth() == self.linked
            && self.current(root).and_then(|node| node.child(answer)).is_some();
        if follows {
            self.linked += 1;
        } else {
            self.tentative.push(fresh());
        }
        self.answers.push(answer);
        follows
    }

    /// Steps back to the parent, dropping the current node if it was tentative.
    pub fn pop(&mut self) -> Option<bool> {
        let answer = self.answers.pop()?;
        if self.answers.len() < self.linked {
            self.linked -= 1;
        } else {
            self.tentative.pop();
        }
        Some(answer)
    }

    /// Links the tentative nodes into the tree and marks the whole walk fixed.
    ///
    /// Nodes are linked from the top down. A branch slot that is already
    /// occupied keeps its node, and the deeper tentative nodes are linked
    /// under that node instead, so the whole walk stays in the tree.
    pub fn commit(&mut self, root: &mut TreeNode) {
        let mut chain = std::mem::take(&mut self.tentative).into_iter();
        let mut attached = 0;
        while let Some(child) = chain.next() {
            let answer = self.answers[self.linked];
            let parent = match root.follow_mut(&self.answers[..self.linked]) {
                Some(parent) => parent,
                None => {
                    self.tentative = std::iter::once(child).chain(chain).collect();
                    break;
                }
            };
            let slot = &mut parent.branch[answer as usize];
            if slot.is_none() {
                *slot = Some(Box::new(child));
                attached += 1;
            }
            self.linked += 1;
        }
        for depth in 0..=self.linked {
            if let Some(node) = root.follow_mut(&self.answers[..depth]) {
                node.fixed = true;
            }
        }
        debug!("committed walk {:?} ({} new nodes)", self.answers, attached);
    }

    pub fn text_path(&self, len: usize) -> TextPath {
        TextPath::new(&self.answers, len)
    }
}

use std::fmt::Display;

use crate::{document::NodeDocument, error::DocumentError, r2::R2, walk::TextPath};

/// Decision node bound to circle `index` (its depth plus one).
///
/// `branch[0]` is taken when a point falls outside the circle, `branch[1]`
/// when it falls inside. Children are owned outright; there are no parent links.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub branch: [Option<Box<TreeNode>>; 2],
    pub index: usize,
    pub c: R2<f64>,
    /// Committed into the tree (as opposed to created during the current walk).
    pub fixed: bool,
}

impl TreeNode {
    pub fn new(index: usize, c: R2<f64>) -> Self {
        TreeNode { branch: [None, None], index, c, fixed: false }
    }

    pub fn child(&self, answer: bool) -> Option<&TreeNode> {
        self.branch[answer as usize].as_deref()
    }

    /// Follows `answers` through existing branches.
    pub fn follow(&self, answers: &[bool]) -> Option<&TreeNode> {
        answers.iter().try_fold(self, |node, answer| node.child(*answer))
    }

    pub fn follow_mut(&mut self, answers: &[bool]) -> Option<&mut TreeNode> {
        let mut node = self;
        for answer in answers {
            node = node.branch[*answer as usize].as_deref_mut()?;
        }
        Some(node)
    }

    /// Detaches and returns the subtree under `answer`.
    pub fn detach(&mut self, answer: bool) -> Option<Box<TreeNode>> {
        self.branch[answer as usize].take()
    }

    /// Number of levels below this node (0 for a node without children).
    pub fn height(&self) -> usize {
        self.branch.iter().flatten().map(|child| child.height() + 1).max().unwrap_or(0)
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.branch.iter().flatten().map(|child| child.size()).sum::<usize>()
    }

    /// Paths to every open position below this node, padded to `max_depth`.
    ///
    /// Depth-first with the outside branch first, so the paths come out in
    /// ascending order. Every unset branch slot yields the path to that slot,
    /// so a childless node yields both of its children. Nodes at `max_depth`
    /// are leaves and yield nothing. A root without children is the one
    /// exception: the whole tree is open and it yields a single all-`x` path.
    pub fn open_paths(&self, max_depth: usize) -> Vec<String> {
        let mut result = vec![];
        if max_depth > 0 && self.branch.iter().all(Option::is_none) {
            result.push(pad("", max_depth));
            return result;
        }
        let mut path = String::new();
        self.collect_open(&mut path, max_depth, &mut result);
        result
    }

    fn collect_open(&self, path: &mut String, max_depth: usize, result: &mut Vec<String>) {
        if path.len() >= max_depth {
            return;
        }
        for (digit, branch) in ['0', '1'].into_iter().zip(&self.branch) {
            path.push(digit);
            match branch {
                Some(child) => child.collect_open(path, max_depth, result),
                None => result.push(pad(path, max_depth)),
            }
            path.pop();
        }
    }

    pub fn to_document(&self) -> NodeDocument {
        NodeDocument {
            center: Some(vec![self.c.x, self.c.y]),
            branch: Some(
                self.branch
                    .iter()
                    .map(|b| b.as_ref().map_or_else(NodeDocument::default, |child| child.to_document()))
                    .collect(),
            ),
        }
    }

    /// Rebuilds a committed subtree bound to circle `index`, its children to
    /// `index + 1` and so on. Fails if a node would need a circle past `last_index`.
    pub fn from_document(doc: &NodeDocument, index: usize, last_index: usize) -> Result<TreeNode, DocumentError> {
        if index > last_index {
            return Err(DocumentError::TreeTooDeep {
                depth: index.saturating_sub(1),
                max: last_index.saturating_sub(1),
            });
        }
        let mut node = TreeNode::new(index, doc.point());
        node.fixed = true;
        let children = doc.branch.iter().flatten();
        for (slot, child) in node.branch.iter_mut().zip(children) {
            if !child.is_empty() {
                *slot = Some(Box::new(TreeNode::from_document(child, index + 1, last_index)?));
            }
        }
        Ok(node)
    }
}

fn pad(path: &str, len: usize) -> String {
    let mut padded = path.to_string();
    while padded.len() < len {
        padded.push(TextPath::UNSET);
    }
    padded
}

impl Display for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}{}{}", self.index, self.c, if self.fixed { "" } else { "*" })
    }
}

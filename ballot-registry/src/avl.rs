//! AVL tree keyed by voter identifier.
//!
//! Keys are ordered byte-wise. Every node keeps the height of its subtree and
//! after each insertion the ancestors on the insertion path are re-measured
//! and rebalanced with the four classic rotations.

use std::cmp::{max, Ordering};

use ballot_common::ident::{validate_id, IdKind};

use crate::errors::Result;

type Link = Option<Box<VoterNode>>;

/// A registered voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterNode {
    voter_id: String,
    has_voted: bool,
    height: u32,
    left: Link,
    right: Link,
}

impl VoterNode {
    fn new(voter_id: &str) -> Self {
        Self {
            voter_id: voter_id.to_string(),
            has_voted: false,
            height: 1,
            left: None,
            right: None,
        }
    }

    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }

    pub fn has_voted(&self) -> bool {
        self.has_voted
    }

    /// Height of the subtree rooted here; a leaf has height 1.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn left(&self) -> Option<&VoterNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&VoterNode> {
        self.right.as_deref()
    }

    /// Left height minus right height.
    pub fn balance_factor(&self) -> i64 {
        height(&self.left) as i64 - height(&self.right) as i64
    }
}

/// Result of [`Registry::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The key was already registered; nothing changed.
    AlreadyPresent,
}

/// Result of [`Registry::mark_voted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    NotFound,
    AlreadyVoted,
    /// The voter was unmarked and is now recorded as having voted.
    MarkedNow,
}

/// Balanced index of registered voters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    root: Link,
    len: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the whole tree; `0` when empty.
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    pub fn root(&self) -> Option<&VoterNode> {
        self.root.as_deref()
    }

    /// Registers `voter_id` with `has_voted = false`.
    ///
    /// Re-inserting an existing key is a no-op and leaves its voted flag
    /// untouched. Fails only when the identifier is out of bounds.
    pub fn insert(&mut self, voter_id: &str) -> Result<InsertOutcome> {
        validate_id(IdKind::Voter, voter_id)?;

        let mut outcome = InsertOutcome::AlreadyPresent;
        self.root = Some(insert_node(self.root.take(), voter_id, &mut outcome));
        if outcome == InsertOutcome::Inserted {
            self.len += 1;
        }
        Ok(outcome)
    }

    /// Records that `voter_id` has voted.
    ///
    /// Only the first call for a registered voter flips the flag; later
    /// calls report [`MarkOutcome::AlreadyVoted`].
    pub fn mark_voted(&mut self, voter_id: &str) -> MarkOutcome {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            match voter_id.cmp(node.voter_id.as_str()) {
                Ordering::Equal => {
                    if node.has_voted {
                        return MarkOutcome::AlreadyVoted;
                    }
                    node.has_voted = true;
                    return MarkOutcome::MarkedNow;
                }
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Greater => cur = node.right.as_deref_mut(),
            }
        }
        MarkOutcome::NotFound
    }

    pub fn find(&self, voter_id: &str) -> Option<&VoterNode> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match voter_id.cmp(node.voter_id.as_str()) {
                Ordering::Equal => return Some(node),
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
            }
        }
        None
    }

    pub fn contains(&self, voter_id: &str) -> bool {
        self.find(voter_id).is_some()
    }

    /// Number of voters already marked as voted.
    pub fn voted_count(&self) -> usize {
        self.iter().filter(|n| n.has_voted).count()
    }

    /// Nodes in increasing key order.
    pub fn iter(&self) -> InOrder<'_> {
        InOrder::new(self.root.as_deref())
    }

    /// Nodes in pre-order: node, left subtree, right subtree.
    pub fn preorder(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.root.as_deref().into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a VoterNode;
    type IntoIter = InOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order traversal driven by an explicit stack.
pub struct InOrder<'a> {
    stack: Vec<&'a VoterNode>,
}

impl<'a> InOrder<'a> {
    fn new(root: Option<&'a VoterNode>) -> Self {
        let mut it = InOrder { stack: Vec::new() };
        it.push_left_spine(root);
        it
    }

    fn push_left_spine(&mut self, mut node: Option<&'a VoterNode>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a VoterNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(node)
    }
}

/// Pre-order traversal driven by an explicit stack.
pub struct PreOrder<'a> {
    stack: Vec<&'a VoterNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a VoterNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(node)
    }
}

fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn update_height(node: &mut VoterNode) {
    node.height = 1 + max(height(&node.left), height(&node.right));
}

/// Lifts the left child into the root position.
fn rotate_right(mut node: Box<VoterNode>) -> Box<VoterNode> {
    let Some(mut new_root) = node.left.take() else {
        return node;
    };
    node.left = new_root.right.take();
    update_height(&mut node);
    new_root.right = Some(node);
    update_height(&mut new_root);
    new_root
}

/// Lifts the right child into the root position.
fn rotate_left(mut node: Box<VoterNode>) -> Box<VoterNode> {
    let Some(mut new_root) = node.right.take() else {
        return node;
    };
    node.right = new_root.left.take();
    update_height(&mut node);
    new_root.left = Some(node);
    update_height(&mut new_root);
    new_root
}

// Recursion depth is bounded by the tree height, which AVL keeps logarithmic.
fn insert_node(link: Link, voter_id: &str, outcome: &mut InsertOutcome) -> Box<VoterNode> {
    let mut node = match link {
        Some(node) => node,
        None => {
            *outcome = InsertOutcome::Inserted;
            return Box::new(VoterNode::new(voter_id));
        }
    };

    match voter_id.cmp(node.voter_id.as_str()) {
        Ordering::Less => node.left = Some(insert_node(node.left.take(), voter_id, outcome)),
        Ordering::Greater => node.right = Some(insert_node(node.right.take(), voter_id, outcome)),
        Ordering::Equal => return node,
    }

    update_height(&mut node);
    let balance = node.balance_factor();

    if balance > 1 {
        match node.left.as_ref().map(|l| voter_id.cmp(l.voter_id.as_str())) {
            // left-left
            Some(Ordering::Less) => return rotate_right(node),
            // left-right
            Some(Ordering::Greater) => {
                node.left = node.left.take().map(rotate_left);
                return rotate_right(node);
            }
            _ => {}
        }
    }

    if balance < -1 {
        match node.right.as_ref().map(|r| voter_id.cmp(r.voter_id.as_str())) {
            // right-right
            Some(Ordering::Greater) => return rotate_left(node),
            // right-left
            Some(Ordering::Less) => {
                node.right = node.right.take().map(rotate_right);
                return rotate_left(node);
            }
            _ => {}
        }
    }

    node
}

//! Huffman tree stored as an arena of nodes.
//!
//! Nodes refer to their children by `NodeId`, which is an index into the arena.
//! The tree owns every node, dropping the tree releases them all at once.

/// symbol carried by interior nodes, has no meaning
pub const INTERIOR_SYMBOL: u8 = b'$';

pub type NodeId = usize;

#[derive(Clone,Debug)]
pub struct Node {
    /// byte value for a leaf, `INTERIOR_SYMBOL` otherwise
    pub symbol: u8,
    /// histogram count for a leaf, sum of the children otherwise
    pub frequency: u64,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Strictly binary tree, every node has zero or two children.
#[derive(Clone,Debug,Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>
}

impl Tree {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n),
            root: None
        }
    }
    /// add a leaf node, returns its id
    pub fn leaf(&mut self,symbol: u8,frequency: u64) -> NodeId {
        self.nodes.push(Node {
            symbol,
            frequency,
            left: None,
            right: None
        });
        self.nodes.len() - 1
    }
    /// add an interior node joining two existing nodes, returns its id
    pub fn join(&mut self,left: NodeId,right: NodeId) -> NodeId {
        let frequency = self.nodes[left].frequency + self.nodes[right].frequency;
        self.nodes.push(Node {
            symbol: INTERIOR_SYMBOL,
            frequency,
            left: Some(left),
            right: Some(right)
        });
        self.nodes.len() - 1
    }
    pub fn get(&self,id: NodeId) -> &Node {
        &self.nodes[id]
    }
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }
    pub fn set_root(&mut self,id: NodeId) {
        self.root = Some(id);
    }
    /// Follow one edge, bit 0 is left and anything else is right.
    pub fn child(&self,id: NodeId,bit: u8) -> Option<NodeId> {
        match bit {
            0 => self.nodes[id].left,
            _ => self.nodes[id].right
        }
    }
    pub fn is_leaf(&self,id: NodeId) -> bool {
        self.nodes[id].is_leaf()
    }
    /// total number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    /// number of leaves reachable from the root
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = pending.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                count += 1;
            }
            pending.extend(node.left);
            pending.extend(node.right);
        }
        count
    }
    /// depth of the leaf holding `symbol`, or None if there is no such leaf
    pub fn depth_of(&self,symbol: u8) -> Option<usize> {
        let mut pending: Vec<(NodeId,usize)> = self.root.map(|r| (r,0)).into_iter().collect();
        while let Some((id,depth)) = pending.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() && node.symbol==symbol {
                return Some(depth);
            }
            pending.extend(node.left.map(|c| (c,depth+1)));
            pending.extend(node.right.map(|c| (c,depth+1)));
        }
        None
    }
}

#[test]
fn join_sums_frequency() {
    let mut tree = Tree::with_capacity(3);
    let a = tree.leaf(b'a',3);
    let b = tree.leaf(b'b',4);
    let p = tree.join(a,b);
    tree.set_root(p);
    assert!(tree.is_leaf(a));
    assert!(!tree.is_leaf(p));
    assert_eq!(tree.get(p).frequency,7);
    assert_eq!(tree.get(p).symbol,INTERIOR_SYMBOL);
    assert_eq!(tree.child(p,0),Some(a));
    assert_eq!(tree.child(p,1),Some(b));
    assert_eq!(tree.child(a,1),None);
    assert_eq!(tree.leaf_count(),2);
    assert_eq!(tree.depth_of(b'b'),Some(1));
    assert_eq!(tree.depth_of(b'c'),None);
}

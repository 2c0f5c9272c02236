//! Building, serializing and rebuilding the Huffman tree.
//!
//! The tree is built from a byte histogram using a min-heap.  Leaves go into the heap
//! in ascending symbol order, and the first of each dequeued pair becomes the left
//! child.  Together with the heap's strict comparisons this fixes the tree completely,
//! so the same input always yields the same output.
//!
//! The tree travels with the compressed data as a postorder dump:
//! * leaf: `L` followed by the symbol
//! * interior node: `I`
//!
//! A tree with `L` leaves has `L-1` interior nodes, so the dump has `3L-1` bytes.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use crate::{Error,ALPHABET,MAX_TREE_SIZE};
use super::code::Code;
use super::node::{NodeId,Tree};
use super::priority_queue::PriorityQueue;
use super::stack::Stack;

/// record markers in the tree dump
#[derive(FromPrimitive,Clone,Copy,Debug,PartialEq)]
pub enum Marker {
    Leaf = 0x4c,
    Interior = 0x49
}

/// Byte frequency counts.  A new histogram already counts one `0x00` and one `0xff`,
/// which guarantees any tree built from it has at least two leaves.
#[derive(Clone)]
pub struct Histogram {
    counts: [u64;ALPHABET]
}

impl Histogram {
    pub fn new() -> Self {
        let mut counts = [0;ALPHABET];
        counts[0] = 1;
        counts[ALPHABET-1] = 1;
        Self {
            counts
        }
    }
    pub fn add(&mut self,buf: &[u8]) {
        for b in buf {
            self.counts[*b as usize] += 1;
        }
    }
    pub fn counts(&self) -> &[u64;ALPHABET] {
        &self.counts
    }
    /// number of symbols with a nonzero count
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// heap entry, the frequency is copied out of the arena so the heap can order it
#[derive(Clone,Copy)]
struct Weighted {
    frequency: u64,
    id: NodeId
}

fn lighter(a: &Weighted,b: &Weighted) -> bool {
    a.frequency < b.frequency
}

/// length of the dump of a tree with `leaves` leaves
pub fn tree_dump_size(leaves: usize) -> usize {
    (3 * leaves).saturating_sub(1)
}

/// Build the Huffman tree for the given counts, at least two counts must be nonzero.
pub fn build_tree(hist: &[u64;ALPHABET]) -> Result<Tree,Error> {
    let distinct = hist.iter().filter(|c| **c > 0).count();
    if distinct < 2 {
        return Err(Error::DegenerateHistogram);
    }
    let mut tree = Tree::with_capacity(2 * distinct - 1);
    let mut queue = PriorityQueue::create(ALPHABET,lighter);
    for (symbol,count) in hist.iter().enumerate().filter(|(_,c)| **c > 0) {
        let id = tree.leaf(symbol as u8,*count);
        if !queue.enqueue(Weighted { frequency: *count, id }) {
            return Err(Error::CapacityExceeded);
        }
    }
    log::debug!("building tree from {} symbols",distinct);
    loop {
        let left = queue.dequeue().ok_or(Error::DegenerateHistogram)?;
        let right = match queue.dequeue() {
            Some(right) => right,
            None => {
                // last one standing is the root
                tree.set_root(left.id);
                return Ok(tree);
            }
        };
        let id = tree.join(left.id,right.id);
        log::trace!("join {} + {} -> {}",left.frequency,right.frequency,tree.get(id).frequency);
        if !queue.enqueue(Weighted { frequency: tree.get(id).frequency, id }) {
            return Err(Error::CapacityExceeded);
        }
    }
}

fn walk_codes(tree: &Tree,id: NodeId,path: &mut Code,table: &mut [Code]) {
    let node = tree.get(id);
    if node.is_leaf() {
        table[node.symbol as usize] = path.clone();
        return;
    }
    if let Some(left) = node.left {
        path.push(false);
        walk_codes(tree,left,path,table);
        path.pop();
    }
    if let Some(right) = node.right {
        path.push(true);
        walk_codes(tree,right,path,table);
        path.pop();
    }
}

/// Code table indexed by symbol, symbols that are not in the tree get an empty code.
pub fn build_codes(tree: &Tree) -> Vec<Code> {
    let mut table = vec![Code::new();ALPHABET];
    if let Some(root) = tree.root() {
        let mut path = Code::new();
        walk_codes(tree,root,&mut path,&mut table);
    }
    table
}

fn dump_node(tree: &Tree,id: NodeId,dump: &mut Vec<u8>) {
    let node = tree.get(id);
    if let Some(left) = node.left {
        dump_node(tree,left,dump);
    }
    if let Some(right) = node.right {
        dump_node(tree,right,dump);
    }
    if node.is_leaf() {
        dump.push(Marker::Leaf as u8);
        dump.push(node.symbol);
    } else {
        dump.push(Marker::Interior as u8);
    }
}

/// Postorder dump of the tree.
pub fn dump_tree(tree: &Tree) -> Vec<u8> {
    let mut dump = Vec::with_capacity(MAX_TREE_SIZE);
    if let Some(root) = tree.root() {
        dump_node(tree,root,&mut dump);
    }
    dump
}

/// Rebuild a tree from its postorder dump.  Leaf frequencies are not recoverable and are set to 0.
pub fn rebuild_tree(dump: &[u8]) -> Result<Tree,Error> {
    if dump.is_empty() || dump.len() > MAX_TREE_SIZE {
        log::error!("tree dump has bad length {}",dump.len());
        return Err(Error::InvalidEncoding);
    }
    let mut tree = Tree::with_capacity(dump.len());
    let mut stack: Stack<NodeId> = Stack::create(dump.len());
    let mut bytes = dump.iter();
    while let Some(b) = bytes.next() {
        let id = match Marker::from_u8(*b) {
            Some(Marker::Leaf) => {
                let symbol = bytes.next().ok_or(Error::InvalidEncoding)?;
                tree.leaf(*symbol,0)
            },
            Some(Marker::Interior) => {
                // postorder puts the right subtree on top
                let right = stack.pop().ok_or(Error::InvalidEncoding)?;
                let left = stack.pop().ok_or(Error::InvalidEncoding)?;
                tree.join(left,right)
            },
            None => {
                log::error!("unknown marker {:02X} in tree dump",b);
                return Err(Error::InvalidEncoding);
            }
        };
        if !stack.push(id) {
            return Err(Error::CapacityExceeded);
        }
    }
    let root = stack.pop().ok_or(Error::InvalidEncoding)?;
    if !stack.is_empty() {
        log::error!("tree dump left {} loose subtrees",stack.size() + 1);
        return Err(Error::InvalidEncoding);
    }
    tree.set_root(root);
    Ok(tree)
}

/// where the decoder is in the tree
#[derive(Clone,Copy,Debug,PartialEq)]
pub enum WalkState {
    AtRoot,
    AtInterior(NodeId),
    AtLeaf(u8)
}

/// Bit driven walk from the root to a leaf, restarting at the root after each leaf.
pub struct DecodeWalk<'a> {
    tree: &'a Tree,
    state: WalkState
}

impl <'a> DecodeWalk<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            state: WalkState::AtRoot
        }
    }
    pub fn state(&self) -> WalkState {
        self.state
    }
    /// Take the edge selected by `bit`, returns the symbol if a leaf was reached.
    pub fn step(&mut self,bit: u8) -> Result<Option<u8>,Error> {
        let curr = match self.state {
            WalkState::AtInterior(id) => id,
            WalkState::AtRoot | WalkState::AtLeaf(_) => self.tree.root().ok_or(Error::InvalidEncoding)?
        };
        let next = match self.tree.child(curr,bit) {
            Some(id) => id,
            None => {
                log::error!("bit stream walked off the tree");
                return Err(Error::InvalidEncoding);
            }
        };
        let node = self.tree.get(next);
        if node.is_leaf() {
            self.state = WalkState::AtLeaf(node.symbol);
            Ok(Some(node.symbol))
        } else {
            self.state = WalkState::AtInterior(next);
            Ok(None)
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn tree_for(data: &[u8]) -> Tree {
    let mut hist = Histogram::new();
    hist.add(data);
    build_tree(hist.counts()).expect("build failed")
}

#[test]
fn small_tree_is_exact() {
    let tree = tree_for(b"AAB");
    let table = build_codes(&tree);
    assert_eq!(table[b'A' as usize].to_string(),"0");
    assert_eq!(table[b'B' as usize].to_string(),"10");
    assert_eq!(table[0x00].to_string(),"110");
    assert_eq!(table[0xff].to_string(),"111");
    assert!(table[b'C' as usize].is_empty());
    assert_eq!(dump_tree(&tree),hex::decode("4C414C424C004CFF494949").unwrap());
}

#[test]
fn frequent_symbols_get_short_codes() {
    let tree = tree_for(b"AAAAABBCD");
    assert_eq!(tree.leaf_count(),6);
    let table = build_codes(&tree);
    let len = |c: u8| table[c as usize].len();
    assert!(len(b'A') <= len(b'B'));
    assert!(len(b'B') <= len(b'C'));
    assert!(len(b'B') <= len(b'D'));
}

#[test]
fn single_symbol_still_has_two_leaves() {
    let tree = tree_for(&[0x41;1000]);
    assert!(tree.leaf_count() >= 2);
    let table = build_codes(&tree);
    for sym in [0x00,0x41,0xff] {
        assert!(table[sym].len() >= 1);
    }
}

#[test]
fn degenerate_histogram() {
    let mut hist = [0;ALPHABET];
    assert!(matches!(build_tree(&hist),Err(Error::DegenerateHistogram)));
    hist[7] = 100;
    assert!(matches!(build_tree(&hist),Err(Error::DegenerateHistogram)));
    hist[8] = 1;
    let tree = build_tree(&hist).expect("build failed");
    assert_eq!(build_codes(&tree)[7].len(),1);
}

#[test]
fn dump_size_law() {
    let samples: [&[u8];4] = [
        b"",
        b"I am Sam. Sam I am. I do not like this Sam I am.\n",
        &[0x00,0xff,0x00],
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
    ];
    for data in samples {
        let mut hist = Histogram::new();
        hist.add(data);
        let tree = build_tree(hist.counts()).expect("build failed");
        assert_eq!(dump_tree(&tree).len(),tree_dump_size(hist.distinct()));
        assert_eq!(tree.leaf_count(),hist.distinct());
    }
    let all: Vec<u8> = (0..=255).collect();
    let mut hist = Histogram::new();
    hist.add(&all);
    let tree = build_tree(hist.counts()).expect("build failed");
    assert_eq!(dump_tree(&tree).len(),MAX_TREE_SIZE);
}

#[test]
fn codes_are_prefix_free() {
    let mut data = Vec::new();
    for i in 0..200u32 {
        // skewed distribution gives a range of code lengths
        for _j in 0..(i % 17) * (i % 5) + 1 {
            data.push((i * 7 % 251) as u8);
        }
    }
    let table = build_codes(&tree_for(&data));
    let used: Vec<&Code> = table.iter().filter(|c| !c.is_empty()).collect();
    assert!(used.len() > 100);
    for (i,a) in used.iter().enumerate() {
        for (j,b) in used.iter().enumerate() {
            if i != j {
                assert!(!a.is_prefix_of(b),"{} is a prefix of {}",a,b);
            }
        }
    }
}

#[test]
fn rebuilt_tree_has_same_codes() {
    let tree = tree_for(b"I am Sam. Sam I am. I do not like this Sam I am.\n");
    let dump = dump_tree(&tree);
    let rebuilt = rebuild_tree(&dump).expect("rebuild failed");
    assert_eq!(build_codes(&tree),build_codes(&rebuilt));
    assert_eq!(dump_tree(&rebuilt),dump);
}

#[test]
fn malformed_dumps() {
    let bad = ["","49","4C","4C4149","4C414C42","4C414C4258","4C414C42494949"];
    for s in bad {
        let dump = hex::decode(s).unwrap();
        assert!(matches!(rebuild_tree(&dump),Err(Error::InvalidEncoding)),"accepted {}",s);
    }
    assert!(rebuild_tree(&vec![0x49;MAX_TREE_SIZE+1]).is_err());
}

#[test]
fn walk_emits_symbols() {
    let tree = tree_for(b"AAB");
    let mut walk = DecodeWalk::new(&tree);
    assert_eq!(walk.state(),WalkState::AtRoot);
    let mut out = Vec::new();
    for bit in [1,1,0,0,1,0] {
        if let Some(sym) = walk.step(bit).expect("walk failed") {
            out.push(sym);
            assert_eq!(walk.state(),WalkState::AtLeaf(sym));
        }
    }
    assert_eq!(out,vec![0x00,b'A',b'B']);
}

#[test]
fn walk_off_the_tree() {
    // a lone leaf decodes to nothing, any bit is an error
    let tree = rebuild_tree(&hex::decode("4C41").unwrap()).expect("rebuild failed");
    let mut walk = DecodeWalk::new(&tree);
    assert!(matches!(walk.step(0),Err(Error::InvalidEncoding)));
}

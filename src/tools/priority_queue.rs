//! Bounded binary min-heap used while building the Huffman tree.
//!
//! Positions are 1-based in the arithmetic (parent of `k` is `k/2`, children are `2k`
//! and `2k+1`) and shifted by one when touching the vector.  Items only move when the
//! ordering function reports a strict inequality, so equal items keep whatever order
//! the sequence of insertions gave them.  Tree construction depends on this for
//! reproducible output.

pub struct PriorityQueue<T> {
    items: Vec<T>,
    capacity: usize,
    /// strict less-than
    less: fn(&T,&T) -> bool
}

impl <T> PriorityQueue<T> {
    pub fn create(capacity: usize,less: fn(&T,&T) -> bool) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            less
        }
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }
    pub fn size(&self) -> usize {
        self.items.len()
    }
    /// compare 1-based positions
    fn lt(&self,a: usize,b: usize) -> bool {
        (self.less)(&self.items[a-1],&self.items[b-1])
    }
    /// Insert an item, returns false if the queue is full.
    pub fn enqueue(&mut self,item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        let mut child = self.items.len();
        let mut parent = child / 2;
        while parent > 0 && self.lt(child,parent) {
            self.items.swap(child-1,parent-1);
            child = parent;
            parent /= 2;
        }
        true
    }
    /// Remove the smallest item, or None if the queue is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0,last);
        let ans = self.items.pop();
        self.sift_down();
        ans
    }
    /// smaller child of `parent`, the right child must be strictly smaller to be chosen
    fn min_child(&self,parent: usize) -> usize {
        let left = 2 * parent;
        let right = left + 1;
        if right <= self.items.len() && self.lt(right,left) {
            return right;
        }
        left
    }
    fn sift_down(&mut self) {
        let last = self.items.len();
        let mut parent = 1;
        while parent <= last / 2 {
            let child = self.min_child(parent);
            if !self.lt(child,parent) {
                break;
            }
            self.items.swap(parent-1,child-1);
            parent = child;
        }
    }
    /// check the heap property over every parent and child
    pub fn is_heap(&self) -> bool {
        (2..=self.items.len()).all(|k| !self.lt(k,k/2))
    }
}

#[cfg(test)]
fn lt_u64(a: &u64,b: &u64) -> bool {
    a < b
}

#[test]
fn bounded() {
    let mut q: PriorityQueue<u64> = PriorityQueue::create(2,lt_u64);
    assert!(q.is_empty());
    assert_eq!(q.dequeue(),None);
    assert!(q.enqueue(5));
    assert!(q.enqueue(1));
    assert!(q.is_full());
    assert!(!q.enqueue(0));
    assert_eq!(q.size(),2);
    assert_eq!(q.dequeue(),Some(1));
    assert_eq!(q.dequeue(),Some(5));
    assert_eq!(q.dequeue(),None);
}

#[test]
fn heap_invariant() {
    // deterministic pseudo random sequence of inserts and removals
    let mut q: PriorityQueue<u64> = PriorityQueue::create(256,lt_u64);
    let mut state: u64 = 12345;
    let mut removed = Vec::new();
    for i in 0..2000 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let val = (state >> 33) % 100;
        if i % 3 == 2 || q.is_full() {
            removed.push(q.dequeue());
        } else {
            assert!(q.enqueue(val));
        }
        assert!(q.is_heap());
    }
    // draining yields ascending order
    let mut prev = 0;
    while let Some(x) = q.dequeue() {
        assert!(x >= prev);
        prev = x;
        assert!(q.is_heap());
    }
}

#[test]
fn ties_keep_heap_layout() {
    // equal keys never swap, their order follows the heap layout rather than insertion
    let mut q: PriorityQueue<(u64,char)> = PriorityQueue::create(4,|a: &(u64,char),b: &(u64,char)| a.0 < b.0);
    q.enqueue((1,'a'));
    q.enqueue((2,'b'));
    q.enqueue((1,'c'));
    q.enqueue((1,'d'));
    assert_eq!(q.dequeue(),Some((1,'a')));
    assert_eq!(q.dequeue(),Some((1,'d')));
    assert_eq!(q.dequeue(),Some((1,'c')));
    assert_eq!(q.dequeue(),Some((2,'b')));
}

//! Union-find over room indices

/// Disjoint sets with path compression and union by rank
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Create `size` singleton sets
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `item`
    pub fn find(&mut self, item: usize) -> Option<usize> {
        if item >= self.parent.len() {
            return None;
        }
        let mut root = item;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Point every visited item straight at the root
        let mut current = item;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        Some(root)
    }

    /// Merge the sets of `a` and `b`
    ///
    /// Returns false if they were already joined or either index is unknown.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (Some(ra), Some(rb)) = (self.find(a), self.find(b)) else {
            return false;
        };
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    /// Check if every item is in one set
    pub fn all_connected(&mut self) -> bool {
        let Some(first) = self.find(0) else {
            return true;
        };
        (1..self.parent.len()).all(|i| self.find(i) == Some(first))
    }
}

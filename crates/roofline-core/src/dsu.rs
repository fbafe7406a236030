/// Disjoint-set union with path compression and union by size.
///
/// Replaces the repeated list-marking graph walks of ad-hoc
/// connected-component extraction: the building grouping, the coarse match
/// pass and the fine match pass all reduce to `union` calls followed by
/// `components()`.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }

    pub fn same(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Members grouped by root, only components with at least `min_size`
    /// elements, in first-seen order.
    pub fn components(&mut self, min_size: usize) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut order = Vec::new();
        for i in 0..n {
            let r = self.find(i);
            if by_root[r].is_empty() {
                order.push(r);
            }
            by_root[r].push(i);
        }
        order
            .into_iter()
            .filter_map(|r| {
                let members = std::mem::take(&mut by_root[r]);
                (members.len() >= min_size).then_some(members)
            })
            .collect()
    }
}

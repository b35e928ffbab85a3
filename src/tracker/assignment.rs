//! Minimum-cost bipartite matching (Kuhn-Munkres with potentials).
//!
//! Non-finite entries in the cost matrix are forbidden edges: they are left out
//! of the graph instead of being priced. Every row and column may also stay
//! unmatched at `unmatched_cost`, so a pair is matched only when its cost is
//! lower than that. The problem is solved on a square matrix of size
//! `rows + cols` built from the real costs and one dummy partner per row and
//! column; the result is an optimal matching with deterministic tie-breaking
//! (lowest column index wins).

use ndarray::Array2;

/// Sparse view of the augmented problem.
struct Augmented<'a> {
    cost: &'a Array2<f64>,
    rows: usize,
    cols: usize,
    unmatched_cost: f64,
}

impl Augmented<'_> {
    fn size(&self) -> usize {
        self.rows + self.cols
    }

    /// Edge cost, `None` when the edge does not exist.
    fn edge(&self, i: usize, j: usize) -> Option<f64> {
        match (i < self.rows, j < self.cols) {
            (true, true) => {
                let c = self.cost[[i, j]];
                c.is_finite().then_some(c)
            }
            // Row i left unmatched.
            (true, false) => (j - self.cols == i).then_some(self.unmatched_cost),
            // Column j left unmatched.
            (false, true) => (i - self.rows == j).then_some(0.0),
            (false, false) => Some(0.0),
        }
    }
}

/// Solve the assignment problem for a `rows x cols` cost matrix.
///
/// Returns, for every row, the column it is matched to.
pub fn min_cost_matching(cost: &Array2<f64>, unmatched_cost: f64) -> Vec<Option<usize>> {
    let (rows, cols) = cost.dim();
    if rows == 0 || cols == 0 {
        return vec![None; rows];
    }

    let problem = Augmented {
        cost,
        rows,
        cols,
        unmatched_cost,
    };
    let n = problem.size();

    // 1-based arrays; index 0 is the virtual root column.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                if let Some(c) = problem.edge(i0 - 1, j - 1) {
                    let cur = c - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            // The dummy structure always admits a perfect matching, so an
            // unreachable column set means the costs were not comparable (NaN).
            if j1 == 0 {
                break;
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        if p[j0] != 0 {
            // No augmenting path was found for this row; leave it unassigned.
            continue;
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![None; rows];
    for j in 1..=n {
        let i = p[j];
        if i == 0 {
            continue;
        }
        let (row, col) = (i - 1, j - 1);
        if row < rows && col < cols {
            assignment[row] = Some(col);
        }
    }
    assignment
}

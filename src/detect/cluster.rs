// =============================================================================
// cluster.rs — THE NETWORK ASSEMBLER
// =============================================================================
//
// Pairwise links are gossip; clusters are the org chart. We run union-find
// over every pair whose score clears the threshold and read off the
// connected components. A carrier that "re-registers" three times leaves
// a four-node component behind, and THAT is what lands on a regulator's
// desk.
//
// Union-find with path compression and union by rank, over a dense array
// of carrier positions. The DOT universe is mapped once into sorted array
// indices; everything after that is u32-sized integer churn. Textbook
// structure, textbook bounds, no surprises — which is exactly what you
// want in the step that decides who gets accused of being whom.
// =============================================================================

use std::collections::{BTreeMap, BTreeSet};

use crate::detect::scoring::{PairKey, PairScores};
use crate::models::CarrierCluster;

/// Minimum pairwise score for an edge to merge two carriers into one
/// cluster. Overridable from the CLI; 30.0 by default, which a single
/// full-weight phone match (40) clears and a three-way phone split
/// (26.667) does not.
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 30.0;

/// Disjoint-set forest over dense carrier positions.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Find with path halving. Safe to call any number of times during
    /// enumeration; every call only flattens the forest further.
    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Partition the carrier universe into clusters using every pair at or
/// above `threshold`, then describe each component.
///
/// Singletons come back too — the risk scorer needs to know that a
/// carrier's "cluster" is just itself — but only multi-member clusters
/// ever reach the store. Ordering is (-size, -max_link_score, members
/// ascending), and ids C0001, C0002, ... are assigned in that order, so
/// the biggest, hottest network is always C0001.
pub fn compute_clusters(
    pair_scores: &PairScores,
    all_dots: &BTreeSet<i64>,
    threshold: f64,
) -> Vec<CarrierCluster> {
    // Dense mapping: sorted DOTs -> positions. BTreeSet iteration is
    // already ascending, so position order IS dot order.
    let dots: Vec<i64> = all_dots.iter().copied().collect();
    let pos: BTreeMap<i64, usize> = dots.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let qualifying: BTreeMap<PairKey, f64> = pair_scores
        .iter()
        .filter(|(_, score)| **score >= threshold)
        .map(|(pair, score)| (*pair, *score))
        .collect();

    let mut uf = UnionFind::new(dots.len());
    for (a, b) in qualifying.keys() {
        // Pairs can only reference known carriers; anything else is a bug
        // upstream, and skipping it silently would hide that bug.
        let (pa, pb) = (pos[a], pos[b]);
        uf.union(pa, pb);
    }

    let mut members_by_root: BTreeMap<usize, Vec<i64>> = BTreeMap::new();
    for (i, dot) in dots.iter().enumerate() {
        members_by_root.entry(uf.find(i)).or_default().push(*dot);
    }

    let mut clusters: Vec<CarrierCluster> = Vec::with_capacity(members_by_root.len());
    for members in members_by_root.into_values() {
        // Members arrive ascending (we pushed in dot order). Edge stats
        // only count intra-cluster pairs that actually qualified.
        let mut edge_count = 0usize;
        let mut edge_scores: Vec<f64> = Vec::new();
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if let Some(score) = qualifying.get(&(a, b)) {
                    edge_count += 1;
                    edge_scores.push(*score);
                }
            }
        }

        let avg = if edge_scores.is_empty() {
            0.0
        } else {
            round4(edge_scores.iter().sum::<f64>() / edge_scores.len() as f64)
        };
        let max = edge_scores
            .iter()
            .copied()
            .fold(0.0f64, f64::max);

        clusters.push(CarrierCluster {
            cluster_id: String::new(), // assigned after sorting
            size: members.len(),
            edge_count,
            avg_link_score: avg,
            max_link_score: round4(max),
            members,
        });
    }

    clusters.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then_with(|| b.max_link_score.total_cmp(&a.max_link_score))
            .then_with(|| a.members.cmp(&b.members))
    });
    for (idx, cluster) in clusters.iter_mut().enumerate() {
        cluster.cluster_id = format!("C{:04}", idx + 1);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dots(v: &[i64]) -> BTreeSet<i64> {
        v.iter().copied().collect()
    }

    fn scores(pairs: &[((i64, i64), f64)]) -> PairScores {
        pairs.iter().copied().collect()
    }

    #[test]
    fn pairs_below_threshold_do_not_merge() {
        let clusters = compute_clusters(
            &scores(&[((1, 2), 26.667)]),
            &dots(&[1, 2]),
            DEFAULT_CLUSTER_THRESHOLD,
        );
        assert!(clusters.iter().all(|c| c.size == 1));
    }

    #[test]
    fn one_edge_makes_a_pair_cluster() {
        let clusters = compute_clusters(
            &scores(&[((1, 2), 160.0)]),
            &dots(&[1, 2, 3]),
            DEFAULT_CLUSTER_THRESHOLD,
        );
        let c = &clusters[0];
        assert_eq!(c.cluster_id, "C0001");
        assert_eq!(c.size, 2);
        assert_eq!(c.edge_count, 1);
        assert_eq!(c.members, vec![1, 2]);
        assert_eq!(c.avg_link_score, 160.0);
        assert_eq!(c.max_link_score, 160.0);
        // The singleton survives in memory with its own (later) id.
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].size, 1);
        assert_eq!(clusters[1].edge_count, 0);
        assert_eq!(clusters[1].max_link_score, 0.0);
    }

    #[test]
    fn fully_connected_four_cluster() {
        let edges: Vec<((i64, i64), f64)> = vec![
            ((1, 2), 80.0),
            ((1, 3), 80.0),
            ((1, 4), 80.0),
            ((2, 3), 80.0),
            ((2, 4), 80.0),
            ((3, 4), 80.0),
        ];
        let clusters = compute_clusters(
            &scores(&edges),
            &dots(&[1, 2, 3, 4]),
            DEFAULT_CLUSTER_THRESHOLD,
        );
        let c = &clusters[0];
        assert_eq!(c.cluster_id, "C0001");
        assert_eq!(c.size, 4);
        assert_eq!(c.edge_count, 6);
        assert_eq!(c.avg_link_score, 80.0);
        assert_eq!(c.max_link_score, 80.0);
        assert_eq!(c.members, vec![1, 2, 3, 4]);
    }

    #[test]
    fn transitive_links_chain_into_one_component() {
        // 1-2 and 2-3 qualify; 1-3 was never scored. Still one family.
        let clusters = compute_clusters(
            &scores(&[((1, 2), 60.0), ((2, 3), 60.0)]),
            &dots(&[1, 2, 3]),
            DEFAULT_CLUSTER_THRESHOLD,
        );
        let c = &clusters[0];
        assert_eq!(c.size, 3);
        assert_eq!(c.edge_count, 2);
        assert_eq!(c.members, vec![1, 2, 3]);
    }

    #[test]
    fn ordering_prefers_size_then_heat() {
        let clusters = compute_clusters(
            &scores(&[
                ((1, 2), 60.0),
                ((2, 3), 60.0), // trio, max 60
                ((10, 11), 95.0), // hot pair, max 95
                ((20, 21), 40.0), // lukewarm pair
            ]),
            &dots(&[1, 2, 3, 10, 11, 20, 21]),
            DEFAULT_CLUSTER_THRESHOLD,
        );
        let ids: Vec<(&str, usize, f64)> = clusters
            .iter()
            .filter(|c| c.size > 1)
            .map(|c| (c.cluster_id.as_str(), c.size, c.max_link_score))
            .collect();
        assert_eq!(
            ids,
            vec![("C0001", 3, 60.0), ("C0002", 2, 95.0), ("C0003", 2, 40.0)]
        );
    }

    #[test]
    fn members_are_strictly_ascending() {
        let clusters = compute_clusters(
            &scores(&[((5, 900), 60.0), ((5, 42), 60.0)]),
            &dots(&[5, 42, 900]),
            DEFAULT_CLUSTER_THRESHOLD,
        );
        let c = &clusters[0];
        assert_eq!(c.members, vec![5, 42, 900]);
        assert!(c.members.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn edge_count_meets_spanning_minimum() {
        let clusters = compute_clusters(
            &scores(&[((1, 2), 60.0), ((2, 3), 60.0), ((3, 4), 60.0)]),
            &dots(&[1, 2, 3, 4]),
            DEFAULT_CLUSTER_THRESHOLD,
        );
        for c in clusters.iter().filter(|c| c.size > 1) {
            assert!(c.edge_count >= c.size - 1);
        }
    }
}

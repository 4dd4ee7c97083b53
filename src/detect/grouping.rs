//! Merging raw cascade hits into face boxes.
//!
//! A face fires the cascade at many neighboring positions and scales. Hits are
//! partitioned into clusters of similar rectangles, each cluster is averaged
//! into one box, clusters with too few members are dropped as noise, and
//! boxes sitting inside a stronger box are suppressed.

use crate::region::Rect;

/// Similarity tolerance relative to rectangle size.
pub const GROUP_EPS: f64 = 0.2;

/// Two hits belong to the same face when every edge is within `eps` of the
/// mean of their smaller sides.
fn similar(a: &Rect, b: &Rect, eps: f64) -> bool {
    let delta = eps * (a.width().min(b.width()) + a.height().min(b.height())) as f64 * 0.5;
    (a.left - b.left).abs() as f64 <= delta
        && (a.top - b.top).abs() as f64 <= delta
        && (a.right - b.right).abs() as f64 <= delta
        && (a.bottom - b.bottom).abs() as f64 <= delta
}

/// Union-find root with path halving.
fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Label each rectangle with a cluster index, numbered in order of first
/// appearance.
fn partition(rects: &[Rect], eps: f64) -> (Vec<usize>, usize) {
    let n = rects.len();
    let mut parent: Vec<usize> = (0..n).collect();

    for i in 0..n {
        for j in (i + 1)..n {
            if similar(&rects[i], &rects[j], eps) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj.max(ri)] = ri.min(rj);
                }
            }
        }
    }

    let mut root_label = vec![usize::MAX; n];
    let mut labels = Vec::with_capacity(n);
    let mut classes = 0;
    for i in 0..n {
        let root = find(&mut parent, i);
        if root_label[root] == usize::MAX {
            root_label[root] = classes;
            classes += 1;
        }
        labels.push(root_label[root]);
    }
    (labels, classes)
}

/// Cluster raw hits and keep clusters with more than `min_neighbors` members.
///
/// `min_neighbors == 0` disables grouping and returns the hits untouched.
pub fn group_rectangles(rects: Vec<Rect>, min_neighbors: u32, eps: f64) -> Vec<Rect> {
    if min_neighbors == 0 || rects.is_empty() {
        return rects;
    }

    let (labels, classes) = partition(&rects, eps);

    // Average in origin + size form.
    let mut sums = vec![[0i64; 4]; classes];
    let mut counts = vec![0u32; classes];
    for (r, &label) in rects.iter().zip(&labels) {
        let s = &mut sums[label];
        s[0] += r.left as i64;
        s[1] += r.top as i64;
        s[2] += r.width() as i64;
        s[3] += r.height() as i64;
        counts[label] += 1;
    }

    let averaged: Vec<Rect> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| {
            let avg = |v: i64| (v as f64 / n as f64).round() as i32;
            Rect::from_xywh(avg(s[0]), avg(s[1]), avg(s[2]), avg(s[3]))
        })
        .collect();

    let mut kept = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = counts[i];
        if n1 <= min_neighbors {
            continue;
        }

        let swallowed = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = counts[j];
            if j == i || n2 <= min_neighbors {
                return false;
            }
            let dx = (r2.width() as f64 * eps).round() as i32;
            let dy = (r2.height() as f64 * eps).round() as i32;
            r1.left >= r2.left - dx
                && r1.top >= r2.top - dy
                && r1.right <= r2.right + dx
                && r1.bottom <= r2.bottom + dy
                && (n2 > n1.max(3) || n1 < 3)
        });

        if !swallowed {
            kept.push(*r1);
        }
    }
    kept
}

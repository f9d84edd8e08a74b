//! Lexical similarity between article bodies.
//!
//! The score is the classic matching-blocks ratio: find the longest common run of
//! characters, recurse on what is left to either side of it, and compare the total
//! number of matched characters with the combined length of both texts.

use ng_core::Article;
use std::collections::HashMap;

pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Similarity of two texts in `[0.0, 1.0]`, ignoring case.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // Tie-breaking in the block search depends on argument order.
    let (a, b) = if (a.len(), &a) <= (b.len(), &b) { (a, b) } else { (b, a) };
    let matched = SequenceMatcher::new(&a, &b).matched_chars();
    2.0 * matched as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of every character in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
    /// j2len[j] = length of the run ending at a[i - 1] and b[j]; all zero between searches
    j2len: Vec<usize>,
    next: Vec<usize>,
    /// Non-zero slots of `j2len` and `next`, so rows are cleared without rescanning `b`
    touched: Vec<usize>,
    next_touched: Vec<usize>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }
        Self {
            a,
            b,
            b2j,
            j2len: vec![0; b.len()],
            next: vec![0; b.len()],
            touched: Vec::new(),
            next_touched: Vec::new(),
        }
    }

    /// Longest common run inside `a[alo..ahi]` and `b[blo..bhi]`, earliest on ties.
    fn find_longest_match(&mut self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        for i in alo..ahi {
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                let start = positions.partition_point(|&j| j < blo);
                for &j in positions[start..].iter().take_while(|&&j| j < bhi) {
                    let k = if j > blo { self.j2len[j - 1] } else { 0 } + 1;
                    self.next[j] = k;
                    self.next_touched.push(j);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            for &j in &self.touched {
                self.j2len[j] = 0;
            }
            std::mem::swap(&mut self.j2len, &mut self.next);
            std::mem::swap(&mut self.touched, &mut self.next_touched);
            self.next_touched.clear();
        }

        for &j in &self.touched {
            self.j2len[j] = 0;
        }
        self.touched.clear();

        (best_i, best_j, best_size)
    }

    fn matched_chars(mut self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }
}

/// Rejects generated content that is too close to something already published.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateGuard {
    threshold: f64,
}

impl Default for DuplicateGuard {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl DuplicateGuard {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True as soon as one existing article scores strictly above the threshold.
    pub fn is_duplicate(&self, content: &str, existing: &[Article]) -> bool {
        existing
            .iter()
            .any(|article| similarity(content, &article.content) > self.threshold)
    }
}

//! Geometry for the three renderers.
//!
//! Contract for every function here: hierarchy (or item list) plus a
//! bounding box in, one coordinate record per input node out, same order.
//! The algorithms are the ones D3 runs in the browser (`d3.tree`,
//! `d3.treemapSquarify`, `d3.scalePoint`), so an exported SVG lines up with
//! the interactive page.

use serde::Serialize;

/// Tree-layout coordinate: `x` runs along the breadth of the tree, `y` along
/// its depth. Renderers drawing horizontally swap them on output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Move each edge inward. Edges that would cross meet in the middle,
    /// the way D3's treemap pads.
    pub fn pad(&self, top: f64, right: f64, bottom: f64, left: f64) -> Rect {
        let (x0, x1) = meet(self.x0 + left, self.x1 - right);
        let (y0, y1) = meet(self.y0 + top, self.y1 - bottom);
        Rect { x0, y0, x1, y1 }
    }

    pub fn round(&self) -> Rect {
        Rect {
            x0: self.x0.round(),
            y0: self.y0.round(),
            x1: self.x1.round(),
            y1: self.y1.round(),
        }
    }

}

fn meet(lo: f64, hi: f64) -> (f64, f64) {
    if hi < lo {
        let mid = (lo + hi) / 2.0;
        (mid, mid)
    } else {
        (lo, hi)
    }
}

/// Tidy tree layout (Reingold-Tilford, in Buchheim's linear-time form, as
/// D3's `d3.tree` computes it).
///
/// `parents[i]` is the parent index of node `i`; nodes are in pre-order so a
/// parent always precedes its children and the root is index 0. Siblings sit
/// one unit apart and cousins two, each parent is centered over its first
/// and last child, and the result is scaled so the outermost nodes keep half
/// a separation of margin inside `breadth`. Depth level `d` sits at
/// `d * depth_extent / (levels + 1)` where `levels` is supplied by the caller
/// so column widths stay stable while parts of the tree are hidden.
pub fn tree(parents: &[Option<usize>], breadth: f64, depth_extent: f64, levels: usize) -> Vec<Point> {
    let n = parents.len();
    if n == 0 {
        return Vec::new();
    }
    let mut tidy = Tidy::new(parents);
    tidy.run();

    let x: Vec<f64> = (0..n)
        .map(|v| tidy.prelim[v] + tidy.modifier[tidy.parent[v]])
        .collect();
    let (mut left, mut right) = (0, 0);
    for v in 0..n {
        if x[v] < x[left] {
            left = v;
        }
        if x[v] > x[right] {
            right = v;
        }
    }
    let margin = if left == right {
        1.0
    } else {
        tidy.separation(left, right) / 2.0
    };
    let tx = margin - x[left];
    let kx = breadth / (x[right] + margin + tx);
    let column = depth_extent / (levels + 1) as f64;

    (0..n)
        .map(|v| Point::new((x[v] + tx) * kx, tidy.depth[v] as f64 * column))
        .collect()
}

/// Working state of the tidy-tree walk. Index `n` is a virtual parent of
/// the root so every real node has a parent.
struct Tidy {
    parent: Vec<usize>,
    children: Vec<Vec<usize>>,
    depth: Vec<usize>,
    /// Position among siblings.
    number: Vec<usize>,
    ancestor: Vec<usize>,
    default_ancestor: Vec<Option<usize>>,
    prelim: Vec<f64>,
    modifier: Vec<f64>,
    change: Vec<f64>,
    shift: Vec<f64>,
    thread: Vec<Option<usize>>,
}

impl Tidy {
    fn new(parents: &[Option<usize>]) -> Self {
        let n = parents.len();
        let mut parent = vec![n; n + 1];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n + 1];
        let mut depth = vec![0usize; n + 1];
        let mut number = vec![0usize; n + 1];
        for (i, p) in parents.iter().enumerate() {
            let p = p.unwrap_or(n);
            parent[i] = p;
            number[i] = children[p].len();
            children[p].push(i);
            if p < n {
                depth[i] = depth[p] + 1;
            }
        }
        Self {
            parent,
            children,
            depth,
            number,
            ancestor: (0..=n).collect(),
            default_ancestor: vec![None; n + 1],
            prelim: vec![0.0; n + 1],
            modifier: vec![0.0; n + 1],
            change: vec![0.0; n + 1],
            shift: vec![0.0; n + 1],
            thread: vec![None; n + 1],
        }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.parent[a] == self.parent[b] { 1.0 } else { 2.0 }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.children[v].first().copied().or(self.thread[v])
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.children[v].last().copied().or(self.thread[v])
    }

    fn run(&mut self) {
        let n = self.parent.len() - 1;
        // Post-order with left subtrees finished before their right siblings.
        let mut order = Vec::with_capacity(n);
        let mut stack = vec![0];
        while let Some(v) = stack.pop() {
            order.push(v);
            stack.extend(self.children[v].iter().copied());
        }
        for &v in order.iter().rev() {
            self.first_walk(v);
        }

        self.modifier[n] = -self.prelim[0];
        // Pre-order: a parent's accumulated modifier is final before its children read it.
        for v in 0..n {
            self.modifier[v] += self.modifier[self.parent[v]];
        }
    }

    fn first_walk(&mut self, v: usize) {
        let p = self.parent[v];
        let left_sibling = match self.number[v] {
            0 => None,
            i => Some(self.children[p][i - 1]),
        };
        let ends = self.children[v].first().copied().zip(self.children[v].last().copied());
        if let Some((first, last)) = ends {
            self.execute_shifts(v);
            let midpoint = (self.prelim[first] + self.prelim[last]) / 2.0;
            match left_sibling {
                Some(w) => {
                    self.prelim[v] = self.prelim[w] + self.separation(v, w);
                    self.modifier[v] = self.prelim[v] - midpoint;
                }
                None => self.prelim[v] = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.prelim[v] = self.prelim[w] + self.separation(v, w);
        }
        let fallback = self.default_ancestor[p].unwrap_or(self.children[p][0]);
        self.default_ancestor[p] = Some(self.apportion(v, left_sibling, fallback));
    }

    /// Push `v`'s subtree right until its left contour clears the contours
    /// of every subtree to its left.
    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut default: usize) -> usize {
        let Some(w) = left_sibling else {
            return default;
        };
        let (mut vip, mut vop, mut vim) = (v, v, w);
        let mut vom = self.children[self.parent[v]][0];
        let mut sip = self.modifier[vip];
        let mut sop = self.modifier[vop];
        let mut sim = self.modifier[vim];
        let mut som = self.modifier[vom];

        let (rest_im, rest_ip) = loop {
            let (next_im, next_ip) = (self.next_right(vim), self.next_left(vip));
            let (Some(im), Some(ip)) = (next_im, next_ip) else {
                break (next_im, next_ip);
            };
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break (None, None);
            };
            (vim, vip, vom, vop) = (im, ip, om, op);
            self.ancestor[vop] = v;
            let shift = self.prelim[vim] + sim - self.prelim[vip] - sip + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = if self.parent[self.ancestor[vim]] == self.parent[v] {
                    self.ancestor[vim]
                } else {
                    default
                };
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.modifier[vim];
            sip += self.modifier[vip];
            som += self.modifier[vom];
            sop += self.modifier[vop];
        };

        if let Some(im) = rest_im {
            if self.next_right(vop).is_none() {
                self.thread[vop] = Some(im);
                self.modifier[vop] += sim - sop;
            }
        }
        if let Some(ip) = rest_ip {
            if self.next_left(vom).is_none() {
                self.thread[vom] = Some(ip);
                self.modifier[vom] += sip - som;
                default = v;
            }
        }
        default
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.number[wp] as f64 - self.number[wm] as f64);
        self.change[wp] -= change;
        self.shift[wp] += shift;
        self.change[wm] += change;
        self.prelim[wp] += shift;
        self.modifier[wp] += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let (mut shift, mut change) = (0.0, 0.0);
        for i in (0..self.children[v].len()).rev() {
            let w = self.children[v][i];
            self.prelim[w] += shift;
            self.modifier[w] += shift;
            change += self.change[w];
            shift += self.shift[w] + change;
        }
    }
}

/// The aspect ratio D3's `treemapSquarify` aims for.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Squarified treemap tiling of `values` into `bounds`, row by row the way
/// `d3.treemapSquarify` does it.
///
/// Items keep their input order; callers wanting the classic look sort by
/// descending value first. Zero or negative values get a zero-area rectangle.
pub fn squarify(values: &[f64], bounds: Rect) -> Vec<Rect> {
    let n = values.len();
    let weight = |i: usize| values[i].max(0.0);
    let mut out = vec![Rect::new(bounds.x0, bounds.y0, bounds.x0, bounds.y0); n];
    let mut remaining: f64 = (0..n).map(weight).sum();
    let (mut x0, mut y0, x1, y1) = (bounds.x0, bounds.y0, bounds.x1, bounds.y1);

    let (mut i0, mut i1) = (0, 0);
    while i0 < n {
        let (dx, dy) = (x1 - x0, y1 - y0);

        // Leading zeros ride along with the next non-empty item.
        let mut sum = loop {
            let value = weight(i1);
            i1 += 1;
            if value > 0.0 || i1 >= n {
                break value;
            }
        };
        let (mut min, mut max) = (sum, sum);
        let alpha = (dy / dx).max(dx / dy) / (remaining * GOLDEN_RATIO);
        let mut beta = sum * sum * alpha;
        let mut min_ratio = (max / beta).max(beta / min);

        // Keep adding items while the worst aspect ratio holds or improves.
        while i1 < n {
            let value = weight(i1);
            sum += value;
            min = min.min(value);
            max = max.max(value);
            beta = sum * sum * alpha;
            let ratio = (max / beta).max(beta / min);
            if ratio > min_ratio {
                sum -= value;
                break;
            }
            min_ratio = ratio;
            i1 += 1;
        }

        if dx < dy {
            let y = if remaining > 0.0 { y0 + dy * sum / remaining } else { y1 };
            let k = if sum > 0.0 { dx / sum } else { 0.0 };
            let mut x = x0;
            for i in i0..i1 {
                out[i] = Rect::new(x, y0, x + weight(i) * k, y);
                x += weight(i) * k;
            }
            y0 = y;
        } else {
            let x = if remaining > 0.0 { x0 + dx * sum / remaining } else { x1 };
            let k = if sum > 0.0 { dy / sum } else { 0.0 };
            let mut y = y0;
            for i in i0..i1 {
                out[i] = Rect::new(x0, y, x, y + weight(i) * k);
                y += weight(i) * k;
            }
            x0 = x;
        }
        remaining -= sum;
        i0 = i1;
    }
    out
}

/// Evenly spaced positions for `count` ordinal values over `[start, stop]`;
/// a single value sits in the middle.
pub fn point_scale(count: usize, start: f64, stop: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(start + stop) / 2.0],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

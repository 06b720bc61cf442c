// File: crates/tradeviz-core/src/pack.rs
// Summary: Circle packing for a one-level hierarchy (front-chain sibling placement, randomized enclosing circle).

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }
}

/// A leaf after layout, in pack-box coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackedCircle {
    /// Position of the leaf in the input slice.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PackLayout {
    pub root: Circle,
    /// Sum of the leaf values.
    pub value: f64,
    pub leaves: Vec<PackedCircle>,
}

#[derive(Debug, Error, PartialEq)]
pub enum PackError {
    #[error("no enclosing circle found for {0} circles")]
    NoEnclosingBasis(usize),
}

/// Linear congruential generator used for the enclosing-circle shuffle.
/// Seeded identically on every layout so packing is deterministic.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    pub fn new() -> Self {
        Self { state: 1 }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (Self::A * self.state + Self::C) % Self::M;
        self.state as f64 / Self::M as f64
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack layout over a `width × height` box with `padding` between siblings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pack {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Pack {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, padding: 0.0 }
    }

    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Lay out one leaf per value under a single root. Leaf radius is
    /// `sqrt(value)` before scaling; non-finite or negative values get 0.
    pub fn layout(&self, values: &[f64]) -> Result<PackLayout, PackError> {
        let (dx, dy) = (self.width, self.height);
        let total: f64 = values.iter().map(|&v| sanitize(v)).sum();
        let center = Circle::new(dx / 2.0, dy / 2.0, 0.0);

        let mut circles: Vec<Circle> = values
            .iter()
            .map(|&v| Circle::new(0.0, 0.0, sanitize(v).sqrt()))
            .collect();
        if circles.is_empty() {
            return Ok(PackLayout { root: center, value: total, leaves: Vec::new() });
        }

        let mut random = Lcg::new();
        let unpadded = pack_children(&mut circles, 0.0, &mut random)?;
        let root_r = pack_children(&mut circles, self.padding * unpadded / dx.min(dy), &mut random)?;

        let k = if root_r > 0.0 { dx.min(dy) / (2.0 * root_r) } else { 0.0 };
        let leaves = circles
            .iter()
            .zip(values)
            .enumerate()
            .map(|(index, (c, &v))| PackedCircle {
                index,
                x: center.x + k * c.x,
                y: center.y + k * c.y,
                r: c.r * k,
                value: sanitize(v),
            })
            .collect();
        Ok(PackLayout { root: Circle::new(center.x, center.y, root_r * k), value: total, leaves })
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Pack siblings with every radius temporarily grown by `pad`; returns the
/// parent radius.
fn pack_children(circles: &mut [Circle], pad: f64, random: &mut Lcg) -> Result<f64, PackError> {
    let pad = if pad.is_finite() { pad } else { 0.0 };
    if pad != 0.0 {
        circles.iter_mut().for_each(|c| c.r += pad);
    }
    let e = pack_siblings(circles, random)?;
    if pad != 0.0 {
        circles.iter_mut().for_each(|c| c.r -= pad);
    }
    Ok(e + pad)
}

/// Place `circles` tangent to one another around the origin, centered on
/// their enclosing circle. Returns the enclosing radius.
pub fn pack_siblings(circles: &mut [Circle], random: &mut Lcg) -> Result<f64, PackError> {
    let n = circles.len();
    if n == 0 {
        return Ok(0.0);
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return Ok(circles[0].r);
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return Ok(circles[0].r + circles[1].r);
    }

    circles[2] = place(circles[1], circles[0], circles[2]);

    // Front chain as a circular doubly linked list over circle indices.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    next[0] = 1;
    next[1] = 2;
    next[2] = 0;
    prev[0] = 2;
    prev[1] = 0;
    prev[2] = 1;
    let (mut a, mut b) = (0usize, 1usize);

    let mut i = 3;
    'pack: while i < n {
        let c = i;
        circles[c] = place(circles[a], circles[b], circles[c]);

        // Closest intersecting circle on the front chain, walking both ways
        // by accumulated radius.
        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(circles[j], circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(circles[k], circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        // Insert c between a and b.
        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        // New closest pair to the centroid.
        let mut best = score(circles, &next, a);
        let mut node = next[c];
        while node != b {
            let s = score(circles, &next, node);
            if s < best {
                a = node;
                best = s;
            }
            node = next[node];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut node = next[b];
    while node != b {
        chain.push(circles[node]);
        node = next[node];
    }
    let e = pack_enclose(&chain, random)?;

    for c in circles.iter_mut() {
        c.x -= e.x;
        c.y -= e.y;
    }
    Ok(e.r)
}

/// Place `c` tangent to both `a` and `b`.
fn place(b: Circle, a: Circle, mut c: Circle) -> Circle {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 != 0.0 {
        let a2 = (a.r + c.r).powi(2);
        let b2 = (b.r + c.r).powi(2);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.x = b.x - x * dx - y * dy;
            c.y = b.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.x = a.x + x * dx - y * dy;
            c.y = a.y + x * dy + y * dx;
        }
    } else {
        c.x = a.x + c.r;
        c.y = a.y;
    }
    c
}

fn intersects(a: Circle, b: Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted midpoint of `node` and
/// its successor.
fn score(circles: &[Circle], next: &[usize], node: usize) -> f64 {
    let a = circles[node];
    let b = circles[next[node]];
    let ab = a.r + b.r;
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}

/// Smallest circle enclosing `circles` (randomized incremental construction).
pub fn pack_enclose(circles: &[Circle], random: &mut Lcg) -> Result<Circle, PackError> {
    let mut shuffled = circles.to_vec();
    shuffle(&mut shuffled, random);

    let mut basis: Vec<Circle> = Vec::new();
    let mut e: Option<Circle> = None;
    let mut i = 0;
    while i < shuffled.len() {
        let p = shuffled[i];
        match e {
            Some(enclosing) if encloses_weak(enclosing, p) => i += 1,
            _ => {
                basis = extend_basis(&basis, p).ok_or(PackError::NoEnclosingBasis(circles.len()))?;
                e = Some(enclose_basis(&basis));
                i = 0;
            }
        }
    }
    e.ok_or(PackError::NoEnclosingBasis(0))
}

fn shuffle(items: &mut [Circle], random: &mut Lcg) {
    let mut m = items.len();
    while m > 0 {
        let i = (random.next_f64() * m as f64) as usize;
        m -= 1;
        items.swap(m, i);
    }
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(p, basis) {
        return Some(vec![p]);
    }

    for &bi in basis {
        if encloses_not(p, bi) && encloses_weak_all(enclose_basis2(bi, p), basis) {
            return Some(vec![bi, p]);
        }
    }

    for (i, &bi) in basis.iter().enumerate() {
        for &bj in &basis[i + 1..] {
            if encloses_not(enclose_basis2(bi, bj), p)
                && encloses_not(enclose_basis2(bi, p), bj)
                && encloses_not(enclose_basis2(bj, p), bi)
                && encloses_weak_all(enclose_basis3(bi, bj, p), basis)
            {
                return Some(vec![bi, bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|&b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match *basis {
        [a] => a,
        [a, b] => enclose_basis2(a, b),
        [a, b, c] => enclose_basis3(a, b, c),
        _ => Circle::default(),
    }
}

fn enclose_basis2(a: Circle, b: Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x21, y21, r21) = (x2 - x1, y2 - y1, r2 - r1);
    let l = (x21 * x21 + y21 * y21).sqrt();
    Circle::new(
        (x1 + x2 + x21 / l * r21) / 2.0,
        (y1 + y2 + y21 / l * r21) / 2.0,
        (l + r1 + r2) / 2.0,
    )
}

fn enclose_basis3(a: Circle, b: Circle, c: Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 { (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa) } else { qc / qb });
    Circle::new(x1 + xa + xb * r, y1 + ya + yb * r, r)
}

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// Returns true if `r` is fully inside `self`. Identical rectangles contain each other.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share no positive-area overlap.
    /// Rectangles that only touch along an edge are disjoint.
    pub fn disjoint(&self, other: &Rect) -> bool {
        self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y
    }
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.disjoint(other)
    }
}

/// A packing request: a named width x height.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RectSize {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl RectSize {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }
}

/// Outcome of a placement.
///
/// A width or height of 0 means "no placement found"; see [`PlacedRect::is_empty`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedRect {
    pub name: String,
    pub x: u32,
    pub y: u32,
    /// Width as stored in the bin (post-rotation).
    pub width: u32,
    /// Height as stored in the bin (post-rotation).
    pub height: u32,
    /// True if the request was turned 90° to fit.
    #[serde(default)]
    pub rotated: bool,
}

impl PlacedRect {
    /// The "does not fit" sentinel.
    pub fn no_fit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
    pub fn area(&self) -> u64 {
        self.rect().area()
    }
}

/// Collection that only accepts rectangles disjoint from everything already in it.
///
/// Degenerate (zero-area) rectangles are always accepted and never stored.
#[derive(Debug, Clone, Default)]
pub struct DisjointRectCollection {
    rects: Vec<Rect>,
}

impl DisjointRectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `r` if it overlaps nothing in the collection. Returns false on overlap.
    pub fn add(&mut self, r: Rect) -> bool {
        if r.is_empty() {
            return true;
        }
        if !self.is_disjoint(&r) {
            return false;
        }
        self.rects.push(r);
        true
    }

    pub fn is_disjoint(&self, r: &Rect) -> bool {
        r.is_empty() || self.rects.iter().all(|o| o.disjoint(r))
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_touching_rects_are_disjoint() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(4, 0, 4, 4);
        let c = Rect::new(3, 3, 2, 2);
        assert!(a.disjoint(&b));
        assert!(a.intersects(&c));
        assert!(b.intersects(&c));
    }

    #[test]
    fn containment_is_inclusive() {
        let outer = Rect::new(2, 2, 6, 6);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Rect::new(2, 2, 6, 1)));
        assert!(!outer.contains(&Rect::new(1, 2, 6, 1)));
        assert!(!outer.contains(&Rect::new(2, 2, 7, 1)));
    }

    #[test]
    fn disjoint_collection_rejects_overlap() {
        let mut c = DisjointRectCollection::new();
        assert!(c.add(Rect::new(0, 0, 2, 2)));
        assert!(c.add(Rect::new(2, 0, 2, 2)));
        assert!(!c.add(Rect::new(1, 1, 2, 2)));
        assert!(c.add(Rect::new(1, 1, 0, 5)), "degenerate rects are ignored");
        assert_eq!(c.len(), 2);
        c.clear();
        assert!(c.is_empty());
    }
}

use super::heuristic::{self, ScoreContext, ScoredPlacement};
use super::{BinPack, Placer};
use crate::config::{GuillotineSplit, Heuristic};
use crate::error::Result;
use crate::model::{PlacedRect, Rect, RectSize};
use tracing::{debug, trace};

/// Guillotine bin packer.
///
/// Keeps a list of disjoint free rectangles. A placement consumes one free
/// rectangle and cuts the remainder into a bottom and a right piece along a
/// single axis; adjacent pieces with a full shared edge are merged back.
#[derive(Debug, Clone)]
pub struct GuillotineBinPack {
    bin_width: u32,
    bin_height: u32,
    allow_rotation: bool,
    split: GuillotineSplit,
    free: Vec<Rect>,
    used: Vec<PlacedRect>,
}

impl Default for GuillotineBinPack {
    fn default() -> Self {
        Self::new()
    }
}

impl GuillotineBinPack {
    pub fn new() -> Self {
        Self {
            bin_width: 0,
            bin_height: 0,
            allow_rotation: true,
            split: GuillotineSplit::SplitShorterLeftoverAxis,
            free: Vec::new(),
            used: Vec::new(),
        }
    }

    pub fn with_size(width: u32, height: u32) -> Result<Self> {
        let mut p = Self::new();
        p.init(width, height)?;
        Ok(p)
    }

    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    pub fn with_split(mut self, split: GuillotineSplit) -> Self {
        self.split = split;
        self
    }

    pub fn free_rectangles(&self) -> Vec<Rect> {
        self.free.clone()
    }

    /// Cuts what is left of `fr` after `placed` (at its top-left) into a bottom and a right piece.
    fn split(&self, fr: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
        let w_right = fr.right() - placed.right();
        let h_bottom = fr.bottom() - placed.bottom();

        let split_horizontal = match self.split {
            GuillotineSplit::SplitShorterLeftoverAxis => w_right <= h_bottom,
            GuillotineSplit::SplitLongerLeftoverAxis => w_right > h_bottom,
            GuillotineSplit::SplitMinimizeArea => {
                placed.w as u64 * h_bottom as u64 > w_right as u64 * placed.h as u64
            }
            GuillotineSplit::SplitMaximizeArea => {
                placed.w as u64 * h_bottom as u64 <= w_right as u64 * placed.h as u64
            }
            GuillotineSplit::SplitShorterAxis => fr.w <= fr.h,
            GuillotineSplit::SplitLongerAxis => fr.w > fr.h,
        };

        let mut bottom = Rect::new(fr.x, placed.bottom(), 0, h_bottom);
        let mut right = Rect::new(placed.right(), fr.y, w_right, 0);
        if split_horizontal {
            bottom.w = fr.w;
            right.h = placed.h;
        } else {
            bottom.w = placed.w;
            right.h = fr.h;
        }
        let keep = |r: Rect| (!r.is_empty()).then_some(r);
        (keep(bottom), keep(right))
    }

    fn merge_free_list(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.free.len() {
                for j in i + 1..self.free.len() {
                    let a = self.free[i];
                    let b = self.free[j];
                    let joined = if a.y == b.y && a.h == b.h && a.right() == b.x {
                        Some(Rect::new(a.x, a.y, a.w + b.w, a.h))
                    } else if a.y == b.y && a.h == b.h && b.right() == a.x {
                        Some(Rect::new(b.x, a.y, a.w + b.w, a.h))
                    } else if a.x == b.x && a.w == b.w && a.bottom() == b.y {
                        Some(Rect::new(a.x, a.y, a.w, a.h + b.h))
                    } else if a.x == b.x && a.w == b.w && b.bottom() == a.y {
                        Some(Rect::new(a.x, b.y, a.w, a.h + b.h))
                    } else {
                        None
                    };
                    if let Some(r) = joined {
                        self.free[i] = r;
                        self.free.remove(j);
                        merged = true;
                        break 'outer;
                    }
                }
            }
        }
    }
}

impl Placer for GuillotineBinPack {
    fn dims(&self) -> Option<(u32, u32)> {
        (self.bin_width > 0 && self.bin_height > 0).then_some((self.bin_width, self.bin_height))
    }

    fn used(&self) -> &[PlacedRect] {
        &self.used
    }

    fn find(&self, width: u32, height: u32, heuristic: Heuristic) -> Option<ScoredPlacement> {
        let ctx = ScoreContext {
            bin_width: self.bin_width,
            bin_height: self.bin_height,
            used: &self.used,
            allow_rotation: self.allow_rotation,
        };
        heuristic::find_position(&self.free, &ctx, width, height, heuristic)
    }

    fn commit(&mut self, name: String, placement: &ScoredPlacement) -> PlacedRect {
        let node = placement.rect;
        let fr = self.free.swap_remove(placement.free_index);
        let (a, b) = self.split(&fr, &node);
        self.free.extend(a);
        self.free.extend(b);
        self.merge_free_list();
        trace!(%name, x = node.x, y = node.y, w = node.w, h = node.h, "placed");

        let placed = PlacedRect {
            name,
            x: node.x,
            y: node.y,
            width: node.w,
            height: node.h,
            rotated: placement.rotated,
        };
        self.used.push(placed.clone());
        placed
    }
}

impl BinPack for GuillotineBinPack {
    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.used.clear();
        self.free.clear();
        if let Err(e) = super::validate_bin(width, height) {
            self.bin_width = 0;
            self.bin_height = 0;
            return Err(e);
        }
        self.bin_width = width;
        self.bin_height = height;
        self.free.push(Rect::new(0, 0, width, height));
        debug!(width, height, split = ?self.split, "guillotine bin initialized");
        Ok(())
    }

    fn insert(&mut self, request: RectSize, heuristic: Heuristic) -> Result<PlacedRect> {
        super::insert_with(self, request, heuristic)
    }

    fn insert_batch(
        &mut self,
        requests: Vec<RectSize>,
        heuristic: Heuristic,
    ) -> Result<Vec<PlacedRect>> {
        super::insert_batch_with(self, requests, heuristic)
    }

    fn occupancy(&self) -> Result<f64> {
        super::occupancy_of(self)
    }

    fn used_rectangles(&self) -> Vec<PlacedRect> {
        self.used.clone()
    }

    fn bin_size(&self) -> Option<(u32, u32)> {
        self.dims()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_leftover_axis_split() {
        let p = GuillotineBinPack::new();
        let fr = Rect::new(0, 0, 10, 6);
        let (bottom, right) = p.split(&fr, &Rect::new(0, 0, 4, 4));
        // leftover right (6) > leftover bottom (2): split vertically
        assert_eq!(bottom, Some(Rect::new(0, 4, 4, 2)));
        assert_eq!(right, Some(Rect::new(4, 0, 6, 6)));
    }

    #[test]
    fn free_rects_stay_disjoint() {
        let mut p = GuillotineBinPack::with_size(16, 16).unwrap();
        for (w, h) in [(5, 7), (3, 3), (8, 2), (4, 6), (6, 6), (2, 9)] {
            p.insert_one(w, h, Heuristic::BestAreaFit).unwrap();
        }
        let free = p.free_rectangles();
        for (i, a) in free.iter().enumerate() {
            for b in &free[i + 1..] {
                assert!(a.disjoint(b), "{a:?} overlaps {b:?}");
            }
            for u in p.used_rectangles() {
                assert!(a.disjoint(&u.rect()), "free {a:?} overlaps used {u:?}");
            }
        }
    }

    #[test]
    fn merge_restores_full_strip() {
        let mut p = GuillotineBinPack::with_size(8, 8).unwrap();
        p.free = vec![Rect::new(0, 4, 3, 4), Rect::new(3, 4, 5, 4)];
        p.merge_free_list();
        assert_eq!(p.free, vec![Rect::new(0, 4, 8, 4)]);
    }
}

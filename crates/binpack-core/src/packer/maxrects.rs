use super::free_list::FreeList;
use super::heuristic::{self, ScoreContext, ScoredPlacement};
use super::{BinPack, Placer};
use crate::config::Heuristic;
use crate::error::Result;
use crate::model::{PlacedRect, Rect, RectSize};
use tracing::{debug, trace};

/// MaxRects bin packer.
///
/// Tracks unused space as a list of maximal, possibly overlapping free
/// rectangles. Every placement splits each free rectangle it touches into the
/// strips left around it, then drops strips contained in other free rectangles.
#[derive(Debug, Clone)]
pub struct MaxRectsBinPack {
    bin_width: u32,
    bin_height: u32,
    allow_rotation: bool,
    used: Vec<PlacedRect>,
    free: FreeList,
}

impl Default for MaxRectsBinPack {
    fn default() -> Self {
        Self::new()
    }
}

impl MaxRectsBinPack {
    /// A bin of size (0,0). Call [`BinPack::init`] before inserting.
    pub fn new() -> Self {
        Self {
            bin_width: 0,
            bin_height: 0,
            allow_rotation: true,
            used: Vec::new(),
            free: FreeList::empty(),
        }
    }

    /// An empty bin of the given size.
    pub fn with_size(width: u32, height: u32) -> Result<Self> {
        let mut p = Self::new();
        p.init(width, height)?;
        Ok(p)
    }

    /// Whether requests may be turned 90° (default: true).
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// Snapshot of the current free rectangles.
    pub fn free_rectangles(&self) -> Vec<Rect> {
        self.free.as_slice().to_vec()
    }

    pub fn free_list_len(&self) -> usize {
        self.free.len()
    }

    fn context(&self) -> ScoreContext<'_> {
        ScoreContext {
            bin_width: self.bin_width,
            bin_height: self.bin_height,
            used: &self.used,
            allow_rotation: self.allow_rotation,
        }
    }
}

impl Placer for MaxRectsBinPack {
    fn dims(&self) -> Option<(u32, u32)> {
        (self.bin_width > 0 && self.bin_height > 0).then_some((self.bin_width, self.bin_height))
    }

    fn used(&self) -> &[PlacedRect] {
        &self.used
    }

    fn find(&self, width: u32, height: u32, heuristic: Heuristic) -> Option<ScoredPlacement> {
        heuristic::find_position(self.free.as_slice(), &self.context(), width, height, heuristic)
    }

    fn commit(&mut self, name: String, placement: &ScoredPlacement) -> PlacedRect {
        let node = placement.rect;
        self.free.place(&node);
        trace!(
            %name,
            x = node.x,
            y = node.y,
            w = node.w,
            h = node.h,
            rotated = placement.rotated,
            free = self.free.len(),
            "placed"
        );
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

impl BinPack for MaxRectsBinPack {
    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.used.clear();
        if let Err(e) = super::validate_bin(width, height) {
            self.bin_width = 0;
            self.bin_height = 0;
            self.free = FreeList::empty();
            return Err(e);
        }
        self.bin_width = width;
        self.bin_height = height;
        self.free = FreeList::new(width, height);
        debug!(width, height, "maxrects bin initialized");
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
    use crate::error::BinPackError;

    #[test]
    fn starts_uninitialized() {
        let mut p = MaxRectsBinPack::new();
        assert_eq!(p.bin_size(), None);
        assert!(matches!(p.occupancy(), Err(BinPackError::UninitializedBin)));
        assert!(matches!(
            p.insert_one(1, 1, Heuristic::BestAreaFit),
            Err(BinPackError::UninitializedBin)
        ));
        assert!(p.used_rectangles().is_empty());
    }

    #[test]
    fn failed_init_returns_to_uninitialized() {
        let mut p = MaxRectsBinPack::with_size(8, 8).unwrap();
        p.insert_one(2, 2, Heuristic::BottomLeft).unwrap();
        assert!(matches!(
            p.init(8, 0),
            Err(BinPackError::InvalidDimension { width: 8, height: 0 })
        ));
        assert_eq!(p.bin_size(), None);
        assert!(p.used_rectangles().is_empty());
        assert_eq!(p.free_list_len(), 0);
    }

    #[test]
    fn no_fit_leaves_state_untouched() {
        let mut p = MaxRectsBinPack::with_size(4, 4).unwrap();
        p.insert_one(3, 3, Heuristic::BestShortSideFit).unwrap();
        let free_before = p.free_rectangles();
        let r = p.insert_one(2, 2, Heuristic::BestShortSideFit).unwrap();
        assert!(r.is_empty());
        assert_eq!(p.free_rectangles(), free_before);
        assert_eq!(p.used_rectangles().len(), 1);
    }

    #[test]
    fn zero_sized_request_is_rejected() {
        let mut p = MaxRectsBinPack::with_size(4, 4).unwrap();
        assert!(matches!(
            p.insert_one(0, 2, Heuristic::BestAreaFit),
            Err(BinPackError::InvalidDimension { width: 0, height: 2 })
        ));
        let batch = vec![RectSize::new("a", 1, 1), RectSize::new("b", 1, 0)];
        assert!(p.insert_batch(batch, Heuristic::BestAreaFit).is_err());
        assert!(p.used_rectangles().is_empty(), "batch is validated up front");
    }

    #[test]
    fn free_list_after_first_placement() {
        let mut p = MaxRectsBinPack::with_size(10, 6).unwrap().with_rotation(false);
        let r = p.insert_one(4, 6, Heuristic::BottomLeft).unwrap();
        assert_eq!(r.rect(), Rect::new(0, 0, 4, 6));
        assert_eq!(p.free_rectangles(), vec![Rect::new(4, 0, 6, 6)]);
    }
}

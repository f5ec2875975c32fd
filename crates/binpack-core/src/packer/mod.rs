use crate::config::{Heuristic, PackerConfig, Strategy};
use crate::error::{BinPackError, Result};
use crate::model::{PlacedRect, RectSize};
use tracing::{debug, trace};

mod free_list;
pub mod guillotine;
pub mod heuristic;
pub mod maxrects;

pub use guillotine::GuillotineBinPack;
pub use heuristic::ScoredPlacement;
pub use maxrects::MaxRectsBinPack;

/// Capability set shared by every packing strategy.
///
/// A packer starts uninitialized; `init` moves it to the ready state and may be
/// called again at any time to start over with an empty bin.
/// Implementations must never produce overlapping placements or placements
/// outside the bin.
pub trait BinPack {
    /// (Re)initializes to an empty `width` x `height` bin.
    fn init(&mut self, width: u32, height: u32) -> Result<()>;

    /// Inserts a single named rectangle, possibly rotated.
    ///
    /// When nothing fits, returns `Ok` with an empty [`PlacedRect`] (see
    /// [`PlacedRect::is_empty`]) and leaves the bin unchanged.
    fn insert(&mut self, request: RectSize, heuristic: Heuristic) -> Result<PlacedRect>;

    /// Inserts a single unnamed `width` x `height` rectangle. See [`BinPack::insert`].
    fn insert_one(&mut self, width: u32, height: u32, heuristic: Heuristic) -> Result<PlacedRect> {
        self.insert(RectSize::new(String::new(), width, height), heuristic)
    }

    /// Offline packing: places the globally best-scoring pending request first,
    /// re-scoring everything after each placement.
    ///
    /// Consumes `requests`. Requests that no longer fit are dropped; compare the
    /// output length with the input length to detect a partial pack. The output
    /// is in placement order, unrelated to the input order.
    fn insert_batch(
        &mut self,
        requests: Vec<RectSize>,
        heuristic: Heuristic,
    ) -> Result<Vec<PlacedRect>>;

    /// Used area divided by bin area, in `[0, 1]`.
    fn occupancy(&self) -> Result<f64>;

    /// Snapshot of every placement made since the last `init`.
    fn used_rectangles(&self) -> Vec<PlacedRect>;

    /// `(width, height)` of the bin, `None` until initialized.
    fn bin_size(&self) -> Option<(u32, u32)>;
}

/// Scoring and committing half of a strategy; the insertion protocols are shared.
pub(crate) trait Placer {
    fn dims(&self) -> Option<(u32, u32)>;
    fn used(&self) -> &[PlacedRect];
    fn find(&self, width: u32, height: u32, heuristic: Heuristic) -> Option<ScoredPlacement>;
    /// `placement` must come from `find` on the current state.
    fn commit(&mut self, name: String, placement: &ScoredPlacement) -> PlacedRect;
}

fn ensure_ready<P: Placer>(p: &P) -> Result<()> {
    match p.dims() {
        Some(_) => Ok(()),
        None => Err(BinPackError::UninitializedBin),
    }
}

fn validate_request(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(BinPackError::InvalidDimension { width, height });
    }
    Ok(())
}

pub(crate) fn validate_bin(width: u32, height: u32) -> Result<()> {
    validate_request(width, height)
}

pub(crate) fn insert_with<P: Placer>(
    p: &mut P,
    request: RectSize,
    heuristic: Heuristic,
) -> Result<PlacedRect> {
    ensure_ready(p)?;
    validate_request(request.width, request.height)?;
    match p.find(request.width, request.height, heuristic) {
        Some(placement) => Ok(p.commit(request.name, &placement)),
        None => {
            trace!(name = %request.name, w = request.width, h = request.height, "no fit");
            Ok(PlacedRect::no_fit(request.name))
        }
    }
}

pub(crate) fn insert_batch_with<P: Placer>(
    p: &mut P,
    mut requests: Vec<RectSize>,
    heuristic: Heuristic,
) -> Result<Vec<PlacedRect>> {
    ensure_ready(p)?;
    for r in &requests {
        validate_request(r.width, r.height)?;
    }

    let requested = requests.len();
    let mut dst = Vec::with_capacity(requested);
    while !requests.is_empty() {
        let mut best: Option<(usize, ScoredPlacement)> = None;
        for (i, r) in requests.iter().enumerate() {
            if let Some(candidate) = p.find(r.width, r.height, heuristic) {
                if best.as_ref().is_none_or(|(_, b)| candidate.beats(b)) {
                    best = Some((i, candidate));
                }
            }
        }
        // if the best request does not fit, none of the others do either
        let Some((idx, placement)) = best else {
            break;
        };
        let request = requests.remove(idx);
        dst.push(p.commit(request.name, &placement));
    }

    debug!(
        requested,
        placed = dst.len(),
        dropped = requests.len(),
        %heuristic,
        "batch insert finished"
    );
    Ok(dst)
}

pub(crate) fn occupancy_of<P: Placer>(p: &P) -> Result<f64> {
    let (w, h) = p.dims().ok_or(BinPackError::UninitializedBin)?;
    let bin_area = w as u64 * h as u64;
    if bin_area == 0 {
        return Ok(0.0);
    }
    let used: u64 = p.used().iter().map(PlacedRect::area).sum();
    Ok(used as f64 / bin_area as f64)
}

/// Strategy selected at construction time.
#[derive(Debug, Clone)]
pub enum BinPacker {
    MaxRects(MaxRectsBinPack),
    Guillotine(GuillotineBinPack),
}

impl BinPacker {
    /// An uninitialized packer of the given strategy, rotation allowed.
    pub fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::MaxRects => Self::MaxRects(MaxRectsBinPack::new()),
            Strategy::Guillotine => Self::Guillotine(GuillotineBinPack::new()),
        }
    }

    /// Validates `cfg` and returns a packer already initialized to its bin size.
    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        cfg.validate()?;
        let mut packer = match cfg.strategy {
            Strategy::MaxRects => {
                Self::MaxRects(MaxRectsBinPack::new().with_rotation(cfg.allow_rotation))
            }
            Strategy::Guillotine => Self::Guillotine(
                GuillotineBinPack::new()
                    .with_rotation(cfg.allow_rotation)
                    .with_split(cfg.guillotine_split),
            ),
        };
        packer.init(cfg.width, cfg.height)?;
        Ok(packer)
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::MaxRects(_) => Strategy::MaxRects,
            Self::Guillotine(_) => Strategy::Guillotine,
        }
    }
}

impl BinPack for BinPacker {
    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        match self {
            Self::MaxRects(p) => p.init(width, height),
            Self::Guillotine(p) => p.init(width, height),
        }
    }

    fn insert(&mut self, request: RectSize, heuristic: Heuristic) -> Result<PlacedRect> {
        match self {
            Self::MaxRects(p) => p.insert(request, heuristic),
            Self::Guillotine(p) => p.insert(request, heuristic),
        }
    }

    fn insert_batch(
        &mut self,
        requests: Vec<RectSize>,
        heuristic: Heuristic,
    ) -> Result<Vec<PlacedRect>> {
        match self {
            Self::MaxRects(p) => p.insert_batch(requests, heuristic),
            Self::Guillotine(p) => p.insert_batch(requests, heuristic),
        }
    }

    fn occupancy(&self) -> Result<f64> {
        match self {
            Self::MaxRects(p) => p.occupancy(),
            Self::Guillotine(p) => p.occupancy(),
        }
    }

    fn used_rectangles(&self) -> Vec<PlacedRect> {
        match self {
            Self::MaxRects(p) => p.used_rectangles(),
            Self::Guillotine(p) => p.used_rectangles(),
        }
    }

    fn bin_size(&self) -> Option<(u32, u32)> {
        match self {
            Self::MaxRects(p) => p.bin_size(),
            Self::Guillotine(p) => p.bin_size(),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Packing strategies sharing the [`BinPack`](crate::packer::BinPack) capability set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// MaxRects free-list (overlapping maximal free rectangles; best quality).
    MaxRects,
    /// Guillotine splitting (disjoint free rectangles; cheaper per placement).
    Guillotine,
}

impl FromStr for Strategy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maxrects" | "mr" => Ok(Self::MaxRects),
            "guillotine" | "g" => Ok(Self::Guillotine),
            _ => Err(()),
        }
    }
}

/// Free-rectangle choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    /// -BSSF: place against the short side of the free rectangle it fits best.
    BestShortSideFit,
    /// -BLSF: place against the long side of the free rectangle it fits best.
    BestLongSideFit,
    /// -BAF: place into the smallest free rectangle it fits.
    BestAreaFit,
    /// -BL: "Tetris" placement, lowest top edge first, then leftmost.
    BottomLeft,
    /// -CP: place where the rectangle touches the bin edges and other rectangles the most.
    ContactPoint,
}

impl Heuristic {
    pub const ALL: [Heuristic; 5] = [
        Heuristic::BestShortSideFit,
        Heuristic::BestLongSideFit,
        Heuristic::BestAreaFit,
        Heuristic::BottomLeft,
        Heuristic::ContactPoint,
    ];

    /// Short name as accepted by `FromStr`.
    pub fn short_name(&self) -> &'static str {
        match self {
            Heuristic::BestShortSideFit => "bssf",
            Heuristic::BestLongSideFit => "blsf",
            Heuristic::BestAreaFit => "baf",
            Heuristic::BottomLeft => "bl",
            Heuristic::ContactPoint => "cp",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Heuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "cp" | "contactpoint" => Ok(Self::ContactPoint),
            _ => Err(()),
        }
    }
}

/// Guillotine split axis heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineSplit {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    SplitMinimizeArea,
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl FromStr for GuillotineSplit {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(Self::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(Self::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(Self::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(Self::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(Self::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(Self::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// Bin and strategy selection for one packing session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerConfig {
    /// Bin width in pixels.
    pub width: u32,
    /// Bin height in pixels.
    pub height: u32,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_heuristic")]
    pub heuristic: Heuristic,
    /// Also try the 90° rotated orientation of every request.
    #[serde(default = "default_allow_rotation")]
    pub allow_rotation: bool,
    /// Only used by [`Strategy::Guillotine`].
    #[serde(default = "default_guillotine_split")]
    pub guillotine_split: GuillotineSplit,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            strategy: default_strategy(),
            heuristic: default_heuristic(),
            allow_rotation: default_allow_rotation(),
            guillotine_split: default_guillotine_split(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if the bin would have zero area.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::BinPackError;

        if self.width == 0 || self.height == 0 {
            return Err(BinPackError::InvalidDimension {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_strategy() -> Strategy {
    Strategy::MaxRects
}
fn default_heuristic() -> Heuristic {
    Heuristic::BestShortSideFit
}
fn default_allow_rotation() -> bool {
    true
}
fn default_guillotine_split() -> GuillotineSplit {
    GuillotineSplit::SplitShorterLeftoverAxis
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn strategy(mut self, v: Strategy) -> Self {
        self.cfg.strategy = v;
        self
    }
    pub fn heuristic(mut self, v: Heuristic) -> Self {
        self.cfg.heuristic = v;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn guillotine_split(mut self, v: GuillotineSplit) -> Self {
        self.cfg.guillotine_split = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

//! MaxRects rectangle bin packing for sprite, glyph and icon atlases.
//!
//! - Engine: [`MaxRectsBinPack`] with five heuristics (BSSF/BLSF/BAF/BL/CP),
//!   single and batch (best-first) insertion, occupancy reporting
//! - Strategies: [`BinPacker`] selects MaxRects or Guillotine behind the [`BinPack`] capability set
//! - Pipeline: [`pack_atlases`] renders [`ImageSource`]s, packs them and composites RGBA atlases with a JSON manifest
//!
//! Quick example:
//! ```
//! use binpack_core::{BinPack, Heuristic, MaxRectsBinPack, RectSize};
//! # fn main() -> binpack_core::Result<()> {
//! let mut bin = MaxRectsBinPack::with_size(64, 64)?;
//! let placed = bin.insert_batch(
//!     vec![RectSize::new("a", 32, 16), RectSize::new("b", 16, 32)],
//!     Heuristic::BestShortSideFit,
//! )?;
//! assert_eq!(placed.len(), 2);
//! println!("occupancy: {:.2}", bin.occupancy()?);
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod source;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use source::*;

/// Convenience prelude for common types and functions.
/// Importing `binpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{GuillotineSplit, Heuristic, PackerConfig, PackerConfigBuilder, Strategy};
    pub use crate::model::{PlacedRect, Rect, RectSize};
    pub use crate::packer::{BinPack, BinPacker, GuillotineBinPack, MaxRectsBinPack};
    pub use crate::pipeline::{AtlasConfig, Manifest, ManifestEntry, OutputAtlas, pack_atlases};
    pub use crate::source::{BitmapSource, ImageSource};
}

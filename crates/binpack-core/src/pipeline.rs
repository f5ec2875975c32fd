use crate::config::{Heuristic, PackerConfig, Strategy};
use crate::error::{BinPackError, Result};
use crate::model::{DisjointRectCollection, PlacedRect, RectSize};
use crate::packer::{BinPack, BinPacker};
use crate::source::ImageSource;
use image::RgbaImage;
use image::imageops;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Settings for turning a set of images into atlases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasConfig {
    #[serde(default = "default_heuristic")]
    pub heuristic: Heuristic,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_allow_rotation")]
    pub allow_rotation: bool,
    /// Integer pixel ratio applied to every source size (1 for 1x, 2 for 2x, ...).
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Transparent pixels added around every image.
    #[serde(default)]
    pub padding: u32,
    /// Upper bound for the atlas side.
    #[serde(default = "default_max_side")]
    pub max_side: u32,
    /// Extra side length per unit of scale on top of the area estimate.
    #[serde(default = "default_side_slack")]
    pub side_slack_per_scale: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            heuristic: default_heuristic(),
            strategy: default_strategy(),
            allow_rotation: default_allow_rotation(),
            scale: default_scale(),
            padding: 0,
            max_side: default_max_side(),
            side_slack_per_scale: default_side_slack(),
        }
    }
}

impl AtlasConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scale == 0 {
            return Err(BinPackError::InvalidConfig("scale must be at least 1".into()));
        }
        if self.max_side == 0 {
            return Err(BinPackError::InvalidConfig("max_side must be at least 1".into()));
        }
        if self.padding.checked_mul(2).is_none() {
            return Err(BinPackError::InvalidConfig(format!(
                "padding {} is too large",
                self.padding
            )));
        }
        Ok(())
    }
}

fn default_heuristic() -> Heuristic {
    Heuristic::ContactPoint
}
fn default_strategy() -> Strategy {
    Strategy::MaxRects
}
fn default_allow_rotation() -> bool {
    true
}
fn default_scale() -> u32 {
    1
}
fn default_max_side() -> u32 {
    2048
}
fn default_side_slack() -> u32 {
    20
}

/// Manifest record of one packed image (content area, padding excluded).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: u32,
    pub rotated: bool,
}

/// Manifest keyed by [`manifest_key`], sorted.
pub type Manifest = BTreeMap<String, ManifestEntry>;

/// One square atlas page.
pub struct OutputAtlas {
    /// 0 for the first atlas, then 1, 2, ...
    pub index: usize,
    pub side: u32,
    pub rgba: RgbaImage,
    pub manifest: Manifest,
    /// Padded slots as placed by the packer.
    pub placed: Vec<PlacedRect>,
    pub occupancy: f64,
}

impl OutputAtlas {
    pub fn rotated_count(&self) -> usize {
        self.placed.iter().filter(|p| p.rotated).count()
    }
}

/// Square atlas side for images with the given areas and longest sides.
///
/// `⌊√(Σ area)⌋ + scale * side_slack_per_scale`, raised to the longest image
/// side so every image fits an empty atlas, then capped at `max_side`.
pub fn estimate_atlas_side(areas: impl IntoIterator<Item = u64>, longest_side: u32, cfg: &AtlasConfig) -> u32 {
    let total: u64 = areas.into_iter().sum();
    let estimate = total.isqrt() + cfg.scale as u64 * cfg.side_slack_per_scale as u64;
    let side = estimate.max(longest_side as u64).max(1);
    side.min(cfg.max_side as u64) as u32
}

/// Copies `img` into a new image with `padding` transparent pixels on every side.
///
/// Fails with `InvalidConfig` when the padded size does not fit a `u32`.
pub fn pad_image(img: &RgbaImage, padding: u32) -> Result<RgbaImage> {
    if padding == 0 {
        return Ok(img.clone());
    }
    let (w, h) = img.dimensions();
    let grow = |side: u32| {
        padding
            .checked_mul(2)
            .and_then(|p| side.checked_add(p))
            .ok_or_else(|| {
                BinPackError::InvalidConfig(format!("padding {padding} overflows side {side}"))
            })
    };
    let mut out = RgbaImage::new(grow(w)?, grow(h)?);
    imageops::replace(&mut out, img, padding as i64, padding as i64);
    Ok(out)
}

/// Manifest name for a source key: the key up to the first `.` of its file name.
pub fn manifest_key(key: &str) -> String {
    let name_start = key.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match key[name_start..].find('.') {
        Some(dot) => key[..name_start + dot].to_string(),
        None => key.to_string(),
    }
}

struct Prepared {
    key: String,
    image: RgbaImage,
}

fn prepare<S: ImageSource>(src: &S, cfg: &AtlasConfig) -> Result<Prepared> {
    let (w, h) = src.size()?;
    if w == 0 || h == 0 {
        return Err(BinPackError::InvalidInput(format!(
            "'{}' has an empty size {}x{}",
            src.key(),
            w,
            h
        )));
    }
    let (sw, sh) = w
        .checked_mul(cfg.scale)
        .zip(h.checked_mul(cfg.scale))
        .ok_or_else(|| {
            BinPackError::InvalidConfig(format!(
                "scale {} overflows '{}' ({}x{})",
                cfg.scale,
                src.key(),
                w,
                h
            ))
        })?;
    let rendered = src.render(sw, sh)?;
    Ok(Prepared {
        key: src.key().to_string(),
        image: pad_image(&rendered, cfg.padding)?,
    })
}

#[cfg(feature = "parallel")]
fn prepare_all<S: ImageSource + Sync>(sources: &[S], cfg: &AtlasConfig) -> Result<Vec<Prepared>> {
    sources.par_iter().map(|s| prepare(s, cfg)).collect()
}

#[cfg(not(feature = "parallel"))]
fn prepare_all<S: ImageSource + Sync>(sources: &[S], cfg: &AtlasConfig) -> Result<Vec<Prepared>> {
    sources.iter().map(|s| prepare(s, cfg)).collect()
}

/// Renders, pads and packs `sources` into as many square atlases as needed.
///
/// Each atlas is a fresh single-bin packing session over the images still
/// pending: its side is estimated from their total area, everything pending
/// is batch-inserted, and placed images are composited (rotated ones turned
/// 90° clockwise). Images that did not fit roll over to the next atlas.
///
/// Two sources whose keys map to the same [`manifest_key`] are rejected with
/// `InvalidInput`.
#[instrument(skip_all)]
pub fn pack_atlases<S: ImageSource + Sync>(sources: &[S], cfg: &AtlasConfig) -> Result<Vec<OutputAtlas>> {
    cfg.validate()?;
    if sources.is_empty() {
        return Err(BinPackError::Empty);
    }

    let mut pending: BTreeMap<String, RgbaImage> = BTreeMap::new();
    let mut names: BTreeMap<String, String> = BTreeMap::new();
    for p in prepare_all(sources, cfg)? {
        if let Some(other) = names.insert(manifest_key(&p.key), p.key.clone()) {
            return Err(BinPackError::InvalidInput(format!(
                "'{}' and '{}' share the manifest key '{}'",
                other,
                p.key,
                manifest_key(&p.key)
            )));
        }
        pending.insert(p.key, p.image);
    }
    info!(count = pending.len(), "prepared images");

    let mut atlases = Vec::new();
    while !pending.is_empty() {
        let longest = pending
            .values()
            .map(|img| img.width().max(img.height()))
            .max()
            .unwrap_or(0);
        let side = estimate_atlas_side(
            pending.values().map(|img| img.width() as u64 * img.height() as u64),
            longest,
            cfg,
        );
        let packer_cfg = PackerConfig::builder()
            .with_dimensions(side, side)
            .strategy(cfg.strategy)
            .heuristic(cfg.heuristic)
            .allow_rotation(cfg.allow_rotation)
            .build();
        let mut packer = BinPacker::from_config(&packer_cfg)?;

        let requests: Vec<RectSize> = pending
            .iter()
            .map(|(k, img)| RectSize::new(k.clone(), img.width(), img.height()))
            .collect();
        let placed = packer.insert_batch(requests, cfg.heuristic)?;
        if placed.is_empty() {
            let (key, img) = pending
                .iter()
                .max_by_key(|(_, img)| img.width().max(img.height()))
                .ok_or(BinPackError::Empty)?;
            return Err(BinPackError::OutOfSpace {
                key: key.clone(),
                width: img.width(),
                height: img.height(),
            });
        }

        let mut rgba = RgbaImage::new(side, side);
        let mut manifest = Manifest::new();
        let mut seen = DisjointRectCollection::new();
        for p in &placed {
            let img = pending
                .remove(&p.name)
                .ok_or_else(|| BinPackError::InvalidInput(format!("unknown placement '{}'", p.name)))?;
            if !seen.add(p.rect()) {
                return Err(BinPackError::InvalidInput(format!(
                    "overlapping placement for '{}'",
                    p.name
                )));
            }
            let tile = if p.rotated {
                imageops::rotate90(&img)
            } else {
                img
            };
            imageops::replace(&mut rgba, &tile, p.x as i64, p.y as i64);
            manifest.insert(
                manifest_key(&p.name),
                ManifestEntry {
                    x: p.x + cfg.padding,
                    y: p.y + cfg.padding,
                    width: p.width - cfg.padding * 2,
                    height: p.height - cfg.padding * 2,
                    pixel_ratio: cfg.scale,
                    rotated: p.rotated,
                },
            );
        }

        let atlas = OutputAtlas {
            index: atlases.len(),
            side,
            rgba,
            manifest,
            occupancy: packer.occupancy()?,
            placed,
        };
        debug!(
            index = atlas.index,
            side,
            placed = atlas.placed.len(),
            rotated = atlas.rotated_count(),
            remaining = pending.len(),
            "atlas packed"
        );
        atlases.push(atlas);
    }
    Ok(atlases)
}

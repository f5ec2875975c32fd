use crate::error::{BinPackError, Result};
use crate::model::PlacedRect;
use crate::pipeline::Manifest;
use serde_json::{Value, json};

/// Pretty JSON of a manifest, keys sorted.
pub fn manifest_to_json(manifest: &Manifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).map_err(|e| BinPackError::Encode(e.to_string()))
}

/// Layout-only report: `{ bin: {w,h}, occupancy, placed: [...], unplaced: [...] }`.
pub fn layout_to_json(
    bin: (u32, u32),
    occupancy: f64,
    placed: &[PlacedRect],
    unplaced: &[String],
) -> Value {
    json!({
        "bin": {"w": bin.0, "h": bin.1},
        "occupancy": occupancy,
        "placed": placed,
        "unplaced": unplaced,
    })
}

/// File stem of the `index`-th atlas: `<template>[@<scale>x][_<index>]`.
///
/// The scale suffix is omitted for 1x and the index suffix for the first atlas.
pub fn atlas_file_stem(template: &str, scale: u32, index: usize) -> String {
    let mut stem = template.to_string();
    if scale != 1 {
        stem.push_str(&format!("@{scale}x"));
    }
    if index != 0 {
        stem.push_str(&format!("_{index}"));
    }
    stem
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use binpack_core::prelude::*;
use binpack_core::{atlas_file_stem, layout_to_json, manifest_to_json};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "binpack",
    about = "Pack images into square texture atlases with a JSON manifest",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a folder of images into atlas PNG(s) plus JSON manifest(s)
    Pack(PackArgs),
    /// Pack a JSON list of sizes into one bin and print the placements
    Layout(LayoutArgs),
    /// Pack random sizes with every heuristic, print occupancy and time
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output path template; atlases are written as <dest>[@Nx][_n].png/.json
    #[arg(help_heading = "Input/Output")]
    dest: PathBuf,
    /// YAML config file path (overrides the layout options below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Dry run: compute the atlases but do not write files
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    dry_run: bool,

    /// Integer pixel ratio applied to every image
    #[arg(long, default_value_t = 1, help_heading = "Layout")]
    scale: u32,
    /// Transparent pixels around every image
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    padding: u32,
    /// Upper bound for the atlas side
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_side: u32,
    /// Heuristic: bssf|blsf|baf|bl|cp
    #[arg(long, default_value = "cp", value_parser = parse_heuristic, help_heading = "Layout")]
    heuristic: Heuristic,
    /// Strategy: maxrects|guillotine
    #[arg(long, default_value = "maxrects", value_parser = parse_strategy, help_heading = "Layout")]
    strategy: Strategy,
    /// Never rotate images
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    no_rotation: bool,
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    /// JSON file with `[{"name","width","height"}, ...]`
    sizes: PathBuf,
    #[arg(long)]
    width: u32,
    #[arg(long)]
    height: u32,
    /// Heuristic: bssf|blsf|baf|bl|cp
    #[arg(long, default_value = "bssf", value_parser = parse_heuristic)]
    heuristic: Heuristic,
    /// Strategy: maxrects|guillotine
    #[arg(long, default_value = "maxrects", value_parser = parse_strategy)]
    strategy: Strategy,
    /// Never rotate rectangles
    #[arg(long, default_value_t = false)]
    no_rotation: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Number of random rectangles
    #[arg(long, default_value_t = 200)]
    count: usize,
    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Bin side
    #[arg(long, default_value_t = 1024)]
    side: u32,
    /// Strategy: maxrects|guillotine
    #[arg(long, default_value = "maxrects", value_parser = parse_strategy)]
    strategy: Strategy,
}

/// Optional overrides read from `--config`; unset keys keep the CLI value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlConfig {
    heuristic: Option<String>,
    strategy: Option<String>,
    allow_rotation: Option<bool>,
    scale: Option<u32>,
    padding: Option<u32>,
    max_side: Option<u32>,
    side_slack_per_scale: Option<u32>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> anyhow::Result<AtlasConfig> {
        if let Some(v) = self.heuristic {
            cfg.heuristic = parse_heuristic(&v).map_err(|e| anyhow!(e))?;
        }
        if let Some(v) = self.strategy {
            cfg.strategy = parse_strategy(&v).map_err(|e| anyhow!(e))?;
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.scale {
            cfg.scale = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.max_side {
            cfg.max_side = v;
        }
        if let Some(v) = self.side_slack_per_scale {
            cfg.side_slack_per_scale = v;
        }
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
        Commands::Bench(args) => run_bench(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = AtlasConfig {
        heuristic: cli.heuristic,
        strategy: cli.strategy,
        allow_rotation: !cli.no_rotation,
        scale: cli.scale,
        padding: cli.padding,
        max_side: cli.max_side,
        ..AtlasConfig::default()
    };
    if let Some(path) = &cli.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_atlas_config(cfg)?;
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let sources = load_sources_with_progress(&cli.input, &paths, show_progress)?;
    if sources.is_empty() {
        anyhow::bail!("no images found under {}", cli.input.display());
    }
    info!(count = sources.len(), "loaded input images");

    let start = Instant::now();
    let atlases = pack_atlases(&sources, &cfg).context("pack atlases")?;
    info!(atlases = atlases.len(), elapsed = %fmt_dur(start.elapsed()), "packing done");

    if !cli.dry_run {
        if let Some(parent) = cli.dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
    }

    let template = cli.dest.to_string_lossy().into_owned();
    let mut rotated = 0;
    for atlas in &atlases {
        let stem = atlas_file_stem(&template, cfg.scale, atlas.index);
        let png_path = PathBuf::from(format!("{stem}.png"));
        let json_path = PathBuf::from(format!("{stem}.json"));
        rotated += atlas.rotated_count();
        info!(
            index = atlas.index,
            side = atlas.side,
            images = atlas.manifest.len(),
            occupancy = %format!("{:.2}%", atlas.occupancy * 100.0),
            "atlas"
        );
        if cli.dry_run {
            continue;
        }
        atlas
            .rgba
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        fs::write(&json_path, manifest_to_json(&atlas.manifest)?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?png_path, ?json_path, "atlas written");
    }
    info!(rotated, "rotated images");
    Ok(())
}

fn run_layout(args: &LayoutArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.sizes)
        .with_context(|| format!("read {}", args.sizes.display()))?;
    let requests: Vec<RectSize> = serde_json::from_str(&text)
        .with_context(|| format!("parse sizes from {}", args.sizes.display()))?;
    let names: Vec<String> = requests.iter().map(|r| r.name.clone()).collect();

    let cfg = PackerConfig::builder()
        .with_dimensions(args.width, args.height)
        .strategy(args.strategy)
        .heuristic(args.heuristic)
        .allow_rotation(!args.no_rotation)
        .build();
    let mut packer = BinPacker::from_config(&cfg)?;
    let placed = packer.insert_batch(requests, cfg.heuristic)?;

    let unplaced = unplaced_names(names, &placed);
    if !unplaced.is_empty() {
        warn!(count = unplaced.len(), "rectangles not in bin");
    }

    let value = layout_to_json((args.width, args.height), packer.occupancy()?, &placed, &unplaced);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Requested names minus one occurrence per placement, in request order.
fn unplaced_names(requested: Vec<String>, placed: &[PlacedRect]) -> Vec<String> {
    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for p in placed {
        *remaining.entry(p.name.as_str()).or_default() += 1;
    }
    requested
        .into_iter()
        .filter(|n| match remaining.get_mut(n.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

fn run_bench(args: &BenchArgs) -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let max = (args.side / 8).max(2);
    let requests: Vec<RectSize> = (0..args.count)
        .map(|i| {
            let w = rng.gen_range(1..=max);
            let h = rng.gen_range(1..=max);
            RectSize::new(format!("r{i}"), w, h)
        })
        .collect();

    for heuristic in Heuristic::ALL {
        let mut packer = BinPacker::new(args.strategy);
        packer.init(args.side, args.side)?;
        let start = Instant::now();
        let placed = packer.insert_batch(requests.clone(), heuristic)?;
        let dur = start.elapsed();
        println!(
            "{:<4} placed={}/{} occupancy={:.2}% time={}",
            heuristic.short_name(),
            placed.len(),
            requests.len(),
            packer.occupancy()? * 100.0,
            fmt_dur(dur)
        );
    }
    Ok(())
}

fn parse_heuristic(s: &str) -> Result<Heuristic, String> {
    s.parse()
        .map_err(|_| format!("unknown heuristic: {s} (expected bssf|blsf|baf|bl|cp)"))
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse()
        .map_err(|_| format!("unknown strategy: {s} (expected maxrects|guillotine)"))
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if exclude.is_some_and(|ex| ex.is_match(&s)) {
        return true;
    }
    include.is_some_and(|inc| !inc.is_match(&s))
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

/// Source key: path relative to the input root with `/` separators.
fn source_key(root: &Path, p: &Path) -> String {
    let rel = match p.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => Path::new(p.file_name().unwrap_or(p.as_os_str())),
    };
    rel.to_string_lossy().replace('\\', "/")
}

fn load_sources_with_progress(
    root: &Path,
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<BitmapSource>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => list.push(BitmapSource::new(source_key(root, p), img)),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_relative_to_the_input_root() {
        let root = Path::new("assets");
        assert_eq!(source_key(root, Path::new("assets/ui/ok.png")), "ui/ok.png");
        assert_eq!(source_key(Path::new("assets/a.png"), Path::new("assets/a.png")), "a.png");
    }

    #[test]
    fn yaml_overrides_only_present_keys() {
        let y: YamlConfig = serde_yaml::from_str("heuristic: baf\npadding: 3\n").unwrap();
        let cfg = y.into_atlas_config(AtlasConfig::default()).unwrap();
        assert_eq!(cfg.heuristic, Heuristic::BestAreaFit);
        assert_eq!(cfg.padding, 3);
        assert_eq!(cfg.scale, 1);
        assert!(cfg.allow_rotation);
    }

    #[test]
    fn unplaced_counts_repeated_names() {
        let placed = vec![
            PlacedRect {
                name: "tile".into(),
                x: 0,
                y: 0,
                width: 2,
                height: 2,
                rotated: false,
            },
            PlacedRect {
                name: String::new(),
                x: 2,
                y: 0,
                width: 2,
                height: 2,
                rotated: false,
            },
        ];
        let requested = vec![
            "tile".to_string(),
            "tile".to_string(),
            String::new(),
            String::new(),
            "big".to_string(),
        ];
        assert_eq!(
            unplaced_names(requested, &placed),
            vec!["tile".to_string(), String::new(), "big".to_string()]
        );
    }

    #[test]
    fn globs_filter_paths() {
        let inc = build_globset(&["**/*.png".into()]).unwrap();
        let exc = build_globset(&["**/skip/**".into()]).unwrap();
        assert!(!should_skip(Path::new("a/b.png"), inc.as_ref(), exc.as_ref()));
        assert!(should_skip(Path::new("a/b.jpg"), inc.as_ref(), exc.as_ref()));
        assert!(should_skip(Path::new("a/skip/c.png"), inc.as_ref(), exc.as_ref()));
    }
}

//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use calframe_export::{RasterOptions, SvgMetadata, render_raster, to_svg};
use calframe_geometry::quality::reference_print_size;
use calframe_geometry::{
    EditorConfig, ImageId, Offset, Placement, QualityEstimate, RenderPlan, RenderTarget, Size,
    SnapshotEntry, SourceRegion, Transform, estimate_quality,
};
use calframe_io::{DraftSession, DraftStore, JsonDirStore, Template};
use serde::Serialize;

use crate::args::{Extent, PlacementArgs, Target, TransformArgs, parse_hex_color};

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Error serializing output: {e}"))?;
    println!("{json}");
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ImageReport {
    path: PathBuf,
    id: ImageId,
    width: u32,
    height: u32,
    aspect: f64,
    reference_print_in: Size,
    base_dpi: f64,
}

/// Print identifier, dimensions, and native print resolution per image.
pub fn inspect(images: &[PathBuf], json: bool, config: &EditorConfig) -> Result<(), String> {
    let cache = calframe_io::DimensionCache::new();
    let mut reports = Vec::with_capacity(images.len());
    for path in images {
        let bytes = read_file(path)?;
        let id = calframe_io::content_id(&bytes);
        let dims = cache
            .get_or_read(&id, &bytes)
            .map_err(|e| format!("Error loading {}: {e}", path.display()))?;
        let print = reference_print_size(dims, config);
        let size = dims.to_size();
        reports.push(ImageReport {
            path: path.clone(),
            id,
            width: dims.width,
            height: dims.height,
            aspect: size.aspect(),
            reference_print_in: print,
            base_dpi: (size.width / print.width).min(size.height / print.height),
        });
    }

    if json {
        return print_json(&reports);
    }
    for r in &reports {
        println!(
            "{}: {}x{} (aspect {:.3}), id {}, {:.1}x{:.1} in at {:.0} dpi",
            r.path.display(),
            r.width,
            r.height,
            r.aspect,
            r.id,
            r.reference_print_in.width,
            r.reference_print_in.height,
            r.base_dpi,
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanReport {
    transform: Transform,
    effective_frame: Size,
    min_covering_scale: f64,
    max_scale: f64,
    relative_scale: f64,
    offset_limits: Offset,
    plan: RenderPlan,
    affine: [f64; 6],
    visible: Option<SourceRegion>,
}

fn container_plan(
    placement: &Placement,
    target: Target,
    container: Extent,
) -> Result<RenderPlan, String> {
    RenderPlan::for_placement(placement, RenderTarget::from(target), container.size()?)
        .ok_or_else(|| "container has no area".to_owned())
}

/// Print the placement constraints and the render plan for a container.
pub fn plan(
    placement_args: &PlacementArgs,
    target: Target,
    container: Extent,
    json: bool,
    config: &EditorConfig,
) -> Result<(), String> {
    let placement = placement_args.placement(config)?;
    let plan = container_plan(&placement, target, container)?;
    let report = PlanReport {
        transform: placement.transform(),
        effective_frame: placement.effective_frame(),
        min_covering_scale: placement.min_covering_scale(),
        max_scale: placement.max_scale(config),
        relative_scale: placement.relative_scale(),
        offset_limits: placement.offset_limits(),
        plan,
        affine: plan.source_to_container().to_array(),
        visible: plan.visible_source_region(),
    };

    if json {
        return print_json(&report);
    }

    let mut out = String::new();
    let t = report.transform;
    let _ = writeln!(
        out,
        "transform: scale {:.6}, rotation {}, offset ({:.4}, {:.4})",
        t.scale, t.rotation, t.offset_x, t.offset_y
    );
    let _ = writeln!(
        out,
        "effective frame {}, cover {:.6}, max {:.6}, relative {:.4}",
        report.effective_frame, report.min_covering_scale, report.max_scale, report.relative_scale
    );
    let _ = writeln!(
        out,
        "offset limits: +/-{:.4} x, +/-{:.4} y",
        report.offset_limits.x, report.offset_limits.y
    );
    let f = plan.frame_rect;
    let _ = writeln!(
        out,
        "frame rect: ({:.2}, {:.2}) {:.2}x{:.2} at {:.4} px/unit",
        f.x, f.y, f.width, f.height, plan.pixels_per_unit
    );
    let m = report.affine;
    let _ = writeln!(
        out,
        "matrix: [{:.6} {:.6} {:.6} {:.6} {:.3} {:.3}]",
        m[0], m[1], m[2], m[3], m[4], m[5]
    );
    if let Some(region) = report.visible {
        let b = region.bounds;
        let _ = writeln!(
            out,
            "visible source: ({:.1}, {:.1}) {:.1}x{:.1} px ({:.1}% x {:.1}%)",
            b.x,
            b.y,
            b.width,
            b.height,
            region.fraction.width * 100.0,
            region.fraction.height * 100.0
        );
    }
    print!("{out}");
    Ok(())
}

// ---------------------------------------------------------------------------
// quality
// ---------------------------------------------------------------------------

/// Print the print-quality estimate of a placement.
pub fn quality(
    placement_args: &PlacementArgs,
    json: bool,
    config: &EditorConfig,
) -> Result<(), String> {
    let placement = placement_args.placement(config)?;
    let estimate: QualityEstimate = estimate_quality(
        placement.source(),
        &placement.transform(),
        placement.frame(),
        config,
    );
    if json {
        return print_json(&estimate);
    }
    println!(
        "{} ({:.0} dpi, score {}/10 at {:.2}x zoom)",
        estimate.status,
        estimate.effective_dpi,
        estimate.quality_score,
        placement.relative_scale()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Options of the render subcommand.
pub struct RenderOptions<'a> {
    pub target: Target,
    pub container: Extent,
    pub output: &'a Path,
    pub background: Option<&'a str>,
    pub title: Option<&'a str>,
}

/// Write the composition to an SVG (by extension) or raster file.
pub fn render(
    placement_args: &PlacementArgs,
    options: &RenderOptions<'_>,
    config: &EditorConfig,
) -> Result<(), String> {
    let image_path = placement_args
        .image
        .as_ref()
        .ok_or_else(|| "render needs --image".to_owned())?;
    let placement = placement_args.placement(config)?;
    let plan = container_plan(&placement, options.target, options.container)?;

    let is_svg = options
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        let bytes = read_file(image_path)?;
        let entry = SnapshotEntry::from_placement(
            "cli",
            calframe_io::content_id(&bytes),
            &placement,
        );
        let placement_json = serde_json::to_string(&entry)
            .map_err(|e| format!("Error serializing placement: {e}"))?;
        let href = image_path.to_string_lossy();
        let svg = to_svg(
            &plan,
            &href,
            &SvgMetadata {
                title: options.title,
                description: None,
                placement_json: Some(&placement_json),
                background: options.background,
            },
        );
        std::fs::write(options.output, &svg)
            .map_err(|e| format!("Error writing {}: {e}", options.output.display()))?;
        eprintln!(
            "SVG written to {} ({} bytes)",
            options.output.display(),
            svg.len()
        );
        return Ok(());
    }

    let background = options.background.map(parse_hex_color).transpose()?;
    let source = image::open(image_path)
        .map_err(|e| format!("Error decoding {}: {e}", image_path.display()))?
        .to_rgba8();
    let out = render_raster(&source, &plan, &RasterOptions { background })
        .map_err(|e| format!("Render error: {e}"))?;
    out.save(options.output)
        .map_err(|e| format!("Error writing {}: {e}", options.output.display()))?;
    eprintln!(
        "Image written to {} ({}x{})",
        options.output.display(),
        out.width(),
        out.height()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// place / snapshot
// ---------------------------------------------------------------------------

/// Add an image to a stored draft (creating the draft on first use) and
/// place it in a slot.
pub fn place(
    store_dir: &Path,
    draft_id: &str,
    template_path: Option<&Path>,
    slot: &str,
    image_path: &Path,
    transform_args: &TransformArgs,
    config: &EditorConfig,
) -> Result<(), String> {
    let store = JsonDirStore::open(store_dir).map_err(|e| e.to_string())?;
    let mut session = match store.load(draft_id).map_err(|e| e.to_string())? {
        Some(persisted) => DraftSession::restore(persisted).map_err(|e| e.to_string())?,
        None => {
            let path = template_path
                .ok_or_else(|| format!("draft {draft_id} does not exist; pass --template"))?;
            let template: Template = serde_json::from_slice(&read_file(path)?)
                .map_err(|e| format!("Error parsing template {}: {e}", path.display()))?;
            let template =
                Template::new(template.id, template.slots).map_err(|e| e.to_string())?;
            DraftSession::new(template)
        }
    };

    let image = calframe_io::load(&read_file(image_path)?)
        .map_err(|e| format!("Error loading {}: {e}", image_path.display()))?;
    session.add_image(image.clone()).map_err(|e| e.to_string())?;
    let assigned = session
        .assign(slot, &image.id)
        .map_err(|e| e.to_string())?;

    let placement =
        crate::args::build_placement(assigned.source(), assigned.frame(), transform_args, config)?;
    session
        .set_transform(slot, placement.transform())
        .map_err(|e| e.to_string())?;
    store
        .save(draft_id, &session.persist())
        .map_err(|e| e.to_string())?;
    eprintln!(
        "Placed {} in slot {slot} of draft {draft_id} ({})",
        image.id,
        store.root().display()
    );
    Ok(())
}

/// Freeze a stored draft into an order snapshot.
pub fn snapshot(store_dir: &Path, draft_id: &str, output: Option<&Path>) -> Result<(), String> {
    let store = JsonDirStore::open(store_dir).map_err(|e| e.to_string())?;
    let persisted = store
        .load(draft_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("draft {draft_id} not found in {}", store.root().display()))?;
    let session = DraftSession::restore(persisted).map_err(|e| e.to_string())?;
    let snapshot = session.snapshot().map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| format!("Error serializing snapshot: {e}"))?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
            eprintln!(
                "Snapshot with {} entries written to {}",
                snapshot.entries.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

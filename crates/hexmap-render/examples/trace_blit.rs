//! Builds a small two-terrain level, rebuilds the ground cache, and blits
//! two frames into `ground.png`.
//!
//! Run with `cargo run -p hexmap-render --example trace_blit`.

use anyhow::{Context, Result};
use hexmap_grid::{HexLayout, Vec2};
use hexmap_render::ground::{
    GroundModel, GroundRenderer, GroundScene, GroundStyle, Rgba, StrokeStyle, StyleTable,
    TerrainId,
};
use hexmap_render::raster::SoftwareRasterizer;
use hexmap_render::viewbox::ViewBox;
use tiny_skia::Pixmap;

const MEADOW: TerrainId = TerrainId(1);
const DIRT: TerrainId = TerrainId(2);

fn main() -> Result<()> {
    hexmap_render::logging::init_logging(Some("info"));

    let layout = HexLayout::new(16, 10, 60.0);
    let mut model = GroundModel::new();
    for col in 0..16 {
        for row in 0..10 {
            model.place(layout.axial_from_offset(col, row), MEADOW);
        }
    }
    // A dirt patch overlaid in the middle of the meadow.
    for (col, row) in [(6, 4), (7, 4), (8, 4), (7, 5), (8, 5), (8, 3)] {
        model.place(layout.axial_from_offset(col, row), DIRT);
    }

    let styles = StyleTable::new()
        .with(
            MEADOW,
            GroundStyle {
                render_corners: true,
                background: true,
                fill: Some(Rgba::opaque(88, 168, 94)),
                stroke: Some(StrokeStyle { color: Rgba::opaque(56, 120, 64), width: 6.0 }),
            },
        )
        .with(
            DIRT,
            GroundStyle {
                render_corners: false,
                background: false,
                fill: Some(Rgba::opaque(134, 97, 63)),
                stroke: None,
            },
        );

    let mut scene = GroundScene { model, layout, styles };
    let mut view = ViewBox::new(Vec2::new(800.0, 600.0));
    view.coordinates.set(Vec2::new(120.0, 80.0));

    let mut renderer = GroundRenderer::new();
    renderer.activate(&mut scene, &mut view);

    let size = *view.size.get();
    let mut target =
        Pixmap::new(size.x as u32, size.y as u32).context("allocate viewport pixmap")?;
    let mut converter = SoftwareRasterizer;

    let outcome = renderer.draw(&scene, &view, &mut converter, &mut target);
    log::info!(
        "frame 1: {outcome:?}, cache scale {:?}",
        renderer.cache().source_scale()
    );

    // Edit the level: the revision listener drops the cache and the next
    // draw rebuilds it.
    scene.model.place(scene.layout.axial_from_offset(3, 7), DIRT);
    let outcome = renderer.draw(&scene, &view, &mut converter, &mut target);
    log::info!("frame 2 after edit: {outcome:?}");

    target.save_png("ground.png").context("write ground.png")?;
    println!("wrote ground.png");
    Ok(())
}

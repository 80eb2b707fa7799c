/// Generated city block shown when no geometry files are given
use nalgebra::Point2;
use skyline_core::geometry::extrude_footprint;
use skyline_core::{GeometryClass, Layer, PlaneCollection, ViewerConfig};

const BLOCKS_PER_SIDE: usize = 4;
const FOOTPRINT: f64 = 16.0;
const SPACING: f64 = 28.0;

/// Building bodies and roofs of a grid of towers around the origin.
pub fn demo_layers(config: &ViewerConfig) -> Vec<Layer> {
    let mut walls = PlaneCollection::new();
    let mut roofs = PlaneCollection::new();
    let origin = -SPACING * (BLOCKS_PER_SIDE as f64 - 1.0) / 2.0;

    for i in 0..BLOCKS_PER_SIDE {
        for j in 0..BLOCKS_PER_SIDE {
            let x = origin + i as f64 * SPACING - FOOTPRINT / 2.0;
            let y = origin + j as f64 * SPACING - FOOTPRINT / 2.0;
            let height = ((i * 7 + j * 13) % 5 + 1) as f64 * 8.0;
            let footprint = [
                Point2::new(x, y),
                Point2::new(x + FOOTPRINT, y),
                Point2::new(x + FOOTPRINT, y + FOOTPRINT),
                Point2::new(x, y + FOOTPRINT),
            ];

            let building = extrude_footprint(&footprint, 0.0, height);
            for wall in &building.walls {
                walls.add_polygon(wall);
            }
            roofs.add_polygon(&building.roof);
        }
    }

    vec![
        config.building.layer(GeometryClass::Building, walls),
        config.roof.layer(GeometryClass::Roof, roofs),
    ]
}

//! Built-in garment masks
//!
//! All built-in masks are authored against an 800x1000 canvas.

use super::area::{Bounds, CanvasDimensions, GarmentMask, GarmentView, PrintArea, PrintAreaShape};

/// Garment types with a built-in mask
pub const BUILTIN_GARMENTS: [&str; 4] = ["tshirt", "hoodie", "tote", "cap"];

const CANVAS: CanvasDimensions = CanvasDimensions {
    width: 800,
    height: 1000,
};

struct AreaDef {
    id: &'static str,
    name: &'static str,
    bounds: [f32; 4],
    shape: PrintAreaShape,
    view: GarmentView,
}

const fn rect(id: &'static str, name: &'static str, bounds: [f32; 4], view: GarmentView) -> AreaDef {
    AreaDef {
        id,
        name,
        bounds,
        shape: PrintAreaShape::Rectangle,
        view,
    }
}

const TSHIRT: &[AreaDef] = &[
    rect("front-center", "Front Center", [200.0, 200.0, 400.0, 500.0], GarmentView::Front),
    rect("back-center", "Back Center", [200.0, 150.0, 400.0, 550.0], GarmentView::Back),
    rect("left-sleeve", "Left Sleeve", [40.0, 260.0, 120.0, 160.0], GarmentView::Left),
    rect("right-sleeve", "Right Sleeve", [640.0, 260.0, 120.0, 160.0], GarmentView::Right),
];

const HOODIE: &[AreaDef] = &[
    rect("front-chest", "Front Chest", [220.0, 280.0, 360.0, 300.0], GarmentView::Front),
    rect("front-pocket", "Front Pocket", [260.0, 640.0, 280.0, 160.0], GarmentView::Front),
    rect("back-center", "Back Center", [200.0, 200.0, 400.0, 500.0], GarmentView::Back),
];

const TOTE: &[AreaDef] = &[
    rect("front-panel", "Front Panel", [150.0, 300.0, 500.0, 500.0], GarmentView::Front),
    rect("back-panel", "Back Panel", [150.0, 300.0, 500.0, 500.0], GarmentView::Back),
];

const CAP: &[AreaDef] = &[
    AreaDef {
        id: "front-crown",
        name: "Front Crown",
        bounds: [250.0, 350.0, 300.0, 300.0],
        shape: PrintAreaShape::Circle,
        view: GarmentView::Front,
    },
    rect("back-strap", "Back Strap", [300.0, 600.0, 200.0, 80.0], GarmentView::Back),
];

fn table(garment_type: &str) -> Option<(&'static str, &'static [AreaDef])> {
    match garment_type {
        "tshirt" => Some(("tshirt", TSHIRT)),
        "hoodie" => Some(("hoodie", HOODIE)),
        "tote" => Some(("tote", TOTE)),
        "cap" => Some(("cap", CAP)),
        _ => None,
    }
}

/// Look up the built-in mask for a garment type
pub fn builtin_mask(garment_type: &str) -> Option<GarmentMask> {
    let (garment, defs) = table(garment_type)?;
    let print_areas = defs
        .iter()
        .map(|def| {
            let [x, y, width, height] = def.bounds;
            PrintArea {
                id: def.id.to_string(),
                name: def.name.to_string(),
                bounds: Bounds::new(x, y, width, height),
                shape: def.shape,
                garment_type: garment.to_string(),
                garment_view: def.view,
            }
        })
        .collect();

    Some(GarmentMask {
        garment_type: garment.to_string(),
        print_areas,
        canvas_dimensions: CANVAS,
    })
}

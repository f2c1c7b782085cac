//! Heat-map layers and map viewports.
//!
//! Each category group becomes one heat layer. Layer colors come from a
//! fixed cycle of gradient presets, so the same group order always yields
//! the same colors.

use crime_dashboard_models::{BoundingBox, GroupedMapData, RegionSelection};
use serde::Serialize;

/// A gradient as `(stop, color)` pairs in ascending stop order.
pub type Gradient = &'static [(f64, &'static str)];

/// Gradient presets, assigned to layers round-robin.
pub const GRADIENT_PRESETS: [Gradient; 5] = [
    &[
        (0.2, "blue"),
        (0.4, "cyan"),
        (0.6, "lime"),
        (0.8, "orange"),
        (1.0, "red"),
    ],
    &[(0.2, "purple"), (0.5, "pink"), (0.8, "red"), (1.0, "darkred")],
    &[(0.2, "green"), (0.5, "yellow"), (0.8, "orange"), (1.0, "red")],
    &[(0.2, "navy"), (0.5, "blue"), (0.8, "aqua"), (1.0, "lime")],
    &[(0.2, "brown"), (0.5, "orange"), (0.8, "red"), (1.0, "black")],
];

/// Map center when no region is selected, as `(lat, lng)`.
pub const DEFAULT_CENTER: (f64, f64) = (22.5937, 78.9629);

/// Zoom level when no region is selected.
pub const DEFAULT_ZOOM: u8 = 5;

/// Approximate bounds of each region as `(name, south-west, north-east)`
/// with corners in `(lat, lng)`.
const REGION_BOUNDS: &[(&str, (f64, f64), (f64, f64))] = &[
    ("Andhra Pradesh", (12.0, 76.0), (19.0, 84.5)),
    ("Arunachal Pradesh", (26.9, 91.2), (29.3, 97.1)),
    ("Assam", (24.0, 89.4), (28.3, 96.0)),
    ("Bihar", (24.0, 83.0), (27.5, 88.0)),
    ("Chhattisgarh", (17.5, 80.0), (24.0, 84.5)),
    ("Goa", (14.8, 73.7), (15.8, 74.2)),
    ("Gujarat", (20.0, 68.0), (24.8, 74.5)),
    ("Haryana", (27.6, 74.5), (30.9, 77.5)),
    ("Himachal Pradesh", (30.3, 75.9), (33.3, 79.5)),
    ("Jharkhand", (22.0, 83.0), (25.5, 87.5)),
    ("Karnataka", (11.5, 74.0), (18.5, 78.6)),
    ("Kerala", (8.0, 74.0), (12.8, 77.5)),
    ("Madhya Pradesh", (21.0, 74.0), (26.9, 82.0)),
    ("Maharashtra", (15.6, 72.6), (22.1, 80.9)),
    ("Manipur", (23.8, 93.0), (25.9, 94.8)),
    ("Meghalaya", (25.0, 89.8), (26.3, 92.0)),
    ("Mizoram", (21.9, 92.6), (24.3, 93.3)),
    ("Nagaland", (25.6, 93.4), (27.3, 95.3)),
    ("Odisha", (17.8, 81.3), (22.7, 87.5)),
    ("Punjab", (29.3, 73.8), (32.3, 76.9)),
    ("Rajasthan", (23.3, 69.3), (30.1, 78.0)),
    ("Sikkim", (27.0, 88.0), (28.0, 88.9)),
    ("Tamil Nadu", (8.0, 76.0), (13.5, 80.3)),
    ("Telangana", (15.7, 77.0), (19.5, 81.0)),
    ("Tripura", (22.5, 91.0), (24.0, 92.0)),
    ("Uttar Pradesh", (24.0, 77.0), (30.0, 84.0)),
    ("Uttarakhand", (28.9, 77.5), (31.2, 81.0)),
    ("West Bengal", (21.5, 85.0), (27.0, 89.9)),
    ("Andaman & Nicobar Islands", (6.5, 92.0), (13.0, 93.0)),
    ("Chandigarh", (30.7, 76.7), (30.8, 76.8)),
    (
        "Dadra & Nagar Haveli and Daman & Diu",
        (20.0, 72.8),
        (21.5, 73.5),
    ),
    ("Delhi", (28.4, 76.8), (28.9, 77.4)),
    ("Jammu & Kashmir", (32.2, 72.5), (36.9, 80.0)),
    ("Ladakh", (32.5, 76.0), (36.0, 78.5)),
    ("Lakshadweep", (10.0, 71.0), (12.0, 73.5)),
    ("Puducherry", (11.9, 79.7), (12.0, 79.9)),
];

/// One weighted heat-map point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    /// `count / max count of the layer`, in `0.0..=1.0`.
    pub intensity: f64,
}

/// Render-ready heat layer of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatLayer {
    pub category: String,
    pub gradient: Gradient,
    pub points: Vec<HeatPoint>,
}

/// Builds one heat layer per non-empty category group, in group order.
///
/// The i-th group gets `GRADIENT_PRESETS[i % 5]`, counting empty groups, so
/// a layer's color depends only on its position in the grouping.
#[must_use]
pub fn build_heat_layers(grouped: &GroupedMapData) -> Vec<HeatLayer> {
    grouped
        .iter()
        .enumerate()
        .filter(|(_, (_, records))| !records.is_empty())
        .map(|(i, (category, records))| {
            let max = records.iter().map(|r| r.count).fold(0.0_f64, f64::max);
            let points = records
                .iter()
                .map(|r| HeatPoint {
                    lat: r.lat,
                    lng: r.lng,
                    intensity: if max > 0.0 { r.count / max } else { 0.0 },
                })
                .collect();

            HeatLayer {
                category: category.to_string(),
                gradient: GRADIENT_PRESETS[i % GRADIENT_PRESETS.len()],
                points,
            }
        })
        .collect()
}

/// Bounds of a named region, if known.
#[must_use]
pub fn region_bounds(name: &str) -> Option<BoundingBox> {
    REGION_BOUNDS
        .iter()
        .find(|(region, _, _)| *region == name)
        .map(|&(_, south_west, north_east)| BoundingBox::from_corners(south_west, north_east))
}

/// What the map should show for a region selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    /// Fit the map to these bounds.
    Fit(BoundingBox),
    /// Center on a point at a fixed zoom.
    Center {
        lat: f64,
        lng: f64,
        zoom: u8,
    },
}

impl Viewport {
    /// Viewport for `region`. Unknown regions fall back to the default
    /// view.
    #[must_use]
    pub fn for_region(region: &RegionSelection) -> Self {
        region.name().and_then(region_bounds).map_or(
            Self::Center {
                lat: DEFAULT_CENTER.0,
                lng: DEFAULT_CENTER.1,
                zoom: DEFAULT_ZOOM,
            },
            Self::Fit,
        )
    }
}

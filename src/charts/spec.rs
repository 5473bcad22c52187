//! Declarative Chart Specifications
//! Map layers and bar charts described as plain data, shaped after deck.gl
//! layer props so they serialize directly to a deck JSON document.

use crate::config::ViewportPolicy;
use crate::data::{Industry, RegionBoundary, Ring};
use crate::stats::{CategoryCount, Histogram, LocationFrequency};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;

pub const MAP_STYLE: &str = "mapbox://styles/mapbox/light-v9";
/// Half-width in degrees of the displayed map window.
pub const VIEW_HALF_SPAN: f64 = 10.0;

const COLUMN_RADIUS: f64 = 2000.0;
const COLUMN_ELEVATION_SCALE: f64 = 3000.0;
const COLUMN_ELEVATION_RANGE: [f64; 2] = [2000.0, 3000.0];
const REGION_ELEVATION_SCALE: f64 = 200.0;

/// Camera position over the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl ViewState {
    pub const JAPAN_CENTER: (f64, f64) = (36.2048, 138.2529);

    pub fn centered(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            zoom: 6.0,
            pitch: 45.0,
            min_zoom: 4.5,
            max_zoom: 7.0,
        }
    }

    pub fn japan() -> Self {
        Self::centered(Self::JAPAN_CENTER.0, Self::JAPAN_CENTER.1)
    }

    /// View for the configured policy. The data midpoint is the arithmetic
    /// mean of `coordinates`; with no coordinates the fixed view is used.
    pub fn for_policy(
        policy: ViewportPolicy,
        coordinates: impl IntoIterator<Item = (f64, f64)>,
    ) -> Self {
        match policy {
            ViewportPolicy::Fixed => Self::japan(),
            ViewportPolicy::DataMidpoint => {
                let (mut lat_sum, mut lon_sum, mut n) = (0.0, 0.0, 0usize);
                for (lat, lon) in coordinates {
                    lat_sum += lat;
                    lon_sum += lon;
                    n += 1;
                }
                if n == 0 {
                    Self::japan()
                } else {
                    Self::centered(lat_sum / n as f64, lon_sum / n as f64)
                }
            }
        }
    }

    pub fn longitude_range(&self) -> [f64; 2] {
        [self.longitude - VIEW_HALF_SPAN, self.longitude + VIEW_HALF_SPAN]
    }

    pub fn latitude_range(&self) -> [f64; 2] {
        [self.latitude - VIEW_HALF_SPAN, self.latitude + VIEW_HALF_SPAN]
    }
}

/// One extruded column on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDatum {
    /// `[longitude, latitude]`
    pub position: [f64; 2],
    pub elevation: f64,
    pub fill_color: [u8; 4],
    pub records: u64,
    pub region: String,
}

impl ColumnDatum {
    pub fn tooltip(&self) -> String {
        format!("{} Hired Foreigners in {}", self.records, self.region)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayer {
    pub id: String,
    pub data: Vec<ColumnDatum>,
    pub radius: f64,
    pub elevation_scale: f64,
    pub elevation_range: [f64; 2],
    pub pickable: bool,
    pub auto_highlight: bool,
}

impl ColumnLayer {
    /// Columns at each location; height `log_frequency + 1`, red channel
    /// scaled by `max_percentage`.
    pub fn from_locations(locations: &[LocationFrequency]) -> Self {
        let data = locations
            .iter()
            .map(|row| ColumnDatum {
                position: [row.longitude, row.latitude],
                elevation: row.log_frequency + 1.0,
                fill_color: [
                    (row.max_percentage * 250.0 + 120.0).clamp(0.0, 255.0) as u8,
                    100,
                    100,
                    220,
                ],
                records: row.records,
                region: row.region.clone(),
            })
            .collect();

        Self {
            id: "location-frequency".to_string(),
            data,
            radius: COLUMN_RADIUS,
            elevation_scale: COLUMN_ELEVATION_SCALE,
            elevation_range: COLUMN_ELEVATION_RANGE,
            pickable: true,
            auto_highlight: true,
        }
    }
}

/// A region polygon extruded by its hire count.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    pub name: String,
    pub polygons: Vec<Ring>,
    pub hires: u32,
    pub fill_color: [u8; 4],
}

impl RegionShape {
    pub fn tooltip(&self) -> String {
        format!("{} Hired Foreigners in {}", self.hires, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoJsonLayer {
    pub id: String,
    pub data: FeatureCollection,
    pub opacity: f64,
    pub filled: bool,
    pub stroked: bool,
    pub extruded: bool,
    pub wireframe: bool,
    pub elevation_scale: f64,
    pub pickable: bool,
    #[serde(skip)]
    pub shapes: Vec<RegionShape>,
}

impl GeoJsonLayer {
    /// Region polygons for the selected industry, or all hires when unfiltered.
    pub fn from_boundaries(boundaries: &[RegionBoundary], industry: Option<Industry>) -> Self {
        let max = boundaries
            .iter()
            .map(|b| b.hires(industry))
            .max()
            .unwrap_or(0);

        let shapes: Vec<RegionShape> = boundaries
            .iter()
            .map(|b| {
                let hires = b.hires(industry);
                let pct = if max > 0 {
                    hires as f64 / max as f64
                } else {
                    0.0
                };
                RegionShape {
                    name: b.name.clone(),
                    polygons: b.polygons.clone(),
                    hires,
                    fill_color: [255, (255.0 - 200.0 * pct) as u8, 140, 200],
                }
            })
            .collect();

        let features = shapes.iter().map(region_feature).collect();

        Self {
            id: "region-hires".to_string(),
            data: FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
            opacity: 0.8,
            filled: true,
            stroked: false,
            extruded: true,
            wireframe: true,
            elevation_scale: REGION_ELEVATION_SCALE,
            pickable: true,
            shapes,
        }
    }
}

fn region_feature(shape: &RegionShape) -> Feature {
    let polygons: Vec<Vec<Vec<Vec<f64>>>> = shape
        .polygons
        .iter()
        .map(|ring| vec![ring.iter().map(|p| vec![p[0], p[1]]).collect()])
        .collect();

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), shape.name.clone().into());
    properties.insert("hires".to_string(), shape.hires.into());
    properties.insert("elevation".to_string(), shape.hires.into());
    properties.insert(
        "fill_color".to_string(),
        serde_json::Value::from(shape.fill_color.to_vec()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::MultiPolygon(polygons))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "@@type")]
pub enum Layer {
    ColumnLayer(ColumnLayer),
    GeoJsonLayer(GeoJsonLayer),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub text: String,
    pub background_color: String,
    pub color: String,
}

/// Complete map description: view, layers and tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckSpec {
    pub map_style: String,
    pub initial_view_state: ViewState,
    pub layers: Vec<Layer>,
    pub tooltip: Tooltip,
}

impl DeckSpec {
    pub fn new(view_state: ViewState, layers: Vec<Layer>) -> Self {
        Self {
            map_style: MAP_STYLE.to_string(),
            initial_view_state: view_state,
            layers,
            tooltip: Tooltip {
                text: "{records} Hired Foreigners in {region}".to_string(),
                background_color: "steelblue".to_string(),
                color: "white".to_string(),
            },
        }
    }

    pub fn column_layer(&self) -> Option<&ColumnLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::ColumnLayer(l) => Some(l),
            _ => None,
        })
    }

    pub fn region_layer(&self) -> Option<&GeoJsonLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::GeoJsonLayer(l) => Some(l),
            _ => None,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One bar: x position, optional category label, height.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSpec {
    pub x: f64,
    pub label: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bar_width: f64,
    pub bars: Vec<BarSpec>,
}

impl BarChartSpec {
    /// Bars at each bin's left edge.
    pub fn from_histogram(title: &str, x_label: &str, y_label: &str, hist: &Histogram) -> Self {
        let bar_width = match hist.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 1.0,
        };
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            bar_width,
            bars: hist
                .bars()
                .map(|(x, count)| BarSpec {
                    x,
                    label: None,
                    value: count as f64,
                })
                .collect(),
        }
    }

    /// One bar per category, in the given order, at x = 0, 1, 2, ...
    pub fn from_categories(title: &str, y_label: &str, totals: &[CategoryCount]) -> Self {
        Self {
            title: title.to_string(),
            x_label: String::new(),
            y_label: y_label.to_string(),
            bar_width: 0.7,
            bars: totals
                .iter()
                .enumerate()
                .map(|(i, total)| BarSpec {
                    x: i as f64,
                    label: Some(total.label.clone()),
                    value: total.display_value,
                })
                .collect(),
        }
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{HistogramSpec, StatsCalculator};

    fn location(lat: f64, lon: f64, records: u64, pct: f64) -> LocationFrequency {
        LocationFrequency {
            latitude: lat,
            longitude: lon,
            region: "Kyoto".to_string(),
            records,
            log_frequency: 1.5,
            max_percentage: pct,
        }
    }

    #[test]
    fn column_colors_saturate_at_full_red() {
        let layer = ColumnLayer::from_locations(&[
            location(35.0, 135.0, 3, 1.0),
            location(36.0, 136.0, 1, 0.2),
        ]);
        assert_eq!(layer.data[0].position, [135.0, 35.0]);
        assert_eq!(layer.data[0].fill_color, [255, 100, 100, 220]);
        assert_eq!(layer.data[1].fill_color[0], 170);
        assert_eq!(layer.data[0].elevation, 2.5);
        assert_eq!(layer.data[0].tooltip(), "3 Hired Foreigners in Kyoto");
    }

    #[test]
    fn viewport_policies() {
        let fixed = ViewState::for_policy(ViewportPolicy::Fixed, [(10.0, 10.0)]);
        assert_eq!(fixed, ViewState::japan());

        let midpoint =
            ViewState::for_policy(ViewportPolicy::DataMidpoint, [(34.0, 134.0), (36.0, 136.0)]);
        assert_eq!((midpoint.latitude, midpoint.longitude), (35.0, 135.0));
        assert_eq!(midpoint.longitude_range(), [125.0, 145.0]);

        let empty = ViewState::for_policy(ViewportPolicy::DataMidpoint, std::iter::empty());
        assert_eq!(empty, ViewState::japan());
    }

    #[test]
    fn region_layer_scales_by_selected_industry() {
        let boundary = |name: &str, education: u32, total: u32| {
            let mut industry_hires = [0; Industry::ALL.len()];
            industry_hires[Industry::Education as usize] = education;
            RegionBoundary {
                name: name.to_string(),
                polygons: vec![vec![[139.0, 35.0], [140.0, 35.0], [140.0, 36.0]]],
                industry_hires,
                total_hires: total,
            }
        };
        let boundaries = [boundary("Tokyo", 4, 10), boundary("Osaka", 8, 5)];

        let all = GeoJsonLayer::from_boundaries(&boundaries, None);
        assert_eq!(all.shapes[0].hires, 10);
        assert_eq!(all.shapes[0].fill_color[1], 55);

        let education = GeoJsonLayer::from_boundaries(&boundaries, Some(Industry::Education));
        assert_eq!(education.shapes[1].hires, 8);
        assert_eq!(education.data.features.len(), 2);
        assert_eq!(education.shapes[1].tooltip(), "8 Hired Foreigners in Osaka");
    }

    #[test]
    fn deck_serializes_with_layer_types() {
        let deck = DeckSpec::new(
            ViewState::japan(),
            vec![Layer::ColumnLayer(ColumnLayer::from_locations(&[location(
                35.0, 135.0, 3, 1.0,
            )]))],
        );
        let json: serde_json::Value = serde_json::from_str(&deck.to_json().unwrap()).unwrap();
        assert_eq!(json["layers"][0]["@@type"], "ColumnLayer");
        assert_eq!(json["initial_view_state"]["pitch"], 45.0);
        assert!(deck.region_layer().is_none());
        assert_eq!(deck.column_layer().unwrap().data.len(), 1);
    }

    #[test]
    fn histogram_bars_use_bin_width() {
        let hist = StatsCalculator::histogram([1870.0], &HistogramSpec::linear(20, 1867.0, 1912.0));
        let chart = BarChartSpec::from_histogram("Hires", "Year", "Count", &hist);
        assert_eq!(chart.bars.len(), 20);
        assert!((chart.bar_width - 2.25).abs() < 1e-9);
        assert_eq!(chart.max_value(), 1.0);
    }
}

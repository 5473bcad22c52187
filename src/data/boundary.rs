//! Region boundary loading from GeoJSON.

use crate::data::loader::LoaderError;
use crate::data::schema::Industry;
use geojson::{GeoJson, JsonObject, Value};

/// Outer ring of a polygon as `[longitude, latitude]` pairs.
pub type Ring = Vec<[f64; 2]>;

/// A named region polygon annotated with precomputed hire counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBoundary {
    pub name: String,
    pub polygons: Vec<Ring>,
    pub industry_hires: [u32; Industry::ALL.len()],
    pub total_hires: u32,
}

impl RegionBoundary {
    /// Hire count for one industry, or the total when no industry is selected.
    pub fn hires(&self, industry: Option<Industry>) -> u32 {
        match industry {
            Some(industry) => self.industry_hires[industry as usize],
            None => self.total_hires,
        }
    }
}

/// Parse a GeoJSON FeatureCollection of region polygons.
///
/// Features without a name property or without polygon geometry are skipped.
pub fn load_boundaries(
    bytes: &[u8],
    name_property: &str,
) -> Result<Vec<RegionBoundary>, LoaderError> {
    let text = std::str::from_utf8(bytes).map_err(|e| LoaderError::Boundaries(e.to_string()))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| LoaderError::Boundaries(e.to_string()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(LoaderError::Boundaries(
                "document must be a FeatureCollection".to_string(),
            ))
        }
    };

    let mut regions = Vec::new();
    let mut skipped = 0usize;

    for feature in collection.features {
        let Some(properties) = feature.properties.as_ref() else {
            skipped += 1;
            continue;
        };
        let Some(name) = property_string(properties, name_property) else {
            skipped += 1;
            continue;
        };

        let polygons = match feature.geometry.map(|g| g.value) {
            Some(Value::Polygon(rings)) => outer_rings(std::iter::once(rings)),
            Some(Value::MultiPolygon(polys)) => outer_rings(polys.into_iter()),
            _ => Vec::new(),
        };
        if polygons.is_empty() {
            log::warn!("Region '{}' has no polygon geometry, skipping", name);
            skipped += 1;
            continue;
        }

        let mut industry_hires = [0u32; Industry::ALL.len()];
        for industry in Industry::ALL {
            industry_hires[industry as usize] = property_count(properties, industry.column());
        }

        regions.push(RegionBoundary {
            name,
            polygons,
            industry_hires,
            total_hires: property_count(properties, "total"),
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {} boundary features", skipped);
    }
    log::info!("Loaded {} region boundaries", regions.len());

    Ok(regions)
}

fn outer_rings(polygons: impl Iterator<Item = Vec<Vec<Vec<f64>>>>) -> Vec<Ring> {
    polygons
        .filter_map(|rings| rings.into_iter().next())
        .map(|ring| {
            ring.into_iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| [pos[0], pos[1]])
                .collect::<Ring>()
        })
        .filter(|ring| ring.len() >= 3)
        .collect()
}

fn property_string(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn property_count(properties: &JsonObject, key: &str) -> u32 {
    match properties.get(key) {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"region_eng": "Tokyo", "education": 12, "military": 3.0, "total": 40},
                "geometry": {"type": "Polygon", "coordinates": [[[139.0, 35.0], [140.0, 35.0], [140.0, 36.0], [139.0, 35.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"region_eng": "Hokkaido", "total": "7"},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[141.0, 42.0], [142.0, 42.0], [142.0, 43.0], [141.0, 42.0]]],
                    [[[143.0, 43.0], [144.0, 43.0], [144.0, 44.0], [143.0, 43.0]]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"total": 1},
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"region_eng": "Nowhere"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            }
        ]
    }"#;

    #[test]
    fn loads_named_polygon_features() {
        let regions = load_boundaries(REGIONS.as_bytes(), "region_eng").unwrap();
        assert_eq!(regions.len(), 2);

        let tokyo = &regions[0];
        assert_eq!(tokyo.name, "Tokyo");
        assert_eq!(tokyo.polygons.len(), 1);
        assert_eq!(tokyo.polygons[0][1], [140.0, 35.0]);
        assert_eq!(tokyo.hires(Some(Industry::Education)), 12);
        assert_eq!(tokyo.hires(Some(Industry::Military)), 3);
        assert_eq!(tokyo.hires(Some(Industry::Trade)), 0);
        assert_eq!(tokyo.hires(None), 40);

        let hokkaido = &regions[1];
        assert_eq!(hokkaido.polygons.len(), 2);
        assert_eq!(hokkaido.total_hires, 7);
    }

    #[test]
    fn rejects_non_collections() {
        let point = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(matches!(
            load_boundaries(point.as_bytes(), "region_eng"),
            Err(LoaderError::Boundaries(_))
        ));
        assert!(load_boundaries(b"not json", "region_eng").is_err());
    }
}

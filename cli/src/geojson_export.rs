use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use road_network::RoadNetworkResult;

/// Writes every piece and junction surface, plus the trace if there is one, as a GeoJSON
/// FeatureCollection in world-space meters.
pub fn write(path: &str, result: &RoadNetworkResult) -> Result<()> {
    let mut features = Vec::new();
    for piece in result.all_pieces() {
        features.push(feature(
            piece.polygon.to_geojson(),
            vec![
                ("type", "piece".into()),
                ("id", piece.id.to_string().into()),
                ("length", piece.length().inner_meters().into()),
            ],
        ));
    }
    for node in result.nodes.values() {
        if let Some(ref surface) = node.surface {
            features.push(feature(
                surface.polygon.to_geojson(),
                vec![
                    ("type", "junction".into()),
                    ("id", node.id.to_string().into()),
                    ("degree", node.degree().into()),
                ],
            ));
        }
    }
    if let Some(ref trace) = result.trace {
        for (kind, polygon) in trace.polygons() {
            features.push(feature(polygon.to_geojson(), vec![("type", kind.into())]));
        }
        for apex in trace.apexes() {
            features.push(feature(
                Geometry::new(Value::Point(vec![apex.x(), apex.y()])),
                vec![("type", "apex".into())],
            ));
        }
    }
    info!("Exporting {} features", features.len());

    let gj = GeoJson::from(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });
    fs_err::write(path, serde_json::to_string_pretty(&gj)?)?;
    info!("Wrote {}", path);
    Ok(())
}

fn feature(geometry: Geometry, props: Vec<(&str, JsonValue)>) -> Feature {
    let mut properties = Map::new();
    for (k, v) in props {
        properties.insert(k.to_string(), v);
    }
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}


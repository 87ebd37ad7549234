use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use geo::{Geometry, Point};
use geojson::{Feature, FeatureCollection};
use kml::{Kml, KmlWriter};
use wkt::{ToWkt, TryFromWkt};

use crate::columns::WKT_COLUMNS;
use crate::table::Table;

/// All geometry in and out of this tool is tagged with this reference
/// system and never reprojected.
pub const CRS: &str = "EPSG:4326";

/// A table with a parsed geometry per row.
pub struct GeoTable {
    pub table: Table,
    pub geometry: Vec<Option<Geometry<f64>>>,
    pub crs: &'static str,
    // set when the geometry was derived from a lon/lat column pair, in
    // which case CSV export appends a geometry column of WKT text
    from_lon_lat: bool,
}

/// Builds a [`GeoTable`] from a processed table: the first recognized
/// WKT column that parses for at least one row wins; otherwise the
/// first `lon`/`lat` column pair is read as point coordinates.
pub fn assemble(table: Table) -> GeoTable {
    if let Some(index) = table
        .columns
        .iter()
        .position(|c| WKT_COLUMNS.contains(&c.to_lowercase().as_str()))
    {
        let geometry: Vec<Option<Geometry<f64>>> = table
            .rows
            .iter()
            .map(|row| {
                row[index]
                    .as_deref()
                    .and_then(|text| Geometry::try_from_wkt_str(text).ok())
            })
            .collect();
        if geometry.iter().any(Option::is_some) {
            return GeoTable {
                table,
                geometry,
                crs: CRS,
                from_lon_lat: false,
            };
        }
        eprintln!(
            "Warning: WKT column '{}' found but no row could be parsed",
            table.columns[index]
        );
    }

    let lon = table
        .columns
        .iter()
        .position(|c| c.to_lowercase().contains("lon"));
    let lat = table
        .columns
        .iter()
        .position(|c| c.to_lowercase().contains("lat"));
    if let (Some(lon), Some(lat)) = (lon, lat) {
        let geometry = table
            .rows
            .iter()
            .map(|row| {
                let x = row[lon].as_deref()?.parse::<f64>().ok()?;
                let y = row[lat].as_deref()?.parse::<f64>().ok()?;
                Some(Geometry::Point(Point::new(x, y)))
            })
            .collect();
        return GeoTable {
            table,
            geometry,
            crs: CRS,
            from_lon_lat: true,
        };
    }

    eprintln!("Warning: no geometry information found (WKT or lat/lon); GeoJSON/KML export will not work");
    let geometry = vec![None; table.rows.len()];
    GeoTable {
        table,
        geometry,
        crs: CRS,
        from_lon_lat: false,
    }
}

impl GeoTable {
    pub fn has_geometry(&self) -> bool {
        self.geometry.iter().any(Option::is_some)
    }
}

pub fn write_csv(geotable: &GeoTable, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = geotable.table.columns.clone();
    if geotable.from_lon_lat {
        header.push("geometry".to_string());
    }
    writer.write_record(&header)?;
    for (row, geometry) in geotable.table.rows.iter().zip(&geotable.geometry) {
        let mut record: Vec<String> = row
            .iter()
            .map(|cell| cell.clone().unwrap_or_default())
            .collect();
        if geotable.from_lon_lat {
            record.push(
                geometry
                    .as_ref()
                    .map(|g| g.wkt_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_geojson(geotable: &GeoTable, path: &Path) -> Result<(), Box<dyn Error>> {
    if !geotable.has_geometry() {
        return Err("table has no geometry; cannot export GeoJSON".into());
    }

    let features: Vec<Feature> = geotable
        .table
        .rows
        .iter()
        .zip(&geotable.geometry)
        .map(|(row, geometry)| {
            let mut properties = serde_json::Map::new();
            for (name, cell) in geotable.table.columns.iter().zip(row) {
                // the geometry column is carried as the feature geometry,
                // not duplicated as a text property
                if name.eq_ignore_ascii_case("geometry") {
                    continue;
                }
                let value = cell
                    .clone()
                    .map(serde_json::Value::String)
                    .unwrap_or(serde_json::Value::Null);
                properties.insert(name.clone(), value);
            }
            Feature {
                bbox: None,
                geometry: geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &collection)?;
    Ok(())
}

pub fn write_kml(geotable: &GeoTable, path: &Path) -> Result<(), Box<dyn Error>> {
    if !geotable.has_geometry() {
        return Err("table has no geometry; cannot export KML".into());
    }

    let name_index = geotable.table.column_index("name");
    let mut elements: Vec<Kml<f64>> = Vec::new();
    for (row, geometry) in geotable.table.rows.iter().zip(&geotable.geometry) {
        let Some(geometry) = geometry else { continue };
        let Some(kml_geometry) = geometry_to_kml(geometry) else {
            continue;
        };
        elements.push(Kml::Placemark(kml::types::Placemark {
            name: name_index.and_then(|i| row[i].clone()),
            geometry: Some(kml_geometry),
            ..Default::default()
        }));
    }

    let document = Kml::Document {
        attrs: HashMap::new(),
        elements,
    };
    let mut file = File::create(path)?;
    let mut writer = KmlWriter::from_writer(&mut file);
    writer.write(&document)?;
    Ok(())
}

fn geometry_to_kml(geometry: &Geometry<f64>) -> Option<kml::types::Geometry<f64>> {
    use kml::types::Geometry as KmlGeometry;
    match geometry {
        Geometry::Point(point) => Some(KmlGeometry::Point(kml_point(point))),
        Geometry::Polygon(polygon) => Some(KmlGeometry::Polygon(kml_polygon(polygon))),
        Geometry::LineString(line) => Some(KmlGeometry::LineString(kml::types::LineString {
            coords: line.coords().map(kml_coord).collect(),
            ..Default::default()
        })),
        Geometry::MultiPoint(points) => Some(KmlGeometry::MultiGeometry(
            kml::types::MultiGeometry {
                geometries: points
                    .0
                    .iter()
                    .map(|p| KmlGeometry::Point(kml_point(p)))
                    .collect(),
                ..Default::default()
            },
        )),
        Geometry::MultiPolygon(polygons) => Some(KmlGeometry::MultiGeometry(
            kml::types::MultiGeometry {
                geometries: polygons
                    .0
                    .iter()
                    .map(|p| KmlGeometry::Polygon(kml_polygon(p)))
                    .collect(),
                ..Default::default()
            },
        )),
        _ => None,
    }
}

fn kml_coord(coord: &geo::Coord<f64>) -> kml::types::Coord<f64> {
    kml::types::Coord {
        x: coord.x,
        y: coord.y,
        z: None,
    }
}

fn kml_point(point: &Point<f64>) -> kml::types::Point<f64> {
    kml::types::Point {
        coord: kml::types::Coord {
            x: point.x(),
            y: point.y(),
            z: None,
        },
        ..Default::default()
    }
}

fn kml_ring(ring: &geo::LineString<f64>) -> kml::types::LinearRing<f64> {
    kml::types::LinearRing {
        coords: ring.coords().map(kml_coord).collect(),
        ..Default::default()
    }
}

fn kml_polygon(polygon: &geo::Polygon<f64>) -> kml::types::Polygon<f64> {
    kml::types::Polygon {
        outer: kml_ring(polygon.exterior()),
        inner: polygon.interiors().iter().map(kml_ring).collect(),
        ..Default::default()
    }
}

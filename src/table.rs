use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use geo::{Coord, Geometry, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use geojson::GeoJson;
use kml::Kml;
use wkt::ToWkt;

use crate::columns::{column_role, ColumnRole};
use crate::formatter::{apply_n_times, format_coord};
use crate::normalizer::process_wkt;

/// A column-ordered table of optional text cells. `None` marks a null
/// cell (missing property, empty spreadsheet cell).
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Applies the configured transform to every recognized column:
/// longitude/latitude cells go through the coordinate formatter, WKT
/// cells through the geometry normalizer, `passes` times each. All
/// other columns and null cells pass through untouched.
pub fn process_columns(table: &mut Table, passes: usize) {
    let roles: Vec<Option<ColumnRole>> = table.columns.iter().map(|c| column_role(c)).collect();
    for row in &mut table.rows {
        for (cell, role) in row.iter_mut().zip(&roles) {
            let Some(role) = role else { continue };
            if let Some(value) = cell.take() {
                *cell = Some(match role {
                    ColumnRole::Longitude | ColumnRole::Latitude => {
                        apply_n_times(|v: String| format_coord(&v), value, passes)
                    }
                    ColumnRole::Wkt => apply_n_times(|v: String| process_wkt(&v), value, passes),
                });
            }
        }
    }
}

pub fn load_csv(path: &Path) -> Result<Table, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
            .collect();
        row.truncate(columns.len());
        row.resize(columns.len(), None);
        rows.push(row);
    }
    Ok(Table { columns, rows })
}

pub fn load_excel(path: &Path) -> Result<Table, Box<dyn Error>> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_owned();
    let first_sheet = sheet_names
        .first()
        .ok_or("workbook contains no sheets")?
        .clone();
    let range = workbook.worksheet_range(&first_sheet)?;

    let mut row_iter = range.rows();
    let Some(header) = row_iter.next() else {
        return Ok(Table {
            columns: Vec::new(),
            rows: Vec::new(),
        });
    };
    let columns: Vec<String> = header
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();

    let mut rows = Vec::new();
    for sheet_row in row_iter {
        let mut row: Vec<Option<String>> = sheet_row.iter().map(cell_text).collect();
        row.truncate(columns.len());
        row.resize(columns.len(), None);
        rows.push(row);
    }
    Ok(Table { columns, rows })
}

// Numeric cells take their natural display form, so a whole-number
// cell comes out as "3" and gets the integer formatting rule.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => (!s.is_empty()).then(|| s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn load_geojson(path: &Path) -> Result<Table, Box<dyn Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let geojson = GeoJson::from_reader(reader)?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err("expected a GeoJSON FeatureCollection".into());
    };

    // property keys in first-seen order, geometry as WKT text last
    let mut columns: Vec<String> = Vec::new();
    for feature in &collection.features {
        if let Some(properties) = &feature.properties {
            for key in properties.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns.push("geometry".to_string());

    let mut rows = Vec::new();
    for feature in &collection.features {
        let mut row: Vec<Option<String>> = Vec::with_capacity(columns.len());
        for name in &columns[..columns.len() - 1] {
            let value = feature.properties.as_ref().and_then(|p| p.get(name));
            row.push(value.and_then(json_cell));
        }
        row.push(feature.geometry.as_ref().and_then(|g| {
            Geometry::<f64>::try_from(g.value.clone())
                .ok()
                .map(|geometry| geometry.wkt_string())
        }));
        rows.push(row);
    }
    Ok(Table { columns, rows })
}

fn json_cell(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn load_kml(path: &Path) -> Result<Table, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    let parsed: Kml<f64> = content.parse()?;

    let mut placemarks = Vec::new();
    collect_placemarks(&parsed, &mut placemarks);

    let columns = vec![
        "name".to_string(),
        "description".to_string(),
        "geometry".to_string(),
    ];
    let rows = placemarks
        .iter()
        .map(|placemark| {
            vec![
                placemark.name.clone(),
                placemark.description.clone(),
                placemark
                    .geometry
                    .as_ref()
                    .and_then(kml_geometry)
                    .map(|geometry| geometry.wkt_string()),
            ]
        })
        .collect();
    Ok(Table { columns, rows })
}

fn collect_placemarks<'a>(node: &'a Kml<f64>, out: &mut Vec<&'a kml::types::Placemark<f64>>) {
    match node {
        Kml::KmlDocument(document) => {
            for element in &document.elements {
                collect_placemarks(element, out);
            }
        }
        Kml::Document { elements, .. } => {
            for element in elements {
                collect_placemarks(element, out);
            }
        }
        Kml::Folder(folder) => {
            for element in &folder.elements {
                collect_placemarks(element, out);
            }
        }
        Kml::Placemark(placemark) => out.push(placemark),
        _ => {}
    }
}

fn kml_geometry(geometry: &kml::types::Geometry<f64>) -> Option<Geometry<f64>> {
    use kml::types::Geometry as KmlGeometry;
    match geometry {
        KmlGeometry::Point(point) => {
            Some(Geometry::Point(Point::new(point.coord.x, point.coord.y)))
        }
        KmlGeometry::Polygon(polygon) => Some(Geometry::Polygon(kml_polygon(polygon))),
        KmlGeometry::LineString(line) => Some(Geometry::LineString(LineString::new(
            line.coords
                .iter()
                .map(|c| Coord { x: c.x, y: c.y })
                .collect(),
        ))),
        KmlGeometry::LinearRing(ring) => Some(Geometry::LineString(kml_ring(ring))),
        KmlGeometry::MultiGeometry(multi) => {
            // uniform member types fold to the matching multi-geometry
            let members: Vec<Geometry<f64>> = multi
                .geometries
                .iter()
                .filter_map(kml_geometry)
                .collect();
            if members.len() != multi.geometries.len() {
                return None;
            }
            if members.iter().all(|g| matches!(g, Geometry::Point(_))) {
                let points = members
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::Point(p) => Some(p),
                        _ => None,
                    })
                    .collect();
                Some(Geometry::MultiPoint(MultiPoint(points)))
            } else if members.iter().all(|g| matches!(g, Geometry::Polygon(_))) {
                let polygons = members
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::Polygon(p) => Some(p),
                        _ => None,
                    })
                    .collect();
                Some(Geometry::MultiPolygon(MultiPolygon(polygons)))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn kml_ring(ring: &kml::types::LinearRing<f64>) -> LineString<f64> {
    LineString::new(
        ring.coords
            .iter()
            .map(|c| Coord { x: c.x, y: c.y })
            .collect(),
    )
}

fn kml_polygon(polygon: &kml::types::Polygon<f64>) -> Polygon<f64> {
    let exterior = kml_ring(&polygon.outer);
    let interiors = polygon.inner.iter().map(kml_ring).collect();
    Polygon::new(exterior, interiors)
}

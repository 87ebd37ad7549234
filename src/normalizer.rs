use geo::{Coord, Geometry, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use wkt::{ToWkt, TryFromWkt};

use crate::diagnostics::note_unformatted;
use crate::formatter::format_coord;

// One coordinate axis: out through text, through the formatting rule,
// and back. A value that will not parse back stays as it was.
fn format_axis(value: f64) -> f64 {
    format_coord(&value.to_string()).parse().unwrap_or(value)
}

fn process_point(point: &Point<f64>) -> Point<f64> {
    Point::new(format_axis(point.x()), format_axis(point.y()))
}

fn process_ring(ring: &LineString<f64>) -> LineString<f64> {
    let was_closed = ring.is_closed();
    let mut coords: Vec<Coord<f64>> = ring
        .coords()
        .map(|c| Coord {
            x: format_axis(c.x),
            y: format_axis(c.y),
        })
        .collect();
    // A closed ring's duplicated closing vertex is copied from the
    // formatted first vertex, not formatted independently, so the ring
    // stays exactly closed.
    if was_closed && coords.len() > 1 {
        let first = coords[0];
        if let Some(last) = coords.last_mut() {
            *last = first;
        }
    }
    LineString::new(coords)
}

fn process_polygon(polygon: &Polygon<f64>) -> Polygon<f64> {
    let exterior = process_ring(polygon.exterior());
    let interiors: Vec<LineString<f64>> =
        polygon.interiors().iter().map(process_ring).collect();
    Polygon::new(exterior, interiors)
}

/// Applies the coordinate formatter to every vertex of a WKT geometry.
///
/// Points, polygons and their multi variants are rebuilt with formatted
/// vertices and serialized back to WKT. Text that does not parse, and
/// any other geometry variant, comes back unchanged.
pub fn process_wkt(text: &str) -> String {
    let geometry = match Geometry::<f64>::try_from_wkt_str(text) {
        Ok(g) => g,
        Err(_) => {
            note_unformatted();
            return text.to_string();
        }
    };

    match geometry {
        Geometry::Point(point) => Geometry::Point(process_point(&point)).wkt_string(),
        Geometry::Polygon(polygon) => Geometry::Polygon(process_polygon(&polygon)).wkt_string(),
        Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon(
            polygons.0.iter().map(process_polygon).collect(),
        ))
        .wkt_string(),
        Geometry::MultiPoint(points) => {
            Geometry::MultiPoint(MultiPoint(points.0.iter().map(process_point).collect()))
                .wkt_string()
        }
        _ => {
            note_unformatted();
            text.to_string()
        }
    }
}

/// Role a recognized column plays in coordinate processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Longitude,
    Latitude,
    Wkt,
}

// Accepted column names per role. The `longitute`/`latitute` spellings
// appear in real supplier files and are recognized as-is.
pub const LONGITUDE_COLUMNS: &[&str] = &["long", "longitude", "plot_longitude", "longitute"];

pub const LATITUDE_COLUMNS: &[&str] = &["lat", "latitude", "plot_latitude", "latitute"];

pub const WKT_COLUMNS: &[&str] = &[
    "gps_point",
    "gps_polygon",
    "plot_gps_point",
    "plot_gps_polygon",
    "plot_wkt",
    "wkt",
    "geometry",
];

/// Look up the role of a column by name, case-insensitively.
pub fn column_role(name: &str) -> Option<ColumnRole> {
    let lower = name.to_lowercase();
    if LONGITUDE_COLUMNS.contains(&lower.as_str()) {
        Some(ColumnRole::Longitude)
    } else if LATITUDE_COLUMNS.contains(&lower.as_str()) {
        Some(ColumnRole::Latitude)
    } else if WKT_COLUMNS.contains(&lower.as_str()) {
        Some(ColumnRole::Wkt)
    } else {
        None
    }
}

use std::fs;
use std::path::Path;

use coord_formatter::{geotable, process_file};

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn csv_with_lon_lat_columns_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(
        dir.path(),
        "plots.csv",
        "farmer_name,long,lat\nAsha,3,-1.25\nBenjamin,36.8219,-1.2921\n",
    );

    let geotable = process_file(&input, 2).expect("process csv");
    assert_eq!(geotable.table.rows.len(), 2);
    assert_eq!(geotable.crs, "EPSG:4326");
    assert_eq!(geotable.table.rows[0][1].as_deref(), Some("3.000001"));
    assert_eq!(geotable.table.rows[0][2].as_deref(), Some("-1.250001"));
    assert_eq!(geotable.table.rows[1][1].as_deref(), Some("36.821901"));

    let out = dir.path().join("plots_out.csv");
    geotable::write_csv(&geotable, &out).expect("export csv");
    let written = fs::read_to_string(&out).expect("read export");
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("farmer_name,long,lat,geometry"));
    let first = lines.next().expect("data row");
    assert!(first.starts_with("Asha,3.000001,-1.250001,"), "row: {first}");
    let lon: f64 = first.split(',').nth(1).unwrap().parse().expect("parses");
    assert_eq!(lon, 3.000001);
}

#[test]
fn csv_with_wkt_column_normalizes_every_vertex() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(
        dir.path(),
        "polygons.csv",
        "plot_id,plot_gps_polygon\n7,\"POLYGON((36.8 -1.3,36.9 -1.3,36.9 -1.2,36.8 -1.3))\"\n",
    );

    let geotable = process_file(&input, 2).expect("process csv");
    let wkt = geotable.table.rows[0][1].as_deref().expect("wkt cell");
    assert!(wkt.contains("36.800001"), "wkt: {wkt}");
    assert!(wkt.contains("-1.300001"), "wkt: {wkt}");
    assert!(geotable.has_geometry());
}

#[test]
fn malformed_wkt_cells_survive_the_pipeline() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(
        dir.path(),
        "broken.csv",
        "plot_id,plot_wkt,long,lat\n1,NOT A GEOMETRY,5,6\n",
    );

    let geotable = process_file(&input, 2).expect("process csv");
    assert_eq!(geotable.table.rows[0][1].as_deref(), Some("NOT A GEOMETRY"));
    // the unparseable WKT column falls back to the lon/lat pair
    assert!(geotable.has_geometry());
    assert_eq!(geotable.table.rows[0][2].as_deref(), Some("5.000001"));
}

#[test]
fn geojson_input_exports_processed_geojson() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(
        dir.path(),
        "plots.geojson",
        r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "farmer_name": "Asha", "plot_id": 7 },
      "geometry": { "type": "Point", "coordinates": [36.8, -1.3] }
    }
  ]
}"#,
    );

    let geotable = process_file(&input, 2).expect("process geojson");
    let wkt = geotable
        .table
        .rows[0]
        .last()
        .and_then(|c| c.as_deref())
        .expect("geometry cell");
    assert!(wkt.contains("36.800001"), "wkt: {wkt}");

    let out = dir.path().join("plots_out.geojson");
    geotable::write_geojson(&geotable, &out).expect("export geojson");
    let written = fs::read_to_string(&out).expect("read export");
    let parsed: geojson::GeoJson = written.parse().expect("valid GeoJSON");
    let geojson::GeoJson::FeatureCollection(collection) = parsed else {
        panic!("expected a feature collection");
    };
    let geometry = collection.features[0].geometry.as_ref().expect("geometry");
    let geojson::Value::Point(coordinates) = &geometry.value else {
        panic!("expected a point");
    };
    assert_eq!(coordinates[0], 36.800001);
    assert_eq!(coordinates[1], -1.300001);
}

#[test]
fn geojson_property_columns_keep_source_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(
        dir.path(),
        "ordered.geojson",
        r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "plot_id": 7, "farmer_name": "Asha", "area_ha": 1.2 },
      "geometry": { "type": "Point", "coordinates": [36.8, -1.3] }
    }
  ]
}"#,
    );

    let geotable = process_file(&input, 2).expect("process geojson");
    assert_eq!(
        geotable.table.columns,
        vec!["plot_id", "farmer_name", "area_ha", "geometry"],
        "property columns should keep the order they appear in the file"
    );
}

#[test]
fn kml_input_exports_processed_kml() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(
        dir.path(),
        "plots.kml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Plot A</name>
      <Point><coordinates>36.8,-1.3</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#,
    );

    let geotable = process_file(&input, 2).expect("process kml");
    assert_eq!(geotable.table.rows[0][0].as_deref(), Some("Plot A"));
    let wkt = geotable.table.rows[0][2].as_deref().expect("geometry cell");
    assert!(wkt.contains("36.800001"), "wkt: {wkt}");

    let out = dir.path().join("plots_out.kml");
    geotable::write_kml(&geotable, &out).expect("export kml");
    let written = fs::read_to_string(&out).expect("read export");
    assert!(written.contains("Plot A"), "kml: {written}");
    assert!(written.contains("36.800001"), "kml: {written}");
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(dir.path(), "plots.txt", "irrelevant");
    assert!(process_file(&input, 2).is_err());
}

#[test]
fn single_pass_matches_double_pass_on_clean_input() {
    // values already at six digits are stable under extra passes
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_file(
        dir.path(),
        "clean.csv",
        "long,lat\n36.821901,-1.292101\n",
    );
    let once = process_file(&input, 1).expect("one pass");
    let twice = process_file(&input, 2).expect("two passes");
    assert_eq!(
        once.table.rows[0][0], twice.table.rows[0][0],
        "six-digit values should not drift between passes"
    );
}

use std::error::Error;
use std::path::Path;

pub mod columns;
pub mod diagnostics;
pub mod formatter;
pub mod geotable;
pub mod normalizer;
pub mod table;

pub use geotable::GeoTable;
pub use table::Table;

pub enum InputFormat {
    Csv,
    Excel,
    GeoJson,
    Kml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<InputFormat> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "csv" => Some(InputFormat::Csv),
            "xlsx" | "xls" => Some(InputFormat::Excel),
            "geojson" | "json" => Some(InputFormat::GeoJson),
            "kml" => Some(InputFormat::Kml),
            _ => None,
        }
    }
}

pub fn load_table(path: &Path, format: InputFormat) -> Result<Table, Box<dyn Error>> {
    match format {
        InputFormat::Csv => table::load_csv(path),
        InputFormat::Excel => table::load_excel(path),
        InputFormat::GeoJson => table::load_geojson(path),
        InputFormat::Kml => table::load_kml(path),
    }
}

/// Loads a file, formats its coordinate columns with the given number
/// of passes and assembles the geometry-aware table.
pub fn process_file(path: &Path, passes: usize) -> Result<GeoTable, Box<dyn Error>> {
    let format = InputFormat::from_path(path)
        .ok_or_else(|| format!("unsupported file format: {}", path.display()))?;
    let mut table = load_table(path, format)?;
    table::process_columns(&mut table, passes);
    Ok(geotable::assemble(table))
}

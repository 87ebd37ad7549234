use clap::{Arg, Command};
use coord_formatter::{diagnostics, geotable, process_file};
use std::error::Error;
use std::path::{Path, PathBuf};

fn main() {
    let matches = Command::new("Coordinate Formatter")
        .version("1.0")
        .about("Formats plot coordinates to six decimal places for EUDR submissions")
        .arg(
            Arg::new("files")
                .short('f')
                .long("files")
                .num_args(1..)
                .required(true)
                .help("Input files to process (CSV, Excel, GeoJSON or KML)"),
        )
        .arg(
            Arg::new("output-format")
                .short('F')
                .long("output-format")
                .num_args(1)
                .default_value("csv")
                .help("Output format: csv, geojson or kml"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .num_args(1)
                .default_value("output")
                .help("Directory for processed files"),
        )
        .arg(
            Arg::new("passes")
                .short('p')
                .long("passes")
                .num_args(1)
                .default_value("2")
                .help("Number of formatting passes applied to each value"),
        )
        .get_matches();

    let files: Vec<PathBuf> = matches
        .get_many::<String>("files")
        .unwrap()
        .map(PathBuf::from)
        .collect();
    let output_format = matches
        .get_one::<String>("output-format")
        .unwrap()
        .to_lowercase();
    let output_dir = PathBuf::from(matches.get_one::<String>("output").unwrap());
    let passes = match matches.get_one::<String>("passes").unwrap().parse::<usize>() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: invalid number of passes");
            std::process::exit(1);
        }
    };

    if !["csv", "geojson", "kml"].contains(&output_format.as_str()) {
        eprintln!("Error: unsupported output format: {output_format}");
        std::process::exit(1);
    }

    // Validate that input files exist
    for file in &files {
        if !file.exists() {
            eprintln!("Error: File not found: {}", file.display());
            std::process::exit(1);
        }
    }

    match run(&files, &output_format, &output_dir, passes) {
        Ok(_) => println!("Processing completed successfully"),
        Err(e) => {
            eprintln!("Error processing files: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(
    files: &[PathBuf],
    output_format: &str,
    output_dir: &Path,
    passes: usize,
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(output_dir)?;
    diagnostics::reset_unformatted();

    for (index, file) in files.iter().enumerate() {
        println!(
            "Processing file {}/{}: {}",
            index + 1,
            files.len(),
            file.display()
        );
        let geotable = process_file(file, passes)?;

        let file_stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("processed");
        let output_path = output_dir.join(format!("{file_stem}_processed.{output_format}"));
        match output_format {
            "csv" => geotable::write_csv(&geotable, &output_path)?,
            "geojson" => geotable::write_geojson(&geotable, &output_path)?,
            _ => geotable::write_kml(&geotable, &output_path)?,
        }
        println!(
            "Written {} rows to {}",
            geotable.table.rows.len(),
            output_path.display()
        );
    }

    let unformatted = diagnostics::unformatted_count();
    if unformatted > 0 {
        println!("{unformatted} values were left unformatted");
    }
    Ok(())
}

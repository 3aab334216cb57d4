use gridwatch::{aggregate, parse_records};
use std::{env, fs, path::Path, process::exit};

const SAMPLE_ROWS: usize = 4;

fn main() {
    // Expect a CSV path and an optional developer needle.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <CSV_FILE> [DEVELOPER_NEEDLE]", args[0]);
        exit(1);
    }
    let needle = args.get(2).map(String::as_str).unwrap_or("Greenko");
    if let Err(e) = inspect_csv(Path::new(&args[1]), needle) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print the header list, parse counts, a few sample records and how many
/// records name `needle` as developer.
fn inspect_csv(path: &Path, needle: &str) -> anyhow::Result<()> {
    let bytes = fs::read(path)?;
    let table = parse_records(&bytes);

    println!("=== CSV File: {} ===", path.display());
    println!("Size on disk:      {} bytes", bytes.len());
    println!("Records parsed:    {}", table.records.len());
    println!("Lines skipped:     {}", table.errors);
    println!();

    println!("=== Headers ===");
    for (i, h) in table.headers.iter().enumerate() {
        println!("{:>3}. {}", i + 1, h);
    }
    println!();

    println!("=== Sample Records ===");
    for record in table.records.iter().take(SAMPLE_ROWS) {
        println!("{}", serde_json::to_string(record)?);
    }
    println!();

    println!(
        "Records with developer matching {:?}: {}",
        needle,
        aggregate::count_matching_developer(&table.records, needle)
    );
    Ok(())
}

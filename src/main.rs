use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;
use std::sync::Arc;

use dtaus_batch::{
    CurrencyRegistry, DtaCharset, FileStorage, PaymentTypeRegistry, PhysicalFile, StorageFormat,
    ValidationPipeline,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut path: Option<String> = None;
    let mut format = StorageFormat::Disk;
    let mut json = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--tape" => format = StorageFormat::Tape,
            "--json" => json = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other if other.starts_with('-') => {
                bail!("unknown option: {}", other);
            }
            other => {
                if path.is_some() {
                    bail!("only one file may be given");
                }
                path = Some(other.to_string());
            }
        }
    }

    let Some(path) = path else {
        print_usage();
        std::process::exit(2);
    };

    run_analyse(Path::new(&path), format, json)
}

fn print_usage() {
    println!("Usage: dtaus-batch <file> [--tape] [--json]");
    println!();
    println!("Analyse a payment batch file: decode every record, recompute");
    println!("every checksum, and report what was found.");
    println!();
    println!("  --tape   150-byte blocks instead of 128-byte disk blocks");
    println!("  --json   machine-readable report on stdout");
}

fn run_analyse(path: &Path, format: StorageFormat, json: bool) -> Result<()> {
    let storage = FileStorage::open_read_only(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let pipeline = Arc::new(ValidationPipeline::standard(
        Arc::new(CurrencyRegistry::new()),
        Arc::new(PaymentTypeRegistry::new()),
    ));
    let mut physical = PhysicalFile::open(storage, format, Arc::new(DtaCharset::new()), pipeline)
        .with_context(|| format!("cannot decode {}", path.display()))?;

    let report = physical.analyse()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("📄 {} ({})", path.display(), format.name());
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("✓ {}", report.summary());
        for (index, offset) in physical.logical_file_offsets().iter().enumerate() {
            let file = physical.get_logical_file(index)?;
            let header = file.header();
            println!(
                "  [{}] @{}: {} {} txs, checksum amount {}",
                index,
                offset,
                header.file_type.code(),
                file.transaction_count(),
                file.checksum().amount_sum,
            );
        }
        if report.is_clean() {
            println!("✅ No diagnostics");
        } else {
            for diag in &report.diagnostics {
                println!("❌ {}: {}", diag.field, diag.message);
            }
        }
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

use std::{env, fs, path::Path, process};

use anyhow::{Context, Result};
use serde_json::Value;
use storefront_layout_engine::{deserialize, optimize, stats};

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: storefront-layout-cli <command> <page.json>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  blocks    Print the ordered block list a renderer would see");
    eprintln!("  optimize  Print the canonicalized document (stats on stderr)");
    process::exit(1);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (command, path) = match args.as_slice() {
        [_, command, path] => (command.as_str(), Path::new(path)),
        _ => print_usage_and_exit(),
    };

    match command {
        "blocks" => print_blocks(path),
        "optimize" => print_optimized(path),
        _ => print_usage_and_exit(),
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_blocks(path: &Path) -> Result<()> {
    let document = read_document(path)?;
    let blocks = deserialize(&document);
    if blocks.is_empty() {
        println!("(empty page)");
        return Ok(());
    }
    for block in &blocks {
        println!(
            "{:>3}  {:<14} {} prop(s)",
            block.order.unwrap_or_default(),
            block.block_type,
            block.props.len()
        );
    }
    Ok(())
}

fn print_optimized(path: &Path) -> Result<()> {
    let document = read_document(path)?;
    let raw: Value = serde_json::from_str(&document)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let report = stats(&raw);
    println!("{}", optimize(&raw));
    eprintln!(
        "original: {} bytes, optimized: {} bytes, saved: {} bytes ({:.1}%)",
        report.original_len, report.optimized_len, report.saved, report.saved_percent
    );
    Ok(())
}

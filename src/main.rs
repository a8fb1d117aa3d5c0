use anyhow::Result;
use std::env;

use retail_clean::data;

fn main() -> Result<()> {
    env_logger::init();

    let base_dir = env::current_dir()?;
    let outputs_dir = data::ensure_outputs_dir(&base_dir)?;

    let dataset_path = data::resolve_dataset_path(&base_dir)?;
    let table = data::load_and_clean(&dataset_path)?;

    println!("Dataset Overview (cleaned):");
    println!("Shape: ({}, {})", table.len(), table.column_count());
    if let Some((min, max)) = table.date_range() {
        println!("Date Range: {} to {}", min, max);
    }

    let cleaned_path = data::export_csv(&table, &outputs_dir)?;
    println!("Saved cleaned dataset to: {}", cleaned_path.display());

    Ok(())
}

//! `texfetch providers`: registered providers in lookup order.

use anyhow::Result;
use texfetch_core::registry;

pub fn run_providers() -> Result<()> {
    println!("{:<18} {:<24} {:<22} {}", "NAME", "SOURCE", "CATEGORIES", "HOME");
    for entry in registry::global().entries() {
        let info = entry.info;
        println!(
            "{:<18} {:<24} {:<22} {}",
            info.name,
            info.source_name,
            info.categories.to_string(),
            info.home_url.unwrap_or("-")
        );
    }
    Ok(())
}

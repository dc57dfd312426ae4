//! `texfetch list <url>`: variant labels, marking those already cached.

use anyhow::Result;
use texfetch_core::TexfetchConfig;

use super::{open_session, SessionArgs};

pub fn run_list(cfg: &TexfetchConfig, args: &SessionArgs) -> Result<()> {
    let mut session = open_session(cfg, args)?;
    let variants = session.list_variants()?.to_vec();
    if let Some(meta) = session.metadata() {
        println!(
            "{} ({})",
            meta.name,
            session.scraper_name().unwrap_or_default()
        );
    }
    for (i, variant) in variants.iter().enumerate() {
        let mark = if session.is_downloaded(variant) {
            "  [downloaded]"
        } else {
            ""
        };
        println!("{:>3}  {}{}", i, variant, mark);
    }
    Ok(())
}

//! `texfetch fetch <url> --variant N`: resolve one variant to local maps.

use anyhow::{Context, Result};
use texfetch_core::{MapValue, TexfetchConfig};

use super::{open_session, SessionArgs};

pub fn run_fetch(
    cfg: &TexfetchConfig,
    args: &SessionArgs,
    variant: isize,
    reinstall: bool,
    thumbnail: bool,
) -> Result<()> {
    let mut session = open_session(cfg, args)?;
    session.set_reinstall(reinstall);
    session.list_variants()?;
    let thumb = if thumbnail { session.thumbnail() } else { None };

    session.select_variant(variant)?;
    let maps = session.into_maps().context("no maps resolved")?;
    println!("{}", maps.name());
    for (key, value) in maps.iter() {
        match value {
            MapValue::Path(p) => println!("  {:<22} {}", key, p.display()),
            MapValue::Scalar(v) => println!("  {:<22} {}", key, v),
        }
    }
    if let Some(path) = thumb {
        println!("  {:<22} {}", "thumbnail", path.display());
    }
    Ok(())
}

//! Built-in providers.

pub mod ambientcg;
pub mod cgbookcase;
pub mod ieslibrary;
pub mod local;
pub mod polyhaven;

use std::path::Path;

use crate::registry::ScraperEntry;

/// Every built-in provider, in no particular order; the registry sorts.
pub fn builtin_entries() -> Vec<ScraperEntry> {
    vec![
        ambientcg::entry(),
        cgbookcase::entry(),
        ieslibrary::entry(),
        local::entry(),
        polyhaven::hdri_entry(),
        polyhaven::texture_entry(),
    ]
}

/// Last `_`-separated token of the file stem: `Rock030_2K_Color.jpg` gives `Color`.
pub(crate) fn suffix_token(path: &Path) -> Option<&str> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('_').next()
}

/// Look up a provider file token in a `(token, map name)` table.
pub(crate) fn translate(table: &[(&str, &'static str)], token: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(from, _)| *from == token)
        .map(|(_, to)| *to)
}

//! Natural ordering for variant labels ("2K" < "4K" < "16K").

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Num(u64),
    Text(String),
}

fn chunks(s: &str) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut digits = String::new();
    let mut text = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                out.push(Chunk::Text(std::mem::take(&mut text)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                out.push(Chunk::Num(digits.parse().unwrap_or(u64::MAX)));
                digits.clear();
            }
            text.extend(c.to_lowercase());
        }
    }
    if !digits.is_empty() {
        out.push(Chunk::Num(digits.parse().unwrap_or(u64::MAX)));
    }
    if !text.is_empty() {
        out.push(Chunk::Text(text));
    }
    out
}

/// Compare with digit runs taken as numbers, case-insensitively otherwise.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    chunks(a).cmp(&chunks(b)).then_with(|| a.cmp(b))
}

/// Sort `items` by `natural_cmp` of the key each one maps to.
pub fn sort_naturally_by_key<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> String,
{
    items.sort_by(|a, b| natural_cmp(&key(a), &key(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_by_value() {
        let mut v = vec!["16K", "2K", "4K", "1K", "8K"];
        v.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(v, ["1K", "2K", "4K", "8K", "16K"]);
    }

    #[test]
    fn text_is_case_insensitive() {
        assert_eq!(natural_cmp("jpg 2k", "JPG 2K"), Ordering::Greater);
        assert_eq!(natural_cmp("exr 1k", "jpg 1k"), Ordering::Less);
        let mut v = vec!["jpg 4k", "exr 8k", "jpg 1k"];
        v.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(v, ["exr 8k", "jpg 1k", "jpg 4k"]);
    }
}

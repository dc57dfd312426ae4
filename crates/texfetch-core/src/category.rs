//! Asset categories and the category sets providers declare.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    /// PBR surface: a set of texture maps.
    Material,
    /// Environment lighting (HDRI sky).
    World,
    /// Photometric light profile (IES).
    Light,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 3] = [
        AssetCategory::Material,
        AssetCategory::World,
        AssetCategory::Light,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetCategory::Material => "material",
            AssetCategory::World => "world",
            AssetCategory::Light => "light",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            AssetCategory::Material => 1,
            AssetCategory::World => 2,
            AssetCategory::Light => 4,
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "material" => Ok(AssetCategory::Material),
            "world" | "hdri" => Ok(AssetCategory::World),
            "light" | "ies" => Ok(AssetCategory::Light),
            other => Err(format!("unknown asset category: {}", other)),
        }
    }
}

/// Set of categories, usable in `static` provider declarations.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct CategorySet(u8);

impl CategorySet {
    pub const EMPTY: CategorySet = CategorySet(0);
    pub const MATERIAL: CategorySet = CategorySet::of(AssetCategory::Material);
    pub const WORLD: CategorySet = CategorySet::of(AssetCategory::World);
    pub const LIGHT: CategorySet = CategorySet::of(AssetCategory::Light);
    pub const ALL: CategorySet = CategorySet(7);

    pub const fn of(category: AssetCategory) -> Self {
        CategorySet(category.bit())
    }

    pub const fn union(self, other: CategorySet) -> Self {
        CategorySet(self.0 | other.0)
    }

    pub fn contains(self, category: AssetCategory) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = AssetCategory> {
        AssetCategory::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl fmt::Debug for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(AssetCategory::as_str).collect();
        f.write_str(&names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_membership() {
        let set = CategorySet::MATERIAL.union(CategorySet::LIGHT);
        assert!(set.contains(AssetCategory::Material));
        assert!(!set.contains(AssetCategory::World));
        assert!(set.contains(AssetCategory::Light));
        assert_eq!(set.to_string(), "material,light");
        assert!(CategorySet::EMPTY.is_empty());
        assert_eq!(CategorySet::ALL.iter().count(), 3);
    }

    #[test]
    fn parse_category() {
        assert_eq!("Material".parse::<AssetCategory>(), Ok(AssetCategory::Material));
        assert_eq!("hdri".parse::<AssetCategory>(), Ok(AssetCategory::World));
        assert!("texture".parse::<AssetCategory>().is_err());
    }
}

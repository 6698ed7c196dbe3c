use serde::{Deserialize, Deserializer, de};
use std::collections::BTreeMap;

use oxitidy_core::SpecifierSort;

/// On-disk shape of an `.oxitidyrc` file. Every field is optional; merging
/// across the config chain happens before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Relative path to a parent config, resolved against this file's
    /// directory.
    pub extends: Option<String>,
    pub groups: Option<Vec<GroupConfig>>,
    pub format: Option<FormatConfig>,
    pub import_order: Option<ImportOrderConfig>,
    pub path_resolution: Option<PathResolutionConfig>,
    pub excluded_folders: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    pub name: String,
    /// Regex tested against the module source. Absent on the catch-all.
    #[serde(rename = "match")]
    pub pattern: Option<String>,
    pub order: Option<u32>,
    /// Marks the catch-all group.
    pub default: Option<bool>,
    /// Deprecated spelling of `default`, kept for old configs. When both are
    /// present, `default` wins and the conflict is logged.
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormatConfig {
    pub indent_width: Option<usize>,
    pub quote_style: Option<QuoteStyle>,
    pub trailing_comma: Option<TrailingComma>,
    pub max_line_width: Option<usize>,
    pub specifier_sort: Option<SortSpec>,
    pub blank_lines_between_groups: Option<i32>,
    pub enforce_newline_after_imports: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportOrderConfig {
    pub side_effect: Option<u32>,
    pub default: Option<u32>,
    pub namespace: Option<u32>,
    pub named: Option<u32>,
    pub type_only: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathResolutionConfig {
    pub mode: Option<AliasMode>,
    /// Explicit alias pattern -> target templates, e.g.
    /// `"@app/*": ["src/app/*"]`. These beat inferred tsconfig mappings.
    pub aliases: Option<BTreeMap<String, Vec<String>>>,
    /// Alias patterns preferred when several mappings match a path.
    pub preferred_aliases: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasMode {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    Always,
    Never,
}

/// Config spelling of the sort mode: `false` disables sorting, `true` means
/// the default mode, `"alpha"` and `"length"` name one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec(pub SpecifierSort);

impl<'de> Deserialize<'de> for SortSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(SortSpec(SpecifierSort::Preserve)),
            Raw::Flag(true) => Ok(SortSpec(SpecifierSort::Length)),
            Raw::Name(name) => match name.as_str() {
                "alpha" => Ok(SortSpec(SpecifierSort::Alpha)),
                "length" => Ok(SortSpec(SpecifierSort::Length)),
                other => Err(de::Error::unknown_variant(other, &["alpha", "length"])),
            },
        }
    }
}

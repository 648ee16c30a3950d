//! Dataset-level metadata and visualisation hints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How to colour the values of one annotation column.
///
/// Opaque to the matrix itself; carried along through selection and
/// transpose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Colours assigned to categories in order.
    Palette(Vec<String>),
    /// Explicit category -> colour mapping.
    Mapping(BTreeMap<String, String>),
    /// Name of a continuous colormap, e.g. `"magma"`.
    Colormap(String),
}

impl From<Vec<String>> for ColorSpec {
    fn from(colors: Vec<String>) -> Self {
        ColorSpec::Palette(colors)
    }
}

impl From<Vec<&str>> for ColorSpec {
    fn from(colors: Vec<&str>) -> Self {
        ColorSpec::Palette(colors.into_iter().map(str::to_owned).collect())
    }
}

impl From<BTreeMap<String, String>> for ColorSpec {
    fn from(mapping: BTreeMap<String, String>) -> Self {
        ColorSpec::Mapping(mapping)
    }
}

impl From<&str> for ColorSpec {
    fn from(colormap: &str) -> Self {
        ColorSpec::Colormap(colormap.to_string())
    }
}

/// Annotation column name -> colour specification.
pub type Vis = BTreeMap<String, ColorSpec>;

/// Free-form dataset metadata.
pub type Meta = BTreeMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn color_specs_deserialize_by_shape() {
        let vis: Vis = serde_json::from_value(json!({
            "Col1": ["#ff3300", "#ffcc88"],
            "Col2": {"V1": "#ff3300", "V2": "#ffcc88"},
            "Col4": "magma",
        }))
        .unwrap();

        assert_eq!(vis["Col1"], ColorSpec::from(vec!["#ff3300", "#ffcc88"]));
        assert!(matches!(&vis["Col2"], ColorSpec::Mapping(m) if m["V2"] == "#ffcc88"));
        assert_eq!(vis["Col4"], ColorSpec::from("magma"));
    }
}

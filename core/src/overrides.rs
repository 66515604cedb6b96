//! Listing overrides from `indexoverwrite.json` / `indexoverwrite.json5`.
//!
//! An override file pins exactly which rows a listing shows and in which
//! order. Two shapes are accepted: an array of names, where each name is
//! both the label and the link target, and an object mapping labels to
//! either `true` (link the label itself) or a replacement link target.

use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::{IndexError, Result};

/// Plain JSON override file name.
pub const OVERRIDE_JSON: &str = "indexoverwrite.json";
/// JSON5 override file name.
pub const OVERRIDE_JSON5: &str = "indexoverwrite.json5";

/// One override row: what to display and where to link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    /// Text shown in the listing.
    pub label: String,
    /// Link target, relative to the listing's directory.
    pub target: String,
}

/// Load the override list for `dir`, if it declares one. When both files
/// exist the plain JSON one wins.
pub fn load(dir: &Path) -> Result<Option<Vec<OverrideEntry>>> {
    for name in [OVERRIDE_JSON, OVERRIDE_JSON5] {
        let path = dir.join(name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(IndexError::OverrideRead(format!("{}: {e}", path.display())));
            }
        };
        let value: Value = if name.ends_with(".json5") {
            json5::from_str(&raw)
                .map_err(|e| IndexError::OverrideParse(format!("{}: {e}", path.display())))?
        } else {
            serde_json::from_str(&raw)
                .map_err(|e| IndexError::OverrideParse(format!("{}: {e}", path.display())))?
        };
        return entries_from(value, &path).map(Some);
    }
    Ok(None)
}

/// Flatten a parsed override document into ordered entries. Object keys
/// keep their declaration order because `serde_json` is built with
/// `preserve_order`.
fn entries_from(value: Value, path: &Path) -> Result<Vec<OverrideEntry>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(OverrideEntry { label: name.clone(), target: name }),
                other => Err(IndexError::OverrideParse(format!(
                    "{}: array entries must be strings, found {other}",
                    path.display()
                ))),
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(label, target)| match target {
                Value::Bool(true) => Ok(OverrideEntry { target: label.clone(), label }),
                Value::String(target) => Ok(OverrideEntry { label, target }),
                other => Err(IndexError::OverrideParse(format!(
                    "{}: entry {label:?} must map to true or a link target, found {other}",
                    path.display()
                ))),
            })
            .collect(),
        other => Err(IndexError::OverrideParse(format!(
            "{}: expected an array or an object, found {other}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn entry(label: &str, target: &str) -> OverrideEntry {
        OverrideEntry { label: label.to_string(), target: target.to_string() }
    }

    #[test]
    fn absent_files_mean_no_override() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load(dir.path()).unwrap(), None);
    }

    #[test]
    fn array_form_keeps_declaration_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OVERRIDE_JSON), r#"["z.txt", "a.txt"]"#).unwrap();

        let entries = load(dir.path()).unwrap().unwrap();
        assert_eq!(entries, vec![entry("z.txt", "z.txt"), entry("a.txt", "a.txt")]);
    }

    #[test]
    fn object_form_supports_true_and_renames() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(OVERRIDE_JSON),
            r#"{"a.txt": true, "b.txt": "renamed.txt"}"#,
        )
        .unwrap();

        let entries = load(dir.path()).unwrap().unwrap();
        assert_eq!(entries, vec![entry("a.txt", "a.txt"), entry("b.txt", "renamed.txt")]);
    }

    #[test]
    fn object_form_rejects_other_value_types() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OVERRIDE_JSON), r#"{"a.txt": false}"#).unwrap();

        assert!(matches!(load(dir.path()), Err(IndexError::OverrideParse(_))));
    }

    #[test]
    fn top_level_scalars_are_format_errors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OVERRIDE_JSON), r#""just a string""#).unwrap();

        assert!(matches!(load(dir.path()), Err(IndexError::OverrideParse(_))));
    }

    #[test]
    fn json5_accepts_relaxed_syntax() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(OVERRIDE_JSON5),
            "// pinned rows\n{ first: 'z.txt', second: true, }",
        )
        .unwrap();

        let entries = load(dir.path()).unwrap().unwrap();
        assert_eq!(entries, vec![entry("first", "z.txt"), entry("second", "second")]);
    }

    #[test]
    fn plain_json_wins_over_json5() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OVERRIDE_JSON), r#"["json.txt"]"#).unwrap();
        fs::write(dir.path().join(OVERRIDE_JSON5), r#"["json5.txt"]"#).unwrap();

        let entries = load(dir.path()).unwrap().unwrap();
        assert_eq!(entries, vec![entry("json.txt", "json.txt")]);
    }
}

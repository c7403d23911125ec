//! Unused import detection for Python snippets.
//!
//! This is a line-oriented heuristic: the second whitespace-delimited token
//! of an `import`/`from` line is taken as the imported name, and a name
//! counts as used only if it appears as a whole whitespace-delimited token
//! on some other line. Aliased and multi-name imports are therefore only
//! partially checked.

use std::collections::HashSet;

use crate::analysis::{Checker, SourceUnit};

use super::Finding;

/// A name captured from an import line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    /// 1-indexed line of the first import of this name.
    pub line: usize,
}

fn is_import_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("import ") || trimmed.starts_with("from ")
}

/// Collect imported names in first-seen order.
pub fn extract_imported_names(code: &str) -> Vec<ImportedName> {
    let mut imports: Vec<ImportedName> = Vec::new();

    for (idx, line) in code.split('\n').enumerate() {
        if !is_import_line(line) {
            continue;
        }
        let Some(name) = line.split_whitespace().nth(1) else {
            continue;
        };
        if !imports.iter().any(|i| i.name == name) {
            imports.push(ImportedName {
                name: name.to_string(),
                line: idx + 1,
            });
        }
    }

    imports
}

/// Report every imported name that never appears on a non-import line.
pub fn detect_unused_imports(code: &str) -> Vec<Finding> {
    if !code.contains("import ") {
        return Vec::new();
    }

    let used: HashSet<&str> = code
        .split('\n')
        .filter(|line| !is_import_line(line))
        .flat_map(str::split_whitespace)
        .collect();

    extract_imported_names(code)
        .into_iter()
        .filter(|import| !used.contains(import.name.as_str()))
        .map(|import| Finding::warning(format!("⚠️ Unused import detected: {}", import.name)))
        .collect()
}

/// Checker wrapper for [`detect_unused_imports`].
pub struct ImportUsageChecker;

impl Checker for ImportUsageChecker {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding> {
        detect_unused_imports(unit.code())
    }
}

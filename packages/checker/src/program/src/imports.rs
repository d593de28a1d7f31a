// Import Scanning
//
// Finds the module specifiers and triple-slash references of a source file
// without parsing it. Specifiers inside comments may be picked up; they only
// widen the set of files re-checked, never narrow it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Kind of reference found in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `import`, `export … from`, `import()` or `require()`.
    Module,
    /// `/// <reference types="…" />`
    TypeReference,
    /// `/// <reference path="…" />`
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportReference {
    pub specifier: String,
    pub kind: ReferenceKind,
}

static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\b[^'"`;]*?\bfrom\s*['"]([^'"]+)['"]"#).unwrap()
});

static SIDE_EFFECT_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*import\s*['"]([^'"]+)['"]"#).unwrap());

static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:import|require)\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
});

static IMPORT_EQUALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:export\s+)?import\s+\w+\s*=\s*require\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .unwrap()
});

static TRIPLE_SLASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*///\s*<reference\s+(path|types)\s*=\s*['"]([^'"]+)['"]"#).unwrap()
});

/// All references of `text`, in order of first appearance, without
/// duplicates.
pub fn scan_imports(text: &str) -> Vec<ImportReference> {
    let mut found: Vec<(usize, ImportReference)> = Vec::new();

    let module_patterns: [&Regex; 4] = [
        &STATIC_IMPORT,
        &SIDE_EFFECT_IMPORT,
        &DYNAMIC_IMPORT,
        &IMPORT_EQUALS,
    ];
    for pattern in module_patterns {
        for captures in pattern.captures_iter(text) {
            if let Some(specifier) = captures.get(1) {
                found.push((
                    specifier.start(),
                    ImportReference {
                        specifier: specifier.as_str().to_string(),
                        kind: ReferenceKind::Module,
                    },
                ));
            }
        }
    }

    for captures in TRIPLE_SLASH.captures_iter(text) {
        let (Some(kind), Some(specifier)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        let kind = if kind.as_str() == "path" {
            ReferenceKind::Path
        } else {
            ReferenceKind::TypeReference
        };
        found.push((
            specifier.start(),
            ImportReference {
                specifier: specifier.as_str().to_string(),
                kind,
            },
        ));
    }

    found.sort_by_key(|(position, _)| *position);

    let mut references: Vec<ImportReference> = Vec::new();
    for (_, reference) in found {
        if !references.contains(&reference) {
            references.push(reference);
        }
    }
    references
}

// Project Configuration
//
// Reads the tsconfig document of the checked project and expands it into the
// set of root files. The document is read at construction and re-read
// whenever one of its source files (the tsconfig and every config it
// extends) changes.

use std::path::PathBuf;

use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use ts::CompilerOptions;

use super::json::strip_json_comments;
use crate::error::ConfigurationError;
use crate::file_system::{content_fingerprint, dirname, is_absolute, join, normalize_path, FileSystem};

const MAX_EXTENDS_DEPTH: usize = 16;

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts"];
const JS_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs"];

const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    extends: Option<String>,
    compiler_options: Option<CompilerOptions>,
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

/// A configuration document that contributed to the configuration, with the
/// fingerprint of the content it had when it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigSource {
    path: String,
    fingerprint: String,
}

/// Parsed project configuration.
#[derive(Debug, Clone)]
pub struct ProjectConfiguration {
    /// Absolute path of the tsconfig document.
    pub config_path: String,
    /// Directory the include/exclude/files entries are relative to.
    pub base_dir: String,
    /// Options from the document merged with host overrides.
    pub compiler_options: CompilerOptions,
    pub files: Option<Vec<String>>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    sources: Vec<ConfigSource>,
}

impl ProjectConfiguration {
    /// Read the configuration at `path`; `overrides` win over the options of
    /// the document.
    pub fn load(
        fs: &dyn FileSystem,
        path: &str,
        overrides: &CompilerOptions,
    ) -> Result<Self, ConfigurationError> {
        let config_path = absolute_path(path);
        let mut sources = Vec::new();
        let raw = read_with_extends(fs, &config_path, &mut sources, 0)?;

        let compiler_options = raw.compiler_options.unwrap_or_default().merge(overrides);

        tracing::debug!(
            config = %config_path,
            sources = sources.len(),
            "loaded project configuration"
        );

        Ok(Self {
            base_dir: dirname(&config_path),
            config_path,
            compiler_options,
            files: raw.files,
            include: raw.include,
            exclude: raw.exclude,
            sources,
        })
    }

    /// Whether any configuration document changed or disappeared since it was
    /// read.
    pub fn has_changed(&self, fs: &dyn FileSystem) -> bool {
        self.sources.iter().any(|source| match fs.read_file(&source.path) {
            Ok(content) => content_fingerprint(&content) != source.fingerprint,
            Err(_) => true,
        })
    }

    /// Paths of every configuration document read, the tsconfig first.
    pub fn source_paths(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.path.as_str()).collect()
    }

    /// Whether `path` has an extension the type checker handles under these
    /// options.
    pub fn is_supported_extension(&self, path: &str) -> bool {
        TS_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
            || (self.compiler_options.allows_js() && JS_EXTENSIONS.iter().any(|ext| path.ends_with(ext)))
    }

    /// Expand `files`/`include`/`exclude` into the root files of the program.
    ///
    /// Explicit `files` come first, in document order; included files follow
    /// in sorted path order. No path appears twice.
    pub fn root_files(&self, fs: &dyn FileSystem) -> Result<Vec<String>, ConfigurationError> {
        let mut roots: Vec<String> = Vec::new();

        if let Some(files) = &self.files {
            for file in files {
                let path = join(&self.base_dir, file);
                if fs.exists(&path) && !roots.contains(&path) {
                    roots.push(path);
                }
            }
        }

        let include = match (&self.include, &self.files) {
            (Some(include), _) => include.clone(),
            (None, None) => vec!["**/*".to_string()],
            (None, Some(_)) => Vec::new(),
        };
        if include.is_empty() {
            return Ok(roots);
        }

        let include = self.compile_patterns(&include, "include")?;
        let exclude = self.exclude_patterns()?;
        let skip_dir = |dir: &str| exclude.iter().any(|pattern| pattern.matches_with(dir, GLOB_OPTIONS));

        let listed = fs
            .list_files(&self.base_dir, &skip_dir)
            .map_err(|source| ConfigurationError::Unreadable {
                path: PathBuf::from(&self.base_dir),
                source,
            })?;

        let mut seen: std::collections::HashSet<String> = roots.iter().cloned().collect();
        for file in listed {
            if !self.is_supported_extension(&file) {
                continue;
            }
            if !include.iter().any(|pattern| pattern.matches_with(&file, GLOB_OPTIONS)) {
                continue;
            }
            if is_excluded(&exclude, &file) {
                continue;
            }
            if seen.insert(file.clone()) {
                roots.push(file);
            }
        }

        Ok(roots)
    }

    fn exclude_patterns(&self) -> Result<Vec<Pattern>, ConfigurationError> {
        let specs: Vec<String> = match &self.exclude {
            Some(exclude) => exclude.clone(),
            None => {
                let mut specs: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
                if let Some(out_dir) = &self.compiler_options.out_dir {
                    specs.push(out_dir.clone());
                }
                specs
            }
        };
        self.compile_patterns(&specs, "exclude")
    }

    /// A spec without wildcards and without a file extension names a
    /// directory and matches everything below it.
    fn compile_patterns(
        &self,
        specs: &[String],
        option: &'static str,
    ) -> Result<Vec<Pattern>, ConfigurationError> {
        let mut patterns = Vec::new();
        for spec in specs {
            let absolute = join(&self.base_dir, spec);
            let last = absolute.rsplit('/').next().unwrap_or_default();
            let is_directory_spec = !absolute.contains(['*', '?']) && !last.contains('.');

            let mut sources = vec![absolute.clone()];
            if is_directory_spec || absolute.ends_with("/**") {
                sources.push(format!("{}/**/*", absolute.trim_end_matches("/**")));
            }
            for source in sources {
                let pattern = Pattern::new(&source).map_err(|e| ConfigurationError::InvalidOption {
                    option,
                    reason: format!("invalid pattern '{}': {}", spec, e),
                })?;
                patterns.push(pattern);
            }
        }
        Ok(patterns)
    }
}

fn is_excluded(exclude: &[Pattern], file: &str) -> bool {
    exclude.iter().any(|pattern| pattern.matches_with(file, GLOB_OPTIONS))
}

fn absolute_path(path: &str) -> String {
    if is_absolute(path) {
        return normalize_path(path);
    }
    let cwd = std::env::current_dir()
        .map(|p| normalize_path(&p.to_string_lossy()))
        .unwrap_or_else(|_| "/".to_string());
    join(&cwd, path)
}

fn read_with_extends(
    fs: &dyn FileSystem,
    path: &str,
    sources: &mut Vec<ConfigSource>,
    depth: usize,
) -> Result<RawConfig, ConfigurationError> {
    if depth > MAX_EXTENDS_DEPTH || sources.iter().any(|s| s.path == path) {
        return Err(ConfigurationError::InvalidOption {
            option: "extends",
            reason: format!("circular or too deep configuration inheritance at {}", path),
        });
    }
    if !fs.exists(path) {
        return Err(ConfigurationError::Missing(PathBuf::from(path)));
    }
    let content = fs.read_file(path).map_err(|source| ConfigurationError::Unreadable {
        path: PathBuf::from(path),
        source,
    })?;
    sources.push(ConfigSource {
        path: path.to_string(),
        fingerprint: content_fingerprint(&content),
    });

    let raw: RawConfig =
        serde_json::from_str(&strip_json_comments(&content)).map_err(|source| {
            ConfigurationError::Malformed {
                path: PathBuf::from(path),
                source,
            }
        })?;

    let Some(extends) = &raw.extends else {
        return Ok(raw);
    };

    let base_path = resolve_extends(path, extends);
    let base = read_with_extends(fs, &base_path, sources, depth + 1)?;

    // Paths inside the base document stay relative to the base document.
    let base_dir = dirname(&base_path);
    let own_dir = dirname(path);
    let rebase = |specs: Option<Vec<String>>| {
        specs.map(|specs| {
            specs
                .into_iter()
                .map(|spec| join(&base_dir, &spec))
                .collect::<Vec<_>>()
        })
    };

    let base_options = base.compiler_options.unwrap_or_default();
    let base_options = CompilerOptions {
        base_url: base_options.base_url.as_ref().map(|url| join(&base_dir, url)),
        out_dir: base_options.out_dir.as_ref().map(|dir| join(&base_dir, dir)),
        ..base_options
    };
    let own_options = raw.compiler_options.unwrap_or_default();
    let own_options = CompilerOptions {
        base_url: own_options.base_url.as_ref().map(|url| join(&own_dir, url)),
        out_dir: own_options.out_dir.as_ref().map(|dir| join(&own_dir, dir)),
        ..own_options
    };

    Ok(RawConfig {
        extends: None,
        compiler_options: Some(base_options.merge(&own_options)),
        files: raw.files.or_else(|| rebase(base.files)),
        include: raw.include.or_else(|| rebase(base.include)),
        exclude: raw.exclude.or_else(|| rebase(base.exclude)),
    })
}

fn resolve_extends(from: &str, extends: &str) -> String {
    let with_extension = if extends.ends_with(".json") {
        extends.to_string()
    } else {
        format!("{}.json", extends)
    };
    if extends.starts_with('.') || is_absolute(extends) {
        join(&dirname(from), &with_extension)
    } else {
        join(&dirname(from), &format!("node_modules/{}", with_extension))
    }
}

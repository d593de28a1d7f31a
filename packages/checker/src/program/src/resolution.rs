// Module Resolution
//
// Maps the specifiers found by the import scanner onto files of the project.
// Hosts may plug their own resolvers in through `ResolutionOverrides`; those
// are asked first and the built-in node-style resolution is used when they
// return nothing.

use std::sync::Arc;

use serde::Deserialize;
use ts::CompilerOptions;

use super::imports::{ImportReference, ReferenceKind};
use crate::file_system::{dirname, is_absolute, join, FileSystem};

const TS_PROBE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];
const JS_PROBE_EXTENSIONS: &[&str] = &[".js", ".jsx"];

/// Emitted extensions that map back onto a TypeScript source.
const JS_TO_TS: &[(&str, &[&str])] = &[
    (".js", &[".ts", ".tsx", ".d.ts"]),
    (".jsx", &[".tsx"]),
    (".mjs", &[".mts", ".d.mts"]),
    (".cjs", &[".cts", ".d.cts"]),
];

/// Everything a resolver may look at for one specifier.
pub struct ResolutionRequest<'a> {
    pub specifier: &'a str,
    /// Absolute path of the file containing the specifier.
    pub containing_file: &'a str,
    pub options: &'a CompilerOptions,
    /// Directory of the tsconfig document.
    pub base_dir: &'a str,
    pub fs: &'a dyn FileSystem,
}

pub trait ModuleNameResolver: Send + Sync {
    /// Absolute path of the file `request.specifier` refers to, if any.
    fn resolve_module_name(&self, request: &ResolutionRequest<'_>) -> Option<String>;
}

pub trait TypeReferenceResolver: Send + Sync {
    /// Absolute path of the declaration file of the referenced types package.
    fn resolve_type_reference(&self, request: &ResolutionRequest<'_>) -> Option<String>;
}

/// Host-supplied resolvers, consulted before the built-in ones.
#[derive(Clone, Default)]
pub struct ResolutionOverrides {
    pub module_name: Option<Arc<dyn ModuleNameResolver>>,
    pub type_reference: Option<Arc<dyn TypeReferenceResolver>>,
}

impl ResolutionOverrides {
    pub fn with_module_name_resolver(mut self, resolver: Arc<dyn ModuleNameResolver>) -> Self {
        self.module_name = Some(resolver);
        self
    }

    pub fn with_type_reference_resolver(mut self, resolver: Arc<dyn TypeReferenceResolver>) -> Self {
        self.type_reference = Some(resolver);
        self
    }
}

impl std::fmt::Debug for ResolutionOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionOverrides")
            .field("module_name", &self.module_name.is_some())
            .field("type_reference", &self.type_reference.is_some())
            .finish()
    }
}

/// Node-style module resolution: relative paths, `paths` mappings,
/// `baseUrl` and `node_modules` packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultModuleResolver;

impl ModuleNameResolver for DefaultModuleResolver {
    fn resolve_module_name(&self, request: &ResolutionRequest<'_>) -> Option<String> {
        let specifier = request.specifier;
        let allow_js = request.options.allows_js();

        if is_relative(specifier) || is_absolute(specifier) {
            let candidate = join(&dirname(request.containing_file), specifier);
            return probe(request.fs, &candidate, allow_js);
        }

        if let Some(resolved) = resolve_with_paths(request, allow_js) {
            return Some(resolved);
        }

        if let Some(base_url) = &request.options.base_url {
            let base_url = join(request.base_dir, base_url);
            if let Some(resolved) = probe(request.fs, &join(&base_url, specifier), allow_js) {
                return Some(resolved);
            }
        }

        for node_modules in node_modules_dirs(&dirname(request.containing_file)) {
            let package_dir = join(&node_modules, specifier);
            if let Some(resolved) = probe(request.fs, &package_dir, allow_js) {
                return Some(resolved);
            }
            let types_dir = join(&node_modules, &format!("@types/{}", types_package_name(specifier)));
            if let Some(resolved) = probe(request.fs, &types_dir, false) {
                return Some(resolved);
            }
        }

        None
    }
}

/// Resolves `/// <reference types>` against `typeRoots`, or every
/// `node_modules/@types` above the project when no roots are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTypeReferenceResolver;

impl TypeReferenceResolver for DefaultTypeReferenceResolver {
    fn resolve_type_reference(&self, request: &ResolutionRequest<'_>) -> Option<String> {
        let roots: Vec<String> = match &request.options.type_roots {
            Some(roots) => roots.iter().map(|root| join(request.base_dir, root)).collect(),
            None => node_modules_dirs(request.base_dir)
                .into_iter()
                .map(|dir| join(&dir, "@types"))
                .collect(),
        };

        for root in roots {
            let package_dir = join(&root, request.specifier);
            if let Some(types) = package_types_entry(request.fs, &package_dir) {
                return Some(types);
            }
            let index = join(&package_dir, "index.d.ts");
            if request.fs.exists(&index) {
                return Some(index);
            }
        }

        // `types` packages that ship their own declarations
        node_modules_dirs(request.base_dir)
            .into_iter()
            .find_map(|dir| package_types_entry(request.fs, &join(&dir, request.specifier)))
    }
}

/// The resolution chain used by the program state: overrides first, then
/// the defaults.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    overrides: ResolutionOverrides,
}

impl ModuleResolver {
    pub fn new(overrides: ResolutionOverrides) -> Self {
        Self { overrides }
    }

    /// Resolve one scanned reference of `containing_file`. Unresolvable
    /// references yield `None` and are ignored by the caller.
    pub fn resolve(
        &self,
        reference: &ImportReference,
        containing_file: &str,
        options: &CompilerOptions,
        base_dir: &str,
        fs: &dyn FileSystem,
    ) -> Option<String> {
        let request = ResolutionRequest {
            specifier: &reference.specifier,
            containing_file,
            options,
            base_dir,
            fs,
        };

        match reference.kind {
            ReferenceKind::Module => self
                .overrides
                .module_name
                .as_ref()
                .and_then(|resolver| resolver.resolve_module_name(&request))
                .or_else(|| DefaultModuleResolver.resolve_module_name(&request)),
            ReferenceKind::TypeReference => self
                .overrides
                .type_reference
                .as_ref()
                .and_then(|resolver| resolver.resolve_type_reference(&request))
                .or_else(|| DefaultTypeReferenceResolver.resolve_type_reference(&request)),
            ReferenceKind::Path => {
                let candidate = join(&dirname(containing_file), &reference.specifier);
                if fs.exists(&candidate) {
                    Some(candidate)
                } else {
                    probe(fs, &candidate, options.allows_js())
                }
            }
        }
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
}

/// `@scope/name` maps to `@types/scope__name`.
fn types_package_name(specifier: &str) -> String {
    match specifier.strip_prefix('@') {
        Some(scoped) => scoped.replacen('/', "__", 1),
        None => specifier.to_string(),
    }
}

fn resolve_with_paths(request: &ResolutionRequest<'_>, allow_js: bool) -> Option<String> {
    let paths = request.options.paths.as_ref()?;
    let base = match &request.options.base_url {
        Some(base_url) => join(request.base_dir, base_url),
        None => request.base_dir.to_string(),
    };

    // The longest matching prefix wins, as in the TypeScript compiler.
    let mut best: Option<(&String, &Vec<String>, &str)> = None;
    for (pattern, substitutions) in paths {
        let Some(captured) = match_pattern(pattern, request.specifier) else {
            continue;
        };
        let prefix_len = pattern.find('*').unwrap_or(pattern.len());
        let better = match best {
            Some((current, _, _)) => prefix_len > current.find('*').unwrap_or(current.len()),
            None => true,
        };
        if better {
            best = Some((pattern, substitutions, captured));
        }
    }

    let (_, substitutions, captured) = best?;
    substitutions.iter().find_map(|substitution| {
        let target = substitution.replacen('*', captured, 1);
        probe(request.fs, &join(&base, &target), allow_js)
    })
}

/// Match a `paths` key with at most one `*`; returns the text the star
/// stands for.
fn match_pattern<'s>(pattern: &str, specifier: &'s str) -> Option<&'s str> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some(""),
        Some((prefix, suffix)) => {
            if specifier.len() >= prefix.len() + suffix.len()
                && specifier.starts_with(prefix)
                && specifier.ends_with(suffix)
            {
                Some(&specifier[prefix.len()..specifier.len() - suffix.len()])
            } else {
                None
            }
        }
    }
}

/// Every `node_modules` directory from `dir` up to the root.
fn node_modules_dirs(dir: &str) -> Vec<String> {
    let mut dirs = Vec::new();
    let mut current = dir.to_string();
    loop {
        if !current.ends_with("/node_modules") {
            dirs.push(join(&current, "node_modules"));
        }
        let parent = dirname(&current);
        if parent == current {
            break;
        }
        current = parent;
    }
    dirs
}

/// Try `candidate` as a file, with extensions, then as a directory.
fn probe(fs: &dyn FileSystem, candidate: &str, allow_js: bool) -> Option<String> {
    for (js_extension, ts_extensions) in JS_TO_TS {
        if let Some(stem) = candidate.strip_suffix(js_extension) {
            for extension in *ts_extensions {
                let path = format!("{}{}", stem, extension);
                if fs.exists(&path) {
                    return Some(path);
                }
            }
        }
    }

    if has_supported_extension(candidate, allow_js) && is_file(fs, candidate) {
        return Some(candidate.to_string());
    }

    let extensions = probe_extensions(allow_js);
    for extension in &extensions {
        let path = format!("{}{}", candidate, extension);
        if fs.exists(&path) {
            return Some(path);
        }
    }

    if let Some(types) = package_types_entry(fs, candidate) {
        return Some(types);
    }

    for extension in &extensions {
        let path = format!("{}/index{}", candidate, extension);
        if fs.exists(&path) {
            return Some(path);
        }
    }

    None
}

fn probe_extensions(allow_js: bool) -> Vec<&'static str> {
    let mut extensions = TS_PROBE_EXTENSIONS.to_vec();
    if allow_js {
        extensions.extend_from_slice(JS_PROBE_EXTENSIONS);
    }
    extensions
}

fn has_supported_extension(path: &str, allow_js: bool) -> bool {
    [".ts", ".tsx", ".mts", ".cts"].iter().any(|ext| path.ends_with(ext))
        || (allow_js && [".js", ".jsx", ".mjs", ".cjs"].iter().any(|ext| path.ends_with(ext)))
}

/// Whether `path` is a readable file rather than a directory.
fn is_file(fs: &dyn FileSystem, path: &str) -> bool {
    fs.read_file(path).is_ok()
}

#[derive(Deserialize)]
struct PackageManifest {
    types: Option<String>,
    typings: Option<String>,
}

/// The declaration entry point named by `<dir>/package.json`.
fn package_types_entry(fs: &dyn FileSystem, dir: &str) -> Option<String> {
    let manifest = fs.read_file(&join(dir, "package.json")).ok()?;
    let manifest: PackageManifest = serde_json::from_str(&manifest).ok()?;
    let entry = manifest.types.or(manifest.typings)?;
    let path = join(dir, &entry);
    if fs.exists(&path) {
        return Some(path);
    }
    probe_extensions(false)
        .into_iter()
        .map(|extension| format!("{}{}", path, extension))
        .find(|candidate| fs.exists(candidate))
}

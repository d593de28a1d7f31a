use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptTarget {
    ES3,
    ES5,
    ES2015,
    ES2016,
    ES2017,
    ES2018,
    ES2019,
    ES2020,
    ES2021,
    ES2022,
    ESNext,
    JSON,
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    None,
    CommonJS,
    AMD,
    UMD,
    System,
    ES2015,
    ES2020,
    ES2022,
    ESNext,
    Node16,
    NodeNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleResolutionKind {
    Classic,
    NodeJs,
    Node16,
    NodeNext,
    Bundler,
}

/// Error returned when an option value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOptionValue(pub String);

impl std::fmt::Display for UnknownOptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown option value '{}'", self.0)
    }
}

impl std::error::Error for UnknownOptionValue {}

// tsconfig option values are case-insensitive ("ESNext", "esnext", ...).
macro_rules! option_enum_strings {
    ($ty:ident { $($variant:ident => [$($name:literal),+]),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => option_enum_strings!(@first $($name),+),)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = UnknownOptionValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($($name)|+ => Ok($ty::$variant),)+
                    _ => Err(UnknownOptionValue(s.to_string())),
                }
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
    (@first $head:literal $(, $rest:literal)*) => { $head };
}

option_enum_strings!(ScriptTarget {
    ES3 => ["es3"],
    ES5 => ["es5"],
    ES2015 => ["es2015", "es6"],
    ES2016 => ["es2016"],
    ES2017 => ["es2017"],
    ES2018 => ["es2018"],
    ES2019 => ["es2019"],
    ES2020 => ["es2020"],
    ES2021 => ["es2021"],
    ES2022 => ["es2022"],
    ESNext => ["esnext"],
    JSON => ["json"],
    Latest => ["latest"],
});

option_enum_strings!(ModuleKind {
    None => ["none"],
    CommonJS => ["commonjs"],
    AMD => ["amd"],
    UMD => ["umd"],
    System => ["system"],
    ES2015 => ["es2015", "es6"],
    ES2020 => ["es2020"],
    ES2022 => ["es2022"],
    ESNext => ["esnext"],
    Node16 => ["node16"],
    NodeNext => ["nodenext"],
});

option_enum_strings!(ModuleResolutionKind {
    Classic => ["classic"],
    NodeJs => ["node", "node10", "nodejs"],
    Node16 => ["node16"],
    NodeNext => ["nodenext"],
    Bundler => ["bundler"],
});

/// The subset of tsconfig `compilerOptions` the checking service looks at.
///
/// Unknown keys are ignored so that any valid tsconfig deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub allow_js: Option<bool>,
    pub check_js: Option<bool>,
    pub base_url: Option<String>,
    pub paths: Option<BTreeMap<String, Vec<String>>>,
    pub strict: Option<bool>,
    pub no_emit: Option<bool>,
    pub skip_lib_check: Option<bool>,
    pub target: Option<ScriptTarget>,
    pub module: Option<ModuleKind>,
    pub module_resolution: Option<ModuleResolutionKind>,
    pub types: Option<Vec<String>>,
    pub type_roots: Option<Vec<String>>,
    pub root_dir: Option<String>,
    pub out_dir: Option<String>,
    pub resolve_json_module: Option<bool>,
}

impl CompilerOptions {
    /// Overlay `overrides` on top of these options; every option set in
    /// `overrides` wins.
    pub fn merge(&self, overrides: &CompilerOptions) -> CompilerOptions {
        macro_rules! pick {
            ($($field:ident),+) => {
                CompilerOptions {
                    $($field: overrides.$field.clone().or_else(|| self.$field.clone()),)+
                }
            };
        }
        pick!(
            allow_js,
            check_js,
            base_url,
            paths,
            strict,
            no_emit,
            skip_lib_check,
            target,
            module,
            module_resolution,
            types,
            type_roots,
            root_dir,
            out_dir,
            resolve_json_module
        )
    }

    pub fn allows_js(&self) -> bool {
        self.allow_js.unwrap_or(false) || self.check_js.unwrap_or(false)
    }
}

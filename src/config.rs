// used to read settings from an optional file and the environment
use config::{Config, Environment, File};
// the parse configuration is shared between value sets without copying
use std::sync::Arc;
use std::path::PathBuf;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::datatype::{ObjectType, OpaqueObject};
use crate::error::{Result, VividError};
use crate::point::{self, Point};

/// Turns a plain string literal into an opaque object, if it reads as one.
pub type LiteralConstructor = fn(&str) -> Option<OpaqueObject>;

// ------------- Object registry -------------
#[derive(Clone, Debug)]
pub struct ObjectKind {
    tag: &'static str,
    literal: Option<LiteralConstructor>,
}

impl ObjectKind {
    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

/// The opaque object kinds a parser will accept. Objects whose tag is not
/// registered are rejected as type errors.
#[derive(Clone, Debug)]
pub struct ObjectRegistry {
    kinds: Vec<ObjectKind>,
}

impl ObjectRegistry {
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }
    pub fn register<T: ObjectType>(&mut self, literal: Option<LiteralConstructor>) {
        self.kinds.retain(|kind| kind.tag != T::TAG);
        self.kinds.push(ObjectKind { tag: T::TAG, literal });
    }
    pub fn with<T: ObjectType>(mut self, literal: Option<LiteralConstructor>) -> Self {
        self.register::<T>(literal);
        self
    }
    pub fn recognizes(&self, tag: &str) -> bool {
        self.kinds.iter().any(|kind| kind.tag == tag)
    }
    pub fn kinds(&self) -> &[ObjectKind] {
        &self.kinds
    }
    pub fn from_literal(&self, text: &str) -> Option<OpaqueObject> {
        self.kinds
            .iter()
            .filter_map(|kind| kind.literal)
            .find_map(|construct| construct(text))
    }
}
impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::empty().with::<Point>(Some(point::literal))
    }
}

// ------------- Parse configuration -------------
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Hoist the contents of nested groups into the enclosing set.
    pub flatten_nested_groups: bool,
    /// Step between neighbouring float values, used for adjacency and
    /// for discretizing float ranges.
    pub float_merge_tolerance: f64,
    #[serde(skip)]
    pub registry: ObjectRegistry,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            flatten_nested_groups: false,
            float_merge_tolerance: 0.1,
            registry: ObjectRegistry::default(),
        }
    }
}

impl ParseConfig {
    pub fn flattening(mut self, flatten: bool) -> Self {
        self.flatten_nested_groups = flatten;
        self
    }
    /// Fails unless the tolerance is a positive, finite number.
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        self.float_merge_tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }
    pub fn with_registry(mut self, registry: ObjectRegistry) -> Self {
        self.registry = registry;
        self
    }
    pub fn validate(&self) -> Result<()> {
        if !(self.float_merge_tolerance.is_finite() && self.float_merge_tolerance > 0.0) {
            return Err(VividError::Config(format!(
                "float_merge_tolerance must be a positive number, got {}",
                self.float_merge_tolerance
            )));
        }
        Ok(())
    }
    pub fn shared(self) -> Arc<ParseConfig> {
        Arc::new(self)
    }
}

lazy_static! {
    static ref DEFAULT_CONFIG: Arc<ParseConfig> = Arc::new(ParseConfig::default());
}

pub fn default_config() -> Arc<ParseConfig> {
    Arc::clone(&DEFAULT_CONFIG)
}

// ------------- Settings -------------
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub parse: ParseConfig,
    pub log_filter: String,
    pub model: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parse: ParseConfig::default(),
            log_filter: "info".to_string(),
            model: None,
        }
    }
}

impl Settings {
    /// Reads `vivid.{toml,json,yaml}` if present, then `VIVID_*` environment
    /// variables, e.g. `VIVID_PARSE__FLOAT_MERGE_TOLERANCE=0.5`.
    pub fn load() -> Result<Self> {
        Self::load_from("vivid")
    }
    pub fn load_from(name: &str) -> Result<Self> {
        let source = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(
                Environment::with_prefix("VIVID")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let settings: Settings = source.try_deserialize()?;
        settings.parse.validate()?;
        Ok(settings)
    }
}

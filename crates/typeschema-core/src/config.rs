use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ir::{ObjectNode, Property};

/// Options for [`crate::transform::JsonSchemaTransformer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonSchemaConfig {
    /// Emit `strict: true` at the document root (OpenAI strict mode).
    pub strict_schema_flag: bool,
    /// Take required membership from the object's default-presence
    /// bookkeeping instead of recomputing it.
    pub respect_default_presence: bool,
    /// When default presence is ignored: require every property (`true`)
    /// or only the non-nullable ones (`false`).
    pub require_nullable_fields: bool,
    /// Encode inline nullability as `["<type>", "null"]`.
    pub use_union_types: bool,
    /// Also mark inline nullable values with the legacy `nullable: true`.
    pub use_nullable_field: bool,
    /// Attach an OpenAPI-style `discriminator` object to polymorphic `$defs`.
    pub include_openapi_discriminator: bool,
    /// Emit `$schema` with the Draft 2020-12 URI.
    pub include_schema_uri: bool,
}

impl JsonSchemaConfig {
    /// Non-strict, required-ness follows default presence.
    pub const DEFAULT: Self = Self {
        strict_schema_flag: false,
        respect_default_presence: true,
        require_nullable_fields: true,
        use_union_types: true,
        use_nullable_field: false,
        include_openapi_discriminator: false,
        include_schema_uri: false,
    };

    /// Strict flag on, every property required.
    pub const STRICT: Self = Self {
        strict_schema_flag: true,
        respect_default_presence: false,
        require_nullable_fields: true,
        ..Self::DEFAULT
    };

    /// Whether `property` of `object` belongs in the emitted `required` list.
    pub fn is_required(&self, object: &ObjectNode, property: &Property) -> bool {
        if self.respect_default_presence {
            object.required.contains(&property.name)
        } else {
            self.require_nullable_fields || !property.type_ref.is_nullable()
        }
    }
}

impl Default for JsonSchemaConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Options for [`crate::transform::FunctionCallingTransformer`].
///
/// Required-ness is not configurable here: tool-calling APIs in strict mode
/// demand every parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionCallingConfig {
    pub strict: bool,
}

impl Default for FunctionCallingConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Top-level project configuration loaded from `.typeschema.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub input: String,
    pub output: Option<String>,
    pub target: TargetKind,
    /// Document name; falls back to the root type's id.
    pub root_name: Option<String>,
    pub json_schema: JsonSchemaConfig,
    pub function_calling: FunctionCallingConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            input: "type-graph.yaml".to_string(),
            output: None,
            target: TargetKind::JsonSchema,
            root_name: None,
            json_schema: JsonSchemaConfig::default(),
            function_calling: FunctionCallingConfig::default(),
        }
    }
}

/// Which schema flavor to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    JsonSchema,
    FunctionCalling,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".typeschema.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ProjectConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ProjectConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# typeschema configuration
input: type-graph.yaml
# output: schema.json        # stdout when unset
target: json_schema          # json_schema | function_calling
# root_name: User            # defaults to the root type id

json_schema:
  strict_schema_flag: false
  respect_default_presence: true
  require_nullable_fields: true
  use_union_types: true
  use_nullable_field: false
  include_openapi_discriminator: false
  include_schema_uri: false

function_calling:
  strict: true
"#
}

use serde::{Deserialize, Serialize};

use super::definition::ObjectPropertyDefinition;

/// Tool kind tag of a function-calling schema. Always `"function"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    #[default]
    Function,
}

/// A tool definition for LLM function-calling APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallingSchema {
    #[serde(rename = "type", default)]
    pub tool_type: ToolType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_strict")]
    pub strict: bool,
    pub parameters: ObjectPropertyDefinition,
}

fn default_strict() -> bool {
    true
}

impl FunctionCallingSchema {
    pub fn new(name: impl Into<String>, parameters: ObjectPropertyDefinition) -> Self {
        Self {
            tool_type: ToolType::Function,
            name: name.into(),
            description: String::new(),
            strict: default_strict(),
            parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_function_tag_and_strict_by_default() {
        let schema = FunctionCallingSchema::new("get_weather", ObjectPropertyDefinition::default());
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "function",
                "name": "get_weather",
                "description": "",
                "strict": true,
                "parameters": {"type": "object"}
            })
        );
    }

    #[test]
    fn missing_strict_reads_as_true() {
        let schema: FunctionCallingSchema = serde_json::from_value(json!({
            "type": "function",
            "name": "lookup",
            "parameters": {"type": "object", "properties": {}}
        }))
        .unwrap();
        assert!(schema.strict);
        assert_eq!(schema.description, "");
    }

    #[test]
    fn rejects_other_tool_types() {
        let result: Result<FunctionCallingSchema, _> = serde_json::from_value(json!({
            "type": "retrieval",
            "name": "lookup",
            "parameters": {"type": "object"}
        }));
        assert!(result.is_err());
    }
}

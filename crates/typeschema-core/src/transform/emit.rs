use serde_json::Value;

use crate::ir::{EnumNode, PrimitiveKind, Property};
use crate::schema::{
    BooleanPropertyDefinition, NumericPropertyDefinition, PropertyDefinition,
    StringPropertyDefinition,
};

/// How a nullable value shape is marked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NullEncoding {
    /// Append `"null"` to `type`.
    pub union_type: bool,
    /// Set the legacy `nullable: true` flag.
    pub nullable_flag: bool,
    /// Append `null` to `enum`, so strict validators accept it.
    pub null_in_enum: bool,
}

pub(crate) fn primitive_definition(kind: PrimitiveKind) -> PropertyDefinition {
    match kind {
        PrimitiveKind::String => StringPropertyDefinition::default().into(),
        PrimitiveKind::Boolean => BooleanPropertyDefinition::default().into(),
        PrimitiveKind::Int | PrimitiveKind::Long | PrimitiveKind::Float | PrimitiveKind::Double => {
            NumericPropertyDefinition::of_type(kind.json_type()).into()
        }
    }
}

pub(crate) fn enum_definition(node: &EnumNode) -> PropertyDefinition {
    StringPropertyDefinition {
        description: node.description.clone(),
        enum_values: Some(node.entries.iter().cloned().map(Value::String).collect()),
        ..Default::default()
    }
    .into()
}

/// `{}`, accepting any value. Stands in for the `Any` fallback type.
pub(crate) fn any_definition() -> PropertyDefinition {
    StringPropertyDefinition::untyped().into()
}

/// Mark `definition` as accepting `null`.
///
/// Value shapes get the null type folded into `type` or flagged, as the
/// encoding allows; unions grow a `{type: null}` branch; anything else,
/// including value shapes the encoding cannot mark, is wrapped in a
/// two-branch `oneOf`. `{}` is returned unchanged.
pub(crate) fn into_nullable(
    definition: PropertyDefinition,
    encoding: NullEncoding,
) -> PropertyDefinition {
    match definition {
        PropertyDefinition::OneOf(mut one_of) => {
            push_null_branch(&mut one_of.one_of);
            PropertyDefinition::OneOf(one_of)
        }
        PropertyDefinition::AnyOf(mut any_of) => {
            push_null_branch(&mut any_of.any_of);
            PropertyDefinition::AnyOf(any_of)
        }
        other @ (PropertyDefinition::Reference(_) | PropertyDefinition::AllOf(_)) => {
            PropertyDefinition::one_of(vec![other, PropertyDefinition::null()])
        }
        value if is_unconstrained(&value) => value,
        mut value => {
            let mut marked = false;
            if encoding.union_type {
                if let Some(types) = value.type_mut() {
                    types.push_unique("null");
                    marked = true;
                }
            }
            if encoding.nullable_flag {
                if let Some(flag) = value.nullable_mut() {
                    *flag = Some(true);
                    marked = true;
                }
            }
            if !marked {
                return PropertyDefinition::one_of(vec![value, PropertyDefinition::null()]);
            }
            if encoding.null_in_enum {
                if let PropertyDefinition::String(ref mut string) = value {
                    if let Some(ref mut values) = string.enum_values {
                        if !values.contains(&Value::Null) {
                            values.push(Value::Null);
                        }
                    }
                }
            }
            value
        }
    }
}

/// Whether `definition` is `{}`, which already accepts `null`.
pub(crate) fn is_unconstrained(definition: &PropertyDefinition) -> bool {
    *definition == any_definition()
}

fn push_null_branch(branches: &mut Vec<PropertyDefinition>) {
    let null = PropertyDefinition::null();
    if !branches.contains(&null) {
        branches.push(null);
    }
}

/// Apply property-level annotations. The property's description replaces
/// whatever the type carried.
pub(crate) fn annotate_property(
    mut definition: PropertyDefinition,
    property: &Property,
    include_default: bool,
) -> PropertyDefinition {
    if let Some(ref description) = property.description {
        definition.set_description(Some(description.clone()));
    }
    if include_default {
        if let Some(ref value) = property.default_value {
            definition.set_default(value.clone());
        }
    }
    definition
}

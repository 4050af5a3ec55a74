//! Signature codec
//!
//! Derives the stable identifier that keys the method and constructor
//! indices: the qualified member name plus the ordered argument-type list,
//! with primitives normalized to their wrapper classes so that a boxed
//! parameter and its primitive counterpart encode identically. Pure
//! functions, no shared state.

use std::sync::Arc;

use refract_core::{ClassId, TypeRef, TypeRegistry, Value};

use crate::error::{ReflectError, ReflectResult};

/// Canonical identifier for an overloaded member: member name plus the
/// canonicalized ordered parameter list. Deterministic and
/// order-sensitive; used as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    name: Option<Arc<str>>,
    params: Vec<ClassId>,
}

impl Signature {
    /// The canonical empty identifier: no member name, no argument types.
    /// Used for niladic lookups with no qualifying name.
    pub fn empty() -> Self {
        Self {
            name: None,
            params: Vec::new(),
        }
    }

    /// True for the canonical empty identifier.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.params.is_empty()
    }
}

/// Encode a member name and ordered argument-type list.
///
/// A primitive type and its wrapper class encode to the same identifier;
/// everything else keys on class identity. `encode(None, &[])` yields the
/// canonical empty identifier.
pub fn encode(name: Option<&str>, types: &[TypeRef]) -> Signature {
    Signature {
        name: name.map(Arc::from),
        params: types.iter().map(|ty| ty.canonical_class()).collect(),
    }
}

/// The concrete runtime types of a list of argument values.
///
/// Each argument contributes its own runtime type, not any declared type.
/// A null argument has no runtime type and fails with
/// [`ReflectError::NullArgument`].
pub fn runtime_types(args: &[Value]) -> ReflectResult<Vec<TypeRef>> {
    args.iter()
        .map(|value| value.type_ref().ok_or(ReflectError::NullArgument))
        .collect()
}

/// Encode a member name against argument values' runtime types.
pub fn encode_values(name: Option<&str>, args: &[Value]) -> ReflectResult<Signature> {
    Ok(encode(name, &runtime_types(args)?))
}

/// Human-readable member rendering for error text: simple type names
/// joined by `", "` inside parentheses. Raw types, not canonicalized: a
/// primitive argument renders as `int`, not as its wrapper.
pub fn describe(registry: &TypeRegistry, name: &str, types: &[TypeRef]) -> String {
    let mut out = String::from(name);
    out.push('(');
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&registry.type_name(*ty));
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_core::{well_known, Primitive};

    #[test]
    fn test_empty_identifier() {
        assert_eq!(encode(None, &[]), Signature::empty());
        assert!(Signature::empty().is_empty());
        assert!(!encode(Some("run"), &[]).is_empty());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let types = [
            TypeRef::Primitive(Primitive::Int),
            TypeRef::Class(well_known::STRING),
        ];
        assert_eq!(encode(Some("foo"), &types), encode(Some("foo"), &types));
    }

    #[test]
    fn test_encoding_is_order_sensitive() {
        let ab = [
            TypeRef::Primitive(Primitive::Int),
            TypeRef::Class(well_known::STRING),
        ];
        let ba = [
            TypeRef::Class(well_known::STRING),
            TypeRef::Primitive(Primitive::Int),
        ];
        assert_ne!(encode(Some("foo"), &ab), encode(Some("foo"), &ba));
    }

    #[test]
    fn test_name_distinguishes_signatures() {
        let types = [TypeRef::Primitive(Primitive::Int)];
        assert_ne!(encode(Some("foo"), &types), encode(Some("bar"), &types));
        assert_ne!(encode(Some("foo"), &[]), encode(None, &[]));
    }

    #[test]
    fn test_primitive_and_wrapper_encode_identically() {
        let primitive = [TypeRef::Primitive(Primitive::Int)];
        let boxed = [TypeRef::Class(well_known::INT)];
        assert_eq!(encode(Some("foo"), &primitive), encode(Some("foo"), &boxed));

        // Width still matters.
        let long = [TypeRef::Primitive(Primitive::Long)];
        assert_ne!(encode(Some("foo"), &primitive), encode(Some("foo"), &long));
    }

    #[test]
    fn test_runtime_types_from_values() {
        let types =
            runtime_types(&[Value::Int(1), Value::from("x"), Value::Bool(true)]).unwrap();
        assert_eq!(
            types,
            vec![
                TypeRef::Primitive(Primitive::Int),
                TypeRef::Class(well_known::STRING),
                TypeRef::Primitive(Primitive::Bool),
            ]
        );
    }

    #[test]
    fn test_null_argument_has_no_type() {
        let err = runtime_types(&[Value::Int(1), Value::Null]).unwrap_err();
        assert!(matches!(err, ReflectError::NullArgument));
    }

    #[test]
    fn test_describe_joins_simple_names() {
        let registry = TypeRegistry::new();
        let rendered = describe(
            &registry,
            "foo",
            &[
                TypeRef::Primitive(Primitive::Int),
                TypeRef::Class(well_known::STRING),
            ],
        );
        assert_eq!(rendered, "foo(int, String)");
    }

    #[test]
    fn test_describe_niladic() {
        let registry = TypeRegistry::new();
        assert_eq!(describe(&registry, "run", &[]), "run()");
    }
}

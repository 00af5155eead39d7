//! ABI-canonical type strings
//!
//! One arm per [`TypeRef`] variant. Structs become tuples of their fields,
//! enums become `uint8`, value types their underlying type and contracts
//! `address`. Mappings and internal function types have no ABI encoding.

use crate::error::{TypeError, TypeResult};
use crate::scope::{Scope, TypeEntity, TypeIndex};
use ast::{ArrayLength, ElementaryType, StructDecl, TypeRef};

pub struct Canonicalizer<'i, 'a> {
    index: &'i TypeIndex<'a>,
}

impl<'i, 'a> Canonicalizer<'i, 'a> {
    pub fn new(index: &'i TypeIndex<'a>) -> Self {
        Self { index }
    }

    /// Canonical form of a parameter type written in `scope`
    pub fn canonicalize(&self, ty: &TypeRef, scope: Scope<'a>) -> TypeResult<String> {
        self.resolve(ty, scope, &mut Vec::new())
    }

    /// Canonical types of every parameter, failing on the first bad one
    pub fn canonicalize_all<'p>(
        &self,
        types: impl IntoIterator<Item = &'p TypeRef>,
        scope: Scope<'a>,
    ) -> TypeResult<Vec<String>> {
        types
            .into_iter()
            .map(|ty| self.canonicalize(ty, scope))
            .collect()
    }

    /// Inputs of the getter generated for a public state variable: one
    /// argument per mapping key and one `uint256` index per array dimension
    pub fn getter_inputs(&self, ty: &TypeRef, scope: Scope<'a>) -> TypeResult<Vec<String>> {
        let mut inputs = Vec::new();
        let mut current = ty;
        loop {
            match current {
                TypeRef::Mapping { key, value } => {
                    inputs.push(self.canonicalize(key, scope)?);
                    current = value;
                }
                TypeRef::Array { base, .. } => {
                    inputs.push(ElementaryType::Uint(256).to_string());
                    current = base;
                }
                _ => return Ok(inputs),
            }
        }
    }

    fn resolve(
        &self,
        ty: &TypeRef,
        scope: Scope<'a>,
        structs: &mut Vec<&'a StructDecl>,
    ) -> TypeResult<String> {
        match ty {
            TypeRef::Elementary(elementary) => Ok(elementary.to_string()),
            TypeRef::UserDefined(name) => self.resolve_named(name, scope, structs),
            TypeRef::Array { base, length } => {
                let base = self.resolve(base, scope, structs)?;
                match length {
                    None => Ok(format!("{}[]", base)),
                    Some(ArrayLength::Literal(n)) => Ok(format!("{}[{}]", base, n)),
                    Some(ArrayLength::Constant(name)) => {
                        let n = self
                            .index
                            .lookup_constant(name, scope)
                            .ok_or_else(|| TypeError::Unresolvable { name: name.clone() })?;
                        Ok(format!("{}[{}]", base, n))
                    }
                }
            }
            TypeRef::Mapping { .. } => Err(TypeError::invalid(ty, "mappings have no ABI encoding")),
            TypeRef::Function { external: true } => Ok("function".to_string()),
            TypeRef::Function { external: false } => Err(TypeError::invalid(
                ty,
                "internal function types have no ABI encoding",
            )),
        }
    }

    fn resolve_named(
        &self,
        name: &str,
        scope: Scope<'a>,
        structs: &mut Vec<&'a StructDecl>,
    ) -> TypeResult<String> {
        let entity = self
            .index
            .lookup_type(name, scope)
            .ok_or_else(|| TypeError::Unresolvable {
                name: name.to_string(),
            })?;

        match entity {
            TypeEntity::Struct { decl, scope } => {
                if structs.iter().any(|s| std::ptr::eq(*s, decl)) {
                    return Err(TypeError::StructCycle {
                        name: decl.name.clone(),
                    });
                }
                structs.push(decl);
                let fields = decl
                    .fields
                    .iter()
                    .map(|field| self.resolve(&field.ty, scope, structs))
                    .collect::<TypeResult<Vec<_>>>();
                structs.pop();
                Ok(format!("({})", fields?.join(",")))
            }
            TypeEntity::Enum(_) => Ok("uint8".to_string()),
            TypeEntity::UserType(decl) => Ok(decl.underlying.to_string()),
            TypeEntity::Contract(_) => Ok("address".to_string()),
        }
    }
}

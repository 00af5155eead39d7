//! Project-wide name resolution for user-defined types and constants
//!
//! Every struct, enum, value type and contract of every unit is registered
//! before anything is canonicalized, so declaration order never changes the
//! outcome. Unqualified names resolve in this order, first hit wins:
//!
//! 1. the current contract's own declarations
//! 2. its bases, depth-first in declared order
//! 3. file-level declarations of the same file
//! 4. file-level declarations of any file, by sorted path
//! 5. contract-like names anywhere (types only)

use ast::{ContractUnit, EnumDecl, SourceUnit, StructDecl, UserTypeDecl};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A contract together with the file that declares it
#[derive(Debug, Clone, Copy)]
pub struct ContractRef<'a> {
    pub unit: &'a SourceUnit,
    pub contract: &'a ContractUnit,
}

impl<'a> ContractRef<'a> {
    pub fn scope(&self) -> Scope<'a> {
        Scope {
            unit: self.unit,
            contract: Some(self.contract),
        }
    }

    fn key(&self) -> (&'a Path, &'a str) {
        (self.unit.path.as_path(), self.contract.name.as_str())
    }
}

/// The place a type expression is written
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub unit: &'a SourceUnit,
    pub contract: Option<&'a ContractUnit>,
}

impl<'a> Scope<'a> {
    pub fn file(unit: &'a SourceUnit) -> Self {
        Self { unit, contract: None }
    }

    pub fn contract(unit: &'a SourceUnit, contract: &'a ContractUnit) -> Self {
        Self {
            unit,
            contract: Some(contract),
        }
    }
}

/// What a user-defined type name refers to
#[derive(Debug, Clone, Copy)]
pub enum TypeEntity<'a> {
    /// Fields resolve in the scope that declares the struct
    Struct {
        decl: &'a StructDecl,
        scope: Scope<'a>,
    },
    Enum(&'a EnumDecl),
    UserType(&'a UserTypeDecl),
    Contract(&'a ContractUnit),
}

/// Bases of a contract in depth-first declared order
#[derive(Debug, Default)]
pub struct BaseWalk<'a> {
    pub found: Vec<ContractRef<'a>>,
    /// Base names with no matching contract in the project
    pub missing: Vec<String>,
}

pub struct TypeIndex<'a> {
    units: Vec<&'a SourceUnit>,
    contracts: HashMap<&'a str, ContractRef<'a>>,
}

impl<'a> TypeIndex<'a> {
    pub fn new(units: &'a [SourceUnit]) -> Self {
        let mut sorted: Vec<&'a SourceUnit> = units.iter().collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));

        let mut contracts = HashMap::new();
        for &unit in &sorted {
            for contract in &unit.contracts {
                contracts
                    .entry(contract.name.as_str())
                    .or_insert(ContractRef { unit, contract });
            }
        }

        Self {
            units: sorted,
            contracts,
        }
    }

    /// Units ordered by path
    pub fn units(&self) -> &[&'a SourceUnit] {
        &self.units
    }

    /// First contract with this name, by sorted path. A qualified base such
    /// as `Lib.Base` is looked up by its last segment.
    pub fn contract(&self, name: &str) -> Option<ContractRef<'a>> {
        let name = name.rsplit('.').next().unwrap_or(name);
        self.contracts.get(name).copied()
    }

    pub fn bases(&self, root: ContractRef<'a>) -> BaseWalk<'a> {
        let mut walk = BaseWalk::default();
        let mut seen = HashSet::new();
        seen.insert(root.key());
        self.visit_bases(root.contract, &mut seen, &mut walk);
        walk
    }

    fn visit_bases(
        &self,
        contract: &'a ContractUnit,
        seen: &mut HashSet<(&'a Path, &'a str)>,
        walk: &mut BaseWalk<'a>,
    ) {
        for name in &contract.bases {
            match self.contract(name) {
                Some(base) => {
                    if seen.insert(base.key()) {
                        walk.found.push(base);
                        self.visit_bases(base.contract, seen, walk);
                    }
                }
                None => {
                    if !walk.missing.contains(name) {
                        walk.missing.push(name.clone());
                    }
                }
            }
        }
    }

    /// Resolve a possibly qualified type name written in `scope`
    pub fn lookup_type(&self, name: &str, scope: Scope<'a>) -> Option<TypeEntity<'a>> {
        if let Some((container, member)) = split_qualified(name) {
            return match self.contract(container) {
                Some(owner) => self.find_in_hierarchy(owner, |c| contract_type(c.scope(), member)),
                // Import aliases (`Lib.Type` after `import "x" as Lib`)
                None => self.lookup_project_type(member),
            };
        }

        if let Some(contract) = scope.contract {
            let current = ContractRef {
                unit: scope.unit,
                contract,
            };
            if let Some(found) =
                self.find_in_hierarchy(current, |c| contract_type(c.scope(), name))
            {
                return Some(found);
            }
        }
        if let Some(found) = file_type(scope.unit, name) {
            return Some(found);
        }
        self.lookup_project_type(name)
    }

    fn lookup_project_type(&self, name: &str) -> Option<TypeEntity<'a>> {
        self.units
            .iter()
            .find_map(|&unit| file_type(unit, name))
            .or_else(|| self.contract(name).map(|c| TypeEntity::Contract(c.contract)))
    }

    /// Resolve an integer constant used as an array length
    pub fn lookup_constant(&self, name: &str, scope: Scope<'a>) -> Option<u64> {
        if let Some((container, member)) = split_qualified(name) {
            return match self.contract(container) {
                Some(owner) => self.find_in_hierarchy(owner, |c| contract_constant(c.contract, member)),
                None => self.units.iter().find_map(|&unit| file_constant(unit, member)),
            };
        }

        if let Some(contract) = scope.contract {
            let current = ContractRef {
                unit: scope.unit,
                contract,
            };
            if let Some(value) =
                self.find_in_hierarchy(current, |c| contract_constant(c.contract, name))
            {
                return Some(value);
            }
        }
        file_constant(scope.unit, name)
            .or_else(|| self.units.iter().find_map(|&unit| file_constant(unit, name)))
    }

    /// Search a contract, then its bases depth-first
    fn find_in_hierarchy<T>(
        &self,
        start: ContractRef<'a>,
        find: impl Fn(ContractRef<'a>) -> Option<T>,
    ) -> Option<T> {
        find(start).or_else(|| self.bases(start).found.into_iter().find_map(find))
    }
}

fn split_qualified(name: &str) -> Option<(&str, &str)> {
    let (path, member) = name.rsplit_once('.')?;
    let container = path.rsplit('.').next().unwrap_or(path);
    Some((container, member))
}

fn contract_type<'a>(scope: Scope<'a>, name: &str) -> Option<TypeEntity<'a>> {
    let contract = scope.contract?;
    if let Some(decl) = contract.structs.iter().find(|s| s.name == name) {
        return Some(TypeEntity::Struct { decl, scope });
    }
    if let Some(decl) = contract.enums.iter().find(|e| e.name == name) {
        return Some(TypeEntity::Enum(decl));
    }
    contract
        .user_types
        .iter()
        .find(|t| t.name == name)
        .map(TypeEntity::UserType)
}

fn file_type<'a>(unit: &'a SourceUnit, name: &str) -> Option<TypeEntity<'a>> {
    if let Some(decl) = unit.structs.iter().find(|s| s.name == name) {
        return Some(TypeEntity::Struct {
            decl,
            scope: Scope::file(unit),
        });
    }
    if let Some(decl) = unit.enums.iter().find(|e| e.name == name) {
        return Some(TypeEntity::Enum(decl));
    }
    unit.user_types
        .iter()
        .find(|t| t.name == name)
        .map(TypeEntity::UserType)
}

fn contract_constant(contract: &ContractUnit, name: &str) -> Option<u64> {
    contract.constants.iter().find(|c| c.name == name).map(|c| c.value)
}

fn file_constant(unit: &SourceUnit, name: &str) -> Option<u64> {
    unit.constants.iter().find(|c| c.name == name).map(|c| c.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{ContractKind, Position, StructField, TypeRef};

    fn contract(name: &str, bases: &[&str]) -> ContractUnit {
        let mut contract = ContractUnit::new(name, ContractKind::Contract, Position::default());
        contract.bases = bases.iter().map(|b| b.to_string()).collect();
        contract
    }

    fn with_struct(mut contract: ContractUnit, name: &str) -> ContractUnit {
        contract.structs.push(StructDecl {
            name: name.into(),
            fields: vec![StructField {
                name: "x".into(),
                ty: TypeRef::Elementary(ast::ElementaryType::Bool),
            }],
            position: Position::default(),
        });
        contract
    }

    #[test]
    fn test_bases_depth_first_and_cycle_guarded() {
        let mut unit = SourceUnit::new("A.sol");
        unit.contracts = vec![
            contract("A", &["B", "C"]),
            contract("B", &["D", "A"]),
            contract("C", &["D"]),
            contract("D", &["Missing"]),
        ];
        let units = vec![unit];
        let index = TypeIndex::new(&units);

        let a = index.contract("A").unwrap();
        let walk = index.bases(a);
        let names: Vec<_> = walk.found.iter().map(|c| c.contract.name.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "C"]);
        assert_eq!(walk.missing, vec!["Missing"]);
    }

    #[test]
    fn test_own_declaration_shadows_base_and_file() {
        let mut unit = SourceUnit::new("A.sol");
        unit.contracts = vec![
            with_struct(contract("Child", &["Parent"]), "Order"),
            with_struct(contract("Parent", &[]), "Order"),
        ];
        let units = vec![unit];
        let index = TypeIndex::new(&units);

        let child = index.contract("Child").unwrap();
        match index.lookup_type("Order", child.scope()) {
            Some(TypeEntity::Struct { scope, .. }) => {
                assert_eq!(scope.contract.unwrap().name, "Child")
            }
            other => panic!("unexpected {:?}", other),
        }
        match index.lookup_type("Parent.Order", child.scope()) {
            Some(TypeEntity::Struct { scope, .. }) => {
                assert_eq!(scope.contract.unwrap().name, "Parent")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_project_wide_fallback_by_sorted_path() {
        let mut b = SourceUnit::new("b/Types.sol");
        b.constants.push(ast::ConstantDecl {
            name: "SIZE".into(),
            value: 8,
        });
        let mut a = SourceUnit::new("a/Types.sol");
        a.constants.push(ast::ConstantDecl {
            name: "SIZE".into(),
            value: 4,
        });
        let mut user = SourceUnit::new("c/User.sol");
        user.contracts.push(contract("User", &[]));
        let units = vec![b, user, a];
        let index = TypeIndex::new(&units);

        let scope = index.contract("User").unwrap().scope();
        assert_eq!(index.lookup_constant("SIZE", scope), Some(4));
        assert!(matches!(
            index.lookup_type("User", scope),
            Some(TypeEntity::Contract(_))
        ));
        assert!(index.lookup_type("Nope", scope).is_none());
    }
}

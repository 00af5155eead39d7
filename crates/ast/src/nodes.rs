use crate::diagnostics::Diagnostic;
use crate::location::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One parsed Solidity file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Raw pragma directives, e.g. `solidity ^0.8.20`
    pub pragmas: Vec<String>,
    /// Import paths as written, never resolved
    pub imports: Vec<String>,
    pub contracts: Vec<ContractUnit>,
    /// File-level declarations outside any contract
    pub structs: Vec<StructDecl>,
    pub enums: Vec<EnumDecl>,
    pub user_types: Vec<UserTypeDecl>,
    pub constants: Vec<ConstantDecl>,
    pub errors: Vec<ErrorDecl>,
    pub events: Vec<EventDecl>,
    pub free_function_count: usize,
    /// Per-declaration problems recovered during extraction
    pub diagnostics: Vec<Diagnostic>,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pragmas: Vec::new(),
            imports: Vec::new(),
            contracts: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            user_types: Vec::new(),
            constants: Vec::new(),
            errors: Vec::new(),
            events: Vec::new(),
            free_function_count: 0,
            diagnostics: Vec::new(),
        }
    }

    /// The `solidity` version pragma, if declared
    pub fn solidity_version(&self) -> Option<&str> {
        self.pragmas
            .iter()
            .find_map(|p| p.strip_prefix("solidity").map(str::trim))
    }

    pub fn contract(&self, name: &str) -> Option<&ContractUnit> {
        self.contracts.iter().find(|c| c.name == name)
    }
}

/// Contract-like declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Contract,
    Interface,
    Library,
    Abstract,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Contract => write!(f, "contract"),
            ContractKind::Interface => write!(f, "interface"),
            ContractKind::Library => write!(f, "library"),
            ContractKind::Abstract => write!(f, "abstract"),
        }
    }
}

/// A contract, interface, library or abstract contract body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractUnit {
    pub name: String,
    pub kind: ContractKind,
    /// Base contract names in declared order, constructor arguments dropped
    pub bases: Vec<String>,
    pub functions: Vec<FunctionDecl>,
    pub events: Vec<EventDecl>,
    pub errors: Vec<ErrorDecl>,
    pub structs: Vec<StructDecl>,
    pub enums: Vec<EnumDecl>,
    pub user_types: Vec<UserTypeDecl>,
    pub constants: Vec<ConstantDecl>,
    /// Public state variables, which get a compiler-generated getter
    pub getters: Vec<StateVariableGetter>,
    /// Constructor, fallback and receive declarations
    pub special_functions: Vec<SpecialFunction>,
    pub modifier_count: usize,
    pub position: Position,
}

impl ContractUnit {
    pub fn new(name: impl Into<String>, kind: ContractKind, position: Position) -> Self {
        Self {
            name: name.into(),
            kind,
            bases: Vec::new(),
            functions: Vec::new(),
            events: Vec::new(),
            errors: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            user_types: Vec::new(),
            constants: Vec::new(),
            getters: Vec::new(),
            special_functions: Vec::new(),
            modifier_count: 0,
            position,
        }
    }

    pub fn has_constructor(&self) -> bool {
        self.special_functions
            .iter()
            .any(|s| matches!(s, SpecialFunction::Constructor))
    }
}

/// Functions without an externally callable selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialFunction {
    Constructor,
    Fallback,
    Receive,
}

/// Function visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

impl Visibility {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "public" => Some(Visibility::Public),
            "external" => Some(Visibility::External),
            "internal" => Some(Visibility::Internal),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    /// Public and external functions are reachable through the ABI
    pub fn is_externally_callable(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::External)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::External => write!(f, "external"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    /// `constant` is the pre-0.5 spelling of `view`
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "pure" => Some(StateMutability::Pure),
            "view" | "constant" => Some(StateMutability::View),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateMutability::Pure => write!(f, "pure"),
            StateMutability::View => write!(f, "view"),
            StateMutability::NonPayable => write!(f, "nonpayable"),
            StateMutability::Payable => write!(f, "payable"),
        }
    }
}

/// Elementary type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementaryType {
    Bool,
    String,
    Bytes,
    FixedBytes(u8),
    Address,
    Uint(u16),
    Int(u16),
    Fixed(u16, u8),
    Ufixed(u16, u8),
}

impl ElementaryType {
    /// Parse an elementary type keyword. Unsized aliases get their default
    /// width (`uint` is `uint256`, `byte` is `bytes1`, `fixed` is `fixed128x18`).
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "bool" => return Some(ElementaryType::Bool),
            "string" => return Some(ElementaryType::String),
            "bytes" => return Some(ElementaryType::Bytes),
            "byte" => return Some(ElementaryType::FixedBytes(1)),
            "address" => return Some(ElementaryType::Address),
            "uint" => return Some(ElementaryType::Uint(256)),
            "int" => return Some(ElementaryType::Int(256)),
            "fixed" => return Some(ElementaryType::Fixed(128, 18)),
            "ufixed" => return Some(ElementaryType::Ufixed(128, 18)),
            _ => {}
        }

        if let Some(bits) = word.strip_prefix("uint") {
            return parse_int_width(bits).map(ElementaryType::Uint);
        }
        if let Some(bits) = word.strip_prefix("int") {
            return parse_int_width(bits).map(ElementaryType::Int);
        }
        if let Some(size) = word.strip_prefix("bytes") {
            return parse_decimal(size)
                .filter(|n| (1..=32).contains(n))
                .map(|n| ElementaryType::FixedBytes(n as u8));
        }
        if let Some(rest) = word.strip_prefix("ufixed") {
            return parse_fixed_dims(rest).map(|(m, n)| ElementaryType::Ufixed(m, n));
        }
        if let Some(rest) = word.strip_prefix("fixed") {
            return parse_fixed_dims(rest).map(|(m, n)| ElementaryType::Fixed(m, n));
        }
        None
    }
}

fn parse_decimal(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_int_width(bits: &str) -> Option<u16> {
    parse_decimal(bits)
        .filter(|n| *n >= 8 && *n <= 256 && n % 8 == 0)
        .map(|n| n as u16)
}

fn parse_fixed_dims(rest: &str) -> Option<(u16, u8)> {
    let (m, n) = rest.split_once('x')?;
    let m = parse_int_width(m)?;
    let n: u8 = if n == "0" { 0 } else { parse_decimal(n)?.try_into().ok()? };
    (n <= 80).then_some((m, n))
}

impl fmt::Display for ElementaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementaryType::Bool => write!(f, "bool"),
            ElementaryType::String => write!(f, "string"),
            ElementaryType::Bytes => write!(f, "bytes"),
            ElementaryType::FixedBytes(n) => write!(f, "bytes{}", n),
            ElementaryType::Address => write!(f, "address"),
            ElementaryType::Uint(bits) => write!(f, "uint{}", bits),
            ElementaryType::Int(bits) => write!(f, "int{}", bits),
            ElementaryType::Fixed(m, n) => write!(f, "fixed{}x{}", m, n),
            ElementaryType::Ufixed(m, n) => write!(f, "ufixed{}x{}", m, n),
        }
    }
}

/// Declared length of a fixed-size array dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayLength {
    Literal(u64),
    /// A named integer constant, resolved during canonicalization
    Constant(String),
}

impl fmt::Display for ArrayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLength::Literal(n) => write!(f, "{}", n),
            ArrayLength::Constant(name) => write!(f, "{}", name),
        }
    }
}

/// A type as written in the source, before resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Elementary(ElementaryType),
    /// Struct, enum, value type or contract name, possibly qualified (`Lib.Point`)
    UserDefined(String),
    Array {
        base: Box<TypeRef>,
        length: Option<ArrayLength>,
    },
    Mapping {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    Function {
        external: bool,
    },
}

impl TypeRef {
    pub fn is_mapping(&self) -> bool {
        matches!(self, TypeRef::Mapping { .. })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Elementary(ty) => write!(f, "{}", ty),
            TypeRef::UserDefined(name) => write!(f, "{}", name),
            TypeRef::Array { base, length } => match length {
                Some(len) => write!(f, "{}[{}]", base, len),
                None => write!(f, "{}[]", base),
            },
            TypeRef::Mapping { key, value } => write!(f, "mapping({} => {})", key, value),
            TypeRef::Function { external: true } => write!(f, "function external"),
            TypeRef::Function { external: false } => write!(f, "function"),
        }
    }
}

/// Function, event or error parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Option<String>,
    pub ty: TypeRef,
    /// Only meaningful for event parameters
    pub indexed: bool,
}

impl Parameter {
    pub fn new(ty: TypeRef, name: Option<String>) -> Self {
        Self {
            name,
            ty,
            indexed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub visibility: Visibility,
    /// False when the visibility was defaulted rather than written
    pub visibility_explicit: bool,
    pub mutability: StateMutability,
    pub is_virtual: bool,
    pub is_override: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDecl {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub anonymous: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDecl {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<StructField>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<String>,
    pub position: Position,
}

/// `type Price is uint128;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTypeDecl {
    pub name: String,
    pub underlying: ElementaryType,
    pub position: Position,
}

/// Integer constant with a literal value, usable as an array length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDecl {
    pub name: String,
    pub value: u64,
}

/// A `public` state variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVariableGetter {
    pub name: String,
    pub ty: TypeRef,
    pub position: Position,
}

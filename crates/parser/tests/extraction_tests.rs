use ast::{
    ArrayLength, ContractKind, DiagnosticKind, ElementaryType, SpecialFunction, StateMutability,
    TypeRef, Visibility,
};
use parser::Parser;

fn parse(source: &str) -> ast::SourceUnit {
    Parser::new().parse(source, "Test.sol").expect("source should tokenize")
}

fn has_diagnostic(unit: &ast::SourceUnit, kind: DiagnosticKind) -> bool {
    unit.diagnostics.iter().any(|d| d.kind == kind)
}

#[test]
fn test_function_with_body_and_modifiers() {
    let unit = parse(
        r#"
        contract Vault is Ownable, Pausable(true) {
            function deposit(uint256 amount, address payable to) external payable whenNotPaused nonReentrant returns (bool ok) {
                if (amount == 0) { revert(); }
                ok = true;
            }
            function peek() public view virtual override(Base) returns (uint) { return 1; }
        }
        "#,
    );

    let vault = unit.contract("Vault").unwrap();
    assert_eq!(vault.bases, vec!["Ownable", "Pausable"]);
    assert_eq!(vault.functions.len(), 2);

    let deposit = &vault.functions[0];
    assert_eq!(deposit.visibility, Visibility::External);
    assert_eq!(deposit.mutability, StateMutability::Payable);
    assert_eq!(deposit.parameters.len(), 2);
    assert_eq!(deposit.parameters[1].ty, TypeRef::Elementary(ElementaryType::Address));
    assert_eq!(deposit.parameters[1].name.as_deref(), Some("to"));

    let peek = &vault.functions[1];
    assert_eq!(peek.mutability, StateMutability::View);
    assert!(peek.is_virtual);
    assert!(peek.is_override);
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
}

#[test]
fn test_events_and_errors() {
    let unit = parse(
        r#"
        error Unauthorized(address caller);
        interface IERC20 {
            event Transfer(address indexed from, address indexed to, uint256 value);
            event Debug(string message) anonymous;
            error InsufficientBalance(uint256 available, uint256 required);
            function transfer(address to, uint256 amount) external returns (bool);
        }
        "#,
    );

    assert_eq!(unit.errors.len(), 1);
    assert_eq!(unit.errors[0].name, "Unauthorized");

    let token = unit.contract("IERC20").unwrap();
    assert_eq!(token.kind, ContractKind::Interface);
    assert_eq!(token.events.len(), 2);
    assert!(token.events[0].parameters[0].indexed);
    assert!(!token.events[0].parameters[2].indexed);
    assert!(token.events[1].anonymous);
    assert_eq!(token.errors[0].parameters.len(), 2);
}

#[test]
fn test_comments_and_strings_hide_declarations() {
    let unit = parse(
        r#"
        // contract Fake { function hidden() external {} }
        /* function alsoHidden() public {} */
        contract Real {
            string constant NOTE = "function ghost() external {}";
            function visible() external {}
        }
        "#,
    );

    assert_eq!(unit.contracts.len(), 1);
    let real = unit.contract("Real").unwrap();
    assert_eq!(real.functions.len(), 1);
    assert_eq!(real.functions[0].name, "visible");
}

#[test]
fn test_structs_enums_and_value_types() {
    let unit = parse(
        r#"
        struct Point { uint256 x; uint256 y; }
        type Price is uint128;
        uint256 constant MAX_POINTS = 0x10;
        contract Shapes {
            enum Color { Red, Green, Blue }
            struct Polygon { Point[MAX_POINTS] corners; Color fill; mapping(uint => bool) seen; }
        }
        "#,
    );

    assert_eq!(unit.structs[0].fields.len(), 2);
    assert_eq!(unit.user_types[0].underlying, ElementaryType::Uint(128));
    assert_eq!(unit.constants[0].value, 16);

    let shapes = unit.contract("Shapes").unwrap();
    assert_eq!(shapes.enums[0].variants, vec!["Red", "Green", "Blue"]);
    let polygon = &shapes.structs[0];
    assert_eq!(polygon.fields.len(), 3);
    assert_eq!(
        polygon.fields[0].ty,
        TypeRef::Array {
            base: Box::new(TypeRef::UserDefined("Point".into())),
            length: Some(ArrayLength::Constant("MAX_POINTS".into())),
        }
    );
    assert!(polygon.fields[2].ty.is_mapping());
}

#[test]
fn test_public_state_variables_become_getters() {
    let unit = parse(
        r#"
        contract Registry {
            address public owner;
            mapping(address => mapping(uint256 => bool)) public approvals;
            uint256 private counter;
            uint256 public constant VERSION = 3;
            bytes32 public immutable DOMAIN;
        }
        "#,
    );

    let registry = unit.contract("Registry").unwrap();
    let names: Vec<_> = registry.getters.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["owner", "approvals", "VERSION", "DOMAIN"]);
    assert_eq!(registry.constants[0].name, "VERSION");
    assert_eq!(registry.constants[0].value, 3);
}

#[test]
fn test_special_functions_have_no_entry() {
    let unit = parse(
        r#"
        contract Wallet {
            constructor(address owner) { }
            receive() external payable { }
            fallback() external payable { }
            modifier onlyOwner() { _; }
            function() external payable { }
        }
        "#,
    );

    let wallet = unit.contract("Wallet").unwrap();
    assert!(wallet.functions.is_empty());
    assert!(wallet.has_constructor());
    assert_eq!(wallet.special_functions.len(), 4);
    assert_eq!(wallet.special_functions[3], SpecialFunction::Fallback);
    assert_eq!(wallet.modifier_count, 1);
}

#[test]
fn test_function_type_state_variables() {
    let unit = parse(
        r#"
        contract Hooks {
            function(uint256) external public cb;
            function (address) internal view returns (bool) check = isAllowed;
            function() external payable;
        }
        "#,
    );

    let hooks = unit.contract("Hooks").unwrap();
    assert!(hooks.functions.is_empty());
    assert_eq!(hooks.special_functions, vec![SpecialFunction::Fallback]);
    assert_eq!(hooks.getters.len(), 1);
    assert_eq!(hooks.getters[0].name, "cb");
    assert_eq!(hooks.getters[0].ty, TypeRef::Function { external: true });
    assert!(!has_diagnostic(&unit, DiagnosticKind::MalformedDeclaration));
}

#[test]
fn test_qualified_constant_array_length() {
    let unit = parse(
        r#"
        library L { uint256 constant N = 3; }
        contract A { function f(uint256[L.N] calldata x) external {} }
        "#,
    );

    let f = &unit.contract("A").unwrap().functions[0];
    assert_eq!(
        f.parameters[0].ty,
        TypeRef::Array {
            base: Box::new(TypeRef::Elementary(ElementaryType::Uint(256))),
            length: Some(ArrayLength::Constant("L.N".into())),
        }
    );
}

#[test]
fn test_abstract_contracts_and_libraries() {
    let unit = parse(
        r#"
        abstract contract Base { function hook() internal virtual; }
        library SafeMath { function add(uint a, uint b) internal pure returns (uint) { return a + b; } }
        "#,
    );

    assert_eq!(unit.contracts[0].kind, ContractKind::Abstract);
    assert_eq!(unit.contracts[0].functions[0].name, "hook");
    assert_eq!(unit.contracts[1].kind, ContractKind::Library);
    assert_eq!(unit.contracts[1].functions[0].mutability, StateMutability::Pure);
}

#[test]
fn test_implicit_visibility() {
    let unit = parse(
        r#"
        interface IPing { function ping(); }
        contract Legacy { function ping() { } }
        "#,
    );

    assert_eq!(unit.contracts[0].functions[0].visibility, Visibility::External);
    let legacy = &unit.contracts[1].functions[0];
    assert_eq!(legacy.visibility, Visibility::Internal);
    assert!(!legacy.visibility_explicit);
    assert!(has_diagnostic(&unit, DiagnosticKind::ImplicitVisibility));
}

#[test]
fn test_duplicate_modifier_keeps_first() {
    let unit = parse("contract A { function f() public external view pure {} }");
    let f = &unit.contracts[0].functions[0];
    assert_eq!(f.visibility, Visibility::Public);
    assert_eq!(f.mutability, StateMutability::View);
    assert_eq!(
        unit.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::DuplicateModifier)
            .count(),
        2
    );
}

#[test]
fn test_malformed_declaration_does_not_hide_siblings() {
    let unit = parse(
        r#"
        contract Broken {
            function bad(uint256 a,, uint256 b) external {}
            event Oops(uint256 value extra);
            function good(uint256 a) external {}
        }
        contract After {
            function still() external {}
        }
        "#,
    );

    let broken = unit.contract("Broken").unwrap();
    let names: Vec<_> = broken.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["good"]);
    assert!(broken.events.is_empty());
    assert_eq!(unit.contract("After").unwrap().functions.len(), 1);
    assert!(has_diagnostic(&unit, DiagnosticKind::MalformedDeclaration));
    assert!(unit.diagnostics.iter().all(|d| d.line.is_some()));
}

#[test]
fn test_stray_closing_brace_is_reported() {
    let unit = parse(
        r#"
        contract A { function a() external {} }
        }
        contract B { function b() external {} }
        "#,
    );

    assert_eq!(unit.contracts.len(), 2);
    assert_eq!(unit.contract("B").unwrap().functions[0].name, "b");
    assert!(has_diagnostic(&unit, DiagnosticKind::MalformedDeclaration));
}

#[test]
fn test_pragmas_imports_and_free_functions() {
    let unit = parse(
        r#"
        // SPDX-License-Identifier: MIT
        pragma solidity >=0.8.0 <0.9.0;
        pragma abicoder v2;
        import "./Token.sol";
        import {IERC20, IERC721 as NFT} from "@oz/interfaces.sol";
        function helper(uint256 x) pure returns (uint256) { return x * 2; }
        "#,
    );

    assert_eq!(unit.solidity_version(), Some(">=0.8.0 <0.9.0"));
    assert_eq!(unit.imports, vec!["./Token.sol", "@oz/interfaces.sol"]);
    assert_eq!(unit.free_function_count, 1);
    assert!(unit.contracts.is_empty());
}

#[test]
fn test_positions_are_one_based() {
    let unit = parse("contract A {\n    function f() external {}\n}");
    let f = &unit.contracts[0].functions[0];
    assert_eq!(f.position.line(), 2);
    assert_eq!(f.position.column(), 5);
}

//! End-to-end scans over generated project trees

use ast::{DiagnosticKind, DiagnosticSeverity};
use project::Framework;
use scanner::{scan_all_sub_projects, scan_project, CancellationToken, ScanError, ScanOptions, Scanner};
use signatures::SignatureKind;
use std::path::Path;
use tempfile::TempDir;

const STORE: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

contract Store {
    event Transfer(address indexed from, address indexed to, uint256 amount);

    uint256 public value;

    function setValue(uint256 newValue) public {
        value = newValue;
        _bump();
    }

    function getValue() external view returns (uint256) {
        return value;
    }

    function _bump() internal {
        value += 1;
    }
}
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn foundry_project(root: &Path) {
    write(root, "foundry.toml", "[profile.default]\nsrc = \"src\"\n");
    write(root, "src/Store.sol", STORE);
    write(root, "lib/forge-std/src/Test.sol", "contract Test { function t() public {} }");
}

#[test]
fn test_foundry_project() {
    let temp = TempDir::new().unwrap();
    foundry_project(temp.path());

    let result = scan_project(temp.path()).unwrap();
    assert_eq!(result.project.framework, Framework::Foundry);
    assert_eq!(result.files_scanned, 1);
    assert_eq!(result.total_contracts, 1);
    assert_eq!(result.external_functions, 3);
    assert_eq!(result.internal_functions, 1);
    assert_eq!(result.events, 1);
    assert!(!result.cancelled);

    let store = &result.contracts[0];
    let set_value = store.find("setValue(uint256)").unwrap();
    assert_eq!(set_value.selector(), "0x55241077");
    assert_eq!(set_value.line, 10);

    let transfer = store.find("Transfer(address,address,uint256)").unwrap();
    assert_eq!(transfer.kind, SignatureKind::Event);
    assert_eq!(transfer.selector().len(), 66);
}

#[test]
fn test_selectors_are_stable_across_runs() {
    let temp = TempDir::new().unwrap();
    foundry_project(temp.path());

    let first = scan_project(temp.path()).unwrap();
    let second = scan_project(temp.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_hardhat_project() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "hardhat.config.js", "module.exports = { solidity: \"0.8.20\" };");
    write(temp.path(), "contracts/Store.sol", STORE);
    write(temp.path(), "node_modules/@oz/contracts/ERC20.sol", "contract ERC20 {}");

    let result = scan_project(temp.path()).unwrap();
    assert_eq!(result.project.framework, Framework::Hardhat);
    assert_eq!(result.project.solc_version.as_deref(), Some("0.8.20"));
    assert_eq!(result.total_contracts, 1);
}

#[test]
fn test_unknown_project_still_returns_a_result() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "README.md", "nothing here");

    let result = scan_project(temp.path()).unwrap();
    assert_eq!(result.project.framework, Framework::Unknown);
    assert_eq!(result.total_contracts, 0);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_type_rules() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "Exchange.sol",
        r#"
pragma solidity ^0.8.0;

struct Inner {
    bytes32 id;
    bool ok;
}

contract Exchange {
    struct Order {
        address maker;
        uint256 amount;
        Inner inner;
    }

    mapping(address => uint256) internal balances;

    function fill(Order calldata order) external {}
    function quote(uint256 amount) external view returns (uint256) { return amount; }
    function quote(address token) external view returns (uint256) { return 0; }
    function _credit(mapping(address => uint256) storage book, address who) internal {
        book[who] += 1;
    }
}
"#,
    );

    let result = scan_project(temp.path()).unwrap();
    let exchange = &result.contracts[0];

    assert!(exchange
        .find("fill((address,uint256,(bytes32,bool)))")
        .is_some());

    let by_uint = exchange.find("quote(uint256)").unwrap();
    let by_address = exchange.find("quote(address)").unwrap();
    assert_ne!(by_uint.selector(), by_address.selector());

    assert!(exchange.records.iter().all(|r| r.name != "_credit"));
    let dropped = result
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::InvalidParameterType)
        .unwrap();
    assert_eq!(dropped.severity, DiagnosticSeverity::Info);
}

#[test]
fn test_two_sub_projects() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a/foundry.toml", "[profile.default]\n");
    write(
        temp.path(),
        "a/src/Pair.sol",
        "contract Left { function l() external {} }\ncontract Right { function r() external {} }",
    );
    write(temp.path(), "b/hardhat.config.ts", "export default {};");
    write(temp.path(), "b/contracts/Solo.sol", "contract Solo { function s() external {} }");

    let result = scan_all_sub_projects(temp.path()).unwrap();
    assert_eq!(result.sub_projects.len(), 2);

    let sum: usize = result.sub_projects.iter().map(|s| s.total_contracts).sum();
    assert_eq!(sum, 3);
    assert_eq!(result.combined.total_contracts, sum);
    assert_eq!(result.combined.external_functions, 3);

    for contract in &result.combined.contracts {
        let project = contract.project.as_deref().unwrap();
        assert!(project == temp.path().join("a") || project == temp.path().join("b"));
        assert!(contract.records.iter().all(|r| r.project() == Some(project)));
    }
}

#[test]
fn test_nested_project_in_empty_parent() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "docs/notes.md", "# notes");
    foundry_project(&temp.path().join("protocol"));

    let result = scan_all_sub_projects(temp.path()).unwrap();
    assert_eq!(result.sub_projects.len(), 1);
    assert_eq!(result.sub_projects[0].project.root, temp.path().join("protocol"));
    assert_eq!(result.combined.total_contracts, result.sub_projects[0].total_contracts);
    assert_eq!(result.combined.total_contracts, 1);
}

#[test]
fn test_same_contract_name_in_two_sub_projects() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "v1/foundry.toml", "[profile.default]\n");
    write(temp.path(), "v1/src/Vault.sol", "contract Vault { function deposit() external {} }");
    write(temp.path(), "v2/foundry.toml", "[profile.default]\n");
    write(
        temp.path(),
        "v2/src/Vault.sol",
        "contract Vault { function deposit(uint256 amount) external {} }",
    );

    let result = scan_all_sub_projects(temp.path()).unwrap();
    let vaults: Vec<_> = result
        .combined
        .contracts
        .iter()
        .filter(|c| c.name == "Vault")
        .collect();
    assert_eq!(vaults.len(), 2);
    assert_ne!(vaults[0].project, vaults[1].project);
    assert!(vaults[0].find("deposit()").is_some());
    assert!(vaults[1].find("deposit(uint256)").is_some());
}

#[test]
fn test_cancellation() {
    let temp = TempDir::new().unwrap();
    foundry_project(temp.path());

    let token = CancellationToken::new();
    token.cancel();

    let scanner = Scanner::default().with_cancellation(token.clone());
    assert_eq!(scanner.scan_project(temp.path()).unwrap_err(), ScanError::Cancelled);

    let partial = Scanner::new(ScanOptions {
        partial_on_cancel: true,
        ..ScanOptions::default()
    })
    .with_cancellation(token);
    let result = partial.scan_project(temp.path()).unwrap();
    assert!(result.cancelled);
    assert_eq!(result.files_scanned, 0);
    assert_eq!(result.total_contracts, 0);
}

#[test]
fn test_inherited_members_are_not_double_counted() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "Tokens.sol",
        r#"
contract Base {
    function ping() external {}
}

contract Child is Base {
    function pong() external {}
}
"#,
    );

    let result = scan_project(temp.path()).unwrap();
    assert_eq!(result.total_contracts, 2);
    assert_eq!(result.external_functions, 2);

    let child = result.contracts.iter().find(|c| c.name == "Child").unwrap();
    assert!(child.find("ping()").unwrap().is_inherited());
}

#[test]
fn test_lib_and_build_folders_inside_sources_count() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "foundry.toml", "[profile.default]\n");
    write(temp.path(), "src/Main.sol", "contract Main { function run() external {} }");
    write(temp.path(), "src/lib/Math.sol", "contract Math { function add() external {} }");
    write(
        temp.path(),
        "src/core/build/Builder.sol",
        "contract Builder { function make() external {} }",
    );

    let result = scan_project(temp.path()).unwrap();
    assert_eq!(result.files_scanned, 3);
    assert_eq!(result.total_contracts, 3);
    assert_eq!(result.external_functions, 3);
}

//! Signature canonicalization against a resolved workspace.

use std::path::PathBuf;

use solspace::semantic::signature::{SignatureError, selector};
use solspace::semantic::Workspace;

fn synthetic(name: &str) -> PathBuf {
    PathBuf::from(format!("/virtual/{name}"))
}

async fn add_all(workspace: &Workspace, files: &[(&str, &str)]) {
    for (name, content) in files {
        workspace
            .add_source(synthetic(name), *content)
            .await
            .unwrap_or_else(|error| panic!("add {name}: {error}"));
    }
}

#[tokio::test]
async fn test_enum_struct_and_alias_canonicalization() {
    let workspace = Workspace::new(vec![]);
    add_all(
        &workspace,
        &[(
            "canon.sol",
            "contract C {\n\
               enum MyEnum { A, B }\n\
               struct MyStruct { uint x; address y; }\n\
               function foo(uint a, MyEnum b, MyStruct memory c) public {}\n\
             }",
        )],
    )
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let records = model.all_function_signatures(model.get(&synthetic("canon.sol")).unwrap());
    assert_eq!(records.len(), 1);
    let signature = records[0].result.as_ref().unwrap();
    assert_eq!(signature.signature, "foo(uint256,uint8,(uint256,address))");
    assert_eq!(
        signature.selector,
        selector("foo(uint256,uint8,(uint256,address))")
    );
    assert_eq!(signature.selector.len(), 8);
    assert!(signature.selector.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_bare_contract_reference_defaults_to_address() {
    let workspace = Workspace::new(vec![]);
    add_all(
        &workspace,
        &[(
            "handle.sol",
            "interface IToken { function ping() external; }\n\
             contract C { function wire(IToken token, uint256[] memory ids) public {} }",
        )],
    )
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let contract = model.get(&synthetic("handle.sol")).unwrap().contract("C").unwrap();
    let records = model.function_signatures(contract);
    let signature = records[0].result.as_ref().unwrap();
    assert_eq!(signature.signature, "wire(address,uint256[])");
}

#[tokio::test]
async fn test_inherited_struct_resolves_after_propagation() {
    let workspace = Workspace::new(vec![]);
    add_all(
        &workspace,
        &[
            (
                "base.sol",
                "contract Base { struct Order { uint256 amount; address maker; } }",
            ),
            (
                "market.sol",
                "contract Market is Base { function fill(Order memory order) public {} }",
            ),
        ],
    )
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let market = model.get(&synthetic("market.sol")).unwrap().contract("Market").unwrap();
    let records = model.function_signatures(market);
    let signature = records[0].result.as_ref().unwrap();
    assert_eq!(signature.signature, "fill((uint256,address))");
}

#[tokio::test]
async fn test_file_scope_struct_resolves() {
    let workspace = Workspace::new(vec![]);
    add_all(
        &workspace,
        &[(
            "filescope.sol",
            "struct Point { uint256 x; uint256 y; }\n\
             contract Plotter { function plot(Point memory point) public {} }",
        )],
    )
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let plotter = model
        .get(&synthetic("filescope.sol"))
        .unwrap()
        .contract("Plotter")
        .unwrap();
    let records = model.function_signatures(plotter);
    assert_eq!(
        records[0].result.as_ref().unwrap().signature,
        "plot((uint256,uint256))"
    );
}

#[tokio::test]
async fn test_unresolved_inheritance_fails_loudly() {
    let workspace = Workspace::new(vec![]);
    add_all(
        &workspace,
        &[(
            "early.sol",
            "contract C { function f(uint a) public {} }",
        )],
    )
    .await;
    // no with_parser_ready: the precondition must be reported, not a
    // silently wrong signature

    let model = workspace.model();
    let contract = model.get(&synthetic("early.sol")).unwrap().contract("C").unwrap();
    let records = model.function_signatures(contract);
    assert_eq!(records.len(), 1);
    assert!(matches!(
        records[0].result,
        Err(SignatureError::InheritanceNotResolved(_))
    ));
}

#[tokio::test]
async fn test_unresolvable_struct_is_captured_per_function() {
    let workspace = Workspace::new(vec![]);
    add_all(
        &workspace,
        &[(
            "broken.sol",
            "contract C {\n\
               function bad(Ghost memory g) public {}\n\
               function good(uint a) public {}\n\
             }",
        )],
    )
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let contract = model.get(&synthetic("broken.sol")).unwrap().contract("C").unwrap();
    let records = model.function_signatures(contract);
    assert_eq!(records.len(), 2);
    assert!(matches!(
        records[0].result,
        Err(SignatureError::UnresolvedType(_))
    ));
    assert_eq!(
        records[1].result.as_ref().unwrap().signature,
        "good(uint256)"
    );
}

#[tokio::test]
async fn test_private_and_internal_functions_are_skipped() {
    let workspace = Workspace::new(vec![]);
    add_all(
        &workspace,
        &[(
            "vis.sol",
            "contract C {\n\
               function a(uint x) public {}\n\
               function b(uint x) internal {}\n\
               function c(uint x) private {}\n\
               function d(uint x) external {}\n\
               constructor() {}\n\
             }",
        )],
    )
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let contract = model.get(&synthetic("vis.sol")).unwrap().contract("C").unwrap();
    let names: Vec<String> = model
        .function_signatures(contract)
        .iter()
        .map(|record| record.name.to_string())
        .collect();
    assert_eq!(names, vec!["a", "d"]);
}

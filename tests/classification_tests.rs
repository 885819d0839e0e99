//! Call-classification ground truths across both passes.

use std::path::PathBuf;

use solspace::semantic::{CallKind, CallType, Workspace};

fn synthetic(name: &str) -> PathBuf {
    PathBuf::from(format!("/virtual/{name}"))
}

async fn resolved_workspace(files: &[(&str, &str)]) -> Workspace {
    let workspace = Workspace::new(vec![]);
    for (name, content) in files {
        workspace
            .add_source(synthetic(name), *content)
            .await
            .unwrap_or_else(|error| panic!("add {name}: {error}"));
    }
    workspace.with_parser_ready(None, true).await.unwrap();
    workspace
}

fn named_call(
    workspace: &Workspace,
    file: &str,
    contract: &str,
    name: &str,
) -> (Option<CallKind>, Option<CallType>) {
    let model = workspace.model();
    let unit = model.get(&synthetic(file)).unwrap();
    let found = unit
        .contract(contract)
        .unwrap()
        .calls_matching(|call| call.name.as_deref() == Some(name));
    assert_eq!(found.len(), 1, "expected exactly one call named {name}");
    (found[0].kind, found[0].call_type)
}

#[tokio::test]
async fn test_address_variable_member_call_is_external() {
    let workspace = resolved_workspace(&[(
        "addr.sol",
        "contract C { function f(address a) public { a.send(1); } }",
    )])
    .await;
    assert_eq!(
        named_call(&workspace, "addr.sol", "C", "send"),
        (
            Some(CallKind::MemberAccessOfVar),
            Some(CallType::External)
        )
    );
}

#[tokio::test]
async fn test_address_cast_member_call_is_external() {
    let workspace = resolved_workspace(&[(
        "cast.sol",
        "contract C { function f(address a) public { address(a).call(\"\"); } }",
    )])
    .await;
    assert_eq!(
        named_call(&workspace, "cast.sol", "C", "call"),
        (
            Some(CallKind::MemberAccessOfAddress),
            Some(CallType::External)
        )
    );
}

#[tokio::test]
async fn test_library_call_through_using_for_is_not_external() {
    let workspace = resolved_workspace(&[(
        "safe.sol",
        "library SafeERC20 { function safeMove(IERC20 token, address to) internal {} }\n\
         interface IERC20 { function move(address to) external; }\n\
         contract C {\n\
           using SafeERC20 for IERC20;\n\
           IERC20 token;\n\
           function f(address to) public { token.safeMove(to); token.move(to); }\n\
         }",
    )])
    .await;

    // exported by the bound library: proven internal
    assert_eq!(
        named_call(&workspace, "safe.sol", "C", "safeMove"),
        (None, None)
    );
    // not exported anywhere: an external call through the interface handle
    assert_eq!(
        named_call(&workspace, "safe.sol", "C", "move"),
        (
            Some(CallKind::MemberAccessOfVar),
            Some(CallType::External)
        )
    );
}

#[tokio::test]
async fn test_second_pass_unclassifies_late_arriving_library() {
    let workspace = Workspace::new(vec![]);
    // consumer first: the library is unknown when this unit integrates
    workspace
        .add_source(
            synthetic("consumer.sol"),
            "contract C { Counters.Counter private idx; function f() public { idx.increment(); } }",
        )
        .await
        .unwrap();
    workspace
        .add_source(
            synthetic("counters.sol"),
            "library Counters { struct Counter { uint256 value; } function increment(Counter storage counter) internal {} }",
        )
        .await
        .unwrap();
    workspace.with_parser_ready(None, true).await.unwrap();

    assert_eq!(
        named_call(&workspace, "consumer.sol", "C", "increment"),
        (None, None)
    );
}

#[tokio::test]
async fn test_inherited_state_var_call_resolves_in_second_pass() {
    let workspace = resolved_workspace(&[
        ("base.sol", "contract Base { address public vault; }"),
        (
            "child.sol",
            "contract Child is Base { function f() public { vault.withdraw(); } }",
        ),
    ])
    .await;
    assert_eq!(
        named_call(&workspace, "child.sol", "Child", "withdraw"),
        (
            Some(CallKind::InheritedStateVarAccess),
            Some(CallType::External)
        )
    );
}

#[tokio::test]
async fn test_unknown_member_call_stays_inconclusive() {
    let workspace = resolved_workspace(&[(
        "lost.sol",
        "contract C { function f() public { phantom.poke(); } }",
    )])
    .await;
    assert_eq!(
        named_call(&workspace, "lost.sol", "C", "poke"),
        (
            Some(CallKind::MemberAccessOfUnknownIdentifier),
            Some(CallType::Inconclusive)
        )
    );
}

#[tokio::test]
async fn test_global_evm_var_member_call() {
    let workspace = resolved_workspace(&[(
        "global.sol",
        "contract C { function f() public { msg.sender.transfer(1); } }",
    )])
    .await;
    assert_eq!(
        named_call(&workspace, "global.sol", "C", "transfer"),
        (
            Some(CallKind::MemberAccessOfGlobalEvmVar),
            Some(CallType::External)
        )
    );
}

#[tokio::test]
async fn test_name_value_call_is_always_external() {
    let workspace = resolved_workspace(&[(
        "value.sol",
        "contract C { function f(address a) public { Vault(a).deposit{value: 1 ether}(); } }",
    )])
    .await;
    assert_eq!(
        named_call(&workspace, "value.sol", "C", "deposit"),
        (Some(CallKind::NameValueCall), Some(CallType::External))
    );
}

#[tokio::test]
async fn test_contract_typecast_known_vs_anonymous() {
    let workspace = resolved_workspace(&[(
        "casts.sol",
        "contract Token { function pull() public {} }\n\
         contract C { function f(address a) public { Token(a).pull(); Stranger(a).poke(); } }",
    )])
    .await;
    assert_eq!(
        named_call(&workspace, "casts.sol", "C", "pull"),
        (Some(CallKind::ContractTypecast), Some(CallType::External))
    );
    assert_eq!(
        named_call(&workspace, "casts.sol", "C", "poke"),
        (
            Some(CallKind::ContractTypecastAnonymous),
            Some(CallType::External)
        )
    );
}

#[tokio::test]
async fn test_array_and_mapping_member_calls() {
    let workspace = resolved_workspace(&[(
        "indexed.sol",
        "contract Token { function ping() public {} }\n\
         contract C {\n\
           address[] owners;\n\
           mapping(uint256 => address) holders;\n\
           mapping(uint256 => Token) tokens;\n\
           function f(uint256 i) public {\n\
             owners[i].send(1);\n\
             holders[i].send(2);\n\
             tokens[i].ping();\n\
           }\n\
         }",
    )])
    .await;
    {
        let model = workspace.model();
        let found = model
            .get(&synthetic("indexed.sol"))
            .unwrap()
            .contract("C")
            .unwrap()
            .calls_matching(|call| call.name.as_deref() == Some("send"));
        assert_eq!(found.len(), 2);
        assert_eq!(
            (found[0].kind, found[0].call_type),
            (
                Some(CallKind::MemberAccessOfArrayVar),
                Some(CallType::External)
            )
        );
        assert_eq!(
            (found[1].kind, found[1].call_type),
            (
                Some(CallKind::MemberAccessOfAddressMappingValue),
                Some(CallType::External)
            )
        );
    }
    assert_eq!(
        named_call(&workspace, "indexed.sol", "C", "ping"),
        (
            Some(CallKind::MemberAccessOfUserDefinedMappingValue),
            Some(CallType::External)
        )
    );
}

#[tokio::test]
async fn test_regular_and_builtin_calls_stay_internal() {
    let workspace = resolved_workspace(&[(
        "internal.sol",
        "contract C { function helper() internal {} function f() public { helper(); require(true); } }",
    )])
    .await;
    assert_eq!(
        named_call(&workspace, "internal.sol", "C", "helper"),
        (Some(CallKind::Regular), None)
    );

    let model = workspace.model();
    let externals = model
        .get(&synthetic("internal.sol"))
        .unwrap()
        .external_calls();
    assert!(externals.is_empty());
}

#[tokio::test]
async fn test_external_calls_query_surface() {
    let workspace = resolved_workspace(&[(
        "surface.sol",
        "contract C { function f(address a) public { a.send(1); address(a).call(\"\"); helper(); } function helper() internal {} }",
    )])
    .await;
    let model = workspace.model();
    let unit = model.get(&synthetic("surface.sol")).unwrap();
    assert_eq!(unit.external_calls().len(), 2);
    assert_eq!(
        unit.calls_matching(|call| call.call_type.is_some()).len(),
        2
    );
}

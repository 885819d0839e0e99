//! Workspace orchestration: scheduling, dedup, linearization, and the
//! inherited-name propagation pass.

use std::path::{Path, PathBuf};
use std::time::Duration;

use solspace::semantic::{
    AddOptions, Ancestor, ContractId, Workspace, WorkspaceError, WorkspaceOptions,
};
use tokio_util::sync::CancellationToken;

fn synthetic(name: &str) -> PathBuf {
    PathBuf::from(format!("/virtual/{name}"))
}

async fn workspace_with(files: &[(&str, &str)]) -> Workspace {
    let workspace = Workspace::new(vec![]);
    for (name, content) in files {
        workspace
            .add_source(synthetic(name), *content)
            .await
            .unwrap_or_else(|error| panic!("add {name}: {error}"));
    }
    workspace
}

fn linearized_names(workspace: &Workspace, contract: &str) -> Vec<String> {
    let model = workspace.model();
    let id = model.contracts_by_name()[contract];
    model
        .contract(id)
        .unwrap()
        .linearized
        .iter()
        .map(|ancestor| match ancestor {
            Ancestor::Resolved(id) => model.contract(*id).unwrap().name.to_string(),
            Ancestor::Unknown(name) => name.to_string(),
        })
        .collect()
}

#[tokio::test]
async fn test_linearization_order_matches_solidity() {
    let workspace = workspace_with(&[(
        "chain.sol",
        "contract A {}\ncontract B is A {}\ncontract C is A, B {}",
    )])
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    assert_eq!(linearized_names(&workspace, "C"), vec!["B", "A"]);
    assert_eq!(linearized_names(&workspace, "B"), vec!["A"]);
}

#[tokio::test]
async fn test_diamond_conflict_is_surfaced() {
    let workspace = workspace_with(&[(
        "conflict.sol",
        "contract X {}\ncontract Y {}\ncontract A is X, Y {}\ncontract B is Y, X {}\ncontract C is A, B {}",
    )])
    .await;
    let result = workspace.with_parser_ready(None, true).await;
    assert!(matches!(
        result,
        Err(WorkspaceError::UnresolvedInheritanceOrder { .. })
    ));
}

#[tokio::test]
async fn test_unknown_base_stays_placeholder() {
    let workspace =
        workspace_with(&[("orphan.sol", "contract Child is Missing { }")]).await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let contract = model.get(&synthetic("orphan.sol")).unwrap().contract("Child").unwrap();
    assert_eq!(
        contract.linearized,
        vec![Ancestor::Unknown("Missing".into())]
    );
    assert!(contract.resolved_inheritance);
    assert!(contract.inherited_names.is_empty());
}

#[tokio::test]
async fn test_inherited_names_propagate_across_files() {
    let workspace = workspace_with(&[
        (
            "base.sol",
            "contract Base { uint256 public total; uint256 private secret; function f() public {} event Moved(address to); }",
        ),
        ("child.sol", "import \"./base.sol\";\ncontract Child is Base {}"),
    ])
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let child = model.get(&synthetic("child.sol")).unwrap().contract("Child").unwrap();
    assert_eq!(linearized_names(&workspace, "Child"), vec!["Base"]);
    assert!(child.inherited_names.contains_key("f"));
    assert!(child.inherited_names.contains_key("total"));
    assert!(child.inherited_names.contains_key("Moved"));
    assert!(!child.inherited_names.contains_key("secret"));
    assert!(child.resolved_inheritance);
}

#[tokio::test]
async fn test_interface_donates_only_type_declarations() {
    let workspace = workspace_with(&[(
        "iface.sol",
        "interface IVault { struct Slot { uint256 amount; } function peek() external; }\ncontract Vault is IVault { function peek() external {} }",
    )])
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let vault = model.get(&synthetic("iface.sol")).unwrap().contract("Vault").unwrap();
    assert!(vault.inherited_structs.contains_key("Slot"));
    assert!(!vault.inherited_names.contains_key("peek"));
}

#[tokio::test]
async fn test_scope_file_restricts_propagation() {
    let workspace = workspace_with(&[
        ("a.sol", "contract BaseA { function fa() public {} }\ncontract ChildA is BaseA {}"),
        ("b.sol", "contract BaseB { function fb() public {} }\ncontract ChildB is BaseB {}"),
    ])
    .await;
    workspace
        .with_parser_ready(Some(&synthetic("a.sol")), false)
        .await
        .unwrap();

    let model = workspace.model();
    let child_a = model.get(&synthetic("a.sol")).unwrap().contract("ChildA").unwrap();
    let child_b = model.get(&synthetic("b.sol")).unwrap().contract("ChildB").unwrap();
    assert!(child_a.resolved_inheritance);
    assert!(child_a.inherited_names.contains_key("fa"));
    // linearized but not propagated
    assert!(!child_b.resolved_inheritance);
    assert!(child_b.inherited_names.is_empty());
    assert_eq!(child_b.linearized.len(), 1);
}

#[tokio::test]
async fn test_with_parser_ready_is_idempotent() {
    let workspace = workspace_with(&[(
        "idem.sol",
        "contract A { function f() public {} }\ncontract B is A { function g(address a) public { a.send(1); } }",
    )])
    .await;
    workspace.with_parser_ready(None, true).await.unwrap();

    let snapshot = {
        let model = workspace.model();
        let unit = model.get(&synthetic("idem.sol")).unwrap();
        let b = unit.contract("B").unwrap();
        (
            linearized_names(&workspace, "B"),
            b.calls_matching(|_| true)
                .iter()
                .map(|call| (call.kind, call.call_type))
                .collect::<Vec<_>>(),
        )
    };

    workspace.with_parser_ready(None, true).await.unwrap();
    let model = workspace.model();
    let unit = model.get(&synthetic("idem.sol")).unwrap();
    let b = unit.contract("B").unwrap();
    assert_eq!(linearized_names(&workspace, "B"), snapshot.0);
    assert_eq!(
        b.calls_matching(|_| true)
            .iter()
            .map(|call| (call.kind, call.call_type))
            .collect::<Vec<_>>(),
        snapshot.1
    );
}

#[tokio::test]
async fn test_identical_content_under_two_paths_is_cloned() {
    let content = "contract Twin { uint256 public value; }";
    let workspace = workspace_with(&[("one.sol", content), ("two.sol", content)]).await;

    let model = workspace.model();
    let first = model.get(&synthetic("one.sol")).unwrap();
    let second = model.get(&synthetic("two.sol")).unwrap();
    assert_eq!(model.unit_count(), 2);
    assert_eq!(first.hash, second.hash);
    assert_ne!(first.path, second.path);
    assert_ne!(first.id, second.id);
    assert_eq!(
        first.contracts.keys().collect::<Vec<_>>(),
        second.contracts.keys().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_same_named_contracts_collapse_by_name_last_write_wins() {
    // Pinned behavior: the global by-name view keeps the last
    // registration; per-unit addressing still sees both.
    let workspace = workspace_with(&[
        ("first.sol", "contract Dup { function one() public {} }"),
        ("second.sol", "contract Dup { function two() public {} }"),
    ])
    .await;

    let model = workspace.model();
    assert_eq!(model.find_contracts_by_name("Dup").len(), 2);
    let by_name = model.contracts_by_name();
    let winner: ContractId = by_name["Dup"];
    assert_eq!(
        model.unit(winner.unit).path,
        synthetic("second.sol"),
        "last write wins"
    );
}

#[tokio::test]
async fn test_duplicate_adds_join_the_same_result() {
    let workspace = Workspace::new(vec![]);
    let path = synthetic("dup.sol");
    let content = "contract D {}";
    let (a, b) = tokio::join!(
        workspace.add_source(&path, content),
        workspace.add_source(&path, content)
    );
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(workspace.model().unit_count(), 1);
}

#[tokio::test]
async fn test_parse_failure_does_not_poison_siblings() {
    let workspace = Workspace::new(vec![]);
    workspace
        .add_source(synthetic("good.sol"), "contract Good {}")
        .await
        .unwrap();
    let bad = workspace
        .add_source(synthetic("bad.sol"), ")))) not solidity ((((")
        .await;
    assert!(matches!(bad, Err(WorkspaceError::Parse { .. })));

    let report = workspace.with_parser_ready(None, true).await.unwrap();
    assert!(report.parsed.len() >= 1);
    assert!(workspace.model().get(&synthetic("good.sol")).is_some());
}

#[tokio::test]
async fn test_cancelled_add_rejects_without_cancelling_siblings() {
    let workspace = Workspace::new(vec![]);
    let token = CancellationToken::new();
    token.cancel();
    let cancelled = workspace
        .add_with(
            synthetic("gone.sol"),
            AddOptions {
                content: Some("contract Gone {}".to_string()),
                skip_existing: false,
                cancel: Some(token),
            },
        )
        .await;
    assert!(matches!(cancelled, Err(WorkspaceError::Cancelled { .. })));

    // an unrelated add with its own (live) token is unaffected
    let sibling = workspace
        .add_with(
            synthetic("stays.sol"),
            AddOptions {
                content: Some("contract Stays {}".to_string()),
                skip_existing: false,
                cancel: Some(CancellationToken::new()),
            },
        )
        .await;
    assert!(sibling.is_ok());
}

#[tokio::test]
async fn test_zero_deadline_times_out() {
    let options = WorkspaceOptions {
        parser_deadline: Duration::ZERO,
        ..WorkspaceOptions::default()
    };
    let workspace = Workspace::with_options(vec![], options);
    let result = workspace
        .add_source(synthetic("slow.sol"), "contract Slow {}")
        .await;
    assert!(matches!(result, Err(WorkspaceError::Timeout { .. })));
}

#[tokio::test]
async fn test_missing_file_is_an_io_error() {
    let workspace = Workspace::new(vec![]);
    let result = workspace.add(Path::new("/does/not/exist.sol")).await;
    assert!(matches!(result, Err(WorkspaceError::Io { .. })));
}

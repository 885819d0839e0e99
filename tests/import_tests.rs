//! On-disk import following: diamond graphs, file-scope propagation, and
//! flatten output.

use std::fs;
use std::path::Path;

use solspace::base::normalize_path;
use solspace::semantic::Workspace;

fn write(root: &Path, name: &str, content: &str) {
    fs::write(root.join(name), content).unwrap();
}

#[tokio::test]
async fn test_diamond_import_graph_parses_each_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "shared.sol", "contract Shared { function s() public {} }");
    write(
        root,
        "left.sol",
        "import \"./shared.sol\";\ncontract Left is Shared {}",
    );
    write(
        root,
        "right.sol",
        "import \"./shared.sol\";\ncontract Right is Shared {}",
    );
    write(
        root,
        "main.sol",
        "import \"./left.sol\";\nimport \"./right.sol\";\ncontract Main is Left, Right {}",
    );

    let workspace = Workspace::new(vec![root.to_path_buf()]);
    workspace.add(root.join("main.sol")).await.unwrap();
    let report = workspace.with_parser_ready(None, true).await.unwrap();
    assert!(report.failed.is_empty(), "failed: {:?}", report.failed);

    let model = workspace.model();
    assert_eq!(model.unit_count(), 4);
    let main = model
        .get(&normalize_path(&root.join("main.sol")))
        .unwrap()
        .contract("Main")
        .unwrap();
    assert!(main.inherited_names.contains_key("s"));
    assert_eq!(main.linearized.len(), 3);
}

#[tokio::test]
async fn test_end_to_end_inheritance_across_import() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "a.sol", "contract Base { function f() public {} }");
    write(
        root,
        "b.sol",
        "import \"./a.sol\";\ncontract Child is Base {}",
    );

    let workspace = Workspace::new(vec![]);
    workspace.add(root.join("b.sol")).await.unwrap();
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let child = model
        .get(&normalize_path(&root.join("b.sol")))
        .unwrap()
        .contract("Child")
        .unwrap();
    assert!(child.inherited_names.contains_key("f"));
    assert_eq!(child.linearized.len(), 1);
}

#[tokio::test]
async fn test_unresolvable_import_is_soft() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "dangling.sol",
        "import \"./nowhere.sol\";\ncontract Lonely {}",
    );

    let workspace = Workspace::new(vec![]);
    let id = workspace.add(root.join("dangling.sol")).await.unwrap();
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let unit = model.unit(id);
    assert_eq!(unit.imports.len(), 1);
    assert!(unit.contract("Lonely").is_some());
    assert_eq!(model.unit_count(), 1);
}

#[tokio::test]
async fn test_file_scope_structs_propagate_through_imports() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "types.sol", "struct Pair { uint256 a; uint256 b; }");
    write(
        root,
        "user.sol",
        "import \"./types.sol\";\ncontract User { function take(Pair memory pair) public {} }",
    );

    let workspace = Workspace::new(vec![]);
    workspace.add(root.join("user.sol")).await.unwrap();
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let unit = model.get(&normalize_path(&root.join("user.sol"))).unwrap();
    assert!(unit.structs.contains_key("Pair"), "file-scope struct copied in");
    let records = model.all_function_signatures(unit);
    assert_eq!(
        records[0].result.as_ref().unwrap().signature,
        "take((uint256,uint256))"
    );
}

#[tokio::test]
async fn test_flatten_concatenates_closure_dependencies_first() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "dep.sol",
        "// SPDX-License-Identifier: MIT\ncontract Dep {}",
    );
    write(
        root,
        "top.sol",
        "import \"./dep.sol\";\ncontract Top is Dep {}",
    );

    let workspace = Workspace::new(vec![]);
    workspace.add(root.join("top.sol")).await.unwrap();
    workspace.with_parser_ready(None, true).await.unwrap();

    let model = workspace.model();
    let top = model.get(&normalize_path(&root.join("top.sol"))).unwrap();
    let flattened = model.flatten(top).unwrap();

    let dep_at = flattened.find("contract Dep").unwrap();
    let top_at = flattened.find("contract Top").unwrap();
    assert!(dep_at < top_at, "dependency body comes first");
    assert!(flattened.contains("//// import \"./dep.sol\";"));
    assert!(!flattened.contains("\nimport \"./dep.sol\";"));
    assert!(flattened.contains("SPDX-License-Identifier-FLATTEN-SUPPRESS-WARNING"));
}

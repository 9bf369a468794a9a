//! End-to-end permission workflows over files on disk
//!
//! Grants, tree and config are written the way the store backend would hand
//! them over, then loaded through the CLI workspace loader.

use std::path::Path;

use proptest::prelude::*;
use storetree_cli::{check, list, SourceArgs, Workspace};
use storetree_permissions::{Action, PermissionConfig, StoreRef};

const GRANTS: &str = r#"[
    {
        "owner": "org",
        "name": "docs-write",
        "resources": ["/docs"],
        "domains": ["files"],
        "users": ["alice/alice"],
        "actions": ["Write"],
        "state": "Approved",
        "isEnabled": true
    },
    {
        "owner": "org",
        "name": "docs-admin-pending",
        "resources": ["/docs"],
        "domains": ["files"],
        "users": ["alice/alice"],
        "actions": ["Admin"],
        "state": "Pending",
        "isEnabled": true
    },
    {
        "owner": "org",
        "name": "media-read-other-store",
        "resources": ["/media"],
        "domains": ["archive"],
        "users": ["bob/bob"],
        "actions": ["Read"],
        "state": "Approved",
        "isEnabled": true
    },
    {
        "owner": "org",
        "name": "nobody",
        "resources": ["/"],
        "domains": ["files"],
        "users": [],
        "actions": ["Admin"],
        "state": "Approved",
        "isEnabled": true
    },
    {
        "owner": "org",
        "name": "typo",
        "resources": ["/media"],
        "domains": ["files"],
        "users": ["bob/bob"],
        "actions": ["Wrtie"],
        "state": "Approved",
        "isEnabled": true
    }
]"#;

const TREE: &str = r#"{
    "key": "/",
    "title": "files",
    "children": [
        {
            "key": "/docs",
            "title": "docs",
            "children": [
                {"key": "/docs/report.pdf", "title": "report.pdf", "size": 2048, "isLeaf": true}
            ]
        },
        {
            "key": "/media",
            "title": "media",
            "children": [
                {"key": "/media/cat.png", "title": "cat.png", "size": 512, "isLeaf": true}
            ]
        }
    ]
}"#;

fn fixture(dir: &Path, user: &str, local_admin: bool) -> SourceArgs {
    PermissionConfig::new("org", StoreRef::new("admin", "files"))
        .save(dir.join("config.json"))
        .unwrap();
    std::fs::write(dir.join("grants.json"), GRANTS).unwrap();
    std::fs::write(dir.join("tree.json"), TREE).unwrap();

    SourceArgs {
        config: dir.join("config.json"),
        grants: dir.join("grants.json"),
        tree: dir.join("tree.json"),
        user: user.to_string(),
        local_admin,
    }
}

async fn load(user: &str, local_admin: bool) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let args = fixture(dir.path(), user, local_admin);
    Workspace::load(&args).await.unwrap()
}

#[tokio::test]
async fn test_e2e_alice_writes_report() {
    let workspace = load("alice/alice", false).await;

    assert!(check(&workspace, "/docs/report.pdf", Action::Write).unwrap());
    assert!(check(&workspace, "/docs/report.pdf", Action::Read).unwrap());
    // The Admin grant is still pending
    assert!(!check(&workspace, "/docs/report.pdf", Action::Admin).unwrap());
    assert!(!check(&workspace, "/media/cat.png", Action::Read).unwrap());
}

#[tokio::test]
async fn test_e2e_bob_has_nothing_usable() {
    let workspace = load("bob/bob", false).await;

    for path in ["/", "/docs", "/docs/report.pdf", "/media", "/media/cat.png"] {
        for action in Action::ALL {
            assert!(
                !check(&workspace, path, action).unwrap(),
                "{} {} should be denied",
                action,
                path
            );
        }
    }
}

#[tokio::test]
async fn test_e2e_local_admin_administers_everything() {
    let workspace = load("bob/bob", true).await;

    assert!(check(&workspace, "/", Action::Admin).unwrap());
    assert!(check(&workspace, "/media/cat.png", Action::Admin).unwrap());
    assert!(!check(&workspace, "/media/cat.png", Action::Read).unwrap());
}

#[tokio::test]
async fn test_e2e_list_shows_visible_flags() {
    let workspace = load("alice/alice", false).await;
    let lines = list(&workspace);

    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("--- /"));
    assert!(lines[1].starts_with("RW-"));
    assert!(lines[1].contains("Write=org/docs-write"));
    assert!(lines[3].starts_with("---"));
}

#[tokio::test]
async fn test_e2e_visible_grants() {
    let workspace = load("alice/alice", false).await;
    let access = workspace.access();

    let docs = workspace.tree.find("/docs").unwrap();
    let names: Vec<_> = access
        .visible_grants(docs)
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(names, vec!["docs-write", "docs-admin-pending"]);

    // The malformed grant on /media names bob only, alice cannot read /media
    let media = workspace.tree.find("/media").unwrap();
    assert!(access.visible_grants(media).is_empty());
}

proptest! {
    /// Paths not present in the tree are reported as errors, never as allowed
    #[test]
    fn prop_unknown_paths_error(segment in r"[a-z]{1,12}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let workspace = rt.block_on(load("alice/alice", false));
        let path = format!("/nope/{}", segment);
        prop_assert!(check(&workspace, &path, Action::Read).is_err());
    }
}

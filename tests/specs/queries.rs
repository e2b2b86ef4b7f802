// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only query specs: each query spawns the stub tool, parses its
//! output, and returns typed records.

use crate::prelude::*;

/// One stub that answers every query the facade issues.
const QUERY_TOOL: &str = r#"
case "$1" in
  --help)
    echo "Manage multiple runtime versions"
    ;;
  list)
    case "$2" in
      all)
        printf '18.0.0\n20.9.0\n20.11.1\n'
        ;;
      "")
        printf 'nodejs\n  18.0.0\n *20.11.1\nrust\n  1.79.0\n'
        ;;
      *)
        printf '  18.0.0\n *20.11.1\n'
        ;;
    esac
    ;;
  current)
    printf 'rust            1.79.0          /home/dev/project/.tool-versions\n'
    printf 'nodejs          ______          No version is set for nodejs\n'
    exit 126
    ;;
  where)
    printf '/home/dev/.asdf/installs/nodejs/20.11.1\n'
    ;;
  which)
    printf '/home/dev/.asdf/shims/node\n'
    ;;
  plugin)
    case "$3" in
      --urls)
        printf 'nodejs https://github.com/asdf-vm/asdf-nodejs.git\n'
        ;;
      *)
        printf 'elixir https://github.com/asdf-vm/asdf-elixir.git\n'
        printf 'nodejs *https://github.com/asdf-vm/asdf-nodejs.git\n'
        ;;
    esac
    ;;
esac
"#;

fn query_manager(host: &Host) -> ToolManager {
    host.stub("asdf", QUERY_TOOL);
    host.manager("asdf")
}

#[tokio::test]
async fn help_returns_usage_text() {
    let host = Host::new();
    let help = query_manager(&host).help().await.unwrap();
    assert!(help.contains("Manage multiple runtime versions"));
}

#[tokio::test]
async fn list_groups_versions_under_each_tool() {
    let host = Host::new();
    let runtimes = query_manager(&host).list(None).await.unwrap();

    assert_eq!(runtimes.len(), 2);
    assert_eq!(runtimes[0].name, "nodejs");
    assert_eq!(runtimes[0].versions.len(), 2);
    assert!(!runtimes[0].versions[0].in_use);
    assert_eq!(runtimes[0].versions[1].version, "20.11.1");
    assert!(runtimes[0].versions[1].in_use);
    assert_eq!(runtimes[1].name, "rust");
}

#[tokio::test]
async fn single_tool_list_has_no_header_line() {
    let host = Host::new();
    let runtimes = query_manager(&host).list(Some("nodejs")).await.unwrap();

    assert_eq!(runtimes.len(), 1);
    assert_eq!(runtimes[0].name, "nodejs");
    assert_eq!(runtimes[0].versions.len(), 2);
}

#[tokio::test]
async fn list_all_is_newest_first() {
    let host = Host::new();
    let versions = query_manager(&host).list_all("nodejs").await.unwrap();
    assert_eq!(versions, vec!["20.11.1", "20.9.0", "18.0.0"]);
}

#[tokio::test]
async fn current_maps_the_unset_sentinel_and_elides_home() {
    let host = Host::new();
    let current = query_manager(&host).current(None).await.unwrap();

    assert_eq!(current.len(), 2);
    assert_eq!(current[0].name, "nodejs");
    assert_eq!(current[0].version, None);
    assert_eq!(current[0].source_location, None);
    assert_eq!(current[1].name, "rust");
    assert_eq!(current[1].version.as_deref(), Some("1.79.0"));
    assert_eq!(
        current[1].source_location.as_deref(),
        Some("~/project/.tool-versions")
    );
}

#[tokio::test]
async fn install_and_shim_paths_come_back_as_segments() {
    let host = Host::new();
    let manager = query_manager(&host);

    let installed = manager.where_installed("nodejs", Some("20.11.1")).await.unwrap();
    assert_eq!(installed, vec!["~", ".asdf", "installs", "nodejs", "20.11.1"]);

    let shim = manager.which_shim("node").await.unwrap();
    assert_eq!(shim, vec!["~", ".asdf", "shims", "node"]);
}

#[tokio::test]
async fn plugin_listings_report_installed_state() {
    let host = Host::new();
    let manager = query_manager(&host);

    let installed = manager.plugin_list().await.unwrap();
    assert_eq!(installed.len(), 1);
    assert!(installed[0].installed);

    let registry = manager.plugin_list_all().await.unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry[0].name, "elixir");
    assert!(!registry[0].installed);
    assert!(registry[1].installed);
    assert_eq!(registry[1].url, "https://github.com/asdf-vm/asdf-nodejs.git");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation specs: each mutation forwards the right argv to the tool and
//! reports which query kinds the caller should refresh afterwards.

use crate::prelude::*;

#[tokio::test]
async fn install_forwards_argv_and_lists_refreshes() {
    let host = Host::new();
    host.stub("asdf", &recording_stub(&host));
    let manager = host.manager("asdf");

    let refreshes = manager
        .install(Some("nodejs"), Some("20.11.1"), None)
        .await
        .unwrap();

    assert_eq!(recorded_calls(&host), vec!["install nodejs 20.11.1"]);
    assert_eq!(refreshes, Refresh::AFTER_INSTALL);
    assert!(refreshes.contains(&Refresh::ShimPath));
}

#[tokio::test]
async fn bare_install_uses_the_version_file() {
    let host = Host::new();
    host.stub("asdf", &recording_stub(&host));
    let manager = host.manager("asdf");

    manager.install(None, None, None).await.unwrap();
    assert_eq!(recorded_calls(&host), vec!["install"]);
}

#[tokio::test]
async fn uninstall_and_global_and_reshim_forward_argv() {
    let host = Host::new();
    host.stub("asdf", &recording_stub(&host));
    let manager = host.manager("asdf");

    manager.uninstall("nodejs", Some("18.0.0")).await.unwrap();
    let global = manager.set_global("nodejs", "20.11.1").await.unwrap();
    let reshim = manager.reshim(Some("nodejs"), None).await.unwrap();

    assert_eq!(
        recorded_calls(&host),
        vec![
            "uninstall nodejs 18.0.0",
            "global nodejs 20.11.1",
            "reshim nodejs",
        ]
    );
    assert_eq!(global, Refresh::AFTER_GLOBAL);
    assert_eq!(reshim, Refresh::AFTER_RESHIM);
    assert!(!global.contains(&Refresh::ShimPath));
}

#[tokio::test]
async fn plugin_mutations_forward_argv() {
    let host = Host::new();
    host.stub("asdf", &recording_stub(&host));
    let manager = host.manager("asdf");

    let added = manager
        .plugin_add("nodejs", Some("https://example.com/asdf-nodejs.git"), None)
        .await
        .unwrap();
    manager.plugin_update("nodejs", Some("main")).await.unwrap();
    manager.plugin_update_all().await.unwrap();
    let removed = manager.plugin_remove("nodejs").await.unwrap();

    assert_eq!(
        recorded_calls(&host),
        vec![
            "plugin add nodejs https://example.com/asdf-nodejs.git",
            "plugin update nodejs main",
            "plugin update --all",
            "plugin remove nodejs",
        ]
    );
    assert_eq!(added, Refresh::AFTER_PLUGIN_CHANGE);
    // Removing a plugin also drops its runtimes, so everything refreshes.
    assert!(removed.contains(&Refresh::RuntimeList));
    assert!(removed.contains(&Refresh::PluginList));
}

#[tokio::test]
async fn bootstrap_clones_the_manager_itself() {
    let host = Host::new();
    host.stub("git", &recording_stub(&host));
    let manager = host.manager("asdf");

    let refreshes = manager.bootstrap(None).await.unwrap();

    assert_eq!(
        recorded_calls(&host),
        vec!["clone https://github.com/asdf-vm/asdf.git /home/dev/.asdf --branch v0.14.0"]
    );
    assert_eq!(refreshes, Refresh::AFTER_BOOTSTRAP);
}

#[tokio::test]
async fn profile_snippet_sources_the_tool() {
    let snippet = ToolManager::profile_snippet();
    assert_eq!(
        snippet,
        "export ASDF_DIR=\"$HOME/.asdf\"\n. \"$HOME/.asdf/asdf.sh\""
    );
}

#[tokio::test]
async fn failed_mutation_surfaces_exit_code_and_stderr() {
    let host = Host::new();
    host.stub("asdf", "echo 'version 9.9.9 not found' >&2; exit 1");
    let manager = host.manager("asdf");

    let err = manager.install(Some("nodejs"), Some("9.9.9"), None).await.unwrap_err();
    match err {
        OpError::Tool { code, stderr } => {
            assert_eq!(code, 1);
            assert!(stderr.contains("not found"));
        }
        other => panic!("expected tool error, got {other:?}"),
    }
}

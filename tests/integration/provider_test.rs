//! Integration tests for the hook-wrapped resource provider.

mod helpers;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use infraview_core::types::{FilterField, PageRequest, SortField};
use infraview_plugin::prelude::*;

#[tokio::test]
async fn test_auth_hook_blocks_create() {
    let host = helpers::TestHost::new();
    let backend_calls = Arc::new(AtomicUsize::new(0));

    host.provider
        .register_pre_hook::<CreateInput, _, _>("auth", |ctx| async move {
            if ctx.input.input.get("owner").is_none() {
                PreHookAction::halt("owner is required")
            } else {
                PreHookAction::Continue(ctx)
            }
        })
        .unwrap();

    let calls = backend_calls.clone();
    host.provider
        .register_post_hook::<CreateInput, _, _>("count", move |outcome, _ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { PostHookAction::Continue(outcome) }
        })
        .unwrap();

    let err = host
        .provider
        .create("events", "default", helpers::event("e1", "Scheduled"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::HookAbort);
    assert!(err.message.contains("'auth'"));
    assert!(err.message.contains("owner is required"));
    assert_eq!(host.backend.object_count("events", "default"), 0);
    assert_eq!(backend_calls.load(Ordering::SeqCst), 0);

    let created = host
        .provider
        .create(
            "events",
            "default",
            CreateInput {
                name: "e1".into(),
                input: json!({"owner": "ops", "reason": "Scheduled"}),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.result["metadata"]["namespace"], "default");
    assert_eq!(host.backend.object_count("events", "default"), 1);
    assert_eq!(backend_calls.load(Ordering::SeqCst), 1);

    host.shutdown().await;
}

type CallKey = (String, String, String);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_keep_hook_order() {
    let host = helpers::TestHost::new();
    let mut targets = vec![("nodes", String::new())];
    targets.extend((0..4).map(|ns| ("events", format!("ns-{ns}"))));
    for (resource, namespace) in &targets {
        for i in 0..5 {
            host.provider
                .create(resource, namespace, helpers::event(&format!("obj-{i}"), "Pulled"))
                .await
                .unwrap();
        }
    }

    let seen: Arc<Mutex<HashMap<CallKey, Vec<&'static str>>>> = Arc::default();
    for name in ["first", "second", "third"] {
        let seen = seen.clone();
        host.provider
            .register_pre_hook::<GetInput, _, _>(name, move |ctx| {
                seen.lock()
                    .unwrap()
                    .entry((
                        ctx.resource_id.clone(),
                        ctx.namespace_id.clone(),
                        ctx.input.id.clone(),
                    ))
                    .or_default()
                    .push(name);
                async move {
                    tokio::task::yield_now().await;
                    PreHookAction::Continue(ctx)
                }
            })
            .unwrap();
    }

    let mut calls = Vec::new();
    for (resource, namespace) in &targets {
        for i in 0..5 {
            let provider = host.provider.clone();
            let (resource, namespace) = (resource.to_string(), namespace.clone());
            calls.push(tokio::spawn(async move {
                let fetched = provider
                    .get(&resource, &namespace, GetInput { id: format!("obj-{i}") })
                    .await?;
                Ok::<_, AppError>((resource, namespace, fetched))
            }));
        }
    }
    for call in calls {
        let (resource, namespace, fetched) = call.await.unwrap().unwrap();
        if resource == "events" {
            assert_eq!(fetched.result["metadata"]["namespace"], namespace.as_str());
        }
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), targets.len() * 5);
    assert!(seen.contains_key(&("nodes".into(), String::new(), "obj-0".into())));
    assert!(seen.contains_key(&("events".into(), "ns-3".into(), "obj-4".into())));
    for order in seen.values() {
        assert_eq!(order, &vec!["first", "second", "third"]);
    }

    host.shutdown().await;
}

#[tokio::test]
async fn test_list_pages_past_the_end() {
    let host = helpers::TestHost::new();
    for name in ["a", "b", "c"] {
        host.provider
            .create("events", "default", helpers::event(name, "Pulled"))
            .await
            .unwrap();
    }

    for page in [PageRequest::new(3, 2), PageRequest::new(u64::MAX, 2)] {
        let listed = host
            .provider
            .list(
                "events",
                "default",
                ListInput {
                    order: vec![SortField::asc("metadata.name")],
                    pagination: Some(page),
                },
            )
            .await
            .unwrap();
        assert!(listed.result.is_empty());
        assert_eq!(listed.total, 3);
    }

    host.shutdown().await;
}

#[tokio::test]
async fn test_post_hook_sees_rewritten_input() {
    let host = helpers::TestHost::new();
    host.provider
        .create("events", "kube-system", helpers::event("e1", "Started"))
        .await
        .unwrap();

    host.provider
        .register_pre_hook::<GetInput, _, _>("tenant", |mut ctx| async move {
            ctx.namespace_id = "kube-system".into();
            PreHookAction::Continue(ctx)
        })
        .unwrap();

    let observed = Arc::new(Mutex::new(None));
    let slot = observed.clone();
    host.provider
        .register_post_hook::<GetInput, _, _>("audit", move |outcome, ctx| {
            *slot.lock().unwrap() = Some(ctx.namespace_id.clone());
            async move { PostHookAction::Continue(outcome) }
        })
        .unwrap();

    let fetched = host
        .provider
        .get("events", "default", GetInput { id: "e1".into() })
        .await
        .unwrap();

    assert_eq!(fetched.result["reason"], "Started");
    assert_eq!(observed.lock().unwrap().as_deref(), Some("kube-system"));

    host.shutdown().await;
}

#[tokio::test]
async fn test_post_hook_recovers_not_found() {
    let host = helpers::TestHost::new();
    host.provider
        .register_post_hook::<GetInput, _, _>("fallback", |outcome, ctx| async move {
            match outcome {
                Err(err) if err.kind == ErrorKind::NotFound => {
                    PostHookAction::Continue(Ok(GetResult {
                        result: json!({"metadata": {"name": ctx.input.id}, "placeholder": true}),
                    }))
                }
                other => PostHookAction::Continue(other),
            }
        })
        .unwrap();

    let fetched = host
        .provider
        .get("events", "default", GetInput { id: "ghost".into() })
        .await
        .unwrap();
    assert_eq!(fetched.result["placeholder"], true);
    assert_eq!(fetched.result["metadata"]["name"], "ghost");

    host.shutdown().await;
}

#[tokio::test]
async fn test_list_and_find_through_provider() {
    let host = helpers::TestHost::new();
    for (name, reason, count) in [("a", "Pulled", 3), ("b", "Killing", 1), ("c", "Pulled", 2)] {
        host.provider
            .create(
                "events",
                "default",
                CreateInput {
                    name: name.into(),
                    input: helpers::event_body(reason, count),
                },
            )
            .await
            .unwrap();
    }

    let listed = host
        .provider
        .list(
            "events",
            "default",
            ListInput {
                order: vec![SortField::desc("count")],
                pagination: Some(PageRequest::new(1, 2)),
            },
        )
        .await
        .unwrap();
    assert_eq!(listed.total, 3);
    let names: Vec<_> = listed
        .result
        .iter()
        .map(|item| item["metadata"]["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("a"), json!("c")]);

    let found = host
        .provider
        .find(
            "events",
            "default",
            FindInput {
                conditions: vec![FilterField::eq("reason", "Pulled")],
                order: vec![SortField::asc("count")],
                pagination: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(found.total, 2);
    assert_eq!(found.result[0]["metadata"]["name"], "c");

    host.shutdown().await;
}

#[tokio::test]
async fn test_update_and_delete_round() {
    let host = helpers::TestHost::new();
    host.provider
        .create("nodes", "", helpers::event("node-1", "Ready"))
        .await
        .unwrap();

    let updated = host
        .provider
        .update(
            "nodes",
            "",
            UpdateInput {
                id: "node-1".into(),
                input: helpers::event_body("NotReady", 2),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.result["reason"], "NotReady");

    let deleted = host
        .provider
        .delete("nodes", "", DeleteInput { id: "node-1".into() })
        .await
        .unwrap();
    assert_eq!(deleted.result["count"], 2);

    let err = host
        .provider
        .get("nodes", "", GetInput { id: "node-1".into() })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    host.shutdown().await;
}

#[derive(Debug)]
struct Stamp;

#[async_trait]
impl PreHook for Stamp {
    async fn run(&self, mut ctx: ResourceProviderInput<OperationInput>) -> PreHookAction {
        if let OperationInput::Update(input) = &mut ctx.input {
            input.input["stamped"] = json!(true);
        }
        PreHookAction::Continue(ctx)
    }
}

#[tokio::test]
async fn test_trait_hook_and_unregister() {
    let host = helpers::TestHost::new();
    host.provider
        .create("events", "default", helpers::event("e1", "Pulled"))
        .await
        .unwrap();
    host.provider
        .register_hook(OperationKind::Update, "stamp", Hook::pre(Stamp))
        .unwrap();

    let updated = host
        .provider
        .update(
            "events",
            "default",
            UpdateInput {
                id: "e1".into(),
                input: helpers::event_body("Pulled", 2),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.result["stamped"], true);

    assert!(
        host.provider
            .registry()
            .unregister(OperationKind::Update, HookPhase::Pre, "stamp")
    );

    let updated = host
        .provider
        .update(
            "events",
            "default",
            UpdateInput {
                id: "e1".into(),
                input: helpers::event_body("Pulled", 3),
            },
        )
        .await
        .unwrap();
    assert!(updated.result.get("stamped").is_none());

    host.shutdown().await;
}

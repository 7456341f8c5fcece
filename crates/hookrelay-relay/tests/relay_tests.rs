// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the relay pipeline against mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use hookrelay_cache::MemoryCache;
use hookrelay_config::FailurePolicy;
use hookrelay_core::{
    Attachment, CacheBackend, CacheKind, Identity, MentionPolicy, RelayError, RichBlock,
    SendRequest,
};
use hookrelay_relay::{Relay, SubmitOutcome};
use hookrelay_test_utils::{MockDirectory, MockTransport, RecordingHooks};
use serde_json::json;

struct Harness {
    relay: Relay,
    directory: Arc<MockDirectory>,
    transport: Arc<MockTransport>,
    hooks: Arc<RecordingHooks>,
    cache: Arc<MemoryCache>,
}

fn harness_with(
    directory: MockDirectory,
    transport: MockTransport,
    policy: FailurePolicy,
) -> Harness {
    let directory = Arc::new(directory);
    let transport = Arc::new(transport);
    let hooks = Arc::new(RecordingHooks::new());
    let cache = Arc::new(MemoryCache::new());
    let relay = Relay::builder(directory.clone(), transport.clone())
        .cache(cache.clone())
        .hooks(hooks.clone())
        .failure_policy(policy)
        .build()
        .expect("relay should build");
    Harness {
        relay,
        directory,
        transport,
        hooks,
        cache,
    }
}

fn harness(directory: MockDirectory, transport: MockTransport) -> Harness {
    harness_with(directory, transport, FailurePolicy::Isolate)
}

fn channels(ids: &[&str]) -> MockDirectory {
    ids.iter()
        .fold(MockDirectory::new(), |d, id| d.with_text_channel(id))
}

fn block(i: usize, size: usize) -> RichBlock {
    RichBlock::with_size(json!({"title": format!("b{i}")}), size)
}

fn titles(blocks: &[RichBlock]) -> Vec<String> {
    blocks
        .iter()
        .map(|b| b.payload()["title"].as_str().unwrap().to_string())
        .collect()
}

// --- Merging and chunking ---

#[tokio::test]
async fn twelve_blocks_become_two_ordered_chunks() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    let outcome = h
        .relay
        .submit(SendRequest::new("C1").blocks((0..12).map(|i| block(i, 500))))
        .await;
    assert!(outcome.is_queued());

    let report = h.relay.flush().await;
    assert_eq!(report.delivered, 2);

    let posts = h.transport.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].body.blocks.len(), 10);
    assert_eq!(posts[0].body.block_size(), 5000);
    assert_eq!(posts[1].body.blocks.len(), 2);
    assert_eq!(posts[1].body.block_size(), 1000);
    assert_eq!(titles(&posts[1].body.blocks), vec!["b10", "b11"]);
    assert_eq!(posts[0].credential, posts[1].credential);
}

#[tokio::test]
async fn texts_to_one_destination_merge_into_one_request() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    h.relay.submit(SendRequest::new("C1").text("hello")).await;
    h.relay.submit(SendRequest::new("C1").text("world")).await;

    h.relay.flush().await;

    let posts = h.transport.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body.text.as_deref(), Some("hello\nworld"));
}

#[tokio::test]
async fn blocks_from_many_submissions_are_neither_dropped_nor_duplicated() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    let mut expected = Vec::new();
    let mut next = 0;
    for batch in [3usize, 9, 1, 14, 6] {
        let blocks: Vec<RichBlock> = (next..next + batch).map(|i| block(i, 700)).collect();
        expected.extend(titles(&blocks));
        next += batch;
        h.relay.submit(SendRequest::new("C1").blocks(blocks)).await;
    }

    h.relay.flush().await;

    let posts = h.transport.posts();
    let sent: Vec<String> = posts.iter().flat_map(|p| titles(&p.body.blocks)).collect();
    assert_eq!(sent, expected);
    for post in &posts {
        assert!(post.body.blocks.len() <= 10);
        assert!(post.body.block_size() <= 6000);
    }
}

#[tokio::test]
async fn content_keeps_submission_order_across_flushes() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    h.relay.submit(SendRequest::new("C1").text("A").block(block(0, 10))).await;
    h.relay.submit(SendRequest::new("C1").text("B").block(block(1, 10))).await;
    h.relay.flush().await;
    h.relay.submit(SendRequest::new("C1").text("C")).await;
    h.relay.flush().await;

    let posts = h.transport.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].body.text.as_deref(), Some("A\nB"));
    assert_eq!(titles(&posts[0].body.blocks), vec!["b0", "b1"]);
    assert_eq!(posts[1].body.text.as_deref(), Some("C"));
}

#[tokio::test]
async fn thread_and_parent_are_separate_requests_on_one_webhook() {
    let directory = MockDirectory::new()
        .with_text_channel("parent")
        .with_thread("t1", "parent");
    let h = harness(directory, MockTransport::new());
    h.relay.submit(SendRequest::new("parent").text("root")).await;
    h.relay.submit(SendRequest::new("t1").text("threaded")).await;

    h.relay.flush().await;

    let posts = h.transport.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].credential, posts[1].credential);
    assert!(posts[0].thread_id.is_none());
    assert_eq!(posts[1].thread_id.as_ref().unwrap().as_str(), "t1");
    assert_eq!(posts[1].body.text.as_deref(), Some("threaded"));
}

#[tokio::test]
async fn first_entry_decides_identity_and_attachments() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    let file = |name: &str| Attachment {
        filename: name.into(),
        content_type: Some("text/plain".into()),
        data: b"data".to_vec(),
    };
    h.relay
        .submit(
            SendRequest::new("C1")
                .text("one")
                .identity(Identity::new("Builder", None))
                .attachment(file("first.txt")),
        )
        .await;
    h.relay
        .submit(
            SendRequest::new("C1")
                .text("two")
                .identity(Identity::new("Deployer", None))
                .attachment(file("second.txt")),
        )
        .await;

    h.relay.flush().await;

    let posts = h.transport.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body.identity.name.as_deref(), Some("Builder"));
    assert_eq!(posts[0].body.attachments.len(), 1);
    assert_eq!(posts[0].body.attachments[0].filename, "first.txt");
}

// --- Submission normalization ---

#[tokio::test]
async fn banned_identities_are_replaced_by_default() {
    let h = harness(channels(&["C1", "C2"]), MockTransport::new());
    h.relay
        .submit(
            SendRequest::new("C1")
                .text("x")
                .identity(Identity::new("everyone", None)),
        )
        .await;
    h.relay
        .submit(
            SendRequest::new("C2")
                .text("y")
                .identity(Identity::new("My Discord Bot", None)),
        )
        .await;

    h.relay.flush().await;

    for post in h.transport.posts() {
        assert_eq!(post.body.identity.name.as_deref(), Some("hookrelay"));
    }
    assert_eq!(h.transport.post_count(), 2);
}

#[tokio::test]
async fn mentions_default_to_parsing_nothing() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    h.relay.submit(SendRequest::new("C1").text("@everyone hi")).await;
    h.relay.flush().await;
    assert_eq!(
        h.transport.posts()[0].body.mentions,
        Some(MentionPolicy::none())
    );
}

#[tokio::test]
async fn bare_components_are_wrapped_when_requested() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    let mut request = SendRequest::new("C1").transform_components(true);
    for i in 0..7 {
        request = request.component(json!({"type": 2, "style": 5, "label": i, "url": "https://x.example"}));
    }
    h.relay.submit(request).await;
    h.relay.flush().await;

    let components = &h.transport.posts()[0].body.components;
    assert_eq!(components.len(), 2);
    assert_eq!(components[0]["type"], 1);
    assert_eq!(components[0]["components"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn empty_payload_is_never_dispatched() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    let outcome = h.relay.submit(SendRequest::new("C1").text("   ")).await;
    assert!(matches!(outcome, SubmitOutcome::Dropped(RelayError::EmptyPayload)));

    let report = h.relay.flush().await;
    assert!(report.is_empty());
    assert_eq!(h.transport.post_count(), 0);
    // Emptiness is checked before resolution.
    assert_eq!(h.directory.channel_lookups(), 0);
}

#[tokio::test]
async fn unresolvable_channel_is_dropped() {
    let h = harness(MockDirectory::new(), MockTransport::new());
    let outcome = h.relay.submit(SendRequest::new("gone").text("hi")).await;
    assert!(matches!(outcome, SubmitOutcome::Dropped(RelayError::Resolution { .. })));
    assert_eq!(h.relay.pending().await, 0);
    assert_eq!(h.relay.stats().dropped, 1);
}

#[tokio::test]
async fn immediate_send_skips_the_queue() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    let outcome = h
        .relay
        .submit(SendRequest::new("C1").text("now").immediate(true))
        .await;

    match outcome {
        SubmitOutcome::Delivered(descriptors) => assert_eq!(descriptors.len(), 1),
        other => panic!("expected delivery, got {other:?}"),
    }
    assert_eq!(h.transport.post_count(), 1);
    assert_eq!(h.relay.pending().await, 0);
    assert_eq!(h.hooks.delivered().len(), 1);
}

#[tokio::test]
async fn immediate_failure_is_returned_and_reported() {
    let h = harness(channels(&["C1"]), MockTransport::new().failing_channel("C1"));
    let outcome = h
        .relay
        .submit(SendRequest::new("C1").text("now").immediate(true))
        .await;

    assert!(matches!(outcome, SubmitOutcome::Failed { ref delivered, .. } if delivered.is_empty()));
    assert_eq!(h.hooks.failures().len(), 1);
    assert!(!h.cache.has("C1", CacheKind::Credential).await.unwrap());
}

// --- Failure handling ---

#[tokio::test]
async fn failure_on_one_destination_does_not_block_others() {
    let h = harness(channels(&["C1", "C2"]), MockTransport::new().failing_channel("C1"));
    h.relay.submit(SendRequest::new("C1").text("to c1")).await;
    h.relay.submit(SendRequest::new("C2").text("to c2")).await;

    let report = h.relay.flush().await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].channel_id.as_str(), "C1");
    assert_eq!(h.transport.accepted_for("C2").len(), 1);
    assert!(h.transport.accepted_for("C1").is_empty());

    let failures = h.hooks.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].channel_id.as_str(), "C1");
    assert_eq!(failures[0].status, Some(500));
}

#[tokio::test]
async fn failed_chunk_abandons_remaining_chunks_of_destination() {
    let h = harness(channels(&["C1"]), MockTransport::new().fail_after(1));
    h.relay
        .submit(SendRequest::new("C1").blocks((0..30).map(|i| block(i, 100))))
        .await;

    let report = h.relay.flush().await;

    assert_eq!(report.delivered, 1);
    assert_eq!(report.skipped_chunks, 1);
    assert_eq!(h.transport.post_count(), 2);
}

#[tokio::test]
async fn abandoned_blocks_reach_the_failure_hook() {
    let h = harness(channels(&["C1"]), MockTransport::new().fail_after(1));
    h.relay
        .submit(SendRequest::new("C1").blocks((0..25).map(|i| block(i, 500))))
        .await;

    h.relay.flush().await;

    let delivered: Vec<RichBlock> = h
        .transport
        .accepted()
        .into_iter()
        .flat_map(|p| p.body.blocks)
        .collect();
    let failures = h.hooks.failures();
    assert_eq!(failures.len(), 1);
    let undelivered: Vec<RichBlock> = failures[0].undelivered_blocks().cloned().collect();

    // Every submitted block is either delivered or handed back, once, in order.
    let mut seen = titles(&delivered);
    seen.extend(titles(&undelivered));
    let expected: Vec<String> = (0..25).map(|i| format!("b{i}")).collect();
    assert_eq!(seen, expected);
    assert_eq!(undelivered.len(), 15);
}

#[tokio::test]
async fn delivery_failure_forces_fresh_credential() {
    let h = harness(channels(&["C1"]), MockTransport::new().failing_channel("C1"));
    h.relay.submit(SendRequest::new("C1").text("first")).await;
    h.relay.flush().await;
    assert!(!h.cache.has("C1", CacheKind::Credential).await.unwrap());

    h.transport.heal();
    h.relay.submit(SendRequest::new("C1").text("second")).await;
    h.relay.flush().await;

    assert_eq!(h.directory.credential_lookups(), 2);
    let accepted = h.transport.accepted();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].credential.id, "wh-C1-2");
    assert_eq!(accepted[0].body.text.as_deref(), Some("second"));
}

#[tokio::test]
async fn abort_flush_policy_abandons_later_destinations() {
    let h = harness_with(
        channels(&["C1", "C2", "C3"]),
        MockTransport::new().failing_channel("C2"),
        FailurePolicy::AbortFlush,
    );
    for id in ["C1", "C2", "C3"] {
        h.relay.submit(SendRequest::new(id).text(id)).await;
    }

    let report = h.relay.flush().await;

    assert_eq!(report.destinations, 3);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.aborted, 1);
    assert_eq!(h.transport.accepted_for("C1").len(), 1);
    assert_eq!(h.transport.accepted_for("C3").len(), 0);
    assert_eq!(h.transport.post_count(), 2);
}

#[tokio::test]
async fn isolate_policy_still_delivers_later_destinations() {
    let h = harness(
        channels(&["C1", "C2", "C3"]),
        MockTransport::new().failing_channel("C2"),
    );
    for id in ["C1", "C2", "C3"] {
        h.relay.submit(SendRequest::new(id).text(id)).await;
    }

    let report = h.relay.flush().await;

    assert_eq!(report.delivered, 2);
    assert_eq!(report.aborted, 0);
    assert_eq!(h.transport.accepted_for("C3").len(), 1);
}

// --- Scheduling and lifecycle ---

#[tokio::test(start_paused = true)]
async fn timer_flushes_after_each_period() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    h.relay.start().unwrap();

    h.relay.submit(SendRequest::new("C1").text("a")).await;
    tokio::time::sleep(Duration::from_millis(5999)).await;
    assert_eq!(h.transport.post_count(), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(h.transport.post_count(), 1);

    h.relay.submit(SendRequest::new("C1").text("b")).await;
    tokio::time::sleep(Duration::from_millis(6000)).await;
    assert_eq!(h.transport.post_count(), 2);
    assert_eq!(h.transport.posts()[1].body.text.as_deref(), Some("b"));

    h.relay.stop().await;
}

#[tokio::test(start_paused = true)]
async fn custom_interval_is_honored() {
    let directory = Arc::new(channels(&["C1"]));
    let transport = Arc::new(MockTransport::new());
    let relay = Relay::builder(directory, transport.clone())
        .flush_interval(Duration::from_millis(100))
        .build()
        .unwrap();
    relay.start().unwrap();

    relay.submit(SendRequest::new("C1").text("fast")).await;
    tokio::time::sleep(Duration::from_millis(101)).await;
    assert_eq!(transport.post_count(), 1);
    relay.stop().await;
}

#[test]
fn zero_flush_interval_is_rejected() {
    let result = Relay::builder(
        Arc::new(MockDirectory::new()),
        Arc::new(MockTransport::new()),
    )
    .flush_interval(Duration::ZERO)
    .build();
    assert!(matches!(result, Err(RelayError::Config(_))));
}

#[tokio::test]
async fn stop_drains_pending_entries() {
    let h = harness(channels(&["C1"]), MockTransport::new());
    h.relay.start().unwrap();
    h.relay.submit(SendRequest::new("C1").text("last words")).await;

    let report = h.relay.stop().await;

    assert_eq!(report.entries, 1);
    assert_eq!(h.transport.post_count(), 1);
    assert!(!h.relay.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submitters_lose_nothing() {
    let h = Arc::new(harness(channels(&["C1", "C2"]), MockTransport::new()));
    let mut tasks = Vec::new();
    for p in 0..4 {
        let h = h.clone();
        tasks.push(tokio::spawn(async move {
            for i in 0..50 {
                let channel = if i % 2 == 0 { "C1" } else { "C2" };
                h.relay
                    .submit(SendRequest::new(channel).block(block(p * 100 + i, 10)))
                    .await;
                if i % 10 == 0 {
                    h.relay.flush().await;
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    h.relay.flush().await;

    let mut sent: Vec<String> = h
        .transport
        .accepted()
        .iter()
        .flat_map(|p| titles(&p.body.blocks))
        .collect();
    assert_eq!(sent.len(), 200);
    sent.sort();
    sent.dedup();
    assert_eq!(sent.len(), 200);
    assert_eq!(h.relay.stats().queued, 200);
}

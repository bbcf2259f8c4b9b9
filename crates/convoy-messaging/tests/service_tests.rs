// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for `MessagingService` over a real SQLite store.

use std::sync::Arc;
use std::time::Duration;

use convoy_core::{ConversationId, ConvoyError, DirectoryStore, MessagingStore, Role, UserId};
use convoy_test_utils::{RacingStore, TestHarness, user};
use futures::TryStreamExt;

fn uid(id: &str) -> UserId {
    UserId::from(id)
}

async fn open(h: &TestHarness, a: &str, b: &str) -> ConversationId {
    h.service
        .get_or_create_conversation(&uid(a), &uid(b))
        .await
        .unwrap()
        .conversation
        .id
}

// --- identity and contacts ---

#[tokio::test]
async fn resolve_identity_fills_tenant_root() {
    let h = TestHarness::new().await.unwrap();
    let identity = h.service.resolve_identity(&uid("d3")).await.unwrap();
    assert_eq!(identity.role, Role::Leaf);
    assert_eq!(identity.parent_id, Some(uid("m2")));
    assert_eq!(identity.top_tier_id, Some(uid("t1")));
}

#[tokio::test]
async fn unknown_caller_is_unauthorized() {
    let h = TestHarness::new().await.unwrap();
    let err = h.service.resolve_identity(&uid("ghost")).await.unwrap_err();
    assert!(matches!(err, ConvoyError::Unauthorized(_)));
}

#[tokio::test]
async fn eligible_contacts_sorted_by_display_name() {
    let h = TestHarness::new().await.unwrap();
    let names: Vec<String> = h
        .service
        .eligible_contacts(&uid("t1"))
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.display_name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Dana Driver",
            "Dev Driver",
            "Drew Driver",
            "Mara Dispatch",
            "Milo Dispatch"
        ]
    );
}

#[tokio::test]
async fn leaf_sees_only_its_mid() {
    let h = TestHarness::new().await.unwrap();
    let contacts = h.service.eligible_contacts(&uid("d1")).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id, uid("m1"));
    assert_eq!(contacts[0].role, Role::Mid);
}

#[tokio::test]
async fn recent_contacts_follow_message_activity() {
    let h = TestHarness::new().await.unwrap();
    assert!(h.service.recent_contacts(&uid("m1")).await.unwrap().is_empty());

    let with_d1 = open(&h, "m1", "d1").await;
    h.service
        .send_message(&uid("m1"), &with_d1, &uid("d1"), "load ready")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let with_t1 = open(&h, "m1", "t1").await;
    h.service
        .send_message(&uid("t1"), &with_t1, &uid("m1"), "status?")
        .await
        .unwrap();

    let recent: Vec<UserId> = h
        .service
        .recent_contacts(&uid("m1"))
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(recent, vec![uid("t1"), uid("d1")]);
}

// --- conversations ---

#[tokio::test]
async fn get_or_create_is_idempotent_in_both_directions() {
    let h = TestHarness::new().await.unwrap();
    let first = h
        .service
        .get_or_create_conversation(&uid("m1"), &uid("d1"))
        .await
        .unwrap();
    assert!(first.created);

    let again = h
        .service
        .get_or_create_conversation(&uid("d1"), &uid("m1"))
        .await
        .unwrap();
    assert!(!again.created);
    assert_eq!(again.conversation.id, first.conversation.id);
    assert_eq!(h.conversation_rows().await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_creates_yield_one_conversation() {
    let h = TestHarness::new().await.unwrap();
    let (t1, m2) = (uid("t1"), uid("m2"));
    let (a, b) = tokio::join!(
        h.service.get_or_create_conversation(&t1, &m2),
        h.service.get_or_create_conversation(&m2, &t1),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.conversation.id, b.conversation.id);
    assert_eq!(u8::from(a.created) + u8::from(b.created), 1);
    assert_eq!(h.conversation_rows().await.unwrap(), 1);
}

#[tokio::test]
async fn lost_insert_race_is_retried() {
    let racing: Arc<std::sync::OnceLock<Arc<RacingStore>>> = Arc::default();
    let slot = Arc::clone(&racing);
    let h = TestHarness::builder()
        .with_store_wrapper(move |sqlite| {
            let store = Arc::new(RacingStore::new(sqlite, 1));
            let _ = slot.set(Arc::clone(&store));
            store as Arc<dyn MessagingStore>
        })
        .build()
        .await
        .unwrap();

    let handle = h
        .service
        .get_or_create_conversation(&uid("m1"), &uid("d2"))
        .await
        .unwrap();
    assert!(!handle.created, "the rival insert should win");
    assert_eq!(racing.get().unwrap().conflicts(), 1);
    assert_eq!(h.conversation_rows().await.unwrap(), 1);
}

#[tokio::test]
async fn persistent_conflict_surfaces_after_one_retry() {
    let h = TestHarness::builder()
        .with_store_wrapper(|sqlite| Arc::new(RacingStore::new(sqlite, 2)) as Arc<dyn MessagingStore>)
        .build()
        .await
        .unwrap();
    let err = h
        .service
        .get_or_create_conversation(&uid("m1"), &uid("d2"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::StorageConflict(_)));
}

#[tokio::test]
async fn leaf_cannot_open_conversation_with_top() {
    let h = TestHarness::new().await.unwrap();
    let err = h
        .service
        .get_or_create_conversation(&uid("d1"), &uid("t1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::ForbiddenContact { .. }));
    assert_eq!(h.conversation_rows().await.unwrap(), 0);
}

#[tokio::test]
async fn self_unknown_and_cross_tenant_targets_are_forbidden() {
    let h = TestHarness::new().await.unwrap();
    for (from, to) in [("m1", "m1"), ("m1", "ghost"), ("t1", "d4"), ("d1", "d2")] {
        let err = h
            .service
            .get_or_create_conversation(&uid(from), &uid(to))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ConvoyError::ForbiddenContact { .. }),
            "{from} -> {to}: {err}"
        );
    }
    assert_eq!(h.conversation_rows().await.unwrap(), 0);
}

#[tokio::test]
async fn top_initiated_conversation_allows_leaf_replies() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "t1", "d1").await;
    let reply = h
        .service
        .send_message(&uid("d1"), &conv, &uid("t1"), "on my way")
        .await
        .unwrap();
    assert_eq!(reply.top_tier_id, Some(uid("t1")));
}

#[tokio::test]
async fn list_conversations_builds_overviews() {
    let h = TestHarness::new().await.unwrap();
    let quiet = open(&h, "m1", "t1").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let busy = open(&h, "m1", "d2").await;
    h.service
        .send_message(&uid("d2"), &busy, &uid("m1"), "flat tire")
        .await
        .unwrap();

    let inbox = h.service.list_conversations(&uid("m1")).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].conversation.id, busy);
    assert_eq!(inbox[0].unread_count, 1);
    assert_eq!(
        inbox[0].last_message.as_ref().map(|m| m.content.as_str()),
        Some("flat tire")
    );
    assert_eq!(
        inbox[0].counterpart.as_ref().map(|c| c.display_name.as_str()),
        Some("Dana Driver")
    );
    assert_eq!(inbox[1].conversation.id, quiet);
    assert_eq!(inbox[1].unread_count, 0);
    assert!(inbox[1].last_message.is_none());
}

#[tokio::test]
async fn outsider_cannot_read_conversation() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    let err = h
        .service
        .list_messages(&uid("d2"), &conv, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::NotAParticipant { .. }));

    let missing = ConversationId::from("nope");
    let err = h
        .service
        .conversation_for(&uid("m1"), &missing)
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::ConversationNotFound(_)));
}

// --- sending ---

#[tokio::test]
async fn whitespace_content_is_rejected_without_writing() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    let err = h
        .service
        .send_message(&uid("m1"), &conv, &uid("d1"), " \n\t ")
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::EmptyContent));
    assert_eq!(h.message_rows().await.unwrap(), 0);
}

#[tokio::test]
async fn oversized_content_is_rejected() {
    let h = TestHarness::builder()
        .with_max_content_length(10)
        .build()
        .await
        .unwrap();
    let conv = open(&h, "m1", "d1").await;
    let err = h
        .service
        .send_message(&uid("m1"), &conv, &uid("d1"), "eleven char")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConvoyError::ContentTooLong { length: 11, max: 10 }
    ));

    let sent = h
        .service
        .send_message(&uid("m1"), &conv, &uid("d1"), "  ten chars!  ")
        .await
        .unwrap();
    assert_eq!(sent.content, "ten chars!");
}

#[tokio::test]
async fn sender_and_recipient_must_be_the_participants() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;

    let err = h
        .service
        .send_message(&uid("d2"), &conv, &uid("m1"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::NotAParticipant { .. }));

    let err = h
        .service
        .send_message(&uid("m1"), &conv, &uid("d2"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::NotAParticipant { .. }));

    let err = h
        .service
        .send_message(&uid("m1"), &conv, &uid("m1"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::NotAParticipant { .. }));
    assert_eq!(h.message_rows().await.unwrap(), 0);
}

#[tokio::test]
async fn reassigned_leaf_can_no_longer_message_old_mid() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    h.sqlite
        .upsert_users(&[user("d1", Role::Leaf, Some("m2"), "Dev Driver")])
        .await
        .unwrap();

    let err = h
        .service
        .send_message(&uid("d1"), &conv, &uid("m1"), "still there?")
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::ForbiddenContact { .. }));
    assert_eq!(h.message_rows().await.unwrap(), 0);
}

// --- read state ---

#[tokio::test]
async fn unread_flow_for_leaf_to_mid() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "d1", "m1").await;
    for text in ["leaving depot", "traffic on A4", "arrived"] {
        h.service
            .send_message(&uid("d1"), &conv, &uid("m1"), text)
            .await
            .unwrap();
    }

    let summary = h.service.unread_summary(&uid("m1")).await.unwrap();
    assert_eq!(summary.get(&conv), 3);
    assert_eq!(summary.total, 3);
    assert_eq!(h.service.unread_count(&uid("m1"), &conv).await.unwrap(), 3);
    // Own messages never count as unread for the sender.
    assert_eq!(h.service.unread_total(&uid("d1")).await.unwrap(), 0);

    assert_eq!(h.service.mark_read(&uid("m1"), &conv).await.unwrap(), 3);
    assert_eq!(h.service.unread_total(&uid("m1")).await.unwrap(), 0);
    assert_eq!(h.service.mark_read(&uid("m1"), &conv).await.unwrap(), 0);
}

#[tokio::test]
async fn mark_read_requires_participation() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    let err = h.service.mark_read(&uid("d2"), &conv).await.unwrap_err();
    assert!(matches!(err, ConvoyError::NotAParticipant { .. }));

    let err = h
        .service
        .mark_read(&uid("m1"), &ConversationId::from("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoyError::ConversationNotFound(_)));
}

#[tokio::test]
async fn mark_all_read_clears_every_conversation() {
    let h = TestHarness::new().await.unwrap();
    let a = open(&h, "m1", "d1").await;
    let b = open(&h, "m1", "d2").await;
    h.service
        .send_message(&uid("d1"), &a, &uid("m1"), "one")
        .await
        .unwrap();
    h.service
        .send_message(&uid("d2"), &b, &uid("m1"), "two")
        .await
        .unwrap();
    h.service
        .send_message(&uid("m1"), &b, &uid("d2"), "ack")
        .await
        .unwrap();

    assert_eq!(h.service.unread_total(&uid("m1")).await.unwrap(), 2);
    assert_eq!(h.service.mark_all_read(&uid("m1")).await.unwrap(), 2);
    assert_eq!(h.service.unread_total(&uid("m1")).await.unwrap(), 0);
    assert_eq!(h.service.unread_total(&uid("d2")).await.unwrap(), 1);
}

// --- history ---

#[tokio::test]
async fn pages_walk_backwards_with_cursor() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    for i in 0..5 {
        h.service
            .send_message(&uid("m1"), &conv, &uid("d1"), &format!("msg {i}"))
            .await
            .unwrap();
    }

    let newest = h
        .service
        .list_messages(&uid("d1"), &conv, Some(2), None)
        .await
        .unwrap();
    let texts: Vec<&str> = newest.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec!["msg 3", "msg 4"]);

    let older = h
        .service
        .list_messages(&uid("d1"), &conv, Some(2), Some(newest[0].id.clone()))
        .await
        .unwrap();
    let texts: Vec<&str> = older.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec!["msg 1", "msg 2"]);
}

#[tokio::test]
async fn page_size_is_clamped() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    let max = h.config.messaging.max_page_size as usize;
    for i in 0..(max + 3) {
        h.service
            .send_message(&uid("m1"), &conv, &uid("d1"), &format!("#{i}"))
            .await
            .unwrap();
    }
    let page = h
        .service
        .list_messages(&uid("m1"), &conv, Some(u32::MAX), None)
        .await
        .unwrap();
    assert_eq!(page.len(), max);
}

#[tokio::test]
async fn message_stream_yields_whole_history_newest_first() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    for i in 0..7 {
        let (from, to) = if i % 2 == 0 { ("m1", "d1") } else { ("d1", "m1") };
        h.service
            .send_message(&uid(from), &conv, &uid(to), &format!("m{i}"))
            .await
            .unwrap();
    }

    let all: Vec<String> = h
        .service
        .message_stream(&uid("m1"), &conv, Some(3), None)
        .await
        .unwrap()
        .map_ok(|m| m.content)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all, vec!["m6", "m5", "m4", "m3", "m2", "m1", "m0"]);
}

#[tokio::test]
async fn message_stream_checks_access_before_streaming() {
    let h = TestHarness::new().await.unwrap();
    let conv = open(&h, "m1", "d1").await;
    let err = h
        .service
        .message_stream(&uid("t2"), &conv, None, None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ConvoyError::NotAParticipant { .. }));
}

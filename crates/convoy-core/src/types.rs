// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the hierarchy resolver, the stores, and the gateway.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Timestamp format used for every persisted `created_at` value.
///
/// Fixed-width UTC with millisecond precision, so lexicographic order equals
/// chronological order in SQL `ORDER BY`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a user in the external directory.
    UserId
);
string_id!(
    /// Identifier of a two-party conversation.
    ConversationId
);
string_id!(
    /// Identifier of a single message.
    MessageId
);

impl ConversationId {
    /// Generate a fresh random conversation id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl MessageId {
    /// Generate a fresh random message id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Position of a user in the organizational hierarchy.
///
/// The aliases accept the role names used by the fleet dashboard's own
/// user records (`superAdmin`, `admin`, `driver`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform operator; root of a tenant.
    #[serde(alias = "superAdmin")]
    #[strum(to_string = "top", serialize = "superAdmin")]
    Top,
    /// Fleet manager attached to exactly one top-tier operator.
    #[serde(alias = "admin")]
    #[strum(to_string = "mid", serialize = "admin")]
    Mid,
    /// Field operator attached to exactly one mid-tier manager.
    #[serde(alias = "driver")]
    #[strum(to_string = "leaf", serialize = "driver")]
    Leaf,
}

impl Role {
    /// The role a user's `parent_id` must resolve to, if any.
    pub fn parent_role(self) -> Option<Role> {
        match self {
            Role::Top => None,
            Role::Mid => Some(Role::Top),
            Role::Leaf => Some(Role::Mid),
        }
    }

    /// The role of users that may name this user as their parent.
    pub fn child_role(self) -> Option<Role> {
        match self {
            Role::Top => Some(Role::Mid),
            Role::Mid => Some(Role::Leaf),
            Role::Leaf => None,
        }
    }
}

/// A user record mirrored from the external identity provider.
///
/// Read-only reference data for the messaging subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub role: Role,
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<UserId>,
    #[serde(alias = "display_name")]
    pub display_name: String,
    #[serde(default, alias = "avatar_ref")]
    pub avatar_ref: Option<String>,
}

/// The authenticated caller as resolved against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
    pub parent_id: Option<UserId>,
    /// Tenant root. `None` when the parent chain does not resolve.
    pub top_tier_id: Option<UserId>,
}

/// Public view of a user, as returned by the contact endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCard {
    pub id: UserId,
    pub display_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

impl From<&User> for ContactCard {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            avatar_ref: user.avatar_ref.clone(),
        }
    }
}

/// Order-independent key for an unordered pair of distinct users.
///
/// Always holds `low < high`, so `{a, b}` and `{b, a}` normalize to the
/// same value. Serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<UserId>", try_from = "Vec<UserId>")]
pub struct ParticipantPair {
    low: UserId,
    high: UserId,
}

impl ParticipantPair {
    /// Normalize two user ids into a pair. Returns `None` when they are equal.
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> &UserId {
        &self.low
    }

    pub fn high(&self) -> &UserId {
        &self.high
    }

    pub fn contains(&self, user: &UserId) -> bool {
        &self.low == user || &self.high == user
    }

    /// The participant that is not `user`, or `None` if `user` is not in the pair.
    pub fn other(&self, user: &UserId) -> Option<&UserId> {
        if &self.low == user {
            Some(&self.high)
        } else if &self.high == user {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl From<ParticipantPair> for Vec<UserId> {
    fn from(pair: ParticipantPair) -> Self {
        vec![pair.low, pair.high]
    }
}

impl TryFrom<Vec<UserId>> for ParticipantPair {
    type Error = String;

    fn try_from(ids: Vec<UserId>) -> Result<Self, Self::Error> {
        let [a, b]: [UserId; 2] = ids
            .try_into()
            .map_err(|v: Vec<UserId>| format!("expected 2 participants, got {}", v.len()))?;
        Self::new(a, b).ok_or_else(|| "participants must be distinct".to_string())
    }
}

/// A deduplicated two-party conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_ids: ParticipantPair,
    pub created_at: String,
}

impl Conversation {
    /// A new, not yet persisted conversation for the given pair.
    pub fn new(participant_ids: ParticipantPair) -> Self {
        Self {
            id: ConversationId::generate(),
            participant_ids,
            created_at: now_timestamp(),
        }
    }
}

/// A single message in a conversation's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub content: String,
    pub read: bool,
    pub created_at: String,
    /// Tenant root the conversation belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_tier_id: Option<UserId>,
    /// Insertion sequence assigned by the store; tie-break for equal timestamps.
    #[serde(skip)]
    pub seq: i64,
}

impl Message {
    /// A new unread message, not yet appended to the log.
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        recipient_id: UserId,
        content: String,
        top_tier_id: Option<UserId>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            sender_id,
            recipient_id,
            content,
            read: false,
            created_at: now_timestamp(),
            top_tier_id,
            seq: 0,
        }
    }
}

/// A conversation with its derived activity information, as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationActivity {
    pub conversation: Conversation,
    /// Latest message timestamp, or the conversation's `created_at`.
    pub last_activity_at: String,
    pub last_message: Option<Message>,
}

/// One entry of a user's inbox listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationOverview {
    pub conversation: Conversation,
    pub unread_count: u64,
    pub last_activity_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    /// The other participant, if still present in the directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<ContactCard>,
}

/// Per-conversation unread counts for one viewer, plus their sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnreadSummary {
    #[serde(flatten)]
    pub counts: BTreeMap<ConversationId, u64>,
    pub total: u64,
}

impl UnreadSummary {
    pub fn from_counts(counts: BTreeMap<ConversationId, u64>) -> Self {
        let total = counts.values().sum();
        Self { counts, total }
    }

    pub fn get(&self, conversation_id: &ConversationId) -> u64 {
        self.counts.get(conversation_id).copied().unwrap_or(0)
    }
}

/// Cursor-based page request over a conversation's message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Maximum number of messages to return.
    pub limit: u32,
    /// Return only messages strictly older than this one.
    pub before: Option<MessageId>,
}

/// Health status reported by storage and gateway checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Operational but experiencing issues.
    Degraded(String),
    /// Not operational.
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pair_normalizes_order() {
        let ab = ParticipantPair::new("a".into(), "b".into()).unwrap();
        let ba = ParticipantPair::new("b".into(), "a".into()).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.low().as_str(), "a");
        assert_eq!(ab.high().as_str(), "b");
    }

    #[test]
    fn pair_rejects_self() {
        assert!(ParticipantPair::new("a".into(), "a".into()).is_none());
    }

    #[test]
    fn pair_other_participant() {
        let pair = ParticipantPair::new("m1".into(), "d1".into()).unwrap();
        assert_eq!(pair.other(&"m1".into()), Some(&UserId::from("d1")));
        assert_eq!(pair.other(&"d1".into()), Some(&UserId::from("m1")));
        assert_eq!(pair.other(&"x".into()), None);
        assert!(pair.contains(&"d1".into()));
        assert!(!pair.contains(&"x".into()));
    }

    #[test]
    fn pair_deserialize_rejects_wrong_arity() {
        let three: Result<ParticipantPair, _> = serde_json::from_str(r#"["a","b","c"]"#);
        assert!(three.is_err());
        let same: Result<ParticipantPair, _> = serde_json::from_str(r#"["a","a"]"#);
        assert!(same.is_err());
        let ok: ParticipantPair = serde_json::from_str(r#"["b","a"]"#).unwrap();
        assert_eq!(ok.low().as_str(), "a");
    }

    #[test]
    fn role_parses_native_and_legacy_names() {
        assert_eq!(Role::from_str("top").unwrap(), Role::Top);
        assert_eq!(Role::from_str("superAdmin").unwrap(), Role::Top);
        assert_eq!(Role::from_str("admin").unwrap(), Role::Mid);
        assert_eq!(Role::from_str("driver").unwrap(), Role::Leaf);
        assert_eq!(Role::Leaf.to_string(), "leaf");
        let role: Role = serde_json::from_str(r#""driver""#).unwrap();
        assert_eq!(role, Role::Leaf);
        assert_eq!(serde_json::to_string(&Role::Mid).unwrap(), r#""mid""#);
    }

    #[test]
    fn role_parent_and_child_chain() {
        assert_eq!(Role::Top.parent_role(), None);
        assert_eq!(Role::Leaf.parent_role(), Some(Role::Mid));
        assert_eq!(Role::Top.child_role(), Some(Role::Mid));
        assert_eq!(Role::Leaf.child_role(), None);
    }

    #[test]
    fn conversation_serializes_camel_case() {
        let conv = Conversation {
            id: "c1".into(),
            participant_ids: ParticipantPair::new("u2".into(), "u1".into()).unwrap(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&conv).unwrap();
        assert_eq!(json["participantIds"], serde_json::json!(["u1", "u2"]));
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn message_hides_sequence_number() {
        let mut msg = Message::new("c1".into(), "a".into(), "b".into(), "hi".into(), None);
        msg.seq = 42;
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("seq").is_none());
        assert!(json.get("topTierId").is_none());
        assert_eq!(json["read"], false);
        assert_eq!(json["senderId"], "a");
    }

    #[test]
    fn unread_summary_flattens_counts_next_to_total() {
        let mut counts = BTreeMap::new();
        counts.insert(ConversationId::from("c1"), 3);
        counts.insert(ConversationId::from("c2"), 0);
        let summary = UnreadSummary::from_counts(counts);
        assert_eq!(summary.total, 3);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json, serde_json::json!({"c1": 3, "c2": 0, "total": 3}));
    }

    #[test]
    fn timestamps_sort_lexicographically() {
        let a = now_timestamp();
        let b = now_timestamp();
        assert!(a <= b);
        assert_eq!(a.len(), "2026-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn user_accepts_snake_case_aliases() {
        let user: User = serde_json::from_str(
            r#"{"id":"d1","role":"driver","parent_id":"m1","display_name":"Dana"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Leaf);
        assert_eq!(user.parent_id, Some(UserId::from("m1")));
        assert!(user.avatar_ref.is_none());
    }
}

//! License key verification.
//!
//! A [`LicenseVerifier`] answers one question: what subscription, if any,
//! does this key grant? The session state machine only talks to the trait,
//! so the verification scheme can be swapped without touching it.
//!
//! [`AllowListVerifier`] is the shipped scheme: the key must appear in a
//! fixed list, and every key grants the same plan with the same expiry date.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a verified key grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// Display name of the plan.
    pub plan_name: String,
    /// Instant the subscription ends.
    pub expiry: DateTime<Utc>,
}

/// Decides whether a license key is valid.
#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    /// Returns the subscription granted by `key`, or `None` if the key is not
    /// valid. `key` is already trimmed and non-empty.
    async fn verify(&self, key: &str) -> Option<SubscriptionInfo>;
}

/// Midnight of `date` in the local time zone, as a UTC instant.
///
/// Falls back to UTC midnight when local midnight does not exist (a DST gap).
#[must_use]
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Accepts keys from a fixed list.
#[derive(Debug, Clone)]
pub struct AllowListVerifier {
    keys: HashSet<String>,
    subscription: SubscriptionInfo,
}

impl AllowListVerifier {
    /// Every key in `keys` grants `plan_name` until `expiry`.
    pub fn new<I, S>(keys: I, plan_name: impl Into<String>, expiry: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            subscription: SubscriptionInfo {
                plan_name: plan_name.into(),
                expiry,
            },
        }
    }

    /// Number of accepted keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no key is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl LicenseVerifier for AllowListVerifier {
    async fn verify(&self, key: &str) -> Option<SubscriptionInfo> {
        self.keys
            .contains(key)
            .then(|| self.subscription.clone())
    }
}

//! Mock implementations of Environment traits.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Utc};
use fanclub_core::environment::{Clock, TicketCodeGenerator, WinnerSelector};
use fanclub_core::identity::{Identity, IdentityProvider};
use fanclub_core::{StoreError, TicketCode};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed clock for deterministic tests
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use fanclub_testing::mocks::FixedClock;
/// use fanclub_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock::new(test_time())
}

/// The instant [`test_clock`] is frozen at.
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .expect("hardcoded timestamp should always parse")
        .with_timezone(&Utc)
}

/// Ticket codes `FC-TEST-000001`, `FC-TEST-000002`, ...
///
/// Scripted codes queued with [`ScriptedTicketCodes::queue`] are handed out first, which
/// lets tests force a collision with an existing ticket.
#[derive(Debug, Default)]
pub struct ScriptedTicketCodes {
    next: AtomicU64,
    queued: Mutex<VecDeque<String>>,
}

impl ScriptedTicketCodes {
    /// Sequential codes only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out `codes` before falling back to sequential codes.
    #[must_use]
    pub fn queue<I, S>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queued
            .lock()
            .unwrap()
            .extend(codes.into_iter().map(Into::into));
        self
    }

    /// Number of codes generated so far.
    #[must_use]
    pub fn generated(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl TicketCodeGenerator for ScriptedTicketCodes {
    fn generate(&self, _issued_at: DateTime<Utc>) -> TicketCode {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        match self.queued.lock().unwrap().pop_front() {
            Some(code) => TicketCode::new(code),
            None => TicketCode::new(format!("FC-TEST-{n:06}")),
        }
    }
}

/// Winner selector that always picks the same index and records the pool sizes it saw.
#[derive(Debug, Default)]
pub struct ScriptedWinnerSelector {
    index: usize,
    seen: Mutex<Vec<usize>>,
}

impl ScriptedWinnerSelector {
    /// Always pick `index` (clamped by the ledger to the pool).
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Pool sizes of every draw so far.
    #[must_use]
    pub fn pool_sizes(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

impl WinnerSelector for ScriptedWinnerSelector {
    fn select(&self, participants: usize) -> usize {
        self.seen.lock().unwrap().push(participants);
        self.index
    }
}

/// Identity provider backed by a fixed token table.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityProvider {
    identities: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    /// Empty provider: every token is unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `identity` under `token`.
    #[must_use]
    pub fn with(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn authenticate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Identity>, StoreError>> + Send + '_>> {
        let identity = self.identities.get(token).cloned();
        Box::pin(async move { Ok(identity) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_frozen() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), test_time());
    }

    #[test]
    fn scripted_codes_come_first() {
        let codes = ScriptedTicketCodes::new().queue(["FC-DUP"]);
        assert_eq!(codes.generate(test_time()).as_str(), "FC-DUP");
        assert_eq!(codes.generate(test_time()).as_str(), "FC-TEST-000002");
        assert_eq!(codes.generated(), 2);
    }

    #[tokio::test]
    async fn static_provider_resolves_known_tokens() {
        let identity = crate::fixtures::member("ana");
        let provider = StaticIdentityProvider::new().with("token-ana", identity.clone());

        assert_eq!(provider.authenticate("token-ana").await, Ok(Some(identity)));
        assert_eq!(provider.authenticate("nope").await, Ok(None));
    }
}

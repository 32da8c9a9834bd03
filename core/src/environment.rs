//! Environment module - Dependency injection traits
//!
//! All non-deterministic inputs of the ledger (time, code generation, winner selection)
//! and its storage collaborator are abstracted behind traits and injected through
//! [`LedgerEnvironment`].

use crate::retry::RetryPolicy;
use crate::store::CatalogStore;
use crate::types::TicketCode;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```ignore
/// // Production - uses system clock
/// struct SystemClock;
/// impl Clock for SystemClock {
///     fn now(&self) -> DateTime<Utc> {
///         Utc::now()
///     }
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// System clock backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Generates presentable ticket codes.
///
/// Codes must not repeat. The store's unique constraint is the final guard; the ledger
/// asks for a fresh code when it reports a duplicate.
pub trait TicketCodeGenerator: Send + Sync {
    /// Generate a code for a ticket issued at `issued_at`.
    fn generate(&self, issued_at: DateTime<Utc>) -> TicketCode;
}

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_RANDOM_LEN: usize = 6;

/// `FC-<base36 millis>-<6 random base36 chars>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTicketCodes;

impl TicketCodeGenerator for RandomTicketCodes {
    fn generate(&self, issued_at: DateTime<Utc>) -> TicketCode {
        let millis = u64::try_from(issued_at.timestamp_millis()).unwrap_or_default();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..CODE_RANDOM_LEN)
            .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
            .collect();
        TicketCode::new(format!("FC-{}-{suffix}", to_base36(millis)))
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        #[allow(clippy::cast_possible_truncation)] // value % 36 < 36
        digits.push(CODE_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Picks the winning entry of a raffle draw.
pub trait WinnerSelector: Send + Sync {
    /// Return an index in `0..participants`. Only called with `participants >= 1`.
    fn select(&self, participants: usize) -> usize;
}

/// Uniform selection with the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWinnerSelector;

impl WinnerSelector for RandomWinnerSelector {
    fn select(&self, participants: usize) -> usize {
        rand::thread_rng().gen_range(0..participants)
    }
}

/// Environment dependencies for the ledger and the catalog service.
#[derive(Clone)]
pub struct LedgerEnvironment {
    /// Clock for timestamps and event-date checks
    pub clock: Arc<dyn Clock>,
    /// Catalog store
    pub store: Arc<dyn CatalogStore>,
    /// Ticket code generator
    pub codes: Arc<dyn TicketCodeGenerator>,
    /// Raffle winner selection
    pub selector: Arc<dyn WinnerSelector>,
    /// Retry policy for lost conditional updates
    pub retry: RetryPolicy,
}

impl LedgerEnvironment {
    /// Creates a production environment around `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, retry: RetryPolicy) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            store,
            codes: Arc::new(RandomTicketCodes),
            selector: Arc::new(RandomWinnerSelector),
            retry,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the ticket code generator.
    #[must_use]
    pub fn with_codes(mut self, codes: Arc<dyn TicketCodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    /// Replace the winner selector.
    #[must_use]
    pub fn with_selector(mut self, selector: Arc<dyn WinnerSelector>) -> Self {
        self.selector = selector;
        self
    }
}

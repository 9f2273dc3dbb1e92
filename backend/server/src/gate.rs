//! # Identity Gate
//!
//! Admits a visitor to the RSVP form. Two strategies exist and a deployment runs
//! exactly one of them, picked by `GATE_STRATEGY`:
//!
//! - **names** (default): the typed name must equal an invitation list entry,
//!   ignoring case and surrounding whitespace. On success the stored spelling is
//!   handed back so every record uses the same casing.
//! - **pin**: one shared PIN from the `WEDDING_PIN` secret, compared exactly.
//!   Knows nothing about names.
//!
//! "Not on the list" and "could not check the list" are different answers, the
//! latter is a [`GateError::ServiceUnavailable`] and the guest is told to retry.
use std::{sync::Arc, time::Duration};

use invite::{Admission, GateStrategy};
use thiserror::Error;
use tracing::debug;

use crate::{
    config::Config,
    database::{GuestDirectory, StoreError},
    utils::bounded,
};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Guest list unavailable: {0}")]
    ServiceUnavailable(#[from] StoreError),

    #[error("PIN verification not configured")]
    PinNotConfigured,
}

pub struct NameGate {
    directory: Arc<dyn GuestDirectory>,
    timeout: Duration,
}

impl NameGate {
    pub fn new(directory: Arc<dyn GuestDirectory>, timeout: Duration) -> Self {
        Self { directory, timeout }
    }

    pub async fn verify(&self, candidate: &str) -> Result<Admission, GateError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Ok(Admission::NotAdmitted);
        }

        let found = bounded(self.timeout, self.directory.find(candidate)).await?;
        debug!(candidate, found = found.is_some(), "Checked invitation list");

        Ok(match found {
            Some(canonical) => Admission::Admitted {
                canonical_name: Some(canonical),
            },
            None => Admission::NotAdmitted,
        })
    }
}

pub struct PinGate {
    secret: Option<String>,
}

impl PinGate {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn verify(&self, pin: &str) -> Result<Admission, GateError> {
        let secret = self.secret.as_deref().ok_or(GateError::PinNotConfigured)?;

        Ok(if same_bytes(pin.as_bytes(), secret.as_bytes()) {
            Admission::Admitted {
                canonical_name: None,
            }
        } else {
            Admission::NotAdmitted
        })
    }
}

// Length leaks, contents do not.
fn same_bytes(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub enum Gate {
    Names(NameGate),
    Pin(PinGate),
}

impl Gate {
    pub fn from_config(config: &Config, directory: Arc<dyn GuestDirectory>) -> Self {
        match config.gate_strategy {
            GateStrategy::Names => Gate::Names(NameGate::new(directory, config.service_timeout)),
            GateStrategy::Pin => Gate::Pin(PinGate::new(config.wedding_pin.clone())),
        }
    }

    pub fn strategy(&self) -> GateStrategy {
        match self {
            Gate::Names(_) => GateStrategy::Names,
            Gate::Pin(_) => GateStrategy::Pin,
        }
    }

    pub async fn verify(&self, candidate: &str) -> Result<Admission, GateError> {
        match self {
            Gate::Names(gate) => gate.verify(candidate).await,
            Gate::Pin(gate) => gate.verify(candidate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn name_gate(store: Arc<MemoryStore>) -> Gate {
        Gate::Names(NameGate::new(store, Duration::from_secs(10)))
    }

    fn guests() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_guests(["Jane Doe", "Anesu Banda", "Anna Lee"]))
    }

    #[tokio::test]
    async fn test_admits_any_casing_with_stored_spelling() {
        let gate = name_gate(guests());

        for candidate in ["jane doe", "JANE DOE", "  Jane Doe  ", "jAnE dOe"] {
            let admission = gate.verify(candidate).await.unwrap();
            assert_eq!(admission.canonical_name(), Some("Jane Doe"), "{candidate:?}");
        }
    }

    #[tokio::test]
    async fn test_rejects_partial_and_unknown_names() {
        let gate = name_gate(guests());

        for candidate in ["Jane", "Doe", "Jane  Doe", "Anna Leee", "Nobody"] {
            assert_eq!(
                gate.verify(candidate).await.unwrap(),
                Admission::NotAdmitted,
                "{candidate:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_blank_candidate_never_hits_store() {
        let store = guests();
        let gate = name_gate(store.clone());

        assert_eq!(gate.verify("   ").await.unwrap(), Admission::NotAdmitted);
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_list_is_not_a_rejection() {
        let store = guests();
        store.set_unavailable(true);
        let gate = name_gate(store);

        assert!(matches!(
            gate.verify("Jane Doe").await,
            Err(GateError::ServiceUnavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_list_times_out() {
        let store = Arc::new(MemoryStore::with_guests(["Jane Doe"]).with_latency(Duration::from_secs(60)));
        let gate = name_gate(store);

        assert!(matches!(
            gate.verify("Jane Doe").await,
            Err(GateError::ServiceUnavailable(StoreError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn test_pin_gate() {
        let gate = Gate::Pin(PinGate::new(Some("0101".to_string())));

        assert_eq!(
            gate.verify("0101").await.unwrap(),
            Admission::Admitted {
                canonical_name: None
            }
        );
        assert_eq!(gate.verify("0102").await.unwrap(), Admission::NotAdmitted);
        assert_eq!(gate.verify("01010").await.unwrap(), Admission::NotAdmitted);
        assert_eq!(gate.verify(" 0101").await.unwrap(), Admission::NotAdmitted);
    }

    #[tokio::test]
    async fn test_unconfigured_pin() {
        let gate = Gate::Pin(PinGate::new(None));

        assert!(matches!(
            gate.verify("0101").await,
            Err(GateError::PinNotConfigured)
        ));
    }

    #[test]
    fn test_strategy_from_config() {
        let config = Config {
            gate_strategy: GateStrategy::Pin,
            wedding_pin: Some("1234".to_string()),
            ..Config::default()
        };

        let gate = Gate::from_config(&config, guests());
        assert_eq!(gate.strategy(), GateStrategy::Pin);

        let gate = Gate::from_config(&Config::default(), guests());
        assert_eq!(gate.strategy(), GateStrategy::Names);
    }
}

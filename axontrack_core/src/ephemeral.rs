use std::{collections::BTreeMap, convert::Infallible, sync::Mutex};

use async_trait::async_trait;

/// Small string map persisted by the host between invocations.
pub type EphemeralState = BTreeMap<String, String>;

#[async_trait]
pub trait EphemeralStore {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn load_ephemeral(&self) -> Result<EphemeralState, Self::Error>;

    /// Overwrites every key present in `values`; other keys are left alone.
    async fn save_ephemeral(&self, values: &EphemeralState) -> Result<(), Self::Error>;
}

#[derive(Debug, Default)]
pub struct MemoryEphemeralStore {
    state: Mutex<EphemeralState>,
}

impl MemoryEphemeralStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: EphemeralState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> EphemeralState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl EphemeralStore for MemoryEphemeralStore {
    type Error = Infallible;

    async fn load_ephemeral(&self) -> Result<EphemeralState, Self::Error> {
        Ok(self.snapshot())
    }

    async fn save_ephemeral(&self, values: &EphemeralState) -> Result<(), Self::Error> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }
}

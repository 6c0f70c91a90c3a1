//! Planning and convergence engine for the StateStack remote-state backend.
//!
//! This crate turns a [`BackendConfig`] plus the resolved caller identity
//! into a [`BackendPlan`] (the full descriptor set for the state bucket, its
//! access-log bucket, and the optional lock table), orders the descriptors
//! by their reference edges, and converges them through a
//! [`ResourceProvider`] while tracking what was applied in an
//! [`AppliedState`] snapshot.
//!
//! ```
//! use statestack_core::{Applier, AppliedState, BackendConfig, MemoryProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), statestack_core::BackendError> {
//! let config = BackendConfig::builder().bucket("my-state").build();
//! let applier = Applier::new(MemoryProvider::default());
//! let mut state = AppliedState::new();
//!
//! let report = applier.bootstrap(&config, &mut state).await?;
//! assert_eq!(report.created.len(), 13);
//!
//! // Converging again touches nothing.
//! let report = applier.bootstrap(&config, &mut state).await?;
//! assert_eq!(report.unchanged.len(), 13);
//! # Ok(())
//! # }
//! ```

pub mod applier;
pub mod config;
pub mod error;
pub mod graph;
pub mod plan;
pub mod provider;
pub mod state;

pub use applier::{Applier, ApplyReport};
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult, ProviderError};
pub use graph::DependencyGraph;
pub use plan::BackendPlan;
pub use provider::{MemoryProvider, ResourceProvider};
pub use state::AppliedState;

//! Canvas Quota
//!
//! Governs remote calls under a strict external quota.
//!
//! # Core Concepts
//!
//! - [`QuotaGovernor`]: pacing, per-minute and daily caps, backoff, circuit breaker
//! - [`Weight`]: cost class that selects the base delay
//! - [`Clock`]: time source; [`ManualClock`] runs quota days in virtual time
//!
//! # Example
//!
//! ```rust
//! use canvas_quota::{ManualClock, QuotaConfig, QuotaGovernor, Weight};
//! use std::sync::Arc;
//!
//! # tokio_test_block_on(async {
//! let clock = Arc::new(ManualClock::starting_now());
//! let governor = QuotaGovernor::with_clock(QuotaConfig::default(), clock.clone());
//!
//! let answer = governor
//!     .execute(Weight::Light, || async { Ok::<_, canvas_quota::RemoteError>(42) })
//!     .await
//!     .unwrap();
//! assert_eq!(answer, 42);
//! assert_eq!(governor.snapshot().calls_today, 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod clock;
pub mod config;
pub mod error;
pub mod governor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{QuotaConfig, Weight};
pub use error::{QuotaError, RemoteError};
pub use governor::{CircuitState, QuotaGovernor, QuotaSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

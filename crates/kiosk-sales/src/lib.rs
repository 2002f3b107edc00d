//! # kiosk-sales: Service Layer for Kiosk POS
//!
//! Sale recording with atomic inventory reservation, the transaction
//! lifecycle, catalog management, and reconciliation against an external
//! payment gateway.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk POS Architecture                           │
//! │                                                                         │
//! │  Transport layer (HTTP handlers, CLI, ...)  — not this crate            │
//! │       │   resolves authentication into a Principal,                     │
//! │       │   deserializes payloads, forwards ServiceError codes            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                ★ kiosk-sales (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────┐ ┌────────────────┐ ┌──────────────────────┐  │   │
//! │  │  │ SalesService │ │ ProductService │ │   PaymentService     │  │   │
//! │  │  └──────┬───────┘ └──────┬─────────┘ └─────┬──────────┬─────┘  │   │
//! │  │         │                │                 │          │        │   │
//! │  │         ▼                ▼                 ▼          ▼        │   │
//! │  │     kiosk-core rules + kiosk-db storage        PaymentGateway  │   │
//! │  │                                                (trait + impls) │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`services`] - SalesService, ProductService, PaymentService
//! - [`gateway`] - PaymentGateway trait, HTTP client, test mock
//! - [`config`] - gateway configuration from the environment
//! - [`error`] - ServiceError with stable caller-facing codes

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod gateway;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::GatewayConfig;
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use gateway::{GatewayNotification, HttpGateway, MockGateway, PaymentGateway};
pub use services::{PaymentService, ProductService, SalesService};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod client;
pub mod correlation;
pub mod error;

pub use client::{Client, ConnectOptions, Events};
pub use correlation::{CorrelationConfig, CorrelationManager};
pub use error::ClientError;

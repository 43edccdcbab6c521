// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod command;
pub mod context;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod router;

pub use command::{AccessLevel, CommandDescriptor, ParamSchema};
pub use context::{Context, Environment};
pub use endpoint::Endpoint;
pub use envelope::{Envelope, Kind, Priority, Target};
pub use error::{ErrorBody, ErrorCode, InvalidMessage};
pub use router::{BoxFuture, CommandHandler, EndpointSummary, OutboundHandle, RouteError, Router, RouterConfig, RouterState, Subscriber, SubscriptionId};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod bridge;
pub mod catalog;
pub mod protocol;
pub mod screenshot;

pub use bridge::Bridge;
pub use catalog::{translate, McpTool};
pub use protocol::{RpcError, RpcRequest, RpcResponse};

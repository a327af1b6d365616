// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The pipeline/plugin-instance facade the Session consumes. Pipelines
//! themselves — what runs inside them — are out of scope; this crate only
//! tracks the handle, ownership, and per-instance callback registrations.

mod callback;
mod handle;
mod registry;

pub use callback::{DataCallback, InstanceCallbacks, NotificationCallback};
pub use handle::{Ownership, PipelineHandle};
pub use registry::PipelineRegistry;

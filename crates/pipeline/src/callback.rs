// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use meshsdk_envelope::Envelope;
use std::sync::Arc;

/// Invoked for payload frames addressed to one plugin instance.
pub type DataCallback = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Invoked for notification frames addressed to one plugin instance.
pub type NotificationCallback = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Per-instance callback pair, keyed by `(plugin_signature, plugin_instance)`
/// inside a [`crate::PipelineHandle`].
#[derive(Clone, Default)]
pub struct InstanceCallbacks {
    pub on_data: Option<DataCallback>,
    pub on_notification: Option<NotificationCallback>,
}

// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Wire-level field names, preserved verbatim for interoperability with the
//! rest of the mesh.

pub const EE_ID: &str = "EE_ID";
pub const EE_SENDER: &str = "EE_SENDER";
pub const EE_ETH_ADDR: &str = "EE_ETH_ADDR";
pub const EE_DESTINATION: &str = "EE_DESTINATION";
pub const SESSION_ID: &str = "SESSION_ID";
pub const INITIATOR_ID: &str = "INITIATOR_ID";
pub const SENDER_ADDR: &str = "SENDER_ADDR";
pub const TIME: &str = "TIME";

pub const EE_IS_ENCRYPTED: &str = "EE_IS_ENCRYPTED";
pub const EE_ENCRYPTED_DATA: &str = "EE_ENCRYPTED_DATA";
pub const EE_SIGN: &str = "EE_SIGN";

pub const EE_PAYLOAD_PATH: &str = "EE_PAYLOAD_PATH";

/// Outbound command critical-section fields.
pub const ACTION: &str = "ACTION";
pub const PAYLOAD: &str = "PAYLOAD";

pub const HEARTBEAT_VERSION: &str = "HEARTBEAT_VERSION";
pub const ENCODED_DATA: &str = "ENCODED_DATA";
pub const CONFIG_STREAMS: &str = "CONFIG_STREAMS";
pub const EE_WHITELIST: &str = "EE_WHITELIST";
pub const SECURED: &str = "SECURED";

pub const CURRENT_NETWORK: &str = "CURRENT_NETWORK";
pub const NETMON_ADDRESS: &str = "NETMON_ADDRESS";
pub const NETMON_EEID: &str = "NETMON_EEID";
pub const NETMON_ETH_ADDRESS: &str = "NETMON_ETH_ADDRESS";
pub const NETMON_STATUS_KEY: &str = "NETMON_STATUS_KEY";
pub const NETMON_STATUS_ONLINE: &str = "ONLINE";
pub const NETMON_STATUS_OFFLINE: &str = "OFFLINE";
pub const NETMON_IS_SUPERVISOR: &str = "NETMON_IS_SUPERVISOR";
pub const NETMON_WHITELIST: &str = "NETMON_WHITELIST";
pub const NETMON_NODE_VERSION: &str = "NETMON_NODE_VERSION";
pub const NETMON_LAST_REMOTE_TIME: &str = "NETMON_LAST_REMOTE_TIME";
pub const NETMON_LAST_SEEN: &str = "NETMON_LAST_SEEN";

pub const NET_CONFIG_DATA: &str = "NET_CONFIG_DATA";
pub const OPERATION: &str = "OPERATION";
pub const OPERATION_REQUEST: &str = "REQUEST";
pub const OPERATION_REPLY: &str = "REPLY";
pub const DESTINATION: &str = "DESTINATION";
pub const PIPELINES: &str = "PIPELINES";
pub const PLUGINS_STATUSES: &str = "PLUGINS_STATUSES";

/// The pipeline-name key inside one entry of `PIPELINES`/`CONFIG_STREAMS`.
pub const NAME: &str = "NAME";

/// The well-known pipeline name hosting the net-config-monitor plugin on
/// every node.
pub const ADMIN_PIPELINE: &str = "admin_pipeline";
/// Plugin signature for network-monitor (netmon) snapshot payloads.
pub const NETWORK_MONITOR_SIGNATURE: &str = "NET_MON_01";
/// Plugin signature for net-config request/reply payloads.
pub const NET_CONFIG_MONITOR_SIGNATURE: &str = "NET_CONFIG_MONITOR_01";

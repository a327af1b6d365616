// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The closed set of outbound command actions, per spec.md §6.

/// Recognized command actions. Wire representation is the variant name
/// itself, verbatim, for interoperability with the rest of the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    UpdateConfig,
    DeleteConfig,
    ArchiveConfig,
    UpdatePipelineInstance,
    BatchUpdatePipelineInstance,
    PipelineCommand,
    InstanceCommand,
    Stop,
    Restart,
    FullHeartbeat,
    TimersOnlyHeartbeat,
    ReloadConfigFromDisk,
    ArchiveConfigAll,
    DeleteConfigAll,
}

impl CommandAction {
    #[must_use]
    pub const fn as_wire_str(self) -> &'static str {
        match self {
            Self::UpdateConfig => "UPDATE_CONFIG",
            Self::DeleteConfig => "DELETE_CONFIG",
            Self::ArchiveConfig => "ARCHIVE_CONFIG",
            Self::UpdatePipelineInstance => "UPDATE_PIPELINE_INSTANCE",
            Self::BatchUpdatePipelineInstance => "BATCH_UPDATE_PIPELINE_INSTANCE",
            Self::PipelineCommand => "PIPELINE_COMMAND",
            Self::InstanceCommand => "INSTANCE_COMMAND",
            Self::Stop => "STOP",
            Self::Restart => "RESTART",
            Self::FullHeartbeat => "FULL_HEARTBEAT",
            Self::TimersOnlyHeartbeat => "TIMERS_ONLY_HEARTBEAT",
            Self::ReloadConfigFromDisk => "RELOAD_CONFIG_FROM_DISK",
            Self::ArchiveConfigAll => "ARCHIVE_CONFIG_ALL",
            Self::DeleteConfigAll => "DELETE_CONFIG_ALL",
        }
    }
}

impl std::fmt::Display for CommandAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_match_the_closed_set_names() {
        assert_eq!(CommandAction::ArchiveConfig.as_wire_str(), "ARCHIVE_CONFIG");
        assert_eq!(CommandAction::BatchUpdatePipelineInstance.as_wire_str(), "BATCH_UPDATE_PIPELINE_INSTANCE");
    }
}

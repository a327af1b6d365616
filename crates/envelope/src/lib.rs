// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The envelope codec: raw-frame parsing, conditional decrypt-for-self,
//! pluggable payload formatters, and the wire field name constants.

mod codec;
mod envelope;
pub mod fields;
mod error;
mod formatter;

pub use codec::{decompress_heartbeat_v2, parse};
pub use envelope::{Envelope, PayloadPath};
pub use error::{EnvelopeError, Result};
pub use formatter::{FormatterRegistry, FORMATTER_FIELD, RAW_DICT_FORMATTER};

//! Control-channel message types.
//!
//! The page talks to the worker with small tagged JSON messages; replies
//! travel back over a one-shot port supplied with the message.

use serde::{Deserialize, Serialize};

/// Message from the page to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
  /// Ask for the worker version; answered on the reply port
  #[serde(rename = "GET_SW_VERSION")]
  GetSwVersion,
  /// Force the waiting worker to activate without waiting for tabs to close
  #[serde(rename = "SKIP_WAITING")]
  SkipWaiting,
  /// Any kind this worker does not understand; ignored silently
  #[serde(other)]
  Unknown,
}

/// Reply from the worker to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlReply {
  #[serde(rename = "SW_VERSION")]
  SwVersion { value: String },
}

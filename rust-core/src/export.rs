//! JSON export of selected windows.
//!
//! Each export is self-contained: the channel the windows were picked on,
//! plus every window with its sample range, absolute times, similarity
//! measurements and phase arrivals. Reading an export back yields the same
//! windows.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Window;

/// Windows of one channel, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowExport {
    pub channel_id: Option<String>,
    pub windows: Vec<ExportedWindow>,
}

/// A window with its absolute times spelled out for downstream readers.
/// The times are `null` when they fall outside the representable range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedWindow {
    pub absolute_starttime: Option<DateTime<Utc>>,
    pub absolute_endtime: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub window: Window,
}

impl WindowExport {
    /// Channel id is taken from the first window.
    pub fn new(windows: &[Window]) -> Self {
        Self {
            channel_id: windows.first().and_then(|w| w.channel_id.clone()),
            windows: windows
                .iter()
                .map(|w| ExportedWindow {
                    absolute_starttime: w.absolute_starttime(),
                    absolute_endtime: w.absolute_endtime(),
                    window: w.clone(),
                })
                .collect(),
        }
    }

    pub fn into_windows(self) -> Vec<Window> {
        self.windows.into_iter().map(|w| w.window).collect()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::session::error::AutofillError;
use crate::surface::surface::DocumentSurface;
use crate::surface::surface_model::{DomField, RegionId, ScanScope, SurfaceEvent};

/// Request sent to viewer_bridge.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BridgeRequest {
    Open {
        cmd: &'static str,
        url: String,
    },
    NextEvent {
        cmd: &'static str,
    },
    QueryInputs {
        cmd: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        region: Option<String>,
    },
    FindByKey {
        cmd: &'static str,
        key: String,
    },
    SetValue {
        cmd: &'static str,
        node: u64,
        value: String,
    },
    SetChecked {
        cmd: &'static str,
        node: u64,
        checked: bool,
    },
    NotifyChanged {
        cmd: &'static str,
        node: u64,
    },
    HasViewerRoot {
        cmd: &'static str,
    },
    SublayerPresent {
        cmd: &'static str,
        region: String,
    },
    Settle {
        cmd: &'static str,
        duration_ms: u64,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BridgeRequest {
    pub fn open(url: &str) -> Self {
        BridgeRequest::Open {
            cmd: "open",
            url: url.to_string(),
        }
    }

    pub fn next_event() -> Self {
        BridgeRequest::NextEvent { cmd: "next_event" }
    }

    pub fn query_inputs(scope: &ScanScope) -> Self {
        BridgeRequest::QueryInputs {
            cmd: "query_inputs",
            region: match scope {
                ScanScope::Document => None,
                ScanScope::Region(region) => Some(region.0.clone()),
            },
        }
    }

    pub fn find_by_key(key: &str) -> Self {
        BridgeRequest::FindByKey {
            cmd: "find_by_key",
            key: key.to_string(),
        }
    }

    pub fn set_value(node: u64, value: &str) -> Self {
        BridgeRequest::SetValue {
            cmd: "set_value",
            node,
            value: value.to_string(),
        }
    }

    pub fn set_checked(node: u64, checked: bool) -> Self {
        BridgeRequest::SetChecked {
            cmd: "set_checked",
            node,
            checked,
        }
    }

    pub fn notify_changed(node: u64) -> Self {
        BridgeRequest::NotifyChanged {
            cmd: "notify_changed",
            node,
        }
    }

    pub fn has_viewer_root() -> Self {
        BridgeRequest::HasViewerRoot {
            cmd: "has_viewer_root",
        }
    }

    pub fn sublayer_present(region: &RegionId) -> Self {
        BridgeRequest::SublayerPresent {
            cmd: "sublayer_present",
            region: region.0.clone(),
        }
    }

    pub fn settle(duration_ms: u64) -> Self {
        BridgeRequest::Settle {
            cmd: "settle",
            duration_ms,
        }
    }

    pub fn quit() -> Self {
        BridgeRequest::Quit { cmd: "quit" }
    }
}

/// Structural event reported by the bridge's mutation watch.
#[derive(Debug, Deserialize)]
pub struct BridgeEvent {
    pub kind: String,
    pub region: String,
}

/// Response received from viewer_bridge.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub event: Option<BridgeEvent>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub fields: Option<Vec<DomField>>,
    #[serde(default)]
    pub present: Option<bool>,
}

/// A live document surface backed by viewer_bridge.js.
///
/// Spawns a long-lived Node.js process that keeps the document open and
/// watches it for structural mutations. Commands are sent as NDJSON over
/// stdin, responses read from stdout. Teardown is fire-and-forget: dropping
/// the surface best-effort quits the bridge and discards anything pending.
pub struct BridgeSurface {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
}

impl BridgeSurface {
    /// Spawn the bridge, wait for its ready signal, and open `url`.
    pub fn launch(script: &str, url: &str) -> Result<Self, AutofillError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AutofillError::BridgeSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            AutofillError::BridgeIo("Failed to capture stdin of the viewer bridge".into())
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            AutofillError::BridgeIo("Failed to capture stdout of the viewer bridge".into())
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| AutofillError::BridgeIo(format!("Failed to read ready signal: {}", e)))?;

        let response: BridgeResponse =
            serde_json::from_str(line.trim()).map_err(|e| AutofillError::JsonParse {
                context: "viewer bridge ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(AutofillError::BridgeProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from the viewer bridge".into(),
            });
        }

        let mut surface = BridgeSurface {
            child,
            stdin,
            reader,
        };
        surface.send_ok(&BridgeRequest::open(url), "open")?;
        Ok(surface)
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BridgeRequest) -> Result<BridgeResponse, AutofillError> {
        let json = serde_json::to_string(request).map_err(|e| AutofillError::JsonSerialize {
            context: "BridgeRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json)
            .map_err(|e| AutofillError::BridgeIo(format!("Failed to write to bridge stdin: {}", e)))?;

        self.stdin
            .flush()
            .map_err(|e| AutofillError::BridgeIo(format!("Failed to flush bridge stdin: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| AutofillError::BridgeIo(format!("Failed to read from bridge stdout: {}", e)))?;

        if line.trim().is_empty() {
            return Err(AutofillError::BridgeIo(
                "Empty response from the viewer bridge (process may have died)".into(),
            ));
        }

        let response: BridgeResponse =
            serde_json::from_str(line.trim()).map_err(|e| AutofillError::JsonParse {
                context: "viewer bridge response".into(),
                source: e,
            })?;

        Ok(response)
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &BridgeRequest,
        command_name: &str,
    ) -> Result<BridgeResponse, AutofillError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(AutofillError::BridgeProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Quit the bridge session.
    pub fn quit(&mut self) -> Result<(), AutofillError> {
        // Best-effort quit; the process may already be gone
        let _ = self.send(&BridgeRequest::quit());
        let _ = self.child.wait();
        Ok(())
    }
}

impl DocumentSurface for BridgeSurface {
    fn next_event(&mut self) -> Result<Option<SurfaceEvent>, AutofillError> {
        let response = self.send_ok(&BridgeRequest::next_event(), "next_event")?;
        if response.done == Some(true) {
            return Ok(None);
        }
        let event = response.event.ok_or_else(|| AutofillError::BridgeProtocol {
            command: "next_event".into(),
            error: "Response carried neither an event nor done".into(),
        })?;
        let region = RegionId(event.region);
        match event.kind.as_str() {
            "region" => Ok(Some(SurfaceEvent::RegionAdded(region))),
            "sublayer" => Ok(Some(SurfaceEvent::SublayerAdded(region))),
            other => Err(AutofillError::BridgeProtocol {
                command: "next_event".into(),
                error: format!("Unknown event kind '{}'", other),
            }),
        }
    }

    fn query_inputs(&mut self, scope: &ScanScope) -> Result<Vec<DomField>, AutofillError> {
        let response = self.send_ok(&BridgeRequest::query_inputs(scope), "query_inputs")?;
        Ok(response.fields.unwrap_or_default())
    }

    fn find_by_key(&mut self, key: &str) -> Result<Vec<DomField>, AutofillError> {
        let response = self.send_ok(&BridgeRequest::find_by_key(key), "find_by_key")?;
        Ok(response.fields.unwrap_or_default())
    }

    fn set_value(&mut self, node: u64, value: &str) -> Result<(), AutofillError> {
        self.send_ok(&BridgeRequest::set_value(node, value), "set_value")?;
        Ok(())
    }

    fn set_checked(&mut self, node: u64, checked: bool) -> Result<(), AutofillError> {
        self.send_ok(&BridgeRequest::set_checked(node, checked), "set_checked")?;
        Ok(())
    }

    fn notify_changed(&mut self, node: u64) -> Result<(), AutofillError> {
        self.send_ok(&BridgeRequest::notify_changed(node), "notify_changed")?;
        Ok(())
    }

    fn has_viewer_root(&mut self) -> Result<bool, AutofillError> {
        let response = self.send_ok(&BridgeRequest::has_viewer_root(), "has_viewer_root")?;
        Ok(response.present.unwrap_or(false))
    }

    fn sublayer_present(&mut self, region: &RegionId) -> Result<bool, AutofillError> {
        let response = self.send_ok(&BridgeRequest::sublayer_present(region), "sublayer_present")?;
        Ok(response.present.unwrap_or(false))
    }

    fn settle(&mut self, duration_ms: u64) -> Result<(), AutofillError> {
        self.send_ok(&BridgeRequest::settle(duration_ms), "settle")?;
        Ok(())
    }
}

impl Drop for BridgeSurface {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.quit();
    }
}

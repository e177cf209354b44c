//! Transcript-replay gateway.
//!
//! Serves recorded device output from a YAML capture file instead of a live
//! transport, so a discovery run can be reproduced offline:
//!
//! ```yaml
//! devices:
//!   "10.0.0.1":
//!     prompt: "R1#"
//!     username: admin          # optional, checked on open
//!     password: secret         # optional, checked on open
//!     secret: enable           # optional, checked on escalation
//!     commands:
//!       show cdp neighbors detail: |
//!         Device ID: S1
//!         ...
//!   "10.0.0.2":
//!     fail: timeout            # auth | timeout | other
//! ```
//!
//! Hosts missing from the capture behave like unreachable devices.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{DeviceGateway, DeviceSession, SessionError};
use crate::discovery::types::ConnectionParams;

/// Errors loading a capture file
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Cannot open capture file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid capture file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Forced failure for a captured host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    Auth,
    Timeout,
    Other,
}

/// Recorded behaviour of one device
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceTranscript {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<FailureMode>,
    #[serde(default)]
    pub commands: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaptureFile {
    #[serde(default)]
    devices: HashMap<String, DeviceTranscript>,
}

/// Gateway that replays captured transcripts keyed by host
#[derive(Debug, Clone, Default)]
pub struct ReplayGateway {
    devices: HashMap<String, Arc<DeviceTranscript>>,
}

impl ReplayGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a capture file from disk
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        log::info!("Loading device transcripts from: {:?}", path);
        let file = File::open(path).map_err(|source| CaptureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let capture: CaptureFile = serde_yaml::from_reader(file)?;
        Ok(Self::from_capture(capture))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CaptureError> {
        let capture: CaptureFile = serde_yaml::from_str(yaml)?;
        Ok(Self::from_capture(capture))
    }

    fn from_capture(capture: CaptureFile) -> Self {
        let devices = capture
            .devices
            .into_iter()
            .map(|(host, transcript)| (host, Arc::new(transcript)))
            .collect::<HashMap<_, _>>();
        log::debug!("Capture holds {} device transcripts", devices.len());
        Self { devices }
    }

    /// Add or replace the transcript for `host`
    pub fn insert(&mut self, host: impl Into<String>, transcript: DeviceTranscript) {
        self.devices.insert(host.into(), Arc::new(transcript));
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceGateway for ReplayGateway {
    type Session = ReplaySession;

    fn open(&self, params: &ConnectionParams) -> Result<ReplaySession, SessionError> {
        let address = format!("{}:{}", params.host, params.port);
        let transcript = self
            .devices
            .get(&params.host)
            .ok_or_else(|| SessionError::Timeout(format!("no response from {}", address)))?;

        match transcript.fail {
            Some(FailureMode::Auth) => {
                return Err(SessionError::Auth(format!("{} rejected credentials", address)))
            }
            Some(FailureMode::Timeout) => {
                return Err(SessionError::Timeout(format!("connection to {} timed out", address)))
            }
            Some(FailureMode::Other) => {
                return Err(SessionError::Other(format!("connection to {} failed", address)))
            }
            None => {}
        }

        let username_ok = transcript.username.as_ref().map_or(true, |u| *u == params.username);
        let password_ok = transcript.password.as_ref().map_or(true, |p| *p == params.password);
        if !username_ok || !password_ok {
            return Err(SessionError::Auth(format!(
                "{} rejected credentials for user '{}'",
                address, params.username
            )));
        }

        Ok(ReplaySession {
            host: params.host.clone(),
            secret: params.secret.clone(),
            transcript: Arc::clone(transcript),
            privileged: false,
            closed: false,
        })
    }
}

/// Session over one captured transcript
#[derive(Debug)]
pub struct ReplaySession {
    host: String,
    secret: Option<String>,
    transcript: Arc<DeviceTranscript>,
    privileged: bool,
    closed: bool,
}

impl ReplaySession {
    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Other(format!("session to {} is closed", self.host)))
        } else {
            Ok(())
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}

impl DeviceSession for ReplaySession {
    fn escalate_privilege(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if let Some(expected) = &self.transcript.secret {
            if self.secret.as_ref() != Some(expected) {
                return Err(SessionError::Auth(format!(
                    "enable secret rejected by {}",
                    self.host
                )));
            }
        }
        self.privileged = true;
        Ok(())
    }

    fn identify(&mut self) -> Result<String, SessionError> {
        self.ensure_open()?;
        let prompt = self.transcript.prompt.trim_end();
        // Recorded prompts may omit the mode marker; mirror the current mode.
        if prompt.ends_with('#') || prompt.ends_with('>') {
            Ok(prompt.to_string())
        } else {
            let marker = if self.privileged { '#' } else { '>' };
            Ok(format!("{}{}", prompt, marker))
        }
    }

    fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        self.ensure_open()?;
        self.transcript
            .commands
            .get(command.trim())
            .cloned()
            .ok_or_else(|| {
                SessionError::Other(format!("{}: no output captured for '{}'", self.host, command))
            })
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::types::{DEFAULT_DEVICE_TYPE, DEFAULT_PORT};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CAPTURE: &str = r#"
devices:
  "10.0.0.1":
    prompt: "R1"
    username: admin
    password: secret
    secret: enable
    commands:
      show cdp neighbors detail: |
        Device ID: S1
          IP address: 10.0.0.2
        Interface: Gi0/1,  Port ID (outgoing port): Gi0/2
  "10.0.0.2":
    fail: timeout
"#;

    fn params(host: &str, password: &str) -> ConnectionParams {
        ConnectionParams {
            host: host.to_string(),
            port: DEFAULT_PORT,
            username: "admin".to_string(),
            password: password.to_string(),
            secret: Some("enable".to_string()),
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            timeout: None,
        }
    }

    #[test]
    fn test_replay_session_flow() {
        let gateway = ReplayGateway::from_yaml_str(CAPTURE).unwrap();
        assert_eq!(gateway.len(), 2);

        let mut session = gateway.open(&params("10.0.0.1", "secret")).unwrap();
        assert_eq!(session.identify().unwrap(), "R1>");
        session.escalate_privilege().unwrap();
        assert!(session.is_privileged());
        assert_eq!(session.identify().unwrap(), "R1#");

        let output = session.execute("show cdp neighbors detail").unwrap();
        assert!(output.contains("Device ID: S1"));
        assert!(session.execute("show version").is_err());

        session.close();
        assert!(session.execute("show cdp neighbors detail").is_err());
    }

    #[test]
    fn test_forced_failures_and_unknown_hosts() {
        let gateway = ReplayGateway::from_yaml_str(CAPTURE).unwrap();

        let err = gateway.open(&params("10.0.0.2", "secret")).unwrap_err();
        assert!(matches!(err, SessionError::Timeout(_)));

        let err = gateway.open(&params("10.9.9.9", "secret")).unwrap_err();
        assert!(matches!(err, SessionError::Timeout(_)));
    }

    #[test]
    fn test_credential_checks() {
        let gateway = ReplayGateway::from_yaml_str(CAPTURE).unwrap();

        let err = gateway.open(&params("10.0.0.1", "wrong")).unwrap_err();
        assert!(matches!(err, SessionError::Auth(_)));

        let mut bad_secret = params("10.0.0.1", "secret");
        bad_secret.secret = None;
        let mut session = gateway.open(&bad_secret).unwrap();
        assert!(matches!(session.escalate_privilege(), Err(SessionError::Auth(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", CAPTURE).unwrap();

        let gateway = ReplayGateway::load(temp_file.path()).unwrap();
        assert_eq!(gateway.len(), 2);

        let missing = ReplayGateway::load(Path::new("/nonexistent/capture.yaml"));
        assert!(matches!(missing, Err(CaptureError::Io { .. })));
    }

    #[test]
    fn test_gateway_built_in_code() {
        let mut gateway = ReplayGateway::new();
        assert!(gateway.is_empty());

        let mut commands = HashMap::new();
        commands.insert("show cdp neighbors detail".to_string(), String::new());
        gateway.insert(
            "10.0.0.5",
            DeviceTranscript {
                prompt: "R5#".to_string(),
                commands,
                ..DeviceTranscript::default()
            },
        );
        assert!(!gateway.is_empty());
        assert_eq!(gateway.len(), 1);

        let mut session = gateway.open(&params("10.0.0.5", "anything")).unwrap();
        assert_eq!(session.identify().unwrap(), "R5#");
        assert_eq!(session.execute("show cdp neighbors detail").unwrap(), "");

        gateway.insert(
            "10.0.0.5",
            DeviceTranscript {
                fail: Some(FailureMode::Other),
                ..DeviceTranscript::default()
            },
        );
        assert_eq!(gateway.len(), 1);
        assert!(matches!(
            gateway.open(&params("10.0.0.5", "anything")),
            Err(SessionError::Other(_))
        ));
    }

    #[test]
    fn test_unknown_capture_keys_rejected() {
        let yaml = "devices:\n  \"10.0.0.1\":\n    promt: \"R1#\"\n";
        assert!(matches!(
            ReplayGateway::from_yaml_str(yaml),
            Err(CaptureError::Yaml(_))
        ));
    }
}

//! Settings types

use serde::{Deserialize, Serialize};

/// Ready marker printed by OpenVPN once the tunnel is up
pub const DEFAULT_TUNNEL_READY_MARKER: &str = "Initialization Sequence Completed";

/// Default tunnel program
pub const DEFAULT_TUNNEL_PROGRAM: &str = "openvpn";

// ============================================================================
// Settings
// ============================================================================

/// Runner settings, merged from every settings file that exists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// AWS client settings
    #[serde(default)]
    pub aws: AwsSection,

    /// VPN tunnel settings
    #[serde(default)]
    pub tunnel: TunnelSection,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `later` over `self`; set fields in `later` win
    pub fn merge(self, later: Settings) -> Settings {
        Settings {
            aws: AwsSection {
                region: later.aws.region.or(self.aws.region),
            },
            tunnel: TunnelSection {
                program: later.tunnel.program.or(self.tunnel.program),
                args: if later.tunnel.args.is_empty() {
                    self.tunnel.args
                } else {
                    later.tunnel.args
                },
                ready_marker: later.tunnel.ready_marker.or(self.tunnel.ready_marker),
                ready_timeout_secs: later
                    .tunnel
                    .ready_timeout_secs
                    .or(self.tunnel.ready_timeout_secs),
            },
        }
    }
}

/// `aws` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// `tunnel` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelSection {
    /// Program that establishes the tunnel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Extra arguments for the program
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Stdout line fragment signalling the tunnel is up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_marker: Option<String>,

    /// Give up waiting for the ready marker after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_timeout_secs: Option<u64>,
}

impl TunnelSection {
    pub fn program(&self) -> &str {
        self.program.as_deref().unwrap_or(DEFAULT_TUNNEL_PROGRAM)
    }

    pub fn ready_marker(&self) -> &str {
        self.ready_marker
            .as_deref()
            .unwrap_or(DEFAULT_TUNNEL_READY_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_later() {
        let earlier = Settings {
            aws: AwsSection {
                region: Some("us-east-1".to_string()),
            },
            tunnel: TunnelSection {
                program: Some("openvpn".to_string()),
                args: vec!["--config".to_string(), "a.ovpn".to_string()],
                ..Default::default()
            },
        };
        let later = Settings {
            aws: AwsSection {
                region: Some("eu-west-1".to_string()),
            },
            tunnel: TunnelSection {
                ready_timeout_secs: Some(30),
                ..Default::default()
            },
        };

        let merged = earlier.merge(later);
        assert_eq!(merged.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(merged.tunnel.program(), "openvpn");
        assert_eq!(merged.tunnel.args.len(), 2);
        assert_eq!(merged.tunnel.ready_timeout_secs, Some(30));
    }

    #[test]
    fn test_tunnel_defaults() {
        let section = TunnelSection::default();
        assert_eq!(section.program(), DEFAULT_TUNNEL_PROGRAM);
        assert_eq!(section.ready_marker(), DEFAULT_TUNNEL_READY_MARKER);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let settings: Settings = serde_json::from_str(
            r#"{"tunnel": {"readyMarker": "up", "readyTimeoutSecs": 5}}"#,
        )
        .unwrap();
        assert_eq!(settings.tunnel.ready_marker(), "up");
        assert_eq!(settings.tunnel.ready_timeout_secs, Some(5));
        assert!(settings.aws.region.is_none());
    }
}

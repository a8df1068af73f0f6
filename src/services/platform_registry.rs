// Platform Registry
// Centralized configuration for streaming platforms

use crate::models::Platform;
use serde::Deserialize;
use std::collections::HashMap;

/// Stream key placement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKeyPlacement {
    /// Append stream key to URL (e.g., rtmp://server/app/{key})
    Append,
    /// Replace {stream_key} template in URL (e.g., rtmp://server/app/{stream_key})
    InUrlTemplate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformEntry {
    name: Platform,
    display_name: String,
    default_url: String,
    stream_key_placement: StreamKeyPlacement,
    #[serde(default)]
    requires_key: bool,
    #[serde(default)]
    protocols: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlatformFile {
    services: Vec<PlatformEntry>,
}

/// Platform-specific configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Display name
    pub name: String,

    /// Default server URL; empty for custom servers
    pub default_server: String,

    /// Stream key placement strategy
    pub placement: StreamKeyPlacement,

    /// Whether the wizard must ask for a stream key
    pub requires_key: bool,

    /// Protocols the platform ingests (rtmp, rtmps, srt)
    pub protocols: Vec<String>,

    /// Stream key position in URL path (0 = no masking, 1 = /KEY, 2 = /app/KEY, etc.)
    pub stream_key_position: usize,
}

impl PlatformConfig {
    /// Redact stream key from URL for logging
    pub fn redact_url(&self, url: &str) -> String {
        if !is_rtmp_url(url) {
            return url.to_string();
        }

        match self.placement {
            StreamKeyPlacement::InUrlTemplate => {
                let template = self.default_server.as_str();
                if let Some(template_start) = template.find("{stream_key}") {
                    let before_key = &template[..template_start];
                    let after_key = &template[template_start + "{stream_key}".len()..];

                    if url.starts_with(before_key) {
                        if after_key.is_empty() {
                            return format!("{before_key}***");
                        }
                        if let Some(key_end) = url[before_key.len()..].find(after_key) {
                            return format!("{}***{}", before_key, &url[before_key.len() + key_end..]);
                        }
                    }
                }

                PlatformRegistry::generic_redact(url)
            }
            StreamKeyPlacement::Append => {
                if self.stream_key_position == 0 {
                    return PlatformRegistry::generic_redact(url);
                }

                let Some((scheme, rest)) = url.split_once("://") else {
                    return url.to_string();
                };
                let Some((host, path)) = rest.split_once('/') else {
                    return url.to_string();
                };

                let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
                if segments.len() < self.stream_key_position {
                    return url.to_string();
                }

                let safe_path = segments[..self.stream_key_position - 1].join("/");
                if safe_path.is_empty() {
                    format!("{scheme}://{host}/***")
                } else {
                    format!("{scheme}://{host}/{safe_path}/***")
                }
            }
        }
    }
}

/// Global platform registry
pub struct PlatformRegistry {
    configs: HashMap<Platform, PlatformConfig>,
}

impl PlatformRegistry {
    /// Create a new registry from the embedded platform list
    pub fn new() -> Self {
        let json_content = include_str!("../../data/streaming-platforms.json");
        match Self::from_json(json_content) {
            Ok(registry) => registry,
            Err(e) => {
                log::error!("Failed to load embedded platform list: {e}");
                Self { configs: HashMap::new() }
            }
        }
    }

    /// Parse a platform list in the `{"services": [...]}` format
    pub fn from_json(json_content: &str) -> Result<Self, String> {
        let file: PlatformFile = serde_json::from_str(json_content)
            .map_err(|e| format!("Failed to parse platform list: {e}"))?;

        let configs = file
            .services
            .into_iter()
            .map(|entry| {
                let stream_key_position = Self::stream_key_position(&entry.default_url);
                let config = PlatformConfig {
                    name: entry.display_name,
                    default_server: entry.default_url,
                    placement: entry.stream_key_placement,
                    requires_key: entry.requires_key,
                    protocols: entry.protocols,
                    stream_key_position,
                };
                (entry.name, config)
            })
            .collect();

        Ok(Self { configs })
    }

    /// Position of the key segment for an append-style server URL:
    /// rtmp://host/live2/ -> 2 (/live2/KEY)
    fn stream_key_position(url: &str) -> usize {
        let Some((_scheme, rest)) = url.split_once("://") else {
            return 0;
        };
        let path = rest.split_once('/').map(|(_, path)| path).unwrap_or("");
        path.split('/').filter(|s| !s.is_empty()).count() + 1
    }

    /// Get configuration for a platform
    pub fn get(&self, platform: &Platform) -> Option<&PlatformConfig> {
        self.configs.get(platform)
    }

    /// Build the destination URL for a platform.
    ///
    /// Custom servers take `url` as-is; known platforms combine their default
    /// server with the stream key.
    pub fn build_url_with_key(&self, platform: &Platform, url: &str, stream_key: &str) -> String {
        let config = match self.get(platform) {
            Some(config) if !config.default_server.is_empty() => config,
            _ => return url.to_string(),
        };

        match config.placement {
            StreamKeyPlacement::Append => {
                format!("{}/{}", config.default_server.trim_end_matches('/'), stream_key)
            }
            StreamKeyPlacement::InUrlTemplate => {
                config.default_server.replace("{stream_key}", stream_key)
            }
        }
    }

    /// Redact stream key from URL
    pub fn redact_url(&self, platform: &Platform, url: &str) -> String {
        match self.get(platform) {
            Some(config) if !config.default_server.is_empty() => config.redact_url(url),
            _ => Self::generic_redact(url),
        }
    }

    /// Redact every RTMP(S) URL in an argument list.
    /// Matches each URL against known platform servers, falling back to generic redaction.
    pub fn redact_args(&self, args: &[String]) -> Vec<String> {
        args.iter()
            .map(|arg| {
                if !is_rtmp_url(arg) {
                    return arg.clone();
                }
                self.configs
                    .values()
                    .find(|config| {
                        !config.default_server.is_empty()
                            && arg.starts_with(config.default_server.trim_end_matches('/'))
                    })
                    .map(|config| config.redact_url(arg))
                    .unwrap_or_else(|| Self::generic_redact(arg))
            })
            .collect()
    }

    /// Generic redaction for unknown platforms (fallback)
    pub fn generic_redact(url: &str) -> String {
        if !is_rtmp_url(url) {
            return url.to_string();
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return url.to_string();
        };
        let Some((host, path)) = rest.split_once('/') else {
            return url.to_string();
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return url.to_string();
        }

        let safe_path = segments[..segments.len() - 1].join("/");
        format!("{scheme}://{host}/{safe_path}/***")
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn is_rtmp_url(url: &str) -> bool {
    url.starts_with("rtmp://") || url.starts_with("rtmps://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_from_json() {
        let registry = PlatformRegistry::new();
        for platform in Platform::ALL {
            assert!(registry.get(&platform).is_some(), "missing {platform:?}");
        }
        assert!(registry.get(&Platform::Youtube).unwrap().requires_key);
        assert!(!registry.get(&Platform::Custom).unwrap().requires_key);
    }

    #[test]
    fn test_build_url_with_key() {
        let registry = PlatformRegistry::new();
        assert_eq!(
            registry.build_url_with_key(&Platform::Youtube, "", "abcd-1234"),
            "rtmp://a.rtmp.youtube.com/live2/abcd-1234"
        );
        assert_eq!(
            registry.build_url_with_key(&Platform::Facebook, "", "FB-1"),
            "rtmps://live-api-s.facebook.com:443/rtmp/FB-1"
        );
        assert_eq!(
            registry.build_url_with_key(&Platform::Custom, "rtmp://my.server/live/x", "ignored"),
            "rtmp://my.server/live/x"
        );
    }

    #[test]
    fn test_platform_redaction() {
        let registry = PlatformRegistry::new();
        assert_eq!(
            registry.redact_url(&Platform::Twitch, "rtmp://live.twitch.tv/app/live_123_secret"),
            "rtmp://live.twitch.tv/app/***"
        );
    }

    #[test]
    fn test_generic_redaction() {
        let url = "rtmp://custom-server.com/stream/my_key";
        assert_eq!(PlatformRegistry::generic_redact(url), "rtmp://custom-server.com/stream/***");
        assert_eq!(PlatformRegistry::generic_redact("srt://host:6000"), "srt://host:6000");
    }

    #[test]
    fn test_redact_args_leaves_other_args() {
        let registry = PlatformRegistry::new();
        let args = vec![
            "-f".to_string(),
            "flv".to_string(),
            "rtmp://a.rtmp.youtube.com/live2/super-secret".to_string(),
            "/memfs/show/index.m3u8".to_string(),
        ];
        let redacted = registry.redact_args(&args);
        assert_eq!(redacted[0], "-f");
        assert_eq!(redacted[2], "rtmp://a.rtmp.youtube.com/live2/***");
        assert_eq!(redacted[3], "/memfs/show/index.m3u8");
    }
}

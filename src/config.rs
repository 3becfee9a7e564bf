use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const ENV_PREFIX: &str = "GLWINDOW_";

lazy_static! {
    /// Settings read once from the environment, used by every window that
    /// isn't given an explicit config.
    pub static ref DEFAULT_CONFIG: WindowConfig = match WindowConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!(target: "glwindow", "Ignoring environment config: {}", err);
            WindowConfig::default()
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientApi {
    Vulkan,
    OpenGl,
    OpenGlEs,
}

impl Default for ClientApi {
    fn default() -> Self {
        ClientApi::OpenGl
    }
}

impl FromStr for ClientApi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "vulkan" => Ok(ClientApi::Vulkan),
            "ogl" | "gl" | "opengl" => Ok(ClientApi::OpenGl),
            "ogles" | "ogl_es" | "gles" | "opengles" | "opengl_es" => Ok(ClientApi::OpenGlEs),
            _ => Err(Error::UnsupportedClientApi(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ClientApi {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Context and framebuffer settings applied as window hints.
/// Negative values mean "don't care".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub version_major: u32,
    pub version_minor: u32,
    pub client_api: ClientApi,
    pub use_egl: bool,
    pub swap_interval: i32,
    pub samples: i32,
    pub red_bits: i32,
    pub green_bits: i32,
    pub blue_bits: i32,
    pub alpha_bits: i32,
    pub depth_bits: i32,
    pub stencil_bits: i32,
    pub refresh_rate: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            version_major: 1,
            version_minor: 0,
            client_api: ClientApi::OpenGl,
            use_egl: false,
            swap_interval: 1,
            samples: -1,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            refresh_rate: -1,
        }
    }
}

impl WindowConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Builds a config from `GLWINDOW_*` variables resolved by `lookup`.
    /// Missing variables keep their default.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let mut config = WindowConfig::default();
        let get = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));

        if let Some(version) = get("GL_VERSION") {
            let (major, minor) = parse_version(&version)?;
            config.version_major = major;
            config.version_minor = minor;
        }
        if let Some(api) = get("CLIENT_API") {
            config.client_api = api.parse()?;
        }
        if let Some(use_egl) = get("USE_EGL") {
            config.use_egl = parse_setting("USE_EGL", &use_egl)?;
        }

        let int_settings: [(&str, &mut i32); 9] = [
            ("SWAP_INTERVAL", &mut config.swap_interval),
            ("MSAA", &mut config.samples),
            ("RED_BITS", &mut config.red_bits),
            ("GREEN_BITS", &mut config.green_bits),
            ("BLUE_BITS", &mut config.blue_bits),
            ("ALPHA_BITS", &mut config.alpha_bits),
            ("DEPTH_BITS", &mut config.depth_bits),
            ("STENCIL_BITS", &mut config.stencil_bits),
            ("REFRESH_RATE", &mut config.refresh_rate),
        ];
        for (key, slot) in int_settings {
            if let Some(value) = get(key) {
                *slot = parse_setting(key, &value)?;
            }
        }

        Ok(config)
    }
}

/// Parses `"major.minor"`.
pub fn parse_version(version: &str) -> Result<(u32, u32)> {
    let malformed = || Error::InvalidVersion(version.to_string());
    let dot = version.find('.').ok_or_else(malformed)?;
    let major = version[..dot].trim().parse().map_err(|_| malformed())?;
    let minor = version[dot + 1..].trim().parse().map_err(|_| malformed())?;
    Ok((major, minor))
}

fn parse_setting<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidSetting {
        name: format!("{}{}", ENV_PREFIX, name),
        value: value.to_string(),
    })
}

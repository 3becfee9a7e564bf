use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not initialize GLFW: {0}")]
    Init(String),

    #[error("failed to create the GLFW window")]
    WindowCreation,

    #[error("invalid GlWindow")]
    InvalidWindow,

    #[error("invalid {kind} value: {value}")]
    InvalidEnum { kind: &'static str, value: i32 },

    #[error("cannot set window size to {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("unsupported client API: {0}")]
    UnsupportedClientApi(String),

    #[error("malformed GL version: {0}")]
    InvalidVersion(String),

    #[error("invalid value for {name}: {value}")]
    InvalidSetting { name: String, value: String },

    #[error("viewport stack is not empty on window resize")]
    ViewportStackNotEmpty,

    #[error("the GL thread has shut down")]
    ThreadShutdown,

    #[error("no primary monitor or video mode available")]
    NoVideoMode,

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}

use std::fmt;

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
        }
    }
}

#[derive(serde::Deserialize, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Operator password. The dashboard is open when unset.
    pub password: Option<Box<str>>,
    /// Key for signing session cookies. A random key is generated at startup when unset,
    /// which logs everyone out on restart.
    pub session_secret: Option<Box<str>>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<Box<str>>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthConfig")
            .field("password", &redact(&self.password))
            .field("session_secret", &redact(&self.session_secret))
            .finish()
    }
}

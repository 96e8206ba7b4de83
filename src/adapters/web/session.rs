//! Password gate and signed session cookies.
//!
//! A session cookie is `<nonce>.<signature>` where the signature is an HMAC-SHA256 of the
//! nonce under the server's session key. Holding a valid cookie is what "authenticated"
//! means; the server keeps no session table.

use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "approval_session";

/// Per-request session state, handed to handlers explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub authenticated: bool,
}

pub struct SessionKeys {
    key: Vec<u8>,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKeys(<redacted>)")
    }
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: secret.to_vec(),
        }
    }

    pub fn generate() -> Self {
        let mut key = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    fn mac(&self, message: &[u8]) -> HmacSha256 {
        // HMAC takes keys of any length.
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(message);
        mac
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.mac(message).finalize().into_bytes().to_vec()
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        self.mac(message).verify_slice(signature).is_ok()
    }

    /// A fresh session token.
    pub fn issue(&self) -> String {
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        let nonce = hex::encode(nonce);
        let signature = hex::encode(self.sign(nonce.as_bytes()));
        format!("{nonce}.{signature}")
    }

    pub fn is_valid(&self, token: &str) -> bool {
        let Some((nonce, signature)) = token.split_once('.') else {
            return false;
        };
        match hex::decode(signature) {
            Ok(signature) => self.verify(nonce.as_bytes(), &signature),
            Err(_) => false,
        }
    }
}

/// The optional operator password in front of the dashboard.
#[derive(Debug)]
pub struct PasswordGate {
    keys: SessionKeys,
    password_digest: Option<Vec<u8>>,
}

impl PasswordGate {
    /// An empty password counts as no password.
    pub fn new(password: Option<&str>, keys: SessionKeys) -> Self {
        let password_digest = password
            .filter(|password| !password.is_empty())
            .map(|password| keys.sign(password.as_bytes()));
        Self {
            keys,
            password_digest,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.password_digest.is_some()
    }

    /// Constant-time comparison against the configured password.
    pub fn check_password(&self, candidate: &str) -> bool {
        match &self.password_digest {
            Some(digest) => self.keys.verify(candidate.as_bytes(), digest),
            None => true,
        }
    }

    pub fn context(&self, headers: &HeaderMap) -> SessionContext {
        if !self.is_enabled() {
            return SessionContext {
                authenticated: true,
            };
        }

        let authenticated = session_cookie(headers)
            .map(|token| self.keys.is_valid(token))
            .unwrap_or(false);
        SessionContext { authenticated }
    }

    /// `Set-Cookie` value for a newly authenticated session.
    pub fn login_cookie(&self) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Strict",
            self.keys.issue()
        )
    }

    pub fn logout_cookie() -> String {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
    }
}

/// False when the request carries an `Origin` that is not this server's `Host`.
///
/// Browsers send `Origin` on every cross-site form post; requests without one (curl,
/// health probes) pass.
pub fn is_same_origin(headers: &HeaderMap) -> bool {
    let Some(origin) = headers.get(header::ORIGIN) else {
        return true;
    };
    let host = headers.get(header::HOST).and_then(|host| host.to_str().ok());

    match (origin.to_str().ok(), host) {
        (Some(origin), Some(host)) => origin
            .split_once("://")
            .map(|(_, authority)| authority.trim_end_matches('/').eq_ignore_ascii_case(host))
            .unwrap_or(false),
        _ => false,
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

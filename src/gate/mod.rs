//! The request gate — per-request allow/deny decisions.
//!
//! The gate combines two independent predicates, each of which can be
//! switched off without touching the other:
//!
//! - **IP allowlist**: the client address must be loopback or appear in
//!   the configured list. Off unless an allowlist is installed.
//! - **Credential challenge**: HTTP Basic credentials must match the
//!   configured admin account. Always evaluated; with no account
//!   configured the predicate fails closed and denies everything.
//!
//! The gate is pure decision logic over a [`RequestContext`]; it knows
//! nothing about routing, and the store never consults it. A denial
//! short-circuits before any store interaction.

use std::net::IpAddr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::GateDenied;

/// Admin account the credential predicate checks against.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The account name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The account password.
    pub fn password(&self) -> &str {
        &self.password
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log the password.
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// What the gate sees of a request.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Address the connection came from.
    pub remote_ip: IpAddr,

    /// Raw `Authorization` header, if the request carried one.
    pub authorization: Option<String>,
}

impl RequestContext {
    /// Builds a context from the connection address and optional header.
    pub fn new(remote_ip: IpAddr, authorization: Option<String>) -> Self {
        Self {
            remote_ip,
            authorization,
        }
    }
}

/// The composed gate installed in front of mutating routes.
#[derive(Clone, Debug, Default)]
pub struct RequestGate {
    /// Admin account; `None` fails closed.
    credentials: Option<Credentials>,

    /// Allowlist predicate; `None` means the predicate is off.
    ip_allowlist: Option<Vec<IpAddr>>,
}

impl RequestGate {
    /// Creates a gate with only the credential predicate active.
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials,
            ip_allowlist: None,
        }
    }

    /// Enables the allowlist predicate with the given addresses.
    pub fn with_ip_allowlist(mut self, allowed: Vec<IpAddr>) -> Self {
        self.ip_allowlist = Some(allowed);
        self
    }

    /// Decides whether the request may proceed.
    ///
    /// Predicates run in order: origin first, credentials second, so a
    /// blocked address is refused without leaking whether its credentials
    /// were right.
    ///
    /// # Errors
    ///
    /// - [`GateDenied::IpBlocked`] when the allowlist predicate is on and
    ///   the address is neither loopback nor listed.
    /// - [`GateDenied::MissingCredentials`] when no `Authorization`
    ///   header was sent (callers answer with a Basic challenge).
    /// - [`GateDenied::InvalidCredentials`] when the header is malformed
    ///   or does not match the configured account.
    pub fn authorize(&self, ctx: &RequestContext) -> Result<(), GateDenied> {
        if let Some(allowed) = &self.ip_allowlist {
            if !ctx.remote_ip.is_loopback() && !allowed.contains(&ctx.remote_ip) {
                return Err(GateDenied::IpBlocked(ctx.remote_ip));
            }
        }

        let header = ctx
            .authorization
            .as_deref()
            .ok_or(GateDenied::MissingCredentials)?;
        let (username, password) =
            decode_basic(header).ok_or(GateDenied::InvalidCredentials)?;

        match &self.credentials {
            Some(admin) if admin.matches(&username, &password) => Ok(()),
            _ => Err(GateDenied::InvalidCredentials),
        }
    }
}

/// Decodes an HTTP Basic `Authorization` header into user and password.
///
/// Returns `None` for any shape other than `Basic base64(user:pass)`.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?.trim();
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_header(user: &str, pass: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{user}:{pass}")))
    }

    fn admin_gate() -> RequestGate {
        RequestGate::new(Some(Credentials::new("admin", "hunter2")))
    }

    fn ctx(ip: &str, authorization: Option<String>) -> RequestContext {
        RequestContext::new(ip.parse().unwrap(), authorization)
    }

    #[test]
    fn test_valid_credentials_pass() {
        let gate = admin_gate();
        let ctx = ctx("203.0.113.9", Some(basic_header("admin", "hunter2")));
        assert!(gate.authorize(&ctx).is_ok());
    }

    #[test]
    fn test_missing_header_wants_challenge() {
        let gate = admin_gate();
        let err = gate.authorize(&ctx("203.0.113.9", None)).unwrap_err();
        assert!(matches!(err, GateDenied::MissingCredentials));
        assert!(err.wants_challenge());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let gate = admin_gate();
        let ctx = ctx("203.0.113.9", Some(basic_header("admin", "wrong")));
        assert!(matches!(
            gate.authorize(&ctx).unwrap_err(),
            GateDenied::InvalidCredentials
        ));
    }

    #[test]
    fn test_malformed_header_rejected() {
        let gate = admin_gate();
        for header in ["Bearer abc", "Basic ???", "Basic "] {
            let ctx = ctx("203.0.113.9", Some(header.to_string()));
            assert!(matches!(
                gate.authorize(&ctx).unwrap_err(),
                GateDenied::InvalidCredentials
            ));
        }
    }

    #[test]
    fn test_no_admin_configured_fails_closed() {
        let gate = RequestGate::new(None);
        let ctx = ctx("127.0.0.1", Some(basic_header("admin", "hunter2")));
        assert!(gate.authorize(&ctx).is_err());
    }

    #[test]
    fn test_allowlist_blocks_unlisted_address() {
        let gate = admin_gate().with_ip_allowlist(vec!["203.0.113.7".parse().unwrap()]);
        let ctx = ctx("198.51.100.2", Some(basic_header("admin", "hunter2")));
        assert!(matches!(
            gate.authorize(&ctx).unwrap_err(),
            GateDenied::IpBlocked(_)
        ));
    }

    #[test]
    fn test_allowlist_admits_listed_address() {
        let gate = admin_gate().with_ip_allowlist(vec!["203.0.113.7".parse().unwrap()]);
        let ctx = ctx("203.0.113.7", Some(basic_header("admin", "hunter2")));
        assert!(gate.authorize(&ctx).is_ok());
    }

    #[test]
    fn test_loopback_always_passes_allowlist() {
        let gate = admin_gate().with_ip_allowlist(vec![]);
        for ip in ["127.0.0.1", "::1"] {
            let ctx = ctx(ip, Some(basic_header("admin", "hunter2")));
            assert!(gate.authorize(&ctx).is_ok(), "loopback {ip} must pass");
        }
    }

    #[test]
    fn test_allowlist_off_by_default() {
        let gate = admin_gate();
        let ctx = ctx("198.51.100.2", Some(basic_header("admin", "hunter2")));
        assert!(gate.authorize(&ctx).is_ok());
    }

    #[test]
    fn test_ip_checked_before_credentials() {
        let gate = admin_gate().with_ip_allowlist(vec![]);
        // Bad credentials AND bad address: the address decides.
        let ctx = ctx("198.51.100.2", Some(basic_header("admin", "wrong")));
        assert!(matches!(
            gate.authorize(&ctx).unwrap_err(),
            GateDenied::IpBlocked(_)
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}

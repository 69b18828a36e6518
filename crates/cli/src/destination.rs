//! Parsing for the sender's positional `[USER@]HOST:PATH` destination.

use xfer_core::error::XferError;

/// A parsed destination: an optional remote user, a host or address, and
/// the destination path on that host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// The `user@` component, if present. The protocol has no remote-shell
    /// transport, so this is accepted and surfaced for diagnostics but
    /// otherwise unused; its only requirement is that its presence not
    /// break parsing of the rest of the positional argument.
    pub user: Option<String>,
    /// The host or address component.
    pub host: String,
    /// The destination path on that host.
    pub path: String,
}

/// Parses the positional `[USER@]HOST:PATH` / `HOST:PATH` destination
/// argument.
///
/// Returns [`XferError::Destination`] if the argument has no `:` separator,
/// the host component is empty, or `PATH` ends in an unescaped `/` — a
/// trailing slash is treated as a bad destination rather than a generic
/// usage error, since it is specifically about the shape of the
/// destination rather than the command line as a whole.
pub fn parse_destination(arg: &str) -> Result<Destination, XferError> {
    let (host_part, path) = arg.split_once(':').ok_or_else(|| XferError::Destination {
        component: arg.to_string(),
        reason: "expected [USER@]HOST:PATH".to_string(),
    })?;

    if path.ends_with('/') && !path.ends_with("\\/") {
        return Err(XferError::Destination {
            component: path.to_string(),
            reason: "destination path must not end in a trailing slash".to_string(),
        });
    }

    let (user, host) = match host_part.split_once('@') {
        Some((user, host)) => (Some(user.to_string()), host.to_string()),
        None => (None, host_part.to_string()),
    };

    if host.is_empty() {
        return Err(XferError::Destination {
            component: arg.to_string(),
            reason: "host component must not be empty".to_string(),
        });
    }

    Ok(Destination {
        user,
        host,
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_host_and_path() {
        let dest = parse_destination("10.0.0.5:outbox/file.bin").unwrap();
        assert_eq!(dest.user, None);
        assert_eq!(dest.host, "10.0.0.5");
        assert_eq!(dest.path, "outbox/file.bin");
    }

    #[test]
    fn parses_user_at_host() {
        let dest = parse_destination("alice@10.0.0.5:file.bin").unwrap();
        assert_eq!(dest.user.as_deref(), Some("alice"));
        assert_eq!(dest.host, "10.0.0.5");
    }

    #[test]
    fn rejects_missing_separator() {
        let err = parse_destination("10.0.0.5").unwrap_err();
        assert!(matches!(err, XferError::Destination { .. }));
    }

    #[test]
    fn rejects_trailing_slash() {
        let err = parse_destination("10.0.0.5:outbox/").unwrap_err();
        assert!(matches!(err, XferError::Destination { .. }));
        assert_eq!(err.exit_code(), xfer_core::exit_code::ExitCode::Destination);
    }

    #[test]
    fn rejects_empty_host() {
        let err = parse_destination(":file.bin").unwrap_err();
        assert!(matches!(err, XferError::Destination { .. }));
    }

    #[test]
    fn allows_escaped_trailing_slash() {
        let dest = parse_destination(r"10.0.0.5:weird-name\/").unwrap();
        assert_eq!(dest.path, r"weird-name\/");
    }
}

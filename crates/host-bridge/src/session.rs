use serde::Serialize;

/// User the bootstrap signs in as when the session names nobody.
pub const GUEST_USER: &str = "Guest";

/// Credentials resolved from the host session. All fields absent means
/// anonymous; serialization keeps the fields as nulls because widget code
/// reads them unconditionally.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LogonUserInfo {
    pub user: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl LogonUserInfo {
    /// A record counts as present when it names a user or carries a token.
    pub fn is_present(&self) -> bool {
        fn set(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|v| !v.is_empty())
        }
        set(&self.user) || set(&self.token)
    }

    pub fn user_or_guest(&self) -> &str {
        match self.user.as_deref() {
            Some(user) if !user.is_empty() => user,
            _ => GUEST_USER,
        }
    }
}

/// First present record wins: explicit options, then the host session,
/// then a parent bridge in the container window.
pub fn resolve_logon(
    from_options: LogonUserInfo,
    from_host: Option<LogonUserInfo>,
    from_parent: Option<LogonUserInfo>,
) -> LogonUserInfo {
    [Some(from_options), from_host, from_parent]
        .into_iter()
        .flatten()
        .find(LogonUserInfo::is_present)
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    fn named(user: &str) -> LogonUserInfo {
        LogonUserInfo { user: Some(user.to_string()), ..Default::default() }
    }

    #[test]
    fn test_options_win_over_host_session() {
        let resolved = resolve_logon(named("operator"), Some(named("host")), None);
        assert_eq!(resolved, named("operator"));
    }

    #[test]
    fn test_empty_records_fall_through() {
        let resolved = resolve_logon(LogonUserInfo::default(), Some(named("host")), None);
        assert_eq!(resolved, named("host"));

        let resolved = resolve_logon(LogonUserInfo::default(), None, Some(named("parent")));
        assert_eq!(resolved, named("parent"));
    }

    #[test]
    fn test_a_token_alone_counts_as_present() {
        let tokened = LogonUserInfo { token: Some("abc".to_string()), ..Default::default() };
        let resolved = resolve_logon(LogonUserInfo::default(), Some(tokened.clone()), None);
        assert_eq!(resolved, tokened);
        // But the user still renders as Guest
        assert_eq!(resolved.user_or_guest(), GUEST_USER);
    }

    #[test]
    fn test_anonymous_when_nothing_is_present() {
        let resolved = resolve_logon(LogonUserInfo::default(), None, None);
        assert_eq!(resolved, LogonUserInfo::default());
        assert_eq!(resolved.user_or_guest(), GUEST_USER);
    }
}

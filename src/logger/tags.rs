/// Log tags identifying the platform module a message originates from
///
/// Each tag maps to a `--debug-<module>` command-line flag so diagnostics can
/// be enabled per module.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    Auth,
    Database,
    Market,
    Scanner,
    Billing,
    Webserver,
    Setup,
    System,
    Other(String),
}

impl LogTag {
    /// The key used in --debug-<key> flags and config tag sets
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::Auth => "auth".to_string(),
            LogTag::Database => "database".to_string(),
            LogTag::Market => "market".to_string(),
            LogTag::Scanner => "scanner".to_string(),
            LogTag::Billing => "billing".to_string(),
            LogTag::Webserver => "webserver".to_string(),
            LogTag::Setup => "setup".to_string(),
            LogTag::System => "system".to_string(),
            LogTag::Other(s) => s.to_lowercase(),
        }
    }

    /// Plain uppercase label for file output (no colors)
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Auth => "AUTH".to_string(),
            LogTag::Database => "DATABASE".to_string(),
            LogTag::Market => "MARKET".to_string(),
            LogTag::Scanner => "SCANNER".to_string(),
            LogTag::Billing => "BILLING".to_string(),
            LogTag::Webserver => "WEBSERVER".to_string(),
            LogTag::Setup => "SETUP".to_string(),
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Other(s) => s.to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_keys_are_lowercase() {
        assert_eq!(LogTag::Market.to_debug_key(), "market");
        assert_eq!(LogTag::Other("Custom".to_string()).to_debug_key(), "custom");
    }

    #[test]
    fn test_plain_labels_are_uppercase() {
        assert_eq!(LogTag::Webserver.to_plain_string(), "WEBSERVER");
        assert_eq!(LogTag::Other("ops".to_string()).to_plain_string(), "OPS");
    }
}

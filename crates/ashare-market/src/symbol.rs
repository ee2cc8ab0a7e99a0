//! Symbol normalization for A-share exchange codes
//!
//! A-share codes are bare 6-digit strings; each provider wants its own
//! ticker syntax. Codes starting with `6` trade on Shanghai, codes starting
//! with `0` or `3` on Shenzhen. Any other leading digit is passed through
//! unchanged; that is a degenerate no-op, not an error.

/// Exchange derived from the leading digit of a 6-digit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Shanghai,
    Shenzhen,
    /// Leading digit outside the known ranges; no normalization applies
    Unknown,
}

/// Classify a code by its leading digit
pub fn exchange(code: &str) -> Exchange {
    match code.chars().next() {
        Some('6') => Exchange::Shanghai,
        Some('0' | '3') => Exchange::Shenzhen,
        _ => Exchange::Unknown,
    }
}

/// Yahoo Finance ticker: exchange suffix (`600519` -> `600519.SS`)
pub fn to_yahoo(code: &str) -> String {
    match exchange(code) {
        Exchange::Shanghai => format!("{code}.SS"),
        Exchange::Shenzhen => format!("{code}.SZ"),
        Exchange::Unknown => code.to_string(),
    }
}

/// Prefixed form used by East Money comparison endpoints
/// (`600519` -> `SH600519`)
pub fn to_prefixed(code: &str) -> String {
    match exchange(code) {
        Exchange::Shanghai => format!("SH{code}"),
        Exchange::Shenzhen => format!("SZ{code}"),
        Exchange::Unknown => code.to_string(),
    }
}

/// East Money security id: numeric market prefix
/// (`600519` -> `1.600519`, `000001` -> `0.000001`)
pub fn to_secid(code: &str) -> String {
    match exchange(code) {
        Exchange::Shanghai => format!("1.{code}"),
        Exchange::Shenzhen => format!("0.{code}"),
        Exchange::Unknown => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shanghai_codes() {
        assert_eq!(exchange("600519"), Exchange::Shanghai);
        assert_eq!(to_yahoo("600519"), "600519.SS");
        assert_eq!(to_prefixed("600519"), "SH600519");
        assert_eq!(to_secid("600519"), "1.600519");
    }

    #[test]
    fn test_shenzhen_codes() {
        assert_eq!(exchange("000001"), Exchange::Shenzhen);
        assert_eq!(to_yahoo("000001"), "000001.SZ");
        assert_eq!(to_prefixed("000001"), "SZ000001");
        assert_eq!(to_secid("000001"), "0.000001");

        assert_eq!(exchange("300750"), Exchange::Shenzhen);
        assert_eq!(to_yahoo("300750"), "300750.SZ");
    }

    #[test]
    fn test_unknown_leading_digit_is_identity() {
        assert_eq!(exchange("830799"), Exchange::Unknown);
        assert_eq!(to_yahoo("830799"), "830799");
        assert_eq!(to_prefixed("830799"), "830799");
        assert_eq!(to_secid("830799"), "830799");
    }

    #[test]
    fn test_empty_code_is_identity() {
        assert_eq!(exchange(""), Exchange::Unknown);
        assert_eq!(to_yahoo(""), "");
    }
}

//! Formatting utilities used for CLI outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Seconds as `MM:SS`.
pub fn secs2clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Signed token delta, e.g. `+12` or `-5`.
pub fn signed(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

/// Shorten a wallet address to `0x1234…abcd`.
pub fn short_address(addr: &str) -> String {
    if addr.len() <= 12 {
        return addr.to_string();
    }
    format!("{}…{}", &addr[..6], &addr[addr.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(secs2clock(600), "10:00");
        assert_eq!(secs2clock(69), "01:09");
        assert_eq!(secs2clock(0), "00:00");
    }

    #[test]
    fn signed_deltas() {
        assert_eq!(signed(12), "+12");
        assert_eq!(signed(-5), "-5");
        assert_eq!(signed(0), "0");
    }

    #[test]
    fn address_shortening() {
        assert_eq!(
            short_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234…5678"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}

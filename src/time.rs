const SEPARATOR: char = '/';

/// Elapsed and total playback time as displayed by the page, e.g. `1:23 / 4:56`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeInfo {
    pub position: String,
    pub total: String,
}

impl TimeInfo {
    pub fn parse(text: &str) -> Option<Self> {
        let (position, total) = text.split_once(SEPARATOR)?;
        let position = position.trim();
        let total = total.trim();
        if position.is_empty() || total.is_empty() {
            return None;
        }
        Some(Self {
            position: position.to_string(),
            total: total.to_string(),
        })
    }
}

/// Converts `SS`, `MM:SS` or `HH:MM:SS` into microseconds.
pub fn parse_time_usec(text: &str) -> Option<u64> {
    let mut seconds: u64 = 0;
    let mut parts = 0;
    for part in text.trim().split(':') {
        let part = part.trim();
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        seconds = seconds.checked_mul(60)?.checked_add(part.parse().ok()?)?;
        parts += 1;
    }
    if parts > 3 {
        return None;
    }
    seconds.checked_mul(1_000_000)
}

/// Parses the ISO 8601 durations YouTube reports in `contentDetails.duration`
/// (`PT4M13S`, `PT1H2M`, `P1DT3H`, `P2W`, `P0D`) into whole seconds.
///
/// Fractional seconds are truncated; a fraction on any other unit is rejected,
/// as are repeated or out-of-order designators. Year and month designators are
/// rejected since their length in seconds is ambiguous.
pub fn parse_iso8601_duration(s: &str) -> Option<u64> {
    let rest = s.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut total = 0u64;
    for (value, unit) in components(date_part, &['W', 'D'])? {
        let secs = match unit {
            'W' => 7 * 86_400,
            'D' => 86_400,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(secs)?)?;
    }
    if let Some(time_part) = time_part {
        for (value, unit) in components(time_part, &['H', 'M', 'S'])? {
            let secs = match unit {
                'H' => 3_600,
                'M' => 60,
                'S' => 1,
                _ => return None,
            };
            total = total.checked_add(value.checked_mul(secs)?)?;
        }
    }
    Some(total)
}

/// Splits `1H2M3S` into `(value, unit)` pairs. Units must appear at most once
/// and in the order given by `units`; only seconds may carry a fraction, which
/// is dropped.
fn components(s: &str, units: &[char]) -> Option<Vec<(u64, char)>> {
    let mut out = Vec::new();
    let mut num = String::new();
    let mut fraction = false;
    let mut next_unit = 0;
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            if !fraction {
                num.push(ch);
            }
            continue;
        }
        if ch == '.' || ch == ',' {
            if num.is_empty() || fraction {
                return None;
            }
            fraction = true;
            continue;
        }
        if num.is_empty() || (fraction && ch != 'S') {
            return None;
        }
        let pos = units[next_unit..].iter().position(|u| *u == ch)?;
        next_unit += pos + 1;
        let val: u64 = num.parse().ok()?;
        num.clear();
        fraction = false;
        out.push((val, ch));
    }
    if !num.is_empty() {
        return None;
    }
    Some(out)
}

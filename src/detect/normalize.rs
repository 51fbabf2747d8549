// =============================================================================
// normalize.rs — THE IDENTIFIER LAUNDROMAT
// =============================================================================
//
// Chameleon carriers rarely bother to disguise their identifiers; the
// census does it for them. "555-100-0001" and "(555) 100 0001" are the
// same dispatch line. "10 First Street" and "10 FIRST ST." are the same
// parking lot. These functions boil every identifier down to its canonical
// form so the inverted index can do exact matching instead of fuzzy
// guesswork.
//
// Every function here is total, deterministic, and stateless. No regex
// engine, no allocator drama, no failure modes. An empty result means
// "this identifier does not participate in linking" — never an error.
// =============================================================================

/// Canonical phone/fax/cell form: digits only, last 10 of them.
///
/// Fewer than 7 digits is not a phone number, it's a typo, and typos don't
/// link carriers. 7 to 10 digits are kept whole. More than 10 digits means
/// a country code snuck in; the last 10 are the number that matters.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 7 {
        return String::new();
    }
    let start = digits.len().saturating_sub(10);
    digits[start..].to_string()
}

/// The street-suffix rewrites. "Street", "St.", and "st" are one token.
/// The dotted spellings are listed for completeness even though
/// punctuation stripping removes the dots before we ever see them.
fn rewrite_suffix(token: &str) -> &str {
    match token {
        "street" | "st." => "st",
        "avenue" | "ave." => "ave",
        "road" | "rd." => "rd",
        "drive" | "dr." => "dr",
        "lane" | "ln." => "ln",
        "boulevard" | "blvd." => "blvd",
        "court" | "ct." => "ct",
        "circle" | "cir." => "cir",
        "highway" | "hwy." => "hwy",
        other => other,
    }
}

/// One address component: lowercased, ASCII punctuation swapped for
/// spaces, whitespace collapsed, suffixes rewritten.
fn canonical_component(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let depunctuated: String = lowered
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();
    depunctuated
        .split_whitespace()
        .map(rewrite_suffix)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical address form: the street/city/state triple, each component
/// canonicalized, joined with " | ". Empty components are dropped from
/// the join rather than leaving dangling separators.
///
/// A result of 5 characters or fewer carries too little entropy to link
/// anyone ("tx" matches half of Texas) and is discarded.
pub fn normalize_address(street: &str, city: &str, state: &str) -> String {
    let parts: Vec<String> = [street, city, state]
        .into_iter()
        .map(canonical_component)
        .filter(|c| !c.is_empty())
        .collect();
    let joined = parts.join(" | ");
    if joined.len() > 5 {
        joined
    } else {
        String::new()
    }
}

/// Canonical officer form: uppercase letters and spaces only, collapsed.
/// "Mr. J. Smith, Jr." becomes "MR J SMITH JR". Three characters or fewer
/// is initials, not an identity, and is discarded.
pub fn normalize_officer(raw: &str) -> String {
    let kept: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() > 3 {
        collapsed
    } else {
        String::new()
    }
}

/// Canonical VIN form: trimmed and uppercased. Length policing (>= 5 to
/// participate in linking) happens at extraction, not here — the store
/// keeps short VINs for the inspection record even though the linker
/// ignores them.
pub fn normalize_vin(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_strips_formatting() {
        assert_eq!(normalize_phone("555-100-0001"), "5551000001");
        assert_eq!(normalize_phone("(555) 100 0001"), "5551000001");
        assert_eq!(normalize_phone("+1 (212) 555-0099"), "2125550099");
    }

    #[test]
    fn phone_under_seven_digits_is_noise() {
        assert_eq!(normalize_phone("555-100"), "");
        assert_eq!(normalize_phone("123456"), "");
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("ext. only"), "");
    }

    #[test]
    fn phone_seven_to_ten_digits_kept_whole() {
        assert_eq!(normalize_phone("5551000"), "5551000");
        assert_eq!(normalize_phone("55510001"), "55510001");
        assert_eq!(normalize_phone("5551000001"), "5551000001");
    }

    #[test]
    fn phone_over_ten_keeps_last_ten() {
        assert_eq!(normalize_phone("15551000001"), "5551000001");
        assert_eq!(normalize_phone("0015551000001"), "5551000001");
    }

    #[test]
    fn phone_output_is_empty_or_at_most_ten_digits() {
        for raw in ["", "1", "555-1000", "+1 800 555 0100 ext 99"] {
            let out = normalize_phone(raw);
            assert!(out.is_empty() || (7..=10).contains(&out.len()));
            assert!(out.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn address_rewrites_suffixes_and_joins() {
        assert_eq!(
            normalize_address("10 First Street", "Austin", "TX"),
            "10 first st | austin | tx"
        );
        assert_eq!(
            normalize_address("10 First St.", "Austin", "TX"),
            "10 first st | austin | tx"
        );
        assert_eq!(
            normalize_address("99 Oak Boulevard", "Reno", "NV"),
            "99 oak blvd | reno | nv"
        );
    }

    #[test]
    fn address_has_no_punctuation_or_double_spaces() {
        let out = normalize_address("1/2  N. Main   Hwy.,  Apt #4", "Ft. Worth", "TX");
        assert!(!out.contains("  "));
        assert!(out.chars().all(|c| !c.is_ascii_punctuation() || c == '|'));
    }

    #[test]
    fn address_too_short_is_discarded() {
        // "a | b" is exactly 5 chars: discarded. "ab | b" is 6: retained.
        assert_eq!(normalize_address("", "a", "b"), "");
        assert_eq!(normalize_address("", "ab", "b"), "ab | b");
        assert_eq!(normalize_address("", "", ""), "");
    }

    #[test]
    fn officer_uppercases_and_strips() {
        assert_eq!(normalize_officer("Acme Holdings"), "ACME HOLDINGS");
        assert_eq!(normalize_officer("Mr. J.  Smith, Jr."), "MR J SMITH JR");
        assert_eq!(normalize_officer("  jane   doe  "), "JANE DOE");
    }

    #[test]
    fn officer_too_short_is_discarded() {
        assert_eq!(normalize_officer("J S"), "");
        assert_eq!(normalize_officer("AB"), "");
        assert_eq!(normalize_officer(""), "");
        assert_eq!(normalize_officer("1234"), "");
    }

    #[test]
    fn vin_trims_and_uppercases() {
        assert_eq!(normalize_vin(" 1hgbh41jxmn109186 "), "1HGBH41JXMN109186");
        assert_eq!(normalize_vin("abc"), "ABC");
    }
}

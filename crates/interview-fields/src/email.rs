use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern must compile")
});

const MAX_LOCAL_PART: usize = 64;
const MAX_ADDRESS: usize = 254;

/// Syntactic address check.
pub fn is_valid_syntax(address: &str) -> bool {
    if address.len() > MAX_ADDRESS {
        return false;
    }
    let Some((local, _)) = address.rsplit_once('@') else {
        return false;
    };
    local.len() <= MAX_LOCAL_PART
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && EMAIL_RE.is_match(address)
}

/// Whether the domain has a registrable name under a known public suffix.
///
/// Rejects bare suffixes (`co.uk`) and unknown suffixes (`example.con`).
pub fn has_registrable_domain(address: &str) -> bool {
    let domain = address.rsplit('@').next().unwrap_or_default().to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    psl::domain(domain.as_bytes()).is_some_and(|registrable| registrable.suffix().is_known())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_check() {
        assert!(is_valid_syntax("test@example.com"));
        assert!(is_valid_syntax("first.last+tag@sub.example.co.uk"));
        assert!(!is_valid_syntax("test"));
        assert!(!is_valid_syntax("test@"));
        assert!(!is_valid_syntax("@example.com"));
        assert!(!is_valid_syntax("a..b@example.com"));
        assert!(!is_valid_syntax("test@localhost"));
    }

    #[test]
    fn domain_check() {
        assert!(has_registrable_domain("test@example.com"));
        assert!(has_registrable_domain("test@example.co.uk"));
        assert!(has_registrable_domain("test@Example.COM"));
        assert!(!has_registrable_domain("test@co.uk"));
        assert!(!has_registrable_domain("invalid@example.con"));
        assert!(!has_registrable_domain(""));
    }
}

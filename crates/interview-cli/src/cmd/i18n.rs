use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::sync::OnceLock;

use unic_langid::LanguageIdentifier;

const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../i18n/en.json")),
    ("nl", include_str!("../../i18n/nl.json")),
];

static EN_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();
static SELECTED_LOCALE: OnceLock<String> = OnceLock::new();
static LOCALE_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();
static EN_VALUE_TO_KEY: OnceLock<BTreeMap<String, String>> = OnceLock::new();

fn parse_catalog(locale: &str) -> Option<BTreeMap<String, String>> {
    let (_, raw) = CATALOGS.iter().find(|(name, _)| *name == locale)?;
    serde_json::from_str(raw).ok()
}

fn en_messages() -> &'static BTreeMap<String, String> {
    EN_MESSAGES.get_or_init(|| parse_catalog("en").unwrap_or_default())
}

fn en_value_to_key() -> &'static BTreeMap<String, String> {
    EN_VALUE_TO_KEY.get_or_init(|| {
        en_messages()
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect()
    })
}

fn detect_env_locale() -> Option<String> {
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(val) = env::var(key) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn normalize_locale(raw: &str) -> Option<String> {
    let mut cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Some((head, _)) = cleaned.split_once('.') {
        cleaned = head;
    }
    if let Some((head, _)) = cleaned.split_once('@') {
        cleaned = head;
    }
    let cleaned = cleaned.replace('_', "-");
    cleaned
        .parse::<LanguageIdentifier>()
        .ok()
        .map(|lid| lid.to_string())
}

/// Maps a locale tag to a shipped catalog, falling back to its base language.
pub fn resolve_supported_locale(candidate: &str) -> Option<String> {
    let norm = normalize_locale(candidate)?;
    let supported = |tag: &str| CATALOGS.iter().any(|(name, _)| *name == tag);
    if supported(&norm) {
        return Some(norm);
    }
    let base = norm.split('-').next()?.to_ascii_lowercase();
    supported(&base).then_some(base)
}

fn select_locale(cli_locale: Option<String>) -> String {
    if let Some(cli) = cli_locale.as_deref()
        && let Some(found) = resolve_supported_locale(cli)
    {
        return found;
    }
    if let Some(env_loc) = detect_env_locale()
        && let Some(found) = resolve_supported_locale(&env_loc)
    {
        return found;
    }
    if let Some(sys_loc) = sys_locale::get_locale()
        && let Some(found) = resolve_supported_locale(&sys_loc)
    {
        return found;
    }
    "en".to_string()
}

/// English messages overlaid with the locale's own.
pub fn resolved_catalog(locale: &str) -> BTreeMap<String, String> {
    let mut merged = en_messages().clone();
    if locale != "en"
        && let Some(overlay) = parse_catalog(locale)
    {
        merged.extend(overlay);
    }
    merged
}

pub fn init(cli_locale: Option<String>) {
    let locale = select_locale(cli_locale);
    let _ = LOCALE_MESSAGES.set(resolved_catalog(&locale));
    let _ = SELECTED_LOCALE.set(locale);
}

pub fn cli_locale_from_argv(args: &[OsString]) -> Option<String> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let raw = arg.to_string_lossy();
        if raw == "--locale" {
            return iter.next().map(|value| value.to_string_lossy().to_string());
        }
        if let Some(rest) = raw.strip_prefix("--locale=") {
            return Some(rest.to_string());
        }
    }
    None
}

pub fn selected_locale() -> &'static str {
    SELECTED_LOCALE.get().map(String::as_str).unwrap_or("en")
}

pub fn tr_key(key: &str) -> String {
    LOCALE_MESSAGES
        .get()
        .and_then(|m| m.get(key))
        .cloned()
        .or_else(|| en_messages().get(key).cloned())
        .unwrap_or_else(|| key.to_string())
}

pub fn tr_lit(english_literal: &str) -> String {
    let Some(key) = en_value_to_key().get(english_literal) else {
        return english_literal.to_string();
    };
    tr_key(key)
}

/// Looks up `key` and fills its `{}` placeholders in order.
pub fn trf(key: &str, args: &[&str]) -> String {
    let mut msg = tr_key(key);
    for arg in args {
        msg = msg.replacen("{}", arg, 1);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_region_to_base_language() {
        assert_eq!(resolve_supported_locale("nl_BE.UTF-8").as_deref(), Some("nl"));
        assert_eq!(resolve_supported_locale("en-US").as_deref(), Some("en"));
        assert_eq!(resolve_supported_locale("xx"), None);
    }

    #[test]
    fn overlay_falls_back_to_english() {
        let en = resolved_catalog("en");
        let nl = resolved_catalog("nl");
        assert_eq!(en.len(), nl.len());
        assert_ne!(en.get("cli.run.rejected"), nl.get("cli.run.rejected"));
    }

    #[test]
    fn reads_locale_flag_forms() {
        let argv = |args: &[&str]| args.iter().map(OsString::from).collect::<Vec<_>>();
        assert_eq!(
            cli_locale_from_argv(&argv(&["interview", "--locale", "nl", "records"])).as_deref(),
            Some("nl")
        );
        assert_eq!(
            cli_locale_from_argv(&argv(&["interview", "--locale=en"])).as_deref(),
            Some("en")
        );
        assert_eq!(cli_locale_from_argv(&argv(&["interview", "records"])), None);
    }
}

//! Currency code selection for cost summaries.

pub const FALLBACK_CURRENCY: &str = "SEK";

const LOCALE_ENV_VARS: [&str; 3] = ["LC_MONETARY", "LC_ALL", "LANG"];

const COUNTRY_CURRENCIES: [(&str, &str); 16] = [
    ("SE", "SEK"),
    ("US", "USD"),
    ("DE", "EUR"),
    ("FR", "EUR"),
    ("IT", "EUR"),
    ("ES", "EUR"),
    ("NL", "EUR"),
    ("AT", "EUR"),
    ("FI", "EUR"),
    ("GB", "GBP"),
    ("NO", "NOK"),
    ("DK", "DKK"),
    ("CH", "CHF"),
    ("JP", "JPY"),
    ("CA", "CAD"),
    ("AU", "AUD"),
];

/// Explicit code, else the locale's currency, else [`FALLBACK_CURRENCY`].
pub fn resolve_currency(explicit: Option<&str>) -> String {
    resolve_currency_with(explicit, |name| std::env::var(name).ok())
}

pub(crate) fn resolve_currency_with<F>(explicit: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(code) = explicit.map(str::trim).filter(|code| !code.is_empty()) {
        return code.to_ascii_uppercase();
    }
    detect_locale_currency(lookup).unwrap_or_else(|| FALLBACK_CURRENCY.to_string())
}

fn detect_locale_currency<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    for name in LOCALE_ENV_VARS {
        let Some(locale) = lookup(name) else {
            continue;
        };
        if locale.is_empty() || locale == "C" || locale == "POSIX" {
            continue;
        }
        let Some(country) = country_from_locale(&locale) else {
            continue;
        };
        if let Some((_, currency)) = COUNTRY_CURRENCIES
            .iter()
            .find(|(candidate, _)| *candidate == country)
        {
            return Some((*currency).to_string());
        }
    }
    None
}

/// `sv_SE.UTF-8` -> `SE`, `de_DE@euro` -> `DE`.
fn country_from_locale(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next().unwrap_or_default();
    let (_, country) = base.split_once('_')?;
    if country.len() < 2 || !country.is_char_boundary(2) {
        return None;
    }
    Some(country[..2].to_ascii_uppercase())
}

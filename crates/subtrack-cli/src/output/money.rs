#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Prefix(&'static str),
    Suffix(&'static str),
}

fn placement_for(currency: &str) -> Placement {
    match currency {
        "SEK" | "NOK" | "DKK" => Placement::Suffix("kr"),
        "USD" | "CAD" | "AUD" => Placement::Prefix("$"),
        "GBP" => Placement::Prefix("£"),
        "JPY" => Placement::Prefix("¥"),
        "EUR" => Placement::Suffix("€"),
        _ => Placement::Suffix(""),
    }
}

fn grouped(amount: f64, separator: char) -> String {
    let rounded = amount.abs().round() as u64;
    let digits = rounded.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    if amount < 0.0 && rounded > 0 {
        out.insert(0, '-');
    }
    out
}

fn decorate(number: String, currency: &str) -> String {
    match placement_for(currency) {
        Placement::Prefix(symbol) => format!("{symbol}{number}"),
        Placement::Suffix("") => format!("{number} {currency}"),
        Placement::Suffix(symbol) => format!("{number} {symbol}"),
    }
}

fn separator_for(currency: &str) -> char {
    match currency {
        "SEK" | "NOK" | "DKK" | "CAD" => ' ',
        "EUR" | "CHF" => '.',
        _ => ',',
    }
}

/// Whole units with thousands grouping, e.g. `1 299 kr` or `$1,299`.
pub fn format_money(amount: f64, currency: &str) -> String {
    decorate(grouped(amount, separator_for(currency)), currency)
}

/// A single amount when both ends round to the same value, else `low-high`.
pub fn format_range(min: f64, max: f64, currency: &str) -> String {
    let separator = separator_for(currency);
    let low = grouped(min, separator);
    let high = grouped(max, separator);
    if low == high {
        return decorate(low, currency);
    }
    decorate(format!("{low}-{high}"), currency)
}

use crate::config::Currency;
use rust_decimal::{Decimal, RoundingStrategy};

/// Static multiplicative conversion from the primary to the secondary currency.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    rate: Decimal,
}

impl Converter {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    pub fn convert(&self, amount: Decimal) -> Decimal {
        round_cents(amount * self.rate)
    }
}

pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `₹1,234.50` style: symbol, thousands separators, two decimals.
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    format!("{symbol}{}", group_thousands(&format!("{:.2}", round_cents(amount))))
}

/// Whole units only, used for chart bar labels.
pub fn format_whole(amount: Decimal, symbol: &str) -> String {
    let whole = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{symbol}{}", group_thousands(&format!("{whole:.0}")))
}

pub fn format_for(amount: Decimal, currency: &Currency) -> String {
    format_money(amount, &currency.symbol)
}

pub fn format_ascii(amount: Decimal, currency: &Currency) -> String {
    format_money(amount, &currency.ascii_symbol)
}

fn group_thousands(raw: &str) -> String {
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

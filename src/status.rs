use rust_decimal::{prelude::FromPrimitive, Decimal, RoundingStrategy};

use crate::datasources::{PoolStats, TokenTicker};

/// Twitter's limit on a single post.
pub const MAX_MESSAGE_CHARS: usize = 280;

const MAGNITUDE_SUFFIXES: [&str; 6] = ["", "K", "M", "G", "T", "P"];

fn round2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

/// Renders `value` with two decimals and a K/M/G/T/P magnitude suffix.
pub fn human_format(value: f64) -> String {
    let mut value = value;
    let mut magnitude = 0;
    while value.abs() >= 1000. && magnitude < MAGNITUDE_SUFFIXES.len() - 1 {
        magnitude += 1;
        value = round2(value / 1000.);
    }
    format!("{:.2} {}", value, MAGNITUDE_SUFFIXES[magnitude])
}

/// Share of the network hashrate held by the pool, in percent. `None` when the
/// network hashrate is zero.
pub fn pool_share_percent(pool_hashrate: f64, global_hashrate: f64) -> Option<f64> {
    if global_hashrate == 0. {
        None
    } else {
        Some(round2(pool_hashrate * 100. / global_hashrate))
    }
}

/// Value of `amount` coins at `price`, rounded to cents.
pub fn fiat_value(amount: f64, price: Decimal) -> Decimal {
    Decimal::from_f64(amount)
        .and_then(|amount| amount.checked_mul(price))
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

fn fiat_currency(currency_pair: &str) -> &str {
    currency_pair.strip_prefix("ALPH_").unwrap_or(currency_pair)
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_owned(),
        None => text.to_owned(),
    }
}

pub fn build_message(stats: &PoolStats, ticker: &TokenTicker) -> String {
    let share = pool_share_percent(stats.pool_hashrate, stats.global_hashrate)
        .map(|share| share.to_string())
        .unwrap_or_else(|| "undefined".to_owned());
    let currency = fiat_currency(&ticker.currency_pair);

    let mut message =
        String::from("The best Alephium Community pool\nhttps://www.metapool.tech\n");
    message += &format!(
        "\nNetwork Hashrate : {}H/s",
        human_format(stats.global_hashrate)
    );
    message += &format!(
        "\nPool Hashrate : {}H/s ({} % of total)",
        human_format(stats.pool_hashrate),
        share
    );
    if stats.num_workers > 0 {
        message += &format!("\nCurrent Miners : {}", stats.num_workers);
    }
    message += &format!(
        "\nPending Rewards : {} \u{2135} ({:.2} {})",
        round2(stats.total_pending_payout),
        fiat_value(stats.total_pending_payout, ticker.last),
        currency
    );
    message += &format!(
        "\nTotal Rewards paid : {} \u{2135} ({:.2} {})",
        round2(stats.total_payout_amount),
        fiat_value(stats.total_payout_amount, ticker.last),
        currency
    );
    message += "\n\n#blockchain #alephium #metapool";

    truncate(&message, MAX_MESSAGE_CHARS)
}

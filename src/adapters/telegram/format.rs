//! Alert message formatting for Telegram (legacy `Markdown` parse mode)

use crate::core::spread::{
    estimated_net_return, historical_context, liquidity_tier, signal_strength,
    suggested_leverage, suggested_position_size, suggested_stop_loss,
};
use crate::core::types::{ArbitrageSignal, MessageLink, RenderedMessage, SignalDirection};

const UTM: &str = "utm_source=arbitrage_bot";

/// Alert body and link rows for one signal
pub fn render_message(signal: &ArbitrageSignal, risk_multiplier: f64) -> RenderedMessage {
    RenderedMessage {
        text: render_signal(signal, risk_multiplier),
        links: signal_links(signal),
    }
}

/// Render the alert body for one signal
pub fn render_signal(signal: &ArbitrageSignal, risk_multiplier: f64) -> String {
    let spread = signal.spread_percent;
    let direction = match signal.direction {
        SignalDirection::DerivativeHigher => "🔼 Futures above spot",
        SignalDirection::SpotHigher => "🔽 Futures below spot",
    };

    format!(
        "✨ *ARBITRAGE SIGNAL* ✨\n\
        \n\
        📌 *{spot} / {derivative}*\n\
        {direction} by *{spread:.4}%* {emoji}\n\
        ├───────────────────────────────┤\n\
        │ 💪 *Strength:* {strength}\n\
        │ 🕰 *Context:* {context}\n\
        │ 💧 *Liquidity:* {liquidity}\n\
        │ 💵 *Spot:* `{spot_price}`\n\
        │ 📈 *Futures:* `{derivative_price}`\n\
        │ 💰 *Volume (24h):* `{volume}`\n\
        │ ⏱ *Time:* `{time} UTC`\n\
        ├───────────────────────────────┤\n\
        │ ⚖️ *Strategy:* {strategy}\n\
        │ ⚠️ *Risk management:*\n\
        {risk}\n\
        └───────────────────────────────┘\n\
        \n\
        _Estimated return after fees: ~{net:.2}%_",
        spot = escape_markdown(&signal.spot_symbol),
        derivative = escape_markdown(&signal.derivative_symbol),
        emoji = spread_emoji(spread),
        strength = signal_strength(spread),
        context = historical_context(spread),
        liquidity = liquidity_tier(signal.volume),
        spot_price = trim_price(signal.spot_price),
        derivative_price = trim_price(signal.derivative_price),
        volume = format_usd(signal.volume),
        time = signal.observed_at.format("%Y-%m-%d %H:%M:%S"),
        strategy = signal.direction.strategy(),
        risk = render_risk(spread, signal.volume, risk_multiplier),
        net = estimated_net_return(spread),
    )
}

fn render_risk(spread: f64, volume: f64, risk_multiplier: f64) -> String {
    format!(
        "• Leverage: {}x\n\
        • Position size: {}\n\
        • Stop-loss: {:.2}% from entry",
        suggested_leverage(spread, risk_multiplier),
        format_usd(suggested_position_size(volume)),
        suggested_stop_loss(spread),
    )
}

/// One flame per whole percent (max 5), plus a diamond above 5%
pub fn spread_emoji(spread_percent: f64) -> String {
    let flames = (spread_percent.max(0.0).floor() as usize).min(5);
    let mut out = "🔥".repeat(flames);
    if spread_percent > 5.0 {
        out.push('💎');
    }
    out
}

// =============================================================================
// Links
// =============================================================================

pub fn spot_url(symbol: &str) -> String {
    format!("https://www.mexc.com/exchange/{}?{}", symbol, UTM)
}

pub fn futures_url(symbol: &str) -> String {
    format!("https://www.mexc.com/futures/{}?{}", symbol, UTM)
}

pub fn tradingview_url(spot_symbol: &str) -> String {
    format!("https://www.tradingview.com/chart/?symbol=MEXC:{}", spot_symbol)
}

/// Link rows: exchange pages first, chart below
pub fn signal_links(signal: &ArbitrageSignal) -> Vec<Vec<MessageLink>> {
    vec![
        vec![
            MessageLink::new("📊 Spot", spot_url(&signal.spot_symbol)),
            MessageLink::new("📈 Futures", futures_url(&signal.derivative_symbol)),
        ],
        vec![MessageLink::new("📉 TradingView", tradingview_url(&signal.spot_symbol))],
    ]
}

// =============================================================================
// Number & Text Helpers
// =============================================================================

/// Eight decimals with trailing zeros removed
pub fn trim_price(price: f64) -> String {
    let s = format!("{:.8}", price);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `$1,234,567.89`
pub fn format_usd(amount: f64) -> String {
    let s = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Escape the characters legacy Telegram `Markdown` treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

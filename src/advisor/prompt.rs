use crate::indicators::AdvisoryContext;

/// Render the one-shot advisory prompt for `context`.
///
/// Prices are shown with two decimals; an undefined RSI is written as `n/a`
/// so the model is not handed a made-up reading.
pub fn build_prompt(context: &AdvisoryContext, language: &str) -> String {
    let rsi = context
        .rsi
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "Analyze stock {ticker}: price {price:.2} ({change:+.2}, {pct:+.2}%), \
         open {open:.2}, high {high:.2}, low {low:.2}, volume {volume:.0}, RSI {rsi}. \
         Give a concise investment opinion in {language}.",
        ticker = context.ticker,
        price = context.price,
        change = context.change,
        pct = context.percent_change,
        open = context.open,
        high = context.high,
        low = context.low,
        volume = context.volume,
    )
}

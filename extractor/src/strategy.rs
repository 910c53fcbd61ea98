//! Ordered heuristics for pulling the liquidity figure out of a row's text.
//!
//! The table markup is not ours and carries no column labels in the row text,
//! so each strategy is a guess about layout. They are tried in `Strategy::ORDER`
//! and the first hit wins.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::parse_value;

/// A figure as printed in the table: digits with separators and an optional
/// compact suffix, left for `parse_value` to scale.
const FIGURE: &str = r"[\d.,]+[KkMmBb]?";

static DOLLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\$({FIGURE})")).expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `<amount> <asset> $<usd>`: the USD figure printed under the token amount.
    UsdAfterAsset,

    /// Second-to-last `$<number>` in the row; the last one is taken to be the
    /// unit price column.
    ///
    /// Known accuracy risk: nothing ties this position to the liquidity
    /// column, it only matches the layout observed so far.
    SecondToLastDollar,
}

impl Strategy {
    pub const ORDER: [Strategy; 2] = [Strategy::UsdAfterAsset, Strategy::SecondToLastDollar];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::UsdAfterAsset => "usd_after_asset",
            Strategy::SecondToLastDollar => "second_to_last_dollar",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategies bound to one asset name. Build once per extraction and reuse
/// for every candidate row.
#[derive(Debug, Clone)]
pub struct RowMatcher {
    usd_after_asset: Regex,
}

impl RowMatcher {
    pub fn new(asset: &str) -> Result<Self, regex::Error> {
        let pattern = format!(r"({FIGURE})\s*{}\s*\$?({FIGURE})", regex::escape(asset));
        Ok(Self {
            usd_after_asset: Regex::new(&pattern)?,
        })
    }

    /// Applies one strategy alone to `row_text`.
    pub fn apply(&self, strategy: Strategy, row_text: &str) -> Option<f64> {
        match strategy {
            Strategy::UsdAfterAsset => self.usd_after_asset(row_text),
            Strategy::SecondToLastDollar => second_to_last_dollar(row_text),
        }
    }

    /// Runs the strategies in order and reports which one matched.
    pub fn extract(&self, row_text: &str) -> Option<(f64, Strategy)> {
        Strategy::ORDER
            .iter()
            .find_map(|s| self.apply(*s, row_text).map(|v| (v, *s)))
    }

    fn usd_after_asset(&self, row_text: &str) -> Option<f64> {
        let caps = self.usd_after_asset.captures(row_text)?;
        parse_value(caps.get(2)?.as_str())
    }
}

fn second_to_last_dollar(row_text: &str) -> Option<f64> {
    let values: Vec<&str> = DOLLAR
        .captures_iter(row_text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    tracing::debug!(dollar_values = ?values, "dollar values in row");

    if values.len() < 2 {
        return None;
    }
    parse_value(values[values.len() - 2])
}

//! Decoding of the contract's observable state into flat asset lists.
//!
//! The backend wraps every answer as `{"Right": {"tag": .., "contents": ..}}`
//! (or `{"Left": message}` when the contract reported a failure). Inside,
//! currency symbols, token names and asset classes are single-field wrapper
//! objects. Anything that does not match the expected shape is a
//! [`DecodeError`]; nothing is silently skipped.

use df_api_types::{Asset, AssetKind, CurrencySymbol, TokenName};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("contract reported an error: {0}")]
    Contract(String),
    #[error("expected observable state tagged {expected}, got {found}")]
    UnexpectedTag { expected: &'static str, found: String },
    #[error("malformed {what} at {path}")]
    Shape { what: &'static str, path: String },
}

type Result<T> = std::result::Result<T, DecodeError>;

/// Token amounts grouped under one currency symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basket {
    pub currency_symbol: CurrencySymbol,
    pub tokens: Vec<(TokenName, i128)>,
}

impl Basket {
    /// True when the basket's token-name set equals `names` as a set.
    pub fn holds_exactly(&self, names: &[&str]) -> bool {
        let held: BTreeSet<&str> = self.tokens.iter().map(|(name, _)| name.0.as_str()).collect();
        let wanted: BTreeSet<&str> = names.iter().copied().collect();
        held == wanted
    }
}

/// Decode the observable state returned for `kind` into a flat asset list.
pub fn decode_assets(kind: AssetKind, raw: &Value) -> Result<Vec<Asset>> {
    match kind {
        AssetKind::Funds => Ok(decode_baskets(raw)?
            .into_iter()
            .flat_map(|basket| {
                let symbol = basket.currency_symbol;
                basket.tokens.into_iter().map(move |(token_name, amount)| Asset {
                    currency_symbol: symbol.clone(),
                    token_name,
                    amount,
                })
            })
            .collect()),
        AssetKind::Pools => decode_pools(raw),
    }
}

/// Decode a "funds" observable state into its baskets, preserving order.
pub fn decode_baskets(raw: &Value) -> Result<Vec<Basket>> {
    let contents = unwrap_state(raw, AssetKind::Funds)?;
    let entries = match contents.get("getValue") {
        Some(value) => value,
        None => contents,
    };
    let entries = entries.as_array().ok_or_else(|| shape("value", "contents"))?;

    let mut baskets = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let path = format!("contents[{i}]");
        let (symbol, tokens) = pair(entry, &path)?;
        let currency_symbol = CurrencySymbol(wrapped_str(symbol, "unCurrencySymbol", &path)?);

        let tokens = tokens
            .as_array()
            .ok_or_else(|| shape("token list", format!("{path}[1]")))?;
        let mut decoded = Vec::with_capacity(tokens.len());
        for (j, token) in tokens.iter().enumerate() {
            let path = format!("{path}[1][{j}]");
            let (name, amount) = pair(token, &path)?;
            decoded.push((
                TokenName(wrapped_str(name, "unTokenName", &path)?),
                decode_amount(amount, &path)?,
            ));
        }

        baskets.push(Basket {
            currency_symbol,
            tokens: decoded,
        });
    }
    Ok(baskets)
}

/// Currency symbol of the first basket holding exactly `names`.
pub fn find_basket_symbol(baskets: &[Basket], names: &[&str]) -> Option<CurrencySymbol> {
    baskets
        .iter()
        .find(|basket| basket.holds_exactly(names))
        .map(|basket| basket.currency_symbol.clone())
}

fn decode_pools(raw: &Value) -> Result<Vec<Asset>> {
    let contents = unwrap_state(raw, AssetKind::Pools)?;
    let groups = contents.as_array().ok_or_else(|| shape("pool list", "contents"))?;

    let mut assets = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        let leaves = group
            .as_array()
            .ok_or_else(|| shape("pool", format!("contents[{i}]")))?;
        for (j, leaf) in leaves.iter().enumerate() {
            let path = format!("contents[{i}][{j}]");
            let (class, amount) = pair(leaf, &path)?;
            let (symbol, token) = class
                .get("unAssetClass")
                .ok_or_else(|| shape("asset class", &path))
                .and_then(|inner| pair(inner, &path))?;
            assets.push(Asset {
                currency_symbol: CurrencySymbol(wrapped_str(symbol, "unCurrencySymbol", &path)?),
                token_name: TokenName(wrapped_str(token, "unTokenName", &path)?),
                amount: decode_amount(amount, &path)?,
            });
        }
    }
    Ok(assets)
}

/// Message of a `Left` observable state, if the contract reported a failure.
pub fn contract_failure(raw: &Value) -> Option<String> {
    raw.get("Left").map(|left| match left.as_str() {
        Some(text) => text.to_owned(),
        None => left.to_string(),
    })
}

fn unwrap_state(raw: &Value, kind: AssetKind) -> Result<&Value> {
    if let Some(message) = contract_failure(raw) {
        return Err(DecodeError::Contract(message));
    }

    let right = raw.get("Right").ok_or_else(|| shape("observable state", "$"))?;
    let tag = right
        .get("tag")
        .and_then(Value::as_str)
        .ok_or_else(|| shape("state tag", "Right.tag"))?;
    if tag != kind.state_tag() {
        return Err(DecodeError::UnexpectedTag {
            expected: kind.state_tag(),
            found: tag.to_owned(),
        });
    }

    right
        .get("contents")
        .ok_or_else(|| shape("state contents", "Right.contents"))
}

fn pair<'a>(value: &'a Value, path: &str) -> Result<(&'a Value, &'a Value)> {
    match value.as_array().map(Vec::as_slice) {
        Some([first, second]) => Ok((first, second)),
        _ => Err(shape("pair", path)),
    }
}

fn wrapped_str(value: &Value, key: &'static str, path: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| shape(key, path))
}

// Numbers keep their source text (`arbitrary_precision`), so integers past
// the 64-bit range parse exactly and fractions are rejected.
fn decode_amount(value: &Value, path: &str) -> Result<i128> {
    value
        .as_number()
        .and_then(|number| number.to_string().parse::<i128>().ok())
        .ok_or_else(|| shape("amount", path))
}

fn shape(what: &'static str, path: impl Into<String>) -> DecodeError {
    DecodeError::Shape {
        what,
        path: path.into(),
    }
}

use anyhow::{Result, anyhow};
use df_api_types::CurrencySymbol;
use df_pab_client::ActionEncoder;
use serde_json::{Value, json};

/// Request bodies for the user endpoints of the Uniswap contract.
///
/// `params` is the JSON object a UI form submits: `coinA`/`coinB` are token
/// names of the shared basket, `amountA`/`amountB`/`diff` are integers or
/// integer strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniswapEncoder;

impl ActionEncoder for UniswapEncoder {
    fn encode_action_body(
        &self,
        action: &str,
        params: &Value,
        symbol: Option<&CurrencySymbol>,
    ) -> Result<Value> {
        let symbol = symbol.map(|s| s.0.as_str()).unwrap_or_default();
        let coin = |field: &str| -> Result<Value> { Ok(coin_json(symbol, token_param(params, field)?)) };

        let body = match action {
            "create" => json!({
                "cpCoinA": coin("coinA")?,
                "cpAmountA": amount_param(params, "amountA")?,
                "cpCoinB": coin("coinB")?,
                "cpAmountB": amount_param(params, "amountB")?,
            }),
            "swap" => json!({
                "spCoinA": coin("coinA")?,
                "spAmountA": amount_param(params, "amountA")?,
                "spCoinB": coin("coinB")?,
                "spAmountB": amount_param(params, "amountB")?,
            }),
            "add" => json!({
                "apCoinA": coin("coinA")?,
                "apAmountA": amount_param(params, "amountA")?,
                "apCoinB": coin("coinB")?,
                "apAmountB": amount_param(params, "amountB")?,
            }),
            "remove" => json!({
                "rpCoinA": coin("coinA")?,
                "rpCoinB": coin("coinB")?,
                "rpDiff": amount_param(params, "diff")?,
            }),
            "close" => json!({
                "clpCoinA": coin("coinA")?,
                "clpCoinB": coin("coinB")?,
            }),
            "stop" | "funds" | "pools" => json!([]),
            other => return Err(anyhow!("unsupported action: {other}")),
        };

        Ok(body)
    }
}

fn coin_json(symbol: &str, token: &str) -> Value {
    json!({
        "unAssetClass": [
            {"unCurrencySymbol": symbol},
            {"unTokenName": token},
        ]
    })
}

fn token_param<'a>(params: &'a Value, field: &str) -> Result<&'a str> {
    params
        .get(field)
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| anyhow!("{field} is required"))
}

fn amount_param(params: &Value, field: &str) -> Result<i64> {
    let value = params
        .get(field)
        .ok_or_else(|| anyhow!("{field} is required"))?;

    let amount = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    amount.ok_or_else(|| anyhow!("{field} must be an integer, got {value}"))
}

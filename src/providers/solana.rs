//! Solana Provider Module
//!
//! Method names, request builders and narrow field access for the handful of
//! Solana JSON-RPC results this crate reads. Results stay opaque
//! `serde_json::Value`s everywhere else; only the fields consumed here are
//! ever interpreted:
//! - getTokenSupply: `value.amount`, `value.decimals`
//! - getTokenLargestAccounts: `value[].address`, `value[].amount`
//! - getAccountInfo (jsonParsed): `value.owner`, `value.data.parsed.info.*`
//! - getProgramAccounts (jsonParsed): `[].account.data.parsed.info.owner`,
//!   `[].account.data.parsed.info.tokenAmount.amount`

use serde_json::{json, Value};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::RpcRequest;
use crate::utils::constants::TOKEN_ACCOUNT_SIZE;

// ============================================
// SOLANA CONSTANTS
// ============================================

pub const GET_HEALTH: &str = "getHealth";
pub const GET_VERSION: &str = "getVersion";
pub const GET_SLOT: &str = "getSlot";
pub const GET_TOKEN_SUPPLY: &str = "getTokenSupply";
pub const GET_TOKEN_LARGEST_ACCOUNTS: &str = "getTokenLargestAccounts";
pub const GET_ACCOUNT_INFO: &str = "getAccountInfo";
pub const GET_PROGRAM_ACCOUNTS: &str = "getProgramAccounts";

/// Token Program ID
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 Program ID
pub const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Methods an endpoint must support before full analysis is attempted
pub const REQUIRED_METHODS: [&str; 2] = [GET_TOKEN_SUPPLY, GET_TOKEN_LARGEST_ACCOUNTS];

// ============================================
// REQUEST BUILDERS
// ============================================

pub fn token_supply_request(mint: &str) -> RpcRequest {
    RpcRequest::new(GET_TOKEN_SUPPLY, vec![json!(mint)])
}

pub fn mint_account_request(mint: &str) -> RpcRequest {
    RpcRequest::new(GET_ACCOUNT_INFO, vec![json!(mint), json!({ "encoding": "jsonParsed" })])
}

/// Every token account of `mint` under the Token Program, owner fields parsed
pub fn program_accounts_params(mint: &str) -> Vec<Value> {
    vec![
        json!(TOKEN_PROGRAM),
        json!({
            "encoding": "jsonParsed",
            "filters": [
                { "dataSize": TOKEN_ACCOUNT_SIZE },
                { "memcmp": { "offset": 0, "bytes": mint } }
            ]
        }),
    ]
}

// ============================================
// RESULT ACCESSORS
// ============================================

/// Raw supply and decimals from getTokenSupply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSupply {
    pub amount: u64,
    pub decimals: u8,
}

impl TokenSupply {
    /// Supply in whole tokens
    pub fn ui_amount(&self) -> f64 {
        ui_amount(self.amount, self.decimals)
    }
}

/// One holding account: a getTokenLargestAccounts entry, or a scanned
/// token account keyed by its owner wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargestAccount {
    pub address: String,
    pub amount: u64,
}

/// Mint details from a jsonParsed getAccountInfo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintInfo {
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub is_initialized: bool,
    pub owner_program: Option<String>,
}

/// raw / 10^decimals
pub fn ui_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

/// Amounts arrive as decimal strings; some gateways send numbers
fn parse_amount(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

pub fn parse_token_supply(result: &Value) -> AppResult<TokenSupply> {
    let value = result
        .get("value")
        .ok_or_else(|| AppError::invalid_response("getTokenSupply: missing value"))?;

    let amount = parse_amount(value.get("amount"))
        .ok_or_else(|| AppError::invalid_response("getTokenSupply: missing or invalid amount"))?;

    let decimals = value
        .get("decimals")
        .and_then(Value::as_u64)
        .filter(|d| *d <= u8::MAX as u64)
        .ok_or_else(|| AppError::invalid_response("getTokenSupply: missing or invalid decimals"))?;

    Ok(TokenSupply {
        amount,
        decimals: decimals as u8,
    })
}

/// Entries are returned in the order the endpoint sent them
pub fn parse_largest_accounts(result: &Value) -> AppResult<Vec<LargestAccount>> {
    let entries = result
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::invalid_response("getTokenLargestAccounts: missing value array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let address = entry
                .get("address")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    AppError::invalid_response(format!("getTokenLargestAccounts: entry {} has no address", i))
                })?;
            let amount = parse_amount(entry.get("amount")).ok_or_else(|| {
                AppError::invalid_response(format!("getTokenLargestAccounts: entry {} has no amount", i))
            })?;
            Ok(LargestAccount {
                address: address.to_string(),
                amount,
            })
        })
        .collect()
}

/// Token accounts from a getProgramAccounts scan, keyed by owner wallet
pub fn parse_program_accounts(result: &Value) -> AppResult<Vec<LargestAccount>> {
    let entries = result
        .as_array()
        .ok_or_else(|| AppError::invalid_response("getProgramAccounts: result is not an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let info = entry
                .pointer("/account/data/parsed/info")
                .ok_or_else(|| {
                    AppError::invalid_response(format!("getProgramAccounts: entry {} is not jsonParsed", i))
                })?;
            let owner = info.get("owner").and_then(Value::as_str).ok_or_else(|| {
                AppError::invalid_response(format!("getProgramAccounts: entry {} has no owner", i))
            })?;
            let amount = parse_amount(info.pointer("/tokenAmount/amount")).ok_or_else(|| {
                AppError::invalid_response(format!("getProgramAccounts: entry {} has no amount", i))
            })?;
            Ok(LargestAccount {
                address: owner.to_string(),
                amount,
            })
        })
        .collect()
}

/// Holding accounts from whichever holder method answered
pub fn parse_holder_accounts(method: &str, result: &Value) -> AppResult<Vec<LargestAccount>> {
    match method {
        GET_PROGRAM_ACCOUNTS => parse_program_accounts(result),
        _ => parse_largest_accounts(result),
    }
}

/// None unless the account came back jsonParsed with an `info` object
pub fn parse_mint_info(result: &Value) -> Option<MintInfo> {
    let value = result.get("value").filter(|v| !v.is_null())?;
    let info = value.get("data")?.get("parsed")?.get("info")?;

    let text = |key: &str| info.get(key).and_then(Value::as_str).map(String::from);

    Some(MintInfo {
        mint_authority: text("mintAuthority"),
        freeze_authority: text("freezeAuthority"),
        is_initialized: info
            .get("isInitialized")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        owner_program: value.get("owner").and_then(Value::as_str).map(String::from),
    })
}

/// Human label for the program that owns a mint
pub fn token_program_label(owner: &str) -> &'static str {
    match owner {
        TOKEN_PROGRAM => "spl-token",
        TOKEN_2022_PROGRAM => "spl-token-2022",
        _ => "unknown",
    }
}

use crate::error::MonoError;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exchange rate for a pair of ISO 4217 numeric currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    #[serde(rename = "currencyCodeA")]
    pub currency_code_a: u16,
    #[serde(rename = "currencyCodeB")]
    pub currency_code_b: u16,
    #[serde(rename = "date")]
    pub date: i64,
    #[serde(rename = "rateSell", default, skip_serializing_if = "Option::is_none")]
    pub rate_sell: Option<Decimal>,
    #[serde(rename = "rateBuy", default, skip_serializing_if = "Option::is_none")]
    pub rate_buy: Option<Decimal>,
    #[serde(rename = "rateCross", default, skip_serializing_if = "Option::is_none")]
    pub rate_cross: Option<Decimal>,
}

impl CurrencyRate {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "sendId")]
    pub send_id: String,
    /// Balance in minor units of `currency_code`.
    #[serde(rename = "balance")]
    pub balance: Decimal,
    #[serde(rename = "creditLimit")]
    pub credit_limit: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "currencyCode")]
    pub currency_code: u16,
    #[serde(rename = "cashbackType")]
    pub cashback_type: String,
    #[serde(rename = "maskedPan", default, skip_serializing_if = "Option::is_none")]
    pub masked_pan: Option<Vec<String>>,
    #[serde(rename = "iban", default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
}

/// Savings pocket ("banka") attached to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jar {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "sendId")]
    pub send_id: String,
    #[serde(rename = "title")]
    pub title: String,
    #[serde(rename = "description")]
    pub description: String,
    #[serde(rename = "currencyCode")]
    pub currency_code: u16,
    #[serde(rename = "balance")]
    pub balance: Decimal,
    #[serde(rename = "goal")]
    pub goal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(rename = "clientId")]
    pub id: String,
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "webHookUrl", default)]
    pub webhook_url: String,
    #[serde(rename = "permissions", default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    #[serde(rename = "accounts", default)]
    pub accounts: Vec<Account>,
    #[serde(rename = "jars", default)]
    pub jars: Vec<Jar>,
}

impl ClientInfo {
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementItem {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "time")]
    pub time: i64,
    #[serde(rename = "description")]
    pub description: String,
    #[serde(rename = "mcc")]
    pub mcc: u16,
    #[serde(rename = "originalMcc", default)]
    pub original_mcc: u16,
    #[serde(rename = "hold")]
    pub hold: bool,
    #[serde(rename = "amount")]
    pub amount: Decimal,
    #[serde(rename = "operationAmount")]
    pub operation_amount: Decimal,
    #[serde(rename = "currencyCode")]
    pub currency_code: u16,
    #[serde(rename = "commissionRate", default)]
    pub commission_rate: Decimal,
    #[serde(rename = "cashbackAmount", default)]
    pub cashback_amount: Decimal,
    #[serde(rename = "balance")]
    pub balance: Decimal,
    #[serde(rename = "comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "receiptId", default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    #[serde(rename = "invoiceId", default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(rename = "counterEdrpou", default, skip_serializing_if = "Option::is_none")]
    pub counter_edrpou: Option<String>,
    #[serde(rename = "counterIban", default, skip_serializing_if = "Option::is_none")]
    pub counter_iban: Option<String>,
    #[serde(rename = "counterName", default, skip_serializing_if = "Option::is_none")]
    pub counter_name: Option<String>,
}

impl StatementItem {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    #[serde(rename = "webHookUrl")]
    pub web_hook_url: String,
}

/// Notification monobank POSTs to the registered webhook URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: WebhookEventKind,
    #[serde(rename = "data")]
    pub data: StatementEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventKind {
    StatementItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementEvent {
    #[serde(rename = "account")]
    pub account: String,
    #[serde(rename = "statementItem")]
    pub statement_item: StatementItem,
}

pub fn parse_currency_rates(data: &str) -> Result<Vec<CurrencyRate>, MonoError> {
    let rates: Vec<CurrencyRate> = serde_json::from_str(data)?;
    debug!("Parsed {} currency rates", rates.len());
    Ok(rates)
}

pub fn parse_client_info(data: &str) -> Result<ClientInfo, MonoError> {
    let info: ClientInfo = serde_json::from_str(data)?;
    debug!(
        "Parsed client info with {} accounts and {} jars",
        info.accounts.len(),
        info.jars.len()
    );
    Ok(info)
}

pub fn parse_statement(data: &str) -> Result<Vec<StatementItem>, MonoError> {
    let items: Vec<StatementItem> = serde_json::from_str(data)?;
    debug!("Parsed {} statement items", items.len());
    Ok(items)
}

pub fn parse_webhook_event(data: &str) -> Result<WebhookEvent, MonoError> {
    let event: WebhookEvent = serde_json::from_str(data)?;
    debug!("Parsed {:?} webhook event for account {}", event.kind, event.data.account);
    Ok(event)
}

//! Typed records decoded from the executable's loosely-typed JSON.
//!
//! Each field goes through [`Field`], a tagged decode result, and falls back
//! to a documented default instead of failing:
//!
//! | JSON value              | text field           | id field         |
//! |-------------------------|----------------------|------------------|
//! | string                  | as is                | parsed `u64`, else 0 |
//! | number / bool           | display text         | `u64` if integral and >= 0, else 0 |
//! | null / absent           | `""`                 | 0                |
//! | object / array          | compact JSON text    | 0                |

use super::pager::JsonObject;
use serde::{Serialize, Serializer};
use serde_json::Value;

/* ---- Field decoding ---- */

#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Present(T),
    Missing,
    Malformed(Value),
}

impl<T> Field<T> {
    pub fn or(self, default: T) -> T {
        match self {
            Field::Present(v) => v,
            Field::Missing | Field::Malformed(_) => default,
        }
    }
}

impl Field<String> {
    /// Display representation: malformed values keep their JSON text.
    pub fn or_display(self) -> String {
        match self {
            Field::Present(s) => s,
            Field::Missing => String::new(),
            Field::Malformed(v) => v.to_string(),
        }
    }
}

pub fn text_field(obj: &JsonObject, key: &str) -> Field<String> {
    match obj.get(key) {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(s)) => Field::Present(s.clone()),
        Some(Value::Number(n)) => Field::Present(n.to_string()),
        Some(Value::Bool(b)) => Field::Present(b.to_string()),
        Some(other) => Field::Malformed(other.clone()),
    }
}

pub fn id_field(obj: &JsonObject, key: &str) -> Field<u64> {
    match obj.get(key) {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Field::Present)
            .unwrap_or_else(|| Field::Malformed(Value::Number(n.clone()))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Field::Present)
            .unwrap_or_else(|_| Field::Malformed(Value::String(s.clone()))),
        Some(other) => Field::Malformed(other.clone()),
    }
}

fn text(obj: &JsonObject, key: &str) -> String {
    text_field(obj, key).or_display()
}

fn id(obj: &JsonObject, key: &str) -> u64 {
    id_field(obj, key).or(0)
}

/// Objects of a JSON array; everything else is dropped.
pub fn objects(values: &[Value]) -> Vec<JsonObject> {
    values
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}

/* ---- Records ---- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auction {
    /// 0 when the source id was missing or unparseable.
    pub id: u64,
    pub issue: String,
    pub description: String,
    pub status: String,
    pub winner: String,
    pub creator: String,
}

impl Auction {
    pub fn from_record(obj: &JsonObject) -> Self {
        Self {
            id: id(obj, "id"),
            issue: text(obj, "issue"),
            description: text(obj, "description"),
            status: text(obj, "status"),
            winner: text(obj, "winner"),
            creator: text(obj, "creator"),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("open")
    }
}

fn id_as_string<S: Serializer>(id: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bid {
    #[serde(rename = "auctionId", serialize_with = "id_as_string")]
    pub auction_id: u64,
    pub amount: String,
    pub description: String,
    pub creator: String,
    pub bidder: String,
}

impl Bid {
    pub fn from_record(obj: &JsonObject) -> Self {
        Self {
            auction_id: id(obj, "auctionId"),
            amount: text(obj, "amount"),
            description: text(obj, "description"),
            creator: text(obj, "creator"),
            bidder: text(obj, "bidder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coin {
    pub amount: String,
    pub denom: String,
}

/// Token holder as reported by `query bank denom-owners`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenomOwner {
    pub address: String,
    pub balance: Coin,
}

impl DenomOwner {
    /// `None` when the entry carries no `balance` object.
    pub fn from_record(obj: &JsonObject) -> Option<Self> {
        let balance = obj.get("balance")?.as_object()?;
        Some(Self {
            address: text(obj, "address"),
            balance: Coin {
                amount: text(balance, "amount"),
                denom: text(balance, "denom"),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub denom: String,
    pub amount: String,
}

impl Balance {
    pub fn from_record(obj: &JsonObject) -> Self {
        Self {
            denom: text(obj, "denom"),
            amount: text(obj, "amount"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    pub name: String,
    pub address: String,
}

impl Key {
    pub fn from_record(obj: &JsonObject) -> Self {
        Self {
            name: text(obj, "name"),
            address: text(obj, "address"),
        }
    }
}

/* ---- Batch parsers ---- */

pub fn parse_auctions(records: &[JsonObject]) -> Vec<Auction> {
    records.iter().map(Auction::from_record).collect()
}

pub fn parse_bids(records: &[JsonObject]) -> Vec<Bid> {
    records.iter().map(Bid::from_record).collect()
}

pub fn parse_denom_owners(records: &[JsonObject]) -> Vec<DenomOwner> {
    records.iter().filter_map(DenomOwner::from_record).collect()
}

pub fn parse_balances(records: &[JsonObject]) -> Vec<Balance> {
    records.iter().map(Balance::from_record).collect()
}

pub fn parse_keys(records: &[JsonObject]) -> Vec<Key> {
    records.iter().map(Key::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> JsonObject {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn text_field_tags() {
        let o = obj(json!({"s": "x", "n": 12, "b": true, "z": null, "a": [1], "o": {"k": 1}}));
        assert_eq!(text_field(&o, "s"), Field::Present("x".into()));
        assert_eq!(text_field(&o, "n"), Field::Present("12".into()));
        assert_eq!(text_field(&o, "b"), Field::Present("true".into()));
        assert_eq!(text_field(&o, "z"), Field::Missing);
        assert_eq!(text_field(&o, "absent"), Field::Missing);
        assert_eq!(text_field(&o, "a"), Field::Malformed(json!([1])));
        assert_eq!(text_field(&o, "o").or_display(), r#"{"k":1}"#);
    }

    #[test]
    fn id_field_tags() {
        let o = obj(json!({
            "s": "42", "pad": " 7 ", "n": 9, "neg": -1, "frac": 1.5,
            "word": "abc", "z": null, "arr": []
        }));
        assert_eq!(id_field(&o, "s"), Field::Present(42));
        assert_eq!(id_field(&o, "pad"), Field::Present(7));
        assert_eq!(id_field(&o, "n"), Field::Present(9));
        assert!(matches!(id_field(&o, "neg"), Field::Malformed(_)));
        assert!(matches!(id_field(&o, "frac"), Field::Malformed(_)));
        assert!(matches!(id_field(&o, "word"), Field::Malformed(_)));
        assert_eq!(id_field(&o, "z"), Field::Missing);
        assert_eq!(id_field(&o, "missing"), Field::Missing);
        assert!(matches!(id_field(&o, "arr"), Field::Malformed(_)));
    }

    #[test]
    fn auction_from_full_record() {
        let a = Auction::from_record(&obj(json!({
            "id": "3",
            "issue": "Fix login",
            "description": "OAuth flow breaks",
            "status": "Open ",
            "winner": "",
            "creator": "cosmos1creator"
        })));
        assert_eq!(a.id, 3);
        assert_eq!(a.issue, "Fix login");
        assert_eq!(a.winner, "");
        assert!(a.is_open());
    }

    #[test]
    fn malformed_auction_id_becomes_zero() {
        let a = Auction::from_record(&obj(json!({"id": "not-a-number", "status": "closed"})));
        assert_eq!(a.id, 0);
        assert_eq!(a.issue, "");
        assert!(!a.is_open());
    }

    #[test]
    fn parsing_is_idempotent() {
        let raw = vec![obj(json!({
            "auctionId": "5", "amount": "10token", "description": "d",
            "creator": "c", "bidder": "b", "extra": {"x": 1}
        }))];
        assert_eq!(parse_bids(&raw), parse_bids(&raw));
        let raw_a = vec![obj(json!({"id": 1, "status": ["odd"]}))];
        assert_eq!(parse_auctions(&raw_a), parse_auctions(&raw_a));
    }

    #[test]
    fn bid_serializes_auction_id_as_string() {
        let b = Bid::from_record(&obj(json!({
            "auctionId": 2, "amount": "5token", "description": "first",
            "creator": "cosmos1c", "bidder": "cosmos1b"
        })));
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["auctionId"], json!("2"));
        assert_eq!(v["amount"], json!("5token"));
    }

    #[test]
    fn denom_owner_without_balance_is_skipped() {
        let raw = vec![
            obj(json!({"address": "cosmos1a", "balance": {"amount": "10", "denom": "token"}})),
            obj(json!({"address": "cosmos1b"})),
            obj(json!({"address": "cosmos1c", "balance": "10token"})),
        ];
        let owners = parse_denom_owners(&raw);
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].balance.amount, "10");
        assert_eq!(owners[0].balance.denom, "token");
    }

    #[test]
    fn objects_drops_non_objects() {
        let values = vec![json!({"name": "alice"}), json!("bob"), json!(3)];
        let keys = parse_keys(&objects(&values));
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, "alice");
        assert_eq!(keys[0].address, "");
    }

    #[test]
    fn balance_amount_number_is_stringified() {
        let b = Balance::from_record(&obj(json!({"denom": "token", "amount": 1500})));
        assert_eq!(b.amount, "1500");
    }
}

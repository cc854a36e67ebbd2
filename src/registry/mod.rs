//! Key registry: logical identifiers → storage keys.
//!
//! # Data Flow
//! ```text
//! URL segment (namespace, identifier)
//!     → KeyRegistry::lookup(namespace, identifier)
//!     → storage key or None
//!
//! Stock symbol
//!     → stock_key(symbol)  (uppercased, never registered)
//! ```
//!
//! # Design Decisions
//! - Three independent tables; the same identifier may resolve differently
//!   per namespace
//! - Tables are ordered slices, aggregate order is declaration order
//! - Immutable after construction, shared via Arc without locks

use std::fmt;

/// Identifier → key pairs for the `fred` namespace.
pub const FRED_KEYS: &[(&str, &str)] = &[
    ("us_30yr_fix_mortgage_rate", "api/fred/us_30yr_fix_mortgage_rate.json"),
    ("consumer_price_index", "api/fred/consumer_price_index.json"),
    ("federal_funds_rate", "api/fred/federal_funds_rate.json"),
    ("gdp", "api/fred/gdp.json"),
    ("core_cpi", "api/fred/core_cpi.json"),
    ("fed_total_assets", "api/fred/fed_total_assets.json"),
    ("m2", "api/fred/m2.json"),
    ("sp500", "api/fred/sp500.json"),
    ("commercial_banks_deposits", "api/fred/commercial_banks_deposits.json"),
    ("total_money_market_fund", "api/fred/total_money_market_fund.json"),
    ("us_producer_price_index", "api/fred/us_producer_price_index.json"),
];

/// Identifier → key pairs for the `bls` namespace.
pub const BLS_KEYS: &[(&str, &str)] = &[
    ("unemployment_rate", "api/bls/unemployment_rate.json"),
    ("nonfarm_payroll", "api/bls/nonfarm_payroll.json"),
    ("us_avg_weekly_hours", "api/bls/us_avg_weekly_hours.json"),
    ("us_job_opening", "api/bls/us_job_opening.json"),
];

/// Category → key pairs for everything without a provider prefix.
pub const GENERIC_KEYS: &[(&str, &str)] = &[
    ("us_treasury_yield", "api/treasury_yield_all.json"),
    ("articles", "articles.json"),
    ("chart", "chart_data.json"),
    ("categories", "categories.json"),
    ("indicators", "indicators.json"),
];

/// Category whose second path segment is a record id rather than a key.
pub const ARTICLES_CATEGORY: &str = "articles";

const STOCK_KEY_PREFIX: &str = "api/stock_daily_bar/";

/// One of the three independent identifier tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Fred,
    Bls,
    Generic,
}

impl Namespace {
    /// Provider namespaces addressable as the first path segment.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "fred" => Some(Namespace::Fred),
            "bls" => Some(Namespace::Bls),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Fred => "fred",
            Namespace::Bls => "bls",
            Namespace::Generic => "generic",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Table = Vec<(String, String)>;

/// Fixed identifier tables, one per namespace.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    fred: Table,
    bls: Table,
    generic: Table,
}

impl KeyRegistry {
    /// Build a registry from explicit tables.
    pub fn new(
        fred: &[(&str, &str)],
        bls: &[(&str, &str)],
        generic: &[(&str, &str)],
    ) -> Self {
        Self {
            fred: to_table(fred),
            bls: to_table(bls),
            generic: to_table(generic),
        }
    }

    /// The registry the service ships with.
    pub fn builtin() -> Self {
        Self::new(FRED_KEYS, BLS_KEYS, GENERIC_KEYS)
    }

    fn table(&self, namespace: Namespace) -> &Table {
        match namespace {
            Namespace::Fred => &self.fred,
            Namespace::Bls => &self.bls,
            Namespace::Generic => &self.generic,
        }
    }

    /// Resolve an identifier within one namespace.
    pub fn lookup(&self, namespace: Namespace, identifier: &str) -> Option<&str> {
        self.table(namespace)
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, key)| key.as_str())
    }

    /// Every key of a namespace, in declaration order.
    pub fn keys(&self, namespace: Namespace) -> Vec<&str> {
        self.table(namespace).iter().map(|(_, key)| key.as_str()).collect()
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn to_table(entries: &[(&str, &str)]) -> Table {
    entries
        .iter()
        .map(|(id, key)| (id.to_string(), key.to_string()))
        .collect()
}

/// Storage key for a ticker's daily bars. Case-insensitive on input.
pub fn stock_key(symbol: &str) -> String {
    format!("{}{}.json", STOCK_KEY_PREFIX, symbol.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_per_namespace() {
        let registry = KeyRegistry::builtin();
        assert_eq!(
            registry.lookup(Namespace::Fred, "gdp"),
            Some("api/fred/gdp.json")
        );
        assert_eq!(
            registry.lookup(Namespace::Bls, "unemployment_rate"),
            Some("api/bls/unemployment_rate.json")
        );
        assert_eq!(registry.lookup(Namespace::Generic, "chart"), Some("chart_data.json"));

        // Tables are isolated from each other
        assert_eq!(registry.lookup(Namespace::Bls, "gdp"), None);
        assert_eq!(registry.lookup(Namespace::Generic, "gdp"), None);
    }

    #[test]
    fn test_same_identifier_in_two_namespaces() {
        let registry = KeyRegistry::new(&[("rate", "a.json")], &[("rate", "b.json")], &[]);
        assert_eq!(registry.lookup(Namespace::Fred, "rate"), Some("a.json"));
        assert_eq!(registry.lookup(Namespace::Bls, "rate"), Some("b.json"));
    }

    #[test]
    fn test_keys_keep_declaration_order() {
        let registry = KeyRegistry::builtin();
        let keys = registry.keys(Namespace::Bls);
        assert_eq!(
            keys,
            vec![
                "api/bls/unemployment_rate.json",
                "api/bls/nonfarm_payroll.json",
                "api/bls/us_avg_weekly_hours.json",
                "api/bls/us_job_opening.json",
            ]
        );
        assert_eq!(registry.keys(Namespace::Fred).len(), FRED_KEYS.len());
    }

    #[test]
    fn test_stock_key_uppercases() {
        assert_eq!(stock_key("aapl"), "api/stock_daily_bar/AAPL.json");
        assert_eq!(stock_key("AaPl"), "api/stock_daily_bar/AAPL.json");
    }

    #[test]
    fn test_namespace_segments() {
        assert_eq!(Namespace::from_segment("fred"), Some(Namespace::Fred));
        assert_eq!(Namespace::from_segment("bls"), Some(Namespace::Bls));
        assert_eq!(Namespace::from_segment("generic"), None);
        assert_eq!(Namespace::from_segment("FRED"), None);
    }
}

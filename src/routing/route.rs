//! Path grammar.
//!
//! A request path is parsed exactly once into a [`Route`]; dispatch is a
//! match over its variants.

use crate::registry::{Namespace, ARTICLES_CATEGORY};

/// Every path shape the service answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/{fred|bls}/{identifier}`
    Series {
        namespace: Namespace,
        identifier: String,
    },
    /// `/{fred|bls}`
    Aggregate { namespace: Namespace },
    /// `/stocks/daily_ohlc/{symbol}`
    DailyBars { symbol: String },
    /// `/articles` or `/articles/{id}`
    Articles { id: Option<String> },
    /// `/{category}` or `/{category}/{key}`
    Category {
        category: String,
        key: Option<String>,
    },
    /// Anything else.
    Unknown,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        if path.is_empty() {
            return Route::Unknown;
        }

        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Route::Unknown;
        }

        match segments.as_slice() {
            ["stocks", "daily_ohlc", symbol] => Route::DailyBars {
                symbol: symbol.to_string(),
            },
            [first, rest @ ..] if rest.len() <= 1 => {
                let second = rest.first().map(|s| s.to_string());
                if let Some(namespace) = Namespace::from_segment(first) {
                    return match second {
                        Some(identifier) => Route::Series {
                            namespace,
                            identifier,
                        },
                        None => Route::Aggregate { namespace },
                    };
                }
                if *first == ARTICLES_CATEGORY {
                    return Route::Articles { id: second };
                }
                Route::Category {
                    category: first.to_string(),
                    key: second,
                }
            }
            _ => Route::Unknown,
        }
    }

    /// Low-cardinality label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Route::Series { .. } => "series",
            Route::Aggregate { .. } => "aggregate",
            Route::DailyBars { .. } => "daily_bars",
            Route::Articles { .. } => "articles",
            Route::Category { .. } => "category",
            Route::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_shapes() {
        assert_eq!(
            Route::parse("/fred/gdp"),
            Route::Series {
                namespace: Namespace::Fred,
                identifier: "gdp".into()
            }
        );
        assert_eq!(
            Route::parse("/bls"),
            Route::Aggregate {
                namespace: Namespace::Bls
            }
        );
        assert_eq!(
            Route::parse("/fred/"),
            Route::Aggregate {
                namespace: Namespace::Fred
            }
        );
    }

    #[test]
    fn test_stock_shape() {
        assert_eq!(
            Route::parse("/stocks/daily_ohlc/aapl"),
            Route::DailyBars {
                symbol: "aapl".into()
            }
        );
        // Two segments under stocks is the generic shape
        assert_eq!(
            Route::parse("/stocks/daily_ohlc"),
            Route::Category {
                category: "stocks".into(),
                key: Some("daily_ohlc".into())
            }
        );
    }

    #[test]
    fn test_articles_and_categories() {
        assert_eq!(Route::parse("/articles"), Route::Articles { id: None });
        assert_eq!(
            Route::parse("articles/b"),
            Route::Articles {
                id: Some("b".into())
            }
        );
        assert_eq!(
            Route::parse("/chart"),
            Route::Category {
                category: "chart".into(),
                key: None
            }
        );
        assert_eq!(
            Route::parse("/chart/1"),
            Route::Category {
                category: "chart".into(),
                key: Some("1".into())
            }
        );
    }

    #[test]
    fn test_unknown_shapes() {
        for path in ["", "/", "//", "/a//b", "/a/b/c", "/stocks/weekly/aapl", "/fred/gdp/extra"] {
            assert_eq!(Route::parse(path), Route::Unknown, "path {path:?}");
        }
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Route::parse("/fred").kind(), "aggregate");
        assert_eq!(Route::parse("/x/y/z").kind(), "unknown");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Provider Tests — CoinGecko URL building and response parsing
// ═══════════════════════════════════════════════════════════════════

use paper_trader_core::errors::CoreError;
use paper_trader_core::models::asset::AssetUniverse;
use paper_trader_core::models::chart::HistoryWindow;
use paper_trader_core::models::settings::Settings;
use paper_trader_core::providers::coingecko::CoinGeckoProvider;
use paper_trader_core::providers::traits::PriceFeed;

fn provider() -> CoinGeckoProvider {
    CoinGeckoProvider::new()
}

// ═══════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════

mod construction {
    use super::*;

    #[test]
    fn name() {
        assert_eq!(provider().name(), "CoinGecko");
    }

    #[test]
    fn default_points_at_public_api() {
        assert_eq!(
            CoinGeckoProvider::default().base_url(),
            "https://api.coingecko.com/api/v3"
        );
    }

    #[test]
    fn from_settings_trims_trailing_slash() {
        let settings = Settings {
            feed_base_url: "http://localhost:9000/v3/".into(),
            ..Settings::default()
        };
        let p = CoinGeckoProvider::from_settings(&settings);
        assert_eq!(p.base_url(), "http://localhost:9000/v3");
    }

    #[test]
    fn debug_does_not_dump_client() {
        let shown = format!("{:?}", provider());
        assert!(shown.contains("CoinGeckoProvider"));
        assert!(shown.contains("api.coingecko.com"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// URLs
// ═══════════════════════════════════════════════════════════════════

mod urls {
    use super::*;

    #[test]
    fn simple_price_batches_all_ids() {
        let ids = AssetUniverse::default().feed_ids();
        assert_eq!(
            provider().simple_price_url(&ids),
            "https://api.coingecko.com/api/v3/simple/price?ids=dogecoin,cardano,vechain&vs_currencies=usd"
        );
    }

    #[test]
    fn market_chart_one_day_hourly() {
        assert_eq!(
            provider().market_chart_url("cardano", HistoryWindow::ONE_DAY_HOURLY),
            "https://api.coingecko.com/api/v3/coins/cardano/market_chart?vs_currency=usd&days=1&interval=hourly"
        );
    }

    #[test]
    fn market_chart_custom_window() {
        let url = provider().market_chart_url("vechain", HistoryWindow { days: 7 });
        assert!(url.ends_with("/coins/vechain/market_chart?vs_currency=usd&days=7&interval=hourly"));
    }

    #[test]
    fn quote_currency_from_settings() {
        let settings = Settings {
            quote_currency: "EUR".into(),
            ..Settings::default()
        };
        let p = CoinGeckoProvider::from_settings(&settings);
        assert!(p
            .simple_price_url(&["dogecoin".to_string()])
            .ends_with("ids=dogecoin&vs_currencies=eur"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// /simple/price parsing
// ═══════════════════════════════════════════════════════════════════

mod simple_price {
    use super::*;

    #[test]
    fn parses_every_coin() {
        let body = r#"{"dogecoin":{"usd":0.1},"cardano":{"usd":0.5},"vechain":{"usd":0.031}}"#;
        let quotes = provider().parse_simple_prices(body).unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes["dogecoin"], 0.1);
        assert_eq!(quotes["vechain"], 0.031);
    }

    #[test]
    fn omitted_coin_is_absent() {
        let body = r#"{"dogecoin":{"usd":0.1}}"#;
        let quotes = provider().parse_simple_prices(body).unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(!quotes.contains_key("cardano"));
    }

    #[test]
    fn coin_without_usd_quote_is_absent() {
        let body = r#"{"dogecoin":{},"cardano":{"usd":null},"vechain":{"eur":0.02}}"#;
        let quotes = provider().parse_simple_prices(body).unwrap();
        assert!(quotes.is_empty());
    }

    #[test]
    fn empty_object() {
        assert!(provider().parse_simple_prices("{}").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_feed_unavailable() {
        let err = provider().parse_simple_prices("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, CoreError::FeedUnavailable { .. }));
    }

    #[test]
    fn wrong_shape_is_feed_unavailable() {
        let err = provider()
            .parse_simple_prices(
                r#"{"status":{"error_code":429,"error_message":"You've exceeded the Rate Limit"}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::FeedUnavailable { ref provider, .. } if provider.as_str() == "CoinGecko"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// /market_chart parsing
// ═══════════════════════════════════════════════════════════════════

mod market_chart {
    use super::*;

    #[test]
    fn parses_and_sorts_samples() {
        let body = r#"{
            "prices": [[1700003600000, 0.11], [1700000000000, 0.10]],
            "market_caps": [],
            "total_volumes": []
        }"#;
        let points = provider().parse_market_chart("dogecoin", body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp_ms, 1_700_000_000_000);
        assert_eq!(points[0].price, 0.10);
        assert_eq!(points[1].price, 0.11);
    }

    #[test]
    fn malformed_samples_are_skipped() {
        let body = r#"{"prices": [[1700000000000], [1700000000000, 0.1, 9], [1700003600000, 0.12]]}"#;
        let points = provider().parse_market_chart("dogecoin", body).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 0.12);
    }

    #[test]
    fn empty_series_is_ok() {
        let points = provider()
            .parse_market_chart("dogecoin", r#"{"prices": []}"#)
            .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn missing_prices_field_is_feed_unavailable() {
        let err = provider()
            .parse_market_chart("dogecoin", r#"{"error":"coin not found"}"#)
            .unwrap_err();
        assert!(matches!(err, CoreError::FeedUnavailable { .. }));
        assert!(err.to_string().contains("dogecoin"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Trait behaviour without network
// ═══════════════════════════════════════════════════════════════════

mod feed {
    use super::*;

    #[tokio::test]
    async fn empty_id_list_skips_request() {
        let quotes = provider().get_current_prices(&[]).await.unwrap();
        assert!(quotes.is_empty());
    }
}

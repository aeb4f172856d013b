//! End-to-end pipeline tests: messy spreadsheet in, enriched workbook,
//! CSV, and SQLite load out.

use std::io::Write;
use std::path::PathBuf;

use cointrack::pricing::{
    enrich, CoinGeckoClient, EnrichOptions, PriceCache, COL_COST_BASIS, COL_CURRENT_PRICE,
    COL_PL_PCT, COL_PL_USD, COL_POSITION_VALUE,
};
use cointrack::schema::{normalize_headers, validate_schema, COL_COIN, COL_QUANTITY};
use cointrack::sheet::{read_table, write_csv, write_workbook};
use cointrack::storage::load_holdings;
use cointrack::summary::{summarize, TOTAL_LABEL};
use cointrack::table::{Cell, Table};

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_input_csv(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("holdings.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    // Deliberately messy headers: aliases, casing, underscores, and an
    // unknown column.
    writeln!(file, "purchase_date,TICKER,Qty,Unit Price,fees,Wallet Color").unwrap();
    writeln!(file, "2025-01-01,BTC,1.0,30000.0,10.0,orange").unwrap();
    writeln!(file, "2025-02-01,XRP,100.0,0.5,0.0,blue").unwrap();
    writeln!(file, "2025-03-01,BTC,0.5,40000.0,,orange").unwrap();
    path
}

fn offline_opts() -> EnrichOptions {
    EnrichOptions {
        offline: true,
        delay_ms: 0,
    }
}

struct NeverSource;

#[async_trait::async_trait]
impl cointrack::pricing::PriceSource for NeverSource {
    async fn price_usd(
        &self,
        coin_id: &str,
    ) -> Result<f64, cointrack::pricing::PriceError> {
        panic!("offline run must not look up {}", coin_id);
    }
}

#[tokio::test]
async fn offline_run_produces_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input_csv(dir.path());

    let raw = read_table(&input).unwrap();
    let records = normalize_headers(&raw);
    validate_schema(&records).unwrap();

    let mut cache = PriceCache::new();
    let enriched = enrich(&records, &NeverSource, &mut cache, &offline_opts())
        .await
        .unwrap();

    // Cost basis populated, price fields empty for every record.
    assert_eq!(enriched.cell(0, COL_COST_BASIS), &Cell::Number(30010.0));
    assert_eq!(enriched.cell(1, COL_COST_BASIS), &Cell::Number(50.0));
    assert_eq!(enriched.cell(2, COL_COST_BASIS), &Cell::Number(20000.0));
    for row in 0..enriched.row_count() {
        assert_eq!(enriched.cell(row, COL_CURRENT_PRICE), &Cell::Empty);
        assert_eq!(enriched.cell(row, COL_POSITION_VALUE), &Cell::Empty);
        assert_eq!(enriched.cell(row, COL_PL_USD), &Cell::Empty);
        assert_eq!(enriched.cell(row, COL_PL_PCT), &Cell::Empty);
    }

    let summary = summarize(&enriched);
    let total_row = summary.row_count() - 1;
    assert_eq!(
        summary.cell(total_row, COL_COIN),
        &Cell::Text(TOTAL_LABEL.to_string())
    );
    assert_eq!(summary.cell(total_row, COL_QUANTITY), &Cell::Number(101.5));

    // Outputs.
    let out_xlsx = dir.path().join("out/Updated_holdings.xlsx");
    write_workbook(&out_xlsx, &enriched, &summary).unwrap();
    assert!(out_xlsx.exists());

    let out_csv = out_xlsx.with_extension("csv");
    write_csv(&out_csv, &enriched).unwrap();
    let back = read_table(&out_csv).unwrap();
    assert_eq!(back.row_count(), enriched.row_count());
    assert_eq!(back.columns(), enriched.columns());

    let db = dir.path().join("holdings.db");
    let loaded = load_holdings(&db, &records).unwrap();
    assert_eq!(loaded, 3);
}

#[tokio::test]
async fn live_run_enriches_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bitcoin": { "usd": 50000.0 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "ripple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ripple": { "usd": 2.0 }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_input_csv(dir.path());
    let records = normalize_headers(&read_table(&input).unwrap());
    validate_schema(&records).unwrap();

    let client = CoinGeckoClient::with_base_url(server.uri()).unwrap();
    let mut cache = PriceCache::new();
    let opts = EnrichOptions {
        offline: false,
        delay_ms: 0,
    };
    let enriched = enrich(&records, &client, &mut cache, &opts).await.unwrap();

    assert_eq!(enriched.cell(0, COL_CURRENT_PRICE), &Cell::Number(50000.0));
    assert_eq!(enriched.cell(0, COL_POSITION_VALUE), &Cell::Number(50000.0));
    assert_eq!(enriched.cell(0, COL_PL_USD), &Cell::Number(19990.0));
    assert_eq!(enriched.cell(1, COL_CURRENT_PRICE), &Cell::Number(2.0));
    assert_eq!(enriched.cell(1, COL_POSITION_VALUE), &Cell::Number(200.0));
    // Second BTC row reuses the cached price.
    assert_eq!(enriched.cell(2, COL_CURRENT_PRICE), &Cell::Number(50000.0));
    assert_eq!(cache.len(), 2);

    // Two assets, so the mock server saw exactly two requests.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[test]
fn missing_required_column_aborts_before_output() {
    let mut raw = Table::new(vec!["Coin".to_string(), "Qty".to_string()]);
    raw.push_row(vec![Cell::from("BTC"), Cell::Number(1.0)]);

    let records = normalize_headers(&raw);
    let err = validate_schema(&records).unwrap_err().to_string();
    assert!(err.contains("Missing required columns"));
    assert!(err.contains("Date of Purchase"));
    assert!(err.contains("Cost per Coin (USD)"));
}

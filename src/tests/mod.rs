use chrono::NaiveDate;

use crate::{
    aggregate, drilldown,
    gateway::{PersistenceGateway, memory, sqlite},
    ingest,
    record::{DiscountScale, FieldName, NumericField},
    warning::WarningReason,
};

mod upload;

pub(crate) struct LocalGateway {
    pub gateway: PersistenceGateway<memory::Client, sqlite::Client>,
    pub db: sqlite::Database,
}

pub(crate) fn local_gateway() -> LocalGateway {
    let db = sqlite::Database::connect_lazy("sqlite::memory:").unwrap();
    let gateway = PersistenceGateway::new(memory::Client::new(), db.client(), "rawdata");
    LocalGateway { gateway, db }
}

pub(crate) async fn load_fixture(path: &str) -> Vec<u8> {
    tokio::fs::read(path).await.unwrap()
}

#[tokio::test]
async fn fixture_pipeline() {
    let payload = load_fixture("src/tests/fixtures/sales.json").await;
    let ingested = ingest::parse_bytes(&payload).unwrap();
    let dataset = &ingested.dataset;

    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.discount_scale(), DiscountScale::Percentage);
    assert_eq!(
        ingested
            .warnings
            .iter()
            .map(|warning| (warning.row_index, warning.field, warning.reason))
            .collect::<Vec<_>>(),
        vec![
            (3, FieldName::Quantity, WarningReason::TypeMismatch),
            (3, FieldName::Date, WarningReason::TypeMismatch),
            (4, FieldName::Category, WarningReason::MissingRequired),
        ]
    );

    let records = dataset.records();
    assert_eq!(records[0].price, Some(399.0));
    assert_eq!(records[0].discount_percentage, Some(64.0));
    assert_eq!(records[1].rating, Some(4.5));
    assert_eq!(records[2].price, Some(1099.0));
    assert_eq!(records[2].discount_percentage, Some(0.5));
    assert_eq!(records[3].quantity, None);
    assert_eq!(records[3].discount_percentage, Some(150.0));
    assert_eq!(records[3].product_name.as_deref(), Some("Vegetable Chopper"));

    let counts = aggregate::count_by_category(dataset);
    assert_eq!(
        counts.into_iter().collect::<Vec<_>>(),
        vec![("Electronics".to_owned(), 2), ("Home&Kitchen".to_owned(), 2)]
    );

    let discounts = aggregate::mean_by_category(dataset, NumericField::DiscountPercentage);
    assert_eq!(
        discounts.into_iter().collect::<Vec<_>>(),
        vec![("Home&Kitchen".to_owned(), 75.25), ("Electronics".to_owned(), 53.5)]
    );

    assert_eq!(
        aggregate::time_series(dataset, NumericField::Revenue),
        vec![
            (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 1996.0),
            (NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), 2198.0),
        ]
    );

    let top = aggregate::top_n(dataset, NumericField::Rating, 3)
        .into_iter()
        .filter_map(|record| record.product_name.as_deref())
        .collect::<Vec<_>>();
    assert_eq!(
        top,
        vec!["Unlabelled Gadget", "Wireless Mouse", "USB-C Cable 1m"]
    );

    let summary = drilldown::summarize(dataset, "Home&Kitchen").unwrap();
    assert_eq!(summary.total_products, 2);
    assert_eq!(summary.average_discount, Some(75.25));
    assert_eq!(summary.average_rating, Some(3.9));
    assert_eq!(summary.top_rated.len(), 1);
}

#[test]
fn single_object_payload_is_rejected() {
    let result = ingest::parse_bytes(br#"{"category": "A", "product_name": "x"}"#);
    assert!(matches!(
        result,
        Err(ingest::MalformedPayload::NotASequence("object"))
    ));
}

use crate::adapters::catalog::{parse_snapshot, InMemoryCatalog};
use crate::core::aggregate::build_aggregate;
use crate::core::report::{build_report, ReportOptions};
use crate::core::{CatalogSnapshot, ConfigProvider, ContributionReport, OrderSource, Pipeline, Storage};
use crate::utils::error::{ContributionError, Result};
use chrono::Utc;
use std::path::Path;

pub const CSV_REPORT_FILE: &str = "contributions.csv";
pub const JSON_REPORT_FILE: &str = "contributions.json";

pub struct ContributionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ContributionPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn report_options(&self) -> ReportOptions {
        ReportOptions {
            currency: self.config.currency().to_string(),
            include_unassigned: self.config.include_unassigned(),
        }
    }
}

pub fn render_csv(report: &ContributionReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &report.rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ContributionError::ProcessingError {
            message: format!("Failed to finish CSV output: {}", e),
        })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ContributionPipeline<S, C> {
    async fn extract(&self) -> Result<CatalogSnapshot> {
        tracing::debug!("Reading snapshot from: {}", self.config.snapshot_path());
        let data = self.storage.read_file(self.config.snapshot_path()).await?;
        parse_snapshot(&data)
    }

    async fn transform(&self, snapshot: CatalogSnapshot) -> Result<ContributionReport> {
        let catalog = InMemoryCatalog::new(snapshot);
        let orders = catalog.fetch_completed_orders()?;

        let aggregate = build_aggregate(&orders, &catalog, self.config.minor_units())?;

        Ok(build_report(
            &aggregate,
            &catalog,
            &self.report_options(),
            orders.len(),
            Utc::now(),
        ))
    }

    async fn load(&self, report: ContributionReport) -> Result<String> {
        for format in self.config.output_formats() {
            let (file_name, data) = match format.as_str() {
                "csv" => (CSV_REPORT_FILE, render_csv(&report)?),
                "json" => (JSON_REPORT_FILE, serde_json::to_vec_pretty(&report)?),
                other => {
                    return Err(ContributionError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            };

            let target = Path::new(self.config.output_path()).join(file_name);
            tracing::debug!("Writing {} ({} bytes)", target.display(), data.len());
            self.storage
                .write_file(&target.to_string_lossy(), &data)
                .await?;
        }

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FoundationId;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let files = HashMap::from([(path.to_string(), data.as_bytes().to_vec())]);
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ContributionError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct TestConfig {
        formats: Vec<String>,
        include_unassigned: bool,
    }

    impl ConfigProvider for TestConfig {
        fn snapshot_path(&self) -> &str {
            "snapshot.json"
        }

        fn output_path(&self) -> &str {
            "./reports"
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn currency(&self) -> &str {
            "EUR"
        }

        fn minor_units(&self) -> u32 {
            2
        }

        fn include_unassigned(&self) -> bool {
            self.include_unassigned
        }
    }

    const SNAPSHOT: &str = r#"{
        "products": [
            {"id": 1, "name": "Tote bag", "price": "50.00", "cost_basis": "20.00", "foundation": 1},
            {"id": 2, "name": "Donation ticket", "price": "30.00", "contribute_all": true, "foundation": 1},
            {"id": 3, "name": "Sticker", "price": "4.00", "category": 9}
        ],
        "categories": [{"id": 9, "name": "Stationery", "default_cost": "1.50"}],
        "foundations": [{"id": 1, "name": "River Trust"}],
        "orders": [
            {"id": 1, "status": "completed", "items": [{"product_id": 1, "unit_price": "50.00", "quantity": 2}]},
            {"id": 2, "status": "completed", "items": [{"product_id": 1, "unit_price": "50.00", "quantity": 3}]},
            {"id": 3, "status": "completed", "items": [
                {"product_id": 2, "unit_price": "30.00", "quantity": 1},
                {"product_id": 3, "unit_price": "4.00", "quantity": 2}
            ]},
            {"id": 4, "status": "cancelled", "items": [{"product_id": 1, "unit_price": "50.00", "quantity": 10}]}
        ]
    }"#;

    fn pipeline(formats: &[&str], include_unassigned: bool) -> ContributionPipeline<MockStorage, TestConfig> {
        let storage = MockStorage::with_file("snapshot.json", SNAPSHOT);
        let config = TestConfig {
            formats: formats.iter().map(|f| f.to_string()).collect(),
            include_unassigned,
        };
        ContributionPipeline::new(storage, config)
    }

    #[tokio::test]
    async fn test_transform_aggregates_completed_orders_only() {
        let pipeline = pipeline(&["json"], true);

        let snapshot = pipeline.extract().await.unwrap();
        let report = pipeline.transform(snapshot).await.unwrap();

        assert_eq!(report.orders_considered, 3);
        let river = report
            .foundations
            .iter()
            .find(|f| f.foundation_id == FoundationId(1))
            .unwrap();
        assert_eq!(river.total, dec!(180.00));
        assert_eq!(river.products, 2);
        assert_eq!(report.unassigned_total, dec!(5.00));
        assert_eq!(report.total, dec!(185.00));
    }

    #[tokio::test]
    async fn test_load_writes_requested_formats() {
        let pipeline = pipeline(&["csv", "json"], false);

        let snapshot = pipeline.extract().await.unwrap();
        let report = pipeline.transform(snapshot).await.unwrap();
        let output = pipeline.load(report).await.unwrap();

        assert_eq!(output, "./reports");

        let csv = String::from_utf8(pipeline.storage.get_file("./reports/contributions.csv").await.unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "foundation_id,foundation_name,product_id,product_name,contribution"
        );
        assert_eq!(lines.count(), 2);
        assert!(csv.contains("River Trust,1,Tote bag,150.00"));
        assert!(!csv.contains("Sticker"));

        let json = pipeline.storage.get_file("./reports/contributions.json").await.unwrap();
        let parsed: ContributionReport = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed.total, dec!(180.00));
        assert_eq!(parsed.currency, "EUR");
    }

    #[tokio::test]
    async fn test_missing_snapshot_surfaces_io_error() {
        let pipeline = ContributionPipeline::new(
            MockStorage::with_file("other.json", "{}"),
            TestConfig {
                formats: vec!["csv".to_string()],
                include_unassigned: true,
            },
        );

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ContributionError::IoError(_)));
    }

    #[tokio::test]
    async fn test_unknown_product_aborts_transform() {
        let snapshot = r#"{
            "products": [{"id": 1, "price": "5.00"}],
            "orders": [{"id": 8, "status": "completed",
                        "items": [{"product_id": 2, "unit_price": "5.00", "quantity": 1}]}]
        }"#;
        let pipeline = ContributionPipeline::new(
            MockStorage::with_file("snapshot.json", snapshot),
            TestConfig {
                formats: vec!["csv".to_string()],
                include_unassigned: true,
            },
        );

        let snapshot = pipeline.extract().await.unwrap();
        let err = pipeline.transform(snapshot).await.unwrap_err();

        assert!(matches!(err, ContributionError::UnknownProduct { .. }));
    }
}

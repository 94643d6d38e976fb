use crate::Args;
use cooperative::{
    Delivery, EnforceConfig, Journal, JournalEntry, MemoryStore, ProductTotals, enforce_delivery,
};
use eyre::{Context, Result, eyre};
use serde::de::DeserializeOwned;
use std::{fs, path::Path};

pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let data = fs::read_to_string(&path).with_context(|| eyre!("{}", path.as_ref().display()))?;
    let out = serde_json::from_str(&data)
        .with_context(|| eyre!("invalid JSON in {}", path.as_ref().display()))?;
    Ok(out)
}

/// Product which was ordered beyond its limit
#[derive(Debug)]
pub struct Shortage {
    pub name: String,
    pub totals: ProductTotals,
    pub adjusted: usize,
}

/// Result of regulating a delivery
#[derive(Debug)]
pub struct Outcome {
    pub delivery: Delivery,
    pub shortages: Vec<Shortage>,
    pub journal: Vec<JournalEntry>,
}

impl Outcome {
    pub fn report(&self) -> Vec<String> {
        if self.shortages.is_empty() {
            return vec!["No product was ordered beyond its limit".to_string()];
        }

        let mut lines = Vec::new();
        for s in &self.shortages {
            lines.push(format!(
                "{}: ordered {}, limit {}, short by {}, {} purchase(s) adjusted",
                s.name,
                s.totals.ordered,
                s.totals.limit.unwrap_or_default(),
                s.totals.shortage(),
                s.adjusted
            ));
        }
        lines.extend(self.journal.iter().map(|entry| format!("  {entry}")));
        lines
    }
}

/// Enforces the quantity limit of every product of the delivery
pub fn regulate(delivery: Delivery, config: &EnforceConfig) -> Result<Outcome> {
    let before: Vec<_> = delivery
        .products
        .iter()
        .filter_map(|pd| Some((pd.id, pd.name.clone(), delivery.totals(pd.id)?)))
        .collect();

    let mut store = MemoryStore::from_delivery(delivery)?;
    let mut journal = Journal::with_capacity(config.journal_capacity);

    let products = store.product_ids();
    let changed = enforce_delivery(&mut store, &mut journal, &products, config)?;

    let shortages = before
        .into_iter()
        .filter(|(_, _, totals)| totals.is_scarce())
        .map(|(id, name, totals)| Shortage {
            name,
            totals,
            adjusted: changed.get(&id).map_or(0, Vec::len),
        })
        .collect();

    Ok(Outcome {
        delivery: store.to_delivery(),
        shortages,
        journal: journal.drain().collect(),
    })
}

/// Regulates the delivery given on the command line and writes the adjusted snapshot.
///
/// Returns the snapshot as JSON if it should go to stdout, `None` if it was written to the output
/// file or on a dry run.
pub fn execute(args: &Args) -> Result<Option<String>> {
    let config = args.enforce_config()?;
    let delivery: Delivery = load_json(&args.delivery)?;

    log::info!("Regulating delivery '{}'", delivery.name);

    let outcome = regulate(delivery, &config)?;

    for line in outcome.report() {
        log::info!("{line}");
    }

    if args.dry_run {
        return Ok(None);
    }

    let json = serde_json::to_string_pretty(&outcome.delivery)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| eyre!("{}", path.display()))?;
            log::info!("Adjusted delivery written to {}", path.display());
            Ok(None)
        }
        None => Ok(Some(json)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;
    use cooperative::ProductId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const DELIVERY: &str = r#"{
        "id": 12,
        "name": "week 12",
        "products": [
            { "id": 1, "name": "eggs", "unit": "box", "price": "2.4", "quantity_limit": "10" },
            { "id": 2, "name": "bread", "price": "3.1" }
        ],
        "purchases": [
            { "user": 1, "product": 1, "quantity": "5" },
            { "user": 2, "product": 1, "quantity": "5" },
            { "user": 3, "product": 1, "quantity": "5" },
            { "user": 1, "product": 2, "quantity": "2" }
        ]
    }"#;

    #[test]
    fn test_regulate() {
        let delivery: Delivery = serde_json::from_str(DELIVERY).unwrap();
        let outcome = regulate(delivery, &EnforceConfig::default()).unwrap();

        assert_eq!(outcome.shortages.len(), 1);
        assert_eq!(outcome.shortages[0].name, "eggs");
        assert_eq!(outcome.shortages[0].adjusted, 3);
        assert_eq!(outcome.journal.len(), 3);

        let totals = outcome.delivery.totals(ProductId(1)).unwrap();
        assert_eq!(totals.ordered, dec!(10));

        let report = outcome.report();
        println!("{}", report.join("\n"));
        assert_eq!(report[0], "eggs: ordered 15, limit 10, short by 5, 3 purchase(s) adjusted");
        assert_eq!(report.len(), 4);
    }

    #[test]
    fn test_regulate_nothing_to_do() {
        let mut delivery: Delivery = serde_json::from_str(DELIVERY).unwrap();
        delivery.products[0].quantity_limit = Some(Decimal::from(20));

        let outcome = regulate(delivery.clone(), &EnforceConfig::default()).unwrap();
        assert!(outcome.shortages.is_empty());
        assert!(outcome.journal.is_empty());
        assert_eq!(outcome.delivery.purchases, delivery.purchases);
        assert_eq!(
            outcome.report(),
            vec!["No product was ordered beyond its limit".to_string()]
        );
    }

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("regulate-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args(dir: &Path, extra: &[&str]) -> Args {
        let delivery = dir.join("delivery.json");
        fs::write(&delivery, DELIVERY).unwrap();
        let mut argv = vec!["regulate".to_string(), delivery.display().to_string()];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_execute_writes_output() {
        let dir = scratch("output");
        let output = dir.join("adjusted.json");
        let args = args(&dir, &["--output", output.to_str().unwrap()]);

        assert_eq!(execute(&args).unwrap(), None);

        let adjusted: Delivery = load_json(&output).unwrap();
        assert_eq!(adjusted.totals(ProductId(1)).unwrap().ordered, dec!(10));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_execute_stdout() {
        let dir = scratch("stdout");
        let json = execute(&args(&dir, &[])).unwrap().unwrap();
        let adjusted: Delivery = serde_json::from_str(&json).unwrap();
        assert_eq!(adjusted.totals(ProductId(1)).unwrap().ordered, dec!(10));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_execute_dry_run() {
        let dir = scratch("dry-run");
        let output = dir.join("adjusted.json");
        let args = args(&dir, &["--dry-run", "-o", output.to_str().unwrap()]);

        assert_eq!(execute(&args).unwrap(), None);
        assert!(!output.exists());

        // The input snapshot is left alone
        let delivery: Delivery = load_json(&args.delivery).unwrap();
        assert_eq!(delivery.totals(ProductId(1)).unwrap().ordered, dec!(15));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_execute_with_config_file() {
        let dir = scratch("config");
        let config = dir.join("enforce.json");
        fs::write(&config, r#"{ "zero_grant": "keep", "journal_capacity": 500 }"#).unwrap();

        let mut args = args(&dir, &["--config", config.to_str().unwrap()]);
        // Three users ask for 5 eggs each, only one egg box is left
        let mut delivery: Delivery = load_json(&args.delivery).unwrap();
        delivery.products[0].quantity_limit = Some(dec!(1));
        fs::write(&args.delivery, serde_json::to_string(&delivery).unwrap()).unwrap();

        let json = execute(&args).unwrap().unwrap();
        let adjusted: Delivery = serde_json::from_str(&json).unwrap();
        let eggs: Vec<_> = adjusted
            .purchases
            .iter()
            .filter(|pc| pc.product == ProductId(1))
            .map(|pc| pc.quantity)
            .collect();
        assert_eq!(eggs, vec![dec!(1), dec!(0), dec!(0)]);

        fs::write(&config, "{ not json").unwrap();
        assert!(execute(&args).is_err());

        args.config = Some(dir.join("missing.json"));
        assert!(execute(&args).is_err());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_load_json_missing_file() {
        let err = load_json::<Delivery, _>("/nonexistent/delivery.json").unwrap_err();
        assert!(format!("{err:?}").contains("/nonexistent/delivery.json"));
    }
}

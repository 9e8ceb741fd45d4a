//! Synthetic legacy batch generator

use super::{names, Stage};
use crate::codec::encode_delimited;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::storage::ObjectStorage;
use arrow::array::{ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

const STORES: [&str; 4] = ["New York", "London", "Tokyo", "Paris"];
const CATEGORIES: [&str; 4] = ["Electronics", "Clothing", "Home", "Books"];
const PAYMENT_STATUSES: [&str; 3] = ["Paid", "Pending", "Failed"];
const RETURN_FLAGS: [&str; 2] = ["Yes", "No"];

fn pick<'a, R: Rng>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values[rng.gen_range(0..values.len())]
}

fn column<R, F>(rng: &mut R, rows: usize, mut value: F) -> ArrayRef
where
    R: Rng,
    F: FnMut(&mut R) -> String,
{
    let values: Vec<String> = (0..rows).map(|_| value(rng)).collect();
    Arc::new(StringArray::from(values))
}

/// Build one batch of random legacy transactions
///
/// Every column is text, as it appears in a legacy file. Dates fall within
/// the year before `today`.
pub fn generate_batch<R: Rng>(rng: &mut R, rows: usize, today: NaiveDate) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        column(rng, rows, |r| format!("TXN-{}", r.gen_range(10_000..=99_999))),
        column(rng, rows, |r| format!("CUST-{}", r.gen_range(1_000..=9_999))),
        column(rng, rows, |r| format!("Customer_{}", r.gen_range(1..=100))),
        column(rng, rows, |r| format!("user{}@example.com", r.gen_range(1..=100))),
        column(rng, rows, |r| r.gen_range(18..90).to_string()),
        column(rng, rows, |r| pick(r, &STORES).to_string()),
        column(rng, rows, |r| pick(r, &CATEGORIES).to_string()),
        column(rng, rows, |r| format!("{:.2}", r.gen_range(10.0..500.0))),
        column(rng, rows, |r| r.gen_range(1..10).to_string()),
        column(rng, rows, |r| format!("{:.2}", r.gen_range(0.0..0.3))),
        column(rng, rows, |r| format!("{:.2}", r.gen_range(1.0..50.0))),
        column(rng, rows, |r| format!("{:.2}", r.gen_range(10.0..1000.0))),
        column(rng, rows, |r| {
            let date = today - Duration::days(r.gen_range(0..=365));
            date.format("%Y-%m-%d").to_string()
        }),
        column(rng, rows, |r| pick(r, &PAYMENT_STATUSES).to_string()),
        column(rng, rows, |r| pick(r, &RETURN_FLAGS).to_string()),
    ];

    Ok(RecordBatch::try_new(
        Schema::legacy_transactions().raw_arrow_schema(),
        columns,
    )?)
}

/// Writes synthetic legacy files into the landing zone
pub struct Generator {
    storage: ObjectStorage,
    landing_prefix: String,
    landing_suffix: String,
    files_per_batch: usize,
    rows_per_file: usize,
    rng: Arc<Mutex<StdRng>>,
    last_stamp: AtomicI64,
}

impl Generator {
    /// Create a generator from the pipeline config
    ///
    /// A configured seed makes the generated values reproducible; file
    /// names always carry the current Unix time.
    pub fn new(config: &PipelineConfig, storage: ObjectStorage) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            storage,
            landing_prefix: config.landing_prefix.clone(),
            landing_suffix: config.landing_suffix.clone(),
            files_per_batch: config.files_per_batch,
            rows_per_file: config.rows_per_file,
            rng: Arc::new(Mutex::new(rng)),
            last_stamp: AtomicI64::new(i64::MIN),
        }
    }

    /// Landing key of the `index`-th file of a batch
    pub fn key_for(&self, unix_secs: i64, index: usize) -> String {
        format!(
            "{}batch_{unix_secs}_{index}{}",
            self.landing_prefix, self.landing_suffix
        )
    }

    /// Unix seconds for the next batch; never repeats within one generator
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp();
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or(now);
        now.max(previous.saturating_add(1))
    }

    /// Build and encode one file off the async workers
    async fn build_payload(&self) -> Result<Vec<u8>> {
        let rng = Arc::clone(&self.rng);
        let rows = self.rows_per_file;

        tokio::task::spawn_blocking(move || {
            let mut rng = rng
                .lock()
                .map_err(|_| Error::Other("generator random state poisoned".to_string()))?;
            let batch = generate_batch(&mut *rng, rows, Utc::now().date_naive())?;
            encode_delimited(&batch)
        })
        .await
        .map_err(|e| Error::stage_failed(names::GENERATE, format!("batch builder stopped: {e}")))?
    }

    /// Write one batch of files; returns the keys written
    #[tracing::instrument(skip(self), fields(files = self.files_per_batch, rows = self.rows_per_file))]
    pub async fn generate(&self) -> Result<Vec<String>> {
        tracing::info!(
            "Generating {} legacy {} files...",
            self.files_per_batch,
            self.landing_suffix
        );

        let stamp = self.next_stamp();
        let mut keys = Vec::with_capacity(self.files_per_batch);
        for i in 0..self.files_per_batch {
            let payload = self.build_payload().await?;

            let key = self.key_for(stamp, i);
            self.storage.put(&key, Bytes::from(payload)).await?;
            tracing::info!("Uploaded: {key}");
            keys.push(key);
        }

        Ok(keys)
    }
}

#[async_trait]
impl Stage for Generator {
    fn name(&self) -> &str {
        names::GENERATE
    }

    async fn run(&self) -> Result<()> {
        self.generate().await.map(|_| ())
    }
}

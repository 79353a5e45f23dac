use crate::core::{Pair, Quote, QuoteId, QuoteStore};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PAIRS: &str = "pairs";
const QUOTES: &str = "quotes";
const HISTORY: &str = "history";

/// Quote store persisted in a fjall keyspace.
///
/// Partitions:
/// - `pairs`: `BASE/TARGET` -> JSON pair
/// - `quotes`: quote id bytes -> JSON quote
/// - `history`: `BASE/TARGET/<observed micros>/<id>` -> quote id bytes
///
/// History keys sort by observation time and then by the time-ordered id, so
/// the last key under a pair prefix is the latest quote.
#[derive(Clone)]
pub struct FjallQuoteStore {
    keyspace: Keyspace,
    pairs: PartitionHandle,
    quotes: PartitionHandle,
    history: PartitionHandle,
}

impl FjallQuoteStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = Config::new(path.join("quotes_db"))
            .open()
            .with_context(|| format!("Failed to open quote store at {}", path.display()))?;
        let pairs = keyspace.open_partition(PAIRS, PartitionCreateOptions::default())?;
        let quotes = keyspace.open_partition(QUOTES, PartitionCreateOptions::default())?;
        let history = keyspace.open_partition(HISTORY, PartitionCreateOptions::default())?;
        debug!(path = %path.display(), "Opened quote store");

        Ok(Self {
            keyspace,
            pairs,
            quotes,
            history,
        })
    }

    fn pair_key(pair: &Pair) -> String {
        pair.to_string()
    }

    fn history_prefix(pair: &Pair) -> String {
        format!("{pair}/")
    }

    fn history_key(quote: &Quote) -> Result<String> {
        let micros = u64::try_from(quote.observed_at.timestamp_micros())
            .map_err(|_| anyhow!("Quote {} predates the unix epoch", quote.id))?;
        Ok(format!(
            "{}{micros:020}/{}",
            Self::history_prefix(&quote.pair),
            quote.id
        ))
    }

    /// fjall calls block on disk I/O, so they run on the blocking pool where
    /// callers can time them out.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&FjallQuoteStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .context("Quote store task failed")?
    }

    fn register(&self, pair: &Pair) -> Result<()> {
        let key = Self::pair_key(pair);
        // Same key and value for every writer, so a racing insert is harmless
        if self.pairs.contains_key(&key)? {
            return Ok(());
        }
        self.pairs.insert(key.as_str(), serde_json::to_vec(pair)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(%pair, "Registered pair");
        Ok(())
    }

    fn registered(&self) -> Result<Vec<Pair>> {
        self.pairs
            .iter()
            .map(|item| {
                let (key, value) = item?;
                serde_json::from_slice(&value).with_context(|| {
                    format!("Corrupt pair record: {}", String::from_utf8_lossy(&key))
                })
            })
            .collect()
    }

    fn write_quote(&self, quote: &Quote) -> Result<()> {
        let id_key: &[u8] = quote.id.as_uuid().as_bytes();
        if self.quotes.contains_key(id_key)? {
            anyhow::bail!("Quote {} already exists", quote.id);
        }

        let mut batch = self.keyspace.batch();
        batch.insert(&self.quotes, id_key, serde_json::to_vec(quote)?);
        batch.insert(&self.history, Self::history_key(quote)?, id_key);
        batch.commit()?;
        self.keyspace.persist(PersistMode::SyncAll)?;

        debug!(quote_id = %quote.id, pair = %quote.pair, "Stored quote");
        Ok(())
    }

    fn read_quote(&self, id: QuoteId) -> Result<Option<Quote>> {
        match self.quotes.get(&id.as_uuid().as_bytes()[..])? {
            Some(value) => Ok(Some(
                serde_json::from_slice(&value)
                    .with_context(|| format!("Corrupt quote record: {id}"))?,
            )),
            None => Ok(None),
        }
    }

    fn latest(&self, pair: &Pair) -> Result<Option<Quote>> {
        let Some(item) = self.history.prefix(Self::history_prefix(pair)).next_back() else {
            return Ok(None);
        };
        let (_, id_bytes) = item?;
        let id = uuid::Uuid::from_slice(&id_bytes)
            .with_context(|| format!("Corrupt history entry for {pair}"))?;

        let quote = self
            .read_quote(id.into())?
            .ok_or_else(|| anyhow!("History for {pair} points at missing quote {id}"))?;
        Ok(Some(quote))
    }
}


#[async_trait]
impl QuoteStore for FjallQuoteStore {
    async fn ensure_pair_registered(&self, pair: &Pair) -> Result<()> {
        let pair = pair.clone();
        self.blocking(move |store| store.register(&pair)).await
    }

    async fn list_registered_pairs(&self) -> Result<Vec<Pair>> {
        self.blocking(|store| store.registered()).await
    }

    async fn insert_quote(&self, quote: &Quote) -> Result<()> {
        let quote = quote.clone();
        self.blocking(move |store| store.write_quote(&quote)).await
    }

    async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>> {
        self.blocking(move |store| store.read_quote(id)).await
    }

    async fn get_latest_quote(&self, pair: &Pair) -> Result<Option<Quote>> {
        let pair = pair.clone();
        self.blocking(move |store| store.latest(&pair)).await
    }
}

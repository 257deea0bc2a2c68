use super::evaluator::{compute_facets, extract, sort_documents, Matcher};
use super::InMemoryClientConfig;
use crate::client::{
    ClientConfig, DatabaseClient, DocumentWrite, SearchRequest, SearchResponse, StoreError,
    StoreFailure, StoreResult, StoredDocument, TransactionHandle, CODE_CONFLICTING_UPDATES,
    CODE_CONTENT_EXISTS, CODE_LIMIT_EXCEEDED, CODE_NO_TRANSACTION, CODE_NO_TRANSFORM,
};
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A server-side content transform applied to each search result.
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

enum PendingWrite {
    Put(StoredDocument),
    Delete,
}

struct OpenTransaction {
    handle: TransactionHandle,
    expires_at: DateTime<Utc>,
    writes: IndexMap<String, PendingWrite>,
}

impl OpenTransaction {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// A document store held entirely in process memory.
///
/// # Purpose
/// `InMemoryClient` implements [`DatabaseClient`] with the same observable
/// behavior as a remote server: multi-statement transactions with
/// per-transaction overlays, URI write locks, transaction timeouts, string and
/// structured queries, facets, extraction and named transforms. Failures are
/// reported with the same message codes a server would send.
///
/// # Characteristics
/// - **Thread-Safe**: clones share one store and can be used from any thread
/// - **Isolated**: uncommitted writes are only visible inside their transaction
/// - **Controllable**: can be taken offline or told to fail the next request
///
/// # Usage
/// ```text
/// let client = InMemoryClient::new();
/// let handle = client.open_transaction(Some("import"), Duration::from_secs(30))?;
/// client.write(Some(&handle), DocumentWrite::upsert("/a.json", json!({}), vec![]))?;
/// client.commit(&handle)?;
/// ```
#[derive(Clone)]
pub struct InMemoryClient {
    inner: Arc<InMemoryClientInner>,
}

impl InMemoryClient {
    pub fn new() -> InMemoryClient {
        InMemoryClient::with_config(InMemoryClientConfig::default())
    }

    pub fn with_config(config: InMemoryClientConfig) -> InMemoryClient {
        InMemoryClient {
            inner: Arc::new(InMemoryClientInner::new(config)),
        }
    }

    /// Simulates losing (or regaining) the connection to the server.
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
    }

    /// Makes the next request fail with `error`.
    pub fn fail_next(&self, error: StoreError) {
        self.inner.injected.write_with(|slot| *slot = Some(error));
    }

    /// Installs a named transform that searches can request.
    pub fn register_transform<F>(&self, name: &str, transform: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let transform: Transform = Arc::new(transform);
        self.inner
            .transforms
            .write_with(|transforms| transforms.insert(name.to_string(), transform));
    }

    /// Number of transactions ever opened through this client.
    pub fn transactions_opened(&self) -> u64 {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Number of transactions currently open and not yet expired.
    pub fn open_transaction_count(&self) -> usize {
        self.inner.purge_expired();
        self.inner.transactions.len()
    }

    /// Number of committed documents.
    pub fn document_count(&self) -> usize {
        self.inner.documents.read_with(|documents| documents.len())
    }
}

impl Default for InMemoryClient {
    fn default() -> Self {
        InMemoryClient::new()
    }
}

impl DatabaseClient for InMemoryClient {
    fn config(&self) -> &ClientConfig {
        self.inner.config.connection()
    }

    fn open_transaction(
        &self,
        name: Option<&str>,
        timeout: Duration,
    ) -> StoreResult<TransactionHandle> {
        self.inner.open_transaction(name, timeout)
    }

    fn commit(&self, transaction: &TransactionHandle) -> StoreResult<()> {
        self.inner.commit(transaction)
    }

    fn rollback(&self, transaction: &TransactionHandle) -> StoreResult<()> {
        self.inner.rollback(transaction)
    }

    fn write(
        &self,
        transaction: Option<&TransactionHandle>,
        document: DocumentWrite,
    ) -> StoreResult<String> {
        self.inner.write(transaction, document)
    }

    fn read(
        &self,
        transaction: Option<&TransactionHandle>,
        uri: &str,
    ) -> StoreResult<Option<StoredDocument>> {
        self.inner.read(transaction, uri)
    }

    fn delete(&self, transaction: Option<&TransactionHandle>, uri: &str) -> StoreResult<bool> {
        self.inner.delete(transaction, uri)
    }

    fn delete_collections(
        &self,
        transaction: Option<&TransactionHandle>,
        collections: &[String],
    ) -> StoreResult<u64> {
        self.inner.delete_collections(transaction, collections)
    }

    fn search(
        &self,
        transaction: Option<&TransactionHandle>,
        request: &SearchRequest,
    ) -> StoreResult<SearchResponse> {
        self.inner.search(transaction, request)
    }
}

struct InMemoryClientInner {
    config: InMemoryClientConfig,
    documents: Atomic<IndexMap<String, StoredDocument>>,
    transactions: DashMap<String, OpenTransaction>,
    // uri -> id of the transaction holding its write lock
    uri_locks: DashMap<String, String>,
    transforms: Atomic<HashMap<String, Transform>>,
    injected: Atomic<Option<StoreError>>,
    online: AtomicBool,
    opened: AtomicU64,
}

impl InMemoryClientInner {
    fn new(config: InMemoryClientConfig) -> InMemoryClientInner {
        InMemoryClientInner {
            config,
            documents: atomic(IndexMap::new()),
            transactions: DashMap::new(),
            uri_locks: DashMap::new(),
            transforms: atomic(HashMap::new()),
            injected: atomic(None),
            online: AtomicBool::new(true),
            opened: AtomicU64::new(0),
        }
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if !self.online.load(Ordering::SeqCst) {
            log::error!("Cannot reach document store at {}", self.config.connection());
            return Err(StoreError::new(
                StoreFailure::Connection,
                format!("Connection refused: {}", self.config.connection()),
            ));
        }
        match self.injected.write_with(|slot| slot.take()) {
            Some(error) => {
                log::error!("Injected store failure: {}", error);
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn open_transaction(
        &self,
        name: Option<&str>,
        timeout: Duration,
    ) -> StoreResult<TransactionHandle> {
        self.ensure_available()?;
        self.purge_expired();

        if let Some(limit) = self.config.transaction_limit() {
            if self.transactions.len() >= limit {
                log::error!("Open transaction limit {} reached", limit);
                return Err(StoreError::with_code(
                    CODE_LIMIT_EXCEEDED,
                    format!("Too many open transactions (limit {})", limit),
                ));
            }
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        let handle = TransactionHandle::new(id.clone(), name.map(str::to_string), timeout);
        let now = Utc::now();
        let expires_at = TimeDelta::from_std(timeout)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.transactions.insert(
            id,
            OpenTransaction {
                handle: handle.clone(),
                expires_at,
                writes: IndexMap::new(),
            },
        );
        self.opened.fetch_add(1, Ordering::SeqCst);
        log::debug!("Opened transaction {} with timeout {:?}", handle, timeout);
        Ok(handle)
    }

    fn commit(&self, handle: &TransactionHandle) -> StoreResult<()> {
        self.ensure_available()?;
        let transaction = self.finish(handle)?;
        let count = transaction.writes.len();
        self.documents.write_with(|documents| {
            for (uri, write) in transaction.writes {
                match write {
                    PendingWrite::Put(document) => {
                        documents.insert(uri, document);
                    }
                    PendingWrite::Delete => {
                        documents.shift_remove(&uri);
                    }
                }
            }
        });
        log::debug!("Committed transaction {} ({} writes)", transaction.handle, count);
        Ok(())
    }

    fn rollback(&self, handle: &TransactionHandle) -> StoreResult<()> {
        self.ensure_available()?;
        let transaction = self.finish(handle)?;
        log::debug!(
            "Rolled back transaction {} ({} writes discarded)",
            transaction.handle,
            transaction.writes.len()
        );
        Ok(())
    }

    /// Removes a live transaction and releases its locks.
    fn finish(&self, handle: &TransactionHandle) -> StoreResult<OpenTransaction> {
        match self.discard(handle.id()) {
            Some(transaction) if !transaction.is_expired() => Ok(transaction),
            _ => Err(no_transaction(handle)),
        }
    }

    fn discard(&self, id: &str) -> Option<OpenTransaction> {
        let (_, transaction) = self.transactions.remove(id)?;
        self.uri_locks.retain(|_, owner| owner != id);
        Some(transaction)
    }

    fn purge_expired(&self) {
        let expired: Vec<String> = self
            .transactions
            .iter()
            .filter(|entry| entry.is_expired())
            .map(|entry| entry.key().clone())
            .collect();
        for id in expired {
            if self.discard(&id).is_some() {
                log::warn!("Transaction {} timed out and was rolled back", id);
            }
        }
    }

    /// Runs `f` against a live transaction; an expired one is rolled back and
    /// reported as missing.
    fn with_transaction<R>(
        &self,
        handle: &TransactionHandle,
        f: impl FnOnce(&mut OpenTransaction) -> StoreResult<R>,
    ) -> StoreResult<R> {
        match self.transactions.get_mut(handle.id()) {
            None => return Err(no_transaction(handle)),
            Some(mut transaction) => {
                if !transaction.is_expired() {
                    return f(transaction.value_mut());
                }
            }
        }

        if self.discard(handle.id()).is_some() {
            log::warn!("Transaction {} timed out and was rolled back", handle);
        }
        Err(no_transaction(handle))
    }

    /// Takes the write lock on `uri` for `transaction`. Returns whether the
    /// lock was newly taken.
    fn lock_uri(&self, transaction: &OpenTransaction, uri: &str) -> StoreResult<bool> {
        let id = transaction.handle.id();
        match self.uri_locks.entry(uri.to_string()) {
            Entry::Occupied(owner) if owner.get() != id => Err(conflict(uri)),
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(true)
            }
        }
    }

    /// Locks every uri or none of them: locks newly taken here are released
    /// when a later uri conflicts.
    fn lock_all(&self, transaction: &OpenTransaction, uris: &[String]) -> StoreResult<()> {
        let id = transaction.handle.id();
        let mut taken = Vec::new();
        for uri in uris {
            match self.lock_uri(transaction, uri) {
                Ok(true) => taken.push(uri),
                Ok(false) => {}
                Err(err) => {
                    for uri in taken {
                        self.uri_locks.remove_if(uri, |_, owner| owner == id);
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn ensure_unlocked(&self, uri: &str) -> StoreResult<()> {
        if self.uri_locks.contains_key(uri) {
            return Err(conflict(uri));
        }
        Ok(())
    }

    fn visible(&self, transaction: &OpenTransaction, uri: &str) -> Option<StoredDocument> {
        match transaction.writes.get(uri) {
            Some(PendingWrite::Put(document)) => Some(document.clone()),
            Some(PendingWrite::Delete) => None,
            None => self.documents.read_with(|documents| documents.get(uri).cloned()),
        }
    }

    /// Committed documents with the transaction's pending writes laid over
    /// them, in insertion order.
    fn snapshot(&self, transaction: Option<&OpenTransaction>) -> Vec<StoredDocument> {
        let mut view = self.documents.read_with(|documents| documents.clone());
        if let Some(transaction) = transaction {
            for (uri, write) in &transaction.writes {
                match write {
                    PendingWrite::Put(document) => {
                        view.insert(uri.clone(), document.clone());
                    }
                    PendingWrite::Delete => {
                        view.shift_remove(uri);
                    }
                }
            }
        }
        view.into_values().collect()
    }

    fn write(
        &self,
        handle: Option<&TransactionHandle>,
        document: DocumentWrite,
    ) -> StoreResult<String> {
        self.ensure_available()?;
        let uri = document.uri.clone();
        match handle {
            Some(handle) => self.with_transaction(handle, |transaction| {
                if !document.overwrite && self.visible(transaction, &uri).is_some() {
                    return Err(content_exists(&uri));
                }
                self.lock_uri(transaction, &uri)?;
                transaction
                    .writes
                    .insert(uri.clone(), PendingWrite::Put(document.into_stored()));
                Ok(())
            })?,
            None => {
                self.ensure_unlocked(&uri)?;
                self.documents.write_with(|documents| {
                    if !document.overwrite && documents.contains_key(&uri) {
                        return Err(content_exists(&uri));
                    }
                    documents.insert(uri.clone(), document.into_stored());
                    Ok(())
                })?
            }
        }
        log::debug!("Wrote {}", uri);
        Ok(uri)
    }

    fn read(
        &self,
        handle: Option<&TransactionHandle>,
        uri: &str,
    ) -> StoreResult<Option<StoredDocument>> {
        self.ensure_available()?;
        match handle {
            Some(handle) => {
                self.with_transaction(handle, |transaction| Ok(self.visible(transaction, uri)))
            }
            None => Ok(self.documents.read_with(|documents| documents.get(uri).cloned())),
        }
    }

    fn delete(&self, handle: Option<&TransactionHandle>, uri: &str) -> StoreResult<bool> {
        self.ensure_available()?;
        match handle {
            Some(handle) => self.with_transaction(handle, |transaction| {
                if self.visible(transaction, uri).is_none() {
                    return Ok(false);
                }
                self.lock_uri(transaction, uri)?;
                transaction.writes.insert(uri.to_string(), PendingWrite::Delete);
                Ok(true)
            }),
            None => {
                self.ensure_unlocked(uri)?;
                Ok(self
                    .documents
                    .write_with(|documents| documents.shift_remove(uri).is_some()))
            }
        }
    }

    fn delete_collections(
        &self,
        handle: Option<&TransactionHandle>,
        collections: &[String],
    ) -> StoreResult<u64> {
        self.ensure_available()?;
        let tagged =
            |document: &StoredDocument| collections.iter().any(|c| document.in_collection(c));

        let removed = match handle {
            Some(handle) => self.with_transaction(handle, |transaction| {
                let uris: Vec<String> = self
                    .snapshot(Some(transaction))
                    .into_iter()
                    .filter(|document| tagged(document))
                    .map(|document| document.uri)
                    .collect();
                self.lock_all(transaction, &uris)?;
                for uri in &uris {
                    transaction.writes.insert(uri.clone(), PendingWrite::Delete);
                }
                Ok(uris.len() as u64)
            })?,
            None => {
                let uris: Vec<String> = self
                    .snapshot(None)
                    .into_iter()
                    .filter(|document| tagged(document))
                    .map(|document| document.uri)
                    .collect();
                for uri in &uris {
                    self.ensure_unlocked(uri)?;
                }
                self.documents.write_with(|documents| {
                    documents.retain(|_, document| !tagged(document));
                });
                uris.len() as u64
            }
        };
        log::debug!("Deleted {} documents from collections {:?}", removed, collections);
        Ok(removed)
    }

    fn search(
        &self,
        handle: Option<&TransactionHandle>,
        request: &SearchRequest,
    ) -> StoreResult<SearchResponse> {
        self.ensure_available()?;
        let matcher = Matcher::compile(&request.query)?;
        let transform = match &request.transform {
            Some(name) => {
                let installed =
                    self.transforms.read_with(|transforms| transforms.get(name).cloned());
                match installed {
                    Some(transform) => Some(transform),
                    None => {
                        log::error!("Transform {} is not installed", name);
                        return Err(StoreError::with_code(
                            CODE_NO_TRANSFORM,
                            format!("Extension {} does not exist", name),
                        ));
                    }
                }
            }
            None => None,
        };

        let documents = match handle {
            Some(handle) => self.with_transaction(handle, |transaction| {
                Ok(self.snapshot(Some(transaction)))
            })?,
            None => self.snapshot(None),
        };

        let mut matches: Vec<StoredDocument> = documents
            .into_iter()
            .filter(|document| {
                request.collections.is_empty()
                    || request.collections.iter().any(|c| document.in_collection(c))
            })
            .filter(|document| matcher.matches(document))
            .collect();
        sort_documents(&mut matches, &request.sort);

        let total = matches.len() as u64;
        let facets = compute_facets(&matches, &request.facets);
        let start = usize::try_from(request.start).unwrap_or(usize::MAX);
        let length = usize::try_from(request.page_length).unwrap_or(usize::MAX);

        let results = matches
            .into_iter()
            .skip(start)
            .take(length)
            .map(|mut document| {
                if !request.extract.is_empty() {
                    document.content = extract(&document.content, &request.extract);
                }
                if let Some(transform) = &transform {
                    document.content = transform(document.content);
                }
                document
            })
            .collect();

        log::debug!("Search {} matched {} documents", request.query, total);
        Ok(SearchResponse {
            total,
            results,
            facets,
        })
    }
}

fn no_transaction(handle: &TransactionHandle) -> StoreError {
    log::error!("Transaction {} is not open", handle);
    StoreError::with_code(
        CODE_NO_TRANSACTION,
        format!("No transaction with identifier {}", handle.id()),
    )
}

fn conflict(uri: &str) -> StoreError {
    log::error!("Document {} is locked by another transaction", uri);
    StoreError::with_code(
        CODE_CONFLICTING_UPDATES,
        format!("Conflicting updates on {}", uri),
    )
}

fn content_exists(uri: &str) -> StoreError {
    log::error!("Document {} already exists", uri);
    StoreError::with_code(CODE_CONTENT_EXISTS, format!("Document {} already exists", uri))
}

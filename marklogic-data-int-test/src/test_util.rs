use marklogic_data::client::DatabaseClient;
use marklogic_data::errors::{DataError, DataResult, ErrorKind};
use marklogic_data::memory::{InMemoryClient, InMemoryClientConfig};
use marklogic_data::template::{DocumentTemplate, DocumentTemplateBuilder};
use marklogic_data::transaction::TransactionManager;
use std::backtrace::Backtrace;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with retry logic and error handling.
///
/// `before` builds a fresh context, `test` runs against it and `after` checks
/// and releases it. A failing or panicking attempt is retried up to three
/// times before the test is reported as failed with the last error.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DataResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> DataResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> DataResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let failure = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => (e, bt),
            Err(panic_err) => {
                let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                (format!("Panic: {}", message), Backtrace::capture().to_string())
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", failure.0);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(failure.0);
        last_backtrace = Some(failure.1);
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// Everything a test needs: a private in-memory store and the components
/// wired to it.
#[derive(Clone)]
pub struct TestContext {
    client: InMemoryClient,
    template: DocumentTemplate,
    manager: TransactionManager,
}

impl TestContext {
    pub fn new(client: InMemoryClient, template: DocumentTemplate) -> Self {
        let manager = TransactionManager::new(Arc::new(client.clone()));
        TestContext {
            client,
            template,
            manager,
        }
    }

    pub fn client(&self) -> InMemoryClient {
        self.client.clone()
    }

    pub fn template(&self) -> DocumentTemplate {
        self.template.clone()
    }

    pub fn manager(&self) -> TransactionManager {
        self.manager.clone()
    }
}

fn shared(client: &InMemoryClient) -> Arc<dyn DatabaseClient> {
    Arc::new(client.clone())
}

pub fn create_test_context() -> DataResult<TestContext> {
    let client = InMemoryClient::new();
    let template = DocumentTemplate::builder(shared(&client)).build()?;
    Ok(TestContext::new(client, template))
}

/// Creates a context whose template is configured by `configure`, on a
/// store capped at `max_open_transactions` when given.
pub fn create_configured_context<F>(
    max_open_transactions: Option<usize>,
    configure: F,
) -> DataResult<TestContext>
where
    F: FnOnce(DocumentTemplateBuilder) -> DocumentTemplateBuilder,
{
    let config = match max_open_transactions {
        Some(limit) => InMemoryClientConfig::new().max_open_transactions(limit),
        None => InMemoryClientConfig::new(),
    };
    let client = InMemoryClient::with_config(config);
    let template = configure(DocumentTemplate::builder(shared(&client))).build()?;
    Ok(TestContext::new(client, template))
}

/// Fails when a test left transactions open on the store.
pub fn cleanup(ctx: TestContext) -> DataResult<()> {
    let client = ctx.client();
    client.set_online(true);
    let open = client.open_transaction_count();
    if open > 0 {
        return Err(DataError::new(
            &format!("{} transactions were left open", open),
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}

use depot::collection::{Collection, CollectionEventInfo, CollectionEventListener, EventKind};
use depot::common::Value;
use depot::errors::DepotResult;
use depot::Depot;
use std::backtrace::Backtrace;
use std::sync::{Arc, Mutex};

/// Runs `test` between `before` and `after`, reporting errors and panics of
/// every stage with the backtrace of the failing run.
///
/// `after` runs even when the test itself returned an error.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DepotResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> DepotResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> DepotResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
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

    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", err_msg), String::new())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed: {}", error);
}

#[derive(Clone)]
pub struct TestContext {
    depot: Depot,
}

impl TestContext {
    pub fn new(depot: Depot) -> Self {
        Self { depot }
    }

    pub fn depot(&self) -> Depot {
        self.depot.clone()
    }

    /// The `test` collection every context starts with.
    pub fn collection(&self) -> DepotResult<Collection> {
        self.depot.collection("test")
    }
}

pub fn create_test_context() -> DepotResult<TestContext> {
    let depot = Depot::builder().collection("test").open()?;
    Ok(TestContext::new(depot))
}

pub fn cleanup(ctx: TestContext) -> DepotResult<()> {
    let depot = ctx.depot();
    for name in depot.list_collection_names() {
        let collection = depot.collection(&name)?;
        log::debug!("Collection '{}' ended with {} records", name, collection.size());
    }
    Ok(())
}

/// Watcher that records every event it receives, tagged with a label.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<(String, EventKind, Value)>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self, label: &str) -> CollectionEventListener {
        let events = self.events.clone();
        let label = label.to_string();
        CollectionEventListener::new(move |event: CollectionEventInfo| {
            events
                .lock()
                .unwrap()
                .push((label.clone(), event.event_kind(), event.item().clone()));
            Ok(())
        })
    }

    pub fn events(&self) -> Vec<(String, EventKind, Value)> {
        self.events.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events().into_iter().map(|(label, _, _)| label).collect()
    }

    pub fn items(&self) -> Vec<Value> {
        self.events().into_iter().map(|(_, _, item)| item).collect()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

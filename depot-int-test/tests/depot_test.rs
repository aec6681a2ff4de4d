use depot::collection::{Collection, CollectionConfig};
use depot::errors::ErrorKind;
use depot::{doc, Depot};
use depot_int_test::test_util::{cleanup, create_test_context, run_test};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_new_depot_is_empty() {
    let depot = Depot::new();
    assert!(depot.list_collection_names().is_empty());
}

#[test]
fn test_create_collection_returns_named_collection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let depot = ctx.depot();
            let users = depot.create_collection("users")?;
            assert_eq!(users.name(), "users");
            assert_eq!(users.size(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_created_collection_is_reachable_by_name() {
    run_test(
        || create_test_context(),
        |ctx| {
            let depot = ctx.depot();
            depot.create_collection("users")?;
            assert!(depot.has_collection("users"));
            assert_eq!(depot.collection("users")?.name(), "users");
            assert_eq!(depot.list_collection_names(), vec!["test", "users"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_create_collection_without_name_fails() {
    let depot = Depot::new();
    let err = depot.create_collection(CollectionConfig::new()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    assert_eq!(err.message(), "Collection requires `name` property");
}

#[test]
fn test_register_external_collection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let depot = ctx.depot();
            let kites = Collection::new("kites")?;
            assert!(!depot.has_collection("kites"));

            depot.register(kites.clone())?;
            assert!(depot.has_collection("kites"));

            kites.insert(doc! { name: "box" })?;
            assert_eq!(depot.collection("kites")?.size(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_register_duplicate_name_fails() {
    let depot = Depot::new();
    depot.register(Collection::new("kites").unwrap()).unwrap();

    let err = depot.register(Collection::new("kites").unwrap()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    assert!(err.message().contains("already exists"));

    let err = depot.create_collection("kites").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
}

#[test]
fn test_unknown_collection_is_not_found() {
    let depot = Depot::new();
    let err = depot.collection("kites").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::CollectionNotFound);
}

#[test]
fn test_builder_opens_configured_collections() {
    let depot = Depot::builder()
        .collection("users")
        .collection(CollectionConfig::new().with_name("orders"))
        .open()
        .unwrap();

    assert_eq!(depot.list_collection_names(), vec!["orders", "users"]);
    assert_eq!(depot.config().collection_names(), vec!["users", "orders"]);
}

#[test]
fn test_builder_reports_invalid_collection() {
    let err = Depot::builder()
        .collection("users")
        .collection("bad name")
        .open()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    assert!(err.message().contains("bad name"));
}

#[test]
fn test_depot_handles_share_across_threads() {
    let depot = Depot::new();
    let items = depot.create_collection("items").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let depot = depot.clone();
            std::thread::spawn(move || {
                let items = depot.collection("items").unwrap();
                for _ in 0..25 {
                    items.insert(doc! { name: "x" }).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(items.size(), 100);
    assert_eq!(items.insert_count(), 100);
}

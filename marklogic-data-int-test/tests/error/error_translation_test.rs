use marklogic_data::client::{StoreError, StoreFailure, CODE_DEADLOCK, CODE_FOREST_NOT_OPEN};
use marklogic_data::domain::ChunkRequest;
use marklogic_data::errors::ErrorKind;
use marklogic_data::query::{text, QueryDefinition};
use marklogic_data::transaction::TransactionContext;
use marklogic_data_int_test::test_util::{cleanup, create_test_context, run_test};
use std::error::Error;

use crate::template::{generate_car, Car};

#[test]
fn test_malformed_query_is_invalid_api_usage() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            for query in ["color:red OR", "(estate", "\"open phrase", "price:>"] {
                let definition = QueryDefinition::new(text(query));
                let err = template
                    .search::<Car>(None, &definition, &ChunkRequest::unsorted(0, 10))
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::InvalidApiUsage, "query {:?}", query);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_offline_store_is_resource_failure() {
    run_test(
        create_test_context,
        |ctx| {
            let client = ctx.client();
            client.set_online(false);

            let err = ctx.template().write(None, &mut generate_car()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ResourceFailure);

            let mut context = TransactionContext::new();
            let err = ctx.manager().begin(&mut context).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ResourceFailure);
            assert!(!context.is_active());

            client.set_online(true);
            assert!(ctx.template().write(None, &mut generate_car()).is_ok());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_conflicting_transactions_are_integrity_violations() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            let mut first = TransactionContext::new();
            let mut second = TransactionContext::new();
            manager.begin(&mut first)?;
            manager.begin(&mut second)?;

            let mut car = generate_car().with_id("shared");
            template.write(Some(&first), &mut car)?;
            let err = template.write(Some(&second), &mut car).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DataIntegrityViolation);

            manager.rollback(&mut second)?;
            manager.commit(&mut first)?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_server_codes_are_classified() {
    run_test(
        create_test_context,
        |ctx| {
            let client = ctx.client();
            let template = ctx.template();
            let cases = [
                (
                    StoreError::with_code(CODE_DEADLOCK, "deadlock"),
                    ErrorKind::DataIntegrityViolation,
                ),
                (StoreError::with_code(CODE_FOREST_NOT_OPEN, "forest"), ErrorKind::ResourceFailure),
                (StoreError::from_response(Some(503), None, "busy"), ErrorKind::ResourceFailure),
                (StoreError::from_response(Some(400), None, "bad"), ErrorKind::InvalidApiUsage),
                (
                    StoreError::from_response(Some(500), Some("XDMP-BADMOOD"), "odd"),
                    ErrorKind::Uncategorized,
                ),
                (StoreError::new(StoreFailure::Unknown, "???"), ErrorKind::Uncategorized),
            ];

            for (store_error, kind) in cases {
                let expected_message = store_error.message().to_string();
                client.fail_next(store_error);
                let err = template.read::<Car>(None, "any").unwrap_err();
                assert_eq!(err.kind(), &kind);
                assert_eq!(err.message(), expected_message);
                let source = err.source().and_then(|s| s.downcast_ref::<StoreError>());
                assert!(source.is_some());
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_mapping_failure_is_not_a_store_failure() {
    run_test(
        create_test_context,
        |ctx| {
            use marklogic_data::client::{DatabaseClient, DocumentWrite};

            ctx.client().write(
                None,
                DocumentWrite::upsert(
                    "/Car/broken.json",
                    serde_json::json!({"price": "cheap"}),
                    vec!["Car".into()],
                ),
            )?;
            let err = ctx.template().read::<Car>(None, "broken").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMapping);
            assert!(!err.is_store_failure());
            Ok(())
        },
        cleanup,
    )
}

use marklogic_data::client::{StoreError, StoreFailure};
use marklogic_data::errors::{DataError, ErrorKind};
use marklogic_data::transaction::{Propagation, TransactionContext, TransactionDefinition};
use marklogic_data_int_test::test_util::{cleanup, create_test_context, run_test};
use std::time::Duration;

use crate::template::{generate_car, Car};

#[test]
fn test_execute_commits_on_success() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let definition = TransactionDefinition::new()
                .named("import")
                .timeout(Duration::from_secs(30));

            let ids = ctx.manager().execute(&definition, |context| {
                assert!(context.is_new());
                assert_eq!(context.name(), Some("import"));
                template.write_all(Some(context), &mut vec![generate_car(), generate_car()])
            })?;

            assert_eq!(ids.len(), 2);
            for id in &ids {
                assert!(template.exists::<Car>(None, id)?);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_execute_rolls_back_on_error() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let definition = TransactionDefinition::new();
            let result: Result<(), DataError> = ctx.manager().execute(&definition, |context| {
                template.write(Some(context), &mut generate_car())?;
                Err(DataError::new("validation failed", ErrorKind::InvalidOperation))
            });

            assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidOperation);
            assert_eq!(ctx.client().document_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_execute_within_joins_active_transaction() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            let mut outer = TransactionContext::new();
            manager.begin(&mut outer)?;

            let id = manager.execute_within(&outer, &TransactionDefinition::new(), |context| {
                assert!(!context.is_new());
                template.write(Some(context), &mut generate_car())
            })?;
            assert!(template.read::<Car>(None, &id)?.is_none());
            assert!(template.read::<Car>(Some(&outer), &id)?.is_some());

            manager.rollback(&mut outer)?;
            assert!(template.read::<Car>(None, &id)?.is_none());
            assert_eq!(ctx.client().transactions_opened(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_execute_within_requires_new_commits_independently() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            let mut outer = TransactionContext::new();
            manager.begin(&mut outer)?;

            let definition = TransactionDefinition::new().propagation(Propagation::RequiresNew);
            let id = manager.execute_within(&outer, &definition, |context| {
                assert!(context.is_new());
                template.write(Some(context), &mut generate_car())
            })?;

            manager.rollback(&mut outer)?;
            assert!(template.read::<Car>(None, &id)?.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failed_commit_releases_transaction() {
    run_test(
        create_test_context,
        |ctx| {
            let client = ctx.client();
            let template = ctx.template();
            let manager = ctx.manager();
            let mut context = TransactionContext::new();
            manager.begin(&mut context)?;
            let mut car = generate_car().with_id("pending");
            template.write(Some(&context), &mut car)?;

            client.fail_next(StoreError::new(StoreFailure::ServiceUnavailable, "forest offline"));
            let err = manager.commit(&mut context).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ResourceFailure);
            assert!(!context.is_active());
            assert!(!context.is_new());

            assert_eq!(client.open_transaction_count(), 0);
            assert!(template.read::<Car>(None, "pending")?.is_none());
            template.write(None, &mut car)?;
            assert_eq!(template.read::<Car>(None, "pending")?, Some(car));
            Ok(())
        },
        cleanup,
    )
}

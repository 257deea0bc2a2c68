use marklogic_data::client::DatabaseClient;
use marklogic_data::domain::{ChunkRequest, FacetedPage};
use marklogic_data::errors::ErrorKind;
use marklogic_data::query::{all, FacetSpec, QueryDefinition};
use marklogic_data::transaction::{TransactionContext, DEFAULT_TRANSACTION_TIMEOUT};
use marklogic_data_int_test::test_util::{
    cleanup, create_configured_context, create_test_context, run_test,
};
use std::thread;
use std::time::Duration;

use crate::template::{generate_car, Car};

#[test]
fn test_commit_makes_write_visible() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            let mut context = TransactionContext::new();
            manager.begin(&mut context)?;

            let mut car = generate_car();
            let id = template.write(Some(&context), &mut car)?;
            assert!(template.read::<Car>(Some(&context), &id)?.is_some());
            assert!(template.read::<Car>(None, &id)?.is_none());

            manager.commit(&mut context)?;
            assert!(!context.is_active());
            assert_eq!(template.read::<Car>(None, &id)?, Some(car));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_rollback_hides_write() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            let mut context = TransactionContext::named("discarded");
            manager.begin(&mut context)?;

            let id = template.write(Some(&context), &mut generate_car())?;
            manager.rollback(&mut context)?;

            assert!(template.read::<Car>(None, &id)?.is_none());
            assert_eq!(ctx.client().document_count(), 0);

            let definition = QueryDefinition::default().with_facet(FacetSpec::on("color"));
            let page: FacetedPage<Car> =
                template.search(None, &definition, &ChunkRequest::unsorted(0, 10))?;
            assert_eq!(page.total_elements(), 0);
            assert!(!page.has_content());
            assert_eq!(page.facet("color").map(|facet| facet.count()), Some(0));
            assert_eq!(template.count::<Car>(None, all())?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_begin_twice_opens_one_transaction() {
    run_test(
        create_test_context,
        |ctx| {
            let manager = ctx.manager();
            let client = ctx.client();
            assert_eq!(TransactionContext::new().timeout(), DEFAULT_TRANSACTION_TIMEOUT);

            let mut context = TransactionContext::new().with_timeout(Duration::from_millis(200));
            manager.begin(&mut context)?;
            manager.begin(&mut context)?;
            assert_eq!(client.transactions_opened(), 1);

            context.clear();
            assert!(!context.is_active());
            manager.begin(&mut context)?;
            assert_eq!(client.transactions_opened(), 2);
            manager.rollback(&mut context)?;

            // clear() only forgets the first handle; the store times it out
            assert_eq!(client.open_transaction_count(), 1);
            awaitility::at_most(Duration::from_secs(5))
                .until(|| client.open_transaction_count() == 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_joined_context_does_not_commit() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            let mut owner = TransactionContext::new();
            manager.begin(&mut owner)?;

            let mut joined = TransactionContext::new();
            joined.set_transaction(owner.transaction().cloned().unwrap());
            let id = template.write(Some(&joined), &mut generate_car())?;
            manager.commit(&mut joined)?;
            assert!(template.read::<Car>(None, &id)?.is_none());

            manager.commit(&mut owner)?;
            assert!(template.read::<Car>(None, &id)?.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_expired_transaction_is_resource_usage() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            let mut context = TransactionContext::new().with_timeout(Duration::from_millis(50));
            manager.begin(&mut context)?;
            template.write(Some(&context), &mut generate_car())?;

            let client = ctx.client();
            awaitility::at_most(Duration::from_secs(5))
                .until(|| client.open_transaction_count() == 0);

            let err = template.write(Some(&context), &mut generate_car()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ResourceUsage);
            let err = manager.commit(&mut context).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ResourceUsage);
            assert!(!context.is_active());
            assert_eq!(client.document_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_transaction_limit_is_resource_usage() {
    run_test(
        || create_configured_context(Some(1), |builder| builder),
        |ctx| {
            let manager = ctx.manager();
            let mut first = TransactionContext::new();
            manager.begin(&mut first)?;

            let mut second = TransactionContext::new();
            let err = manager.begin(&mut second).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ResourceUsage);
            assert!(!second.is_active());

            manager.commit(&mut first)?;
            manager.begin(&mut second)?;
            manager.commit(&mut second)?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_contexts_on_separate_threads() {
    run_test(
        create_test_context,
        |ctx| {
            let workers: Vec<_> = (0..8)
                .map(|i| {
                    let template = ctx.template();
                    let manager = ctx.manager();
                    thread::spawn(move || {
                        let mut context = TransactionContext::named(&format!("worker-{}", i));
                        manager.begin(&mut context)?;
                        let mut cars = vec![generate_car(), generate_car()];
                        template.write_all(Some(&context), &mut cars)?;
                        if i % 2 == 0 {
                            manager.commit(&mut context)
                        } else {
                            manager.rollback(&mut context)
                        }
                    })
                })
                .collect();

            for worker in workers {
                worker.join().expect("worker panicked")?;
            }
            let client = ctx.client();
            assert_eq!(client.document_count(), 8);
            assert_eq!(client.transactions_opened(), 8);
            assert_eq!(client.config().host(), "localhost");
            Ok(())
        },
        cleanup,
    )
}

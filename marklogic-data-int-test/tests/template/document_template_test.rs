use marklogic_data::domain::{ChunkRequest, FacetedPage};
use marklogic_data::errors::ErrorKind;
use marklogic_data::query::{property, text, QueryDefinition};
use marklogic_data::transaction::TransactionContext;
use marklogic_data_int_test::test_util::{cleanup, create_test_context, run_test};

use crate::template::{generate_cars, Car};

#[test]
fn test_write_generates_id() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let mut car = Car::new("Volvo", "red", 20_000);
            let id = template.write(None, &mut car)?;

            assert_eq!(car.id.as_deref(), Some(id.as_str()));
            assert!(uuid::Uuid::parse_str(&id).is_ok());
            assert_eq!(template.read::<Car>(None, &id)?, Some(car));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_write_all_then_count() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let mut cars = generate_cars(25);
            let ids = template.write_all(None, &mut cars)?;

            assert_eq!(ids.len(), 25);
            assert_eq!(ctx.client().document_count(), 25);
            assert_eq!(template.count::<Car>(None, marklogic_data::query::all())?, 25);
            for (car, id) in cars.iter().zip(&ids) {
                assert_eq!(car.id.as_ref(), Some(id));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_duplicate_is_duplicate_key() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let mut car = Car::new("Saab", "blue", 9_000).with_id("saab-900");
            template.insert(None, &mut car)?;

            let err = template.insert(None, &mut car).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateKey);
            assert!(err.is_store_failure());
            assert!(std::error::Error::source(&err).is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_and_exists() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let mut car = Car::new("Fiat", "green", 5_000).with_id("panda");
            template.write(None, &mut car)?;

            assert!(template.exists::<Car>(None, "panda")?);
            assert!(template.delete::<Car>(None, "panda")?);
            assert!(!template.exists::<Car>(None, "panda")?);
            assert!(!template.delete::<Car>(None, "panda")?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_search_one_returns_first_match() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let mut cars = vec![
                Car::new("Volvo", "red", 1).with_notes("first owner, garage kept"),
                Car::new("Volvo", "blue", 2).with_notes("second owner"),
            ];
            template.write_all(None, &mut cars)?;

            let found: Option<Car> = template.search_one(None, text("\"garage kept\""))?;
            assert_eq!(found.map(|c| c.price), Some(1));

            let found: Option<Car> = template.search_one(None, property("make").eq("Volvo"))?;
            assert!(found.is_some());

            let missing: Option<Car> = template.search_one(None, property("make").eq("Tesla"))?;
            assert!(missing.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_collections_inside_rolled_back_transaction() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let manager = ctx.manager();
            template.write_all(None, &mut generate_cars(10))?;

            let mut context = TransactionContext::named("purge");
            manager.begin(&mut context)?;
            assert_eq!(template.drop_collections(Some(&context), &["Car"])?, 10);
            let inside: FacetedPage<Car> = template.search(
                Some(&context),
                &QueryDefinition::default(),
                &ChunkRequest::unsorted(0, 5),
            )?;
            assert_eq!(inside.total_elements(), 0);
            manager.rollback(&mut context)?;

            assert_eq!(ctx.client().document_count(), 10);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_collections_without_transaction() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            template.write_all(None, &mut generate_cars(3))?;
            assert_eq!(template.drop_collections(None, &["Car", "Boat"])?, 3);
            assert_eq!(template.drop_collections(None, &["Car"])?, 0);
            Ok(())
        },
        cleanup,
    )
}

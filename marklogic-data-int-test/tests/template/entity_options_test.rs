use marklogic_data::domain::{ChunkRequest, FacetedPage};
use marklogic_data::errors::{DataResult, ErrorKind};
use marklogic_data::query::{property, QueryDefinition, StructuredQuery};
use marklogic_data::template::{DocumentTemplate, EntityOptions};
use marklogic_data_int_test::test_util::{cleanup, create_configured_context, run_test};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::template::Car;

fn seed(template: &DocumentTemplate) -> DataResult<()> {
    let mut cars = vec![
        Car::new("Volvo", "red", 30_000).with_notes("sunroof"),
        Car::new("Volvo", "blue", 20_000),
        Car::new("Saab", "red", 10_000),
    ];
    template.write_all(None, &mut cars)?;
    Ok(())
}

#[test]
fn test_query_override_replaces_caller_query() {
    run_test(
        || {
            create_configured_context(None, |builder| {
                builder.entity_options::<Car>(
                    EntityOptions::new().query_override(property("color").eq("red")),
                )
            })
        },
        |ctx| {
            let template = ctx.template();
            seed(&template)?;

            let page: FacetedPage<Car> = template.search(
                None,
                &QueryDefinition::new(property("color").eq("blue")),
                &ChunkRequest::unsorted(0, 10),
            )?;
            assert_eq!(page.total_elements(), 2);
            assert!(page.iter().all(|car| car.color == "red"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_extract_limits_properties() {
    run_test(
        || {
            create_configured_context(None, |builder| {
                builder.entity_options::<Car>(EntityOptions::new().extract(&["make", "price"]))
            })
        },
        |ctx| {
            let template = ctx.template();
            seed(&template)?;

            let page: FacetedPage<Car> =
                template.search(None, &QueryDefinition::default(), &ChunkRequest::unsorted(0, 10))?;
            assert_eq!(page.number_of_elements(), 3);
            for car in &page {
                assert!(car.id.is_none());
                assert!(car.color.is_empty());
                assert!(!car.make.is_empty());
                assert!(car.price > 0);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_transform_applies_to_results() {
    run_test(
        || {
            create_configured_context(None, |builder| {
                builder.entity_options::<Car>(EntityOptions::new().transform("redact-notes"))
            })
        },
        |ctx| {
            ctx.client().register_transform("redact-notes", |mut content| {
                content["notes"] = Value::String("***".to_string());
                content
            });
            let template = ctx.template();
            seed(&template)?;

            let page: FacetedPage<Car> =
                template.search(None, &QueryDefinition::default(), &ChunkRequest::unsorted(0, 10))?;
            assert!(page.iter().all(|car| car.notes == "***"));

            // reads are not searches and stay untouched
            let id = page.content()[0].id.clone().unwrap_or_default();
            let stored: Option<Car> = template.read(None, &id)?;
            assert_ne!(stored.map(|c| c.notes), Some("***".to_string()));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_transform_is_invalid_api_usage() {
    run_test(
        || {
            create_configured_context(None, |builder| {
                builder.entity_options::<Car>(EntityOptions::new().transform("missing"))
            })
        },
        |ctx| {
            let template = ctx.template();
            seed(&template)?;
            let err = template
                .search::<Car>(None, &QueryDefinition::default(), &ChunkRequest::unsorted(0, 10))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidApiUsage);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_decorator_sees_final_query() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    run_test(
        move || {
            let counter = counter.clone();
            create_configured_context(None, move |builder| {
                builder.entity_options::<Car>(EntityOptions::new().decorator(
                    move |query: StructuredQuery, entity_name: &str| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(entity_name, "Car");
                        query.and(property("price").lt(25_000))
                    },
                ))
            })
        },
        |ctx| {
            let template = ctx.template();
            seed(&template)?;

            let definition = QueryDefinition::new(property("make").eq("Volvo"));
            let page: FacetedPage<Car> =
                template.search(None, &definition, &ChunkRequest::unsorted(0, 10))?;
            assert_eq!(page.total_elements(), 1);
            assert_eq!(page.content()[0].price, 20_000);
            Ok(())
        },
        cleanup,
    );
    assert!(calls.load(Ordering::SeqCst) >= 1);
}

use marklogic_data::domain::{ChunkRequest, FacetedPage, Order, Pageable, Sort};
use marklogic_data::query::QueryDefinition;
use marklogic_data::errors::DataResult;
use marklogic_data_int_test::test_util::{cleanup, create_test_context, run_test, TestContext};

use crate::template::Car;

fn seed_prices(ctx: &TestContext, count: u32) -> DataResult<()> {
    let mut cars: Vec<Car> = (1..=count)
        .map(|i| Car::new("Volvo", "red", i * 100).with_id(&format!("car-{:03}", i)))
        .collect();
    ctx.template().write_all(None, &mut cars)?;
    Ok(())
}

fn by_price() -> Sort {
    Sort::by(vec![Order::asc("price")])
}

#[test]
fn test_walk_all_chunks() {
    run_test(
        create_test_context,
        |ctx| {
            seed_prices(&ctx, 45)?;
            let template = ctx.template();

            let mut chunk = ChunkRequest::new(0, 20, by_price());
            let mut seen = Vec::new();
            loop {
                let page: FacetedPage<Car> =
                    template.search(None, &QueryDefinition::default(), &chunk)?;
                assert_eq!(page.total_pages(), 3);
                seen.extend(page.iter().map(|car| car.price));
                match page.next_pageable() {
                    Some(next) => chunk = next,
                    None => break,
                }
            }
            let expected: Vec<u32> = (1..=45).map(|i| i * 100).collect();
            assert_eq!(seen, expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unaligned_offset_chunk() {
    run_test(
        create_test_context,
        |ctx| {
            seed_prices(&ctx, 60)?;
            let chunk = ChunkRequest::new(30, 20, by_price());
            let page: FacetedPage<Car> =
                ctx.template().search(None, &QueryDefinition::default(), &chunk)?;

            assert_eq!(page.number(), 1);
            assert_eq!(page.content()[0].price, 3_100);
            assert_eq!(page.number_of_elements(), 20);
            assert!(page.has_previous());
            assert!(page.has_next());

            let previous = page.previous_pageable().unwrap();
            assert_eq!(previous, ChunkRequest::new(10, 20, by_price()));
            assert_eq!(previous.next().offset(), 30);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_chunk_past_the_end_is_empty() {
    run_test(
        create_test_context,
        |ctx| {
            seed_prices(&ctx, 5)?;
            let chunk = ChunkRequest::new(10, 5, by_price());
            let page: FacetedPage<Car> =
                ctx.template().search(None, &QueryDefinition::default(), &chunk)?;
            assert!(!page.has_content());
            assert_eq!(page.total_elements(), 5);
            assert!(!page.has_next());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_zero_limit_returns_totals_only() {
    run_test(
        create_test_context,
        |ctx| {
            seed_prices(&ctx, 7)?;
            let chunk = ChunkRequest::unsorted(0, 0);
            let page: FacetedPage<Car> =
                ctx.template().search(None, &QueryDefinition::default(), &chunk)?;
            assert_eq!(page.total_elements(), 7);
            assert_eq!(page.number(), 0);
            assert_eq!(page.total_pages(), 1);
            assert!(!page.has_content());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_descending_sort_with_missing_values() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            template.write_all(
                None,
                &mut vec![
                    Car::new("Audi", "red", 5).with_id("a"),
                    Car::new("Saab", "red", 9).with_id("b"),
                    Car::new("Fiat", "red", 7).with_id("c"),
                ],
            )?;
            let chunk = ChunkRequest::new(0, 10, Sort::by(vec![Order::desc("price")]));
            let page: FacetedPage<Car> =
                template.search(None, &QueryDefinition::default(), &chunk)?;
            let makes: Vec<&str> = page.iter().map(|c| c.make.as_str()).collect();
            assert_eq!(makes, vec!["Saab", "Fiat", "Audi"]);

            let sort = Sort::by(vec![Order::asc("mileage"), Order::asc("make")]);
            let chunk = ChunkRequest::new(0, 10, sort);
            let page: FacetedPage<Car> =
                template.search(None, &QueryDefinition::default(), &chunk)?;
            let makes: Vec<&str> = page.iter().map(|c| c.make.as_str()).collect();
            assert_eq!(makes, vec!["Audi", "Fiat", "Saab"]);
            Ok(())
        },
        cleanup,
    )
}

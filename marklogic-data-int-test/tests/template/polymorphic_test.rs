use marklogic_data::convert::{Entity, TypeRegistry, DISCRIMINATOR_FIELD};
use marklogic_data::domain::{ChunkRequest, FacetedPage, Order, Sort};
use marklogic_data::errors::ErrorKind;
use marklogic_data::query::{property, FacetSpec, QueryDefinition};
use marklogic_data_int_test::test_util::{cleanup, create_test_context, run_test};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sedan {
    id: Option<String>,
    name: String,
    doors: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pickup {
    id: Option<String>,
    name: String,
    payload_kg: u32,
}

macro_rules! vehicle_entity {
    ($ty:ty, $alias:literal) => {
        impl Entity for $ty {
            fn id(&self) -> Option<String> {
                self.id.clone()
            }

            fn set_id(&mut self, id: String) {
                self.id = Some(id);
            }

            fn entity_name() -> String {
                "Vehicle".to_string()
            }

            fn type_alias() -> Option<String> {
                Some($alias.to_string())
            }
        }
    };
}

vehicle_entity!(Sedan, "sedan");
vehicle_entity!(Pickup, "pickup");

#[derive(Debug, PartialEq)]
enum Vehicle {
    Sedan(Sedan),
    Pickup(Pickup),
}

fn registry() -> TypeRegistry<Vehicle> {
    TypeRegistry::new("Vehicle")
        .register::<Sedan, _>("sedan", Vehicle::Sedan)
        .register::<Pickup, _>("pickup", Vehicle::Pickup)
}

#[test]
fn test_search_decodes_each_type() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            template.write(None, &mut Sedan { id: None, name: "a-sedan".into(), doors: 4 })?;
            let mut pickup = Pickup { id: None, name: "b-pickup".into(), payload_kg: 900 };
            template.write(None, &mut pickup)?;
            template.write(None, &mut Sedan { id: None, name: "c-sedan".into(), doors: 2 })?;

            let definition =
                QueryDefinition::default().with_facet(FacetSpec::on(DISCRIMINATOR_FIELD));
            let chunk = ChunkRequest::new(0, 10, Sort::by(vec![Order::asc("name")]));
            let page: FacetedPage<Vehicle> =
                template.search_polymorphic(None, &registry(), &definition, &chunk)?;

            assert_eq!(page.total_elements(), 3);
            assert!(matches!(&page.content()[0], Vehicle::Sedan(s) if s.doors == 4));
            assert!(matches!(&page.content()[1], Vehicle::Pickup(p) if p.payload_kg == 900));
            assert!(matches!(&page.content()[2], Vehicle::Sedan(s) if s.doors == 2));

            let kinds = page.facet(DISCRIMINATOR_FIELD).unwrap();
            assert_eq!(kinds.count(), 2);
            assert_eq!(kinds.value("sedan").map(|v| v.count()), Some(2));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_read_polymorphic() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            let mut pickup = Pickup {
                id: Some("p1".into()),
                name: "hauler".into(),
                payload_kg: 1200,
            };
            template.write(None, &mut pickup)?;

            let found = template.read_polymorphic(None, &registry(), &Pickup::uri_for("p1"))?;
            assert_eq!(found, Some(Vehicle::Pickup(pickup)));
            assert!(template.read_polymorphic(None, &registry(), "/Vehicle/none.json")?.is_none());

            let narrowed: FacetedPage<Vehicle> = template.search_polymorphic(
                None,
                &registry(),
                &QueryDefinition::new(property("payload_kg").gt(1000)),
                &ChunkRequest::unsorted(0, 10),
            )?;
            assert_eq!(narrowed.number_of_elements(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unregistered_alias_is_mapping_error() {
    run_test(
        create_test_context,
        |ctx| {
            let template = ctx.template();
            template.write(None, &mut Sedan { id: None, name: "s".into(), doors: 4 })?;
            template.write(None, &mut Pickup { id: None, name: "p".into(), payload_kg: 1 })?;

            let sedans_only =
                TypeRegistry::new("Vehicle").register::<Sedan, _>("sedan", Vehicle::Sedan);
            let chunk = ChunkRequest::unsorted(0, 10);
            let err = template
                .search_polymorphic(None, &sedans_only, &QueryDefinition::default(), &chunk)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMapping);
            Ok(())
        },
        cleanup,
    )
}

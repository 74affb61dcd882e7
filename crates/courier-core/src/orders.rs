//! Resolving stored orders into flyable missions.

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::geometry::Coordinate;
use crate::models::Order;

/// Maps a three-word location token to a coordinate.
pub trait LocationResolver {
    fn resolve(&mut self, words: &str) -> Result<Coordinate, CatalogError>;
}

/// Everything the mission controller needs to fly one order.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionOrder {
    pub order_id: String,
    pub drop_off: Coordinate,
    /// Shop locations in catalog order; the controller decides visiting order.
    pub pickups: Vec<Coordinate>,
}

impl MissionOrder {
    pub fn new(order_id: impl Into<String>, drop_off: Coordinate, pickups: Vec<Coordinate>) -> Self {
        Self {
            order_id: order_id.into(),
            drop_off,
            pickups,
        }
    }
}

/// Look up the order's shops and resolve every location involved.
pub fn resolve_order<R: LocationResolver + ?Sized>(
    order: &Order,
    catalog: &Catalog,
    resolver: &mut R,
) -> Result<MissionOrder, CatalogError> {
    let shops = catalog.shops_for(&order.order_no, &order.items)?;
    let drop_off = resolver.resolve(&order.deliver_to)?;
    let pickups = shops
        .iter()
        .map(|shop| resolver.resolve(&shop.location))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MissionOrder::new(order.order_no.clone(), drop_off, pickups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MenuItem, Shop};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    struct FixedResolver(HashMap<&'static str, Coordinate>);

    impl LocationResolver for FixedResolver {
        fn resolve(&mut self, words: &str) -> Result<Coordinate, CatalogError> {
            self.0
                .get(words)
                .copied()
                .ok_or_else(|| CatalogError::UnknownLocation(words.to_string()))
        }
    }

    fn catalog() -> Catalog {
        let shop = |name: &str, location: &str, item: &str| Shop {
            name: name.to_string(),
            location: location.to_string(),
            menu: vec![MenuItem {
                item: item.to_string(),
                pence: 100,
            }],
        };
        Catalog::new(
            vec![shop("A", "a.a.a", "Tea"), shop("B", "b.b.b", "Cake")],
            50,
        )
        .unwrap()
    }

    fn order(deliver_to: &str, items: &[&str]) -> Order {
        Order {
            order_no: "0001".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2022, 3, 4).unwrap(),
            customer: None,
            deliver_to: deliver_to.to_string(),
            items: items.iter().map(|item| item.to_string()).collect(),
        }
    }

    fn resolver() -> FixedResolver {
        FixedResolver(HashMap::from([
            ("a.a.a", Coordinate::new(1.0, 1.0)),
            ("b.b.b", Coordinate::new(2.0, 2.0)),
            ("home.sweet.home", Coordinate::new(3.0, 3.0)),
        ]))
    }

    #[test]
    fn order_resolves_to_pickups_and_drop_off() {
        let mission =
            resolve_order(&order("home.sweet.home", &["Cake", "Tea"]), &catalog(), &mut resolver())
                .unwrap();
        assert_eq!(mission.order_id, "0001");
        assert_eq!(mission.drop_off, Coordinate::new(3.0, 3.0));
        assert_eq!(
            mission.pickups,
            vec![Coordinate::new(2.0, 2.0), Coordinate::new(1.0, 1.0)]
        );
    }

    #[test]
    fn unresolvable_drop_off_is_reported() {
        let err = resolve_order(&order("no.such.place", &["Tea"]), &catalog(), &mut resolver())
            .unwrap_err();
        assert_eq!(err, CatalogError::UnknownLocation("no.such.place".to_string()));
    }
}

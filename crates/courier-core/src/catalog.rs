//! Shop catalog: which shop sells an item and what it costs.

use std::collections::HashMap;

use crate::error::{CatalogError, ConfigError};
use crate::models::Shop;

/// Orders may draw on at most this many shops.
pub const MAX_SHOPS_PER_ORDER: usize = 2;

#[derive(Debug, Clone)]
struct Listing {
    shop: usize,
    pence: u32,
}

/// Item lookup built once from the day's menus.
#[derive(Debug, Clone)]
pub struct Catalog {
    shops: Vec<Shop>,
    listings: HashMap<String, Listing>,
    delivery_charge_pence: u32,
}

impl Catalog {
    /// Index every menu item. An item sold by several shops resolves to the
    /// last shop listing it.
    pub fn new(shops: Vec<Shop>, delivery_charge_pence: u32) -> Result<Self, ConfigError> {
        if shops.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut listings = HashMap::new();
        for (index, shop) in shops.iter().enumerate() {
            for entry in &shop.menu {
                listings.insert(
                    entry.item.clone(),
                    Listing {
                        shop: index,
                        pence: entry.pence,
                    },
                );
            }
        }

        tracing::info!(
            "Catalog loaded: {} shops, {} items",
            shops.len(),
            listings.len()
        );
        Ok(Self {
            shops,
            listings,
            delivery_charge_pence,
        })
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn item_count(&self) -> usize {
        self.listings.len()
    }

    pub fn price_of(&self, item: &str) -> Option<u32> {
        self.listings.get(item).map(|listing| listing.pence)
    }

    /// Distinct shops needed for `items`, in order of first appearance.
    pub fn shops_for(&self, order_no: &str, items: &[String]) -> Result<Vec<&Shop>, CatalogError> {
        let mut needed: Vec<usize> = Vec::new();
        for item in items {
            let listing = self
                .listings
                .get(item)
                .ok_or_else(|| CatalogError::UnknownItem(item.clone()))?;
            if !needed.contains(&listing.shop) {
                needed.push(listing.shop);
            }
        }

        if needed.len() > MAX_SHOPS_PER_ORDER {
            return Err(CatalogError::TooManyShops {
                order_no: order_no.to_string(),
                count: needed.len(),
            });
        }
        Ok(needed.into_iter().map(|index| &self.shops[index]).collect())
    }

    /// Item prices plus the delivery charge. Free orders cost nothing at all.
    pub fn delivery_cost(&self, items: &[String]) -> Result<u32, CatalogError> {
        let mut total = 0u32;
        for item in items {
            total += self
                .price_of(item)
                .ok_or_else(|| CatalogError::UnknownItem(item.clone()))?;
        }
        if total == 0 {
            return Ok(0);
        }
        Ok(total + self.delivery_charge_pence)
    }
}

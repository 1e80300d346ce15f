//! The shop filter/sort pipeline.
//!
//! Pure functions over a loaded inventory slice: apply a price range and a
//! selected-breed set, then sort. Category options are derived from the
//! inventory itself, never hardcoded, and the reset price bound is the
//! maximum observed price rounded up to the nearest 100.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pet_haven_core::{Pet, Species};

/// Granularity of the derived price bound.
const PRICE_BOUND_STEP: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Display order for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Descending creation timestamp.
    #[default]
    Newest,
    /// Ascending price.
    PriceAsc,
    /// Descending price.
    PriceDesc,
}

/// Active catalog filter.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Inclusive price range; `None` leaves prices unconstrained.
    pub price_range: Option<(Decimal, Decimal)>,
    /// Selected breeds; an empty set selects everything.
    pub breeds: BTreeSet<String>,
}

impl CatalogFilter {
    /// Whether a listing passes this filter.
    #[must_use]
    pub fn matches(&self, pet: &Pet) -> bool {
        if let Some((min, max)) = self.price_range
            && (pet.price < min || pet.price > max)
        {
            return false;
        }
        if !self.breeds.is_empty() && !self.breeds.contains(&pet.breed) {
            return false;
        }
        true
    }
}

/// Filter and sort an inventory slice.
#[must_use]
pub fn apply(pets: &[Pet], filter: &CatalogFilter, sort: SortOrder) -> Vec<Pet> {
    let mut result: Vec<Pet> = pets.iter().filter(|pet| filter.matches(pet)).cloned().collect();

    match sort {
        SortOrder::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::PriceAsc => result.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceDesc => result.sort_by(|a, b| b.price.cmp(&a.price)),
    }

    result
}

/// Derive the species → breeds hierarchy from the loaded inventory.
#[must_use]
pub fn categories(pets: &[Pet]) -> BTreeMap<Species, BTreeSet<String>> {
    let mut map: BTreeMap<Species, BTreeSet<String>> = BTreeMap::new();
    for pet in pets {
        map.entry(pet.species).or_default().insert(pet.breed.clone());
    }
    map
}

/// The full price bound used by filter reset: the maximum observed price,
/// rounded up to the nearest 100.
#[must_use]
pub fn price_ceiling(pets: &[Pet]) -> Decimal {
    let Some(max) = pets.iter().map(|pet| pet.price).max() else {
        return Decimal::ZERO;
    };
    (max / PRICE_BOUND_STEP).ceil() * PRICE_BOUND_STEP
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use pet_haven_core::{PetId, PriceType};

    fn pet(breed: &str, price: i64, minutes_ago: i64) -> Pet {
        let created = Utc::now() - TimeDelta::minutes(minutes_ago);
        Pet {
            id: PetId::generate(),
            species: Species::Dog,
            breed: breed.to_owned(),
            age: "1 year".to_owned(),
            price: Decimal::new(price, 0),
            price_type: PriceType::Each,
            image: None,
            images: vec![],
            video: None,
            videos: vec![],
            description: "desc".to_owned(),
            color_variants: vec![],
            in_stock: true,
            is_visible: true,
            featured: false,
            created_at: created,
            updated_at: created,
            created_by: None,
        }
    }

    fn prices(pets: &[Pet]) -> Vec<i64> {
        pets.iter()
            .map(|p| i64::try_from(p.price.trunc().mantissa()).unwrap())
            .collect()
    }

    #[test]
    fn test_sort_price_ascending() {
        let inventory = vec![pet("A", 10, 30), pet("B", 50, 20), pet("C", 30, 10)];
        let sorted = apply(&inventory, &CatalogFilter::default(), SortOrder::PriceAsc);
        assert_eq!(prices(&sorted), vec![10, 30, 50]);
    }

    #[test]
    fn test_sort_price_descending() {
        let inventory = vec![pet("A", 10, 30), pet("B", 50, 20), pet("C", 30, 10)];
        let sorted = apply(&inventory, &CatalogFilter::default(), SortOrder::PriceDesc);
        assert_eq!(prices(&sorted), vec![50, 30, 10]);
    }

    #[test]
    fn test_sort_newest_is_reverse_chronological() {
        let inventory = vec![pet("A", 10, 30), pet("B", 50, 20), pet("C", 30, 10)];
        let sorted = apply(&inventory, &CatalogFilter::default(), SortOrder::Newest);
        let breeds: Vec<&str> = sorted.iter().map(|p| p.breed.as_str()).collect();
        assert_eq!(breeds, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_price_range_filter() {
        let inventory = vec![pet("A", 10, 30), pet("B", 50, 20), pet("C", 30, 10)];
        let filter = CatalogFilter {
            price_range: Some((Decimal::new(20, 0), Decimal::new(40, 0))),
            breeds: BTreeSet::new(),
        };
        let result = apply(&inventory, &filter, SortOrder::Newest);
        assert_eq!(prices(&result), vec![30]);
    }

    #[test]
    fn test_breed_filter() {
        let inventory = vec![pet("Beagle", 10, 30), pet("Terrier", 50, 20)];
        let filter = CatalogFilter {
            price_range: None,
            breeds: BTreeSet::from(["Beagle".to_owned()]),
        };
        let result = apply(&inventory, &filter, SortOrder::Newest);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].breed, "Beagle");
    }

    #[test]
    fn test_empty_breed_set_selects_everything() {
        let inventory = vec![pet("Beagle", 10, 30), pet("Terrier", 50, 20)];
        let result = apply(&inventory, &CatalogFilter::default(), SortOrder::Newest);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_categories_derived_from_inventory() {
        let mut inventory = vec![pet("Beagle", 10, 30), pet("Beagle", 20, 20), pet("Terrier", 50, 10)];
        inventory[2].species = Species::Cat;

        let derived = categories(&inventory);
        assert_eq!(
            derived.get(&Species::Dog).unwrap(),
            &BTreeSet::from(["Beagle".to_owned()])
        );
        assert_eq!(
            derived.get(&Species::Cat).unwrap(),
            &BTreeSet::from(["Terrier".to_owned()])
        );
    }

    #[test]
    fn test_price_ceiling_rounds_up_to_nearest_hundred() {
        assert_eq!(
            price_ceiling(&[pet("A", 149, 0), pet("B", 820, 0)]),
            Decimal::new(900, 0)
        );
        // Exact multiples stay put.
        assert_eq!(price_ceiling(&[pet("A", 300, 0)]), Decimal::new(300, 0));
        assert_eq!(price_ceiling(&[]), Decimal::ZERO);
    }
}

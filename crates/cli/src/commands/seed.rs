//! Seed sample listings for local development.

use rust_decimal::Decimal;

use pet_haven_admin::db::{NewPet, PetRepository};
use pet_haven_core::{PriceType, Species};

use super::{CommandError, connect};

/// Insert a handful of sample listings.
///
/// # Errors
///
/// Returns `CommandError` if a database operation fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = PetRepository::new(&pool);

    let samples = [
        (
            Species::Dog,
            "Golden Retriever",
            "9 weeks",
            "450.00",
            PriceType::Each,
            "Vaccinated, well socialized, loves water.",
        ),
        (
            Species::Cat,
            "British Shorthair",
            "12 weeks",
            "380.00",
            PriceType::Each,
            "Calm temperament, litter trained.",
        ),
        (
            Species::Bird,
            "Cockatiel",
            "6 months",
            "120.00",
            PriceType::Pair,
            "Hand-raised bonded pair, whistles back.",
        ),
        (
            Species::Rabbit,
            "Holland Lop",
            "10 weeks",
            "85.00",
            PriceType::Each,
            "Floppy ears, friendly with children.",
        ),
    ];

    for (species, breed, age, price, price_type, description) in samples {
        let price: Decimal = price
            .parse()
            .map_err(|_| CommandError::Invalid(format!("bad sample price: {price}")))?;

        let pet = repo
            .insert(&NewPet {
                species,
                breed: breed.to_owned(),
                age: age.to_owned(),
                price,
                price_type,
                images: vec![],
                videos: vec![],
                description: description.to_owned(),
                color_variants: vec![],
                in_stock: true,
                is_visible: true,
                featured: false,
                created_by: None,
            })
            .await?;

        tracing::info!(id = %pet.id, breed = %pet.breed, "sample listing created");
    }

    Ok(())
}

//! Share-link and QR-code generation for listings.
//!
//! Builds the canonical detail URL for a listing, a WhatsApp deep link
//! pre-populated with a structured inquiry message, and a scannable QR code
//! of the detail URL rendered as a downloadable PNG.

use std::io::Cursor;

use pet_haven_core::{Pet, PetId};

/// Errors from QR rendering.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// The payload could not be encoded as a QR code.
    #[error("qr encoding error: {0}")]
    Qr(#[from] qrcode::types::QrError),

    /// PNG encoding failed.
    #[error("png encoding error: {0}")]
    Png(#[from] image::ImageError),
}

/// Canonical detail-page URL for a listing.
#[must_use]
pub fn detail_url(base_url: &str, id: PetId) -> String {
    format!("{}/pets/{id}", base_url.trim_end_matches('/'))
}

/// WhatsApp deep link with a structured inquiry message for a listing.
///
/// `number` is the shop's WhatsApp number in international digits-only
/// format.
#[must_use]
pub fn whatsapp_link(number: &str, pet: &Pet, detail_url: &str) -> String {
    let message = format!(
        "Hi! I'm interested in this pet:\n\
         Breed: {} ({})\n\
         Age: {}\n\
         Price: {} per {}\n\
         {detail_url}",
        pet.breed, pet.species, pet.age, pet.price, pet.price_type,
    );

    format!("https://wa.me/{number}?text={}", urlencoding::encode(&message))
}

/// Render a URL as a QR code PNG.
///
/// # Errors
///
/// Returns `ShareError` if QR or PNG encoding fails.
pub fn qr_png(url: &str) -> Result<Vec<u8>, ShareError> {
    let code = qrcode::QrCode::new(url.as_bytes())?;
    let qr_image = code
        .render::<image::Luma<u8>>()
        .min_dimensions(512, 512)
        .build();

    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(qr_image)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

    Ok(png)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pet_haven_core::{PriceType, Species};
    use rust_decimal::Decimal;

    fn pet() -> Pet {
        Pet {
            id: PetId::generate(),
            species: Species::Bird,
            breed: "Cockatiel".to_owned(),
            age: "6 months".to_owned(),
            price: Decimal::new(120, 0),
            price_type: PriceType::Pair,
            image: None,
            images: vec![],
            video: None,
            videos: vec![],
            description: "Hand-raised pair".to_owned(),
            color_variants: vec![],
            in_stock: true,
            is_visible: true,
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        }
    }

    #[test]
    fn test_detail_url_shape() {
        let pet = pet();
        let url = detail_url("https://shop.example.com/", pet.id);
        assert_eq!(url, format!("https://shop.example.com/pets/{}", pet.id));
    }

    #[test]
    fn test_whatsapp_link_encodes_message() {
        let pet = pet();
        let link = whatsapp_link("15551234567", &pet, "https://shop.example.com/pets/x");

        assert!(link.starts_with("https://wa.me/15551234567?text="));
        assert!(link.contains("Cockatiel"));
        // The message body must be URL-encoded.
        assert!(!link.contains(' '));
        assert!(!link.contains('\n'));
    }

    #[test]
    fn test_qr_png_produces_png_bytes() {
        let png = qr_png("https://shop.example.com/pets/abc").unwrap();
        // PNG magic number.
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}

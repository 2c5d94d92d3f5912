use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::media::AudioPcm;

/// Kind of deal advertised in the top-left badge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NegotiationType {
    /// For sale.
    #[default]
    #[serde(rename = "VENDA", alias = "venda")]
    Sell,
    /// For rent.
    #[serde(rename = "ALUGA", alias = "aluga")]
    Rent,
}

impl NegotiationType {
    /// Badge label.
    pub fn label(self) -> &'static str {
        match self {
            NegotiationType::Sell => "VENDA",
            NegotiationType::Rent => "ALUGA",
        }
    }
}

/// Property category. Only used to pick the default location prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PropertyType {
    /// House.
    #[default]
    #[serde(rename = "CASA", alias = "casa")]
    House,
    /// Apartment.
    #[serde(rename = "APARTAMENTO", alias = "apartamento")]
    Apartment,
    /// Land lot.
    #[serde(rename = "TERRENO", alias = "terreno")]
    Land,
}

/// How photos are placed on the animated surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Cover-fit with a slow zoom.
    #[default]
    Fill,
    /// Letterboxed over a blurred backdrop.
    Fit,
}

/// Soundtrack for an animated capture.
#[derive(Clone, Debug, Default)]
pub enum AudioRef {
    /// No soundtrack; capture is silent.
    #[default]
    None,
    /// Audio file decoded with `ffmpeg` (requires the `media-ffmpeg` feature).
    Path(PathBuf),
    /// Already-decoded PCM.
    Pcm(Arc<AudioPcm>),
}

/// Listing fields rendered by the overlay.
///
/// The animated compositor holds it behind an `Arc` for a whole session and still composers
/// borrow it per call. Neither mutates it.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreativeMetadata {
    /// Price text, drawn verbatim.
    pub price: String,
    /// Sale or rent.
    pub negotiation: NegotiationType,
    /// Property category.
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Line above the neighborhood, e.g. "CASA NO".
    pub location_prefix: String,
    /// Headline.
    pub neighborhood: String,
    /// City shown in the location chip.
    pub city: String,
    /// Area in square meters.
    pub area: String,
    /// Bedroom count.
    pub beds: String,
    /// Bathroom count.
    pub baths: String,
    /// Parking spots.
    pub parking: String,
    /// Free-form amenity list. Not rendered.
    pub amenities: Vec<String>,
    /// Photo placement for the animated output.
    pub fit_mode: FitMode,
    /// Soundtrack for the animated output.
    #[serde(skip)]
    pub audio: AudioRef,
}

/// Fields produced by a metadata extractor. Missing fields leave the target unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PartialMetadata {
    /// Price text.
    pub price: Option<String>,
    /// Neighborhood.
    pub neighborhood: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Property category.
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    /// Sale or rent.
    pub negotiation: Option<NegotiationType>,
    /// Area.
    pub area: Option<String>,
    /// Bedrooms.
    pub beds: Option<String>,
    /// Bathrooms.
    pub baths: Option<String>,
    /// Parking spots.
    pub parking: Option<String>,
    /// Amenities.
    pub amenities: Option<Vec<String>>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl CreativeMetadata {
    /// Return a copy with every extracted field applied.
    ///
    /// An extracted property type also resets the location prefix.
    pub fn merged(&self, partial: PartialMetadata) -> Self {
        let mut out = self.clone();
        if let Some(v) = non_empty(partial.price) {
            out.price = v;
        }
        if let Some(v) = non_empty(partial.neighborhood) {
            out.neighborhood = v;
        }
        if let Some(v) = non_empty(partial.city) {
            out.city = v;
        }
        if let Some(v) = non_empty(partial.area) {
            out.area = v;
        }
        if let Some(v) = non_empty(partial.beds) {
            out.beds = v;
        }
        if let Some(v) = non_empty(partial.baths) {
            out.baths = v;
        }
        if let Some(v) = non_empty(partial.parking) {
            out.parking = v;
        }
        if let Some(v) = partial.amenities {
            out.amenities = v;
        }
        if let Some(v) = partial.negotiation {
            out.negotiation = v;
        }
        if let Some(t) = partial.property_type {
            out.property_type = t;
            out.location_prefix = match t {
                PropertyType::Apartment => "APTO NO",
                _ => "CASA NO",
            }
            .to_owned();
        }
        out
    }

    /// Fill empty display fields with their stock values.
    pub fn with_defaults(mut self) -> Self {
        fn fill(slot: &mut String, value: &str) {
            if slot.trim().is_empty() {
                *slot = value.to_owned();
            }
        }
        fill(&mut self.price, "Sob Consulta");
        fill(&mut self.neighborhood, "Bairro");
        fill(&mut self.city, "Rio Claro");
        fill(&mut self.area, "0");
        fill(&mut self.beds, "0");
        fill(&mut self.baths, "0");
        fill(&mut self.parking, "0");
        let prefix = match self.property_type {
            PropertyType::House => "CASA NO",
            _ => "APTO NO",
        };
        fill(&mut self.location_prefix, prefix);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/creative/metadata.rs"]
mod tests;

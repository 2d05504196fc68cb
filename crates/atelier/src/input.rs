//! Validated payloads accepted by the versioning engine

use crate::error::{DomainError, Result};
use crate::ids::ArtworkId;
use crate::model::{ArtworkFields, ArtworkText, Image, SeriesText};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Payload validation performed before any storage access
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Media descriptor for a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInput {
    pub original_path: String,
    #[serde(default)]
    pub webp_path: Option<String>,
    #[serde(default)]
    pub avif_path: Option<String>,
}

impl ImageInput {
    pub fn new(original_path: impl Into<String>) -> Self {
        Self {
            original_path: original_path.into(),
            webp_path: None,
            avif_path: None,
        }
    }

    pub fn into_image(self) -> Image {
        Image::new(self.original_path, self.webp_path, self.avif_path)
    }
}

impl Validate for ImageInput {
    fn validate(&self) -> Result<()> {
        if self.original_path.trim().is_empty() {
            return Err(DomainError::MissingOriginalPath);
        }
        Ok(())
    }
}

/// Titled localized text, shared validation for both entity kinds
trait Titled {
    fn title(&self) -> &str;
}

impl Titled for SeriesText {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for ArtworkText {
    fn title(&self) -> &str {
        &self.title
    }
}

fn validate_i18n<T: Titled>(i18n: &BTreeMap<String, T>) -> Result<()> {
    for (lang, text) in i18n {
        if lang.trim().is_empty() || lang.len() > 16 {
            return Err(DomainError::InvalidLanguage(lang.clone()));
        }
        if text.title().trim().is_empty() {
            return Err(DomainError::MissingTitle { lang: lang.clone() });
        }
    }
    Ok(())
}

fn validate_image(image: &Option<ImageInput>) -> Result<()> {
    image.as_ref().map_or(Ok(()), ImageInput::validate)
}

/// Request to create a series with its first revision
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSeries {
    #[serde(default, alias = "idLocked")]
    pub id_locked: bool,
    #[serde(default)]
    pub image: Option<ImageInput>,
    pub i18n: BTreeMap<String, SeriesText>,
}

impl Validate for NewSeries {
    fn validate(&self) -> Result<()> {
        if self.i18n.is_empty() {
            return Err(DomainError::NoLanguages);
        }
        validate_i18n(&self.i18n)?;
        validate_image(&self.image)
    }
}

/// Partial update of a series draft
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesPatch {
    #[serde(default)]
    pub image: Option<ImageInput>,
    /// Languages to upsert; languages not listed are left as they are
    #[serde(default)]
    pub i18n: Option<BTreeMap<String, SeriesText>>,
}

impl Validate for SeriesPatch {
    fn validate(&self) -> Result<()> {
        if let Some(i18n) = &self.i18n {
            validate_i18n(i18n)?;
        }
        validate_image(&self.image)
    }
}

/// Request to create an artwork inside a series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewArtwork {
    #[serde(default, alias = "sortIndex")]
    pub sort_index: Option<i64>,
    #[serde(default, alias = "idLocked")]
    pub id_locked: bool,
    #[serde(default)]
    pub sold: bool,
    #[serde(default)]
    pub image: Option<ImageInput>,
    #[serde(flatten)]
    pub fields: ArtworkFields,
    pub i18n: BTreeMap<String, ArtworkText>,
}

impl Validate for NewArtwork {
    fn validate(&self) -> Result<()> {
        if let Some(index) = self.sort_index.filter(|i| *i < 0) {
            return Err(DomainError::NegativeSortIndex(index));
        }
        if self.i18n.is_empty() {
            return Err(DomainError::NoLanguages);
        }
        validate_i18n(&self.i18n)?;
        validate_image(&self.image)
    }
}

/// Partial update of an artwork: identity flags plus draft content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtworkPatch {
    // identity
    #[serde(default, alias = "sortIndex")]
    pub sort_index: Option<i64>,
    #[serde(default, alias = "idLocked")]
    pub id_locked: Option<bool>,
    #[serde(default)]
    pub sold: Option<bool>,

    // revision
    #[serde(default)]
    pub image: Option<ImageInput>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default, alias = "sizeCM")]
    pub size_cm: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub i18n: Option<BTreeMap<String, ArtworkText>>,
}

impl ArtworkPatch {
    pub fn touches_identity(&self) -> bool {
        self.sort_index.is_some() || self.id_locked.is_some() || self.sold.is_some()
    }

    pub fn touches_fields(&self) -> bool {
        self.year.is_some() || self.medium.is_some() || self.size_cm.is_some() || self.price.is_some()
    }

    /// Overlay the provided scalar fields onto `fields`
    pub fn apply_fields(&self, fields: &mut ArtworkFields) {
        if let Some(year) = &self.year {
            fields.year = year.clone();
        }
        if let Some(medium) = &self.medium {
            fields.medium = medium.clone();
        }
        if let Some(size_cm) = &self.size_cm {
            fields.size_cm = size_cm.clone();
        }
        if let Some(price) = &self.price {
            fields.price = price.clone();
        }
    }
}

impl Validate for ArtworkPatch {
    fn validate(&self) -> Result<()> {
        if let Some(index) = self.sort_index.filter(|i| *i < 0) {
            return Err(DomainError::NegativeSortIndex(index));
        }
        if let Some(i18n) = &self.i18n {
            validate_i18n(i18n)?;
        }
        validate_image(&self.image)
    }
}

/// A reorder request must name each artwork at most once
pub fn validate_order(order: &[ArtworkId]) -> Result<()> {
    if order.is_empty() {
        return Err(DomainError::EmptyOrder);
    }
    let mut seen = HashSet::with_capacity(order.len());
    for id in order {
        if !seen.insert(id) {
            return Err(DomainError::DuplicateInOrder(id.to_string()));
        }
    }
    Ok(())
}

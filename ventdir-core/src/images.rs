//! Cloudflare Images delivery URLs and listing placeholders

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, Result};

pub const IMAGE_DELIVERY_BASE: &str = "https://imagedelivery.net";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Photo,
    Logo,
    StreetView,
    Gallery,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Logo => "logo",
            Self::StreetView => "street_view",
            Self::Gallery => "gallery",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "photo" => Ok(Self::Photo),
            "logo" => Ok(Self::Logo),
            "street_view" => Ok(Self::StreetView),
            "gallery" => Ok(Self::Gallery),
            other => Err(DirectoryError::invalid_variant("image_type", other)),
        }
    }
}

/// Named Cloudflare variants configured on the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    #[default]
    Public,
    Thumbnail,
    Hero,
}

impl ImageVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Thumbnail => "thumbnail",
            Self::Hero => "hero",
        }
    }
}

impl FromStr for ImageVariant {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Self::Public),
            "thumbnail" => Ok(Self::Thumbnail),
            "hero" => Ok(Self::Hero),
            other => Err(DirectoryError::invalid_variant("image_variant", other)),
        }
    }
}

/// A stored image reference (`location_images` row, minus bookkeeping).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationImage {
    pub cf_image_id: String,
    pub image_type: ImageType,
    #[serde(default)]
    pub is_primary: bool,
}

/// `https://imagedelivery.net/{hash}/{id}/{variant}`
pub fn cloudflare_image_url(account_hash: &str, image_id: &str, variant: ImageVariant) -> Result<String> {
    if account_hash.trim().is_empty() {
        return Err(DirectoryError::MissingAccountHash);
    }
    Ok(format!(
        "{IMAGE_DELIVERY_BASE}/{account_hash}/{image_id}/{}",
        variant.as_str()
    ))
}

/// URL of the primary image of `image_type`, if one exists.
pub fn location_image_url(
    images: &[LocationImage],
    image_type: ImageType,
    variant: ImageVariant,
    account_hash: &str,
) -> Result<Option<String>> {
    images
        .iter()
        .find(|img| img.image_type == image_type && img.is_primary)
        .map(|img| cloudflare_image_url(account_hash, &img.cf_image_id, variant))
        .transpose()
}

/// Hero image preference: street view, then photo, then logo.
pub fn hero_image_url(
    images: &[LocationImage],
    variant: ImageVariant,
    account_hash: &str,
) -> Result<Option<String>> {
    for image_type in [ImageType::StreetView, ImageType::Photo, ImageType::Logo] {
        if let Some(url) = location_image_url(images, image_type, variant, account_hash)? {
            return Ok(Some(url));
        }
    }
    Ok(None)
}

const GRADIENT_PAIRS: [(&str, &str); 8] = [
    ("#4F46E5", "#7C3AED"),
    ("#0891B2", "#06B6D4"),
    ("#059669", "#10B981"),
    ("#DC2626", "#EF4444"),
    ("#EA580C", "#F97316"),
    ("#8B5CF6", "#A78BFA"),
    ("#2563EB", "#3B82F6"),
    ("#DB2777", "#EC4899"),
];

/// 32-bit rolling string hash over UTF-16 code units, as the site's
/// front end computes it, so server and browser pick the same colors.
fn string_hash(input: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}

/// Deterministic CSS gradient for listings without images.
pub fn placeholder_gradient(location_id: &str) -> String {
    let hash = string_hash(location_id);
    let (from, to) = GRADIENT_PAIRS[(hash as usize) % GRADIENT_PAIRS.len()];
    let angle = (hash % 8) * 45;
    format!("linear-gradient({angle}deg, {from}, {to})")
}

/// Strip Google sizing parameters (`...=w408-h306-k-no`) so the same photo
/// at different sizes dedupes to one URL.
pub fn normalize_image_url(url: &str) -> &str {
    match url.find('=') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

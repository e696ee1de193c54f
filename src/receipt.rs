//! Receipt
//!
//! The structured receipt a vision model reads from a photo, and how it is
//! turned into a [`Bill`]. The model client itself lives outside this crate
//! behind [`ReceiptReader`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{bill::Bill, items::Item};

/// Number of characters of an unparseable reply kept for error messages.
const PREVIEW_CHARS: usize = 100;

/// Errors raised while reading a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The image format cannot be sent to the reader.
    #[error("{0} is not supported; convert the photo to JPEG or PNG first")]
    UnsupportedFormat(String),

    /// The reader returned an HTML page, usually an auth or billing error.
    #[error("receipt reader returned an error page; check the API key and credits")]
    HtmlResponse,

    /// The reply contained no JSON object.
    #[error("could not find a receipt in the reply: {preview}...")]
    NoJson {
        /// Start of the reply
        preview: String,
    },

    /// The JSON object in the reply did not match the receipt shape.
    #[error("failed to parse receipt JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The reader itself failed, e.g. a network or API error.
    #[error("receipt reader failed: {0}")]
    Reader(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// One printed line on a receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// Printed description
    pub name: String,

    /// Printed price
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

/// Structured contents of a receipt photo.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    /// Printed lines; quantities are expanded into duplicate lines
    #[serde(default)]
    pub items: Vec<ReceiptItem>,

    /// Printed subtotal
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub subtotal: Option<Decimal>,

    /// Printed total
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<Decimal>,

    /// Gratuity is already part of the printed total
    #[serde(default)]
    pub tip_included_in_total: bool,

    /// Hand-written tip, when it is not part of the total
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub tip: Option<Decimal>,
}

impl ReceiptData {
    /// Extracts a receipt from a model's free-text reply.
    ///
    /// The JSON object may be wrapped in prose or markdown fences; everything
    /// from the first `{` to the last `}` is parsed.
    ///
    /// # Errors
    ///
    /// - [`ReceiptError::HtmlResponse`]: the reply is an HTML page.
    /// - [`ReceiptError::NoJson`]: no JSON object was found.
    /// - [`ReceiptError::Json`]: the object does not match the receipt shape.
    pub fn from_response(reply: &str) -> Result<Self, ReceiptError> {
        let reply = reply.trim();

        if reply.starts_with('<') {
            return Err(ReceiptError::HtmlResponse);
        }

        let json = reply
            .find('{')
            .zip(reply.rfind('}'))
            .and_then(|(start, end)| reply.get(start..=end))
            .ok_or_else(|| ReceiptError::NoJson {
                preview: reply.chars().take(PREVIEW_CHARS).collect(),
            })?;

        Ok(serde_json::from_str(json)?)
    }

    /// Every printed line as an unsplit item paid for in full.
    pub fn to_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .map(|line| {
                Item::blank()
                    .named(line.name.clone())
                    .with_cost(line.cost)
            })
            .collect()
    }

    /// Fills a bill from the receipt.
    ///
    /// Items are replaced. Subtotal and total are only overwritten when the
    /// receipt shows a non-zero value. A hand-written tip becomes a flat tip.
    pub fn apply_to(&self, bill: &mut Bill) {
        bill.set_items(self.to_items());

        if let Some(subtotal) = self.subtotal.filter(|value| !value.is_zero()) {
            bill.set_subtotal(Some(subtotal));
        }

        if let Some(total) = self.total.filter(|value| !value.is_zero()) {
            bill.set_total(Some(total));
        }

        if self.tip_included_in_total {
            bill.set_tip(Some(Decimal::ZERO));
            bill.set_tip_included_in_total(true);
        } else if let Some(tip) = self.tip.filter(|value| !value.is_zero()) {
            bill.set_tip(Some(tip));
            bill.set_tip_is_rate(false);
            bill.set_tip_included_in_total(false);
        } else {
            bill.set_tip_included_in_total(false);
        }
    }
}

/// A receipt photo as uploaded.
#[derive(Clone, Debug)]
pub struct ReceiptImage {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl ReceiptImage {
    /// Wraps an uploaded photo.
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Returns the original file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the declared MIME type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the raw image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Rejects formats the vision model cannot read.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::UnsupportedFormat`] for HEIC/HEIF images.
    pub fn validate(&self) -> Result<(), ReceiptError> {
        let mime = self.mime_type.to_ascii_lowercase();
        let name = self.file_name.to_ascii_lowercase();

        if matches!(mime.as_str(), "image/heic" | "image/heif")
            || name.ends_with(".heic")
            || name.ends_with(".heif")
        {
            return Err(ReceiptError::UnsupportedFormat("HEIC/HEIF".to_string()));
        }

        Ok(())
    }
}

/// Reads a receipt photo into structured data.
pub trait ReceiptReader {
    /// Reads `image`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the image is unsupported or the reply
    /// cannot be understood.
    fn read(&self, image: &ReceiptImage) -> Result<ReceiptData, ReceiptError>;
}

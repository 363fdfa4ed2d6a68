//! Checkout workflow: validate, price and package a design.

use crate::error::PrepressError;
use crate::fees::{FeeLine, Money, quote_fees};
use crate::history::DesignHistoryClient;
use crate::validation::{ValidationOutcome, validate_design_colors};
use serde::{Deserialize, Serialize};
use spotpress_core::{DesignDocument, design_hash};
use spotpress_render::{PREVIEW_MAX_DIM, render_preview, to_data_uri};

/// The product the customer is customising.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSelection {
    pub product_id: String,
    pub name: String,
    pub base_price: Money,
    pub quantity: u32,
    pub product_type: String,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Design-specific options on the cart line item. Field names follow
/// the cart's JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub custom_design: bool,
    pub color_count: usize,
    pub design_hash: String,
    pub is_first_time_printing: bool,
}

/// A priced, fee-annotated line item ready for the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    /// Rendered design preview as a `data:image/png` URI.
    pub image: String,
    pub product_type: String,
    pub options: CartItemOptions,
    pub customized: bool,
    pub extra_fees: Vec<FeeLine>,
}

/// Outcome of a checkout attempt. Rejection carries the validation
/// message and is ordinary control flow.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    Rejected(ValidationOutcome),
    Ready(CartLineItem),
}

/// Sequenced pipeline from canvas to cart line item.
pub struct CheckoutWorkflow<H: DesignHistoryClient> {
    history: H,
    preview_dim: u32,
}

impl<H: DesignHistoryClient> CheckoutWorkflow<H> {
    pub fn new(history: H) -> Self {
        Self {
            history,
            preview_dim: PREVIEW_MAX_DIM,
        }
    }

    pub fn with_preview_dim(mut self, preview_dim: u32) -> Self {
        self.preview_dim = preview_dim;
        self
    }

    /// Run the pipeline: validate → hash → history lookup → fees →
    /// preview → line item. Each step completes before the next starts;
    /// a rejection short-circuits before any pricing work.
    pub async fn prepare(
        &self,
        document: &DesignDocument,
        selection: &ProductSelection,
    ) -> Result<CheckoutOutcome, PrepressError> {
        let validation = validate_design_colors(document);
        if !validation.is_valid {
            return Ok(CheckoutOutcome::Rejected(validation));
        }

        let hash = design_hash(document)?;
        let first_time = self.is_first_time(&hash).await;
        let extra_fees = quote_fees(validation.color_count, first_time);

        let preview = render_preview(document, self.preview_dim);
        let image = to_data_uri(&preview)?;

        Ok(CheckoutOutcome::Ready(CartLineItem {
            id: format!("{}-{}", selection.product_id, &hash[..12]),
            name: selection.name.clone(),
            price: selection.base_price,
            quantity: selection.quantity,
            image,
            product_type: selection.product_type.clone(),
            options: CartItemOptions {
                size: selection.size.clone(),
                color: selection.color.clone(),
                custom_design: true,
                color_count: validation.color_count,
                design_hash: hash,
                is_first_time_printing: first_time,
            },
            customized: true,
            extra_fees,
        }))
    }

    /// History lookup, failing open: an unreachable history service
    /// means the plate fee is charged, never that checkout blocks.
    async fn is_first_time(&self, hash: &str) -> bool {
        match self.history.has_been_printed(hash).await {
            Ok(printed) => !printed,
            Err(err) => {
                log::warn!("design history lookup failed; treating design as first-time: {err}");
                true
            }
        }
    }
}

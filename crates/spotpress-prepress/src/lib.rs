//! spotpress Prepress Library
//!
//! Everything between a finished canvas and the cart: the
//! print-compliance validation gate, the advisory complexity
//! heuristic, the fee schedule, the first-time-print workflow against
//! the external design-history store, and mockup asset loading.

pub mod assets;
pub mod checkout;
pub mod complexity;
pub mod error;
pub mod fees;
pub mod history;
pub mod validation;

pub use assets::{AssetError, ImageSource, LoadedMockup, MockupLoader};
pub use checkout::{
    CartItemOptions, CartLineItem, CheckoutOutcome, CheckoutWorkflow, ProductSelection,
};
pub use complexity::{ComplexityClass, ComplexityReport, analyze_design_complexity};
pub use error::PrepressError;
pub use fees::{FeeLine, Money, quote_fees};
pub use history::{DesignHistoryClient, HistoryError, HttpDesignHistory, InMemoryDesignHistory};
pub use validation::{ValidationOutcome, validate_design_colors};

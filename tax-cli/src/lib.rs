//! Command-line front end for the federal tax estimator.

pub mod app;
pub mod batch;
pub mod config;
pub mod form;
pub mod logging;
pub mod presenter;
pub mod request;
pub mod utils;
pub mod wizard;

pub use form::{FieldError, FormErrors, TaxForm};
pub use presenter::CalculationState;
pub use wizard::{Wizard, WizardError, WizardEvent, WizardStep};

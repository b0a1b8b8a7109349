//! The step-by-step estimate wizard.
//!
//! [`Wizard`] is a small state machine: the active step, the steps the user
//! has reached, the raw form and the latest calculation outcome. It performs
//! no I/O; the `wizard` subcommand feeds it events read from stdin.

use std::collections::BTreeSet;
use std::fmt;

use tax_core::{CreditKind, DeductionKind, FilingStatusCode, IncomeSource, TaxCalculator};
use thiserror::Error;
use tracing::{debug, warn};

use crate::form::TaxForm;
use crate::presenter::CalculationState;

/// Message shown when the wizard is asked to calculate without a usable age.
pub const INVALID_AGE_MESSAGE: &str = "Please enter a valid age.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Situation,
    Income,
    Deductions,
    Credits,
    Results,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        Self::Situation,
        Self::Income,
        Self::Deductions,
        Self::Credits,
        Self::Results,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Situation => "Your Situation",
            Self::Income => "Income",
            Self::Deductions => "Deductions",
            Self::Credits => "Credits",
            Self::Results => "Results",
        }
    }

    /// Accepts the step name in any case, or its 1-based position.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        Self::ALL
            .into_iter()
            .find(|step| format!("{step:?}").eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for WizardStep {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    Next,
    Previous,
    NavigateTo(WizardStep),
    Calculate,
    Reset,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("already on the first step")]
    NoPreviousStep,

    #[error("already on the last step")]
    NoNextStep,

    #[error("step '{0}' has not been reached yet")]
    NotVisited(WizardStep),

    #[error("'{field}' is not a field on the {step} step")]
    UnknownField { step: WizardStep, field: String },

    #[error("unknown filing status '{0}'")]
    InvalidFilingStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    step: WizardStep,
    visited: BTreeSet<WizardStep>,
    form: TaxForm,
    state: CalculationState,
}

impl Default for Wizard {
    fn default() -> Self {
        Self {
            step: WizardStep::Situation,
            visited: BTreeSet::from([WizardStep::Situation]),
            form: TaxForm::default(),
            state: CalculationState::NotComputed,
        }
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_visited(
        &self,
        step: WizardStep,
    ) -> bool {
        self.visited.contains(&step)
    }

    pub fn form(&self) -> &TaxForm {
        &self.form
    }

    pub fn state(&self) -> &CalculationState {
        &self.state
    }

    /// Applies one event. A rejected event leaves the wizard unchanged.
    pub fn handle(
        &mut self,
        event: WizardEvent,
        calculator: &TaxCalculator<'_>,
    ) -> Result<(), WizardError> {
        debug!(?event, step = ?self.step, "wizard event");
        match event {
            WizardEvent::Next => {
                let next = self.step.next().ok_or(WizardError::NoNextStep)?;
                self.go_to(next);
            }
            WizardEvent::Previous => {
                self.step = self.step.previous().ok_or(WizardError::NoPreviousStep)?;
            }
            WizardEvent::NavigateTo(step) => {
                if !self.is_visited(step) {
                    return Err(WizardError::NotVisited(step));
                }
                self.step = step;
            }
            WizardEvent::Calculate => self.calculate(calculator),
            WizardEvent::Reset => *self = Self::default(),
        }
        Ok(())
    }

    /// Sets a field on the active step.
    ///
    /// The situation step takes `filingStatus`, `age` and `spouseAge`; the
    /// other input steps take their catalog keys.
    pub fn set_field(
        &mut self,
        field: &str,
        value: &str,
    ) -> Result<(), WizardError> {
        let unknown = || WizardError::UnknownField {
            step: self.step,
            field: field.to_string(),
        };
        let value = value.to_string();

        match self.step {
            WizardStep::Situation => match field {
                "filingStatus" => {
                    self.form.filing_status = FilingStatusCode::parse(&value)
                        .ok_or(WizardError::InvalidFilingStatus(value))?;
                }
                "age" => self.form.age = value,
                "spouseAge" => self.form.spouse_age = value,
                _ => return Err(unknown()),
            },
            WizardStep::Income => {
                let source = IncomeSource::from_key(field).ok_or_else(unknown)?;
                self.form.income.insert(source, value);
            }
            WizardStep::Deductions => {
                let kind = DeductionKind::from_key(field).ok_or_else(unknown)?;
                self.form.deductions.insert(kind, value);
            }
            WizardStep::Credits => {
                let kind = CreditKind::from_key(field).ok_or_else(unknown)?;
                self.form.credits.insert(kind, value);
            }
            WizardStep::Results => return Err(unknown()),
        }
        Ok(())
    }

    fn go_to(
        &mut self,
        step: WizardStep,
    ) {
        self.visited.insert(step);
        self.step = step;
    }

    /// Replaces the previous outcome with a fresh one.
    fn calculate(
        &mut self,
        calculator: &TaxCalculator<'_>,
    ) {
        let age_ok = matches!(self.form.age(), Ok(age) if age > 0);
        if !age_ok {
            warn!(age = %self.form.age, "calculation requested without a valid age");
            self.state = CalculationState::Failed(INVALID_AGE_MESSAGE.to_string());
            self.step = WizardStep::Situation;
            return;
        }

        self.state = match self.form.collect() {
            Err(errors) => CalculationState::Failed(errors.to_string()),
            Ok(input) => match calculator.compute(&input) {
                Ok(breakdown) => CalculationState::Computed(breakdown),
                Err(e) => CalculationState::Failed(e.to_string()),
            },
        };
        self.go_to(WizardStep::Results);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::TaxTables;

    use super::*;

    fn tables() -> TaxTables {
        tax_data::builtin_tables(2024).expect("built-in tables")
    }

    fn wizard_on(step: WizardStep) -> Wizard {
        let mut wizard = Wizard::new();
        for s in WizardStep::ALL {
            wizard.visited.insert(s);
        }
        wizard.step = step;
        wizard
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn step_order_is_fixed() {
        assert_eq!(WizardStep::Situation.next(), Some(WizardStep::Income));
        assert_eq!(WizardStep::Credits.next(), Some(WizardStep::Results));
        assert_eq!(WizardStep::Results.next(), None);
        assert_eq!(WizardStep::Situation.previous(), None);
        assert_eq!(WizardStep::Income.previous(), Some(WizardStep::Situation));
    }

    #[test]
    fn step_parses_name_or_position() {
        assert_eq!(WizardStep::parse("deductions"), Some(WizardStep::Deductions));
        assert_eq!(WizardStep::parse("2"), Some(WizardStep::Income));
        assert_eq!(WizardStep::parse("0"), None);
        assert_eq!(WizardStep::parse("6"), None);
        assert_eq!(WizardStep::parse("summary"), None);
    }

    #[test]
    fn next_marks_step_visited() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = Wizard::new();

        assert!(!wizard.is_visited(WizardStep::Income));
        wizard.handle(WizardEvent::Next, &calc).unwrap();

        assert_eq!(wizard.step(), WizardStep::Income);
        assert!(wizard.is_visited(WizardStep::Income));
    }

    #[test]
    fn previous_on_first_step_is_rejected() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = Wizard::new();

        assert_eq!(
            wizard.handle(WizardEvent::Previous, &calc),
            Err(WizardError::NoPreviousStep)
        );
        assert_eq!(wizard, Wizard::new());
    }

    #[test]
    fn navigate_only_to_visited_steps() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = Wizard::new();

        assert_eq!(
            wizard.handle(WizardEvent::NavigateTo(WizardStep::Credits), &calc),
            Err(WizardError::NotVisited(WizardStep::Credits))
        );

        wizard.handle(WizardEvent::Next, &calc).unwrap();
        wizard.handle(WizardEvent::Next, &calc).unwrap();
        wizard
            .handle(WizardEvent::NavigateTo(WizardStep::Situation), &calc)
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::Situation);

        // Going back does not forget later steps.
        wizard
            .handle(WizardEvent::NavigateTo(WizardStep::Deductions), &calc)
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::Deductions);
    }

    #[test]
    fn next_on_results_is_rejected() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = wizard_on(WizardStep::Results);

        assert_eq!(wizard.handle(WizardEvent::Next, &calc), Err(WizardError::NoNextStep));
    }

    // =========================================================================
    // Fields
    // =========================================================================

    #[test]
    fn fields_belong_to_their_step() {
        let mut wizard = Wizard::new();

        wizard.set_field("filingStatus", "MFJ").unwrap();
        wizard.set_field("age", "45").unwrap();
        assert_eq!(wizard.form().filing_status, FilingStatusCode::MarriedFilingJointly);

        assert_eq!(
            wizard.set_field("wages", "1000"),
            Err(WizardError::UnknownField {
                step: WizardStep::Situation,
                field: "wages".to_string(),
            })
        );

        let mut wizard = wizard_on(WizardStep::Income);
        wizard.set_field("wages", "1000").unwrap();
        assert_eq!(wizard.form().income[&IncomeSource::Wages], "1000");
        assert!(wizard.set_field("eitc", "1").is_err());
    }

    #[test]
    fn bad_filing_status_is_rejected() {
        let mut wizard = Wizard::new();

        assert_eq!(
            wizard.set_field("filingStatus", "QSS"),
            Err(WizardError::InvalidFilingStatus("QSS".to_string()))
        );
    }

    // =========================================================================
    // Calculate / Reset
    // =========================================================================

    #[test]
    fn calculate_without_age_returns_to_situation() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = wizard_on(WizardStep::Credits);

        wizard.handle(WizardEvent::Calculate, &calc).unwrap();

        assert_eq!(wizard.step(), WizardStep::Situation);
        assert_eq!(
            wizard.state(),
            &CalculationState::Failed(INVALID_AGE_MESSAGE.to_string())
        );
    }

    #[test]
    fn calculate_with_zero_age_fails() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = Wizard::new();
        wizard.set_field("age", "0").unwrap();

        wizard.handle(WizardEvent::Calculate, &calc).unwrap();

        assert!(matches!(wizard.state(), CalculationState::Failed(_)));
        assert_eq!(wizard.step(), WizardStep::Situation);
    }

    #[test]
    fn calculate_shows_results() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = Wizard::new();
        wizard.set_field("age", "30").unwrap();
        wizard.handle(WizardEvent::Next, &calc).unwrap();
        wizard.set_field("wages", "50,000").unwrap();

        wizard.handle(WizardEvent::Calculate, &calc).unwrap();

        assert_eq!(wizard.step(), WizardStep::Results);
        assert!(wizard.is_visited(WizardStep::Results));
        let breakdown = wizard.state().breakdown().expect("computed");
        assert_eq!(breakdown.taxable_income, dec!(35400));
        assert_eq!(breakdown.final_tax_or_refund, dec!(4016.00));
    }

    #[test]
    fn recalculate_replaces_outcome() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = wizard_on(WizardStep::Situation);
        wizard.set_field("age", "30").unwrap();
        wizard.handle(WizardEvent::Calculate, &calc).unwrap();
        assert!(matches!(wizard.state(), CalculationState::Computed(_)));

        wizard
            .handle(WizardEvent::NavigateTo(WizardStep::Income), &calc)
            .unwrap();
        wizard.set_field("wages", "ten").unwrap();
        wizard.handle(WizardEvent::Calculate, &calc).unwrap();

        match wizard.state() {
            CalculationState::Failed(message) => {
                assert!(message.starts_with("wages: invalid amount 'ten'"), "{message}")
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn reset_restores_initial_state() {
        let tables = tables();
        let calc = TaxCalculator::new(&tables);
        let mut wizard = Wizard::new();
        wizard.set_field("age", "30").unwrap();
        wizard.handle(WizardEvent::Calculate, &calc).unwrap();

        wizard.handle(WizardEvent::Reset, &calc).unwrap();

        assert_eq!(wizard, Wizard::new());
    }
}

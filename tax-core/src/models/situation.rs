use serde::{Deserialize, Serialize};

use crate::FilingStatusCode;

/// The taxpayer's filing situation.
///
/// Ages are signed so that out-of-range form input reaches the calculator and
/// is rejected there as a validation error rather than silently wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Situation {
    pub filing_status: FilingStatusCode,
    pub age: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_age: Option<i32>,
}

impl Situation {
    pub fn new(
        filing_status: FilingStatusCode,
        age: i32,
    ) -> Self {
        Self {
            filing_status,
            age,
            spouse_age: None,
        }
    }

    pub fn with_spouse_age(
        mut self,
        spouse_age: i32,
    ) -> Self {
        self.spouse_age = Some(spouse_age);
        self
    }

    /// Ages that count toward the additional standard deduction.
    ///
    /// The spouse's age is only considered on a joint return.
    pub fn counted_ages(&self) -> impl Iterator<Item = i32> + '_ {
        let spouse = if self.filing_status.requires_spouse_age() {
            self.spouse_age
        } else {
            None
        };
        std::iter::once(self.age).chain(spouse)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn counted_ages_includes_spouse_on_joint_return() {
        let situation = Situation::new(FilingStatusCode::MarriedFilingJointly, 40).with_spouse_age(66);

        assert_eq!(situation.counted_ages().collect::<Vec<_>>(), vec![40, 66]);
    }

    #[test]
    fn counted_ages_ignores_spouse_when_filing_separately() {
        let situation =
            Situation::new(FilingStatusCode::MarriedFilingSeparately, 40).with_spouse_age(70);

        assert_eq!(situation.counted_ages().collect::<Vec<_>>(), vec![40]);
    }
}

//! Challenge predicates expressed as data.
//!
//! A [`Rule`] is a pure function of the two press counters. Keeping it as an
//! enum instead of a closure lets the catalog be validated, serialized and
//! inspected without running a game.

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Red,
    Blue,
}

impl Button {
    pub fn other(self) -> Self {
        match self {
            Button::Red => Button::Blue,
            Button::Blue => Button::Red,
        }
    }
}

/// Press counters for the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presses {
    pub red: u32,
    pub blue: u32,
}

impl Presses {
    pub fn new(red: u32, blue: u32) -> Self {
        Self { red, blue }
    }

    pub fn get(self, button: Button) -> u32 {
        match button {
            Button::Red => self.red,
            Button::Blue => self.blue,
        }
    }

    /// Increment one counter. Saturates instead of wrapping.
    pub fn press(&mut self, button: Button) {
        match button {
            Button::Red => self.red = self.red.saturating_add(1),
            Button::Blue => self.blue = self.blue.saturating_add(1),
        }
    }

    pub fn total(self) -> Result<u32, RuleError> {
        self.red.checked_add(self.blue).ok_or(RuleError::Overflow {
            red: self.red,
            blue: self.blue,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Any,
    Exactly(u32),
    AtLeast(u32),
}

impl Bound {
    pub fn matches(self, count: u32) -> bool {
        match self {
            Bound::Any => true,
            Bound::Exactly(n) => count == n,
            Bound::AtLeast(n) => count >= n,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn matches(self, n: u32) -> bool {
        match self {
            Parity::Even => n % 2 == 0,
            Parity::Odd => n % 2 == 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Independent bound on each counter.
    Counts { red: Bound, blue: Bound },
    /// Bound on `red + blue`.
    Total { bound: Bound },
    /// `more` strictly exceeds the other button, and was pressed at least once.
    MoreThan { more: Button },
    /// Both counters equal and non-zero.
    SameCount,
    /// `larger == other * factor`, with the other button pressed at least once.
    Multiple { larger: Button, factor: u32 },
    /// Both buttons pressed, each count with the given parity.
    Parity { red: Parity, blue: Parity },
    /// Total has the given parity and is strictly greater than `above`.
    TotalParity { parity: Parity, above: u32 },
}

impl Rule {
    pub const fn counts(red: Bound, blue: Bound) -> Self {
        Rule::Counts { red, blue }
    }

    pub const fn total(bound: Bound) -> Self {
        Rule::Total { bound }
    }

    pub fn evaluate(&self, presses: Presses) -> Result<bool, RuleError> {
        let Presses { red, blue } = presses;
        let ok = match *self {
            Rule::Counts {
                red: red_bound,
                blue: blue_bound,
            } => red_bound.matches(red) && blue_bound.matches(blue),
            Rule::Total { bound } => bound.matches(presses.total()?),
            Rule::MoreThan { more } => {
                let more_count = presses.get(more);
                more_count > presses.get(more.other()) && more_count > 0
            }
            Rule::SameCount => red == blue && red > 0,
            Rule::Multiple { larger, factor } => {
                let small = presses.get(larger.other());
                let scaled = small
                    .checked_mul(factor)
                    .ok_or(RuleError::Overflow { red, blue })?;
                presses.get(larger) == scaled && small > 0
            }
            Rule::Parity {
                red: red_parity,
                blue: blue_parity,
            } => red > 0 && blue > 0 && red_parity.matches(red) && blue_parity.matches(blue),
            Rule::TotalParity { parity, above } => {
                let total = presses.total()?;
                parity.matches(total) && total > above
            }
        };
        Ok(ok)
    }

    /// Smallest press combination (by total, then red) that satisfies the rule,
    /// searching counts up to `max_presses` per button.
    pub fn witness(&self, max_presses: u32) -> Option<Presses> {
        let mut best: Option<Presses> = None;
        for red in 0..=max_presses {
            for blue in 0..=max_presses {
                let candidate = Presses::new(red, blue);
                if self.evaluate(candidate) != Ok(true) {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some(b) => (red + blue, red) < (b.red + b.blue, b.red),
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(rule: Rule, red: u32, blue: u32) -> bool {
        rule.evaluate(Presses::new(red, blue)).unwrap()
    }

    #[test]
    fn test_counts_rule() {
        let press_red = Rule::counts(Bound::AtLeast(1), Bound::Exactly(0));
        assert!(eval(press_red, 1, 0));
        assert!(eval(press_red, 4, 0));
        assert!(!eval(press_red, 0, 0));
        assert!(!eval(press_red, 1, 1));

        let avoid_blue = Rule::counts(Bound::Any, Bound::Exactly(0));
        assert!(eval(avoid_blue, 0, 0));
        assert!(eval(avoid_blue, 9, 0));
        assert!(!eval(avoid_blue, 0, 1));
    }

    #[test]
    fn test_more_than_requires_a_press() {
        let rule = Rule::MoreThan { more: Button::Blue };
        assert!(eval(rule, 1, 2));
        assert!(!eval(rule, 0, 0));
        assert!(!eval(rule, 2, 2));
    }

    #[test]
    fn test_multiple_rule() {
        let red_double = Rule::Multiple {
            larger: Button::Red,
            factor: 2,
        };
        assert!(eval(red_double, 4, 2));
        assert!(!eval(red_double, 0, 0));
        assert!(!eval(red_double, 3, 2));
    }

    #[test]
    fn test_parity_rules() {
        let rule = Rule::Parity {
            red: Parity::Even,
            blue: Parity::Odd,
        };
        assert!(eval(rule, 2, 1));
        assert!(!eval(rule, 0, 1));
        assert!(!eval(rule, 2, 2));

        let total = Rule::TotalParity {
            parity: Parity::Odd,
            above: 4,
        };
        assert!(eval(total, 3, 2));
        assert!(!eval(total, 2, 2));
        assert!(!eval(total, 1, 2));
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        let total = Rule::total(Bound::Exactly(3));
        let err = total.evaluate(Presses::new(u32::MAX, 1)).unwrap_err();
        assert_eq!(
            err,
            RuleError::Overflow {
                red: u32::MAX,
                blue: 1
            }
        );

        let multiple = Rule::Multiple {
            larger: Button::Blue,
            factor: 2,
        };
        assert!(multiple.evaluate(Presses::new(u32::MAX, 0)).is_err());
    }

    #[test]
    fn test_witness_finds_smallest_solution() {
        let rule = Rule::counts(Bound::Exactly(3), Bound::Exactly(2));
        assert_eq!(rule.witness(8), Some(Presses::new(3, 2)));

        let nothing = Rule::counts(Bound::Exactly(0), Bound::Exactly(0));
        assert_eq!(nothing.witness(8), Some(Presses::new(0, 0)));

        let unreachable = Rule::total(Bound::Exactly(20));
        assert_eq!(unreachable.witness(8), None);
    }

    #[test]
    fn test_rule_serializes_with_kind_tag() {
        let rule = Rule::MoreThan { more: Button::Red };
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, r#"{"kind":"more_than","more":"red"}"#);
        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}

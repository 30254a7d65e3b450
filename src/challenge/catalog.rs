use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::challenge::rule::{Bound, Button, Parity, Rule};
use crate::error::GameError;

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// Per-button search limit used when checking that a rule can be satisfied.
const WITNESS_SEARCH_LIMIT: u32 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    NoPress,
    SingleButton,
    MultiplePresses,
    BothButtons,
    Confusing,
    TotalCount,
    ExtremePresses,
    ExtremeCombination,
    ExtremeTotal,
    MathLogic,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::NoPress => "no-press",
            Category::SingleButton => "single-button",
            Category::MultiplePresses => "multiple-presses",
            Category::BothButtons => "both-buttons",
            Category::Confusing => "confusing",
            Category::TotalCount => "total-count",
            Category::ExtremePresses => "extreme-presses",
            Category::ExtremeCombination => "extreme-combination",
            Category::ExtremeTotal => "extreme-total",
            Category::MathLogic => "math-logic",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub id: &'static str,
    pub text: &'static str,
    pub rule: Rule,
    pub difficulty: u8,
    pub category: Option<Category>,
}

impl Challenge {
    pub const fn new(
        id: &'static str,
        text: &'static str,
        difficulty: u8,
        category: Category,
        rule: Rule,
    ) -> Self {
        Self {
            id,
            text,
            rule,
            difficulty,
            category: Some(category),
        }
    }
}

use Bound::{Any, AtLeast, Exactly};
use Category::*;

const fn c(id: &'static str, text: &'static str, difficulty: u8, category: Category, rule: Rule) -> Challenge {
    Challenge::new(id, text, difficulty, category, rule)
}

const fn counts(red: Bound, blue: Bound) -> Rule {
    Rule::counts(red, blue)
}

const fn total(bound: Bound) -> Rule {
    Rule::total(bound)
}

pub static CHALLENGES: &[Challenge] = &[
    c("no-press", "¡NO PRESIONES NADA!", 2, NoPress, counts(Exactly(0), Exactly(0))),
    c("hands-still", "¡MANOS QUIETAS!", 2, NoPress, counts(Exactly(0), Exactly(0))),
    c("dont-touch", "NO TOQUES LOS BOTONES", 2, NoPress, counts(Exactly(0), Exactly(0))),
    c("freeze", "¡QUIETO!", 1, NoPress, counts(Exactly(0), Exactly(0))),
    c("wait", "¡ESPERA!", 1, NoPress, counts(Exactly(0), Exactly(0))),
    c("do-nothing", "¡NO HAGAS NADA!", 2, NoPress, counts(Exactly(0), Exactly(0))),
    c("press-red", "PRESIONA ROJO", 1, SingleButton, counts(AtLeast(1), Exactly(0))),
    c("press-blue", "PRESIONA AZUL", 1, SingleButton, counts(Exactly(0), AtLeast(1))),
    c("only-red", "SOLO ROJO", 1, SingleButton, counts(AtLeast(1), Exactly(0))),
    c("only-blue", "SOLO AZUL", 1, SingleButton, counts(Exactly(0), AtLeast(1))),
    c("activate-red", "ACTIVA SISTEMA ROJO", 1, SingleButton, counts(AtLeast(1), Exactly(0))),
    c("activate-blue", "ACTIVA SISTEMA AZUL", 1, SingleButton, counts(Exactly(0), AtLeast(1))),
    c("choose-red", "ELIGE ROJO", 1, SingleButton, counts(AtLeast(1), Exactly(0))),
    c("choose-blue", "ELIGE AZUL", 1, SingleButton, counts(Exactly(0), AtLeast(1))),
    c("red-twice", "PRESIONA ROJO 2 VECES", 2, MultiplePresses, counts(Exactly(2), Exactly(0))),
    c("blue-twice", "PRESIONA AZUL 2 VECES", 2, MultiplePresses, counts(Exactly(0), Exactly(2))),
    c("red-three", "PRESIONA ROJO 3 VECES", 3, MultiplePresses, counts(Exactly(3), Exactly(0))),
    c("blue-three", "PRESIONA AZUL 3 VECES", 3, MultiplePresses, counts(Exactly(0), Exactly(3))),
    c("red-four", "ROJO 4 VECES", 3, MultiplePresses, counts(Exactly(4), Exactly(0))),
    c("blue-four", "AZUL 4 VECES", 3, MultiplePresses, counts(Exactly(0), Exactly(4))),
    c("red-five", "ROJO 5 VECES", 4, MultiplePresses, counts(Exactly(5), Exactly(0))),
    c("blue-five", "AZUL 5 VECES", 4, MultiplePresses, counts(Exactly(0), Exactly(5))),
    c("red-at-least-three", "PULSA ROJO AL MENOS 3 VECES", 3, MultiplePresses, counts(AtLeast(3), Exactly(0))),
    c("blue-at-least-three", "PULSA AZUL AL MENOS 3 VECES", 3, MultiplePresses, counts(Exactly(0), AtLeast(3))),
    c("press-both", "PRESIONA AMBOS BOTONES", 2, BothButtons, counts(AtLeast(1), AtLeast(1))),
    c("one-each", "ROJO 1 VEZ, AZUL 1 VEZ", 3, BothButtons, counts(Exactly(1), Exactly(1))),
    c("red-two-blue-one", "ROJO 2 VECES, AZUL 1 VEZ", 3, BothButtons, counts(Exactly(2), Exactly(1))),
    c("blue-two-red-one", "AZUL 2 VECES, ROJO 1 VEZ", 3, BothButtons, counts(Exactly(1), Exactly(2))),
    c("both-at-least-two", "AMBOS AL MENOS 2 VECES", 4, BothButtons, counts(AtLeast(2), AtLeast(2))),
    c("activate-both", "ACTIVA AMBOS SISTEMAS", 2, BothButtons, counts(AtLeast(1), AtLeast(1))),
    c("red-three-blue-two", "ROJO 3 VECES, AZUL 2 VECES", 4, BothButtons, counts(Exactly(3), Exactly(2))),
    c("blue-three-red-two", "AZUL 3 VECES, ROJO 2 VECES", 4, BothButtons, counts(Exactly(2), Exactly(3))),
    c("dont-press-red", "NO PRESIONES ROJO", 2, Confusing, counts(Exactly(0), Any)),
    c("dont-press-blue", "NO PRESIONES AZUL", 2, Confusing, counts(Any, Exactly(0))),
    c("not-red", "PRESIONA EL QUE NO ES ROJO", 3, Confusing, counts(Exactly(0), AtLeast(1))),
    c("not-blue", "PRESIONA EL QUE NO ES AZUL", 3, Confusing, counts(AtLeast(1), Exactly(0))),
    c("red-over-blue", "ROJO MÁS QUE AZUL", 4, Confusing, Rule::MoreThan { more: Button::Red }),
    c("blue-over-red", "AZUL MÁS QUE ROJO", 4, Confusing, Rule::MoreThan { more: Button::Blue }),
    c("red-not-blue", "ROJO, PERO NO AZUL", 2, Confusing, counts(AtLeast(1), Exactly(0))),
    c("red-or-nothing", "PRESIONA ROJO O NO HAGAS NADA", 3, Confusing, counts(Any, Exactly(0))),
    c("avoid-red", "EVITA ROJO", 2, Confusing, counts(Exactly(0), Any)),
    c("avoid-blue", "EVITA AZUL", 2, Confusing, counts(Any, Exactly(0))),
    c("anything-but-red", "CUALQUIERA MENOS ROJO", 2, Confusing, counts(Exactly(0), Any)),
    c("anything-but-blue", "CUALQUIERA MENOS AZUL", 2, Confusing, counts(Any, Exactly(0))),
    c("total-one", "EXACTAMENTE 1 CLIC EN TOTAL", 2, TotalCount, total(Exactly(1))),
    c("total-two", "EXACTAMENTE 2 CLICS EN TOTAL", 3, TotalCount, total(Exactly(2))),
    c("total-three", "EXACTAMENTE 3 CLICS EN TOTAL", 3, TotalCount, total(Exactly(3))),
    c("total-four", "TOTAL: 4 CLICS", 4, TotalCount, total(Exactly(4))),
    c("total-five", "TOTAL: 5 CLICS", 4, TotalCount, total(Exactly(5))),
    c("total-over-three", "MÁS DE 3 CLICS EN TOTAL", 3, TotalCount, total(AtLeast(4))),
    c("red-six", "ROJO 6 VECES", 5, ExtremePresses, counts(Exactly(6), Exactly(0))),
    c("blue-six", "AZUL 6 VECES", 5, ExtremePresses, counts(Exactly(0), Exactly(6))),
    c("red-four-blue-three", "ROJO 4 VECES, AZUL 3 VECES", 5, ExtremeCombination, counts(Exactly(4), Exactly(3))),
    c("blue-four-red-three", "AZUL 4 VECES, ROJO 3 VECES", 5, ExtremeCombination, counts(Exactly(3), Exactly(4))),
    c("total-seven", "TOTAL: 7 CLICS", 5, ExtremeTotal, total(Exactly(7))),
    c("total-eight", "TOTAL: 8 CLICS", 5, ExtremeTotal, total(Exactly(8))),
    c(
        "red-even-blue-odd",
        "ROJO PAR, AZUL IMPAR",
        5,
        MathLogic,
        Rule::Parity {
            red: Parity::Even,
            blue: Parity::Odd,
        },
    ),
    c(
        "blue-even-red-odd",
        "AZUL PAR, ROJO IMPAR",
        5,
        MathLogic,
        Rule::Parity {
            red: Parity::Odd,
            blue: Parity::Even,
        },
    ),
    c("same-count", "MISMO NÚMERO EN AMBOS", 4, MathLogic, Rule::SameCount),
    c(
        "red-double-blue",
        "ROJO DOBLE QUE AZUL",
        5,
        MathLogic,
        Rule::Multiple {
            larger: Button::Red,
            factor: 2,
        },
    ),
    c(
        "blue-double-red",
        "AZUL DOBLE QUE ROJO",
        5,
        MathLogic,
        Rule::Multiple {
            larger: Button::Blue,
            factor: 2,
        },
    ),
    c("both-at-least-three", "AMBOS AL MENOS 3 VECES", 5, ExtremeCombination, counts(AtLeast(3), AtLeast(3))),
    c(
        "even-total-over-four",
        "TOTAL PAR Y MÁS DE 4",
        4,
        MathLogic,
        Rule::TotalParity {
            parity: Parity::Even,
            above: 4,
        },
    ),
    c(
        "odd-total-over-four",
        "TOTAL IMPAR Y MÁS DE 4",
        4,
        MathLogic,
        Rule::TotalParity {
            parity: Parity::Odd,
            above: 4,
        },
    ),
    c("sum-six", "ROJO + AZUL = 6", 4, MathLogic, total(Exactly(6))),
];

/// Per-category counts, for debugging and the `--catalog` dump.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub by_category: BTreeMap<&'static str, usize>,
    pub by_difficulty: BTreeMap<u8, usize>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    challenges: Vec<Challenge>,
}

impl Catalog {
    pub fn new(challenges: Vec<Challenge>) -> Self {
        Self { challenges }
    }

    /// The built-in challenge list.
    pub fn standard() -> Self {
        Self::new(CHALLENGES.to_vec())
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }

    pub fn by_category(&self, category: Category) -> Vec<&Challenge> {
        self.challenges
            .iter()
            .filter(|c| c.category == Some(category))
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut by_category = BTreeMap::new();
        let mut by_difficulty = BTreeMap::new();
        for challenge in &self.challenges {
            let name = challenge.category.map_or("uncategorized", Category::as_str);
            *by_category.entry(name).or_insert(0) += 1;
            *by_difficulty.entry(challenge.difficulty).or_insert(0) += 1;
        }
        CatalogStats {
            total: self.challenges.len(),
            by_category,
            by_difficulty,
        }
    }

    /// Reject catalogs that cannot drive a game: empty, duplicate ids,
    /// difficulty out of range, or a rule nobody can satisfy.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.challenges.is_empty() {
            return Err(GameError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for challenge in &self.challenges {
            if !seen.insert(challenge.id) {
                return Err(GameError::InvalidCatalog(format!(
                    "duplicate challenge id '{}'",
                    challenge.id
                )));
            }
            if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&challenge.difficulty) {
                return Err(GameError::InvalidCatalog(format!(
                    "challenge '{}' has difficulty {} outside {MIN_DIFFICULTY}..={MAX_DIFFICULTY}",
                    challenge.id, challenge.difficulty
                )));
            }
            if challenge.rule.witness(WITNESS_SEARCH_LIMIT).is_none() {
                return Err(GameError::InvalidCatalog(format!(
                    "challenge '{}' cannot be satisfied",
                    challenge.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

//! Arithmetic question generation
//!
//! Every random choice is a uniform pick over an explicit candidate list, so a
//! seeded RNG always reproduces the same question for the same inputs.

use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Arithmetic operators a session can practise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Display order used by the operator picker
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "⋅",
            Operator::Divide => ":",
        }
    }

    /// Parse a display symbol; accepts the common keyboard spellings too
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s.trim() {
            "+" => Some(Operator::Add),
            "-" | "−" => Some(Operator::Subtract),
            "⋅" | "·" | "×" | "x" | "*" => Some(Operator::Multiply),
            ":" | "÷" | "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Multiplication and division draw their factors from the selected tables
    pub fn uses_tables(&self) -> bool {
        matches!(self, Operator::Multiply | Operator::Divide)
    }

    /// Exact result, or None when the result is not a non-negative integer
    pub fn apply(&self, a: u32, b: u32) -> Option<u32> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => {
                if b == 0 || a % b != 0 {
                    None
                } else {
                    Some(a / b)
                }
            }
        }
    }
}

/// Session difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// One slow enemy at a time
    Practice,
    /// Up to three enemies, moderate speed
    #[default]
    Normal,
    /// Unlimited fast enemies
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Practice => "Practice",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "practice" | "easy" | "0" => Some(Difficulty::Practice),
            "normal" | "1" => Some(Difficulty::Normal),
            "hard" | "2" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Enemy move speed in px/s; overrides each enemy's innate speed
    pub fn enemy_speed(&self) -> f32 {
        match self {
            Difficulty::Practice => 30.0,
            Difficulty::Normal => 45.0,
            Difficulty::Hard => 70.0,
        }
    }

    /// Candidates for the second factor of a multiplication/division fact
    pub fn factor_range(&self, allow_one: bool) -> Vec<u32> {
        match self {
            Difficulty::Practice => [1, 2, 3, 4, 5, 10]
                .into_iter()
                .filter(|&n| allow_one || n != 1)
                .collect(),
            Difficulty::Normal | Difficulty::Hard => (1..=10).collect(),
        }
    }
}

/// A single arithmetic fact shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub num1: u32,
    pub num2: u32,
    pub operator: Operator,
    pub answer: u32,
}

impl Question {
    /// Build a question whose answer is the exact result of the operator
    pub fn new(num1: u32, num2: u32, operator: Operator) -> Option<Self> {
        operator.apply(num1, num2).map(|answer| Self {
            num1,
            num2,
            operator,
            answer,
        })
    }

    /// Safe default used whenever configuration leaves nothing to generate
    pub fn fallback() -> Self {
        Self {
            num1: 1,
            num2: 1,
            operator: Operator::Add,
            answer: 2,
        }
    }

    /// Fixed division fact used when divisor recovery fails
    fn division_fallback() -> Self {
        Self {
            num1: 4,
            num2: 2,
            operator: Operator::Divide,
            answer: 2,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.operator.apply(self.num1, self.num2) == Some(self.answer)
    }

    pub fn is_answered_by(&self, value: u32) -> bool {
        self.answer == value
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} = ?", self.num1, self.operator.symbol(), self.num2)
    }
}

/// Inputs to the generator
#[derive(Debug, Clone, Copy)]
pub struct QuestionConfig<'a> {
    pub difficulty: Difficulty,
    pub operators: &'a [Operator],
    pub tables: &'a [u32],
    /// Whether 1 may appear as a factor (chapter rule)
    pub allow_easy_multiplication: bool,
}

/// Generate a question, or None when no operator is selected
pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &QuestionConfig) -> Option<Question> {
    let Some(operator) = pick(rng, config.operators) else {
        log::error!("No operators selected, cannot generate a question");
        return None;
    };

    let question = match operator {
        Operator::Multiply => generate_multiplication(rng, config),
        Operator::Divide => generate_division(rng, config),
        Operator::Add => generate_addition(rng, config.difficulty),
        Operator::Subtract => generate_subtraction(rng, config.difficulty),
    };
    Some(question)
}

/// Uniform pick over an explicit candidate list
fn pick<R: Rng + ?Sized, T: Copy>(rng: &mut R, items: &[T]) -> Option<T> {
    items.choose(rng).copied()
}

/// Uniform integer in [lo, hi]; collapses to `lo` for an empty range
fn between<R: Rng + ?Sized>(rng: &mut R, lo: u32, hi: u32) -> u32 {
    if lo >= hi {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

/// Draw a (table factor, other factor) pair with the difficulty bias applied.
///
/// `shrink_large_pair` enables the practice rule that pulls a pair of two
/// large factors down to a small second factor (multiplication only).
fn draw_factor_pair<R: Rng + ?Sized>(
    rng: &mut R,
    config: &QuestionConfig,
    shrink_large_pair: bool,
) -> (u32, u32) {
    let tables = config.tables;
    let allow_easy = config.allow_easy_multiplication;
    let allow_one = allow_easy || tables.contains(&1);
    let range = config.difficulty.factor_range(allow_one);

    // Callers guarantee tables is non-empty; range never is
    let mut table_factor = pick(rng, tables).unwrap_or(2);
    let mut other = pick(rng, &range).unwrap_or(2);

    let without_one = |items: &[u32]| -> Vec<u32> { items.iter().copied().filter(|&n| n != 1).collect() };

    match config.difficulty {
        Difficulty::Practice => {
            if rng.random_bool(0.5) && allow_one {
                if rng.random_bool(0.5) && tables.contains(&1) {
                    table_factor = 1;
                } else if range.contains(&1) {
                    other = 1;
                }
            } else if shrink_large_pair && table_factor > 5 && other > 5 {
                let small: Vec<u32> = range
                    .iter()
                    .copied()
                    .filter(|&n| n <= 3 && (allow_easy || n != 1))
                    .collect();
                if let Some(n) = pick(rng, &small) {
                    other = n;
                }
            }
        }
        Difficulty::Normal => {
            if !allow_easy {
                if table_factor == 1 {
                    if let Some(n) = pick(rng, &without_one(tables)) {
                        table_factor = n;
                    }
                }
                if other == 1 && table_factor != 1 {
                    if let Some(n) = pick(rng, &without_one(&range)) {
                        other = n;
                    }
                }
            }
        }
        Difficulty::Hard => {
            if !allow_easy {
                if table_factor == 1 {
                    if let Some(n) = pick(rng, &without_one(tables)) {
                        table_factor = n;
                    }
                }
                if other == 1 {
                    if let Some(n) = pick(rng, &without_one(&range)) {
                        other = n;
                    }
                }
            }
            // Push at least one factor above 5
            if table_factor <= 5 && other <= 5 {
                let larger_tables: Vec<u32> = tables.iter().copied().filter(|&t| t > 5).collect();
                let larger_others: Vec<u32> = range.iter().copied().filter(|&f| f > 5).collect();
                if rng.random_bool(0.5) && !larger_tables.is_empty() {
                    if let Some(n) = pick(rng, &larger_tables) {
                        table_factor = n;
                    }
                } else if let Some(n) = pick(rng, &larger_others) {
                    other = n;
                }
            }
        }
    }

    // Re-snap anything that drifted outside its legal set
    if !tables.contains(&table_factor) {
        table_factor = pick(rng, tables).unwrap_or(table_factor);
    }
    if !range.contains(&other) {
        other = pick(rng, &range).unwrap_or(other);
    }

    (table_factor, other)
}

fn generate_multiplication<R: Rng + ?Sized>(rng: &mut R, config: &QuestionConfig) -> Question {
    if config.tables.is_empty() {
        log::warn!("Multiplication selected without tables, using 2 ⋅ 2");
        return Question {
            num1: 2,
            num2: 2,
            operator: Operator::Multiply,
            answer: 4,
        };
    }

    let (num1, num2) = draw_factor_pair(rng, config, true);
    Question::new(num1, num2, Operator::Multiply).unwrap_or_else(|| {
        log::error!("Multiplication {} ⋅ {} overflowed, using fallback", num1, num2);
        Question::fallback()
    })
}

fn generate_division<R: Rng + ?Sized>(rng: &mut R, config: &QuestionConfig) -> Question {
    if config.tables.is_empty() {
        log::warn!("Division selected without tables, using 4 : 2");
        return Question::division_fallback();
    }

    let (factor, mut other) = draw_factor_pair(rng, config, false);
    if other == 0 {
        other = 1;
    }

    let Some(dividend) = factor.checked_mul(other) else {
        log::error!("Division dividend {} ⋅ {} overflowed, using fallback", factor, other);
        return Question::division_fallback();
    };

    let (mut divisor, mut quotient) = if between(rng, 0, 1) == 0 {
        (factor, other)
    } else {
        (other, factor)
    };

    if divisor == 0 {
        log::warn!("Division divisor was zero, attempting recovery");
        divisor = if factor != 0 {
            factor
        } else if other != 0 {
            other
        } else {
            1
        };
        if divisor == 0 || dividend % divisor != 0 {
            log::error!("Unrecoverable division question, using 4 : 2");
            return Question::division_fallback();
        }
        quotient = dividend / divisor;
    }

    Question {
        num1: dividend,
        num2: divisor,
        operator: Operator::Divide,
        answer: quotient,
    }
}

/// Largest sum a practice addition may have
const PRACTICE_SUM_CAP: u32 = 25;
/// Largest sum a normal addition may have
const NORMAL_SUM_CAP: u32 = 99;
/// Largest difference a practice subtraction may have
const PRACTICE_DIFFERENCE_CAP: u32 = 15;
/// Smallest difference a hard subtraction aims for
const HARD_MIN_DIFFERENCE: u32 = 10;

fn generate_addition<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> Question {
    let (num1, num2) = match difficulty {
        Difficulty::Practice => {
            let mut num1 = between(rng, 1, 20);
            let mut num2 = between(rng, 0, 20);
            if num1 + num2 > PRACTICE_SUM_CAP {
                if num1 > num2 && num1 > 10 {
                    num1 = between(rng, 1, 10);
                } else if num2 > 10 {
                    num2 = between(rng, 0, 10);
                }
                num2 = num2.min(PRACTICE_SUM_CAP - num1);
            }
            (num1, num2)
        }
        Difficulty::Normal => {
            let num1 = between(rng, 1, NORMAL_SUM_CAP);
            let num2 = between(rng, 0, NORMAL_SUM_CAP - num1);
            (num1, num2)
        }
        Difficulty::Hard => (between(rng, 20, 100), between(rng, 20, 99)),
    };

    Question {
        num1,
        num2,
        operator: Operator::Add,
        answer: num1 + num2,
    }
}

fn generate_subtraction<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> Question {
    let (mut num1, mut num2) = match difficulty {
        Difficulty::Practice => {
            let num1 = between(rng, 1, 25);
            let mut num2 = between(rng, 0, num1);
            if num1 > PRACTICE_DIFFERENCE_CAP && num1 - num2 > PRACTICE_DIFFERENCE_CAP {
                num2 = between(rng, num1 - PRACTICE_DIFFERENCE_CAP, num1);
            }
            (num1, num2)
        }
        Difficulty::Normal => {
            let num1 = between(rng, 1, 100);
            (num1, between(rng, 0, num1))
        }
        Difficulty::Hard => {
            let num1 = between(rng, 25, 100);
            let mut num2 = between(rng, HARD_MIN_DIFFERENCE, num1);
            if num1 - num2 < HARD_MIN_DIFFERENCE {
                num2 = between(
                    rng,
                    num1.saturating_sub(50),
                    num1.saturating_sub(HARD_MIN_DIFFERENCE + 1),
                );
            }
            (num1, num2)
        }
    };

    // Never produce a negative result
    if num1 < num2 {
        std::mem::swap(&mut num1, &mut num2);
    }

    Question {
        num1,
        num2,
        operator: Operator::Subtract,
        answer: num1 - num2,
    }
}

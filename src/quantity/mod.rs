//! # Quantity Module
//!
//! Parsing and resolution of "No. Appearing" expressions.
//!
//! Source data writes appearing counts loosely: `1d6+1`, `2-8`, `Up to 5`,
//! `3`, or nothing at all. Resolution tries, in order:
//!
//! 1. Dice notation `NdM[+K|-K]` at the start of the text: roll and clamp to at least 1
//! 2. Every run of digits anywhere in the text: pick one uniformly
//! 3. Otherwise: 1
//!
//! Resolution never fails. The path taken is reported in [`Resolution`] so
//! callers and tests can see which branch produced the count.

use crate::config::{DEFAULT_APPEARING, MAX_DICE};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static DICE_PATTERN: OnceLock<Regex> = OnceLock::new();
static DIGIT_RUN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn dice_pattern() -> &'static Regex {
    DICE_PATTERN.get_or_init(|| {
        // Accepts an uppercase `D` as well; "2D4" rolls dice rather than picking from {2, 4}.
        Regex::new(r"^([0-9]+)[dD]([0-9]+)([+-][0-9]+)?").expect("dice pattern compiles")
    })
}

fn digit_run_pattern() -> &'static Regex {
    DIGIT_RUN_PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("digit pattern compiles"))
}

/// A parsed quantity expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityExpr {
    /// No text was supplied, or it was blank
    Missing,
    /// `count` dice of `sides` faces plus `modifier`
    Dice { count: u32, sides: u32, modifier: i64 },
    /// Candidate counts pulled from the text, in order of appearance
    Choice(Vec<u32>),
    /// Text with nothing usable in it
    Unparsable(String),
}

impl QuantityExpr {
    /// Parses a raw field value.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary::QuantityExpr;
    ///
    /// assert_eq!(
    ///     QuantityExpr::parse(Some("1d6+1")),
    ///     QuantityExpr::Dice { count: 1, sides: 6, modifier: 1 }
    /// );
    /// assert_eq!(QuantityExpr::parse(Some("2-8")), QuantityExpr::Choice(vec![2, 8]));
    /// assert_eq!(QuantityExpr::parse(None), QuantityExpr::Missing);
    /// ```
    pub fn parse(raw: Option<&str>) -> Self {
        let text = match raw.map(str::trim) {
            None | Some("") => return QuantityExpr::Missing,
            Some(text) => text,
        };

        if let Some(dice) = Self::parse_dice(text) {
            return dice;
        }

        let candidates: Vec<u32> = digit_run_pattern()
            .find_iter(text)
            .filter_map(|run| match run.as_str().parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    log::debug!("Skipping oversized number '{}' in '{}'", run.as_str(), text);
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            QuantityExpr::Unparsable(text.to_string())
        } else {
            QuantityExpr::Choice(candidates)
        }
    }

    fn parse_dice(text: &str) -> Option<Self> {
        let captures = dice_pattern().captures(text)?;

        let count: u32 = captures[1].parse().ok()?;
        let sides: u32 = captures[2].parse().ok()?;
        let modifier: i64 = match captures.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };

        if count == 0 || sides == 0 || count > MAX_DICE {
            log::debug!("'{}' looks like dice but is out of range", text);
            return None;
        }

        Some(QuantityExpr::Dice {
            count,
            sides,
            modifier,
        })
    }

    /// Resolves the expression to a concrete count of at least 1.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Resolution {
        match self {
            QuantityExpr::Missing => Resolution {
                count: DEFAULT_APPEARING,
                path: ResolutionPath::Missing,
            },
            QuantityExpr::Unparsable(text) => Resolution {
                count: DEFAULT_APPEARING,
                path: ResolutionPath::Unparsable { text: text.clone() },
            },
            QuantityExpr::Dice {
                count,
                sides,
                modifier,
            } => {
                let rolls: Vec<u32> = (0..*count).map(|_| rng.gen_range(1..=*sides)).collect();
                let total = rolls
                    .iter()
                    .map(|&r| i64::from(r))
                    .sum::<i64>()
                    .saturating_add(*modifier);
                let clamped = total.clamp(1, i64::from(u32::MAX));

                Resolution {
                    count: clamped as u32,
                    path: ResolutionPath::DiceRoll {
                        rolls,
                        modifier: *modifier,
                        clamped: clamped != total,
                    },
                }
            }
            QuantityExpr::Choice(candidates) => {
                let picked = candidates.choose(rng).copied().unwrap_or(DEFAULT_APPEARING);
                Resolution {
                    count: picked.max(1),
                    path: ResolutionPath::ChoicePick {
                        candidates: candidates.clone(),
                        picked,
                    },
                }
            }
        }
    }

    /// The smallest and largest counts this expression can resolve to.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            QuantityExpr::Missing | QuantityExpr::Unparsable(_) => {
                (DEFAULT_APPEARING, DEFAULT_APPEARING)
            }
            QuantityExpr::Dice {
                count,
                sides,
                modifier,
            } => {
                let low = i64::from(*count).saturating_add(*modifier);
                let high = (i64::from(*count) * i64::from(*sides)).saturating_add(*modifier);
                let clamp = |v: i64| v.clamp(1, i64::from(u32::MAX)) as u32;
                (clamp(low), clamp(high))
            }
            QuantityExpr::Choice(candidates) => {
                let low = candidates.iter().copied().min().unwrap_or(DEFAULT_APPEARING);
                let high = candidates.iter().copied().max().unwrap_or(DEFAULT_APPEARING);
                (low.max(1), high.max(1))
            }
        }
    }
}

impl fmt::Display for QuantityExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityExpr::Missing => f.write_str("-"),
            QuantityExpr::Dice {
                count,
                sides,
                modifier,
            } => match modifier {
                0 => write!(f, "{}d{}", count, sides),
                m if *m > 0 => write!(f, "{}d{}+{}", count, sides, m),
                m => write!(f, "{}d{}{}", count, sides, m),
            },
            QuantityExpr::Choice(candidates) => {
                let parts: Vec<String> = candidates.iter().map(u32::to_string).collect();
                write!(f, "one of {{{}}}", parts.join(", "))
            }
            QuantityExpr::Unparsable(text) => write!(f, "{:?}", text),
        }
    }
}

/// A resolved count and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The resolved count, always at least 1
    pub count: u32,
    pub path: ResolutionPath,
}

/// Which branch of resolution produced a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionPath {
    /// No text to resolve; defaulted
    Missing,
    /// Text without dice or digits; defaulted
    Unparsable { text: String },
    /// Dice were rolled. `clamped` is set when the total fell outside
    /// `1..=u32::MAX` and was pulled back into it
    DiceRoll {
        rolls: Vec<u32>,
        modifier: i64,
        clamped: bool,
    },
    /// One of the numbers in the text was picked
    ChoicePick { candidates: Vec<u32>, picked: u32 },
}

impl ResolutionPath {
    /// Whether the count came from the text rather than the default.
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            ResolutionPath::DiceRoll { .. } | ResolutionPath::ChoicePick { .. }
        )
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            ResolutionPath::Missing => write!(f, "{} (no value, default)", self.count),
            ResolutionPath::Unparsable { text } => {
                write!(f, "{} (could not read {:?}, default)", self.count, text)
            }
            ResolutionPath::DiceRoll {
                rolls, modifier, ..
            } => {
                let parts: Vec<String> = rolls.iter().map(u32::to_string).collect();
                write!(f, "{} (rolled [{}]", self.count, parts.join(", "))?;
                if *modifier != 0 {
                    write!(f, " {:+}", modifier)?;
                }
                f.write_str(")")
            }
            ResolutionPath::ChoicePick { candidates, .. } => {
                let parts: Vec<String> = candidates.iter().map(u32::to_string).collect();
                write!(f, "{} (picked from [{}])", self.count, parts.join(", "))
            }
        }
    }
}

/// Parses and resolves a raw field value, logging the path taken.
pub fn resolve_quantity<R: Rng + ?Sized>(raw: Option<&str>, rng: &mut R) -> Resolution {
    let expr = QuantityExpr::parse(raw);
    let resolution = expr.resolve(rng);

    match &resolution.path {
        ResolutionPath::Missing => log::debug!("No appearing value, defaulting to {}", resolution.count),
        ResolutionPath::Unparsable { text } => {
            log::debug!("Unreadable appearing value {:?}, defaulting to {}", text, resolution.count)
        }
        _ => log::debug!("Appearing {} resolved to {}", expr, resolution),
    }

    resolution
}

/// Resolves a raw "No. Appearing" value straight to a count.
///
/// # Examples
///
/// ```
/// use bestiary::resolve_appearing;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// assert_eq!(resolve_appearing(None, &mut rng), 1);
/// assert_eq!(resolve_appearing(Some("Solitary"), &mut rng), 1);
/// let n = resolve_appearing(Some("3d6"), &mut rng);
/// assert!((3..=18).contains(&n));
/// ```
pub fn resolve_appearing<R: Rng + ?Sized>(raw: Option<&str>, rng: &mut R) -> u32 {
    resolve_quantity(raw, rng).count
}

//! Skin profile built from a submitted form, and the routine generated for it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::form::AnswerSheet;

/// Errors turning submitted answers into a profile
#[derive(Error, Debug, PartialEq)]
pub enum ProfileError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("age must be a whole number, got '{0}'")]
    InvalidAge(String),

    #[error("unknown skin type '{0}'")]
    UnknownSkinType(String),

    #[error("unknown routine frequency '{0}'")]
    UnknownFrequency(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Sensitive,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Acne,
    DarkSpots,
    Wrinkles,
    Redness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Full,
    NightOnly,
    Minimal,
}

impl FromStr for SkinType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dry" => Ok(SkinType::Dry),
            "oily" => Ok(SkinType::Oily),
            "combination" => Ok(SkinType::Combination),
            "sensitive" => Ok(SkinType::Sensitive),
            "normal" => Ok(SkinType::Normal),
            other => Err(ProfileError::UnknownSkinType(other.to_string())),
        }
    }
}

impl Condition {
    /// Parse a condition value; unknown values are skipped by callers
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "acne" => Some(Condition::Acne),
            "dark_spots" => Some(Condition::DarkSpots),
            "wrinkles" => Some(Condition::Wrinkles),
            "redness" => Some(Condition::Redness),
            _ => None,
        }
    }
}

impl FromStr for Frequency {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Frequency::Full),
            "night_only" => Ok(Frequency::NightOnly),
            "minimal" => Ok(Frequency::Minimal),
            other => Err(ProfileError::UnknownFrequency(other.to_string())),
        }
    }
}

/// A user's skin profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub skin_type: SkinType,
    pub conditions: Vec<Condition>,
    pub frequency: Frequency,
}

impl Profile {
    /// Build a profile from the answers of the built-in questionnaire
    pub fn from_answers(answers: &AnswerSheet) -> Result<Self, ProfileError> {
        let name = answers.text("name").trim();
        if name.is_empty() {
            return Err(ProfileError::MissingField("name"));
        }

        let age_text = answers.text("age").trim();
        if age_text.is_empty() {
            return Err(ProfileError::MissingField("age"));
        }
        let age = age_text
            .parse::<u32>()
            .map_err(|_| ProfileError::InvalidAge(age_text.to_string()))?;

        let skin_type = match answers.text("skin_type") {
            "" => return Err(ProfileError::MissingField("skin_type")),
            s => s.parse()?,
        };

        let frequency = match answers.text("frequency") {
            "" => return Err(ProfileError::MissingField("frequency")),
            s => s.parse()?,
        };

        let conditions = answers
            .get("conditions")
            .map(|v| v.as_many().iter().filter_map(|c| Condition::parse(c)).collect())
            .unwrap_or_default();

        Ok(Self {
            name: name.to_string(),
            age,
            skin_type,
            conditions,
            frequency,
        })
    }

    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }
}

/// Morning and night steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Routine {
    pub morning: Vec<String>,
    pub night: Vec<String>,
}

fn owned(steps: &[&str]) -> Vec<String> {
    steps.iter().map(|s| (*s).to_string()).collect()
}

/// Insert at `index`, or append when the list is shorter
fn insert_at(steps: &mut Vec<String>, index: usize, step: &str) {
    let index = index.min(steps.len());
    steps.insert(index, step.to_string());
}

/// Remove repeats, keeping the first occurrence
fn dedup_in_order(steps: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    steps.retain(|s| seen.insert(s.clone()));
}

impl Routine {
    /// Base routine for the skin type, adjusted for conditions and frequency
    pub fn for_profile(profile: &Profile) -> Self {
        let mut routine = Self::base(profile.skin_type);

        if profile.has(Condition::Acne) {
            routine.night.push(
                "Extra: spot treatment for acne (benzoyl peroxide, salicylic acid)".to_string(),
            );
        }
        if profile.has(Condition::DarkSpots) {
            insert_at(
                &mut routine.morning,
                2,
                "Add: brightening serum (vitamin C, azelaic acid, niacinamide)",
            );
            routine.night.push(
                "Extra: dark spot treatment (gentle retinoids, kojic acid; start slowly)"
                    .to_string(),
            );
        }
        if profile.has(Condition::Wrinkles) {
            insert_at(
                &mut routine.night,
                2,
                "Add: anti-aging serum (retinol, peptides; alternate nights)",
            );
        }
        if profile.has(Condition::Redness) {
            insert_at(
                &mut routine.morning,
                2,
                "Add: extra soothing serum (niacinamide, licorice extract)",
            );
            routine
                .night
                .push("Occasional: calming mask (1-2 times a week)".to_string());
        }

        match profile.frequency {
            Frequency::Full => {}
            Frequency::NightOnly => {
                routine.morning = owned(&[
                    "1. Gentle rinse with water (optional)",
                    "2. Sunscreen SPF 50+",
                ]);
            }
            Frequency::Minimal => {
                routine.morning = owned(&["1. Sunscreen SPF 50+ (mandatory)"]);
                routine.night = owned(&[
                    "1. Gentle cleanser",
                    "2. (Optional) targeted serum if you have a concern",
                    "3. Basic moisturizer",
                ]);
            }
        }

        dedup_in_order(&mut routine.morning);
        dedup_in_order(&mut routine.night);
        routine
    }

    fn base(skin_type: SkinType) -> Self {
        match skin_type {
            SkinType::Dry => Self {
                morning: owned(&[
                    "1. Hydrating cleanser (cream or milk)",
                    "2. Hydrating toner (alcohol-free)",
                    "3. Hyaluronic acid serum",
                    "4. Rich moisturizer (ceramides)",
                    "5. Hydrating eye cream",
                    "6. Sunscreen SPF 50+ (creamy texture)",
                ]),
                night: owned(&[
                    "1. Double cleanse (oil/balm + hydrating cleanser)",
                    "2. Hydrating toner",
                    "3. Repairing night serum (peptides, nourishing oils)",
                    "4. Intensive nourishing cream",
                ]),
            },
            SkinType::Oily => Self {
                morning: owned(&[
                    "1. Gel cleanser (oil control, mild salicylic acid)",
                    "2. Balancing / mattifying toner",
                    "3. Niacinamide serum",
                    "4. Light moisturizer (gel or fluid)",
                    "5. Oil-free sunscreen SPF 50+",
                ]),
                night: owned(&[
                    "1. Double cleanse (micellar water + gel cleanser)",
                    "2. Gentle exfoliating toner (AHA/BHA, 2-3 times a week)",
                    "3. Targeted serum (gentle retinol if no active acne, niacinamide)",
                    "4. Light gel moisturizer",
                ]),
            },
            SkinType::Combination => Self {
                morning: owned(&[
                    "1. Gentle cleanser (foam or light gel)",
                    "2. Balancing toner (hydrating on dry areas)",
                    "3. Antioxidant serum (vitamin C)",
                    "4. Balancing fluid moisturizer",
                    "5. Sunscreen SPF 50+ (light texture)",
                ]),
                night: owned(&[
                    "1. Double cleanse",
                    "2. Balancing toner",
                    "3. Targeted serum (hyaluronic acid on dry areas, niacinamide on the T-zone)",
                    "4. Light to medium moisturizer",
                ]),
            },
            SkinType::Sensitive => Self {
                morning: owned(&[
                    "1. Soothing cleanser (syndet, sulfate-free)",
                    "2. Thermal water or soothing toner",
                    "3. Calming serum (centella asiatica, panthenol)",
                    "4. Hypoallergenic moisturizer",
                    "5. Mineral sunscreen SPF 50+ (zinc oxide / titanium dioxide)",
                ]),
                night: owned(&[
                    "1. Soothing cleanser",
                    "2. Thermal water",
                    "3. Barrier repair serum (ceramides, fatty acids)",
                    "4. Very gentle moisturizer",
                ]),
            },
            SkinType::Normal => Self {
                morning: owned(&["Gentle cleanser", "Moisturizer", "Sunscreen"]),
                night: owned(&["Gentle cleanser", "Moisturizer"]),
            },
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Morning:")?;
        for step in &self.morning {
            writeln!(f, "  {step}")?;
        }
        writeln!(f, "Night:")?;
        for step in &self.night {
            writeln!(f, "  {step}")?;
        }
        Ok(())
    }
}

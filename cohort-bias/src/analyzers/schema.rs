//! Column resolution by prioritized, case-insensitive alias lists.
//!
//! Real-world cohort exports name the same field many ways (`Gender`, `SEX`,
//! `patient_age`, ...). Each semantic field carries an ordered alias list; the
//! first alias present in the dataset wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::core::Dataset;

/// Default gender aliases, highest priority first.
pub const DEFAULT_GENDER_ALIASES: &[&str] = &["gender", "sex", "gndr", "g", "s"];

/// Default age aliases, highest priority first.
pub const DEFAULT_AGE_ALIASES: &[&str] = &["age", "years", "patient_age", "subject_age", "pat_age"];

/// A semantically meaningful field located through an alias list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticField {
    Gender,
    Age,
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticField::Gender => write!(f, "gender"),
            SemanticField::Age => write!(f, "age"),
        }
    }
}

/// Alias lists for every semantic field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAliases {
    /// Candidate names for the gender/sex column.
    pub gender: Vec<String>,
    /// Candidate names for the age column.
    pub age: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            gender: DEFAULT_GENDER_ALIASES.iter().map(|s| s.to_string()).collect(),
            age: DEFAULT_AGE_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ColumnAliases {
    /// Replaces the gender alias list.
    pub fn with_gender<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gender = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the age alias list.
    pub fn with_age<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.age = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the alias list for `field`.
    pub fn for_field(&self, field: SemanticField) -> &[String] {
        match field {
            SemanticField::Gender => &self.gender,
            SemanticField::Age => &self.age,
        }
    }
}

/// Returns the original name of the first column matching an alias.
///
/// Matching is case-insensitive; aliases are tried in order. When several
/// columns differ only in case, the leftmost one is returned, not the last
/// one as an insertion-ordered map of lowercased names would give.
pub fn resolve_column<C, A>(columns: &[C], aliases: &[A]) -> Option<String>
where
    C: AsRef<str>,
    A: AsRef<str>,
{
    let lookup: HashMap<String, &str> = columns
        .iter()
        .rev()
        .map(|c| (c.as_ref().to_lowercase(), c.as_ref()))
        .collect();

    aliases
        .iter()
        .find_map(|alias| lookup.get(&alias.as_ref().to_lowercase()))
        .map(|original| original.to_string())
}

/// Resolves semantic fields against a dataset's header.
#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    aliases: ColumnAliases,
}

impl ColumnResolver {
    /// Creates a resolver with the given alias lists.
    pub fn new(aliases: ColumnAliases) -> Self {
        Self { aliases }
    }

    /// The alias lists in use.
    pub fn aliases(&self) -> &ColumnAliases {
        &self.aliases
    }

    /// Resolves `field` against `data`, returning the column as spelled there.
    pub fn resolve(&self, data: &Dataset, field: SemanticField) -> Option<String> {
        let resolved = resolve_column(data.columns(), self.aliases.for_field(field));
        debug!(%field, column = ?resolved, "resolved column");
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_match_keeps_original_casing() {
        let columns = ["Patient_ID", "SEX", "Age"];
        assert_eq!(
            resolve_column(&columns, DEFAULT_GENDER_ALIASES),
            Some("SEX".to_string())
        );
        assert_eq!(
            resolve_column(&columns, DEFAULT_AGE_ALIASES),
            Some("Age".to_string())
        );
    }

    #[test]
    fn test_alias_priority_beats_column_order() {
        let columns = ["Sex", "Gender"];
        assert_eq!(
            resolve_column(&columns, DEFAULT_GENDER_ALIASES),
            Some("Gender".to_string())
        );
    }

    #[test]
    fn test_unresolved() {
        let columns = ["name", "score"];
        assert_eq!(resolve_column(&columns, DEFAULT_GENDER_ALIASES), None);
        assert_eq!(resolve_column(&columns, DEFAULT_AGE_ALIASES), None);
    }

    #[test]
    fn test_first_column_wins_on_case_collision() {
        let columns = ["AGE", "age"];
        assert_eq!(
            resolve_column(&columns, DEFAULT_AGE_ALIASES),
            Some("AGE".to_string())
        );
        assert_eq!(
            resolve_column(&["SEX", "sex"], DEFAULT_GENDER_ALIASES),
            Some("SEX".to_string())
        );
    }

    #[test]
    fn test_custom_aliases() {
        let aliases = ColumnAliases::default().with_gender(["participant_sex"]);
        let resolver = ColumnResolver::new(aliases);
        let data = Dataset::with_columns(["Participant_Sex", "gender"]).unwrap();

        assert_eq!(
            resolver.resolve(&data, SemanticField::Gender),
            Some("Participant_Sex".to_string())
        );
        assert_eq!(resolver.resolve(&data, SemanticField::Age), None);
    }

    #[test]
    fn test_field_display() {
        assert_eq!(SemanticField::Gender.to_string(), "gender");
        assert_eq!(SemanticField::Age.to_string(), "age");
    }
}

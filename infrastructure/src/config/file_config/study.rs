//! Study tool configuration from TOML (`[study]` section)

use medbot_application::{DIFFICULTIES, StudyDefaults};
use medbot_domain::{ConfigIssue, ConfigIssueCode};

/// Raw study configuration is the application's [`StudyDefaults`].
pub type FileStudyConfig = StudyDefaults;

pub fn validate(study: &FileStudyConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if !DIFFICULTIES.contains(&study.difficulty.to_lowercase().as_str()) {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::InvalidEnumValue {
                field: "study.difficulty".to_string(),
                value: study.difficulty.clone(),
                valid_values: DIFFICULTIES.iter().map(|d| d.to_string()).collect(),
            },
            format!(
                "study.difficulty: unknown value '{}', the server may reject it",
                study.difficulty
            ),
        ));
    }

    if study.num_cards == 0 {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::ZeroValue {
                field: "study.num_cards".to_string(),
            },
            "study.num_cards is 0, no flashcards will be requested",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&FileStudyConfig::default()).is_empty());
    }

    #[test]
    fn unknown_difficulty_is_reported() {
        let study = FileStudyConfig {
            difficulty: "brutal".to_string(),
            num_cards: 0,
            ..Default::default()
        };
        let issues = validate(&study);
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::InvalidEnumValue { .. }
        ));
    }
}

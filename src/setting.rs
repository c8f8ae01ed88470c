use std::{collections::HashMap, fmt::Display, str::FromStr};

use itertools::Itertools;
use joinery::JoinableIterator;
use lazy_format::lazy_format;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

pub const DEFAULT_AUTOCORRECT_CONFIDENCE: f64 = 0.5;

/// Every setting the config store knows about.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    EnumIter,
    IntoStaticStr,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    ClientId,
    ClientSecret,
    AutocorrectConfidence,
    ProfileId,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SettingKind {
    Number,
    String,
}

#[derive(Clone, PartialEq, Debug)]
pub enum SettingValue {
    Integer(u64),
    Decimal(f64),
    Text(String),
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(x) => write!(f, "{x}"),
            Self::Decimal(x) => write!(f, "{x}"),
            Self::Text(x) => write!(f, "{x}"),
        }
    }
}

impl SettingKey {
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn kind(self) -> SettingKind {
        match self {
            Self::ClientSecret => SettingKind::String,
            Self::ClientId | Self::AutocorrectConfidence | Self::ProfileId => SettingKind::Number,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ClientId => "Your osu! OAuth Client's ID",
            Self::ClientSecret => "Your osu! OAuth Client's secret",
            Self::AutocorrectConfidence => {
                "The minimum confidence required for the autocorrect to kick in"
            }
            Self::ProfileId => "Your profile's ID!",
        }
    }

    pub fn default_value(self) -> Option<SettingValue> {
        match self {
            Self::AutocorrectConfidence => {
                Some(SettingValue::Decimal(DEFAULT_AUTOCORRECT_CONFIDENCE))
            }
            _ => None,
        }
    }

    /// Whether the value is hidden in listings.
    pub fn is_redacted(self) -> bool {
        matches!(self, Self::ClientSecret)
    }

    /// `client_secret` -> `Client Secret`
    pub fn display_name(self) -> String {
        format_setting(self.key())
    }

    /// Parses `raw` as a value of this setting's type.
    pub fn parse_value(self, raw: &str) -> Result<SettingValue, SettingError> {
        let invalid = || SettingError::InvalidValue {
            key: self,
            kind: self.kind(),
        };
        let raw = raw.trim();
        match self {
            Self::ClientId | Self::ProfileId => raw
                .parse()
                .map(SettingValue::Integer)
                .map_err(|_| invalid()),
            Self::AutocorrectConfidence => {
                let value = f64::from_str(raw).map_err(|_| invalid())?;
                if !(0. ..=1.).contains(&value) {
                    return Err(SettingError::OutOfRange { key: self, value });
                }
                Ok(SettingValue::Decimal(value))
            }
            Self::ClientSecret => Ok(SettingValue::Text(raw.to_owned())),
        }
    }

    /// Fuzzy-matches `query` against every known setting.
    pub fn resolve(query: &str, threshold: f64) -> Result<Self, SettingError> {
        let keys = Self::iter().map(Self::key).collect_vec();
        resolve_setting(query, &keys, threshold)
            .and_then(|key| Self::iter().find(|k| k.key() == key))
            .ok_or_else(|| SettingError::Unresolved {
                query: query.to_owned(),
            })
    }

    /// Bulleted list of the display names of every setting.
    pub fn valid_names() -> impl Display {
        Self::iter()
            .map(|key| lazy_format!("• {}", key.display_name()))
            .join_with("\n")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error(
        "\"{query}\" is not a valid setting! Please choose one of the following:\n{}",
        SettingKey::valid_names()
    )]
    Unresolved { query: String },
    #[error("The value for {} must be a {kind}! Please try again!", .key.display_name())]
    InvalidValue { key: SettingKey, kind: SettingKind },
    #[error("The value for {} must be between 0 and 1, but {value} was given!", .key.display_name())]
    OutOfRange { key: SettingKey, value: f64 },
}

/// Returns the key most similar to `query`, unless even that one scores below `threshold`.
///
/// Ties go to the key listed first.
pub fn resolve_setting<'a>(query: &str, keys: &[&'a str], threshold: f64) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for &key in keys {
        let score = similarity(query, key);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((key, score));
        }
    }
    best.filter(|&(_, score)| score >= threshold)
        .map(|(key, _)| key)
}

/// Sørensen–Dice coefficient over the character bigrams of both strings, in `[0, 1]`.
///
/// Case is ignored and whitespace runs count as `_`, so `Client Secret` equals `client_secret`.
pub fn similarity(x: &str, y: &str) -> f64 {
    let (x, y) = (normalize(x), normalize(y));
    if x == y {
        return 1.;
    }
    let (x_len, y_len) = (x.chars().count(), y.chars().count());
    if x_len < 2 || y_len < 2 {
        return 0.;
    }

    let mut bigrams = HashMap::<_, usize>::new();
    for pair in x.chars().tuple_windows::<(_, _)>() {
        *bigrams.entry(pair).or_default() += 1;
    }
    let mut matches = 0;
    for pair in y.chars().tuple_windows::<(_, _)>() {
        if let Some(count) = bigrams.get_mut(&pair).filter(|count| **count > 0) {
            *count -= 1;
            matches += 1;
        }
    }
    2. * matches as f64 / (x_len + y_len - 2) as f64
}

fn normalize(s: &str) -> String {
    s.split_whitespace().join("_").to_lowercase()
}

/// `autocorrect_confidence` -> `Autocorrect Confidence`
pub fn format_setting(setting: &str) -> String {
    setting
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map_or_else(String::new, |c| c.to_uppercase().chain(chars).collect())
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use strum::IntoEnumIterator;

    use super::{
        format_setting, resolve_setting, similarity, SettingError, SettingKey, SettingValue,
    };

    fn keys() -> Vec<&'static str> {
        SettingKey::iter().map(SettingKey::key).collect_vec()
    }

    #[test]
    fn test_resolve_setting() {
        assert_eq!(
            resolve_setting("client scret", &keys(), 0.2),
            Some("client_secret")
        );
        assert_eq!(
            resolve_setting("completely_unrelated_xyz", &keys(), 0.5),
            None
        );
        assert_eq!(resolve_setting("Profile ID", &keys(), 0.5), Some("profile_id"));
        assert_eq!(resolve_setting("clientid", &keys(), 0.5), Some("client_id"));
        assert_eq!(
            resolve_setting("autocorrect", &keys(), 0.5),
            Some("autocorrect_confidence")
        );
        assert_eq!(resolve_setting("anything", &[], 0.), None);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let score = similarity("client scret", "client_secret");
        assert_eq!(
            resolve_setting("client scret", &keys(), score),
            Some("client_secret")
        );
        assert_eq!(
            resolve_setting("client scret", &keys(), score + 1e-9),
            None
        );
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("client_secret", "CLIENT SECRET"), 1.);
        assert_eq!(similarity("a", "b"), 0.);
        assert_eq!(similarity("abcd", "wxyz"), 0.);
        // bigrams: cl li ie en nt t_ _s sc cr re et / cl li ie en nt t_ _s se ec cr re et
        assert!((similarity("client scret", "client_secret") - 20. / 23.).abs() < 1e-12);
        let (x, y) = ("profile", "profile_id");
        assert_eq!(similarity(x, y), similarity(y, x));
    }

    #[test]
    fn test_resolve_key() {
        assert_eq!(
            SettingKey::resolve("secret", 0.5).unwrap(),
            SettingKey::ClientSecret
        );
        let e = SettingKey::resolve("zzz", 0.5).unwrap_err();
        assert!(matches!(e, SettingError::Unresolved { .. }));
        let message = e.to_string();
        assert!(message.starts_with("\"zzz\" is not a valid setting!"));
        assert!(message.ends_with(
            "• Client Id\n• Client Secret\n• Autocorrect Confidence\n• Profile Id"
        ));
    }

    #[test]
    fn test_format_setting() {
        assert_eq!(format_setting("autocorrect_confidence"), "Autocorrect Confidence");
        assert_eq!(format_setting("client_id"), "Client Id");
        assert_eq!(SettingKey::ProfileId.display_name(), "Profile Id");
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(
            SettingKey::ClientId.parse_value("12345").unwrap(),
            SettingValue::Integer(12345)
        );
        assert_eq!(
            SettingKey::AutocorrectConfidence.parse_value(" 0.3 ").unwrap(),
            SettingValue::Decimal(0.3)
        );
        assert_eq!(
            SettingKey::ClientSecret.parse_value("abc").unwrap(),
            SettingValue::Text("abc".to_owned())
        );
        assert_eq!(
            SettingKey::ProfileId
                .parse_value("peppy")
                .unwrap_err()
                .to_string(),
            "The value for Profile Id must be a number! Please try again!"
        );
        assert!(matches!(
            SettingKey::AutocorrectConfidence.parse_value("1.5"),
            Err(SettingError::OutOfRange { .. })
        ));
        assert!(SettingKey::AutocorrectConfidence.parse_value("NaN").is_err());
    }

    #[test]
    fn test_schema() {
        assert_eq!(keys(), ["client_id", "client_secret", "autocorrect_confidence", "profile_id"]);
        let redacted = SettingKey::iter().filter(|k| k.is_redacted()).collect_vec();
        assert_eq!(redacted, [SettingKey::ClientSecret]);
        assert_eq!(
            SettingKey::AutocorrectConfidence.default_value(),
            Some(SettingValue::Decimal(0.5))
        );
        assert_eq!(SettingKey::ClientId.default_value(), None);
    }
}

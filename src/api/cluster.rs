use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regional routing cluster hosting a player's match records.
///
/// Probing order is fixed: americas, asia, europe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Americas,
    Asia,
    Europe,
}

impl Cluster {
    pub const ALL: [Cluster; 3] = [Cluster::Americas, Cluster::Asia, Cluster::Europe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Americas => "americas",
            Cluster::Asia => "asia",
            Cluster::Europe => "europe",
        }
    }

    /// Static tag-suffix lookup, exact and case-insensitive. Returns
    /// `None` for tags that do not map to a known platform.
    pub fn from_tag_line(tag: &str) -> Option<Cluster> {
        const AMERICAS: &[&str] = &[
            "NA1", "BR1", "LA1", "LA2", "OC1", "NA", "BR", "LAN", "LAS", "OCE",
        ];
        const EUROPE: &[&str] = &["EUW1", "EUN1", "TR1", "RU", "EUW", "EUNE", "TR"];
        const ASIA: &[&str] = &["JP1", "KR", "SG2", "PH2", "TW2", "TH2", "VN2", "JP", "KR1"];

        if AMERICAS.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            Some(Cluster::Americas)
        } else if EUROPE.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            Some(Cluster::Europe)
        } else if ASIA.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            Some(Cluster::Asia)
        } else {
            None
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "americas" => Ok(Cluster::Americas),
            "asia" => Ok(Cluster::Asia),
            "europe" => Ok(Cluster::Europe),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_table_is_case_insensitive() {
        assert_eq!(Cluster::from_tag_line("na1"), Some(Cluster::Americas));
        assert_eq!(Cluster::from_tag_line("EUW"), Some(Cluster::Europe));
        assert_eq!(Cluster::from_tag_line("kr"), Some(Cluster::Asia));
    }

    #[test]
    fn unknown_tags_fall_through() {
        assert_eq!(Cluster::from_tag_line("0000"), None);
        assert_eq!(Cluster::from_tag_line(""), None);
    }

    #[test]
    fn parses_query_parameter_names() {
        assert_eq!("americas".parse(), Ok(Cluster::Americas));
        assert!("AMERICAS".parse::<Cluster>().is_err());
    }
}

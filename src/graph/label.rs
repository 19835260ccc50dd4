//! Label helpers.

use core::cmp::Ordering;

/// A run of a label, either all digits or none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaturalPart {
    Number(u64),
    Text(String),
}

impl Ord for NaturalPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for NaturalPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key ordering embedded numbers by value and text case-insensitively.
///
/// `["1", "10", "2", "1a"]` sorts as `["1", "1a", "2", "10"]`.
pub fn natural_key(label: &str) -> Vec<NaturalPart> {
    let mut parts = Vec::new();
    let mut rest = label;

    while let Some(first) = rest.chars().next() {
        let digits = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);

        parts.push(if digits {
            // Runs too long for u64 still sort after every shorter number.
            NaturalPart::Number(run.parse().unwrap_or(u64::MAX))
        } else {
            NaturalPart::Text(run.to_lowercase())
        });
        rest = tail;
    }

    parts
}

/// Convert a dotted Survex label to Therion notation: `a.b.c` becomes
/// `c@b.a`.
pub fn therion_label(label: &str) -> String {
    match label.rsplit_once('.') {
        None => label.to_owned(),
        Some((survey, station)) => {
            let survey: Vec<_> = survey.rsplit('.').collect();
            format!("{station}@{}", survey.join("."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        let mut labels = ["1", "10", "2", "1a"];
        labels.sort_by_key(|l| natural_key(l));
        assert_eq!(labels, ["1", "1a", "2", "10"]);

        let mut labels = ["B.2", "a.10", "a.9"];
        labels.sort_by_key(|l| natural_key(l));
        assert_eq!(labels, ["a.9", "a.10", "B.2"]);
    }

    #[test]
    fn empty_label_has_empty_key() {
        assert!(natural_key("").is_empty());
    }

    #[test]
    fn therion_notation() {
        assert_eq!(therion_label("p40a"), "p40a");
        assert_eq!(therion_label("40.eishohle.400"), "400@eishohle.40");
    }
}

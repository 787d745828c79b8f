//! Parsing of free-text command parameters: dates, periods, teams, and the
//! `Nom=valeur; Nom=valeur` lists used by attribution and template commands.

use crate::{
    core::period::{DateRange, PeriodPreset},
    entities::sport_match::Equipe,
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};

/// Period labels accepted by [`parse_period`]
pub const PERIOD_LABELS: [&str; 4] = ["mois", "trimestre", "semestre", "annee"];

/// Team labels accepted by [`parse_equipe`]
pub const EQUIPE_LABELS: [&str; 2] = ["e2d", "phoenix"];

/// Datasets offered by the export command
pub const EXPORT_LABELS: [&str; 4] = ["cotisations", "epargnes", "membres", "sanctions"];

/// Today's date in local time
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses `AAAA-MM-JJ` or `JJ/MM/AAAA`; `None` means today.
pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(today());
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| Error::validation(format!("Date invalide : {raw} (attendu AAAA-MM-JJ)")))
}

/// Resolves a period preset label relative to `today`; `None` means the last month.
pub fn parse_period(raw: Option<&str>, today: NaiveDate) -> Result<(DateRange, &'static str)> {
    let preset = match raw.map(|r| r.trim().to_lowercase()).as_deref() {
        None | Some("" | "mois") => PeriodPreset::LastMonth,
        Some("trimestre") => PeriodPreset::LastQuarter,
        Some("semestre") => PeriodPreset::LastSemester,
        Some("annee" | "année") => PeriodPreset::LastYear,
        Some(other) => {
            return Err(Error::validation(format!(
                "Période inconnue : {other} (choix : {})",
                PERIOD_LABELS.join(", ")
            )));
        }
    };
    Ok((preset.range(today)?, preset.label()))
}

/// Builds a custom range from two optional dates, falling back to `default`.
pub fn parse_range(
    debut: Option<&str>,
    fin: Option<&str>,
    default: DateRange,
) -> Result<DateRange> {
    match (debut, fin) {
        (None, None) => Ok(default),
        (debut, fin) => {
            let start = debut.map_or(Ok(default.start), |d| parse_date(Some(d)))?;
            let end = fin.map_or(Ok(default.end), |d| parse_date(Some(d)))?;
            PeriodPreset::Custom { start, end }.range(end)
        }
    }
}

/// Parses a team label.
pub fn parse_equipe(raw: &str) -> Result<Equipe> {
    match raw.trim().to_lowercase().as_str() {
        "e2d" => Ok(Equipe::E2d),
        "phoenix" => Ok(Equipe::Phoenix),
        other => Err(Error::validation(format!(
            "Équipe inconnue : {other} (choix : {})",
            EQUIPE_LABELS.join(", ")
        ))),
    }
}

/// Splits `clé=valeur; clé=valeur` into trimmed pairs.
///
/// Empty entries are skipped; an entry without `=` is an error.
pub fn parse_pairs(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| Error::validation(format!("Entrée invalide « {entry} » (attendu clé=valeur)")))?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parses `Prénom Nom=montant; ...` into names and amounts.
pub fn parse_amounts(raw: &str) -> Result<Vec<(String, f64)>> {
    parse_pairs(raw)?
        .into_iter()
        .map(|(name, value)| {
            let montant = value
                .replace(' ', "")
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|_| Error::validation(format!("Montant invalide pour {name} : {value}")))?;
            Ok((name, montant))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(Some("2024-03-02")).unwrap(), date(2024, 3, 2));
        assert_eq!(parse_date(Some("02/03/2024")).unwrap(), date(2024, 3, 2));
        assert_eq!(parse_date(None).unwrap(), today());
        assert!(parse_date(Some("demain")).is_err());
    }

    #[test]
    fn test_parse_period() {
        let (range, label) = parse_period(Some("Trimestre"), date(2024, 6, 15)).unwrap();
        assert_eq!(range.start, date(2024, 3, 15));
        assert_eq!(range.end, date(2024, 6, 15));
        assert_eq!(label, "Dernier trimestre");
        assert!(parse_period(Some("décennie"), date(2024, 6, 15)).is_err());
    }

    #[test]
    fn test_parse_range_overrides() {
        let default = DateRange::month(2024, 6).unwrap();
        assert_eq!(parse_range(None, None, default).unwrap(), default);
        let custom = parse_range(Some("2024-06-10"), None, default).unwrap();
        assert_eq!(custom.start, date(2024, 6, 10));
        assert_eq!(custom.end, date(2024, 6, 30));
        assert!(parse_range(Some("2024-07-10"), None, default).is_err());
    }

    #[test]
    fn test_parse_amounts() {
        let pairs = parse_amounts("Awa Diallo = 50 000; Paul Abega=12,5;").unwrap();
        assert_eq!(
            pairs,
            vec![("Awa Diallo".to_string(), 50_000.0), ("Paul Abega".to_string(), 12.5)]
        );
        assert!(parse_amounts("Awa Diallo").is_err());
        assert!(parse_amounts("Awa=beaucoup").is_err());
    }

    #[test]
    fn test_parse_equipe() {
        assert_eq!(parse_equipe(" Phoenix ").unwrap(), Equipe::Phoenix);
        assert!(parse_equipe("psg").is_err());
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{check_text, time_format, ValidationError};

const MAX_URL_LEN: usize = 2048;

/// A progress photo reference. The image itself lives elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub waist: Option<f64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoInput {
    pub weight: Option<f64>,
    pub waist: Option<f64>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub date: Option<String>,
}

impl PhotoInput {
    pub fn validate(self, now: NaiveDateTime) -> Result<PhotoEntry, ValidationError> {
        for (field, value) in [("weight", self.weight), ("waist", self.waist)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(ValidationError::new(format!(
                        "{} must be a positive number",
                        field
                    )));
                }
            }
        }
        if let Some(url) = &self.photo_url {
            check_text("photo_url", url, MAX_URL_LEN)?;
        }
        check_text("notes", &self.notes, 500)?;

        let date = match self.date.as_deref() {
            Some(d) => time_format::parse_date(d)?,
            None => now.date(),
        };

        Ok(PhotoEntry {
            date,
            weight: self.weight,
            waist: self.waist,
            photo_url: self.photo_url,
            notes: self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_input_validate() {
        let now = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let input = PhotoInput {
            weight: Some(210.0),
            waist: Some(36.5),
            photo_url: Some("/static/photos/a.jpg".to_string()),
            ..Default::default()
        };
        let photo = input.validate(now).unwrap();
        assert_eq!(photo.date, now.date());
        assert_eq!(photo.waist, Some(36.5));

        let bad = PhotoInput {
            waist: Some(-1.0),
            ..Default::default()
        };
        assert!(bad.validate(now).is_err());
    }
}

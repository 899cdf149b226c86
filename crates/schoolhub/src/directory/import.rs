use super::domain::{Board, Ratings, SchoolId, SchoolRecord, SchoolRecordError, SchoolType};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum SchoolImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow {
        line: usize,
        source: SchoolRecordError,
    },
}

impl std::fmt::Display for SchoolImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchoolImportError::Io(err) => write!(f, "failed to read school export: {}", err),
            SchoolImportError::Csv(err) => write!(f, "invalid school CSV data: {}", err),
            SchoolImportError::InvalidRow { line, source } => {
                write!(f, "school row on line {} rejected: {}", line, source)
            }
        }
    }
}

impl std::error::Error for SchoolImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchoolImportError::Io(err) => Some(err),
            SchoolImportError::Csv(err) => Some(err),
            SchoolImportError::InvalidRow { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for SchoolImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SchoolImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads school rows from a CSV export of the `schools` table.
pub struct SchoolImporter;

impl SchoolImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SchoolRecord>, SchoolImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SchoolRecord>, SchoolImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, row) in csv_reader.deserialize::<SchoolRow>().enumerate() {
            // header occupies line 1
            let line = index + 2;
            let row = row?;
            let record = row
                .into_record(line)
                .map_err(|source| SchoolImportError::InvalidRow { line, source })?;
            records.push(record);
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct SchoolRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    name: String,
    city: String,
    district: String,
    board: String,
    #[serde(rename = "type")]
    school_type: String,
    #[serde(default)]
    established: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    image_url: Option<String>,
    #[serde(default)]
    overall: Option<f64>,
    #[serde(default)]
    facility: Option<f64>,
    #[serde(default)]
    faculty: Option<f64>,
    #[serde(default)]
    activities: Option<f64>,
}

impl SchoolRow {
    fn into_record(self, line: usize) -> Result<SchoolRecord, SchoolRecordError> {
        let board: Board = self.board.parse()?;
        let school_type: SchoolType = self.school_type.parse()?;
        let ratings = match (self.overall, self.facility, self.faculty, self.activities) {
            (None, None, None, None) => None,
            (Some(overall), Some(facility), Some(faculty), Some(activities)) => {
                Some(Ratings::new(overall, facility, faculty, activities)?)
            }
            _ => return Err(SchoolRecordError::PartialRatings),
        };

        Ok(SchoolRecord {
            id: SchoolId(self.id.unwrap_or_else(|| format!("school-{line:04}"))),
            name: self.name,
            city: self.city,
            district: self.district,
            board,
            school_type,
            established: self.established,
            description: self.description,
            image_url: self.image_url,
            ratings,
            principal: None,
            contact_email: None,
            contact_phone: None,
            website: None,
            address: None,
            admission_process: None,
            facilities: Vec::new(),
            achievements: Vec::new(),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for school rows issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchoolId(pub String);

impl fmt::Display for SchoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Examination board a school is affiliated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Board {
    Cbse,
    Icse,
    StateBoard,
    Ib,
}

impl Board {
    pub const ALL: [Board; 4] = [Board::Cbse, Board::Icse, Board::StateBoard, Board::Ib];

    pub fn label(self) -> &'static str {
        match self {
            Board::Cbse => "CBSE",
            Board::Icse => "ICSE",
            Board::StateBoard => "State Board",
            Board::Ib => "IB",
        }
    }
}

impl FromStr for Board {
    type Err = SchoolRecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_label(value);
        Board::ALL
            .into_iter()
            .find(|board| board.label().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| SchoolRecordError::UnknownBoard(value.trim().to_string()))
    }
}

impl TryFrom<String> for Board {
    type Error = SchoolRecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Board> for &'static str {
    fn from(value: Board) -> Self {
        value.label()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Funding/management category of a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SchoolType {
    Government,
    Private,
    Aided,
    International,
}

impl SchoolType {
    pub const ALL: [SchoolType; 4] = [
        SchoolType::Government,
        SchoolType::Private,
        SchoolType::Aided,
        SchoolType::International,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SchoolType::Government => "Government",
            SchoolType::Private => "Private",
            SchoolType::Aided => "Aided",
            SchoolType::International => "International",
        }
    }
}

impl FromStr for SchoolType {
    type Err = SchoolRecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_label(value);
        SchoolType::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| SchoolRecordError::UnknownType(value.trim().to_string()))
    }
}

impl TryFrom<String> for SchoolType {
    type Error = SchoolRecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchoolType> for &'static str {
    fn from(value: SchoolType) -> Self {
        value.label()
    }
}

impl fmt::Display for SchoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_label(value: &str) -> String {
    value.trim().replace(['_', '-'], " ")
}

/// Aggregated review scores, each on a 0-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRatings")]
pub struct Ratings {
    pub overall: f64,
    pub facility: f64,
    pub faculty: f64,
    pub activities: f64,
}

impl Ratings {
    pub const MAX: f64 = 5.0;

    pub fn new(
        overall: f64,
        facility: f64,
        faculty: f64,
        activities: f64,
    ) -> Result<Self, SchoolRecordError> {
        for (field, value) in [
            ("overall", overall),
            ("facility", facility),
            ("faculty", faculty),
            ("activities", activities),
        ] {
            if !(0.0..=Self::MAX).contains(&value) {
                return Err(SchoolRecordError::RatingOutOfRange { field, value });
            }
        }

        Ok(Self {
            overall,
            facility,
            faculty,
            activities,
        })
    }
}

#[derive(Deserialize)]
struct RawRatings {
    overall: f64,
    facility: f64,
    faculty: f64,
    activities: f64,
}

impl TryFrom<RawRatings> for Ratings {
    type Error = SchoolRecordError;

    fn try_from(raw: RawRatings) -> Result<Self, Self::Error> {
        Ratings::new(raw.overall, raw.facility, raw.faculty, raw.activities)
    }
}

/// A school row as returned by the hosted backend.
///
/// Board, type and rating values are checked when the row is deserialized or
/// imported, so readers can rely on them without re-validating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub id: SchoolId,
    pub name: String,
    pub city: String,
    pub district: String,
    pub board: Board,
    #[serde(rename = "type")]
    pub school_type: SchoolType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Ratings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_process: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl SchoolRecord {
    /// Overall score used for ranking; unrated schools count as 0.
    pub fn overall_rating(&self) -> f64 {
        self.ratings.map(|ratings| ratings.overall).unwrap_or(0.0)
    }

    /// Founding year used for ranking; unknown years count as 0.
    pub fn established_year(&self) -> i32 {
        self.established.unwrap_or(0)
    }

    /// Build a stored row from a validated draft, keeping any existing ratings.
    pub fn from_draft(id: SchoolId, draft: SchoolDraft, ratings: Option<Ratings>) -> Self {
        Self {
            id,
            name: draft.name,
            city: draft.city,
            district: draft.district,
            board: draft.board,
            school_type: draft.school_type,
            established: draft.established,
            description: draft.description,
            image_url: draft.image_url,
            ratings,
            principal: draft.principal,
            contact_email: draft.contact_email,
            contact_phone: draft.contact_phone,
            website: draft.website,
            address: draft.address,
            admission_process: draft.admission_process,
            facilities: draft.facilities,
            achievements: draft.achievements,
        }
    }
}

/// City reference row used to populate the city filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub district: String,
}

/// Admin form payload before validation. Blank strings are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolFields {
    pub name: String,
    pub city: String,
    pub district: String,
    #[serde(rename = "type", deserialize_with = "blank_label_as_none")]
    pub school_type: Option<SchoolType>,
    #[serde(deserialize_with = "blank_label_as_none")]
    pub board: Option<Board>,
    pub established: Option<i32>,
    pub principal: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub facilities: Vec<String>,
    pub achievements: Vec<String>,
    pub admission_process: Option<String>,
}

impl SchoolFields {
    /// Check required fields and normalise optional ones into a [`SchoolDraft`].
    pub fn into_draft(self) -> Result<SchoolDraft, SchoolRecordError> {
        let name = self.name.trim().to_string();
        let city = self.city.trim().to_string();
        let district = self.district.trim().to_string();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if city.is_empty() {
            missing.push("city");
        }
        if district.is_empty() {
            missing.push("district");
        }
        if self.school_type.is_none() {
            missing.push("type");
        }
        if self.board.is_none() {
            missing.push("board");
        }

        let (Some(school_type), Some(board), true) =
            (self.school_type, self.board, missing.is_empty())
        else {
            return Err(SchoolRecordError::MissingRequired(missing));
        };

        Ok(SchoolDraft {
            name,
            city,
            district,
            board,
            school_type,
            established: self.established,
            principal: non_blank(self.principal),
            contact_email: non_blank(self.contact_email),
            contact_phone: non_blank(self.contact_phone),
            website: non_blank(self.website),
            address: non_blank(self.address),
            description: non_blank(self.description),
            image_url: non_blank(self.image_url),
            facilities: non_blank_items(self.facilities),
            achievements: non_blank_items(self.achievements),
            admission_process: non_blank(self.admission_process),
        })
    }
}

/// Validated admin input ready to be inserted or applied as an update.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolDraft {
    pub name: String,
    pub city: String,
    pub district: String,
    pub board: Board,
    pub school_type: SchoolType,
    pub established: Option<i32>,
    pub principal: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub facilities: Vec<String>,
    pub achievements: Vec<String>,
    pub admission_process: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn non_blank_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| non_blank(Some(item)))
        .collect()
}

fn blank_label_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Identifier of an authenticated backend user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// The signed-in user as resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Failures raised while validating school rows or admin input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchoolRecordError {
    #[error("unknown board '{0}'")]
    UnknownBoard(String),
    #[error("unknown school type '{0}'")]
    UnknownType(String),
    #[error("rating '{field}' must be between 0 and 5, got {value}")]
    RatingOutOfRange { field: &'static str, value: f64 },
    #[error("incomplete ratings: overall, facility, faculty and activities must all be set")]
    PartialRatings,
    #[error("Please fill in all required fields")]
    MissingRequired(Vec<&'static str>),
}

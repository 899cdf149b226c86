use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::directory::admin::{AdminService, SiteSettings, UserProfile};
use crate::directory::backend::{BackendError, DirectoryBackend, SessionDirectory};
use crate::directory::domain::{
    Board, City, Ratings, Role, SchoolDraft, SchoolFields, SchoolId, SchoolRecord, SchoolType,
    SessionUser, UserId,
};
use crate::directory::service::DirectoryService;

pub(super) const ADMIN_TOKEN: &str = "admin-token";
pub(super) const USER_TOKEN: &str = "user-token";

pub(super) fn school(
    id: &str,
    name: &str,
    city: &str,
    board: Board,
    overall: Option<f64>,
) -> SchoolRecord {
    SchoolRecord {
        id: SchoolId(id.to_string()),
        name: name.to_string(),
        city: city.to_string(),
        district: city.to_string(),
        board,
        school_type: SchoolType::Private,
        established: None,
        description: None,
        image_url: None,
        ratings: overall.map(|overall| {
            Ratings::new(overall, overall, overall, overall).expect("valid rating")
        }),
        principal: None,
        contact_email: None,
        contact_phone: None,
        website: None,
        address: None,
        admission_process: None,
        facilities: Vec::new(),
        achievements: Vec::new(),
    }
}

pub(super) fn alpha_beta() -> Vec<SchoolRecord> {
    vec![
        school("a", "Alpha", "X", Board::Cbse, Some(4.5)),
        school("b", "Beta", "Y", Board::Icse, Some(3.0)),
    ]
}

/// Schools named "School 01".."School NN" spread across three cities.
pub(super) fn numbered_schools(count: usize) -> Vec<SchoolRecord> {
    let cities = ["Bhubaneswar", "Cuttack", "Puri"];
    (1..=count)
        .map(|n| {
            let mut record = school(
                &format!("s-{n:02}"),
                &format!("School {n:02}"),
                cities[n % cities.len()],
                Board::ALL[n % Board::ALL.len()],
                Some((n % 6) as f64 * 0.8),
            );
            record.established = Some(1950 + n as i32);
            record
        })
        .collect()
}

pub(super) fn odisha_schools() -> Vec<SchoolRecord> {
    let mut dav = school("sch-001", "DAV Public School", "Bhubaneswar", Board::Cbse, Some(4.5));
    dav.district = "Khordha".to_string();
    dav.established = Some(1989);
    let mut sai = school(
        "sch-002",
        "Sai International School",
        "Bhubaneswar",
        Board::Ib,
        Some(4.7),
    );
    sai.district = "Khordha".to_string();
    sai.school_type = SchoolType::International;
    sai.established = Some(2008);
    let mut stewart = school("sch-003", "Stewart School", "Cuttack", Board::Icse, Some(4.1));
    stewart.school_type = SchoolType::Aided;
    stewart.established = Some(1881);
    let mut kv = school("sch-004", "Kendriya Vidyalaya", "Puri", Board::Cbse, None);
    kv.school_type = SchoolType::Government;
    vec![dav, sai, stewart, kv]
}

pub(super) fn valid_fields(name: &str, city: &str) -> SchoolFields {
    SchoolFields {
        name: name.to_string(),
        city: city.to_string(),
        district: city.to_string(),
        school_type: Some(SchoolType::Private),
        board: Some(Board::Cbse),
        established: Some(2001),
        ..SchoolFields::default()
    }
}

pub(super) fn profiles() -> Vec<UserProfile> {
    let now = Utc::now();
    vec![
        UserProfile {
            user_id: UserId("u-admin".to_string()),
            email: "admin@schoolhub.com".to_string(),
            display_name: Some("Site Admin".to_string()),
            phone: None,
            created_at: now - Duration::days(90),
            last_login_at: Some(now - Duration::hours(1)),
            role: Role::Admin,
        },
        UserProfile {
            user_id: UserId("u-parent".to_string()),
            email: "parent@example.com".to_string(),
            display_name: Some("Anita Mohanty".to_string()),
            phone: Some("+91 90000 00000".to_string()),
            created_at: now - Duration::days(2),
            last_login_at: None,
            role: Role::User,
        },
    ]
}

#[derive(Default)]
pub(super) struct MemoryBackend {
    schools: Mutex<Vec<SchoolRecord>>,
    scores: Mutex<Vec<f64>>,
    profiles: Mutex<Vec<UserProfile>>,
    settings: Mutex<Option<SiteSettings>>,
    sequence: AtomicU64,
}

impl MemoryBackend {
    pub(super) fn with_schools(schools: Vec<SchoolRecord>) -> Self {
        let scores = schools
            .iter()
            .filter_map(|school| school.ratings.map(|ratings| ratings.overall))
            .collect();
        Self {
            schools: Mutex::new(schools),
            scores: Mutex::new(scores),
            profiles: Mutex::new(profiles()),
            ..Self::default()
        }
    }

    pub(super) fn stored(&self) -> Vec<SchoolRecord> {
        self.schools.lock().expect("schools mutex poisoned").clone()
    }
}

impl DirectoryBackend for MemoryBackend {
    fn fetch_schools(&self) -> Result<Vec<SchoolRecord>, BackendError> {
        let mut schools = self.stored();
        schools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(schools)
    }

    fn fetch_cities(&self) -> Result<Vec<City>, BackendError> {
        let mut cities: Vec<City> = Vec::new();
        for school in self.stored() {
            if !cities.iter().any(|city| city.name == school.city) {
                cities.push(City {
                    name: school.city,
                    district: school.district,
                });
            }
        }
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    fn insert_school(&self, draft: SchoolDraft) -> Result<SchoolRecord, BackendError> {
        let mut guard = self.schools.lock().expect("schools mutex poisoned");
        if guard
            .iter()
            .any(|school| school.name == draft.name && school.city == draft.city)
        {
            return Err(BackendError::Conflict);
        }
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = SchoolRecord::from_draft(SchoolId(format!("new-{id}")), draft, None);
        guard.push(record.clone());
        Ok(record)
    }

    fn update_school(
        &self,
        id: &SchoolId,
        draft: SchoolDraft,
    ) -> Result<SchoolRecord, BackendError> {
        let mut guard = self.schools.lock().expect("schools mutex poisoned");
        let existing = guard
            .iter_mut()
            .find(|school| &school.id == id)
            .ok_or(BackendError::NotFound)?;
        *existing = SchoolRecord::from_draft(id.clone(), draft, existing.ratings);
        Ok(existing.clone())
    }

    fn delete_school(&self, id: &SchoolId) -> Result<(), BackendError> {
        let mut guard = self.schools.lock().expect("schools mutex poisoned");
        let before = guard.len();
        guard.retain(|school| &school.id != id);
        if guard.len() == before {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }

    fn delete_all_schools(&self) -> Result<usize, BackendError> {
        let mut guard = self.schools.lock().expect("schools mutex poisoned");
        let deleted = guard.len();
        guard.clear();
        Ok(deleted)
    }

    fn fetch_rating_scores(&self) -> Result<Vec<f64>, BackendError> {
        Ok(self.scores.lock().expect("scores mutex poisoned").clone())
    }

    fn fetch_profiles(&self) -> Result<Vec<UserProfile>, BackendError> {
        Ok(self.profiles.lock().expect("profiles mutex poisoned").clone())
    }

    fn load_settings(&self) -> Result<SiteSettings, BackendError> {
        Ok(self
            .settings
            .lock()
            .expect("settings mutex poisoned")
            .clone()
            .unwrap_or_default())
    }

    fn store_settings(&self, settings: SiteSettings) -> Result<SiteSettings, BackendError> {
        *self.settings.lock().expect("settings mutex poisoned") = Some(settings.clone());
        Ok(settings)
    }
}

/// Every call fails as if the hosted backend were offline.
pub(super) struct UnavailableBackend;

fn offline<T>() -> Result<T, BackendError> {
    Err(BackendError::Unavailable("backend offline".to_string()))
}

impl DirectoryBackend for UnavailableBackend {
    fn fetch_schools(&self) -> Result<Vec<SchoolRecord>, BackendError> {
        offline()
    }

    fn fetch_cities(&self) -> Result<Vec<City>, BackendError> {
        offline()
    }

    fn insert_school(&self, _draft: SchoolDraft) -> Result<SchoolRecord, BackendError> {
        Err(BackendError::Rejected("row level security".to_string()))
    }

    fn update_school(
        &self,
        _id: &SchoolId,
        _draft: SchoolDraft,
    ) -> Result<SchoolRecord, BackendError> {
        offline()
    }

    fn delete_school(&self, _id: &SchoolId) -> Result<(), BackendError> {
        offline()
    }

    fn delete_all_schools(&self) -> Result<usize, BackendError> {
        offline()
    }

    fn fetch_rating_scores(&self) -> Result<Vec<f64>, BackendError> {
        offline()
    }

    fn fetch_profiles(&self) -> Result<Vec<UserProfile>, BackendError> {
        offline()
    }

    fn load_settings(&self) -> Result<SiteSettings, BackendError> {
        offline()
    }

    fn store_settings(&self, _settings: SiteSettings) -> Result<SiteSettings, BackendError> {
        offline()
    }
}

#[derive(Default)]
pub(super) struct MemorySessions {
    users: HashMap<String, SessionUser>,
    admins: HashSet<UserId>,
    role_lookup_fails: bool,
}

impl MemorySessions {
    /// One admin session and one regular user session.
    pub(super) fn standard() -> Self {
        let mut sessions = Self::default();
        sessions.users.insert(
            ADMIN_TOKEN.to_string(),
            SessionUser {
                id: UserId("u-admin".to_string()),
                email: "admin@schoolhub.com".to_string(),
            },
        );
        sessions.users.insert(
            USER_TOKEN.to_string(),
            SessionUser {
                id: UserId("u-parent".to_string()),
                email: "parent@example.com".to_string(),
            },
        );
        sessions.admins.insert(UserId("u-admin".to_string()));
        sessions
    }

    pub(super) fn with_failing_role_lookup() -> Self {
        Self {
            role_lookup_fails: true,
            ..Self::standard()
        }
    }
}

impl SessionDirectory for MemorySessions {
    fn current_user(&self, token: &str) -> Result<Option<SessionUser>, BackendError> {
        Ok(self.users.get(token).cloned())
    }

    fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, BackendError> {
        if self.role_lookup_fails {
            return Err(BackendError::Unavailable("user_roles offline".to_string()));
        }
        Ok(role == Role::Admin && self.admins.contains(user_id))
    }
}

pub(super) fn directory_service(
    schools: Vec<SchoolRecord>,
) -> (DirectoryService<MemoryBackend>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::with_schools(schools));
    (DirectoryService::new(backend.clone()), backend)
}

pub(super) fn admin_service(
    schools: Vec<SchoolRecord>,
) -> (
    AdminService<MemoryBackend, MemorySessions>,
    Arc<MemoryBackend>,
) {
    let backend = Arc::new(MemoryBackend::with_schools(schools));
    let sessions = Arc::new(MemorySessions::standard());
    (AdminService::new(backend.clone(), sessions), backend)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

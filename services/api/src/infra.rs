use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use schoolhub::directory::admin::{SiteSettings, UserProfile};
use schoolhub::directory::{
    BackendError, City, DirectoryBackend, Role, SchoolDraft, SchoolId, SchoolRecord,
    SessionDirectory, SessionUser, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, table: &str) -> Result<MutexGuard<'a, T>, BackendError> {
    mutex
        .lock()
        .map_err(|_| BackendError::Unavailable(format!("{table} table lock poisoned")))
}

/// Process-local stand-in for the hosted tables behind the directory.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDirectory {
    schools: Arc<Mutex<Vec<SchoolRecord>>>,
    scores: Arc<Mutex<Vec<(SchoolId, f64)>>>,
    profiles: Arc<Mutex<Vec<UserProfile>>>,
    settings: Arc<Mutex<Option<SiteSettings>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryDirectory {
    /// Seed with imported rows; each rated school contributes one score.
    pub(crate) fn seeded(schools: Vec<SchoolRecord>) -> Self {
        let scores = schools
            .iter()
            .filter_map(|school| {
                school
                    .ratings
                    .map(|ratings| (school.id.clone(), ratings.overall))
            })
            .collect();
        Self {
            schools: Arc::new(Mutex::new(schools)),
            scores: Arc::new(Mutex::new(scores)),
            ..Self::default()
        }
    }

    pub(crate) fn with_profile(self, profile: UserProfile) -> Self {
        match lock(&self.profiles, "profiles") {
            Ok(mut guard) => guard.push(profile),
            Err(err) => {
                warn!(error = %err, user_id = %profile.user_id.0, "profile not seeded");
            }
        }
        self
    }

    fn next_id(&self) -> SchoolId {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        SchoolId(format!("local-{n:04}"))
    }
}

impl DirectoryBackend for InMemoryDirectory {
    fn fetch_schools(&self) -> Result<Vec<SchoolRecord>, BackendError> {
        let mut schools = lock(&self.schools, "schools")?.clone();
        schools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(schools)
    }

    fn fetch_cities(&self) -> Result<Vec<City>, BackendError> {
        let guard = lock(&self.schools, "schools")?;
        let mut cities: Vec<City> = Vec::new();
        for school in guard.iter() {
            if !cities.iter().any(|city| city.name == school.city) {
                cities.push(City {
                    name: school.city.clone(),
                    district: school.district.clone(),
                });
            }
        }
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    fn insert_school(&self, draft: SchoolDraft) -> Result<SchoolRecord, BackendError> {
        let mut guard = lock(&self.schools, "schools")?;
        if is_duplicate(&guard, &draft, None) {
            return Err(BackendError::Conflict);
        }
        let record = SchoolRecord::from_draft(self.next_id(), draft, None);
        guard.push(record.clone());
        Ok(record)
    }

    fn update_school(
        &self,
        id: &SchoolId,
        draft: SchoolDraft,
    ) -> Result<SchoolRecord, BackendError> {
        let mut guard = lock(&self.schools, "schools")?;
        if is_duplicate(&guard, &draft, Some(id)) {
            return Err(BackendError::Conflict);
        }
        let existing = guard
            .iter_mut()
            .find(|school| &school.id == id)
            .ok_or(BackendError::NotFound)?;
        *existing = SchoolRecord::from_draft(id.clone(), draft, existing.ratings);
        Ok(existing.clone())
    }

    fn delete_school(&self, id: &SchoolId) -> Result<(), BackendError> {
        let mut guard = lock(&self.schools, "schools")?;
        let before = guard.len();
        guard.retain(|school| &school.id != id);
        if guard.len() == before {
            return Err(BackendError::NotFound);
        }
        lock(&self.scores, "ratings")?.retain(|(school_id, _)| school_id != id);
        Ok(())
    }

    fn delete_all_schools(&self) -> Result<usize, BackendError> {
        let mut guard = lock(&self.schools, "schools")?;
        let deleted = guard.len();
        guard.clear();
        lock(&self.scores, "ratings")?.clear();
        Ok(deleted)
    }

    fn fetch_rating_scores(&self) -> Result<Vec<f64>, BackendError> {
        Ok(lock(&self.scores, "ratings")?
            .iter()
            .map(|(_, score)| *score)
            .collect())
    }

    fn fetch_profiles(&self) -> Result<Vec<UserProfile>, BackendError> {
        Ok(lock(&self.profiles, "profiles")?.clone())
    }

    fn load_settings(&self) -> Result<SiteSettings, BackendError> {
        Ok(lock(&self.settings, "site_settings")?
            .clone()
            .unwrap_or_default())
    }

    fn store_settings(&self, settings: SiteSettings) -> Result<SiteSettings, BackendError> {
        *lock(&self.settings, "site_settings")? = Some(settings.clone());
        Ok(settings)
    }
}

/// Another row, other than `except`, already has the draft's name in its city.
fn is_duplicate(
    schools: &[SchoolRecord],
    draft: &SchoolDraft,
    except: Option<&SchoolId>,
) -> bool {
    schools.iter().any(|school| {
        Some(&school.id) != except && school.name == draft.name && school.city == draft.city
    })
}

/// Static bearer-token sessions; there is no sign-in flow in this binary.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessions {
    users: HashMap<String, SessionUser>,
    admins: HashSet<UserId>,
}

impl InMemorySessions {
    pub(crate) fn with_admin(mut self, token: &str, user: SessionUser) -> Self {
        self.admins.insert(user.id.clone());
        self.users.insert(token.to_string(), user);
        self
    }
}

impl SessionDirectory for InMemorySessions {
    fn current_user(&self, token: &str) -> Result<Option<SessionUser>, BackendError> {
        Ok(self.users.get(token).cloned())
    }

    fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, BackendError> {
        Ok(role == Role::Admin && self.admins.contains(user_id))
    }
}

/// Session user and matching profile row for the configured admin token.
pub(crate) fn local_admin(now: DateTime<Utc>) -> (SessionUser, UserProfile) {
    let user = SessionUser {
        id: UserId("local-admin".to_string()),
        email: "admin@schoolhub.com".to_string(),
    };
    let profile = UserProfile {
        user_id: user.id.clone(),
        email: user.email.clone(),
        display_name: Some("Local Admin".to_string()),
        phone: None,
        created_at: now,
        last_login_at: Some(now),
        role: Role::Admin,
    };
    (user, profile)
}

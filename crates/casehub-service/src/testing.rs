//! In-memory test doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use casehub_cache::{MemoryCacheProvider, SignedUrlCache};
use casehub_core::config::cache::MemoryCacheConfig;
use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_database::AccessStore;
use casehub_entity::case::Case;
use casehub_entity::grant::{AccessGrant, AdminGrant, GrantRole};
use casehub_entity::user::{UpdateUserFlags, User};
use casehub_storage::providers::LocalObjectStore;
use casehub_storage::UrlSigner;

use crate::assistant::AssistantService;
use crate::case::assets::AssetLifecycle;
use crate::case::{CaseService, Reconciler};
use crate::context::RequestContext;

/// In-memory [`AccessStore`] mirroring the Postgres implementation's
/// semantics: upserts keyed like the unique indexes, cascading deletes.
#[derive(Debug, Default)]
pub struct MemoryAccessStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    cases: HashMap<String, Case>,
    access_grants: HashMap<(Uuid, String), AccessGrant>,
    admin_grants: HashMap<(Uuid, String), AdminGrant>,
}

impl MemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of relational writes is not tracked; tests assert on state.
    pub fn snapshot_case_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<String> = state.cases.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn access_grant_count(&self) -> usize {
        self.state.lock().unwrap().access_grants.len()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }
}

#[async_trait]
impl AccessStore for MemoryAccessStore {
    async fn ensure_user(&self, email: &str, display_name: Option<&str>) -> AppResult<User> {
        let email = email.to_lowercase();
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.users.values_mut().find(|u| u.email == email) {
            if let Some(name) = display_name {
                existing.display_name = Some(name.to_string());
            }
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            display_name: display_name.map(str::to_string),
            is_admin: false,
            is_super_admin: false,
            can_create_cases: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.state.lock().unwrap().users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn list_users_with_grants_on(&self, case_ids: &[String]) -> AppResult<Vec<User>> {
        let state = self.state.lock().unwrap();
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| {
                case_ids.iter().any(|c| {
                    state.access_grants.contains_key(&(u.id, c.clone()))
                        || state.admin_grants.contains_key(&(u.id, c.clone()))
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn update_user_flags(&self, id: Uuid, flags: &UpdateUserFlags) -> AppResult<User> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if let Some(v) = flags.is_admin {
            user.is_admin = v;
        }
        if let Some(v) = flags.is_super_admin {
            user.is_super_admin = v;
        }
        if let Some(v) = flags.can_create_cases {
            user.can_create_cases = v;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_super_admin(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.is_super_admin = true;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.users.remove(&id).is_none() {
            return Err(AppError::not_found("User not found"));
        }
        state.access_grants.retain(|(uid, _), _| *uid != id);
        state.admin_grants.retain(|(uid, _), _| *uid != id);
        state.cases.retain(|_, c| c.creator_id != id);
        Ok(())
    }

    async fn find_case(&self, id: &str) -> AppResult<Option<Case>> {
        Ok(self.state.lock().unwrap().cases.get(id).cloned())
    }

    async fn case_ids(&self) -> AppResult<Vec<String>> {
        Ok(self.snapshot_case_ids())
    }

    async fn find_cases(&self, ids: &[String]) -> AppResult<Vec<Case>> {
        let state = self.state.lock().unwrap();
        Ok(ids.iter().filter_map(|id| state.cases.get(id).cloned()).collect())
    }

    async fn upsert_case(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        creator_id: Uuid,
    ) -> AppResult<(Case, bool)> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = state.cases.get_mut(id) {
            existing.name = name.to_string();
            existing.description = description.map(str::to_string);
            existing.updated_at = now;
            return Ok((existing.clone(), false));
        }
        let case = Case {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            creator_id,
            created_at: now,
            updated_at: now,
        };
        state.cases.insert(id.to_string(), case.clone());
        Ok((case, true))
    }

    async fn delete_case(&self, id: &str) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let existed = state.cases.remove(id).is_some();
        if existed {
            state.access_grants.retain(|(_, cid), _| cid != id);
            state.admin_grants.retain(|(_, cid), _| cid != id);
        }
        Ok(existed)
    }

    async fn upsert_access_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
        role: GrantRole,
        granted_by: Uuid,
    ) -> AppResult<AccessGrant> {
        let mut state = self.state.lock().unwrap();
        let grant = AccessGrant {
            user_id,
            case_id: case_id.to_string(),
            role,
            granted_by,
            granted_at: Utc::now(),
        };
        state
            .access_grants
            .insert((user_id, case_id.to_string()), grant.clone());
        Ok(grant)
    }

    async fn find_access_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
    ) -> AppResult<Option<AccessGrant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .access_grants
            .get(&(user_id, case_id.to_string()))
            .cloned())
    }

    async fn access_grants_for_case(&self, case_id: &str) -> AppResult<Vec<AccessGrant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .access_grants
            .values()
            .filter(|g| g.case_id == case_id)
            .cloned()
            .collect())
    }

    async fn access_grants_for_user(&self, user_id: Uuid) -> AppResult<Vec<AccessGrant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .access_grants
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn revoke_access_grant(&self, user_id: Uuid, case_id: &str) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .access_grants
            .remove(&(user_id, case_id.to_string()))
            .is_some())
    }

    async fn upsert_admin_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
        granted_by: Uuid,
    ) -> AppResult<AdminGrant> {
        let mut state = self.state.lock().unwrap();
        let grant = AdminGrant {
            user_id,
            case_id: case_id.to_string(),
            granted_by,
            granted_at: Utc::now(),
        };
        state
            .admin_grants
            .insert((user_id, case_id.to_string()), grant.clone());
        Ok(grant)
    }

    async fn admin_grants_for_user(&self, user_id: Uuid) -> AppResult<Vec<AdminGrant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .admin_grants
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn admin_grants_for_case(&self, case_id: &str) -> AppResult<Vec<AdminGrant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .admin_grants
            .values()
            .filter(|g| g.case_id == case_id)
            .cloned()
            .collect())
    }

    async fn revoke_admin_grant(&self, user_id: Uuid, case_id: &str) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .admin_grants
            .remove(&(user_id, case_id.to_string()))
            .is_some())
    }
}

/// Everything a service test needs, wired over a tempdir-backed object
/// store and the in-memory access store.
pub struct Harness {
    pub store: Arc<MemoryAccessStore>,
    pub access: Arc<dyn AccessStore>,
    pub assets: AssetLifecycle,
    pub reconciler: Reconciler,
    pub cases: CaseService,
    pub assistants: AssistantService,
    pub url_cache: Arc<SignedUrlCache>,
    _tmp: tempfile::TempDir,
}

pub async fn harness() -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let signer = Arc::new(UrlSigner::new("test-secret"));
    let objects = Arc::new(
        LocalObjectStore::new(tmp.path().to_str().unwrap(), "http://localhost:8080", signer)
            .await
            .unwrap(),
    ) as Arc<dyn casehub_core::traits::storage::ObjectStore>;

    let store = Arc::new(MemoryAccessStore::new());
    let access: Arc<dyn AccessStore> = store.clone();
    let markdown_cache = Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default(), 300));
    let assets = AssetLifecycle::new(objects, markdown_cache);
    let url_cache = Arc::new(SignedUrlCache::new(Duration::from_secs(300)));
    let ttl = Duration::from_secs(300);

    let reconciler = Reconciler::new(access.clone(), assets.clone(), url_cache.clone(), ttl);
    let cases = CaseService::new(
        access.clone(),
        assets.clone(),
        reconciler.clone(),
        url_cache.clone(),
        ttl,
    );
    let assistants = AssistantService::new(
        access.clone(),
        assets.clone(),
        cases.clone(),
        url_cache.clone(),
        ttl,
    );

    Harness {
        store,
        access,
        assets,
        reconciler,
        cases,
        assistants,
        url_cache,
        _tmp: tmp,
    }
}

/// An ensured user with the given flags, wrapped in a request context.
pub async fn user_ctx(
    store: &Arc<dyn AccessStore>,
    email: &str,
    is_admin: bool,
    is_super_admin: bool,
    can_create_cases: bool,
) -> RequestContext {
    let user = store.ensure_user(email, None).await.unwrap();
    let user = store
        .update_user_flags(
            user.id,
            &UpdateUserFlags {
                is_admin: Some(is_admin),
                is_super_admin: Some(is_super_admin),
                can_create_cases: Some(can_create_cases),
            },
        )
        .await
        .unwrap();
    RequestContext::new(user)
}

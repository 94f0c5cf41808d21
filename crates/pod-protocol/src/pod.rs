use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

use pod_path::{normalize_base, normalize_request_url, parent_id, resolve_user_path, PathResult};
use pod_store::RowStore;
use pod_types::{attrs, CoreFields, Resource, ResourceKind};

use crate::config::PodConfig;
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{headers, reason, status, Method, Request, Response};

/// Table holding one row per resource, keyed by absolute URL.
pub const RESOURCES_TABLE: &str = "resources";

/// The resource protocol handler.
///
/// Owns the `resources` table and its `parentId` index. Invariants:
///
/// 1. A container exists at the base URL from construction onward and can
///    never be deleted.
/// 2. A non-root resource is only created when its parent container exists.
/// 3. A resource's kind follows its identifier's trailing `/`.
/// 4. A PUT replaces the core fields of a row; extension attributes on an
///    existing row are carried over untouched.
///
/// Mutations go through a single write lock, so a reader always observes
/// either the previous or the new full row.
pub struct Pod {
    store: Arc<dyn RowStore>,
    base: Url,
    config: PodConfig,
    write_lock: Mutex<()>,
}

impl Pod {
    /// Bind a handler to `store`, registering the parent index and creating
    /// the root container if it does not exist yet.
    pub fn new(store: Arc<dyn RowStore>, config: PodConfig) -> ProtocolResult<Self> {
        let base = normalize_base(&config.base_url)
            .map_err(|e| ProtocolError::Config(format!("base_url {:?}: {e}", config.base_url)))?;

        store.register_index(RESOURCES_TABLE, attrs::PARENT_ID)?;

        let pod = Self {
            store,
            base,
            config,
            write_lock: Mutex::new(()),
        };
        pod.ensure_root()?;
        Ok(pod)
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn config(&self) -> &PodConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RowStore> {
        &self.store
    }

    /// Normalize a request URL with this pod's base and name rules.
    pub fn normalize(&self, url: &str) -> PathResult<String> {
        normalize_request_url(url, &self.base, &self.config.name_rules)
    }

    /// Resolve a user-typed path relative to `current`.
    pub fn resolve(&self, input: &str, current: &str) -> PathResult<String> {
        resolve_user_path(input, current, &self.base)
    }

    /// Serve one request. Failures are reported in the response, never as
    /// an error.
    pub fn handle_request(&self, url: &str, request: &Request) -> Response {
        let Some(method) = Method::parse(&request.method) else {
            tracing::debug!(method = %request.method, url, "unsupported method");
            return Response::error(status::METHOD_NOT_ALLOWED, reason::METHOD_NOT_ALLOWED);
        };
        tracing::debug!(%method, url, "handling request");

        let id = match self.normalize(url) {
            Ok(id) => id,
            Err(e) => return Response::error(e.status(), e.to_string()),
        };

        let result = match method {
            Method::Get => self.get(&id),
            Method::Put => self.put(&id, request),
            Method::Delete => self.delete(&id),
        };

        result.unwrap_or_else(|e| {
            tracing::error!(%method, id = %id, error = %e, "request failed in backend");
            Response::error(status::INTERNAL_SERVER_ERROR, "Internal Server Error")
        })
    }

    /// Sorted identifiers of the direct children of `container_id`.
    pub fn list_children(&self, container_id: &str) -> ProtocolResult<Vec<String>> {
        Ok(self.store.keys_where(
            RESOURCES_TABLE,
            attrs::PARENT_ID,
            &Value::String(container_id.to_string()),
        )?)
    }

    /// Typed read of a stored resource by its canonical identifier.
    pub fn resource(&self, id: &str) -> ProtocolResult<Option<Resource>> {
        match self.store.get(RESOURCES_TABLE, id)? {
            Some(row) => Ok(Some(Resource::from_row(id, &row)?)),
            None => Ok(None),
        }
    }

    /// Whether a resource exists at the canonical identifier `id`.
    pub fn exists(&self, id: &str) -> ProtocolResult<bool> {
        Ok(self.store.exists(RESOURCES_TABLE, id)?)
    }

    pub fn is_root(&self, id: &str) -> bool {
        id == self.base.as_str()
    }

    /// Read-modify-write of a resource's extension attributes.
    ///
    /// This is the write path for metadata editors. `edit` may change
    /// extension attributes only; any change it makes to the core fields is
    /// discarded. Returns the updated resource, or `None` if `id` is absent.
    pub fn edit_extensions<F>(&self, id: &str, edit: F) -> ProtocolResult<Option<Resource>>
    where
        F: FnOnce(&mut Resource) -> pod_types::TypeResult<()>,
    {
        let _guard = self.write_lock.lock().map_err(|_| ProtocolError::LockPoisoned)?;
        let Some(mut resource) = self.resource(id)? else {
            return Ok(None);
        };
        let core = resource.core.clone();
        edit(&mut resource)?;
        resource.replace_core(core);
        self.store.set(RESOURCES_TABLE, id, resource.to_row())?;
        tracing::debug!(id, "extension attributes updated");
        Ok(Some(resource))
    }

    // ---------------------------------------------------------------
    // Method handlers
    // ---------------------------------------------------------------

    fn get(&self, id: &str) -> ProtocolResult<Response> {
        let Some(row) = self.store.get(RESOURCES_TABLE, id)? else {
            return Ok(Response::error(status::NOT_FOUND, reason::NOT_FOUND));
        };

        let body = row.get(attrs::BODY).and_then(Value::as_str).map(str::to_string);
        let content_type = row
            .get(attrs::CONTENT_TYPE)
            .and_then(Value::as_str)
            .unwrap_or(self.config.default_object_type.as_str())
            .to_string();

        let mut response =
            Response::new(status::OK, body).with_header(headers::CONTENT_TYPE, content_type);
        let updated = row
            .get(attrs::UPDATED)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok());
        if let Some(updated) = updated {
            response = response.with_header(headers::LAST_MODIFIED, updated.to_rfc2822());
        }
        Ok(response)
    }

    fn put(&self, id: &str, request: &Request) -> ProtocolResult<Response> {
        let kind = ResourceKind::of(id);
        let parent = parent_id(id, &self.base);

        let _guard = self.write_lock.lock().map_err(|_| ProtocolError::LockPoisoned)?;

        if let Some(parent) = &parent {
            if !self.store.exists(RESOURCES_TABLE, parent)? {
                tracing::debug!(id, parent = %parent, "parent container missing");
                return Ok(Response::error(status::CONFLICT, reason::PARENT_MISSING));
            }
        }

        let content_type = request
            .header(headers::CONTENT_TYPE)
            .map(str::to_string)
            .unwrap_or_else(|| self.default_type(kind).to_string());

        let core = CoreFields {
            kind,
            body: request.body.clone(),
            content_type,
            parent_id: parent,
            updated: Utc::now(),
        };
        let mut resource = Resource::new(id, core);
        if let Some(existing) = self.store.get(RESOURCES_TABLE, id)? {
            for (name, value) in existing.into_iter().filter(|(k, _)| !attrs::is_core(k)) {
                resource.set_extension(&name, value)?;
            }
        }

        self.store.set(RESOURCES_TABLE, id, resource.to_row())?;
        tracing::debug!(id, %kind, "resource written");
        Ok(Response::created(id))
    }

    fn delete(&self, id: &str) -> ProtocolResult<Response> {
        if self.is_root(id) {
            tracing::warn!(id, "refused to delete root container");
            return Ok(Response::error(status::METHOD_NOT_ALLOWED, reason::ROOT_NOT_DELETABLE));
        }

        let _guard = self.write_lock.lock().map_err(|_| ProtocolError::LockPoisoned)?;

        if self.config.reject_non_empty_delete
            && ResourceKind::of(id).is_container()
            && !self.list_children(id)?.is_empty()
        {
            return Ok(Response::error(status::CONFLICT, reason::CONTAINER_NOT_EMPTY));
        }

        let existed = self.store.delete(RESOURCES_TABLE, id)?;
        tracing::debug!(id, existed, "resource deleted");
        Ok(Response::no_content())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn default_type(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::Container => &self.config.default_container_type,
            ResourceKind::Object => &self.config.default_object_type,
        }
    }

    fn ensure_root(&self) -> ProtocolResult<()> {
        let root = self.base.as_str();
        if self.store.exists(RESOURCES_TABLE, root)? {
            return Ok(());
        }
        let resource = Resource::new(
            root,
            CoreFields {
                kind: ResourceKind::Container,
                body: None,
                content_type: self.config.default_container_type.clone(),
                parent_id: None,
                updated: Utc::now(),
            },
        );
        self.store.set(RESOURCES_TABLE, root, resource.to_row())?;
        tracing::info!(root, "created root container");
        Ok(())
    }
}

impl std::fmt::Debug for Pod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pod")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

use axum::Router;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;
use crate::contracts;

/// One module and the capabilities it opted into.
pub struct ModuleEntry {
    pub name: &'static str,
    pub deps: &'static [&'static str],
    pub core: Arc<dyn contracts::Module>,
    pub db: Option<Arc<dyn contracts::DbModule>>,
    pub rest: Option<Arc<dyn contracts::RestfulModule>>,
    pub rest_host: Option<Arc<dyn contracts::RestHostModule>>,
    pub stateful: Option<Arc<dyn contracts::StatefulModule>>,
}

impl ModuleEntry {
    pub fn new(name: &'static str, core: Arc<dyn contracts::Module>) -> Self {
        Self {
            name,
            deps: &[],
            core,
            db: None,
            rest: None,
            rest_host: None,
            stateful: None,
        }
    }

    pub fn deps(mut self, deps: &'static [&'static str]) -> Self {
        self.deps = deps;
        self
    }

    pub fn db(mut self, m: Arc<dyn contracts::DbModule>) -> Self {
        self.db = Some(m);
        self
    }

    pub fn rest(mut self, m: Arc<dyn contracts::RestfulModule>) -> Self {
        self.rest = Some(m);
        self
    }

    pub fn rest_host(mut self, m: Arc<dyn contracts::RestHostModule>) -> Self {
        self.rest_host = Some(m);
        self
    }

    pub fn stateful(mut self, m: Arc<dyn contracts::StatefulModule>) -> Self {
        self.stateful = Some(m);
        self
    }
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("has_db", &self.db.is_some())
            .field("has_rest", &self.rest.is_some())
            .field("is_rest_host", &self.rest_host.is_some())
            .field("has_stateful", &self.stateful.is_some())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("module '{0}' is already registered")]
    DuplicateModule(&'static str),
    #[error("module '{module}' depends on '{depends_on}', which is not registered before it")]
    UnknownDependency {
        module: &'static str,
        depends_on: &'static str,
    },
    #[error("multiple REST host modules: '{first}' and '{second}'")]
    MultipleRestHosts {
        first: &'static str,
        second: &'static str,
    },
    #[error("REST modules are registered but no REST host is present")]
    RestRequiresHost,
    #[error("database is required by module '{0}' but none is configured")]
    DbRequired(&'static str),

    #[error("init failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("DB migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host module '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host module '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for module '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Modules in registration order. Dependencies must be registered first, so
/// registration order is a valid initialization order.
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.modules.iter().map(|m| m.name).collect();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<ModuleEntry>,
}

impl RegistryBuilder {
    pub fn register(mut self, entry: ModuleEntry) -> Self {
        self.modules.push(entry);
        self
    }

    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut host: Option<&'static str> = None;

        for e in &self.modules {
            for &dep in e.deps {
                if !seen.contains(dep) {
                    return Err(RegistryError::UnknownDependency {
                        module: e.name,
                        depends_on: dep,
                    });
                }
            }
            if !seen.insert(e.name) {
                return Err(RegistryError::DuplicateModule(e.name));
            }
            if e.rest_host.is_some() {
                if let Some(first) = host {
                    return Err(RegistryError::MultipleRestHosts {
                        first,
                        second: e.name,
                    });
                }
                host = Some(e.name);
            }
        }

        if host.is_none() && self.modules.iter().any(|e| e.rest.is_some()) {
            return Err(RegistryError::RestRequiresHost);
        }

        Ok(ModuleRegistry {
            modules: self.modules,
        })
    }
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|e| e.name).collect()
    }

    // ---- Ordered phases: init → DB → REST (sync) → start → stop ----

    pub async fn run_init_phase(&self, base_ctx: &ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            let ctx = base_ctx.clone().for_module(e.name);
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
            tracing::debug!(module = e.name, "module initialized");
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, db: Option<&DatabaseConnection>) -> Result<(), RegistryError> {
        for e in &self.modules {
            let Some(dbm) = &e.db else { continue };
            let db = db.ok_or(RegistryError::DbRequired(e.name))?;
            dbm.migrate(db)
                .await
                .map_err(|source| RegistryError::DbMigrate {
                    module: e.name,
                    source,
                })?;
            tracing::debug!(module = e.name, "module migrated");
        }
        Ok(())
    }

    pub fn run_rest_phase(
        &self,
        base_ctx: &ModuleCtx,
        mut router: Router,
    ) -> Result<Router, RegistryError> {
        let Some((host_name, host)) = self
            .modules
            .iter()
            .find_map(|e| e.rest_host.as_ref().map(|h| (e.name, h)))
        else {
            return Ok(router);
        };
        let host_ctx = base_ctx.clone().for_module(host_name);

        router = host
            .rest_prepare(&host_ctx, router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_name,
                source,
            })?;

        for e in &self.modules {
            if let Some(rest) = &e.rest {
                let ctx = base_ctx.clone().for_module(e.name);
                router = rest
                    .register_rest(&ctx, router)
                    .map_err(|source| RegistryError::RestRegister {
                        module: e.name,
                        source,
                    })?;
            }
        }

        host.rest_finalize(&host_ctx, router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_name,
                source,
            })
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(s) = &e.stateful {
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Stops in reverse order; failures are logged, never propagated.
    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            if let Some(s) = &e.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = e.name, error = %err, "Failed to stop module");
                }
            }
        }
    }
}

//! Lifecycle hook capabilities a record type may opt into.

use crate::models::{Cell, NamingStrategy};
use serde::Serialize;

/// Error raised by a hook or an inline closure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type HookResult = Result<(), HookError>;

/// The closed set of lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    BeforeInsert,
    BeforeUpdate,
    BeforeDelete,
    BeforeSet,
    AfterSet,
    AfterInsert,
    AfterUpdate,
    AfterDelete,
    AfterLoad,
    AfterLoadSession,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeforeInsert => "BeforeInsert",
            Self::BeforeUpdate => "BeforeUpdate",
            Self::BeforeDelete => "BeforeDelete",
            Self::BeforeSet => "BeforeSet",
            Self::AfterSet => "AfterSet",
            Self::AfterInsert => "AfterInsert",
            Self::AfterUpdate => "AfterUpdate",
            Self::AfterDelete => "AfterDelete",
            Self::AfterLoad => "AfterLoad",
            Self::AfterLoadSession => "AfterLoad(session)",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Data-access operation a unit of work performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Load,
    Insert,
    Update,
    Delete,
}

impl Operation {
    /// Hook that runs immediately before the statement.
    pub fn before_hook(&self) -> Option<Capability> {
        match self {
            Self::Insert => Some(Capability::BeforeInsert),
            Self::Update => Some(Capability::BeforeUpdate),
            Self::Delete => Some(Capability::BeforeDelete),
            Self::Load => None,
        }
    }

    /// Hooks queued after the statement, in queue order.
    pub fn after_hooks(&self) -> &'static [Capability] {
        match self {
            Self::Insert => &[Capability::AfterInsert],
            Self::Update => &[Capability::AfterUpdate],
            Self::Delete => &[Capability::AfterDelete],
            Self::Load => &[Capability::AfterLoad, Capability::AfterLoadSession],
        }
    }
}

/// What an `AfterLoad(session)` hook can see of the session that loaded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub pool: String,
    pub table_prefix: String,
    pub naming_strategy: NamingStrategy,
    pub operation: Operation,
}

impl SessionContext {
    pub fn new(pool: impl Into<String>, operation: Operation) -> Self {
        Self {
            pool: pool.into(),
            table_prefix: String::new(),
            naming_strategy: NamingStrategy::default(),
            operation,
        }
    }

    /// Table name for a record type under this session's prefix and naming strategy.
    pub fn table_name(&self, type_name: &str) -> String {
        self.naming_strategy.table_name(&self.table_prefix, type_name)
    }
}

/// Lifecycle hooks for a persisted record type.
///
/// Every hook defaults to a no-op. A hook is dispatched only when its
/// [`Capability`] is listed in [`CAPABILITIES`](Self::CAPABILITIES), so a
/// type declares exactly the hooks it implements:
///
/// ```
/// use db_registry::processors::{Capability, HookResult, Hooks};
///
/// #[derive(Default)]
/// struct Article {
///     views: i64,
/// }
///
/// impl Hooks for Article {
///     const CAPABILITIES: &'static [Capability] = &[Capability::AfterLoad];
///
///     fn after_load(&mut self) -> HookResult {
///         self.views += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Hooks: Send + 'static {
    const CAPABILITIES: &'static [Capability] = &[];

    fn has(capability: Capability) -> bool {
        Self::CAPABILITIES.contains(&capability)
    }

    fn before_insert(&mut self) -> HookResult {
        Ok(())
    }

    fn before_update(&mut self) -> HookResult {
        Ok(())
    }

    fn before_delete(&mut self) -> HookResult {
        Ok(())
    }

    /// Runs for each scanned column before it is assigned. `cell` may be rewritten.
    fn before_set(&mut self, _field: &str, _cell: &mut Cell) -> HookResult {
        Ok(())
    }

    /// Runs for each scanned column after assignment.
    fn after_set(&mut self, _field: &str, _cell: &mut Cell) -> HookResult {
        Ok(())
    }

    fn after_insert(&mut self) -> HookResult {
        Ok(())
    }

    fn after_update(&mut self) -> HookResult {
        Ok(())
    }

    fn after_delete(&mut self) -> HookResult {
        Ok(())
    }

    fn after_load(&mut self) -> HookResult {
        Ok(())
    }

    fn after_load_with_session(&mut self, _session: &SessionContext) -> HookResult {
        Ok(())
    }
}

/// Invoke a record-level hook by capability.
///
/// `BeforeSet` and `AfterSet` take a cell and are not dispatched here.
pub(crate) fn invoke<B: Hooks>(
    capability: Capability,
    record: &mut B,
    session: &SessionContext,
) -> HookResult {
    match capability {
        Capability::BeforeInsert => record.before_insert(),
        Capability::BeforeUpdate => record.before_update(),
        Capability::BeforeDelete => record.before_delete(),
        Capability::AfterInsert => record.after_insert(),
        Capability::AfterUpdate => record.after_update(),
        Capability::AfterDelete => record.after_delete(),
        Capability::AfterLoad => record.after_load(),
        Capability::AfterLoadSession => record.after_load_with_session(session),
        Capability::BeforeSet | Capability::AfterSet => Ok(()),
    }
}

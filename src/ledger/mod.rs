use std::collections::HashMap;
use std::sync::Arc;

/// Role a preview handle plays inside one workflow session. The controller
/// keeps at most one live handle per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleRole {
    Original,
    Processed,
}

/// Opaque reference to byte data the view layer can render as an image.
/// Only the ledger that issued it can resolve or revoke it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    id: u64,
    role: HandleRole,
}

impl PreviewHandle {
    pub fn role(&self) -> HandleRole {
        self.role
    }
}

/// Tracks the ephemeral preview resources of one workflow session so that
/// every acquisition is paired with a release before the session forgets it.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    entries: HashMap<u64, (HandleRole, Arc<[u8]>)>,
    next_id: u64,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, role: HandleRole, bytes: Arc<[u8]>) -> PreviewHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, (role, bytes));
        tracing::debug!(id, ?role, "acquired preview handle");
        PreviewHandle { id, role }
    }

    /// Revokes a handle. Liveness is tracked, so releasing an already-released
    /// handle degrades to a warning instead of corrupting the ledger.
    pub fn release(&mut self, handle: PreviewHandle) {
        match self.entries.remove(&handle.id) {
            Some(_) => tracing::debug!(id = handle.id, role = ?handle.role, "released preview handle"),
            None => tracing::warn!(
                id = handle.id,
                role = ?handle.role,
                "release requested for a handle that is not live"
            ),
        }
    }

    /// Resolves a live handle to its byte payload for rendering.
    pub fn bytes(&self, handle: PreviewHandle) -> Option<&Arc<[u8]>> {
        self.entries.get(&handle.id).map(|(_, bytes)| bytes)
    }

    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.entries.contains_key(&handle.id)
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    pub fn live_count_for(&self, role: HandleRole) -> usize {
        self.entries
            .values()
            .filter(|(entry_role, _)| *entry_role == role)
            .count()
    }

    /// Session teardown: revokes everything still live.
    pub fn release_all(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(count = self.entries.len(), "releasing all live preview handles");
        }
        self.entries.clear();
    }
}

impl Drop for ResourceLedger {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            tracing::warn!(
                count = self.entries.len(),
                "preview handles still live at ledger teardown"
            );
            self.entries.clear();
        }
    }
}

//! Detail editors for boards, tracks and tascs.
//!
//! A detail editor owns the form state of one entity and an auto-sync
//! controller bound to that entity's save endpoint. Every edit goes to the
//! form first, then the form's values and dirty flag go to the controller.

use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use tascboard_common::{BoardId, Error, Result, TascId, TrackId, UserId};
use tascboard_model::{
    Board, BoardSnapshot, Capability, Tasc, TascSnapshot, Track, TrackSnapshot,
};
use tascboard_store::{
    ActivityLog, BoardEndpoint, CapabilityCheck, CapabilityScope, TascEndpoint, TrackEndpoint,
    WorkspaceStore,
};
use tascboard_sync::{AutoSyncConfig, AutoSyncController, AutoSyncOptions, SaveHandler, SyncState};

use crate::form::FormState;

/// Who is editing, and which capability the edits need.
pub struct EditGate {
    checker: Arc<dyn CapabilityCheck>,
    user: UserId,
    capability: Capability,
    scope: CapabilityScope,
}

impl EditGate {
    pub fn new(
        checker: Arc<dyn CapabilityCheck>,
        user: UserId,
        capability: Capability,
        scope: CapabilityScope,
    ) -> Self {
        Self {
            checker,
            user,
            capability,
            scope,
        }
    }

    async fn allowed(&self) -> Result<bool> {
        self.checker
            .can(&self.user, self.capability, &self.scope)
            .await
    }
}

/// Form plus auto-sync controller for one entity.
pub struct DetailEditor<S, H>
where
    S: Serialize + Debug + Clone + Send + 'static,
    H: SaveHandler<S> + 'static,
{
    form: FormState<S>,
    controller: AutoSyncController<S, H>,
    gate: EditGate,
    can_edit: bool,
}

impl<S, H> DetailEditor<S, H>
where
    S: Serialize + Debug + Clone + Send + 'static,
    H: SaveHandler<S> + 'static,
{
    /// Open an editor showing `baseline`.
    ///
    /// The gate is checked once here; a user without the capability gets
    /// a read-only editor.
    ///
    /// # Errors
    /// - The capability check itself failed
    pub async fn open(
        baseline: S,
        handler: H,
        options: AutoSyncOptions<H::Output>,
        gate: EditGate,
    ) -> Result<Self> {
        let can_edit = gate.allowed().await?;
        let controller = AutoSyncController::new(baseline.clone(), handler, options);
        Ok(Self {
            form: FormState::new(baseline),
            controller,
            gate,
            can_edit,
        })
    }

    /// Apply an edit and report it to the controller.
    ///
    /// # Errors
    /// - `Unauthorized` if the editor is read-only; the form is untouched
    pub fn edit(&mut self, f: impl FnOnce(&mut S)) -> Result<SyncState> {
        self.ensure_editable()?;
        self.form.edit(f);
        Ok(self.push())
    }

    /// Replace all values and report the change to the controller.
    pub fn set(&mut self, values: S) -> Result<SyncState> {
        self.ensure_editable()?;
        self.form.set(values);
        Ok(self.push())
    }

    /// Reset the form to a freshly loaded baseline.
    ///
    /// The controller adopts the baseline as its last save, so pending
    /// unsaved edits are discarded and the status returns to `Synced`.
    pub fn reset(&mut self, baseline: S) {
        self.form.reset(baseline.clone());
        self.controller.reset(baseline);
    }

    /// Re-run the capability check, e.g. after a role change.
    pub async fn refresh_access(&mut self) -> Result<bool> {
        self.can_edit = self.gate.allowed().await?;
        Ok(self.can_edit)
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    pub fn values(&self) -> &S {
        self.form.values()
    }

    pub fn form(&self) -> &FormState<S> {
        &self.form
    }

    pub fn status(&self) -> SyncState {
        self.controller.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.controller.subscribe()
    }

    pub fn controller(&self) -> &AutoSyncController<S, H> {
        &self.controller
    }

    /// Close the editor: save pending edits now, then dispose.
    ///
    /// Returns true if a final save was started. While an earlier save is
    /// still in flight no final save can start, so edits made after that
    /// save began are discarded.
    pub fn close(self) -> bool {
        let started = self.controller.flush();
        self.controller.dispose();
        started
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.can_edit {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "{} lacks {:?} on {:?}",
                self.gate.user, self.gate.capability, self.gate.scope
            )))
        }
    }

    fn push(&self) -> SyncState {
        self.controller
            .update(self.form.values().clone(), self.form.is_dirty());
        self.controller.status()
    }
}

pub type BoardEditor = DetailEditor<BoardSnapshot, BoardEndpoint>;
pub type TrackEditor = DetailEditor<TrackSnapshot, TrackEndpoint>;
pub type TascEditor = DetailEditor<TascSnapshot, TascEndpoint>;

/// Collaborators shared by every editor of a workspace.
#[derive(Clone)]
pub struct Workspace {
    store: Arc<dyn WorkspaceStore>,
    activity: Arc<dyn ActivityLog>,
    capabilities: Arc<dyn CapabilityCheck>,
    config: AutoSyncConfig,
}

impl Workspace {
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        activity: Arc<dyn ActivityLog>,
        capabilities: Arc<dyn CapabilityCheck>,
        config: AutoSyncConfig,
    ) -> Self {
        Self {
            store,
            activity,
            capabilities,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn WorkspaceStore> {
        &self.store
    }

    pub fn activity(&self) -> &Arc<dyn ActivityLog> {
        &self.activity
    }

    /// Editor options from the workspace configuration, without callbacks.
    pub fn options<T>(&self) -> AutoSyncOptions<T> {
        AutoSyncOptions::new(self.config.clone())
    }

    fn gate(&self, user: &UserId, capability: Capability, scope: CapabilityScope) -> EditGate {
        EditGate::new(self.capabilities.clone(), user.clone(), capability, scope)
    }

    /// Open the board detail editor.
    ///
    /// # Errors
    /// - Board not found
    pub async fn open_board_editor(
        &self,
        id: &BoardId,
        user: &UserId,
        options: AutoSyncOptions<Board>,
    ) -> Result<BoardEditor> {
        let board = self.store.get_board(id).await?;
        debug!("Opening board editor for {}", id);
        let endpoint = BoardEndpoint::new(
            self.store.clone(),
            self.activity.clone(),
            id.clone(),
            user.clone(),
        );
        let gate = self.gate(user, Capability::EditBoard, CapabilityScope::Board(id.clone()));
        DetailEditor::open(board.snapshot(), endpoint, options, gate).await
    }

    /// Open the track detail editor.
    pub async fn open_track_editor(
        &self,
        id: &TrackId,
        user: &UserId,
        options: AutoSyncOptions<Track>,
    ) -> Result<TrackEditor> {
        let track = self.store.get_track(id).await?;
        debug!("Opening track editor for {}", id);
        let endpoint = TrackEndpoint::new(
            self.store.clone(),
            self.activity.clone(),
            id.clone(),
            user.clone(),
        );
        let gate = self.gate(user, Capability::EditTrack, CapabilityScope::Track(id.clone()));
        DetailEditor::open(track.snapshot(), endpoint, options, gate).await
    }

    /// Open the tasc detail editor.
    pub async fn open_tasc_editor(
        &self,
        id: &TascId,
        user: &UserId,
        options: AutoSyncOptions<Tasc>,
    ) -> Result<TascEditor> {
        let tasc = self.store.get_tasc(id).await?;
        debug!("Opening tasc editor for {}", id);
        let endpoint = TascEndpoint::new(
            self.store.clone(),
            self.activity.clone(),
            id.clone(),
            user.clone(),
        );
        let gate = self.gate(user, Capability::EditTasc, CapabilityScope::Tasc(id.clone()));
        DetailEditor::open(tasc.snapshot(), endpoint, options, gate).await
    }
}

//! Viewer session - who is looking at the feed
//!
//! Resolves the signed-in user and their role once. Concurrent callers of
//! `initialize` share a single pass.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use feed_core::traits::{ProfileRepository, SessionProvider};
use feed_core::{Profile, Viewer};

#[derive(Debug, Default)]
struct SessionState {
    viewer: Option<Viewer>,
    profile: Option<Profile>,
    initialized: bool,
}

pub struct ViewerSession {
    sessions: Arc<dyn SessionProvider>,
    profiles: Arc<dyn ProfileRepository>,
    /// Held for the duration of one initialization pass
    init_lock: Mutex<()>,
    state: RwLock<SessionState>,
}

impl ViewerSession {
    pub fn new(sessions: Arc<dyn SessionProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            sessions,
            profiles,
            init_lock: Mutex::new(()),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Resolve the viewer unless already done; a pass in flight is awaited, not repeated
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Option<Viewer> {
        if let Some(viewer) = self.initialized_viewer() {
            return viewer;
        }

        let _pass = self.init_lock.lock().await;
        if let Some(viewer) = self.initialized_viewer() {
            debug!("Session initialized by a concurrent pass");
            return viewer;
        }

        self.run_pass().await
    }

    /// Wait out any pass in flight, then resolve the viewer again
    #[instrument(skip(self))]
    pub async fn reinitialize(&self) -> Option<Viewer> {
        let _pass = self.init_lock.lock().await;
        self.run_pass().await
    }

    /// Sign-out: forget the viewer; the next `initialize` runs a fresh pass
    pub fn clear(&self) {
        *self.state.write() = SessionState::default();
        info!("Session cleared");
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.state.read().viewer
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.read().profile.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    fn initialized_viewer(&self) -> Option<Option<Viewer>> {
        let state = self.state.read();
        state.initialized.then_some(state.viewer)
    }

    async fn run_pass(&self) -> Option<Viewer> {
        let user_id = match self.sessions.current_user().await {
            Ok(user_id) => user_id,
            Err(e) => {
                warn!(error = %e, "Session lookup failed, continuing signed out");
                None
            }
        };

        let (viewer, profile) = match user_id {
            Some(user_id) => match self.profiles.find_by_user(user_id).await {
                Ok(Some(profile)) => (Some(Viewer::new(user_id).with_roles(profile.roles())), Some(profile)),
                Ok(None) => {
                    debug!(user_id = %user_id, "No profile row for session user");
                    (Some(Viewer::new(user_id)), None)
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Profile lookup failed, continuing without roles");
                    (Some(Viewer::new(user_id)), None)
                }
            },
            None => (None, None),
        };

        {
            let mut state = self.state.write();
            state.viewer = viewer;
            state.profile = profile;
            state.initialized = true;
        }

        if let Some(viewer) = viewer {
            info!(user_id = %viewer.id, admin = viewer.is_admin(), "Session initialized");
        } else {
            info!("Session initialized without a signed-in user");
        }
        viewer
    }
}

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::FavouritesApi;
use crate::cache::FavouritesCache;
use crate::control::{ControlView, FavouriteControl};
use crate::storage::LocalStore;

const GENERIC_FAILURE: &str = "Failed to update favourites";
const LOGIN_REQUIRED: &str = "Login required!";

/// Transient user-facing messages.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// How the widget decides between adding and removing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleStrategy {
    /// Call the server's toggle endpoint and adopt the membership it reports.
    #[default]
    ServerAuthoritative,
    /// Decide from the local cache and call add or remove. A stale cache
    /// (e.g. a change made on another device) sends the wrong call.
    CacheGuided,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Favourited,
    Unfavourited,
    /// No session. The caller should send the user to the login page.
    LoginRequired,
    Failed(String),
    /// A toggle for this control is still in flight.
    Busy,
    UnknownControl,
}

pub struct FavouritesWidget<A, S, N> {
    api: A,
    notifier: N,
    strategy: ToggleStrategy,
    cache: Mutex<FavouritesCache<S>>,
    controls: Mutex<HashMap<String, FavouriteControl>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<A, S, N> FavouritesWidget<A, S, N>
where
    A: FavouritesApi,
    S: LocalStore,
    N: Notifier,
{
    pub fn new(api: A, store: S, notifier: N) -> Self {
        Self {
            api,
            notifier,
            strategy: ToggleStrategy::default(),
            cache: Mutex::new(FavouritesCache::new(store)),
            controls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_strategy(mut self, strategy: ToggleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Add a control for a listing, drawn from the cached membership. An
    /// existing control is redrawn unless a toggle is still pending on it.
    pub fn register(&self, listing_id: &str) -> ControlView {
        let favourite = lock(&self.cache).contains(listing_id);
        let mut controls = lock(&self.controls);
        match controls.get_mut(listing_id) {
            Some(control) if control.is_pending() => control.view().clone(),
            Some(control) => {
                *control = FavouriteControl::new(listing_id, favourite);
                control.view().clone()
            }
            None => {
                let control = FavouriteControl::new(listing_id, favourite);
                let view = control.view().clone();
                controls.insert(listing_id.to_string(), control);
                view
            }
        }
    }

    pub fn control(&self, listing_id: &str) -> Option<FavouriteControl> {
        lock(&self.controls).get(listing_id).cloned()
    }

    pub fn cached_favourites(&self) -> Vec<String> {
        lock(&self.cache).read()
    }

    pub async fn toggle(&self, listing_id: &str) -> ToggleOutcome {
        match lock(&self.controls).get_mut(listing_id) {
            Some(control) => {
                if !control.begin() {
                    return ToggleOutcome::Busy;
                }
            }
            None => {
                tracing::warn!(listing_id, "Favourite control not found");
                return ToggleOutcome::UnknownControl;
            }
        }

        let outcome = self.exchange(listing_id).await;

        if let Some(control) = lock(&self.controls).get_mut(listing_id) {
            control.release();
        }
        outcome
    }

    async fn exchange(&self, listing_id: &str) -> ToggleOutcome {
        match self.api.check_session().await {
            Ok(true) => {}
            Ok(false) => return self.login_required(),
            Err(e) => return self.failed(&format!("Session check failed: {e}"), GENERIC_FAILURE),
        }

        let (response, was_favourite) = match self.strategy {
            ToggleStrategy::ServerAuthoritative => (self.api.toggle(listing_id).await, None),
            ToggleStrategy::CacheGuided => {
                let current = lock(&self.cache).contains(listing_id);
                let response = if current {
                    self.api.remove(listing_id).await
                } else {
                    self.api.add(listing_id).await
                };
                (response, Some(current))
            }
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => return self.failed(&format!("Favourite request failed: {e}"), GENERIC_FAILURE),
        };
        if response.is_unauthorized() {
            return self.login_required();
        }
        if let Some(message) = response.failure_message() {
            return self.failed(
                &format!("Favourite request failed with status {}", response.status),
                &message,
            );
        }

        let reported = response.body.as_ref().and_then(|b| b.is_favourite);
        let Some(favourite) = was_favourite.map(|current| !current).or(reported) else {
            return self.failed("Toggle response carried no isFavourite", GENERIC_FAILURE);
        };

        lock(&self.cache).set_membership(listing_id, favourite);
        if let Some(control) = lock(&self.controls).get_mut(listing_id) {
            control.apply(favourite);
        }

        if favourite {
            self.notifier.success("Added to favourites");
            ToggleOutcome::Favourited
        } else {
            self.notifier.success("Removed from favourites");
            ToggleOutcome::Unfavourited
        }
    }

    fn login_required(&self) -> ToggleOutcome {
        self.notifier.error(LOGIN_REQUIRED);
        ToggleOutcome::LoginRequired
    }

    fn failed(&self, detail: &str, message: &str) -> ToggleOutcome {
        tracing::error!("{detail}");
        self.notifier.error(message);
        ToggleOutcome::Failed(message.to_string())
    }
}

//! Client-side mirror of a user's favourite listings.
//!
//! The widget keeps a local cache of favourited ids, drives the server's
//! favourites endpoints, and tracks the visual state of one toggle control
//! per listing.

pub mod api;
pub mod cache;
pub mod control;
pub mod error;
pub mod storage;
pub mod widget;

pub use api::{ApiResponse, FavouriteEnvelope, FavouritesApi, HttpFavouritesApi};
pub use cache::{FavouritesCache, FAVOURITES_KEY};
pub use control::{ControlState, ControlView, FavouriteControl};
pub use error::WidgetError;
pub use storage::{FileStore, LocalStore, MemoryStore, StorageError};
pub use widget::{FavouritesWidget, Notifier, ToggleOutcome, ToggleStrategy};

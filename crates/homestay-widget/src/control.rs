#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Pending,
    Favourited,
    NotFavourited,
}

/// What the toggle button looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub label: &'static str,
    pub icon_class: &'static str,
    pub color_classes: [&'static str; 2],
    pub disabled: bool,
    pub dimmed: bool,
}

impl ControlView {
    pub const ADD_LABEL: &'static str = "Add to Favourite";
    pub const REMOVE_LABEL: &'static str = "Remove from Favourites";

    pub fn for_membership(favourite: bool) -> Self {
        if favourite {
            Self {
                label: Self::REMOVE_LABEL,
                icon_class: "fas",
                color_classes: ["bg-red-300", "hover:bg-red-500"],
                disabled: false,
                dimmed: false,
            }
        } else {
            Self {
                label: Self::ADD_LABEL,
                icon_class: "far",
                color_classes: ["bg-green-300", "hover:bg-green-500"],
                disabled: false,
                dimmed: false,
            }
        }
    }
}

/// One favourite toggle. While `Pending` it refuses further toggles.
#[derive(Debug, Clone)]
pub struct FavouriteControl {
    listing_id: String,
    state: ControlState,
    view: ControlView,
    saved: Option<(ControlState, ControlView)>,
}

impl FavouriteControl {
    pub fn new(listing_id: impl Into<String>, favourite: bool) -> Self {
        Self {
            listing_id: listing_id.into(),
            state: ControlState::Idle,
            view: ControlView::for_membership(favourite),
            saved: None,
        }
    }

    pub fn listing_id(&self) -> &str {
        &self.listing_id
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn view(&self) -> &ControlView {
        &self.view
    }

    pub fn is_pending(&self) -> bool {
        self.state == ControlState::Pending
    }

    /// Enter `Pending`. Returns `false` if a toggle is already in flight.
    pub(crate) fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.saved = Some((self.state, self.view.clone()));
        self.state = ControlState::Pending;
        self.view.disabled = true;
        self.view.dimmed = true;
        true
    }

    /// Show the confirmed membership. The control stays disabled until
    /// [`release`](Self::release).
    pub(crate) fn apply(&mut self, favourite: bool) {
        self.saved = None;
        self.state = if favourite {
            ControlState::Favourited
        } else {
            ControlState::NotFavourited
        };
        self.view = ControlView {
            disabled: true,
            dimmed: true,
            ..ControlView::for_membership(favourite)
        };
    }

    /// Re-enable the control. A toggle that never applied a result goes back
    /// to the state it started from.
    pub(crate) fn release(&mut self) {
        if let Some((state, view)) = self.saved.take() {
            self.state = state;
            self.view = view;
        }
        self.view.disabled = false;
        self.view.dimmed = false;
    }
}

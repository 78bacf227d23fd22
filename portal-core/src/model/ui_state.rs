//! UI state: which surface is showing, overlays, text input and selection.
//!
//! Owned by the dispatcher. Renderers only read it.

/// Top-level surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    /// Login / signup form.
    #[default]
    Entry,
    Files,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UIOverlay {
    #[default]
    None,
    Help,
    SearchPrompt,
    UploadPrompt,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Credential collection on the entry surface.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub field: LoginField,
    pub mode: AuthMode,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    pub fn focused_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
        self.error = None;
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }

    /// Forget the password and any error, keep the email for convenience.
    pub fn reset(&mut self) {
        self.password.clear();
        self.field = LoginField::Email;
        self.error = None;
        self.submitting = false;
    }
}

#[derive(Debug, Default)]
pub struct UIState {
    pub screen: Screen,
    pub overlay: UIOverlay,

    /// Text of the open prompt.
    pub input: String,

    /// Last submitted search query, used to prefill the prompt.
    pub search_term: String,

    /// Selected row in the file table.
    pub selected: usize,

    pub login: LoginForm,

    redraw: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    pub fn clear_redraw(&mut self) {
        self.redraw = false;
    }

    pub fn open_overlay(&mut self, overlay: UIOverlay, prefill: &str) {
        self.overlay = overlay;
        self.input = prefill.to_string();
    }

    pub fn close_overlay(&mut self) {
        self.overlay = UIOverlay::None;
        self.input.clear();
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the selection inside a view that may have shrunk.
    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Switch to the entry surface, dropping any files-surface state.
    pub fn show_entry(&mut self) {
        self.screen = Screen::Entry;
        self.close_overlay();
        self.selected = 0;
        self.search_term.clear();
        self.login.reset();
    }
}

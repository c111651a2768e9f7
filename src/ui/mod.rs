pub mod form_field;
pub mod keybindings;
pub mod terminal_guard;
pub mod wizard;

pub use form_field::FormField;
pub use keybindings::Action;
pub use terminal_guard::{install_panic_hook, TerminalSession};
pub use wizard::WizardScreen;

mod command_input;
mod form;
mod input;
mod key_result;
mod search_input;
mod toast;

pub use command_input::{CommandEvent, CommandInput};
pub use form::{Form, FormEvent};
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
pub use toast::{Notification, ToastKind, Toasts};

pub mod api_token;
pub mod collection;
pub mod key;
pub mod key_value;
pub mod language;
pub mod password_reset;
pub mod project;
pub mod user;

pub use api_token::ApiToken;
pub use collection::{Collection, CollectionChanges, NewCollection};
pub use key::{Key, KeyChanges, NewKey};
pub use key_value::{KeyValue, KeyValueChanges, NewKeyValue};
pub use language::Language;
pub use password_reset::{NewPasswordReset, PasswordReset};
pub use project::{NewProject, Project, ProjectChanges, ProjectMember};
pub use user::{NewUser, User};

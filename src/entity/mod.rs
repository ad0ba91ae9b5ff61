pub mod roles;
pub mod users;

pub use roles::Entity as Roles;
pub use users::Entity as Users;

mod category;
mod item;
mod notification;
mod sync_status;
mod theme;
mod transaction;
mod user;
mod warehouse;

pub use category::Category;
pub use item::Item;
pub use notification::{Notification, NotificationKind, NotificationSubject};
pub use sync_status::SyncStatus;
pub use theme::Theme;
pub use transaction::{ChangeDirection, Transaction, TransactionType};
pub use user::User;
pub use warehouse::Warehouse;

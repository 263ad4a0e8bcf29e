pub mod click;
pub mod daily_stat;
pub mod devotional;
pub mod payment;
pub mod user;

pub use click::Entity as ClickEntity;
pub use daily_stat::Entity as DailyStatEntity;
pub use devotional::Entity as DevotionalEntity;
pub use payment::Entity as PaymentEntity;
pub use user::Entity as UserEntity;

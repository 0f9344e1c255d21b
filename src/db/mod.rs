pub mod db;
pub mod notificationdb;
pub mod propertydb;
pub mod userdb;
pub mod viewingdb;

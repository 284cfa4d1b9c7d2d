//! AWS - EC2（一覧と削除）と DynamoDB（追跡レコード）のアダプタ

pub mod dynamodb;
pub mod ec2;

pub use self::dynamodb::DynamoTrackingStore;
pub use self::ec2::{Ec2Inventory, Ec2VolumeDeleter};

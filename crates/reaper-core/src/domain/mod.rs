//! Domain - ドメインモデル（resource, tracking, decision, events, errors）

pub mod resource;
pub mod tracking;
pub mod decision;
pub mod events;
pub mod errors;

pub use self::resource::{IdleFilter, RawResource, Resource, Tag, region_of};
pub use self::tracking::{TRACKING_GRACE_PERIOD_DAYS, TrackingRecord};
pub use self::decision::Decision;
pub use self::events::{DeletionEvent, Placement};
pub use self::errors::{DeleteError, InventoryError, NotifyError, ReapError, StoreError, TickError};
